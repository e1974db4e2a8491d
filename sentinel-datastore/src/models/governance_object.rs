use crate::NetworkDatastore;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::Model;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Proposal,
    Superblock,
    #[default]
    Unknown,
}

impl ObjectType {
    /// Maps the daemon's numeric `type` or legacy string tag.
    pub fn from_tag(tag: &Value) -> Self {
        match tag {
            Value::Number(n) if n.as_u64() == Some(1) => ObjectType::Proposal,
            Value::Number(n) if n.as_u64() == Some(2) => ObjectType::Superblock,
            Value::String(s) if s == "proposal" => ObjectType::Proposal,
            Value::String(s) if s == "trigger" || s == "superblock" => ObjectType::Superblock,
            _ => ObjectType::Unknown,
        }
    }
}

/// A network-visible governance item as last seen in the daemon's object list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GovernanceObject {
    pub object_hash: String,
    pub collateral_hash: String,
    pub object_type: ObjectType,
    pub data_hex: String,
    pub absolute_yes_count: i64,
    pub yes_count: u64,
    pub no_count: u64,
    pub abstain_count: u64,
    pub creation_time: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model for GovernanceObject {
    const ID_PATH: &'static str = "/governance_objects/hash/${object_hash}";
    const FIELDS: &'static [&'static str] = &[
        "object_hash",
        "collateral_hash",
        "object_type",
        "data_hex",
        "absolute_yes_count",
        "yes_count",
        "no_count",
        "abstain_count",
        "creation_time",
        "created_at",
        "updated_at",
    ];
    const FIELD_DEFAULTS: &'static [(&'static str, serde_json::Value)] = &[
        ("collateral_hash", Value::String(String::new())),
    ];

    fn create_from_json(mut obj: Value) -> Result<Self> {
        if !obj.is_object() {
            return Err(anyhow!("GovernanceObject must be a JSON object"));
        }
        for (field, default_value) in Self::FIELD_DEFAULTS {
            if obj.get(*field).is_none() {
                obj[*field] = default_value.clone();
            }
        }
        if obj.get("object_type").is_none() {
            obj["object_type"] = serde_json::to_value(ObjectType::Unknown)?;
        }
        for field in ["object_hash", "data_hex"] {
            if obj.get(field).is_none() {
                return Err(anyhow!("Missing required field: {}", field));
            }
        }
        for field in ["absolute_yes_count", "yes_count", "no_count", "abstain_count", "creation_time", "created_at", "updated_at"] {
            if obj.get(field).is_none() {
                obj[field] = Value::from(0);
            }
        }
        serde_json::from_value(obj).context("Failed to deserialize GovernanceObject")
    }

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), self.object_hash.clone());
        keys
    }
}

impl GovernanceObject {
    pub fn create_from_json(obj: Value) -> Result<Self> {
        <Self as Model>::create_from_json(obj)
    }

    /// Builds a record from one entry of `gobject list`.
    pub fn from_gobject_list_item(item: &Value, now: i64) -> Result<Self> {
        let object_hash = item
            .get("Hash")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("gobject is missing Hash"))?;
        let data_hex = item
            .get("DataHex")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("gobject {} is missing DataHex", object_hash))?;
        let (object_type, _) = decode_data_hex(data_hex)?;
        let count = |name: &str| item.get(name).and_then(Value::as_u64).unwrap_or(0);

        Ok(GovernanceObject {
            object_hash: object_hash.to_string(),
            collateral_hash: item
                .get("CollateralHash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            object_type,
            data_hex: data_hex.to_string(),
            absolute_yes_count: item.get("AbsoluteYesCount").and_then(Value::as_i64).unwrap_or(0),
            yes_count: count("YesCount"),
            no_count: count("NoCount"),
            abstain_count: count("AbstainCount"),
            creation_time: item.get("CreationTime").and_then(Value::as_i64).unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_hash(datastore: &NetworkDatastore, object_hash: &str) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), object_hash.to_string());
        Self::find_one(datastore, keys).await
    }

    pub fn payload(&self) -> Result<Map<String, Value>> {
        decode_data_hex(&self.data_hex).map(|(_, fields)| fields)
    }

    pub fn has_same_counts(&self, other: &GovernanceObject) -> bool {
        self.absolute_yes_count == other.absolute_yes_count
            && self.yes_count == other.yes_count
            && self.no_count == other.no_count
            && self.abstain_count == other.abstain_count
    }
}

/// Decodes a governance object's hex payload. Accepts the legacy
/// `[["proposal", {..}]]` wrapping as well as a flat object carrying `type`.
pub fn decode_data_hex(data_hex: &str) -> Result<(ObjectType, Map<String, Value>)> {
    let bytes = hex::decode(data_hex.trim()).context("DataHex is not valid hex")?;
    let json: Value = serde_json::from_slice(&bytes).context("DataHex is not valid JSON")?;
    match json {
        Value::Object(fields) => {
            let object_type = fields.get("type").map(ObjectType::from_tag).unwrap_or_default();
            Ok((object_type, fields))
        }
        Value::Array(outer) => {
            let pair = outer
                .first()
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("unexpected governance payload layout"))?;
            let object_type = pair.first().map(ObjectType::from_tag).unwrap_or_default();
            let fields = pair
                .get(1)
                .and_then(Value::as_object)
                .cloned()
                .ok_or_else(|| anyhow!("governance payload has no fields"))?;
            Ok((object_type, fields))
        }
        _ => Err(anyhow!("unexpected governance payload layout")),
    }
}

pub fn encode_data_hex(serialised: &str) -> String {
    hex::encode(serialised.as_bytes())
}

pub mod prelude {
    pub use super::{GovernanceObject, ObjectType};
    pub use crate::Model;
    pub use crate::NetworkDatastore;
}
