use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use async_trait::async_trait;
use anyhow::{Result, Context, anyhow};

use crate::network_datastore::NetworkDatastore;

/// A JSON document stored under a key derived from `ID_PATH`.
#[async_trait]
pub trait Model: Sized + Serialize + for<'de> Deserialize<'de> + Send + Sync {
    const ID_PATH: &'static str;
    const FIELDS: &'static [&'static str];
    const FIELD_DEFAULTS: &'static [(&'static str, serde_json::Value)];

    fn create_from_json(mut obj: serde_json::Value) -> Result<Self> {
        for &field in Self::FIELDS {
            if obj.is_object() && obj.get(field).is_none() {
                if let Some((_, default_value)) = Self::FIELD_DEFAULTS.iter().find(|&&(k, _)| k == field) {
                    obj[field] = default_value.clone();
                }
            }
        }
        serde_json::from_value(obj).context("Failed to deserialize object")
    }

    fn from_json_string(json: &str) -> Result<Self> {
        let obj: serde_json::Value = serde_json::from_str(json)
            .context("Failed to parse JSON string")?;
        Self::create_from_json(obj)
    }

    fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize to JSON string")
    }

    fn to_json_object(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context("Failed to serialize to JSON value")
    }

    async fn save(&self, datastore: &NetworkDatastore) -> Result<()> {
        let json = self.to_json_string()?;
        datastore.put(&self.get_id(), json.as_bytes()).await
            .context("Failed to save model to datastore")
    }

    fn get_id_for(keys: &HashMap<String, String>) -> String {
        let mut id = String::from(Self::ID_PATH);
        for (key, value) in keys {
            id = id.replace(&format!("${{{}}}", key), value);
        }
        id
    }

    /// The part of `ID_PATH` before the first placeholder, without the
    /// trailing slash. Every record of the model lives below it.
    fn collection_prefix() -> &'static str {
        let end = Self::ID_PATH.find("/${").unwrap_or(Self::ID_PATH.len());
        &Self::ID_PATH[..end]
    }

    fn get_id_keys(&self) -> HashMap<String, String>;

    fn get_id(&self) -> String {
        let keys = self.get_id_keys();
        Self::get_id_for(&keys)
    }

    async fn find_one(datastore: &NetworkDatastore, keys: HashMap<String, String>) -> Result<Option<Self>> {
        let key = Self::get_id_for(&keys);
        match datastore.get_string(&key).await? {
            Some(value) => Ok(Some(Self::from_json_string(&value)?)),
            None => Ok(None),
        }
    }

    async fn find_all(datastore: &NetworkDatastore) -> Result<Vec<Self>> {
        let mut records = Vec::new();
        for result in datastore.iterator(Self::collection_prefix()) {
            let (key, value) = result?;
            let json = String::from_utf8(value.to_vec())?;
            let record = Self::from_json_string(&json)
                .with_context(|| format!("Failed to load {}", String::from_utf8_lossy(&key)))?;
            records.push(record);
        }
        Ok(records)
    }

    async fn reload(&mut self, datastore: &NetworkDatastore) -> Result<()> {
        let keys = self.get_id_keys();
        if let Some(obj) = Self::find_one(datastore, keys).await? {
            *self = obj;
            Ok(())
        } else {
            Err(anyhow!("Key not found: {}", self.get_id()))
        }
    }
}
