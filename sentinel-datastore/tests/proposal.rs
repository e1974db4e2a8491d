use anyhow::Result;
use serde_json::json;

use sentinel_datastore::models::proposal::prelude::*;
use sentinel_datastore::models::GovernanceObject;
use sentinel_utils::address::encode_address;
use sentinel_utils::amount::COIN;
use sentinel_utils::Network;

fn address(seed: u8) -> String {
    encode_address(Network::Mainnet.p2pkh_version(), &[seed; 20])
}

fn proposal(hash: &str, name: &str) -> Proposal {
    Proposal {
        object_hash: hash.to_string(),
        name: name.to_string(),
        url: "https://dashcentral.org/p/dev".to_string(),
        start_epoch: 1_500_000_000,
        end_epoch: 1_600_000_000,
        payment_address: address(1),
        payment_amount: 25 * COIN,
    }
}

async fn store(datastore: &NetworkDatastore, proposal: &Proposal, absolute_yes_count: i64) -> Result<()> {
    let gobject = GovernanceObject::create_from_json(json!({
        "object_hash": proposal.object_hash,
        "object_type": "proposal",
        "data_hex": hex::encode(proposal.serialise()),
        "absolute_yes_count": absolute_yes_count,
    }))?;
    gobject.save(datastore).await?;
    proposal.save(datastore).await?;
    Ok(())
}

#[test]
fn test_from_payload() -> Result<()> {
    let fields = json!({
        "name": "dev-fund",
        "url": "https://example.org/dev-fund",
        "start_epoch": 100,
        "end_epoch": 200,
        "payment_address": address(2),
        "payment_amount": 12.5,
        "type": 1,
    });
    let proposal = Proposal::from_payload(&"1".repeat(64), fields.as_object().unwrap())?;
    assert_eq!(proposal.payment_amount, 1_250_000_000);
    assert_eq!(proposal.start_epoch, 100);

    let missing = json!({"name": "x", "payment_amount": 1});
    assert!(Proposal::from_payload(&"1".repeat(64), missing.as_object().unwrap()).is_err());
    Ok(())
}

#[test]
fn test_validity_rules() {
    let valid = proposal(&"1".repeat(64), "dev-fund_2");
    assert!(valid.is_valid(Network::Mainnet));
    assert!(!valid.is_valid(Network::Testnet));

    let mut p = valid.clone();
    p.name = "   ".to_string();
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.name = "has spaces".to_string();
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.end_epoch = p.start_epoch;
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.payment_amount = 0;
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.payment_address = "Xnotanaddress".to_string();
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.url = "htt".to_string();
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.url = "https://example.org/a b".to_string();
    assert!(!p.is_valid(Network::Mainnet));

    let mut p = valid.clone();
    p.url = format!("https://example.org/{}", "a".repeat(600));
    assert!(!p.is_valid(Network::Mainnet));
}

#[tokio::test]
async fn test_approved_and_ranked() -> Result<()> {
    let datastore = NetworkDatastore::create_in_memory()?;

    let low = proposal(&"1".repeat(64), "low");
    let high = proposal(&"2".repeat(64), "high");
    let tie_a = proposal(&"3".repeat(64), "tie-a");
    let tie_b = proposal(&"4".repeat(64), "tie-b");
    let below_quorum = proposal(&"5".repeat(64), "below");
    let mut invalid = proposal(&"6".repeat(64), "invalid");
    invalid.payment_amount = 0;

    store(&datastore, &low, 11).await?;
    store(&datastore, &high, 50).await?;
    store(&datastore, &tie_a, 20).await?;
    store(&datastore, &tie_b, 20).await?;
    store(&datastore, &below_quorum, 10).await?;
    store(&datastore, &invalid, 99).await?;

    let ranked = Proposal::approved_and_ranked(&datastore, 10, Network::Mainnet).await?;
    let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["high", "tie-b", "tie-a", "low"]);
    Ok(())
}
