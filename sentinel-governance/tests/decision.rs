use anyhow::Result;
use std::sync::Arc;

use sentinel_dashd::Daemon;
use sentinel_datastore::models::governance_object::decode_data_hex;
use sentinel_datastore::models::{Payment, Proposal, Superblock, SuperblockPayload, Vote, VoteOutcome, VoteSignal};
use sentinel_datastore::NetworkDatastore;
use sentinel_devnet::fixtures::{object_hash, proposal_item, superblock_item};
use sentinel_devnet::{CastVote, Devnet, MockDaemon};
use sentinel_governance::sync::perform_dashd_object_sync;
use sentinel_governance::{SuperblockDecision, SuperblockDecisionEngine};
use sentinel_utils::amount::COIN;
use sentinel_utils::Network;

// testnet: tip 100, cycle 24
const HEIGHT: u64 = 120;

struct Node {
    datastore: Arc<NetworkDatastore>,
    daemon: Arc<MockDaemon>,
    engine: SuperblockDecisionEngine,
}

impl Node {
    fn new(daemon: MockDaemon) -> Result<Self> {
        let datastore = Arc::new(NetworkDatastore::create_in_memory()?);
        let daemon = Arc::new(daemon);
        let engine = SuperblockDecisionEngine::new(datastore.clone(), daemon.clone() as Arc<dyn Daemon>);
        Ok(Node { datastore, daemon, engine })
    }

    async fn sync(&self) -> Result<()> {
        perform_dashd_object_sync(&self.datastore, self.daemon.as_ref()).await?;
        Ok(())
    }

    async fn decide(&self) -> Result<SuperblockDecision> {
        self.sync().await?;
        self.engine.attempt_superblock_creation().await
    }

    fn votes_for(&self, signal: &str) -> Vec<CastVote> {
        self.daemon.votes().into_iter().filter(|v| v.signal == signal).collect()
    }
}

fn funded_proposals(devnet: &Devnet) -> Vec<Proposal> {
    vec![devnet.proposal("alpha", 10 * COIN), devnet.proposal("beta", 5 * COIN)]
}

fn add_proposals(daemon: &MockDaemon, proposals: &[Proposal]) {
    for proposal in proposals {
        daemon.add_gobject(proposal_item(proposal, 3));
    }
}

fn expected_payload(proposals: &[Proposal]) -> SuperblockPayload {
    let payments: Vec<Payment> = proposals
        .iter()
        .map(|p| Payment {
            address: p.payment_address.clone(),
            amount: p.payment_amount,
            proposal_hash: p.object_hash.clone(),
        })
        .collect();
    SuperblockPayload::from_payments(HEIGHT, &payments)
}

fn duplicate_hashes() -> Vec<String> {
    let mut hashes: Vec<String> = ["dup-1", "dup-2", "dup-3"].iter().map(|s| object_hash(s)).collect();
    hashes.sort();
    hashes
}

#[tokio::test]
async fn test_abstains_before_maturity_phase() -> Result<()> {
    let devnet = Devnet { network: Network::Mainnet };
    let daemon = devnet.daemon(Some(0));
    daemon.update(|state| state.block_count = 20_000);
    let node = Node::new(daemon)?;

    let decision = node.decide().await?;
    assert_eq!(decision, SuperblockDecision::PreMaturity { event_block_height: 33_232 });
    assert!(node.daemon.votes().is_empty());
    assert!(node.daemon.submissions().is_empty());
    assert_eq!(node.datastore.count_keys("/votes").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_elected_node_submits_candidate() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let node = Node::new(devnet.elected_daemon(100))?;
    add_proposals(&node.daemon, &proposals);

    let decision = node.decide().await?;
    let expected = expected_payload(&proposals);
    let SuperblockDecision::Submitted { event_block_height, sb_hash, object_hash } = decision else {
        panic!("expected a submission, got {:?}", decision);
    };
    assert_eq!(event_block_height, HEIGHT);
    assert_eq!(sb_hash, expected.sb_hash());
    assert!(object_hash.is_some());

    assert!(node.daemon.votes().is_empty());
    let submissions = node.daemon.submissions();
    assert_eq!(submissions.len(), 1);
    let (_, fields) = decode_data_hex(submissions[0]["DataHex"].as_str().unwrap())?;
    assert_eq!(SuperblockPayload::from_fields(&fields)?, expected);
    Ok(())
}

#[tokio::test]
async fn test_node_not_elected_waits() -> Result<()> {
    let devnet = Devnet::new();
    let elected = devnet.elected_outpoint(100).unwrap();
    let other = (0..5).find(|i| devnet.outpoint_of(*i).as_deref() != Some(elected.as_str())).unwrap();
    let node = Node::new(devnet.daemon(Some(other)))?;
    add_proposals(&node.daemon, &funded_proposals(&devnet));

    let decision = node.decide().await?;
    assert!(matches!(decision, SuperblockDecision::NotElected { event_block_height: HEIGHT, .. }));
    assert!(node.daemon.votes().is_empty());
    assert!(node.daemon.submissions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_no_candidate_without_approved_proposals() -> Result<()> {
    let devnet = Devnet::new();
    let node = Node::new(devnet.elected_daemon(100))?;
    // below quorum
    for proposal in funded_proposals(&devnet) {
        node.daemon.add_gobject(proposal_item(&proposal, 0));
    }

    let decision = node.decide().await?;
    assert_eq!(decision, SuperblockDecision::NoCandidate { event_block_height: HEIGHT });
    assert!(node.daemon.submissions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_funds_highest_duplicate_and_prunes_the_rest() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let payload = expected_payload(&proposals);
    let node = Node::new(devnet.daemon(Some(0)))?;
    add_proposals(&node.daemon, &proposals);
    let hashes = duplicate_hashes();
    for hash in &hashes {
        node.daemon.add_gobject(superblock_item(hash, &payload));
    }
    let canonical = hashes[2].clone();

    let decision = node.decide().await?;
    let SuperblockDecision::MatchFound { object_hash, funded, mut pruned, .. } = decision else {
        panic!("expected a match, got {:?}", decision);
    };
    assert_eq!(object_hash, canonical);
    assert!(funded);
    pruned.sort();
    assert_eq!(pruned, hashes[..2].to_vec());

    let funding = node.votes_for("funding");
    assert_eq!(funding.len(), 1);
    assert_eq!(funding[0].object_hash, canonical);
    assert_eq!(funding[0].outcome, "yes");

    let deletes = node.votes_for("delete");
    assert_eq!(deletes.len(), 2);
    assert!(deletes.iter().all(|v| v.outcome == "yes" && v.object_hash != canonical));
    assert!(node.daemon.submissions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_commitment_is_monotonic() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let payload = expected_payload(&proposals);
    let node = Node::new(devnet.daemon(Some(0)))?;
    add_proposals(&node.daemon, &proposals);
    let hashes = duplicate_hashes();
    for hash in &hashes {
        node.daemon.add_gobject(superblock_item(hash, &payload));
    }

    node.decide().await?;
    node.daemon.clear_history();

    // the pruned duplicates still need a funding verdict
    let decision = node.decide().await?;
    let SuperblockDecision::AlreadyDecided { mut rejected, .. } = decision else {
        panic!("expected a settled height, got {:?}", decision);
    };
    rejected.sort();
    assert_eq!(rejected, hashes[..2].to_vec());
    assert!(node.daemon.votes().iter().all(|v| v.signal == "funding" && v.outcome == "no"));

    node.daemon.clear_history();
    let decision = node.decide().await?;
    assert_eq!(
        decision,
        SuperblockDecision::AlreadyDecided { event_block_height: HEIGHT, rejected: vec![] }
    );
    assert!(node.daemon.votes().is_empty());

    for hash in &hashes {
        let vote = Vote::find_for(&node.datastore, hash, VoteSignal::Funding).await?.unwrap();
        let expected = if *hash == hashes[2] { VoteOutcome::Yes } else { VoteOutcome::No };
        assert_eq!(vote.outcome, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_settled_height_rejects_competitors() -> Result<()> {
    let devnet = Devnet::new();
    let node = Node::new(devnet.daemon(Some(1)))?;
    let chosen = expected_payload(&funded_proposals(&devnet));
    let rival_a = expected_payload(&[devnet.proposal("gamma", COIN)]);
    let rival_b = expected_payload(&[devnet.proposal("delta", 2 * COIN)]);
    node.daemon.add_gobject(superblock_item(&object_hash("chosen"), &chosen));
    node.daemon.add_gobject(superblock_item(&object_hash("rival-a"), &rival_a));
    node.daemon.add_gobject(superblock_item(&object_hash("rival-b"), &rival_b));
    node.sync().await?;
    Vote::record(&node.datastore, &object_hash("chosen"), VoteSignal::Funding, VoteOutcome::Yes).await?;

    let decision = node.decide().await?;
    let SuperblockDecision::AlreadyDecided { mut rejected, .. } = decision else {
        panic!("expected a settled height, got {:?}", decision);
    };
    rejected.sort();
    let mut rivals = vec![object_hash("rival-a"), object_hash("rival-b")];
    rivals.sort();
    assert_eq!(rejected, rivals);

    let votes = node.daemon.votes();
    assert_eq!(votes.len(), 2);
    assert!(votes.iter().all(|v| v.signal == "funding" && v.outcome == "no"));
    assert!(node.daemon.submissions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_nodes_agree_on_canonical_superblock() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let payload = expected_payload(&proposals);
    let hashes = duplicate_hashes();

    let first = Node::new(devnet.daemon(Some(0)))?;
    let second = Node::new(devnet.daemon(Some(3)))?;
    add_proposals(&first.daemon, &proposals);
    add_proposals(&second.daemon, &proposals);
    for hash in &hashes {
        first.daemon.add_gobject(superblock_item(hash, &payload));
    }
    for hash in hashes.iter().rev() {
        second.daemon.add_gobject(superblock_item(hash, &payload));
    }

    let chosen = |decision: SuperblockDecision| match decision {
        SuperblockDecision::MatchFound { object_hash, .. } => Some(object_hash),
        _ => None,
    };
    let a = chosen(first.decide().await?);
    let b = chosen(second.decide().await?);
    assert_eq!(a, Some(hashes[2].clone()));
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn test_submitted_superblock_is_funded_by_peers() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let winner = Node::new(devnet.elected_daemon(100))?;
    let elected = devnet.elected_outpoint(100).unwrap();
    let peer_index = (0..5).find(|i| devnet.outpoint_of(*i).as_deref() != Some(elected.as_str())).unwrap();
    let peer = Node::new(devnet.daemon(Some(peer_index)))?;
    add_proposals(&winner.daemon, &proposals);
    add_proposals(&peer.daemon, &proposals);

    winner.decide().await?;
    let broadcast = winner.daemon.submissions().remove(0);
    winner.daemon.add_gobject(broadcast.clone());
    peer.daemon.add_gobject(broadcast.clone());

    for node in [&winner, &peer] {
        let decision = node.decide().await?;
        let SuperblockDecision::MatchFound { object_hash, funded, .. } = decision else {
            panic!("expected a match, got {:?}", decision);
        };
        assert_eq!(object_hash, broadcast["Hash"].as_str().unwrap());
        assert!(funded);
    }
    let synced = Superblock::find_by_hash(&peer.datastore, broadcast["Hash"].as_str().unwrap()).await?;
    assert_eq!(synced.unwrap().sb_hash, expected_payload(&proposals).sb_hash());
    Ok(())
}

#[tokio::test]
async fn test_plain_node_abstains() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let node = Node::new(devnet.daemon(None))?;
    add_proposals(&node.daemon, &proposals);
    for hash in duplicate_hashes() {
        node.daemon.add_gobject(superblock_item(&hash, &expected_payload(&proposals)));
    }

    assert_eq!(node.decide().await?, SuperblockDecision::NotMasternode);
    assert!(node.daemon.votes().is_empty());
    assert!(node.daemon.submissions().is_empty());
    assert_eq!(node.datastore.count_keys("/votes").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_refused_votes_are_retried_next_run() -> Result<()> {
    let devnet = Devnet::new();
    let proposals = funded_proposals(&devnet);
    let node = Node::new(devnet.daemon(Some(2)))?;
    add_proposals(&node.daemon, &proposals);
    let canonical = object_hash("only");
    node.daemon.add_gobject(superblock_item(&canonical, &expected_payload(&proposals)));
    node.daemon.update(|state| state.refuse_votes = true);

    let decision = node.decide().await?;
    assert!(matches!(decision, SuperblockDecision::MatchFound { funded: false, .. }));
    assert!(!Vote::exists(&node.datastore, &canonical, VoteSignal::Funding).await?);

    node.daemon.update(|state| state.refuse_votes = false);
    let decision = node.decide().await?;
    assert!(matches!(decision, SuperblockDecision::MatchFound { funded: true, .. }));
    assert_eq!(node.votes_for("funding").len(), 1);
    Ok(())
}
