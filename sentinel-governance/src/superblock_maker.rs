use sentinel_datastore::models::{Payment, Proposal, SuperblockPayload};

/// Slack in seconds around a proposal's payment window when matching it
/// against the estimated superblock time.
pub const SUPERBLOCK_FUDGE_WINDOW: i64 = 60 * 60 * 2;

/// Builds the payload this node expects for the superblock at
/// `event_block_height`, or `None` when no proposal fits.
///
/// Proposals are taken in ranked order. One that would overflow the budget
/// is skipped and the walk continues with the next.
pub fn create_superblock(
    proposals: &[Proposal],
    event_block_height: u64,
    budget_max: u64,
    sb_epoch_time: i64,
) -> Option<SuperblockPayload> {
    let mut budget_allocated: u64 = 0;
    let mut payments = Vec::new();

    for proposal in proposals {
        let window_start = proposal.start_epoch.saturating_sub(SUPERBLOCK_FUDGE_WINDOW);
        let window_end = proposal.end_epoch.saturating_add(SUPERBLOCK_FUDGE_WINDOW);
        if sb_epoch_time < window_start || sb_epoch_time > window_end {
            log::debug!(
                "proposal {} outside payment window [{}, {}] at {}",
                proposal.name,
                window_start,
                window_end,
                sb_epoch_time
            );
            continue;
        }

        let allocated = budget_allocated.saturating_add(proposal.payment_amount);
        if allocated > budget_max {
            log::debug!(
                "proposal {} ({} duffs) exceeds remaining budget {}",
                proposal.name,
                proposal.payment_amount,
                budget_max - budget_allocated
            );
            continue;
        }
        budget_allocated = allocated;

        payments.push(Payment {
            address: proposal.payment_address.clone(),
            amount: proposal.payment_amount,
            proposal_hash: proposal.object_hash.clone(),
        });
    }

    if payments.is_empty() {
        log::debug!("no proposals selected for superblock {}", event_block_height);
        return None;
    }
    Some(SuperblockPayload::from_payments(event_block_height, &payments))
}
