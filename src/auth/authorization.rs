use uuid::Uuid;

use crate::models::{bids, gigs};

/// Role of an actor relative to one gig (and optionally one of its bids).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GigRole {
    Owner,
    Bidder,
    Neither,
}

/// Resolve an actor's role from record snapshots.
///
/// Pure function, no side effects. The lifecycle engine calls this again
/// inside the hire transaction because the snapshot read before the
/// transaction started may be stale.
pub fn resolve_role(actor: Uuid, gig: &gigs::Model, bid: Option<&bids::Model>) -> GigRole {
    if gig.owner_id == actor {
        return GigRole::Owner;
    }
    if bid.is_some_and(|b| b.bidder_id == actor) {
        return GigRole::Bidder;
    }
    GigRole::Neither
}
