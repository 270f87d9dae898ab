//! The gig/bid state machine.
//!
//! Every state-changing operation lives here, behind the same contract: all
//! preconditions are checked before any mutation, the first violated
//! precondition is returned, and no partial effect ever survives a failure.
//! Handlers stay thin and call into this module.

pub mod bids;
pub mod gigs;

pub use bids::{bids_for_gig, create_bid, hire_bid};
pub use gigs::{create_gig, delete_gig, update_gig};
