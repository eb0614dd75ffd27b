//! Bids domain module: the bid aggregate plus its decisions and feedback.
//!
//! Pure domain logic; stores and locking live in `tenderflow-infra`.

pub mod bid;
pub mod decision;
pub mod feedback;

pub use bid::{
    Bid, BidCommand, BidContent, BidCreated, BidEvent, BidPatch, BidStatus, BidStatusChanged,
    BidVersion, BidVersionAppended, BidView, ChangeBidStatus, CreateBid, EditBid, ResolveBid,
    RollbackBid,
};
pub use decision::{Decision, QuorumPolicy, RejectionRule, Tally, Verdict};
pub use feedback::BidFeedback;
