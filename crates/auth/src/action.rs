use tenderflow_core::{BidAuthor, OrganizationId};

/// An operation an actor wants to perform, together with the ownership facts
/// the guard needs to decide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Read-only listing or status view.
    View,

    /// Create, edit, change status of, or roll back a tender owned by `organization`.
    ManageTender { organization: OrganizationId },

    /// Create, edit, change status of, or roll back a bid with the given author.
    ManageBid { author: &'a BidAuthor },

    /// Approve or reject a bid submitted against a tender of `tender_organization`.
    Decide {
        tender_organization: OrganizationId,
        author: &'a BidAuthor,
    },

    /// Inspect the bids of a tender and leave or read feedback on them.
    Review { tender_organization: OrganizationId },
}

impl Action<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::ManageTender { .. } => "manage_tender",
            Action::ManageBid { .. } => "manage_bid",
            Action::Decide { .. } => "decide",
            Action::Review { .. } => "review",
        }
    }
}

impl core::fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
