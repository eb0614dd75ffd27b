use serde::{Deserialize, Serialize};

use crate::id::{OrganizationId, Username};

/// Party that submitted a bid: an organization or an individual user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "authorType", content = "authorId")]
pub enum BidAuthor {
    Organization(OrganizationId),
    User(Username),
}

impl BidAuthor {
    pub fn organization(&self) -> Option<OrganizationId> {
        match self {
            BidAuthor::Organization(id) => Some(*id),
            BidAuthor::User(_) => None,
        }
    }
}

impl core::fmt::Display for BidAuthor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BidAuthor::Organization(id) => write!(f, "organization:{id}"),
            BidAuthor::User(name) => write!(f, "user:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_serializes_with_type_tag() {
        let json = serde_json::to_value(BidAuthor::User(Username::new("bob"))).unwrap();
        assert_eq!(json["authorType"], "User");
        assert_eq!(json["authorId"], "bob");
    }
}
