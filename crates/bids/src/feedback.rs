use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenderflow_core::{BidId, DomainError, DomainResult, Username};

/// Free-text review left on a bid by a responsible of the tender's organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidFeedback {
    pub id: Uuid,
    pub bid_id: BidId,
    pub author: Username,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl BidFeedback {
    pub fn new(
        bid_id: BidId,
        author: Username,
        comment: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let comment = comment.into();
        if comment.trim().is_empty() {
            return Err(DomainError::validation("feedback must not be empty"));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            bid_id,
            author,
            comment,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_feedback_is_rejected() {
        let err = BidFeedback::new(BidId::new(), "anna".into(), "   ", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn feedback_serializes_camel_case() {
        let fb = BidFeedback::new(BidId::new(), "anna".into(), "too pricey", Utc::now()).unwrap();
        let json = serde_json::to_value(&fb).unwrap();
        assert_eq!(json["comment"], "too pricey");
        assert!(json.get("createdAt").is_some());
    }
}
