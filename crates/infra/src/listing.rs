//! Pagination and filters for read-only listings.

use serde::{Deserialize, Serialize};

use tenderflow_core::{DomainError, DomainResult};
use tenderflow_tenders::{ServiceType, TenderStatus, TenderView};

/// Offset pagination window.
///
/// Offsets are positions in a snapshot taken at call time; concurrent writes
/// between two calls may shift items across page boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    limit: usize,
    offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 5,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> DomainResult<Self> {
        if limit == 0 {
            return Err(DomainError::validation("page limit must be at least 1"));
        }
        Ok(Self { limit, offset })
    }

    /// Every item in one page.
    pub fn all() -> Self {
        Self {
            limit: usize::MAX,
            offset: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Lazily yield the `page` window of an already ordered snapshot.
pub fn paginate<T>(items: Vec<T>, page: Page) -> impl Iterator<Item = T> {
    items.into_iter().skip(page.offset).take(page.limit)
}

/// Public tender listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderFilter {
    /// Only `Published` can match; any other status yields an empty listing.
    #[serde(default)]
    pub status: Option<TenderStatus>,

    /// Empty means every service type.
    #[serde(default)]
    pub service_types: Vec<ServiceType>,
}

impl TenderFilter {
    pub fn matches(&self, tender: &TenderView) -> bool {
        if tender.status != TenderStatus::Published {
            return false;
        }
        if self.status.is_some_and(|s| s != tender.status) {
            return false;
        }
        self.service_types.is_empty() || self.service_types.contains(&tender.service_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tenderflow_core::{OrganizationId, TenderId};

    fn view(status: TenderStatus, service_type: ServiceType) -> TenderView {
        TenderView {
            id: TenderId::new(),
            organization_id: OrganizationId::new(),
            name: "t".to_string(),
            description: String::new(),
            service_type,
            status,
            version: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(matches!(Page::new(0, 0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn paginate_skips_then_takes() {
        let page = Page::new(2, 1).unwrap();
        let got: Vec<_> = paginate(vec![1, 2, 3, 4], page).collect();
        assert_eq!(got, vec![2, 3]);
        assert_eq!(paginate(vec![1], Page::new(3, 5).unwrap()).count(), 0);
    }

    #[test]
    fn filter_only_admits_published() {
        let any = TenderFilter::default();
        assert!(any.matches(&view(TenderStatus::Published, ServiceType::Delivery)));
        assert!(!any.matches(&view(TenderStatus::Closed, ServiceType::Delivery)));

        let closed = TenderFilter {
            status: Some(TenderStatus::Closed),
            ..TenderFilter::default()
        };
        assert!(!closed.matches(&view(TenderStatus::Closed, ServiceType::Delivery)));
    }

    #[test]
    fn filter_by_service_type() {
        let filter = TenderFilter {
            service_types: vec![ServiceType::Construction, ServiceType::Manufacture],
            ..TenderFilter::default()
        };
        assert!(filter.matches(&view(TenderStatus::Published, ServiceType::Manufacture)));
        assert!(!filter.matches(&view(TenderStatus::Published, ServiceType::Delivery)));
    }
}
