#![allow(dead_code)]

use std::sync::Arc;

use tenderflow_bids::{BidContent, BidPatch};
use tenderflow_core::{BidAuthor, BidId, OrganizationId, TenderId, Username};
use tenderflow_directory::{InMemoryDirectory, Organization, OrganizationType, User};
use tenderflow_infra::{ProcurementService, Settings, Stores};
use tenderflow_tenders::{ServiceType, TenderContent};

/// Buyer organization with three responsibles, a supplier with one, and a freelancer.
pub struct World {
    pub service: ProcurementService<Arc<InMemoryDirectory>>,
    pub directory: Arc<InMemoryDirectory>,
    pub buyer: OrganizationId,
    pub supplier: OrganizationId,
}

pub fn user(name: &str) -> Username {
    Username::new(name)
}

pub fn world() -> World {
    world_with(Settings::default())
}

pub fn world_with(settings: Settings) -> World {
    world_with_stores(settings, Stores::in_memory())
}

pub fn world_with_stores(settings: Settings, stores: Stores) -> World {
    let buyer = Organization::new("Buyer LLC", OrganizationType::Llc)
        .with_responsible("alice")
        .with_responsible("bob")
        .with_responsible("carol");
    let supplier = Organization::new("Supplier JSC", OrganizationType::Jsc).with_responsible("sam");
    let (buyer_id, supplier_id) = (buyer.id, supplier.id);

    let mut directory = InMemoryDirectory::new();
    for name in ["alice", "bob", "carol", "dave", "sam", "ivan"] {
        directory = directory.with_user(User::new(name));
    }
    let directory = Arc::new(
        directory
            .with_organization(buyer)
            .unwrap()
            .with_organization(supplier)
            .unwrap(),
    );

    World {
        service: ProcurementService::new(directory.clone(), stores, settings),
        directory,
        buyer: buyer_id,
        supplier: supplier_id,
    }
}

pub fn tender_content(name: &str) -> TenderContent {
    TenderContent {
        name: name.to_string(),
        description: "Build a bridge".to_string(),
        service_type: ServiceType::Construction,
    }
}

pub fn bid_content(name: &str) -> BidContent {
    BidContent {
        name: name.to_string(),
        description: "Cheap and fast".to_string(),
    }
}

pub fn rename_bid(name: &str) -> BidPatch {
    BidPatch {
        name: Some(name.to_string()),
        ..BidPatch::default()
    }
}

impl World {
    pub fn published_tender(&self, name: &str) -> TenderId {
        let alice = user("alice");
        let tender = self
            .service
            .create_tender(&alice, self.buyer, tender_content(name))
            .unwrap();
        self.service.publish_tender(&alice, tender.id).unwrap();
        tender.id
    }

    /// A published bid by the supplier organization on `tender`.
    pub fn published_bid(&self, tender: TenderId, name: &str) -> BidId {
        let sam = user("sam");
        let bid = self
            .service
            .create_bid(
                &sam,
                tender,
                BidAuthor::Organization(self.supplier),
                bid_content(name),
            )
            .unwrap();
        self.service.publish_bid(&sam, bid.id).unwrap();
        bid.id
    }
}
