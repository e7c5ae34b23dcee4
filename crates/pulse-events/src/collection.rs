//! Collection events.

use crate::user::User;
use pulse_bus::DomainEvent;
use serde::{Deserialize, Serialize};

/// A user interacted with a collection (bookmark, visit, share, ...).
///
/// The interaction kind stays a free-form label so new kinds can appear on
/// the wire without a consumer-side upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInteraction {
    pub collection_id: String,
    pub user: User,
    pub interaction: String,
}

impl DomainEvent for CollectionInteraction {
    const EVENT_TYPE: &'static str = "collection-interaction";
}
