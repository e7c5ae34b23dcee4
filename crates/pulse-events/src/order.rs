//! Order events, mirroring the legacy commerce system's wire shapes.

use pulse_bus::DomainEvent;
use serde::{Deserialize, Serialize};

/// One line item of an order.
///
/// Field names follow the legacy wire format, which is why some carry
/// explicit renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub uuid: String,
    pub asset_id: String,
    #[serde(rename = "date_created")]
    pub created_at: u64,
    #[serde(rename = "date_updated")]
    pub updated_at: u64,
    pub price_cents: u64,
    pub transcripts_required: bool,
    pub status: String,
}

/// An order as carried on event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: String,
    pub items: Vec<OrderItem>,
}

/// An order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order: Order,
}

impl DomainEvent for OrderCreated {
    const EVENT_TYPE: &'static str = "order-created";
}
