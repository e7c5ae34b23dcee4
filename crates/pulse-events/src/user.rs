//! User records and the events raised around them.

use pulse_bus::DomainEvent;
use serde::{Deserialize, Serialize};

/// Organisation a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: String,
    pub name: String,
}

/// A platform user as carried on event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub organisation: Option<Organisation>,
    /// Whether the account belongs to platform staff rather than a customer.
    pub is_staff: bool,
}

/// A user account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user: User,
}

impl DomainEvent for UserCreated {
    const EVENT_TYPE: &'static str = "user-created";
}

/// A user account changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdated {
    pub user: User,
    /// Organisation after the change, when one is assigned.
    pub organisation: Option<Organisation>,
}

impl DomainEvent for UserUpdated {
    const EVENT_TYPE: &'static str = "user-updated";
}
