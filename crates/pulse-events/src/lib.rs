//! # Pulse Events - Domain Event Payload Catalogue
//!
//! Plain data records describing business occurrences, one stable identity
//! label per shape. Payloads carry no behavior; they exist to be published
//! on the bus and decoded by whoever subscribed.
//!
//! ## Forward Compatibility
//!
//! Every shape decodes tolerantly: unknown fields in an inbound payload
//! are ignored, so a producer can add fields before every consumer has
//! upgraded. The identity labels are load-bearing - renaming one breaks
//! in-flight subscriptions - so they are part of each type's contract.

pub mod collection;
pub mod order;
pub mod user;
pub mod video;

pub use collection::CollectionInteraction;
pub use order::{Order, OrderCreated, OrderItem};
pub use user::{Organisation, User, UserCreated, UserUpdated};
pub use video::{RetryVideoAnalysisRequested, VideoAdded, VideosInclusionInDownloadRequested};
