//! View-model layer: shared state publication and command execution for the item screen.

pub mod publisher;
pub mod view_model;

pub use publisher::{SharingPolicy, StatePublisher, StateSubscription, DEFAULT_GRACE_PERIOD};
pub use view_model::ItemViewModel;
