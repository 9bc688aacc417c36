//! Notification events: what can fire, what fired, and who listens.

pub mod bus;
pub mod info;
pub mod registry;

pub use bus::{EventBus, NotificationSink};
pub use info::{EventInfo, OpenAction};
pub use registry::{
    Event, EventRegistry, MAX_PRIORITY, TemplateRef, TokenSet, find_template_for_event,
    find_template_for_event_with,
};

/// Built-in event type identifiers.
pub mod kinds {
    pub const MASTER: &str = crate::theme::MASTER_TYPE;
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
    pub const FATAL: &str = "fatal";
}
