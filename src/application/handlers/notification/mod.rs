//! Notification handlers.
//!
//! Turn room fanout events into live pushes for connected clients.

mod relay;

pub use relay::{channel_for_room, push_event_name, NotificationRelay};
