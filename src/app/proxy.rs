//! Defines an abstraction over the event sending mechanism.

use super::events::UserEvent;
use tokio::sync::mpsc::UnboundedSender;

/// A trait that abstracts the sending of user events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

/// The channel sender used by the command line front-end and by tests.
impl EventProxy for UnboundedSender<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // A dropped receiver means nobody is listening anymore; the run
        // still completes, so we only log it.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to deliver event, receiver dropped: {:?}", e.0);
        }
    }
}
