//! Defines the events sent from background tasks to the presentation layer.

use crate::core::CopyEvent;

/// Events delivered to whatever front-end drives a copy run.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// An event from the running copy pass, in traversal order.
    Copy(CopyEvent),
    /// An error message to be displayed to the user, e.g. a missing folder.
    ShowError(String),
}

impl From<CopyEvent> for UserEvent {
    fn from(event: CopyEvent) -> Self {
        UserEvent::Copy(event)
    }
}
