//! Event system for background thumbnail notifications.

use crate::thumbnail::ThumbnailSize;
use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events emitted by the thumbnail executor.
#[derive(Debug, Clone)]
pub enum ThumbnailEvent {
    /// A thumbnail is ready.
    Ready {
        /// Identifier the thumbnail was requested for.
        id: String,
        /// Size of the thumbnail.
        size: ThumbnailSize,
        /// The thumbnail itself.
        image: Arc<DynamicImage>,
    },
    /// Thumbnail generation failed. Consumers should show a placeholder.
    Failed {
        /// Identifier the thumbnail was requested for.
        id: String,
        /// Size that was requested.
        size: ThumbnailSize,
        /// Error that occurred.
        error: String,
    },
}

impl ThumbnailEvent {
    /// Identifier the event refers to.
    pub fn id(&self) -> &str {
        match self {
            ThumbnailEvent::Ready { id, .. } | ThumbnailEvent::Failed { id, .. } => id,
        }
    }
}

/// Create a new broadcast channel for thumbnail events.
pub fn create_thumbnail_event_channel() -> broadcast::Sender<ThumbnailEvent> {
    broadcast::channel(100).0 // Buffer up to 100 events
}
