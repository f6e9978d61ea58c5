//! Background task executor for thumbnail requests.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::events::{create_thumbnail_event_channel, ThumbnailEvent};
use crate::thumbnail::service::ThumbnailService;
use crate::thumbnail::ThumbnailSize;

/// Task for thumbnail generation.
#[derive(Debug, Clone)]
struct ThumbnailTask {
    id: String,
    size: Option<ThumbnailSize>,
}

/// Runs [`ThumbnailService`] requests on the blocking pool.
pub struct ThumbnailExecutor {
    task_tx: mpsc::UnboundedSender<ThumbnailTask>,
    event_tx: broadcast::Sender<ThumbnailEvent>,
}

impl ThumbnailExecutor {
    /// Create a new thumbnail executor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(service: Arc<ThumbnailService>) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let event_tx = create_thumbnail_event_channel();

        let event_tx_clone = event_tx.clone();

        // Spawn background worker
        tokio::spawn(async move {
            Self::worker_task(task_rx, event_tx_clone, service).await;
        });

        Self {
            task_tx,
            event_tx,
        }
    }

    /// Queue a thumbnail request.
    ///
    /// The result is delivered as a [`ThumbnailEvent`].
    pub fn request_thumbnail(
        &self,
        id: impl Into<String>,
        size: Option<ThumbnailSize>,
    ) -> Result<(), ThumbnailError> {
        let task = ThumbnailTask {
            id: id.into(),
            size,
        };

        self.task_tx
            .send(task)
            .map_err(|e| ThumbnailError::Unknown(format!("Failed to queue thumbnail task: {}", e)))?;

        Ok(())
    }

    /// Subscribe to thumbnail events.
    pub fn subscribe(&self) -> broadcast::Receiver<ThumbnailEvent> {
        self.event_tx.subscribe()
    }

    /// Background worker task that processes thumbnail requests.
    async fn worker_task(
        mut task_rx: mpsc::UnboundedReceiver<ThumbnailTask>,
        event_tx: broadcast::Sender<ThumbnailEvent>,
        service: Arc<ThumbnailService>,
    ) {
        while let Some(task) = task_rx.recv().await {
            let id = task.id.clone();
            let size = service.resolve_size(task.size);

            let worker_service = service.clone();
            let result = tokio::task::spawn_blocking(move || {
                worker_service.request_image(&task.id, task.size)
            })
            .await;

            let event = match result {
                Ok(Ok(thumbnail)) => ThumbnailEvent::Ready {
                    id,
                    size: thumbnail.size,
                    image: Arc::new(thumbnail.image),
                },
                Ok(Err(e)) => {
                    log::warn!("Thumbnail for {} failed: {}", id, e);
                    ThumbnailEvent::Failed {
                        id,
                        size,
                        error: e.to_string(),
                    }
                },
                Err(e) => ThumbnailEvent::Failed {
                    id,
                    size,
                    error: format!("Task execution error: {}", e),
                },
            };
            let _ = event_tx.send(event);
        }
        log::debug!("Thumbnail executor channel closed, worker exiting");
    }
}
