//! Ingestion controller.
//!
//! Owns the document-upload state machine:
//! `Idle --upload--> Uploading --success--> Success` /
//! `Uploading --failure--> Error`. Success and Error are terminal until
//! the next `upload` call; there is no automatic reset and no retry.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::transport::{DocumentPayload, QaTransport};

/// Phase of the upload state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// No document has been processed yet.
    Idle,
    /// A document has been dispatched to the ingestion service.
    Uploading,
    /// The last upload was indexed.
    Success,
    /// The last upload failed.
    Error,
}

/// Upload phase plus the human-readable status line a surface can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    pub phase: UploadPhase,
    pub message: String,
}

impl UploadStatus {
    fn idle() -> Self {
        Self {
            phase: UploadPhase::Idle,
            message: "No document processed yet.".to_string(),
        }
    }
}

/// What `upload` did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The upload ran to a terminal state (Success or Error).
    Uploaded,
    /// The path was missing or unreadable; nothing happened.
    MissingFile,
    /// An upload was already in flight; nothing happened.
    Busy,
}

/// File extensions the client suggests to the user.
///
/// Guidance only: `upload` sends whatever it is given and the backend
/// remains the authority on acceptance.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "md", "txt"];

/// Whether a path carries one of the suggested document extensions.
pub fn is_supported_document(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Drives document uploads to the ingestion service.
///
/// Independent of the conversation controller: an upload may proceed
/// while a send is in flight and vice versa.
pub struct IngestionController {
    transport: Arc<dyn QaTransport>,
    status_tx: watch::Sender<UploadStatus>,
}

impl IngestionController {
    /// Creates a controller in the idle state.
    pub fn new(transport: Arc<dyn QaTransport>) -> Self {
        let (status_tx, _) = watch::channel(UploadStatus::idle());
        Self {
            transport,
            status_tx,
        }
    }

    /// Uploads a document for indexing.
    ///
    /// An unreadable path is a silent validation rejection, and a second
    /// upload while one is in flight is deterministically rejected; both
    /// leave the status untouched. Transport failures of any kind end in
    /// [`UploadPhase::Error`] with a generic message; the backend does
    /// not guarantee a structured error payload, so no cause detail is
    /// surfaced. No error propagates out of this method.
    pub async fn upload(&self, path: impl AsRef<Path>) -> UploadOutcome {
        let path = path.as_ref();
        if self.status_tx.borrow().phase == UploadPhase::Uploading {
            return UploadOutcome::Busy;
        }

        let payload = match DocumentPayload::from_path(path).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "upload skipped: unreadable path");
                return UploadOutcome::MissingFile;
            }
        };

        // Check-and-set in one step so two tasks cannot both pass the guard.
        let engaged = self.status_tx.send_if_modified(|status| {
            if status.phase == UploadPhase::Uploading {
                false
            } else {
                *status = UploadStatus {
                    phase: UploadPhase::Uploading,
                    message: "Indexing document... this may take a few seconds.".to_string(),
                };
                true
            }
        });
        if !engaged {
            return UploadOutcome::Busy;
        }

        debug!(file = %payload.file_name, bytes = payload.bytes.len(), "dispatching upload");
        let status = match self.transport.upload_document(payload).await {
            Ok(receipt) => UploadStatus {
                phase: UploadPhase::Success,
                message: format!("Done! {} fragments indexed.", receipt.indexed_fragments),
            },
            Err(err) => {
                warn!(error = %err, "upload failed");
                UploadStatus {
                    phase: UploadPhase::Error,
                    message: "Could not process the document. Check that it is a valid PDF or Markdown file."
                        .to_string(),
                }
            }
        };
        self.status_tx.send_replace(status);

        UploadOutcome::Uploaded
    }

    /// Returns the current upload status.
    pub fn status(&self) -> UploadStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribes to upload status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<UploadStatus> {
        self.status_tx.subscribe()
    }
}
