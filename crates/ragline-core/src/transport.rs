//! Transport boundary between the controllers and the QA backend.
//!
//! Defines the two backend operations as a trait so the controllers can be
//! exercised against scripted fakes, and so the HTTP adapter stays an
//! implementation detail. Wire paths and field casing belong to the
//! adapter, not to these types.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// A question on its way to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    /// The user's question, verbatim.
    pub question: String,
    /// Opaque identifier correlating this client's turns on the backend.
    pub session_id: String,
}

/// The backend's answer plus the fragments used to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    /// Markdown answer text.
    pub answer: String,
    /// Supporting document fragments; empty when the backend sent none.
    pub source_fragments: Vec<String>,
}

/// A document on its way to the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    /// Original file name, shown back by the backend in listings.
    pub file_name: String,
    /// MIME type guessed from the file name.
    pub content_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl DocumentPayload {
    /// Reads a file into an upload payload, guessing its MIME type from
    /// the path.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// The ingestion service's acknowledgement of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Number of fragments the backend split and indexed the document into.
    pub indexed_fragments: u64,
}

/// Errors from the transport adapter.
///
/// The controllers collapse all variants into one generic user-facing
/// message per operation; the split exists so a future backend with a
/// structured error surface only changes the adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced an HTTP response.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The backend answered with a non-success status.
    #[error("backend returned status {code}: {message}")]
    Status { code: u16, message: String },
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The two operations the QA backend exposes.
///
/// # Implementation Notes
///
/// Implementations should not retry: a failed operation is reported once
/// and re-initiated only by the user.
#[async_trait]
pub trait QaTransport: Send + Sync {
    /// Sends a question and returns the answer with its source fragments.
    ///
    /// # Returns
    ///
    /// - `Ok(AskResponse)`: The backend produced an answer
    /// - `Err(_)`: The request failed or the response was undecodable
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, TransportError>;

    /// Sends a document to the ingestion service.
    ///
    /// # Returns
    ///
    /// - `Ok(UploadReceipt)`: The document was split and indexed
    /// - `Err(_)`: The upload failed or was rejected
    async fn upload_document(
        &self,
        document: DocumentPayload,
    ) -> Result<UploadReceipt, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn payload_from_path_reads_bytes_and_guesses_mime() {
        let mut file = tempfile::Builder::new()
            .prefix("notes")
            .suffix(".md")
            .tempfile()
            .unwrap();
        file.write_all(b"# heading").unwrap();

        let payload = DocumentPayload::from_path(file.path()).await.unwrap();
        assert_eq!(payload.bytes, b"# heading");
        assert!(payload.file_name.ends_with(".md"));
        assert_eq!(payload.content_type, "text/markdown");
    }

    #[tokio::test]
    async fn payload_from_missing_path_is_an_io_error() {
        let result = DocumentPayload::from_path("/nonexistent/quarterly.pdf").await;
        assert!(result.is_err());
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::Status {
            code: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned status 500: boom");

        let err = TransportError::Connect("refused".to_string());
        assert_eq!(err.to_string(), "connection failed: refused");
    }
}
