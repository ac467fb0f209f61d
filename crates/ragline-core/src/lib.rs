//! Client-side core for a retrieval-augmented QA backend.
//!
//! Owns the conversation and ingestion state machines, the answer
//! segmentation used for display, and the trait boundaries behind which
//! the HTTP transport and the durable session store live. No UI and no
//! network code in this crate.

pub mod conversation;
pub mod error;
pub mod ingestion;
pub mod message;
pub mod render;
pub mod session;
pub mod transport;

// Re-export common error type
pub use error::RaglineError;

pub use conversation::{ConversationController, SendOutcome, SendState};
pub use ingestion::{IngestionController, UploadOutcome, UploadPhase, UploadStatus};
pub use message::{Message, MessageRole};
pub use render::{render, Segment};
pub use session::{InMemorySessionStore, SessionStore};
pub use transport::{
    AskRequest, AskResponse, DocumentPayload, QaTransport, TransportError, UploadReceipt,
};
