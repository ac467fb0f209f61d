//! HTTP adapter for the QA backend.
//!
//! Implements the transport trait against the backend's REST surface.
//! Wire paths and field casing live here and nowhere else.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragline_core::error::RaglineError;
use ragline_core::transport::{
    AskRequest, AskResponse, DocumentPayload, QaTransport, TransportError, UploadReceipt,
};

use crate::config::BackendConfig;

/// Transport adapter that talks to the QA backend over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates an adapter from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, RaglineError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| RaglineError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates an adapter for the given base URL with default settings.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RaglineError> {
        Self::new(&BackendConfig {
            base_url: base_url.into(),
            request_timeout_secs: None,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

// Wire DTOs. The backend speaks the original service's field names.

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    pergunta: &'a str,
    session_id: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    resposta: String,
    // Absent in the backend's no-context reply.
    #[serde(default)]
    fontes_utilizadas: Vec<String>,
}

#[derive(Deserialize)]
struct UploadResponseBody {
    chunks_criados: u64,
}

// FastAPI wraps error text in a detail field.
#[derive(Deserialize)]
struct ErrorResponseBody {
    detail: String,
}

#[async_trait]
impl QaTransport for HttpBackend {
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, TransportError> {
        let url = self.endpoint("chat/");
        debug!(url = %url, "ask request");
        let response = self
            .client
            .post(&url)
            .json(&ChatRequestBody {
                pergunta: &request.question,
                session_id: &request.session_id,
            })
            .send()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let response = require_success(response).await?;
        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;

        Ok(AskResponse {
            answer: body.resposta,
            source_fragments: body.fontes_utilizadas,
        })
    }

    async fn upload_document(
        &self,
        document: DocumentPayload,
    ) -> Result<UploadReceipt, TransportError> {
        let url = self.endpoint("docs/upload");
        debug!(url = %url, file = %document.file_name, "upload request");
        let part = multipart::Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(&document.content_type)
            .map_err(|err| TransportError::Connect(format!("invalid content type: {err}")))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let response = require_success(response).await?;
        let body: UploadResponseBody = response
            .json()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;

        Ok(UploadReceipt {
            indexed_fragments: body.chunks_criados,
        })
    }
}

async fn require_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body_text = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    let message = serde_json::from_str::<ErrorResponseBody>(&body_text)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body_text);
    Err(TransportError::Status {
        code: status.as_u16(),
        message,
    })
}
