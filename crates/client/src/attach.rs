//! Attachment delivery via an ordered chain of fallback strategies.
//!
//! Helpdesk deployments differ in which upload endpoints and payload shapes
//! they accept, so a single request shape cannot be relied on. Each strategy
//! here owns a policy table of statuses that mean "try my next variant";
//! anything outside that table abandons the strategy and the chain moves on.
//! The chain stops at the first success and reports every attempted strategy
//! when it runs out.

use bugrelay_core::MediaBlob;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::body;
use crate::client::HelpdeskClient;
use crate::error::HelpdeskError;
use crate::types::{AttachmentUploadEnvelope, InlineAttachment, NewThread};

/// Statuses that advance `json-thread` to its next author role.
const JSON_THREAD_RETRY: [u16; 2] = [400, 422];

/// Statuses that advance `multipart-thread` to its next field/identity
/// combination.
const MULTIPART_RETRY: [u16; 4] = [400, 404, 405, 422];

/// Statuses that advance `global-upload` to its next link payload shape.
const LINK_SHAPE_RETRY: [u16; 3] = [400, 404, 422];

/// Legacy-endpoint statuses that mean the endpoint itself is absent; the one
/// case where the inline data-URL fallback is worth trying.
const INLINE_FALLBACK_TRIGGER: [u16; 2] = [404, 405];

/// Size ceiling for the inline data-URL fallback (2 MB); a stricter
/// threshold than the overall submission limit.
pub const INLINE_FALLBACK_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Form field names servers accept for the file part of a multipart thread,
/// in preference order.
const MULTIPART_FIELD_NAMES: [&str; 4] = ["attachments[]", "attachments", "files[]", "file"];

/// Name of the data-URL fallback in logs and exhaustion errors.
const INLINE_LINK_NAME: &str = "inline-link";

/// The chained strategies for non-image blobs, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrategyKind {
    JsonThread,
    MultipartThread,
    GlobalUpload,
    LegacyAttachment,
}

impl StrategyKind {
    /// Name used in logs and exhaustion errors.
    fn name(self) -> &'static str {
        match self {
            Self::JsonThread => "json-thread",
            Self::MultipartThread => "multipart-thread",
            Self::GlobalUpload => "global-upload",
            Self::LegacyAttachment => "legacy-attachment",
        }
    }
}

/// Fallback order for non-image blobs. The inline data-URL fallback is not a
/// chain member; it runs only when the legacy endpoint is absent and the blob
/// fits under [`INLINE_FALLBACK_MAX_BYTES`].
const CHAIN: [StrategyKind; 4] = [
    StrategyKind::JsonThread,
    StrategyKind::MultipartThread,
    StrategyKind::GlobalUpload,
    StrategyKind::LegacyAttachment,
];

/// Two ways servers expect the author identity in a multipart thread.
#[derive(Debug, Clone, Copy)]
enum IdentityEncoding {
    /// `customer[email]` as a flat text field.
    Flat,
    /// `customer` as a JSON-encoded text field.
    Json,
}

/// Outcome of a single request attempt, before strategy policy is applied.
enum Attempt {
    /// 2xx with the parsed response body.
    Success(Value),
    /// Non-2xx status with a formatted error.
    Status(u16, String),
    /// Transport-level failure (connection, TLS, timeout).
    Transport(String),
}

/// Why a strategy gave up. The last observed status feeds the legacy
/// fallback gate.
#[derive(Debug, Default)]
struct StrategyFailure {
    error: String,
    last_status: Option<u16>,
}

impl StrategyFailure {
    fn status(status: u16, error: String) -> Self {
        Self {
            error,
            last_status: Some(status),
        }
    }

    fn local(error: String) -> Self {
        Self {
            error,
            last_status: None,
        }
    }
}

/// Send one request and classify the outcome.
async fn send_attempt(request: reqwest::RequestBuilder) -> Attempt {
    match request.send().await {
        Ok(response) => {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status.is_success() {
                Attempt::Success(parse_response_body(&text))
            } else {
                Attempt::Status(status.as_u16(), format!("HTTP {status}: {text}"))
            }
        }
        Err(err) => Attempt::Transport(err.to_string()),
    }
}

/// Parse a response body as JSON; non-JSON bodies are wrapped verbatim.
fn parse_response_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

fn extract_attachment_id(uploaded: &Value) -> Option<u64> {
    serde_json::from_value::<AttachmentUploadEnvelope>(uploaded.clone())
        .ok()
        .and_then(|envelope| envelope.attachment_id())
}

/// The three thread shapes servers accept for referencing an uploaded
/// attachment, in preference order.
fn link_shapes(attachment_id: u64, note: &str, email: &str) -> [Value; 3] {
    [
        json!({
            "type": "customer",
            "text": note,
            "customer": { "email": email },
            "attachments": [attachment_id],
        }),
        json!({
            "type": "customer",
            "text": note,
            "customer": { "email": email },
            "attachments": [{ "id": attachment_id }],
        }),
        json!({
            "type": "customer",
            "text": note,
            "customer": { "email": email },
            "attachmentIds": [attachment_id],
        }),
    ]
}

impl HelpdeskClient {
    /// URL of the thread-append endpoint for a conversation.
    fn threads_url(&self, conversation_id: u64) -> String {
        self.api_url(&format!("/api/conversations/{conversation_id}/threads"))
    }

    /// Deliver one blob to a conversation.
    ///
    /// Images take the inline fast path only: a single thread embedding the
    /// image as a `data:` URI, whose success or failure ends the call. For
    /// everything else the strategies run in fixed order, stopping at the
    /// first success. When the legacy endpoint turns out to be absent and the
    /// blob is small enough, a final inline data-URL link is attempted.
    /// Exhaustion reports every attempted strategy and the last error seen.
    #[instrument(
        skip(self, blob, description),
        fields(file = %blob.upload_file_name(), size = blob.len())
    )]
    pub async fn attach_file(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        description: &str,
    ) -> Result<Value, HelpdeskError> {
        self.ensure_configured()?;

        if blob.is_image() {
            debug!("image blob, taking the inline fast path");
            return self
                .inline_image_thread(conversation_id, blob, description)
                .await;
        }

        let note = body::attachment_note(description, blob)?;
        let mut attempted = Vec::new();
        let mut last_error = String::new();
        let mut legacy_status = None;

        for strategy in CHAIN {
            attempted.push(strategy.name());
            let outcome = match strategy {
                StrategyKind::JsonThread => self.json_thread(conversation_id, blob, &note).await,
                StrategyKind::MultipartThread => {
                    self.multipart_thread(conversation_id, blob, &note).await
                }
                StrategyKind::GlobalUpload => {
                    self.global_upload(conversation_id, blob, &note).await
                }
                StrategyKind::LegacyAttachment => {
                    self.legacy_attachment(conversation_id, blob).await
                }
            };
            match outcome {
                Ok(response) => {
                    debug!(strategy = strategy.name(), "attachment delivered");
                    return Ok(response);
                }
                Err(failure) => {
                    warn!(
                        strategy = strategy.name(),
                        error = %failure.error,
                        "strategy failed, falling through"
                    );
                    if strategy == StrategyKind::LegacyAttachment {
                        legacy_status = failure.last_status;
                    }
                    last_error = failure.error;
                }
            }
        }

        let legacy_missing =
            legacy_status.is_some_and(|status| INLINE_FALLBACK_TRIGGER.contains(&status));
        if legacy_missing && blob.len() <= INLINE_FALLBACK_MAX_BYTES {
            attempted.push(INLINE_LINK_NAME);
            match self.inline_link(conversation_id, blob, description).await {
                Ok(response) => {
                    debug!(strategy = INLINE_LINK_NAME, "attachment delivered");
                    return Ok(response);
                }
                Err(failure) => last_error = failure.error,
            }
        }

        Err(HelpdeskError::AttachmentExhausted {
            file_name: blob.upload_file_name(),
            attempted,
            last_error,
        })
    }

    /// Fast path for images: one thread embedding the blob as a `data:` URI.
    /// Errors propagate directly; no other strategy runs for images.
    async fn inline_image_thread(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        description: &str,
    ) -> Result<Value, HelpdeskError> {
        let url = self.threads_url(conversation_id);
        let text = body::inline_image_thread(description, blob)?;
        let thread = NewThread::customer(text, self.reporter_email());

        debug!(%url, "posting inline image thread");

        let response = self.post(&url).json(&thread).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HelpdeskError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        let text = response.text().await?;
        Ok(parse_response_body(&text))
    }

    /// Thread JSON carrying the file base64-encoded in an `attachments`
    /// array, tried with the `customer` then `message` author role.
    async fn json_thread(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        note: &str,
    ) -> Result<Value, StrategyFailure> {
        let url = self.threads_url(conversation_id);
        let attachment = InlineAttachment {
            file_name: blob.upload_file_name(),
            mime_type: blob.content_type.clone(),
            data: blob.to_base64(),
        };

        let mut failure = StrategyFailure::default();
        for role in ["customer", "message"] {
            debug!(%url, role, "posting JSON thread with base64 attachment");
            let thread = NewThread::customer(note, self.reporter_email())
                .with_role(role)
                .with_attachments(vec![attachment.clone()]);
            match send_attempt(self.post(&url).json(&thread)).await {
                Attempt::Success(response) => return Ok(response),
                Attempt::Status(status, error) if JSON_THREAD_RETRY.contains(&status) => {
                    failure = StrategyFailure::status(status, error);
                }
                Attempt::Status(status, error) => {
                    return Err(StrategyFailure::status(status, error));
                }
                Attempt::Transport(error) => return Err(StrategyFailure::local(error)),
            }
        }
        Err(failure)
    }

    /// Multipart thread upload, crossing file field names with identity
    /// encodings until one combination lands.
    async fn multipart_thread(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        note: &str,
    ) -> Result<Value, StrategyFailure> {
        let url = self.threads_url(conversation_id);

        let mut failure = StrategyFailure::default();
        for field_name in MULTIPART_FIELD_NAMES {
            for identity in [IdentityEncoding::Flat, IdentityEncoding::Json] {
                debug!(%url, field_name, ?identity, "posting multipart thread");
                let form = self
                    .multipart_thread_form(field_name, identity, note, blob)
                    .map_err(|e| StrategyFailure::local(e.to_string()))?;
                match send_attempt(self.post(&url).multipart(form)).await {
                    Attempt::Success(response) => return Ok(response),
                    Attempt::Status(status, error) if MULTIPART_RETRY.contains(&status) => {
                        failure = StrategyFailure::status(status, error);
                    }
                    Attempt::Status(status, error) => {
                        return Err(StrategyFailure::status(status, error));
                    }
                    Attempt::Transport(error) => return Err(StrategyFailure::local(error)),
                }
            }
        }
        Err(failure)
    }

    fn multipart_thread_form(
        &self,
        field_name: &str,
        identity: IdentityEncoding,
        note: &str,
        blob: &MediaBlob,
    ) -> Result<Form, HelpdeskError> {
        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.upload_file_name())
            .mime_str(&blob.content_type)?;
        let form = Form::new()
            .text("type", "customer")
            .text("text", note.to_owned());
        let form = match identity {
            IdentityEncoding::Flat => {
                form.text("customer[email]", self.reporter_email().to_owned())
            }
            IdentityEncoding::Json => form.text(
                "customer",
                json!({ "email": self.reporter_email() }).to_string(),
            ),
        };
        Ok(form.part(field_name.to_owned(), part))
    }

    /// Upload to the mailbox-independent attachment endpoint, then link the
    /// returned id into the conversation, trying each known link shape.
    async fn global_upload(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        note: &str,
    ) -> Result<Value, StrategyFailure> {
        let upload_url = self.api_url("/api/attachments");
        debug!(%upload_url, "uploading to global attachment endpoint");

        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.upload_file_name())
            .mime_str(&blob.content_type)
            .map_err(|e| StrategyFailure::local(e.to_string()))?;
        let form = Form::new().part("file", part);

        let uploaded = match send_attempt(self.post(&upload_url).multipart(form)).await {
            Attempt::Success(response) => response,
            Attempt::Status(status, error) => return Err(StrategyFailure::status(status, error)),
            Attempt::Transport(error) => return Err(StrategyFailure::local(error)),
        };

        let Some(attachment_id) = extract_attachment_id(&uploaded) else {
            return Err(StrategyFailure::local(
                HelpdeskError::UnrecognizedEnvelope(uploaded.to_string()).to_string(),
            ));
        };

        debug!(attachment_id, "upload accepted, linking into conversation");

        let url = self.threads_url(conversation_id);
        let mut failure = StrategyFailure::default();
        for shape in link_shapes(attachment_id, note, self.reporter_email()) {
            match send_attempt(self.post(&url).json(&shape)).await {
                Attempt::Success(response) => return Ok(response),
                Attempt::Status(status, error) if LINK_SHAPE_RETRY.contains(&status) => {
                    failure = StrategyFailure::status(status, error);
                }
                Attempt::Status(status, error) => {
                    return Err(StrategyFailure::status(status, error));
                }
                Attempt::Transport(error) => return Err(StrategyFailure::local(error)),
            }
        }
        Err(failure)
    }

    /// Multipart POST to the conversation-scoped attachment endpoint kept by
    /// older server versions.
    async fn legacy_attachment(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
    ) -> Result<Value, StrategyFailure> {
        let url = self.api_url(&format!("/api/conversations/{conversation_id}/attachments"));
        debug!(%url, "posting to legacy attachment endpoint");

        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.upload_file_name())
            .mime_str(&blob.content_type)
            .map_err(|e| StrategyFailure::local(e.to_string()))?;
        let form = Form::new().part("file", part);

        match send_attempt(self.post(&url).multipart(form)).await {
            Attempt::Success(response) => Ok(response),
            Attempt::Status(status, error) => Err(StrategyFailure::status(status, error)),
            Attempt::Transport(error) => Err(StrategyFailure::local(error)),
        }
    }

    /// Last resort for small blobs: a thread whose text carries the whole
    /// file as a `data:` download link.
    async fn inline_link(
        &self,
        conversation_id: u64,
        blob: &MediaBlob,
        description: &str,
    ) -> Result<Value, StrategyFailure> {
        let url = self.threads_url(conversation_id);
        debug!(%url, "posting inline data-URL link thread");

        let text = body::inline_link_thread(description, blob)
            .map_err(|e| StrategyFailure::local(e.to_string()))?;
        let thread = NewThread::customer(text, self.reporter_email());

        match send_attempt(self.post(&url).json(&thread)).await {
            Attempt::Success(response) => Ok(response),
            Attempt::Status(status, error) => Err(StrategyFailure::status(status, error)),
            Attempt::Transport(error) => Err(StrategyFailure::local(error)),
        }
    }
}
