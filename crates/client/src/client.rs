//! HTTP client for the helpdesk REST API.
//!
//! Holds the credentials and the connection pool, creates conversations, and
//! probes connectivity. Attachment delivery lives in [`crate::attach`] as a
//! second `impl` block on [`HelpdeskClient`].

use std::time::Duration;

use bugrelay_core::BugReport;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::body;
use crate::config::HelpdeskConfig;
use crate::error::HelpdeskError;
use crate::types::{
    ConversationEnvelope, CustomerIdentity, FALLBACK_CUSTOMER_EMAIL, NewConversation, NewThread,
};

/// Header carrying the API key on every request.
const HEADER_API_KEY: &str = "X-FreeScout-API-Key";

/// Statuses that mean "this endpoint shape does not exist here"; creation
/// moves on to the next candidate URL instead of failing.
const SHAPE_MISMATCH_STATUSES: [u16; 2] = [404, 405];

/// Client for a single helpdesk instance.
pub struct HelpdeskClient {
    pub(crate) config: HelpdeskConfig,
    pub(crate) client: Client,
}

impl HelpdeskClient {
    /// Create a client with the given configuration.
    ///
    /// Uses a default `reqwest::Client` with a 30 second request timeout.
    pub fn new(config: HelpdeskConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    /// Create a client with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool.
    pub fn with_client(config: HelpdeskConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    /// Absolute URL for an API path.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint)
    }

    /// POST request builder with the API key header applied.
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header(HEADER_API_KEY, &self.config.api_key)
    }

    /// Email used as the reporter identity on conversations and threads.
    pub(crate) fn reporter_email(&self) -> &str {
        self.config
            .default_assignee
            .as_deref()
            .unwrap_or(FALLBACK_CUSTOMER_EMAIL)
    }

    /// Fail fast when endpoint, API key, or mailbox id is missing. Called
    /// before any network traffic.
    pub(crate) fn ensure_configured(&self) -> Result<(), HelpdeskError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(HelpdeskError::Configuration(
                "endpoint, API key, and mailbox id must all be set".into(),
            ))
        }
    }

    fn mailbox_id(&self) -> Result<u64, HelpdeskError> {
        self.config.mailbox_id.trim().parse().map_err(|_| {
            HelpdeskError::Configuration(format!(
                "mailbox id '{}' is not a number",
                self.config.mailbox_id
            ))
        })
    }

    /// Candidate endpoints for conversation creation, in preference order.
    ///
    /// A single canonical path today; server variants that move it get
    /// appended here.
    fn creation_candidates(&self) -> Vec<String> {
        vec![self.api_url("/api/conversations")]
    }

    fn conversation_payload(&self, report: &BugReport) -> Result<NewConversation, HelpdeskError> {
        let email = self.reporter_email().to_owned();
        let text = body::conversation_body(report)?;
        Ok(NewConversation {
            mailbox_id: self.mailbox_id()?,
            subject: report.title.clone(),
            conversation_type: "email".to_owned(),
            status: "active".to_owned(),
            customer: CustomerIdentity::reporter(&email),
            threads: vec![NewThread::customer(text, &email)],
            imported: false,
            created_by: "customer".to_owned(),
            tags: report.tags(),
        })
    }

    /// Create a conversation for the report and return its id.
    ///
    /// Tries each candidate endpoint in order. A 404/405 or an unrecognized
    /// response envelope advances to the next candidate; any other non-success
    /// status fails immediately. When every candidate is exhausted the error
    /// lists all attempted URLs and the last observed failure.
    #[instrument(skip(self, report), fields(subject = %report.title))]
    pub async fn create_conversation(&self, report: &BugReport) -> Result<u64, HelpdeskError> {
        self.ensure_configured()?;
        let payload = self.conversation_payload(report)?;

        let candidates = self.creation_candidates();
        let mut last_error = String::new();

        for url in &candidates {
            debug!(%url, "creating conversation");
            let response = self.post(url).json(&payload).send().await?;
            let status = response.status();

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                if SHAPE_MISMATCH_STATUSES.contains(&status.as_u16()) {
                    warn!(
                        %url,
                        status = status.as_u16(),
                        "creation endpoint missing, trying next candidate"
                    );
                    last_error = format!("HTTP {status}: {text}");
                    continue;
                }
                return Err(HelpdeskError::Api {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let text = response.text().await?;
            if let Ok(envelope) = serde_json::from_str::<ConversationEnvelope>(&text)
                && let Some(id) = envelope.conversation_id()
            {
                debug!(conversation_id = id, "conversation created");
                return Ok(id);
            }
            warn!(%url, "unrecognized creation response, trying next candidate");
            last_error = HelpdeskError::UnrecognizedEnvelope(text).to_string();
        }

        Err(HelpdeskError::CreationExhausted {
            attempted: candidates,
            last_error,
        })
    }

    /// Probe the helpdesk by fetching the configured mailbox.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> Result<(), HelpdeskError> {
        self.ensure_configured()?;
        let url = self.api_url(&format!("/api/mailboxes/{}", self.config.mailbox_id.trim()));

        debug!(%url, "testing helpdesk connectivity");

        let response = self
            .client
            .get(&url)
            .header(HEADER_API_KEY, &self.config.api_key)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HelpdeskError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// A minimal mock HTTP server built on tokio that replays scripted responses.
///
/// Shared by the conversation, attachment, and submission tests; each
/// scripted entry serves exactly one request.
#[cfg(test)]
pub(crate) mod mock {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    pub(crate) struct MockHelpdeskServer {
        listener: TcpListener,
        pub(crate) base_url: String,
    }

    impl MockHelpdeskServer {
        pub(crate) async fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        /// Accept one connection and respond with the given status and JSON
        /// body, then shut down.
        pub(crate) async fn respond_once(self, status_code: u16, body: &str) {
            self.respond_sequence(vec![(status_code, body.to_owned())])
                .await;
        }

        /// Serve a scripted sequence of responses, one connection per entry.
        pub(crate) async fn respond_sequence(self, responses: Vec<(u16, String)>) {
            for (status_code, body) in responses {
                let (mut stream, _) = self.listener.accept().await.unwrap();
                read_request(&mut stream).await;

                let response = format!(
                    "HTTP/1.1 {status_code} OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
        }
    }

    /// Drain a full request: read until the header terminator, then consume
    /// `Content-Length` bytes of body. Multipart uploads run to megabytes, so
    /// a single fixed-size read is not enough.
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = vec![0u8; 65536];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let mut body_read = buf.len() - (header_end + 4);
        while body_read < content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            body_read += n;
        }
    }
}
