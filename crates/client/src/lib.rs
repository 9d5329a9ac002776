//! Helpdesk REST client for the bugrelay reporting tools.
//!
//! Creates support conversations from [`BugReport`](bugrelay_core::BugReport)
//! values and delivers captured media through an ordered chain of fallback
//! upload strategies, because helpdesk deployments differ in which endpoints
//! and payload shapes they accept.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bugrelay_client::{HelpdeskClient, HelpdeskConfig};
//! use bugrelay_core::{BugReport, MediaBlob, Priority};
//!
//! # async fn example() {
//! let config = HelpdeskConfig::new("https://desk.example.com", "api-key", "3")
//!     .with_default_assignee("bugs@example.com");
//! let client = HelpdeskClient::new(config);
//!
//! let report = BugReport::new("Crash on save", "Clicking save freezes the page")
//!     .with_priority(Priority::High)
//!     .with_page_url("https://app.example.com/checkout");
//! let screenshot = MediaBlob::new(std::fs::read("shot.png").unwrap(), "image/png");
//!
//! let outcome = client.submit(&report, Some(&screenshot), &[]).await;
//! println!("created conversation {:?}", outcome.conversation_id);
//! # }
//! ```

pub mod attach;
pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod submit;
pub mod types;

pub use attach::INLINE_FALLBACK_MAX_BYTES;
pub use client::HelpdeskClient;
pub use config::{DEFAULT_MAX_FILE_SIZE, HelpdeskConfig};
pub use error::HelpdeskError;
pub use types::{
    AttachmentUploadEnvelope, ConversationEnvelope, CustomerIdentity, InlineAttachment,
    NewConversation, NewThread,
};
