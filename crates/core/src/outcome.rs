use serde::{Deserialize, Serialize};

/// Final state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Ticket created and every attachment delivered.
    Complete,
    /// Ticket created, but one or more attachments failed.
    Partial,
    /// No ticket was created.
    Failed,
}

/// One attachment that could not be delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentFailure {
    /// Upload filename of the failed blob.
    pub file_name: String,
    /// Error text from the last attempted strategy.
    pub error: String,
}

/// Result of submitting a bug report, as presented to the caller.
///
/// A ticket that exists counts as success even when attachments failed; the
/// failures are listed so the caller can see what is missing. Only a creation
/// failure (or a pre-network gate) yields `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// Whether a ticket was created.
    pub success: bool,

    /// Identifier of the created conversation, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<u64>,

    /// Error text when no ticket was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Final state of the submission.
    pub status: SubmissionStatus,

    /// Attachments that could not be delivered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment_failures: Vec<AttachmentFailure>,
}

impl SubmissionOutcome {
    /// Ticket created, all attachments delivered.
    #[must_use]
    pub fn complete(conversation_id: u64) -> Self {
        Self {
            success: true,
            conversation_id: Some(conversation_id),
            error: None,
            status: SubmissionStatus::Complete,
            attachment_failures: Vec::new(),
        }
    }

    /// Ticket created, but some attachments failed.
    #[must_use]
    pub fn partial(conversation_id: u64, failures: Vec<AttachmentFailure>) -> Self {
        Self {
            success: true,
            conversation_id: Some(conversation_id),
            error: None,
            status: SubmissionStatus::Partial,
            attachment_failures: failures,
        }
    }

    /// No ticket was created.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            conversation_id: None,
            error: Some(error.into()),
            status: SubmissionStatus::Failed,
            attachment_failures: Vec::new(),
        }
    }

    /// Whether every attachment was delivered.
    pub fn is_complete(&self) -> bool {
        self.status == SubmissionStatus::Complete
    }
}
