use serde::{Deserialize, Serialize};

/// Fallback reporter address used when no assignee email is configured.
pub const FALLBACK_CUSTOMER_EMAIL: &str = "bugs@system.local";

/// Customer identity attached to conversations and threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdentity {
    /// Customer email address.
    pub email: String,

    /// First name, sent only on conversation creation.
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name, sent only on conversation creation.
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl CustomerIdentity {
    /// Full identity used for the conversation-level customer record.
    #[must_use]
    pub fn reporter(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: Some("Bug".to_owned()),
            last_name: Some("Reporter".to_owned()),
        }
    }

    /// Minimal identity used inside thread payloads.
    #[must_use]
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }
}

/// A base64-encoded file carried inside a thread payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineAttachment {
    /// Filename presented to the helpdesk.
    #[serde(rename = "fileName")]
    pub file_name: String,

    /// MIME content type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,

    /// Base64-encoded content.
    pub data: String,
}

/// A message appended to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThread {
    /// Author role (`"customer"` or `"message"`).
    #[serde(rename = "type")]
    pub thread_type: String,

    /// HTML body of the thread.
    pub text: String,

    /// Author identity.
    pub customer: CustomerIdentity,

    /// Inline file payloads, when the strategy carries them in JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<InlineAttachment>>,
}

impl NewThread {
    /// A customer-authored thread with the given HTML text.
    #[must_use]
    pub fn customer(text: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            thread_type: "customer".to_owned(),
            text: text.into(),
            customer: CustomerIdentity::email_only(email),
            attachments: None,
        }
    }

    /// Change the author role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.thread_type = role.into();
        self
    }

    /// Carry inline file payloads.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<InlineAttachment>) -> Self {
        self.attachments = Some(attachments);
        self
    }
}

/// Request body for conversation creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversation {
    /// Target mailbox.
    #[serde(rename = "mailboxId")]
    pub mailbox_id: u64,

    /// Ticket subject.
    pub subject: String,

    /// Conversation kind; always `"email"` for reports.
    #[serde(rename = "type")]
    pub conversation_type: String,

    /// Initial state; always `"active"`.
    pub status: String,

    /// Reporter identity.
    pub customer: CustomerIdentity,

    /// Initial threads; a single customer thread with the rendered body.
    pub threads: Vec<NewThread>,

    /// Whether the conversation is an import (suppresses notifications).
    pub imported: bool,

    /// Creating party; always `"customer"`.
    #[serde(rename = "createdBy")]
    pub created_by: String,

    /// Ticket tags.
    pub tags: Vec<String>,
}

/// Response envelope for conversation creation.
///
/// Servers answer either with an embedded collection or a flat object
/// depending on version. Anything else is the "unrecognized" case: the raw
/// body is recorded and the next creation candidate is tried.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConversationEnvelope {
    /// `{"_embedded": {"conversations": [{"id": ...}]}}`
    Embedded {
        #[serde(rename = "_embedded")]
        embedded: EmbeddedConversations,
    },
    /// `{"id": ...}`
    Flat { id: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedConversations {
    pub conversations: Vec<ConversationRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRef {
    pub id: u64,
}

impl ConversationEnvelope {
    /// Extract the conversation id, if the envelope actually carries one.
    pub fn conversation_id(&self) -> Option<u64> {
        match self {
            Self::Embedded { embedded } => embedded.conversations.first().map(|c| c.id),
            Self::Flat { id } => Some(*id),
        }
    }
}

/// Response envelope for the global attachment upload endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttachmentUploadEnvelope {
    /// `{"id": ...}`
    Direct { id: u64 },
    /// `{"_embedded": {"attachments": [{"id": ...}]}}`
    Embedded {
        #[serde(rename = "_embedded")]
        embedded: EmbeddedAttachments,
    },
    /// `[{"id": ...}, ...]`
    List(Vec<AttachmentRef>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedAttachments {
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentRef {
    pub id: u64,
}

impl AttachmentUploadEnvelope {
    /// Extract the uploaded attachment's id, if the envelope carries one.
    pub fn attachment_id(&self) -> Option<u64> {
        match self {
            Self::Direct { id } => Some(*id),
            Self::Embedded { embedded } => embedded.attachments.first().map(|a| a.id),
            Self::List(refs) => refs.first().map(|a| a.id),
        }
    }
}
