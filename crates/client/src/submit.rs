//! Top-level submission flow: gate, create, attach, aggregate.

use bugrelay_core::{AttachmentFailure, BugReport, MediaBlob, SubmissionOutcome, human_size};
use tracing::{debug, instrument, warn};

use crate::client::HelpdeskClient;
use crate::error::HelpdeskError;

impl HelpdeskClient {
    /// Submit a report with an optional main capture and any number of
    /// additional files.
    ///
    /// Never returns an error: every failure folds into the outcome record.
    /// The whole submission fails when the configuration gate, the size
    /// check, or conversation creation fails; once a conversation exists,
    /// attachment failures yield a partial outcome naming each failed file.
    /// Blobs are delivered sequentially, main capture first, so thread order
    /// on the conversation stays deterministic.
    #[instrument(skip_all, fields(subject = %report.title))]
    pub async fn submit(
        &self,
        report: &BugReport,
        main: Option<&MediaBlob>,
        additional: &[MediaBlob],
    ) -> SubmissionOutcome {
        if let Err(err) = self.ensure_configured() {
            return SubmissionOutcome::failed(err.to_string());
        }

        let blobs: Vec<&MediaBlob> = main.into_iter().chain(additional.iter()).collect();
        for blob in &blobs {
            if let Err(err) = self.check_size(blob) {
                warn!(error = %err, "submission rejected before any network call");
                return SubmissionOutcome::failed(err.to_string());
            }
        }

        let conversation_id = match self.create_conversation(report).await {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "conversation creation failed");
                return SubmissionOutcome::failed(err.to_string());
            }
        };

        // One blob failing must not keep the rest from being delivered.
        let mut failures = Vec::new();
        for blob in blobs {
            if let Err(err) = self.attach_file(conversation_id, blob, &report.title).await {
                warn!(file = %blob.upload_file_name(), error = %err, "attachment failed");
                failures.push(AttachmentFailure {
                    file_name: blob.upload_file_name(),
                    error: err.to_string(),
                });
            }
        }

        if failures.is_empty() {
            debug!(conversation_id, "submission complete");
            SubmissionOutcome::complete(conversation_id)
        } else {
            debug!(
                conversation_id,
                failed = failures.len(),
                "submission partially complete"
            );
            SubmissionOutcome::partial(conversation_id, failures)
        }
    }

    /// Enforce the submission size ceiling. Runs before any network call.
    fn check_size(&self, blob: &MediaBlob) -> Result<(), HelpdeskError> {
        if blob.len() > self.config.max_file_size {
            return Err(HelpdeskError::TooLarge {
                file_name: blob.upload_file_name(),
                size: blob.len(),
                limit: human_size(self.config.max_file_size),
            });
        }
        Ok(())
    }
}
