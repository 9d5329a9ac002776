pub mod media;
pub mod outcome;
pub mod report;
pub mod useragent;

pub use media::{MediaBlob, human_size};
pub use outcome::{AttachmentFailure, SubmissionOutcome, SubmissionStatus};
pub use report::{BugReport, Priority};
pub use useragent::{browser_label, os_label};
