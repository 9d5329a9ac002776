use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;

/// A captured binary payload to be attached to a ticket.
///
/// Carries the raw bytes, the MIME type, and the original filename when one
/// exists (files picked from disk keep their name; synthesized captures get a
/// generated one). Owned by the submission call for its duration and never
/// retained afterwards.
#[derive(Clone)]
pub struct MediaBlob {
    /// Raw file content.
    pub bytes: Vec<u8>,

    /// MIME content type (e.g. `"image/png"`, `"video/webm"`).
    pub content_type: String,

    /// Original filename, if the blob came from a named file.
    pub file_name: Option<String>,
}

impl std::fmt::Debug for MediaBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBlob")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MediaBlob {
    /// Create a blob from raw bytes and a MIME type.
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            file_name: None,
        }
    }

    /// Attach the original filename.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Whether the MIME type marks this blob as an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the blob holds no data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Filename to use when uploading.
    ///
    /// Named files keep their name; synthesized captures get
    /// `bug-report-{unix-millis}.{ext}` with `webm` for video and `png` for
    /// everything else.
    pub fn upload_file_name(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        let extension = if self.content_type.starts_with("video/") {
            "webm"
        } else {
            "png"
        };
        format!("bug-report-{}.{extension}", Utc::now().timestamp_millis())
    }

    /// Base64-encoded content (standard alphabet, padded).
    pub fn to_base64(&self) -> String {
        B64.encode(&self.bytes)
    }

    /// `data:` URL embedding the full content.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.to_base64())
    }

    /// Human-readable size of the blob (e.g. `"1.5 MB"`).
    pub fn size_label(&self) -> String {
        human_size(self.len())
    }
}

/// Format a byte count for display: whole or one-decimal MB/KB, plain bytes
/// below 1 KB.
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let value = bytes as f64;
    if value >= MB {
        let mb = value / MB;
        if mb.fract() < f64::EPSILON {
            format!("{mb:.0} MB")
        } else {
            format!("{mb:.1} MB")
        }
    } else if value >= KB {
        let kb = value / KB;
        if kb.fract() < f64::EPSILON {
            format!("{kb:.0} KB")
        } else {
            format!("{kb:.1} KB")
        }
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_detection() {
        assert!(MediaBlob::new(vec![1], "image/png").is_image());
        assert!(MediaBlob::new(vec![1], "image/jpeg").is_image());
        assert!(!MediaBlob::new(vec![1], "video/webm").is_image());
        assert!(!MediaBlob::new(vec![1], "application/json").is_image());
    }

    #[test]
    fn upload_name_prefers_original() {
        let blob = MediaBlob::new(vec![1], "application/json").with_file_name("session.har");
        assert_eq!(blob.upload_file_name(), "session.har");
    }

    #[test]
    fn upload_name_synthesized_for_video() {
        let blob = MediaBlob::new(vec![1], "video/webm");
        let name = blob.upload_file_name();
        assert!(name.starts_with("bug-report-"));
        assert!(name.ends_with(".webm"));
    }

    #[test]
    fn upload_name_synthesized_defaults_to_png() {
        let blob = MediaBlob::new(vec![1], "image/png");
        assert!(blob.upload_file_name().ends_with(".png"));
    }

    #[test]
    fn data_url_embeds_mime_and_payload() {
        let blob = MediaBlob::new(b"Hello World".to_vec(), "text/plain");
        assert_eq!(blob.to_data_url(), "data:text/plain;base64,SGVsbG8gV29ybGQ=");
    }

    #[test]
    fn debug_omits_raw_bytes() {
        let blob = MediaBlob::new(vec![0u8; 4096], "image/png").with_file_name("shot.png");
        let debug = format!("{blob:?}");
        assert!(debug.contains("shot.png"));
        assert!(debug.contains("4096"));
        assert!(!debug.contains("0, 0, 0"));
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2 KB");
        assert_eq!(human_size(1_536_000), "1.5 MB");
        assert_eq!(human_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(human_size(50 * 1024 * 1024), "50 MB");
    }
}
