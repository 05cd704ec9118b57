//! Wire types for the remote analysis service.
//!
//! Request bodies are built inline with `serde_json::json!`; only the
//! response shapes the client reads are modelled here.  Unknown fields are
//! ignored (the service also sends `error: false` on success).

use serde::Deserialize;

/// Unformatted caption text for a video (`POST /transcript`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTranscript {
    pub transcript: String,
    pub video_id: String,
    pub url: String,
}

/// Sentence- and paragraph-split transcript (`POST /format-transcript`).
///
/// Only `formatted_transcript` is guaranteed; the rest is echoed back by the
/// service when available.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormattedTranscript {
    pub formatted_transcript: String,
    #[serde(default)]
    pub original_transcript: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl FormattedTranscript {
    /// A transcript carrying only the formatted text.
    pub fn new(formatted_transcript: impl Into<String>) -> Self {
        Self {
            formatted_transcript: formatted_transcript.into(),
            original_transcript: None,
            video_id: None,
            url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_transcript_accepts_minimal_body() {
        let parsed: FormattedTranscript =
            serde_json::from_str(r#"{"formatted_transcript":"L1\nL2"}"#).unwrap();
        assert_eq!(parsed, FormattedTranscript::new("L1\nL2"));
    }

    #[test]
    fn formatted_transcript_keeps_echoed_fields() {
        let parsed: FormattedTranscript = serde_json::from_str(
            r#"{"formatted_transcript":"A.","original_transcript":"a","video_id":"abcdefghijk","url":"u"}"#,
        )
        .unwrap();
        assert_eq!(parsed.original_transcript.as_deref(), Some("a"));
        assert_eq!(parsed.video_id.as_deref(), Some("abcdefghijk"));
    }

    #[test]
    fn raw_transcript_ignores_error_flag() {
        let parsed: RawTranscript = serde_json::from_str(
            r#"{"error":false,"transcript":"hi","video_id":"abc","url":"https://youtu.be/abc"}"#,
        )
        .unwrap();
        assert_eq!(parsed.transcript, "hi");
        assert_eq!(parsed.video_id, "abc");
    }
}
