//! In-band error signalling
//!
//! The module has a single output channel. A failure is written into that
//! channel as `error.<Identifier>`; the host recognises it after decoding.

use serde::{Deserialize, Serialize};

/// Reserved token that introduces an error identifier
pub const ERROR_PREFIX: &str = "error.";

/// How the decoded output is searched for the sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelMode {
    /// Output starts with `error.`; the remainder is the identifier
    Prefix,
    /// Output ends with `error.<word>`. The module may have streamed partial
    /// output before it failed, so anything before the sentinel is dropped.
    #[default]
    SuffixScan,
}

/// Decoded output after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Output(String),
    Error(String),
}

impl Classified {
    pub fn into_result(self) -> Result<String, String> {
        match self {
            Classified::Output(text) => Ok(text),
            Classified::Error(identifier) => Err(identifier),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Classify decoded module output
pub fn classify(output: String, mode: SentinelMode) -> Classified {
    match mode {
        SentinelMode::Prefix => match output.strip_prefix(ERROR_PREFIX) {
            Some(identifier) => Classified::Error(identifier.to_string()),
            None => Classified::Output(output),
        },
        SentinelMode::SuffixScan => match trailing_identifier(&output) {
            Some(identifier) => Classified::Error(identifier.to_string()),
            None => Classified::Output(output),
        },
    }
}

/// Identifier of a trailing `error.<word>` sentinel, if present
pub fn trailing_identifier(output: &str) -> Option<&str> {
    let head = output.trim_end_matches(is_word_char);
    let identifier = &output[head.len()..];
    if identifier.is_empty() || !head.ends_with(ERROR_PREFIX) {
        return None;
    }
    Some(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_scan_whole_output() {
        assert_eq!(
            classify("error.InvalidMDZSyntax".into(), SentinelMode::SuffixScan),
            Classified::Error("InvalidMDZSyntax".into())
        );
    }

    #[test]
    fn test_suffix_scan_after_partial_write() {
        assert_eq!(
            classify("<p>Hello error.OutOfMemory".into(), SentinelMode::SuffixScan),
            Classified::Error("OutOfMemory".into())
        );
    }

    #[test]
    fn test_suffix_scan_requires_anchor_at_end() {
        let text = "<p>error.Foo is documented here</p>".to_string();
        assert_eq!(
            classify(text.clone(), SentinelMode::SuffixScan),
            Classified::Output(text)
        );
    }

    #[test]
    fn test_suffix_scan_requires_identifier() {
        let text = "<p>ends with error.".to_string();
        assert_eq!(
            classify(text.clone(), SentinelMode::SuffixScan),
            Classified::Output(text)
        );
    }

    #[test]
    fn test_suffix_scan_uses_last_occurrence() {
        assert_eq!(trailing_identifier("error.A error.B"), Some("B"));
        assert_eq!(trailing_identifier("error.error.Nested"), Some("Nested"));
    }

    #[test]
    fn test_non_ascii_word_is_not_an_identifier() {
        assert_eq!(trailing_identifier("error.é"), None);
    }

    #[test]
    fn test_prefix_mode() {
        assert_eq!(
            classify("error.InvalidRMDSyntax".into(), SentinelMode::Prefix),
            Classified::Error("InvalidRMDSyntax".into())
        );
        // partial output hides the sentinel from prefix mode
        assert_eq!(
            classify("<p>x error.Bad".into(), SentinelMode::Prefix),
            Classified::Output("<p>x error.Bad".into())
        );
    }

    #[test]
    fn test_success_is_unmodified() {
        let html = "<p>Hello, world!</p>".to_string();
        assert_eq!(
            classify(html.clone(), SentinelMode::SuffixScan).into_result(),
            Ok(html)
        );
        assert_eq!(
            classify(String::new(), SentinelMode::SuffixScan),
            Classified::Output(String::new())
        );
    }
}
