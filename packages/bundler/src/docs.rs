//! README generation from the annotated specification source
//!
//! The specification is a test file whose comments are the prose. Test
//! harness lines are dropped and comment markers are stripped.

use serde::{Deserialize, Serialize};

fn default_drop_markers() -> Vec<String> {
    vec![
        "th.expectParseMDZ(".to_string(),
        "const th = @import".to_string(),
    ]
}

fn default_comment_marker() -> String {
    "//".to_string()
}

/// Line rewriting rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsExtractor {
    /// Lines containing any of these are removed
    #[serde(default = "default_drop_markers")]
    pub drop_markers: Vec<String>,
    /// Lines starting with this lose it, plus one following space
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
}

impl Default for DocsExtractor {
    fn default() -> Self {
        Self {
            drop_markers: default_drop_markers(),
            comment_marker: default_comment_marker(),
        }
    }
}

impl DocsExtractor {
    pub fn new(drop_markers: Vec<String>, comment_marker: impl Into<String>) -> Self {
        Self {
            drop_markers,
            comment_marker: comment_marker.into(),
        }
    }

    pub fn extract(&self, source: &str) -> String {
        source
            .split('\n')
            .filter_map(|line| self.rewrite_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn rewrite_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        if self
            .drop_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
        {
            return None;
        }

        if self.comment_marker.is_empty() {
            return Some(line);
        }

        match line.strip_prefix(self.comment_marker.as_str()) {
            Some(rest) => Some(rest.strip_prefix(' ').unwrap_or(rest)),
            None => Some(line),
        }
    }
}
