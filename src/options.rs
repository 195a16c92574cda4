//! Configuration options for the writer and the exporter.
//!
//! - [`WriterOptions`]: layout of the emitted documents
//! - [`ExportOptions`]: traversal limits plus the writer layout
//!
//! Both types implement `serde::Deserialize` with every field defaulted, so a
//! partial configuration file is enough.
//!
//! ## Examples
//!
//! ```rust
//! use pff_json::{ExportOptions, WriterOptions};
//!
//! let options = ExportOptions::new()
//!     .with_max_depth(64)
//!     .with_writer(WriterOptions::new().with_indent(4));
//! assert_eq!(options.writer.indent, 4);
//! ```

use serde::{Deserialize, Serialize};

/// Layout of the emitted documents.
///
/// # Examples
///
/// ```rust
/// use pff_json::WriterOptions;
///
/// let options = WriterOptions::new();
/// assert_eq!(options.indent, 2);
/// assert_eq!(options.key_separator, " : ");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Token written between a quoted key and its value.
    pub key_separator: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent: 2,
            key_separator: " : ".to_string(),
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of spaces per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the key/value separator token.
    ///
    /// The token is written verbatim, so it should contain a `:` and
    /// optional whitespace only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pff_json::WriterOptions;
    ///
    /// let options = WriterOptions::new().with_key_separator(": ");
    /// assert_eq!(options.key_separator, ": ");
    /// ```
    #[must_use]
    pub fn with_key_separator(mut self, separator: &str) -> Self {
        self.key_separator = separator.to_string();
        self
    }
}

/// Traversal configuration for an export run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub writer: WriterOptions,
    /// Items nested deeper than this below the root are skipped.
    pub max_depth: usize,
    /// Whether the side collection of container items is exported.
    pub follow_secondary: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            writer: WriterOptions::default(),
            max_depth: 512,
            follow_secondary: true,
        }
    }
}

impl ExportOptions {
    /// Creates default options (2-space indent, depth limit 512, side collections followed).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pff_json::ExportOptions;
    ///
    /// let options = ExportOptions::new();
    /// assert_eq!(options.max_depth, 512);
    /// assert!(options.follow_secondary);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_writer(mut self, writer: WriterOptions) -> Self {
        self.writer = writer;
        self
    }

    /// Sets the maximum nesting depth below the root item.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_follow_secondary(mut self, follow: bool) -> Self {
        self.follow_secondary = follow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let options: ExportOptions =
            serde_json::from_str(r#"{ "max_depth": 8, "writer": { "indent": 4 } }"#).unwrap();
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.writer.indent, 4);
        assert_eq!(options.writer.key_separator, " : ");
        assert!(options.follow_secondary);
    }

    #[test]
    fn test_builder() {
        let options = ExportOptions::new()
            .with_follow_secondary(false)
            .with_writer(WriterOptions::new().with_key_separator(":"));
        assert!(!options.follow_secondary);
        assert_eq!(options.writer.key_separator, ":");
        assert_eq!(options.writer.indent, 2);
    }
}
