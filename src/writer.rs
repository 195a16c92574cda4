//! Streaming document writer.
//!
//! This module provides the [`Writer`], an append-only emitter of indented
//! JSON documents. Nothing is buffered beyond the stack of currently open
//! scopes: every call goes straight to the underlying [`io::Write`] sink.
//!
//! ## Overview
//!
//! - **Scopes**: every `open_*` pushes one frame, every `close_*` pops one
//! - **Separators**: the Nth child (N ≥ 2) of a scope is preceded by `,\n`
//! - **Layout**: one child per line, configurable indent per level
//! - **Documents**: [`Writer::reset`] seals the current document so the next
//!   one starts fresh on the same stream
//!
//! Call-sequence mistakes (closing the wrong kind of scope, a member value
//! without a key) panic. They are bugs in the caller, and continuing would
//! corrupt the stream.
//!
//! ## Usage
//!
//! ```rust
//! use pff_json::Writer;
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.open_object().unwrap();
//! writer.write_member("id", 7u32).unwrap();
//! writer.open_member_array("tags").unwrap();
//! writer.write_element("inbox").unwrap();
//! writer.close_member_array().unwrap();
//! writer.close_object().unwrap();
//! writer.reset().unwrap();
//!
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(
//!     text,
//!     "{\n  \"id\" : 7,\n  \"tags\" : [\n    \"inbox\"\n  ]\n}\n"
//! );
//! ```

use crate::{Result, Scalar, WriterOptions};
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use chrono::SecondsFormat;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeKind {
    Root,
    Object,
    Array,
}

#[derive(Clone, Copy, Debug)]
struct Scope {
    kind: ScopeKind,
    emitted_any_child: bool,
}

impl Scope {
    const fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            emitted_any_child: false,
        }
    }
}

/// The streaming document writer.
///
/// Created via [`Writer::new`] or [`Writer::with_options`]. The writer never
/// flushes its sink; whoever owns the run recovers it with
/// [`Writer::into_inner`] and flushes it.
pub struct Writer<W> {
    out: W,
    options: WriterOptions,
    depth: usize,
    scopes: Vec<Scope>,
    key_pending: bool,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriterOptions::default())
    }

    pub fn with_options(out: W, options: WriterOptions) -> Self {
        Writer {
            out,
            options,
            depth: 0,
            scopes: vec![Scope::new(ScopeKind::Root)],
            key_pending: false,
        }
    }

    /// Current nesting level; 0 between documents.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of frames on the scope stack, root frame included.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn open_object(&mut self) -> Result<()> {
        self.open_scope(ScopeKind::Object, b'{')
    }

    pub fn close_object(&mut self) -> Result<()> {
        self.close_scope(ScopeKind::Object, b'}')
    }

    pub fn open_array(&mut self) -> Result<()> {
        self.open_scope(ScopeKind::Array, b'[')
    }

    pub fn close_array(&mut self) -> Result<()> {
        self.close_scope(ScopeKind::Array, b']')
    }

    /// Writes `"key" : ` inside the current object.
    ///
    /// Exactly one value call (a scalar or an `open_*`) must follow.
    ///
    /// # Panics
    ///
    /// Panics outside an object scope or while another key awaits its value.
    pub fn write_key(&mut self, key: &str) -> Result<()> {
        assert!(
            !self.key_pending,
            "key {:?} written while the previous key still awaits its value",
            key
        );
        assert!(
            self.top().kind == ScopeKind::Object,
            "key {:?} written outside an object",
            key
        );
        self.next_element()?;
        self.write_indent()?;
        write_quoted(&mut self.out, key)?;
        self.out.write_all(self.options.key_separator.as_bytes())?;
        self.key_pending = true;
        Ok(())
    }

    pub fn open_member_object(&mut self, key: &str) -> Result<()> {
        self.write_key(key)?;
        self.open_object()
    }

    pub fn close_member_object(&mut self) -> Result<()> {
        self.close_object()
    }

    pub fn open_member_array(&mut self, key: &str) -> Result<()> {
        self.write_key(key)?;
        self.open_array()
    }

    pub fn close_member_array(&mut self) -> Result<()> {
        self.close_array()
    }

    /// Writes `"key" : value` inside the current object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pff_json::Writer;
    ///
    /// let mut writer = Writer::new(Vec::new());
    /// writer.open_object().unwrap();
    /// writer.write_member("raw", &[0u8, 1, 2][..]).unwrap();
    /// writer.close_object().unwrap();
    ///
    /// let text = String::from_utf8(writer.into_inner()).unwrap();
    /// assert!(text.contains("\"raw\" : \"AAEC\""));
    /// ```
    pub fn write_member<'a, V>(&mut self, key: &str, value: V) -> Result<()>
    where
        V: Into<Scalar<'a>>,
    {
        self.write_key(key)?;
        self.write_value(value)
    }

    /// Writes one element of the current array.
    ///
    /// # Panics
    ///
    /// Panics when the innermost open scope is not an array.
    pub fn write_element<'a, V>(&mut self, value: V) -> Result<()>
    where
        V: Into<Scalar<'a>>,
    {
        assert!(
            self.top().kind == ScopeKind::Array && !self.key_pending,
            "array element written outside an array"
        );
        self.write_value(value)
    }

    /// Writes a scalar in value position: after a key, inside an array, or
    /// as a bare top-level document.
    ///
    /// # Panics
    ///
    /// Panics inside an object when no key is pending, and on a second
    /// top-level value without a [`Writer::reset`] in between.
    pub fn write_value<'a, V>(&mut self, value: V) -> Result<()>
    where
        V: Into<Scalar<'a>>,
    {
        self.begin_value()?;
        self.write_scalar(value.into())?;
        Ok(())
    }

    /// Seals the current document.
    ///
    /// Writes a newline, drops every open scope and starts over at depth 0
    /// with a fresh root frame. Scopes still open are abandoned as written.
    pub fn reset(&mut self) -> Result<()> {
        self.out.write_all(b"\n")?;
        self.scopes.clear();
        self.scopes.push(Scope::new(ScopeKind::Root));
        self.depth = 0;
        self.key_pending = false;
        Ok(())
    }

    fn top(&self) -> Scope {
        *self
            .scopes
            .last()
            .expect("scope stack always holds the root frame")
    }

    fn open_scope(&mut self, kind: ScopeKind, delim: u8) -> Result<()> {
        self.begin_value()?;
        self.out.write_all(&[delim])?;
        self.scopes.push(Scope::new(kind));
        self.depth += 1;
        Ok(())
    }

    fn close_scope(&mut self, kind: ScopeKind, delim: u8) -> Result<()> {
        assert!(
            !self.key_pending,
            "{:?} closed while a key awaits its value",
            kind
        );
        let top = self.top();
        match top.kind {
            ScopeKind::Root => panic!("{:?} closed with no open scope", kind),
            open if open != kind => panic!("{:?} closed while {:?} is open", kind, open),
            _ => {}
        }
        self.scopes.pop();
        self.depth -= 1;
        if top.emitted_any_child {
            self.out.write_all(b"\n")?;
            self.write_indent()?;
        }
        self.out.write_all(&[delim])?;
        Ok(())
    }

    /// Positions the stream for a value: consumes a pending key, or emits
    /// the separator and indentation for a new element.
    fn begin_value(&mut self) -> io::Result<()> {
        if self.key_pending {
            self.key_pending = false;
            return Ok(());
        }
        let top = self.top();
        assert!(
            top.kind != ScopeKind::Object,
            "value written inside an object without a key"
        );
        assert!(
            !(top.kind == ScopeKind::Root && top.emitted_any_child),
            "second top-level value written without reset"
        );
        self.next_element()?;
        self.write_indent()
    }

    fn next_element(&mut self) -> io::Result<()> {
        let nested = self.depth > 0;
        let top = self
            .scopes
            .last_mut()
            .expect("scope stack always holds the root frame");
        if top.emitted_any_child {
            self.out.write_all(b",\n")
        } else {
            top.emitted_any_child = true;
            if nested {
                self.out.write_all(b"\n")
            } else {
                Ok(())
            }
        }
    }

    fn write_indent(&mut self) -> io::Result<()> {
        const SPACES: [u8; 256] = [b' '; 256];
        let mut width = self.depth.saturating_mul(self.options.indent);
        while width > 0 {
            let chunk = width.min(SPACES.len());
            self.out.write_all(&SPACES[..chunk])?;
            width -= chunk;
        }
        Ok(())
    }

    fn write_scalar(&mut self, value: Scalar<'_>) -> io::Result<()> {
        match value {
            Scalar::Null => self.out.write_all(b"null"),
            Scalar::Bool(true) => self.out.write_all(b"true"),
            Scalar::Bool(false) => self.out.write_all(b"false"),
            Scalar::Int(i) => write!(self.out, "{}", i),
            Scalar::UInt(u) => write!(self.out, "{}", u),
            // JSON has no spelling for NaN or the infinities
            Scalar::Float(f) if !f.is_finite() => self.out.write_all(b"null"),
            Scalar::Float(f) => write!(self.out, "{}", f),
            Scalar::Text(s) => write_quoted(&mut self.out, s),
            Scalar::Bytes(bytes) => {
                self.out.write_all(b"\"")?;
                {
                    let mut encoder = EncoderWriter::new(&mut self.out, &STANDARD);
                    encoder.write_all(bytes)?;
                    encoder.finish()?;
                }
                self.out.write_all(b"\"")
            }
            Scalar::Timestamp(t) => {
                write_quoted(&mut self.out, &t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

/// Returns `s` quoted and escaped the way the writer emits text.
///
/// # Examples
///
/// ```rust
/// use pff_json::writer::quote;
///
/// assert_eq!(quote("a\"b\n"), r#""a\"b\n""#);
/// assert_eq!(quote("\u{1}"), r#""\u0001""#);
/// ```
#[must_use]
pub fn quote(s: &str) -> String {
    let mut buf = Vec::with_capacity(s.len() + 2);
    // writing into a Vec cannot fail
    let _ = write_quoted(&mut buf, s);
    String::from_utf8(buf).unwrap_or_default()
}

/// Quotes `s`, escaping `"`, `\` and every control character below U+0020.
fn write_quoted<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    out.write_all(b"\"")?;
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let short: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            0x08 => b"\\b",
            0x0C => b"\\f",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1F => {
                out.write_all(&bytes[start..i])?;
                write!(out, "\\u{:04x}", byte)?;
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        out.write_all(&bytes[start..i])?;
        out.write_all(short)?;
        start = i + 1;
    }
    out.write_all(&bytes[start..])?;
    out.write_all(b"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn output(writer: Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_aggregates() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        writer.open_member_array("items").unwrap();
        writer.close_member_array().unwrap();
        writer.open_member_object("meta").unwrap();
        writer.close_member_object().unwrap();
        writer.close_object().unwrap();
        assert_eq!(
            output(writer),
            "{\n  \"items\" : [],\n  \"meta\" : {}\n}"
        );
    }

    #[test]
    fn test_nested_arrays_indent() {
        let mut writer = Writer::new(Vec::new());
        writer.open_array().unwrap();
        writer.open_array().unwrap();
        writer.write_element(1u8).unwrap();
        writer.write_element(2u8).unwrap();
        writer.close_array().unwrap();
        writer.write_element(Scalar::Null).unwrap();
        writer.close_array().unwrap();
        assert_eq!(
            output(writer),
            "[\n  [\n    1,\n    2\n  ],\n  null\n]"
        );
    }

    #[test]
    fn test_depth_tracking() {
        let mut writer = Writer::new(Vec::new());
        assert_eq!((writer.depth(), writer.scope_depth()), (0, 1));
        writer.open_object().unwrap();
        writer.open_member_array("a").unwrap();
        assert_eq!((writer.depth(), writer.scope_depth()), (2, 3));
        writer.close_member_array().unwrap();
        writer.close_object().unwrap();
        assert_eq!((writer.depth(), writer.scope_depth()), (0, 1));
    }

    #[test]
    fn test_scalars() {
        let mut writer = Writer::new(Vec::new());
        writer.open_array().unwrap();
        writer.write_element(true).unwrap();
        writer.write_element(false).unwrap();
        writer.write_element(-12i64).unwrap();
        writer.write_element(u64::MAX).unwrap();
        writer.write_element(0.5f64).unwrap();
        writer.write_element(f64::NAN).unwrap();
        writer
            .write_element(Utc.with_ymd_and_hms(2010, 3, 4, 5, 6, 7).unwrap())
            .unwrap();
        writer.close_array().unwrap();
        let text = output(writer);
        let values: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            values,
            serde_json::json!([
                true,
                false,
                -12,
                u64::MAX,
                0.5,
                null,
                "2010-03-04T05:06:07Z"
            ])
        );
    }

    #[test]
    fn test_base64_padding() {
        let mut writer = Writer::new(Vec::new());
        writer.open_array().unwrap();
        writer.write_element(&b""[..]).unwrap();
        writer.write_element(&b"a"[..]).unwrap();
        writer.write_element(&b"ab"[..]).unwrap();
        writer.write_element(&b"abc"[..]).unwrap();
        writer.close_array().unwrap();
        assert_eq!(
            output(writer),
            "[\n  \"\",\n  \"YQ==\",\n  \"YWI=\",\n  \"YWJj\"\n]"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"say "hi" \ bye"#), r#""say \"hi\" \\ bye""#);
        assert_eq!(quote("\u{8}\u{c}\n\r\t"), r#""\b\f\n\r\t""#);
        assert_eq!(quote("\u{0}\u{1f}"), r#""\u0000\u001f""#);
        assert_eq!(quote("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn test_reset_twice() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        writer.reset().unwrap();
        writer.reset().unwrap();
        assert_eq!((writer.depth(), writer.scope_depth()), (0, 1));
        assert_eq!(output(writer), "{\n\n");
    }

    #[test]
    fn test_custom_layout() {
        let options = WriterOptions::new().with_indent(4).with_key_separator(": ");
        let mut writer = Writer::with_options(Vec::new(), options);
        writer.open_object().unwrap();
        writer.write_member("a", 1u8).unwrap();
        writer.close_object().unwrap();
        assert_eq!(output(writer), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_nesting_beyond_format_width() {
        const LEVELS: usize = 40_000;
        let mut writer = Writer::new(io::sink());
        for _ in 0..LEVELS {
            writer.open_array().unwrap();
        }
        writer.write_element(1u8).unwrap();
        for _ in 0..LEVELS {
            writer.close_array().unwrap();
        }
        assert_eq!((writer.depth(), writer.scope_depth()), (0, 1));
    }

    #[test]
    fn test_wide_indent() {
        let mut writer = Writer::with_options(Vec::new(), WriterOptions::new().with_indent(70_000));
        writer.open_array().unwrap();
        writer.write_element(1u8).unwrap();
        writer.close_array().unwrap();
        let text = output(writer);
        assert_eq!(text.len(), "[\n1\n]".len() + 70_000);
        assert!(text.starts_with("[\n    "));
        assert!(text.ends_with(" 1\n]"));
    }

    #[test]
    fn test_reset_allows_next_document() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        writer.close_object().unwrap();
        writer.reset().unwrap();
        writer.open_array().unwrap();
        writer.close_array().unwrap();
        assert_eq!(output(writer), "{}\n[]");
    }

    #[test]
    #[should_panic(expected = "second top-level value written without reset")]
    fn test_second_top_level_value_panics() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        writer.close_object().unwrap();
        let _ = writer.open_object();
    }

    #[test]
    #[should_panic(expected = "closed while")]
    fn test_mismatched_close_panics() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        let _ = writer.close_array();
    }

    #[test]
    #[should_panic(expected = "no open scope")]
    fn test_close_at_root_panics() {
        let mut writer = Writer::new(Vec::new());
        let _ = writer.close_object();
    }

    #[test]
    #[should_panic(expected = "without a key")]
    fn test_value_without_key_panics() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        let _ = writer.write_value(1u8);
    }

    #[test]
    #[should_panic(expected = "outside an object")]
    fn test_key_in_array_panics() {
        let mut writer = Writer::new(Vec::new());
        writer.open_array().unwrap();
        let _ = writer.write_key("k");
    }

    #[test]
    #[should_panic(expected = "awaits its value")]
    fn test_double_key_panics() {
        let mut writer = Writer::new(Vec::new());
        writer.open_object().unwrap();
        writer.write_key("a").unwrap();
        let _ = writer.write_key("b");
    }
}
