//! JAR manifest reading and writing.
//!
//! Manifests are `Name: value` lines grouped into a main section followed by
//! optional per-entry sections, each terminated by a blank line. Lines are
//! limited to 72 bytes; longer values continue on lines starting with a single
//! space. Attribute order is preserved so that rewriting one attribute leaves
//! the rest of the file as it was.

use thiserror::Error;

/// Attribute written first in every new manifest.
pub const MANIFEST_VERSION: &str = "Manifest-Version";

/// Attribute holding the inter-module classpath.
pub const CLASS_PATH: &str = "Class-Path";

const MAX_LINE_BYTES: usize = 72;
const LINE_END: &str = "\r\n";

/// Errors arising from parsing a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The manifest is not UTF-8.
    #[error("manifest is not valid UTF-8")]
    InvalidUtf8,

    /// A line is neither a header nor a continuation.
    #[error("malformed manifest line {line}: {content}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A continuation line appears before any header.
    #[error("continuation without a header at manifest line {line}")]
    OrphanContinuation {
        /// One-based line number.
        line: usize,
    },
}

type Section = Vec<(String, String)>;

/// An ordered JAR manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Section,
    sections: Vec<Section>,
}

impl Manifest {
    /// Create a manifest holding only `Manifest-Version: 1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            main: vec![(MANIFEST_VERSION.to_owned(), "1.0".to_owned())],
            sections: Vec::new(),
        }
    }

    /// Parse manifest bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] for non UTF-8 input or malformed lines.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        std::str::from_utf8(bytes)
            .map_err(|_| ManifestError::InvalidUtf8)
            .and_then(Self::parse)
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] for malformed lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use earsmith::classpath::manifest::Manifest;
    ///
    /// let manifest = Manifest::parse("Manifest-Version: 1.0\r\nClass-Path: a.jar\r\n  b.jar\r\n").unwrap();
    /// assert_eq!(manifest.class_path(), Some(vec!["a.jar".to_owned(), "b.jar".to_owned()]));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Self::default();
        let mut current: Section = Vec::new();
        let mut in_main = true;

        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            if line.is_empty() {
                if in_main {
                    manifest.main = std::mem::take(&mut current);
                    in_main = false;
                } else if !current.is_empty() {
                    manifest.sections.push(std::mem::take(&mut current));
                }
                continue;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                let (_, value) = current
                    .last_mut()
                    .ok_or(ManifestError::OrphanContinuation { line: number })?;
                value.push_str(continuation);
                continue;
            }
            let (name, value) = line
                .split_once(": ")
                .or_else(|| line.strip_suffix(':').map(|name| (name, "")))
                .filter(|(name, _)| is_valid_name(name))
                .ok_or_else(|| ManifestError::MalformedLine {
                    line: number,
                    content: line.to_owned(),
                })?;
            current.push((name.to_owned(), value.to_owned()));
        }

        if in_main {
            manifest.main = current;
        } else if !current.is_empty() {
            manifest.sections.push(current);
        }
        Ok(manifest)
    }

    /// Return a main attribute, matching the name case-insensitively.
    #[must_use]
    pub fn main_attribute(&self, name: &str) -> Option<&str> {
        self.main
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a main attribute in place, appending it when absent.
    pub fn set_main_attribute(&mut self, name: &str, value: impl Into<String>) {
        let owned = value.into();
        if let Some((_, existing)) = self
            .main
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            *existing = owned;
            return;
        }
        self.main.push((name.to_owned(), owned));
    }

    /// Return the `Class-Path` tokens, or `None` when the attribute is absent.
    #[must_use]
    pub fn class_path(&self) -> Option<Vec<String>> {
        self.main_attribute(CLASS_PATH)
            .map(|value| value.split_whitespace().map(str::to_owned).collect())
    }

    /// Replace the `Class-Path` attribute with `tokens` joined by spaces.
    pub fn set_class_path(&mut self, tokens: &[String]) {
        self.set_main_attribute(CLASS_PATH, tokens.join(" "));
    }

    /// Serialise with CRLF line endings and 72-byte line wrapping.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        write_section(&mut out, &self.main);
        out.push_str(LINE_END);
        for section in &self.sections {
            write_section(&mut out, section);
            out.push_str(LINE_END);
        }
        out.into_bytes()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

fn write_section(out: &mut String, section: &Section) {
    for (name, value) in section {
        write_wrapped(out, &format!("{name}: {value}"));
    }
}

fn write_wrapped(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_BYTES;
    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str(LINE_END);
            return;
        }
        let mut split = limit;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        let (head, tail) = rest.split_at(split);
        out.push_str(head);
        out.push_str(LINE_END);
        out.push(' ');
        rest = tail;
        limit = MAX_LINE_BYTES - 1;
    }
}
