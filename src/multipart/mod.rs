//! `multipart/form-data` codec
//!
//! Splits a fully buffered multipart body into [`Part`]s and rebuilds a body
//! from parts. Both directions are pure functions over in-memory buffers and
//! never fail: malformed input degrades to fewer (or no) parts.
//!
//! The boundary is always supplied by the caller, usually taken from the
//! request's `Content-Type` header (see [`crate::http::content_type`]).

mod decoder;
mod encoder;
mod headers;

pub use decoder::decode;
pub use encoder::encode;

/// One section of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Form field name from `Content-Disposition`
    pub name: String,
    /// File name, present only for file-bearing parts
    pub filename: Option<String>,
    /// Declared `Content-Type` of the part
    pub content_type: Option<String>,
    /// Payload bytes between the header block and the next delimiter
    pub data: Vec<u8>,
}

impl Part {
    /// Create a simple form field part
    pub fn field(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a file part
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type,
            data: data.into(),
        }
    }

    /// Returns true if this part carries a file
    pub const fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

/// Find the first occurrence of `needle` in `haystack` at or after `from`
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}
