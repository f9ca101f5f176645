//! Multipart body decoder

use super::headers::PartHeaders;
use super::{find_bytes, Part};

const CRLF_LEN: usize = 2;
const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Split a buffered multipart body into its named parts.
///
/// Parts are returned in source order. The closing `--boundary--` marker needs
/// no special case: it starts with the delimiter, ends the last part, and
/// leaves nothing after it that contains another delimiter.
///
/// Degrades instead of failing:
/// - no delimiter in `buffer` gives an empty list
/// - a part without a `name` attribute is dropped
/// - a part without a header/body separator has no headers, so it is dropped too
/// - bytes after the last delimiter are discarded
pub fn decode(buffer: &[u8], boundary: &str) -> Vec<Part> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut parts = Vec::new();

    let Some(first) = find_bytes(buffer, &delimiter, 0) else {
        return parts;
    };
    let mut cursor = first + delimiter.len() + CRLF_LEN;

    while cursor < buffer.len() {
        let Some(next) = find_bytes(buffer, &delimiter, cursor) else {
            break;
        };

        // The CRLF before a delimiter belongs to the delimiter, not the data
        let span_end = next.saturating_sub(CRLF_LEN).max(cursor);
        if let Some(part) = parse_part(&buffer[cursor..span_end]) {
            parts.push(part);
        }

        cursor = next + delimiter.len() + CRLF_LEN;
    }

    parts
}

fn parse_part(raw: &[u8]) -> Option<Part> {
    let (headers, data) = match find_bytes(raw, HEADER_SEPARATOR, 0) {
        Some(pos) => (
            PartHeaders::parse(&String::from_utf8_lossy(&raw[..pos])),
            &raw[pos + HEADER_SEPARATOR.len()..],
        ),
        None => (PartHeaders::default(), raw),
    };

    Some(Part {
        name: headers.name?,
        filename: headers.filename,
        content_type: headers.content_type,
        data: data.to_vec(),
    })
}
