//! Multipart body encoder

use super::Part;

/// Serialize parts into a `multipart/form-data` body using `boundary`.
///
/// A `Content-Type` line is only written for file parts; a field part's
/// `content_type` is ignored. An empty filename counts as no filename.
///
/// Names and filenames are written verbatim. A value containing `"` or CRLF
/// produces a body that does not decode back to the same parts, and the output
/// is never checked for collisions with the boundary. Callers relaying
/// untrusted parts should be aware of both.
pub fn encode(parts: &[Part], boundary: &str) -> Vec<u8> {
    let capacity = parts
        .iter()
        .map(|p| p.data.len() + boundary.len() + 128)
        .sum::<usize>()
        + boundary.len()
        + 8;
    let mut out = Vec::with_capacity(capacity);

    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

        match part.filename.as_deref().filter(|f| !f.is_empty()) {
            Some(filename) => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                if let Some(content_type) = part.content_type.as_deref().filter(|c| !c.is_empty()) {
                    out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
                }
            }
            None => {
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name)
                        .as_bytes(),
                );
            }
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&part.data);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_parts() {
        assert_eq!(encode(&[], "b"), b"--b--\r\n");
    }

    #[test]
    fn test_field_layout() {
        let out = encode(&[Part::field("twitter", "@me")], "b");
        assert_eq!(
            out,
            b"--b\r\nContent-Disposition: form-data; name=\"twitter\"\r\n\r\n@me\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_file_layout() {
        let part = Part::file("file", "a.png", Some("image/png".to_string()), vec![1, 2, 3]);
        let mut expected = b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\n".to_vec();
        expected.extend_from_slice(&[1, 2, 3]);
        expected.extend_from_slice(b"\r\n--b--\r\n");

        assert_eq!(encode(&[part], "b"), expected);
    }

    #[test]
    fn test_file_without_content_type() {
        let out = encode(&[Part::file("file", "a.bin", None, "x")], "b");
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("filename=\"a.bin\"\r\n\r\nx"));
        assert!(!text.contains("Content-Type"));
    }

    #[test]
    fn test_empty_filename_is_a_field() {
        let part = Part::file("file", "", Some("image/png".to_string()), "x");
        let out = encode(&[part], "b");
        assert_eq!(
            out,
            b"--b\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nx\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_quote_in_name_is_not_escaped() {
        let out = encode(&[Part::field("a\"b", "x")], "b");
        assert!(String::from_utf8_lossy(&out).contains("name=\"a\"b\""));
    }
}
