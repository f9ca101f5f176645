//! `Content-Type` header helpers
//!
//! Extracts the multipart boundary that the codec needs from a request header.

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Get the `boundary` parameter of a `multipart/form-data` content type
///
/// # Examples
/// ```
/// use polyfun_relay::http::content_type::multipart_boundary;
/// assert_eq!(
///     multipart_boundary("multipart/form-data; boundary=----abc").as_deref(),
///     Some("----abc")
/// );
/// assert_eq!(multipart_boundary("application/json"), None);
/// ```
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let media_type = params.next()?.trim();
    if !media_type.eq_ignore_ascii_case(MULTIPART_FORM_DATA) {
        return None;
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()).to_string())
        .filter(|boundary| !boundary.is_empty())
}

/// Check whether a content type is `multipart/form-data`
pub fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(MULTIPART_FORM_DATA))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_boundary() {
        assert_eq!(
            multipart_boundary("multipart/form-data; boundary=----WebKitFormBoundaryx8V2").as_deref(),
            Some("----WebKitFormBoundaryx8V2")
        );
    }

    #[test]
    fn test_quoted_and_case_insensitive() {
        assert_eq!(
            multipart_boundary("Multipart/Form-Data; charset=utf-8; BOUNDARY=\"a b\"").as_deref(),
            Some("a b")
        );
    }

    #[test]
    fn test_missing_or_empty_boundary() {
        assert_eq!(multipart_boundary("multipart/form-data"), None);
        assert_eq!(multipart_boundary("multipart/form-data; boundary="), None);
        assert_eq!(multipart_boundary("multipart/form-data; boundary=\"\""), None);
    }

    #[test]
    fn test_other_media_types() {
        assert_eq!(multipart_boundary("multipart/mixed; boundary=x"), None);
        assert_eq!(multipart_boundary("application/json"), None);
        assert_eq!(multipart_boundary(""), None);
    }

    #[test]
    fn test_is_multipart_form() {
        assert!(is_multipart_form("multipart/form-data; boundary=x"));
        assert!(is_multipart_form("MULTIPART/FORM-DATA"));
        assert!(!is_multipart_form("text/plain"));
    }
}
