//! Part header block scanning
//!
//! Walks a part's header lines. A line starting with `Content-Type: ` gives
//! the content type; every other line is tokenized for `name="..."` and
//! `filename="..."`. Quoted values must be non-empty and end at the first
//! closing quote; an unterminated quote yields no value.

const NAME_ATTR: &[u8] = b"name=\"";
const FILENAME_ATTR: &[u8] = b"filename=\"";
const CONTENT_TYPE_LABEL: &str = "Content-Type: ";

/// Header-derived fields of one part
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PartHeaders {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl PartHeaders {
    pub fn parse(headers: &str) -> Self {
        let mut parsed = Self::default();
        for line in headers.lines() {
            match line.strip_prefix(CONTENT_TYPE_LABEL) {
                Some(value) => {
                    if parsed.content_type.is_none() && !value.is_empty() {
                        parsed.content_type = Some(value.to_string());
                    }
                }
                None => parsed.scan_attributes(line),
            }
        }
        parsed
    }

    /// Pick `name` and `filename` out of one line.
    ///
    /// Attributes only match at the start of the line or after `;` or
    /// whitespace, and never inside a quoted value, so neither can be read
    /// out of the other's value. The first non-empty value of each wins.
    fn scan_attributes(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            let attr = Attr::at(bytes, i);
            let value_start = match attr {
                Some(attr) => i + attr.prefix().len(),
                // Skip over a quoted string that belongs to something else
                None if bytes[i] == b'"' => i + 1,
                None => {
                    i += 1;
                    continue;
                }
            };

            let Some(len) = line[value_start..].find('"') else {
                return;
            };
            let value = &line[value_start..value_start + len];
            i = value_start + len + 1;

            let slot = match attr {
                Some(Attr::Name) => &mut self.name,
                Some(Attr::Filename) => &mut self.filename,
                None => continue,
            };
            if !value.is_empty() && slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Attr {
    Name,
    Filename,
}

impl Attr {
    const fn prefix(self) -> &'static [u8] {
        match self {
            Self::Name => NAME_ATTR,
            Self::Filename => FILENAME_ATTR,
        }
    }

    /// Attribute starting at `index`, if it sits at a token boundary
    fn at(bytes: &[u8], index: usize) -> Option<Self> {
        if !is_token_start(bytes, index) {
            return None;
        }
        let rest = &bytes[index..];
        if rest.starts_with(FILENAME_ATTR) {
            Some(Self::Filename)
        } else if rest.starts_with(NAME_ATTR) {
            Some(Self::Name)
        } else {
            None
        }
    }
}

fn is_token_start(bytes: &[u8], index: usize) -> bool {
    index == 0 || matches!(bytes[index - 1], b';' | b' ' | b'\t')
}
