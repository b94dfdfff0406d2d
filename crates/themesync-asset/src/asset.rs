//! The asset value and content classification.

use std::cmp::Ordering;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Bytes inspected when deciding between text and binary.
const SNIFF_LEN: usize = 512;

/// A theme file ready to be sent: its key plus either text or base64 data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Path relative to the theme root, `/`-separated.
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Base64 (standard alphabet, padded) of binary content.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub attachment: String,
}

impl Asset {
    /// Build an asset from raw file content.
    pub fn from_bytes(key: impl Into<String>, data: Vec<u8>) -> Self {
        let key = key.into();
        match classify(&data) {
            ContentKind::Text => match String::from_utf8(data) {
                Ok(value) => Self {
                    key,
                    value,
                    attachment: String::new(),
                },
                Err(err) => Self::binary(key, err.as_bytes()),
            },
            ContentKind::Binary => Self::binary(key, &data),
        }
    }

    fn binary(key: String, data: &[u8]) -> Self {
        Self {
            key,
            value: String::new(),
            attachment: STANDARD.encode(data),
        }
    }

    /// A key and some content.
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && (!self.value.is_empty() || !self.attachment.is_empty())
    }

    pub fn is_binary(&self) -> bool {
        !self.attachment.is_empty()
    }

    /// Decode the attachment back into bytes.
    pub fn decode_attachment(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.attachment)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<key: {}", self.key)?;
        if !self.value.is_empty() {
            write!(f, " | value: {} chars", self.value.len())?;
        }
        if !self.attachment.is_empty() {
            write!(f, " | attachment: {} chars", self.attachment.len())?;
        }
        f.write_str(">")
    }
}

// Assets sort by key; content only breaks ties.
impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.value.cmp(&other.value))
            .then_with(|| self.attachment.cmp(&other.attachment))
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How file content is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Binary,
}

/// Classify content by its first 512 bytes.
///
/// Control bytes other than tab, newline, form feed, carriage return and
/// escape mark the content as binary. Otherwise it is text when the whole
/// buffer is valid UTF-8.
pub fn classify(data: &[u8]) -> ContentKind {
    let head = &data[..data.len().min(SNIFF_LEN)];
    if head.iter().copied().any(is_binary_byte) {
        return ContentKind::Binary;
    }
    if std::str::from_utf8(data).is_ok() {
        ContentKind::Text
    } else {
        ContentKind::Binary
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::liquid(b"{% section 'header' %}\n".as_slice(), ContentKind::Text)]
    #[case::empty(b"".as_slice(), ContentKind::Text)]
    #[case::tabs_and_crlf(b"a\tb\r\nc\x0c".as_slice(), ContentKind::Text)]
    #[case::ansi_escape(b"\x1b[31mred\x1b[0m".as_slice(), ContentKind::Text)]
    #[case::utf8("caf\u{e9} \u{2603}".as_bytes(), ContentKind::Text)]
    #[case::png(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".as_slice(), ContentKind::Binary)]
    #[case::nul(b"abc\0def".as_slice(), ContentKind::Binary)]
    #[case::vertical_tab(b"a\x0bb".as_slice(), ContentKind::Binary)]
    #[case::latin1(b"caf\xe9".as_slice(), ContentKind::Binary)]
    fn classification(#[case] data: &[u8], #[case] expected: ContentKind) {
        assert_eq!(classify(data), expected);
    }

    #[test]
    fn control_bytes_past_the_sniff_window_are_ignored() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x01);
        assert_eq!(classify(&data), ContentKind::Text);
    }

    #[test]
    fn text_goes_to_value() {
        let asset = Asset::from_bytes("templates/index.liquid", b"{{ content }}".to_vec());
        assert_eq!(asset.value, "{{ content }}");
        assert!(asset.attachment.is_empty());
        assert!(asset.is_valid());
        assert!(!asset.is_binary());
    }

    #[test]
    fn binary_goes_to_attachment_as_base64() {
        let data = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];
        let asset = Asset::from_bytes("assets/logo.png", data.clone());
        assert!(asset.value.is_empty());
        assert_eq!(asset.attachment, "iVBORwD/");
        assert_eq!(asset.decode_attachment().unwrap(), data);
    }

    #[test]
    fn validity_needs_key_and_content() {
        assert!(!Asset::default().is_valid());
        assert!(!Asset::from_bytes("empty.txt", Vec::new()).is_valid());
        assert!(
            !Asset {
                key: String::new(),
                value: "x".into(),
                attachment: String::new(),
            }
            .is_valid()
        );
    }

    #[test]
    fn serialization_omits_empty_fields() {
        let asset = Asset::from_bytes("a.css", b"body{}".to_vec());
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, r#"{"key":"a.css","value":"body{}"}"#);

        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn display_summarizes_sizes() {
        let asset = Asset::from_bytes("a.css", b"body{}".to_vec());
        assert_eq!(asset.to_string(), "<key: a.css | value: 6 chars>");
        assert_eq!(Asset::default().to_string(), "<key: >");
    }

    #[test]
    fn assets_sort_by_key() {
        let mut assets = vec![
            Asset::from_bytes("b.js", b"b".to_vec()),
            Asset::from_bytes("a/z.css", b"z".to_vec()),
            Asset::from_bytes("a.js", b"a".to_vec()),
        ];
        assets.sort();
        let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a.js", "a/z.css", "b.js"]);
    }
}
