//! Text encodings accepted for feed files.

use std::{borrow::Cow, fmt, str::FromStr};

use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS, UTF_8};

use super::FeedReadError;

/// Encoding used to decode every file of a feed.
///
/// Accepts WHATWG labels plus the Python-style aliases common in GTFS-JP
/// tooling: `utf_8`, `utf_8_sig`, `shift_jis`, `cp932` and `euc_jp`.
///
/// # Examples
/// ```
/// use noriba_data::FeedEncoding;
///
/// let encoding: FeedEncoding = "cp932".parse().expect("known label");
/// assert_eq!(encoding.name(), "Shift_JIS");
/// assert!("klingon".parse::<FeedEncoding>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEncoding {
    encoding: &'static Encoding,
}

impl FeedEncoding {
    /// UTF-8 with an optional byte order mark, the GTFS-JP default.
    #[must_use]
    pub fn utf_8_sig() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Shift_JIS as written by Windows tools (code page 932).
    #[must_use]
    pub fn shift_jis() -> Self {
        Self {
            encoding: SHIFT_JIS,
        }
    }

    /// Resolve an encoding label.
    pub fn from_label(label: &str) -> Result<Self, FeedReadError> {
        let normalised = label.trim().to_ascii_lowercase().replace('_', "-");
        let encoding = match normalised.as_str() {
            "utf-8-sig" | "utf8-sig" => Some(UTF_8),
            "cp932" | "ms932" | "sjis" | "shift-jis" | "windows-31j" => Some(SHIFT_JIS),
            "eucjp" | "euc-jp" | "ujis" => Some(EUC_JP),
            other => Encoding::for_label(other.as_bytes()),
        };
        encoding
            .map(|encoding| Self { encoding })
            .ok_or_else(|| FeedReadError::UnknownEncoding {
                label: label.to_owned(),
            })
    }

    /// Canonical WHATWG name of the encoding.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.encoding.name()
    }

    /// Decode bytes, dropping a leading byte order mark.
    ///
    /// Returns `None` when the input holds a malformed sequence.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        let (text, had_errors) = self.encoding.decode_with_bom_removal(bytes);
        if had_errors { None } else { Some(text) }
    }
}

impl Default for FeedEncoding {
    fn default() -> Self {
        Self::utf_8_sig()
    }
}

impl FromStr for FeedEncoding {
    type Err = FeedReadError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::from_label(label)
    }
}

impl fmt::Display for FeedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("utf_8_sig", "UTF-8")]
    #[case("utf_8", "UTF-8")]
    #[case("UTF-8", "UTF-8")]
    #[case("shift_jis", "Shift_JIS")]
    #[case("cp932", "Shift_JIS")]
    #[case("euc_jp", "EUC-JP")]
    #[case(" latin1 ", "windows-1252")]
    fn resolves_labels(#[case] label: &str, #[case] expected: &str) {
        let encoding = FeedEncoding::from_label(label).expect("known label");
        assert_eq!(encoding.name(), expected);
    }

    #[rstest]
    fn rejects_unknown_labels() {
        let err = FeedEncoding::from_label("utf-9").expect_err("unknown label");
        assert!(matches!(err, FeedReadError::UnknownEncoding { label } if label == "utf-9"));
    }

    #[rstest]
    fn strips_utf8_bom() {
        let text = FeedEncoding::utf_8_sig()
            .decode(b"\xEF\xBB\xBFstop_id\nS1\n")
            .expect("valid UTF-8");
        assert_eq!(text, "stop_id\nS1\n");
    }

    #[rstest]
    fn decodes_shift_jis() {
        // "東京" in Shift_JIS.
        let text = FeedEncoding::shift_jis()
            .decode(&[0x93, 0x8C, 0x8B, 0x9E])
            .expect("valid Shift_JIS");
        assert_eq!(text, "東京");
    }

    #[rstest]
    fn rejects_malformed_utf8() {
        assert!(FeedEncoding::utf_8_sig().decode(&[0x66, 0xFF, 0x6F]).is_none());
    }
}
