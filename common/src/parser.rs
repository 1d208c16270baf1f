//! 写真辨識レスポンスパーサー
//!
//! 辨識サービスは藥名を素のテキストで返す。辨識できなければ `NONE`。

use crate::types::Recognition;

/// 辨識不能を表す返答
pub const NO_MATCH_REPLY: &str = "NONE";

/// 返答の前後から取り除く記号
const WRAPPING_CHARS: &[char] = &['"', '\'', '「', '」', '。', '`'];

/// 辨識サービスの返答をパース
///
/// # Arguments
/// * `reply` - サービスが返したテキスト
///
/// # Returns
/// * `Recognition::Identified` - 藥名が得られた
/// * `Recognition::NoMatch` - 空または `NONE`
///
/// # Examples
/// ```
/// use pharmacy_lookup_common::{parse_recognition_reply, Recognition};
///
/// assert_eq!(
///     parse_recognition_reply(" 普拿疼\n"),
///     Recognition::Identified("普拿疼".to_string())
/// );
/// assert_eq!(parse_recognition_reply("NONE"), Recognition::NoMatch);
/// ```
pub fn parse_recognition_reply(reply: &str) -> Recognition {
    let name = reply
        .trim()
        .trim_matches(WRAPPING_CHARS)
        .trim();

    if name.is_empty() || name.eq_ignore_ascii_case(NO_MATCH_REPLY) {
        Recognition::NoMatch
    } else {
        Recognition::Identified(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(
            parse_recognition_reply("Panadol"),
            Recognition::Identified("Panadol".to_string())
        );
    }

    #[test]
    fn test_none_variants() {
        assert_eq!(parse_recognition_reply("NONE"), Recognition::NoMatch);
        assert_eq!(parse_recognition_reply(" none \n"), Recognition::NoMatch);
        assert_eq!(parse_recognition_reply("\"NONE\""), Recognition::NoMatch);
    }

    #[test]
    fn test_empty_reply_is_no_match() {
        assert_eq!(parse_recognition_reply(""), Recognition::NoMatch);
        assert_eq!(parse_recognition_reply("  \n\t"), Recognition::NoMatch);
        assert_eq!(parse_recognition_reply("「」"), Recognition::NoMatch);
    }

    #[test]
    fn test_wrapping_quotes_removed() {
        assert_eq!(
            parse_recognition_reply("「普拿疼」"),
            Recognition::Identified("普拿疼".to_string())
        );
        assert_eq!(
            parse_recognition_reply("\"阿斯匹靈\"。"),
            Recognition::Identified("阿斯匹靈".to_string())
        );
    }

    #[test]
    fn test_name_containing_none_is_kept() {
        assert_eq!(
            parse_recognition_reply("Nonessential"),
            Recognition::Identified("Nonessential".to_string())
        );
    }
}
