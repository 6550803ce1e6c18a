//! Integration tests for malformed input.
//!
//! The masker only validates what it has to look at, but every structural
//! error it does see is reported as `InvalidJson` with the byte offset, and
//! no partial output is returned.

use json_masker::{JsonMasker, JsonMaskingConfig, MaskingError};

fn mask(input: &str) -> Result<String, MaskingError> {
    JsonMasker::for_keys(["key"]).unwrap().mask_str(input)
}

fn offset(input: &str) -> u64 {
    let err = mask(input).unwrap_err();
    assert!(err.is_invalid_json(), "{input}: {err}");
    err.offset().unwrap()
}

mod truncation {
    use super::*;

    #[test]
    fn unclosed_object() {
        assert_eq!(offset(r#"{"key":"value""#), 14);
    }

    #[test]
    fn unclosed_array() {
        assert_eq!(offset("[1,2"), 4);
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(offset(r#"{"other":"abc"#), 13);
    }

    #[test]
    fn dangling_escape() {
        assert!(mask(r#"{"other":"abc\"#).is_err());
    }

    #[test]
    fn missing_value() {
        assert_eq!(offset(r#"{"key":"#), 7);
    }

    #[test]
    fn truncated_literal() {
        assert_eq!(offset("[fals"), 5);
        assert_eq!(offset(r#"{"key":tr"#), 9);
    }
}

mod structure {
    use super::*;

    #[test]
    fn missing_colon() {
        assert_eq!(offset(r#"{"key" "value"}"#), 7);
    }

    #[test]
    fn missing_comma() {
        assert_eq!(offset(r#"{"a":1 "b":2}"#), 7);
        assert_eq!(offset("[1 2]"), 3);
    }

    #[test]
    fn non_string_key() {
        assert_eq!(offset("{key:1}"), 1);
    }

    #[test]
    fn trailing_comma() {
        assert_eq!(offset(r#"{"a":1,}"#), 7);
        assert_eq!(offset("[1,]"), 3);
    }

    #[test]
    fn mismatched_brackets() {
        assert_eq!(offset(r#"{"a":[1}"#), 7);
        assert_eq!(offset(r#"[{"a":1]"#), 7);
    }

    #[test]
    fn stray_characters() {
        assert_eq!(offset("@"), 0);
        assert_eq!(offset(r#"{"a":x}"#), 5);
    }

    #[test]
    fn invalid_masked_literal() {
        assert_eq!(offset(r#"{"key":fable}"#), 7);
    }

    #[test]
    fn malformed_escape_in_key() {
        assert_eq!(offset(r#"{"ke\x":1}"#), 4);
    }

    #[test]
    fn malformed_escapes_in_values() {
        assert_eq!(offset(r#"{"key":"x\u12"}"#), 9);
        assert_eq!(offset(r#"{"other":"\q"}"#), 10);
        assert_eq!(offset(r#"["\u00G0"]"#), 2);
    }
}

mod masker_errors {
    use super::*;

    #[test]
    fn malformed_escape_in_masked_string() {
        let config = JsonMaskingConfig::builder()
            .mask_key_with(
                "key",
                json_masker::KeyMaskingConfig::builder()
                    .mask_string_characters_with("*")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        let err = masker.mask_str(r#"{"key":"ab\uD83D"}"#).unwrap_err();
        assert!(err.is_invalid_json());
        assert_eq!(err.offset(), Some(10));
    }
}

mod depth {
    use super::*;

    fn nested(depth: usize) -> String {
        format!("{}{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn default_depth_is_bounded() {
        assert!(mask(&nested(1024)).is_ok());
        let err = mask(&nested(1025)).unwrap_err();
        assert!(err.is_invalid_json());
        assert_eq!(err.offset(), Some(1024));
    }

    #[test]
    fn deep_documents_do_not_overflow_the_stack() {
        let config = JsonMaskingConfig::builder()
            .mask_keys(["key"])
            .max_nesting_depth(1_000_000)
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        let input = nested(200_000);
        assert_eq!(masker.mask_str(&input).unwrap(), input);
    }
}
