//! Integration tests for MASK mode: only targeted values are masked.

use json_masker::{JsonMasker, JsonMaskingConfig, KeyMaskingConfig};

fn mask(keys: &[&str], input: &str) -> String {
    JsonMasker::for_keys(keys.iter().copied())
        .unwrap()
        .mask_str(input)
        .unwrap()
}

fn mask_with(key: &str, config: KeyMaskingConfig, input: &str) -> String {
    let config = JsonMaskingConfig::builder()
        .mask_key_with(key, config)
        .build()
        .unwrap();
    JsonMasker::new(config).unwrap().mask_str(input).unwrap()
}

mod defaults {
    use super::*;

    #[test]
    fn masks_strings_with_static_placeholder() {
        assert_eq!(
            mask(&["maskMe"], r#"{"maskMe":"secret"}"#),
            r#"{"maskMe":"***"}"#
        );
    }

    #[test]
    fn masks_booleans_as_strings() {
        assert_eq!(
            mask(&["maskMe"], r#"{"maskMe":false}"#),
            r#"{"maskMe":"&&&"}"#
        );
    }

    #[test]
    fn masks_numbers_as_strings() {
        assert_eq!(
            mask(&["n"], r#"{"n":-12.5e+3,"m":4}"#),
            r####"{"n":"###","m":4}"####
        );
    }

    #[test]
    fn never_masks_null() {
        assert_eq!(mask(&["a"], r#"{"a":null}"#), r#"{"a":null}"#);
    }

    #[test]
    fn leaves_unmatched_documents_byte_identical() {
        let input = "{\n  \"a\" : [ 1, 2.0, \"x\\\"y\", true, null ],\n  \"b\": {}\n}\n";
        assert_eq!(mask(&["absent"], input), input);
    }

    #[test]
    fn masks_every_occurrence_at_any_depth() {
        assert_eq!(
            mask(&["pin"], r#"{"pin":1,"card":{"pin":2,"list":[{"pin":"3"}]}}"#),
            r####"{"pin":"###","card":{"pin":"###","list":[{"pin":"***"}]}}"####
        );
    }

    #[test]
    fn ignores_targets_that_appear_as_values() {
        assert_eq!(
            mask(&["secret"], r#"{"key":"secret","list":["secret"]}"#),
            r#"{"key":"secret","list":["secret"]}"#
        );
    }
}

mod keys {
    use super::*;

    #[test]
    fn matches_ignoring_case_by_default() {
        assert_eq!(
            mask(&["maskMe"], r#"{"MASKME":"a","maskme":"b","MaskMe":"c"}"#),
            r#"{"MASKME":"***","maskme":"***","MaskMe":"***"}"#
        );
    }

    #[test]
    fn matches_non_ascii_keys_ignoring_case() {
        assert_eq!(
            mask(&["пароль"], r#"{"ПАРОЛЬ":"x","Пароль":"y"}"#),
            r#"{"ПАРОЛЬ":"***","Пароль":"***"}"#
        );
    }

    #[test]
    fn matches_case_sensitively_on_request() {
        let config = JsonMaskingConfig::builder()
            .mask_keys(["maskMe"])
            .case_sensitive_target_keys()
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        assert_eq!(
            masker.mask_str(r#"{"maskMe":"a","maskme":"b"}"#).unwrap(),
            r#"{"maskMe":"***","maskme":"b"}"#
        );
    }

    #[test]
    fn matches_escaped_keys() {
        assert_eq!(
            mask(&["password"], r#"{"pass\u0077ord":"hunter2"}"#),
            r#"{"pass\u0077ord":"***"}"#
        );
    }

    #[test]
    fn matches_empty_key() {
        assert_eq!(mask(&[""], r#"{"":"x","a":"y"}"#), r#"{"":"***","a":"y"}"#);
    }
}

mod containers {
    use super::*;

    #[test]
    fn masks_every_primitive_inside_a_matched_container() {
        assert_eq!(
            mask(&["data"], r#"{"data":["a",1,true,null,{"x":"y","z":[false]}],"id":1}"#),
            r####"{"data":["***","###","&&&",null,{"x":"***","z":["&&&"]}],"id":1}"####
        );
    }

    #[test]
    fn nested_override_beats_enclosing_config() {
        let config = JsonMaskingConfig::builder()
            .mask_keys(["user"])
            .mask_key_with(
                "email",
                KeyMaskingConfig::builder()
                    .mask_strings_with("[email]")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        assert_eq!(
            masker
                .mask_str(r#"{"user":{"email":"a@b.c","name":"ada"},"email":"x@y.z"}"#)
                .unwrap(),
            r#"{"user":{"email":"[email]","name":"***"},"email":"[email]"}"#
        );
    }

    #[test]
    fn enclosing_override_applies_to_nested_default_targets() {
        let config = JsonMaskingConfig::builder()
            .mask_keys(["name"])
            .mask_key_with(
                "user",
                KeyMaskingConfig::builder()
                    .mask_strings_with("[user]")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        assert_eq!(
            masker.mask_str(r#"{"user":{"name":"ada"},"name":"bob"}"#).unwrap(),
            r#"{"user":{"name":"[user]"},"name":"***"}"#
        );
    }

    #[test]
    fn disabled_object_masking_descends_into_objects() {
        let config = JsonMaskingConfig::builder()
            .mask_key_with(
                "wrapper",
                KeyMaskingConfig::builder().disable_object_masking().build().unwrap(),
            )
            .mask_keys(["inner"])
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        assert_eq!(
            masker
                .mask_str(r#"{"wrapper":{"inner":"x","other":"y"}}"#)
                .unwrap(),
            r#"{"wrapper":{"inner":"***","other":"y"}}"#
        );
    }

    #[test]
    fn disabled_array_masking_keeps_arrays_but_masks_primitives() {
        let config = KeyMaskingConfig::builder()
            .disable_array_masking()
            .build()
            .unwrap();
        assert_eq!(
            mask_with("tags", config, r#"{"tags":["a","b"],"tag":"c"}"#),
            r#"{"tags":["a","b"],"tag":"c"}"#
        );
        let config = KeyMaskingConfig::builder()
            .disable_array_masking()
            .build()
            .unwrap();
        assert_eq!(mask_with("tags", config, r#"{"tags":"a"}"#), r#"{"tags":"***"}"#);
    }
}

mod key_configs {
    use super::*;

    #[test]
    fn masks_each_character_preserving_length() {
        let config = KeyMaskingConfig::builder()
            .mask_string_characters_with("*")
            .build()
            .unwrap();
        assert_eq!(
            mask_with("s", config, r#"{"s":"héllo"}"#),
            r#"{"s":"*****"}"#
        );
    }

    #[test]
    fn counts_escapes_as_single_characters() {
        let config = KeyMaskingConfig::builder()
            .mask_string_characters_with("x")
            .build()
            .unwrap();
        assert_eq!(
            mask_with("s", config, r#"{"s":"a\nb\uD83D\uDE00\u00e9"}"#),
            r#"{"s":"xxxxx"}"#
        );
    }

    #[test]
    fn obfuscation_length_hides_the_original_length() {
        let config = KeyMaskingConfig::builder()
            .obfuscation_length(3)
            .build()
            .unwrap();
        let config = JsonMaskingConfig::builder()
            .mask_keys(["s", "n"])
            .default_key_config(config)
            .build()
            .unwrap();
        let masker = JsonMasker::new(config).unwrap();
        assert_eq!(
            masker
                .mask_str(r#"{"s":"a long secret","n":1234567,"t":"x"}"#)
                .unwrap(),
            r#"{"s":"***","n":888,"t":"x"}"#
        );
    }

    #[test]
    fn zero_obfuscation_length_turns_numbers_into_zero() {
        let config = KeyMaskingConfig::builder()
            .obfuscation_length(0)
            .build()
            .unwrap();
        assert_eq!(
            mask_with("n", config, r#"{"n":[42,"abc"]}"#),
            r#"{"n":[0,""]}"#
        );
    }

    #[test]
    fn number_options() {
        let digits = KeyMaskingConfig::builder()
            .mask_number_digits_with(1)
            .build()
            .unwrap();
        assert_eq!(mask_with("n", digits, r#"{"n":90210}"#), r#"{"n":11111}"#);

        let value = KeyMaskingConfig::builder()
            .mask_numbers_with_value(0)
            .build()
            .unwrap();
        assert_eq!(mask_with("n", value, r#"{"n":90210}"#), r#"{"n":0}"#);

        let disabled = KeyMaskingConfig::builder()
            .disable_number_masking()
            .build()
            .unwrap();
        assert_eq!(
            mask_with("n", disabled, r#"{"n":[90210,"x"]}"#),
            r#"{"n":[90210,"***"]}"#
        );
    }

    #[test]
    fn boolean_options() {
        let value = KeyMaskingConfig::builder()
            .mask_booleans_with_value(false)
            .build()
            .unwrap();
        assert_eq!(mask_with("b", value, r#"{"b":true}"#), r#"{"b":false}"#);

        let disabled = KeyMaskingConfig::builder()
            .disable_boolean_masking()
            .build()
            .unwrap();
        assert_eq!(mask_with("b", disabled, r#"{"b":true}"#), r#"{"b":true}"#);
    }
}

mod documents {
    use super::*;

    #[test]
    fn masks_json_lines() {
        assert_eq!(
            mask(&["a"], "{\"a\":1}\n{\"b\":2}\n{\"a\":\"x\"}\n"),
            "{\"a\":\"###\"}\n{\"b\":2}\n{\"a\":\"***\"}\n"
        );
    }

    #[test]
    fn top_level_primitives_are_left_alone() {
        assert_eq!(mask(&["a"], r#""secret""#), r#""secret""#);
        assert_eq!(mask(&["a"], "42"), "42");
    }

    #[test]
    fn byte_and_string_entry_points_agree() {
        let masker = JsonMasker::for_keys(["a"]).unwrap();
        let input = r#"{"a":"b","c":[1,{"a":true}]}"#;
        assert_eq!(
            masker.mask_bytes(input.as_bytes()).unwrap(),
            masker.mask_str(input).unwrap().into_bytes()
        );
        assert_eq!(
            masker.mask_vec(input.as_bytes().to_vec()).unwrap(),
            masker.mask_str(input).unwrap().into_bytes()
        );
    }

    #[test]
    fn masker_is_shared_across_threads() {
        let masker = std::sync::Arc::new(JsonMasker::for_keys(["a"]).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let masker = masker.clone();
                std::thread::spawn(move || masker.mask_str(&format!(r#"{{"a":{i},"b":{i}}}"#)).unwrap())
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!(r####"{{"a":"###","b":{i}}}"####));
        }
    }

    #[test]
    fn masked_output_keeps_the_document_shape() {
        let input = r#"{"a":{"b":[1,2.5e3,"x"]},"c":{"a":false,"d":[{"a":null}]},"e":"\u00e9"}"#;
        let output = mask(&["a"], input);
        let original: serde_json::Value = serde_json::from_str(input).unwrap();
        let masked: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(masked["a"]["b"], serde_json::json!(["###", "###", "***"]));
        assert_eq!(masked["c"]["a"], "&&&");
        assert_eq!(masked["c"]["d"], original["c"]["d"]);
        assert_eq!(masked["e"], original["e"]);
    }

    #[test]
    fn unmatched_documents_parse_to_the_same_value() {
        let input = "[ {\"k\" : [true, null, -0.5E-2]}, \"\\t\" ]";
        let output = mask(&["absent"], input);
        assert_eq!(output, input);
        let masked: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(masked, serde_json::from_str::<serde_json::Value>(input).unwrap());
    }
}
