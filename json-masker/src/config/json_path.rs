//! The supported JSONPath subset.
//!
//! Only definite paths made of object keys and array wildcards are accepted:
//! `$`, `$.a.b`, `$.a[*].b`, `$.a.*.b`. Every segment must be resolvable while
//! streaming left to right, so descendant segments, indices, filters, slices
//! and functions are rejected.

use std::{fmt, str::FromStr};

use crate::error::ConfigError;

pub(crate) const ROOT: &str = "$";
pub(crate) const WILDCARD: &str = "*";

/// A parsed JSONPath from the supported subset.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPath {
    segments: Vec<String>,
}

fn invalid(path: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidJsonPath {
        path: path.to_owned(),
        reason,
    }
}

impl JsonPath {
    /// The path addressing the whole document.
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT.to_owned()],
        }
    }

    pub fn parse(literal: &str) -> Result<Self, ConfigError> {
        if !literal.starts_with(ROOT) {
            return Err(invalid(literal, "must start with `$`"));
        }
        if literal.contains("..") {
            return Err(invalid(literal, "descendant segments are not supported"));
        }
        if literal.contains(['\'', '\\', '"']) {
            return Err(invalid(literal, "quoted and escaped segments are not supported"));
        }
        if literal.contains('?') {
            return Err(invalid(literal, "filter expressions are not supported"));
        }
        if literal.contains(':') {
            return Err(invalid(literal, "slices are not supported"));
        }
        if literal.contains(['(', ')']) {
            return Err(invalid(literal, "functions are not supported"));
        }

        let normalized = literal.replace("[*]", ".*");
        if normalized.contains(['[', ']']) {
            return Err(invalid(literal, "array indices are not supported, use `[*]`"));
        }
        let mut parts = normalized.split('.');
        if parts.next() != Some(ROOT) {
            return Err(invalid(literal, "`$` must be followed by `.` or `[`"));
        }

        let mut segments = vec![ROOT.to_owned()];
        for part in parts {
            if part.is_empty() {
                return Err(invalid(literal, "empty segment"));
            }
            if part.bytes().all(|byte| byte.is_ascii_digit()) {
                return Err(invalid(literal, "array indices are not supported, use `[*]`"));
            }
            if part != WILDCARD && part.contains('*') {
                return Err(invalid(literal, "wildcards must span a whole segment"));
            }
            segments.push(part.to_owned());
        }
        if segments.last().is_some_and(|last| last == WILDCARD) {
            return Err(invalid(
                literal,
                "a trailing wildcard is not supported, target the parent instead",
            ));
        }
        Ok(Self { segments })
    }

    /// Segments including the leading `$`.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// The same path with every key segment lower-cased, as matched when
    /// target keys are case-insensitive.
    pub(crate) fn to_lowercase(&self) -> Self {
        Self {
            segments: self.segments.iter().map(|segment| segment.to_lowercase()).collect(),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for JsonPath {
    type Err = ConfigError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        Self::parse(literal)
    }
}

/// Rejects path sets where a single JSON position could resolve to two
/// configured paths.
///
/// Two paths conflict when, at the first segment where they differ, either
/// side is a wildcard, or when one path is a prefix of the other.
pub(crate) fn check_ambiguity(paths: &[&JsonPath]) -> Result<(), ConfigError> {
    let mut sorted = paths.to_vec();
    sorted.sort();
    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            let diverging = first
                .segments
                .iter()
                .zip(&second.segments)
                .find(|(a, b)| a != b);
            let ambiguous = match diverging {
                Some((a, b)) => a == WILDCARD || b == WILDCARD,
                None => true,
            };
            if ambiguous {
                return Err(ConfigError::AmbiguousJsonPaths {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(literal: &str) -> Vec<String> {
        JsonPath::parse(literal).unwrap().segments().to_vec()
    }

    #[test]
    fn parses_dot_and_bracket_notation() {
        assert_eq!(segments("$"), ["$"]);
        assert_eq!(segments("$.a.b"), ["$", "a", "b"]);
        assert_eq!(segments("$.a[*].b"), ["$", "a", "*", "b"]);
        assert_eq!(segments("$[*].id"), ["$", "*", "id"]);
        assert_eq!(segments("$.a.*.b"), ["$", "a", "*", "b"]);
    }

    #[test]
    fn normalizes_display() {
        assert_eq!(JsonPath::parse("$.a[*].b").unwrap().to_string(), "$.a.*.b");
        assert_eq!("$".parse::<JsonPath>().unwrap(), JsonPath::root());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for literal in [
            "a.b",
            "$a",
            "$..a",
            "$['a']",
            r"$.a\.b",
            "$.a[0]",
            "$.a.0",
            "$.a[?(@.b)]",
            "$.a[1:2]",
            "$.a.length()",
            "$.a.",
            "$.a.b*",
        ] {
            assert!(
                matches!(JsonPath::parse(literal), Err(ConfigError::InvalidJsonPath { .. })),
                "{literal} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_trailing_wildcards() {
        assert!(JsonPath::parse("$.a.*").is_err());
        assert!(JsonPath::parse("$.a[*]").is_err());
        assert!(JsonPath::parse("$[*]").is_err());
    }

    #[test]
    fn wildcard_sibling_is_ambiguous() {
        let a = JsonPath::parse("$.a.*.c").unwrap();
        let b = JsonPath::parse("$.a.b.c").unwrap();
        let err = check_ambiguity(&[&b, &a]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousJsonPaths {
                first: "$.a.*.c".into(),
                second: "$.a.b.c".into(),
            }
        );
    }

    #[test]
    fn prefix_is_ambiguous() {
        let a = JsonPath::parse("$.a").unwrap();
        let b = JsonPath::parse("$.a.b").unwrap();
        assert!(check_ambiguity(&[&a, &b]).is_err());
    }

    #[test]
    fn disjoint_paths_are_fine() {
        let paths = ["$.a.b", "$.a.c", "$.x[*].y", "$.x[*].z"].map(|p| JsonPath::parse(p).unwrap());
        let refs: Vec<&JsonPath> = paths.iter().collect();
        assert!(check_ambiguity(&refs).is_ok());
    }
}
