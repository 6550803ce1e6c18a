//! Tracks the trie node matching the JSONPath of the value being scanned.

use super::key_matcher::{KeyMatcher, NodeId};
use crate::util::DecodeError;

/// One checkpoint per open nesting level. `None` is the "off every configured
/// path" sentinel; it is still pushed so the stack depth always equals the
/// JSON nesting depth.
pub(crate) struct JsonPathTracker<'m> {
    matcher: &'m KeyMatcher,
    stack: Vec<Option<NodeId>>,
}

impl<'m> JsonPathTracker<'m> {
    /// Returns `None` when no JSONPaths are configured.
    pub(crate) fn new(matcher: &'m KeyMatcher) -> Option<Self> {
        let root = matcher.path_root()?;
        Some(Self {
            matcher,
            stack: vec![Some(root)],
        })
    }

    pub(crate) fn current(&self) -> Option<NodeId> {
        self.stack.last().copied().flatten()
    }

    /// Enters the value of an object member. A wildcard at this level wins
    /// over an exact key match.
    pub(crate) fn push_key_value_segment(&mut self, key: &[u8]) -> Result<(), DecodeError> {
        let next = match self.current().and_then(|node| self.matcher.child(node, b'.')) {
            Some(separator) => match self.matcher.child(separator, b'*') {
                Some(wildcard) => Some(wildcard),
                None => self.matcher.descend_segment(separator, key)?,
            },
            None => None,
        };
        self.stack.push(next);
        Ok(())
    }

    /// Enters the elements of an array; only a wildcard can match.
    pub(crate) fn push_array_segment(&mut self) {
        let next = self
            .current()
            .and_then(|node| self.matcher.child(node, b'.'))
            .and_then(|separator| self.matcher.child(separator, b'*'));
        self.stack.push(next);
    }

    pub(crate) fn backtrack(&mut self) {
        self.stack.pop();
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::JsonMaskingConfig,
        masking::key_matcher::Resolution,
    };

    fn matcher(paths: &[&str]) -> KeyMatcher {
        let config = JsonMaskingConfig::builder()
            .mask_json_paths(paths.iter().copied())
            .build()
            .unwrap();
        KeyMatcher::new(&config).unwrap()
    }

    fn is_match(tracker: &JsonPathTracker<'_>, matcher: &KeyMatcher) -> bool {
        matches!(matcher.resolve_path(tracker.current()), Resolution::Masked { .. })
    }

    #[test]
    fn absent_without_json_paths() {
        let config = JsonMaskingConfig::for_keys(["a"]).unwrap();
        let matcher = KeyMatcher::new(&config).unwrap();
        assert!(JsonPathTracker::new(&matcher).is_none());
    }

    #[test]
    fn follows_object_keys() {
        let matcher = matcher(&["$.a.b"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"a").unwrap();
        assert!(!is_match(&tracker, &matcher));
        tracker.push_key_value_segment(b"b").unwrap();
        assert!(is_match(&tracker, &matcher));
        tracker.backtrack();
        tracker.push_key_value_segment(b"c").unwrap();
        assert!(!is_match(&tracker, &matcher));
    }

    #[test]
    fn arrays_only_match_wildcards() {
        let matcher = matcher(&["$.a[*].b"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"a").unwrap();
        tracker.push_array_segment();
        tracker.push_key_value_segment(b"b").unwrap();
        assert!(is_match(&tracker, &matcher));
    }

    #[test]
    fn wildcard_matches_any_key() {
        let matcher = matcher(&["$.*.secret"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"anything").unwrap();
        tracker.push_key_value_segment(b"secret").unwrap();
        assert!(is_match(&tracker, &matcher));
    }

    #[test]
    fn sentinel_keeps_depth_in_step() {
        let matcher = matcher(&["$.a.b"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"x").unwrap();
        tracker.push_key_value_segment(b"a").unwrap();
        tracker.push_key_value_segment(b"b").unwrap();
        assert_eq!(tracker.depth(), 4);
        assert!(!is_match(&tracker, &matcher));
        tracker.backtrack();
        tracker.backtrack();
        tracker.backtrack();
        tracker.push_key_value_segment(b"a").unwrap();
        tracker.push_key_value_segment(b"b").unwrap();
        assert!(is_match(&tracker, &matcher));
    }

    #[test]
    fn escaped_keys_follow_the_same_path() {
        let matcher = matcher(&["$.a.b"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"A").unwrap();
        tracker.push_key_value_segment(br"\u0062").unwrap();
        assert!(is_match(&tracker, &matcher));
    }

    #[test]
    fn dotted_keys_stay_one_segment() {
        let matcher = matcher(&["$.a.b"]);
        let mut tracker = JsonPathTracker::new(&matcher).unwrap();
        tracker.push_key_value_segment(b"a.b").unwrap();
        assert!(!is_match(&tracker, &matcher));
        assert_eq!(tracker.current(), None);
        tracker.backtrack();
        tracker.push_key_value_segment(br"a\u002eb").unwrap();
        assert_eq!(tracker.current(), None);
    }
}
