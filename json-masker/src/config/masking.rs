//! Document-level masking configuration.

use std::collections::HashSet;

use super::{
    json_path::{JsonPath, check_ambiguity},
    key::KeyMaskingConfig,
};
use crate::error::ConfigError;

/// Initial streaming buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
/// Smallest streaming buffer: the length of `false`, the longest literal the
/// scanner skips by a fixed jump.
pub const MIN_BUFFER_SIZE: usize = 5;
/// Ceiling for streaming buffer growth. A single token that does not fit is
/// rejected as invalid input.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;
/// Default bound on object/array nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 1024;

/// Whether the configured targets are masked or exempt from masking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKeyMode {
    /// Only targeted values are masked.
    Mask,
    /// Everything is masked except targeted values.
    Allow,
}

/// A configured key or JSONPath.
///
/// In [`TargetKeyMode::Mask`], `config` overrides the default config. In
/// [`TargetKeyMode::Allow`], a target with a config is an exception that is
/// masked with that config; a target without one is allowed.
#[derive(Clone, Debug)]
pub(crate) struct Target<T> {
    pub(crate) target: T,
    pub(crate) config: Option<KeyMaskingConfig>,
}

/// The complete, validated configuration of a [`crate::JsonMasker`].
#[derive(Clone, Debug)]
pub struct JsonMaskingConfig {
    mode: TargetKeyMode,
    keys: Vec<Target<String>>,
    json_paths: Vec<Target<JsonPath>>,
    case_sensitive: bool,
    default_config: KeyMaskingConfig,
    buffer_size: usize,
    max_nesting_depth: usize,
}

impl JsonMaskingConfig {
    /// Starts an empty builder; at least one target or allow list is needed.
    #[must_use]
    pub fn builder() -> JsonMaskingConfigBuilder {
        JsonMaskingConfigBuilder::default()
    }

    /// Masks the given keys with the default config.
    pub fn for_keys<I, S>(keys: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().mask_keys(keys).build()
    }

    /// MASK when only targets were given, ALLOW when an allow list was.
    pub fn mode(&self) -> TargetKeyMode {
        self.mode
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The config used for targets without their own override.
    pub fn default_config(&self) -> &KeyMaskingConfig {
        &self.default_config
    }

    /// Initial buffer size of [`crate::JsonMasker::mask_stream`].
    pub fn streaming_buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    pub fn has_json_paths(&self) -> bool {
        !self.json_paths.is_empty()
    }

    pub(crate) fn keys(&self) -> &[Target<String>] {
        &self.keys
    }

    pub(crate) fn json_paths(&self) -> &[Target<JsonPath>] {
        &self.json_paths
    }
}

/// Builder for [`JsonMaskingConfig`].
///
/// ```
/// use json_masker::{JsonMaskingConfig, KeyMaskingConfig};
///
/// let config = JsonMaskingConfig::builder()
///     .mask_keys(["password", "ssn"])
///     .mask_json_paths(["$.card.number"])
///     .mask_key_with("pin", KeyMaskingConfig::builder().obfuscation_length(4).build()?)
///     .build()?;
/// # Ok::<(), json_masker::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonMaskingConfigBuilder {
    masked_keys: Vec<(String, Option<KeyMaskingConfig>)>,
    masked_paths: Vec<(String, Option<KeyMaskingConfig>)>,
    allowed_keys: Vec<String>,
    allowed_paths: Vec<String>,
    mask_requested: bool,
    allow_requested: bool,
    case_sensitive: bool,
    default_config: Option<KeyMaskingConfig>,
    buffer_size: Option<usize>,
    max_nesting_depth: Option<usize>,
}

impl JsonMaskingConfigBuilder {
    /// Masks values under these keys, wherever they appear.
    #[must_use]
    pub fn mask_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask_requested = true;
        self.masked_keys
            .extend(keys.into_iter().map(|key| (key.into(), None)));
        self
    }

    /// Masks values under `key` with a specific config.
    ///
    /// In ALLOW mode this registers an exception: the key is masked with
    /// `config` even though everything else around it is governed by the
    /// allow list.
    #[must_use]
    pub fn mask_key_with(mut self, key: impl Into<String>, config: KeyMaskingConfig) -> Self {
        self.masked_keys.push((key.into(), Some(config)));
        self
    }

    #[must_use]
    pub fn mask_json_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask_requested = true;
        self.masked_paths
            .extend(paths.into_iter().map(|path| (path.into(), None)));
        self
    }

    #[must_use]
    pub fn mask_json_path_with(mut self, path: impl Into<String>, config: KeyMaskingConfig) -> Self {
        self.masked_paths.push((path.into(), Some(config)));
        self
    }

    /// Switches to ALLOW mode: everything is masked except these keys.
    ///
    /// An empty iterator allows nothing, so every value is masked.
    #[must_use]
    pub fn allow_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_requested = true;
        self.allowed_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn allow_json_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_requested = true;
        self.allowed_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Matches keys and JSONPath segments byte for byte. Targets are matched
    /// ignoring case by default.
    #[must_use]
    pub fn case_sensitive_target_keys(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// The config for matched values without a specific config, and for every
    /// masked value in ALLOW mode.
    #[must_use]
    pub fn default_key_config(mut self, config: KeyMaskingConfig) -> Self {
        self.default_config = Some(config);
        self
    }

    /// Initial buffer size for [`crate::JsonMasker::mask_stream`].
    #[must_use]
    pub fn streaming_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    #[must_use]
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = Some(depth);
        self
    }

    pub fn build(self) -> Result<JsonMaskingConfig, ConfigError> {
        let mode = match (self.mask_requested, self.allow_requested) {
            (false, false) if self.masked_keys.is_empty() && self.masked_paths.is_empty() => {
                return Err(ConfigError::NoTargets);
            }
            (true, true) => {
                return Err(ConfigError::ModeConflict(
                    "mask targets without a per-key config in ALLOW mode",
                ));
            }
            (_, true) => TargetKeyMode::Allow,
            (_, false) => TargetKeyMode::Mask,
        };
        if mode == TargetKeyMode::Mask && self.masked_keys.is_empty() && self.masked_paths.is_empty()
        {
            return Err(ConfigError::EmptyTargetSet("key or JSONPath to mask"));
        }

        let mut keys: Vec<Target<String>> = Vec::new();
        let mut json_paths: Vec<Target<JsonPath>> = Vec::new();
        let allowed_keys = self.allowed_keys.into_iter().map(|key| (key, None));
        for (target, config) in self.masked_keys.into_iter().chain(allowed_keys) {
            keys.push(Target { target, config });
        }
        let allowed_paths = self.allowed_paths.into_iter().map(|path| (path, None));
        for (literal, config) in self.masked_paths.into_iter().chain(allowed_paths) {
            let target = JsonPath::parse(&literal)?;
            if mode == TargetKeyMode::Allow && target.is_root() && config.is_none() {
                return Err(ConfigError::InvalidJsonPath {
                    path: literal,
                    reason: "the root cannot be allowed",
                });
            }
            json_paths.push(Target { target, config });
        }

        let mut seen = HashSet::new();
        for key in &keys {
            let normalized = if self.case_sensitive {
                key.target.clone()
            } else {
                key.target.to_lowercase()
            };
            if !seen.insert(normalized) {
                return Err(ConfigError::DuplicateTarget(key.target.clone()));
            }
        }
        let folded: Vec<JsonPath> = json_paths
            .iter()
            .map(|path| {
                if self.case_sensitive {
                    path.target.clone()
                } else {
                    path.target.to_lowercase()
                }
            })
            .collect();
        let mut seen = HashSet::new();
        for (path, folded) in json_paths.iter().zip(&folded) {
            if !seen.insert(folded) {
                return Err(ConfigError::DuplicateTarget(path.target.to_string()));
            }
        }
        check_ambiguity(&folded.iter().collect::<Vec<_>>())?;

        let buffer_size = self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(ConfigError::BufferTooSmall {
                minimum: MIN_BUFFER_SIZE,
                requested: buffer_size,
            });
        }
        let max_nesting_depth = self.max_nesting_depth.unwrap_or(DEFAULT_MAX_NESTING_DEPTH);
        if max_nesting_depth == 0 {
            return Err(ConfigError::ZeroNestingDepth);
        }

        Ok(JsonMaskingConfig {
            mode,
            keys,
            json_paths,
            case_sensitive: self.case_sensitive,
            default_config: self.default_config.unwrap_or_default(),
            buffer_size,
            max_nesting_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_targets() {
        assert_eq!(JsonMaskingConfig::builder().build().unwrap_err(), ConfigError::NoTargets);
        assert!(matches!(
            JsonMaskingConfig::builder().mask_keys(Vec::<String>::new()).build(),
            Err(ConfigError::EmptyTargetSet(_))
        ));
    }

    #[test]
    fn json_path_duplicates_follow_case_sensitivity() {
        assert_eq!(
            JsonMaskingConfig::builder()
                .mask_json_paths(["$.a.b", "$.A.B"])
                .build()
                .unwrap_err(),
            ConfigError::DuplicateTarget("$.A.B".into())
        );
        assert!(matches!(
            JsonMaskingConfig::builder().mask_json_paths(["$.A", "$.a.b"]).build(),
            Err(ConfigError::AmbiguousJsonPaths { .. })
        ));
        assert!(
            JsonMaskingConfig::builder()
                .mask_json_paths(["$.a.b", "$.A.B"])
                .case_sensitive_target_keys()
                .build()
                .is_ok()
        );
    }

    #[test]
    fn mask_mode_by_default() {
        let config = JsonMaskingConfig::for_keys(["a"]).unwrap();
        assert_eq!(config.mode(), TargetKeyMode::Mask);
        assert!(!config.is_case_sensitive());
        assert_eq!(config.streaming_buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(config.max_nesting_depth(), DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn per_key_configs_alone_select_mask_mode() {
        let config = JsonMaskingConfig::builder()
            .mask_key_with("a", KeyMaskingConfig::default())
            .build()
            .unwrap();
        assert_eq!(config.mode(), TargetKeyMode::Mask);
        assert!(config.keys()[0].config.is_some());
    }

    #[test]
    fn empty_allow_list_masks_everything() {
        let config = JsonMaskingConfig::builder()
            .allow_keys(Vec::<String>::new())
            .build()
            .unwrap();
        assert_eq!(config.mode(), TargetKeyMode::Allow);
        assert!(config.keys().is_empty());
    }

    #[test]
    fn allow_mode_accepts_masking_exceptions_only() {
        let config = JsonMaskingConfig::builder()
            .allow_keys(["id"])
            .mask_key_with("token", KeyMaskingConfig::default())
            .build()
            .unwrap();
        assert_eq!(config.mode(), TargetKeyMode::Allow);
        assert_eq!(config.keys().len(), 2);

        let err = JsonMaskingConfig::builder()
            .allow_keys(["id"])
            .mask_keys(["token"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ModeConflict(_)));
    }

    #[test]
    fn root_cannot_be_allowed() {
        let err = JsonMaskingConfig::builder()
            .allow_json_paths(["$"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJsonPath { .. }));
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = JsonMaskingConfig::builder()
            .mask_keys(["Secret", "secret"])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateTarget("secret".into()));

        let config = JsonMaskingConfig::builder()
            .mask_keys(["Secret", "secret"])
            .case_sensitive_target_keys()
            .build();
        assert!(config.is_ok());

        let err = JsonMaskingConfig::builder()
            .mask_json_paths(["$.a[*].b", "$.a.*.b"])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateTarget("$.a.*.b".into()));
    }

    #[test]
    fn ambiguous_paths_are_rejected() {
        let err = JsonMaskingConfig::builder()
            .mask_json_paths(["$.a.b", "$.a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousJsonPaths { .. }));
    }

    #[test]
    fn validates_limits() {
        let err = JsonMaskingConfig::builder()
            .mask_keys(["a"])
            .streaming_buffer_size(4)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::BufferTooSmall { minimum: 5, requested: 4 });

        let err = JsonMaskingConfig::builder()
            .mask_keys(["a"])
            .max_nesting_depth(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroNestingDepth);
    }
}
