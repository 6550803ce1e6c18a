//! The masking engine.
//!
//! [`JsonMasker`] compiles a [`JsonMaskingConfig`] once into a byte trie and
//! then masks any number of documents, either fully buffered or streamed
//! through a bounded window. Both paths run the same scanner; only the
//! [`state::MaskingState`] behind it differs.

mod key_matcher;
mod path_tracker;
mod scanner;
mod state;
mod streaming;

use std::{
    fmt,
    io::{Read, Write},
};

use self::{
    key_matcher::KeyMatcher,
    scanner::Scanner,
    state::{BufferedState, MaskingState},
    streaming::StreamingState,
};
use crate::{
    config::JsonMaskingConfig,
    error::{ConfigError, MaskingError},
};

/// A compiled, reusable JSON masker.
///
/// Construction validates the configuration and builds the lookup trie; the
/// masker itself is immutable and can be shared between threads.
///
/// ```
/// use json_masker::JsonMasker;
///
/// let masker = JsonMasker::for_keys(["password"])?;
/// let masked = masker.mask_str(r#"{"user":"ada","password":"hunter2"}"#)?;
/// assert_eq!(masked, r#"{"user":"ada","password":"***"}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JsonMasker {
    matcher: KeyMatcher,
    buffer_size: usize,
    max_nesting_depth: usize,
}

impl JsonMasker {
    /// Builds the key and JSONPath matcher for `config`. The masker can then
    /// be shared and reused for any number of documents.
    pub fn new(config: JsonMaskingConfig) -> Result<Self, ConfigError> {
        let matcher = KeyMatcher::new(&config)?;
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            mode = ?config.mode(),
            keys = config.keys().len(),
            json_paths = config.json_paths().len(),
            case_sensitive = config.is_case_sensitive(),
            "json masker configured"
        );
        Ok(Self {
            matcher,
            buffer_size: config.streaming_buffer_size(),
            max_nesting_depth: config.max_nesting_depth(),
        })
    }

    /// Masks the values of `keys` with the default config.
    pub fn for_keys<I, S>(keys: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(JsonMaskingConfig::for_keys(keys)?)
    }

    /// Masks a complete document.
    pub fn mask_bytes(&self, input: &[u8]) -> Result<Vec<u8>, MaskingError> {
        self.mask_vec(input.to_vec())
    }

    /// Masks a complete document, reusing `input` as the output when every
    /// replacement keeps its length.
    pub fn mask_vec(&self, input: Vec<u8>) -> Result<Vec<u8>, MaskingError> {
        let mut state = BufferedState::new(input);
        self.scan(&mut state)?;
        Ok(state.finish())
    }

    /// Masks a UTF-8 document.
    ///
    /// Fails with [`MaskingError::InvalidJson`] if a custom masker produced
    /// bytes that are not valid UTF-8.
    pub fn mask_str(&self, input: &str) -> Result<String, MaskingError> {
        let masked = self.mask_vec(input.as_bytes().to_vec())?;
        String::from_utf8(masked).map_err(|err| {
            let offset = err.utf8_error().valid_up_to() as u64;
            MaskingError::invalid_json("masked output is not valid UTF-8", offset)
        })
    }

    /// Masks everything `reader` produces into `writer` while holding at most
    /// one streaming buffer in memory.
    ///
    /// Output is written as soon as it is known to be final. When an error is
    /// returned, the bytes written so far are a prefix of the document and
    /// nothing past the failing token has been written.
    pub fn mask_stream<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<(), MaskingError> {
        let mut state = StreamingState::new(reader, writer, self.buffer_size);
        self.scan(&mut state)?;
        state.finish()
    }

    /// Masks a `serde_json` document by round-tripping it through its
    /// serialized form.
    #[cfg(feature = "json")]
    pub fn mask_json_value(
        &self,
        value: &serde_json::Value,
    ) -> Result<serde_json::Value, MaskingError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|err| MaskingError::invalid_json(err.to_string(), 0))?;
        let masked = self.mask_vec(bytes)?;
        serde_json::from_slice(&masked).map_err(|err| {
            MaskingError::invalid_json(format!("masked output is not valid JSON: {err}"), 0)
        })
    }

    fn scan<S: MaskingState>(&self, state: &mut S) -> Result<(), MaskingError> {
        let result = Scanner::new(state, &self.matcher, self.max_nesting_depth).run();
        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            ::tracing::trace!(error = %err, "masking aborted");
        }
        result
    }
}

impl fmt::Debug for JsonMasker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonMasker")
            .field("buffer_size", &self.buffer_size)
            .field("max_nesting_depth", &self.max_nesting_depth)
            .finish_non_exhaustive()
    }
}
