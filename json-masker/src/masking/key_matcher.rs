//! Byte trie over the target keys and JSONPaths.
//!
//! Nodes live in one arena and refer to children by index. With
//! case-insensitive matching the lower- and upper-case byte at each position
//! point at the same child, so lookups never normalize case and the structure
//! is a DAG rather than a tree.
//!
//! Keys hang off the key root (node 0). JSONPaths are inserted in their
//! normalized form (`$.a.*.b`) under a separate synthetic root, so a key that
//! happens to start with `$` never collides with a path.

use crate::{
    config::{JsonMaskingConfig, KeyMaskingConfig, Target, TargetKeyMode},
    error::ConfigError,
    util::{DecodeError, ascii::BACKSLASH, escape::decode_escape},
};

/// Index of a node in the arena.
pub(crate) type NodeId = u32;

const KEY_ROOT: NodeId = 0;
/// Marks an empty child slot. Roots are never children, so index 0 is free.
const NO_CHILD: NodeId = 0;

struct TrieNode {
    children: Box<[NodeId; 256]>,
    end_of_word: bool,
    negative_match: bool,
    config: Option<KeyMaskingConfig>,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            children: Box::new([NO_CHILD; 256]),
            end_of_word: false,
            negative_match: false,
            config: None,
        }
    }
}

/// The decision for one value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Resolution<'a> {
    /// Not a target (MASK mode).
    Unmatched,
    /// Explicitly allowed (ALLOW mode): the value is copied untouched.
    Allowed,
    /// Mask with `config`. `specific` is false when the config is the
    /// default one, which lets an enclosing masked container win.
    Masked {
        config: &'a KeyMaskingConfig,
        specific: bool,
    },
}

pub(crate) struct KeyMatcher {
    nodes: Vec<TrieNode>,
    path_root: Option<NodeId>,
    mode: TargetKeyMode,
    case_sensitive: bool,
    default_config: KeyMaskingConfig,
}

impl KeyMatcher {
    pub(crate) fn new(config: &JsonMaskingConfig) -> Result<Self, ConfigError> {
        let mut matcher = Self {
            nodes: vec![TrieNode::new()],
            path_root: None,
            mode: config.mode(),
            case_sensitive: config.is_case_sensitive(),
            default_config: config.default_config().clone(),
        };
        for key in config.keys() {
            matcher.insert_target(KEY_ROOT, &key.target, key)?;
        }
        if config.has_json_paths() {
            let synthetic_root = matcher.push_node()?;
            let path_root = matcher.insert(synthetic_root, "$")?;
            matcher.path_root = Some(path_root);
            for path in config.json_paths() {
                matcher.insert_target(synthetic_root, &path.target.to_string(), path)?;
            }
        }
        Ok(matcher)
    }

    fn push_node(&mut self) -> Result<NodeId, ConfigError> {
        let id = NodeId::try_from(self.nodes.len()).map_err(|_| ConfigError::TooManyTargets)?;
        self.nodes.push(TrieNode::new());
        Ok(id)
    }

    fn insert_target<T>(
        &mut self,
        root: NodeId,
        word: &str,
        target: &Target<T>,
    ) -> Result<(), ConfigError> {
        let node = self.insert(root, word)?;
        let negative_match = self.mode == TargetKeyMode::Allow && target.config.is_some();
        let node = &mut self.nodes[node as usize];
        node.end_of_word = true;
        node.negative_match = negative_match;
        node.config.clone_from(&target.config);
        Ok(())
    }

    /// Inserts the bytes of `word` below `root` and returns the final node.
    fn insert(&mut self, root: NodeId, word: &str) -> Result<NodeId, ConfigError> {
        let bytes = word.as_bytes();
        let folded = if self.case_sensitive {
            None
        } else {
            let lower = word.to_lowercase();
            let upper = word.to_uppercase();
            if lower.len() != bytes.len() || upper.len() != bytes.len() {
                return Err(ConfigError::CaseFoldLengthMismatch(word.to_owned()));
            }
            Some((lower.into_bytes(), upper.into_bytes()))
        };

        let mut node = root;
        for (i, &byte) in bytes.iter().enumerate() {
            let child = match self.child(node, byte) {
                Some(child) => child,
                None => {
                    let child = self.push_node()?;
                    self.nodes[node as usize].children[byte as usize] = child;
                    child
                }
            };
            if let Some((lower, upper)) = &folded {
                let children = &mut self.nodes[node as usize].children;
                for alternative in [lower[i], upper[i]] {
                    let slot = &mut children[alternative as usize];
                    if *slot == NO_CHILD {
                        *slot = child;
                    }
                }
            }
            node = child;
        }
        Ok(node)
    }

    #[inline]
    pub(crate) fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let child = self.nodes[node as usize].children[byte as usize];
        (child != NO_CHILD).then_some(child)
    }

    pub(crate) fn mode(&self) -> TargetKeyMode {
        self.mode
    }

    /// The node for `$`, when JSONPaths are configured.
    pub(crate) fn path_root(&self) -> Option<NodeId> {
        self.path_root
    }

    /// Descends from `node` over a raw JSON key, decoding escapes on the fly
    /// so `"\u0061"` follows the same path as `"a"`.
    pub(crate) fn descend_key(&self, node: NodeId, key: &[u8]) -> Result<Option<NodeId>, DecodeError> {
        self.descend(node, key, None)
    }

    /// Like [`KeyMatcher::descend_key`] for one JSONPath segment: a key
    /// containing `.` never spans several segments.
    pub(crate) fn descend_segment(&self, node: NodeId, key: &[u8]) -> Result<Option<NodeId>, DecodeError> {
        self.descend(node, key, Some(b'.'))
    }

    fn descend(&self, mut node: NodeId, key: &[u8], separator: Option<u8>) -> Result<Option<NodeId>, DecodeError> {
        let step = |node: &mut NodeId, byte: u8| match self.child(*node, byte) {
            Some(child) if Some(byte) != separator => {
                *node = child;
                true
            }
            _ => false,
        };
        let mut i = 0;
        while i < key.len() {
            if key[i] == BACKSLASH {
                let (ch, consumed) = decode_escape(key, i)?;
                let mut encoded = [0_u8; 4];
                for &byte in ch.encode_utf8(&mut encoded).as_bytes() {
                    if !step(&mut node, byte) {
                        return Ok(None);
                    }
                }
                i += consumed;
            } else {
                if !step(&mut node, key[i]) {
                    return Ok(None);
                }
                i += 1;
            }
        }
        Ok(Some(node))
    }

    fn end_of_word(&self, node: NodeId) -> bool {
        self.nodes[node as usize].end_of_word
    }

    /// Resolves an object member by its JSONPath position first and its raw
    /// key second.
    pub(crate) fn resolve(&self, key: &[u8], path: Option<NodeId>) -> Result<Resolution<'_>, DecodeError> {
        if let Some(node) = path.filter(|&node| self.end_of_word(node)) {
            return Ok(self.resolution_for(Some(node)));
        }
        let matched = self
            .descend_key(KEY_ROOT, key)?
            .filter(|&node| self.end_of_word(node));
        Ok(self.resolution_for(matched))
    }

    /// Resolves a value that has no key (the document root), by JSONPath only.
    pub(crate) fn resolve_path(&self, path: Option<NodeId>) -> Resolution<'_> {
        self.resolution_for(path.filter(|&node| self.end_of_word(node)))
    }

    fn resolution_for(&self, matched: Option<NodeId>) -> Resolution<'_> {
        let node = matched.map(|node| &self.nodes[node as usize]);
        match (self.mode, node) {
            (TargetKeyMode::Mask, None) => Resolution::Unmatched,
            (TargetKeyMode::Mask, Some(node)) => Resolution::Masked {
                config: node.config.as_ref().unwrap_or(&self.default_config),
                specific: node.config.is_some(),
            },
            (TargetKeyMode::Allow, None) => Resolution::Masked {
                config: &self.default_config,
                specific: false,
            },
            (TargetKeyMode::Allow, Some(node)) if node.negative_match => Resolution::Masked {
                config: node.config.as_ref().unwrap_or(&self.default_config),
                specific: true,
            },
            (TargetKeyMode::Allow, Some(_)) => Resolution::Allowed,
        }
    }
}
