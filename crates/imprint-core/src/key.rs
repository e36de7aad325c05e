// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property keys for the dynamic value model.

use std::fmt;
use std::sync::Arc;

/// A property key: a named entry or a positional index.
///
/// Keys identify entries of a traced object. Named keys share their backing
/// storage (`Arc<str>`), so cloning a key while recording an access is a
/// refcount bump, not an allocation. The `Ord` impl gives keys a total order
/// (names before indices, names lexicographic, indices numeric), which the
/// imprint maps rely on for deterministic iteration and debug output.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A named entry (struct field, map key).
    Name(Arc<str>),
    /// A positional entry (sequence element).
    Index(u64),
}

impl Key {
    /// Builds a named key.
    pub fn name(name: impl AsRef<str>) -> Self {
        Self::Name(Arc::from(name.as_ref()))
    }

    /// Builds a positional key.
    pub fn index(index: u64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<u64> for Key {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name:?}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_order_before_indices() {
        let mut keys = vec![Key::index(2), Key::name("b"), Key::index(0), Key::name("a")];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::name("a"), Key::name("b"), Key::index(0), Key::index(2)]
        );
    }

    #[test]
    fn display_renders_indices_bracketed() {
        assert_eq!(Key::name("pos").to_string(), "pos");
        assert_eq!(Key::index(7).to_string(), "[7]");
    }
}
