// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic value model: primitives, type tags, and the [`Record`] object type.
//!
//! The tracer observes arbitrary object graphs through the [`Reflect`]
//! capability interface. [`Record`] is the batteries-included implementation:
//! an insertion-ordered key/value table with an optional [`TypeTag`]. Own-key
//! enumeration reports insertion order verbatim; the order is part of what a
//! trace records, so it is never normalized.
//!
//! [`Reflect`]: crate::reflect::Reflect

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::key::Key;
use crate::reflect::{Datum, Reflect};

/// A primitive leaf value.
///
/// Equality is strict per variant: an `Int` never equals a `Float`, and float
/// comparison is IEEE (`NaN != NaN`). That is exactly the equality the
/// matcher applies to recorded reads, so a `NaN` recorded in an imprint can
/// never match again. Acceptable, since `NaN` is unusual in cache keys.
#[derive(Clone, PartialEq)]
pub enum Prim {
    /// The absent-by-intent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit IEEE float.
    Float(f64),
    /// An immutable string.
    Str(Arc<str>),
}

impl Prim {
    /// Short static name of the variant, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Debug for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A runtime type descriptor for traced objects.
///
/// User code holds tags via `Arc` and stamps objects with them; imprints keep
/// only `Weak` back-references, so a cached imprint never extends the
/// lifetime of a type. Two tags are the same type exactly when they are the
/// same allocation; the name is for diagnostics only.
#[derive(Debug)]
pub struct TypeTag {
    name: Box<str>,
}

impl TypeTag {
    /// Creates a new shared tag.
    pub fn new(name: impl AsRef<str>) -> Arc<Self> {
        Arc::new(Self {
            name: Box::from(name.as_ref()),
        })
    }

    /// Diagnostic name of the tag.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A dynamic value: a primitive leaf or a shared object.
#[derive(Clone, Debug)]
pub enum Value {
    /// A primitive leaf.
    Prim(Prim),
    /// A shared object. `Rc` so the same object can sit under several keys;
    /// that aliasing is what the tracer must observe path-sensitively.
    Object(Rc<Record>),
}

impl Value {
    /// The value as a [`Datum`] handle, ready for tracing or matching.
    pub fn datum(&self) -> Datum {
        match self {
            Self::Prim(p) => Datum::Prim(p.clone()),
            Self::Object(rec) => Datum::Object(rec.clone()),
        }
    }
}

impl From<Prim> for Value {
    fn from(p: Prim) -> Self {
        Self::Prim(p)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Prim(Prim::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Prim(Prim::Int(i))
    }
}

// Unsuffixed integer literals land here.
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Prim(Prim::Int(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Prim(Prim::Float(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Prim(Prim::Str(Arc::from(s)))
    }
}

impl From<Rc<Record>> for Value {
    fn from(rec: Rc<Record>) -> Self {
        Self::Object(rec)
    }
}

/// An insertion-ordered key/value table with an optional type tag.
///
/// Entries are kept in a `Vec` rather than a map: traced objects are small,
/// and own-key enumeration must reproduce insertion order exactly.
#[derive(Clone, Debug, Default)]
pub struct Record {
    tag: Option<Arc<TypeTag>>,
    entries: Vec<(Key, Value)>,
}

impl Record {
    /// Creates an empty, untagged record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record stamped with `tag`.
    pub fn tagged(tag: Arc<TypeTag>) -> Self {
        Self {
            tag: Some(tag),
            entries: Vec::new(),
        }
    }

    /// Sets an entry, replacing in place if the key already exists (the key
    /// keeps its original position in the enumeration order).
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes an entry; later keys shift up in the enumeration order.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let at = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(at).1)
    }

    /// Looks up an entry by key.
    pub fn entry(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Wraps the record for sharing.
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }
}

impl Reflect for Record {
    fn type_tag(&self) -> Option<Arc<TypeTag>> {
        self.tag.clone()
    }

    fn get(&self, key: &Key) -> Option<Datum> {
        self.entry(key).map(Value::datum)
    }

    fn has(&self, key: &Key) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    fn own_keys(&self) -> Vec<Key> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}
