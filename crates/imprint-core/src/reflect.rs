// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The capability interface traced objects expose.
//!
//! Rust has no reflective property interception, so the tracer asks inputs to
//! implement [`Reflect`]: keyed reads, existence probes, and own-key
//! enumeration. Anything that can answer those three questions can be traced:
//! the provided [`Record`](crate::Record) type, or user-defined wrappers
//! over domain structs.
//!
//! The interface is deliberately read-only. Inputs of a memoized call must
//! not be written through the cache, so no write-shaped capability exists
//! here at all; the dynamic dispatch surface ([`Access`](crate::Access))
//! rejects write-shaped operations at runtime for callers that drive views
//! from operation streams.

use std::rc::Rc;
use std::sync::Arc;

use crate::key::Key;
use crate::value::{Prim, TypeTag};

/// A dynamic value handle: a primitive leaf or a shared object.
///
/// Object handles are `Rc<dyn Reflect>` so sub-objects can be handed out of
/// [`Reflect::get`] without tying them to the parent's borrow, and so view
/// identity can be compared with [`Rc::ptr_eq`].
#[derive(Clone)]
pub enum Datum {
    /// A primitive leaf.
    Prim(Prim),
    /// An object, traversable through [`Reflect`].
    Object(Rc<dyn Reflect>),
}

impl Datum {
    /// Short static name of the value's kind, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Prim(p) => p.kind(),
            Self::Object(_) => "object",
        }
    }
}

impl std::fmt::Debug for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prim(p) => write!(f, "{p:?}"),
            Self::Object(obj) => match obj.type_tag() {
                Some(tag) => write!(f, "<object {}>", tag.name()),
                None => write!(f, "<object>"),
            },
        }
    }
}

/// Read-only access to a keyed object.
///
/// Implementations must answer consistently within a single call of the
/// computation being traced: `get` and `has` agree on which keys exist, and
/// `own_keys` reports the host's enumeration order verbatim. The tracer
/// records exactly what these methods return; any normalization here would
/// leak into recorded imprints and produce false matches later.
pub trait Reflect {
    /// The object's runtime type tag, if it carries one.
    fn type_tag(&self) -> Option<Arc<TypeTag>> {
        None
    }

    /// Reads the value under `key`. `None` means the key is absent, which
    /// is itself an observation worth recording.
    fn get(&self, key: &Key) -> Option<Datum>;

    /// Probes whether `key` exists, without reading its value.
    fn has(&self, key: &Key) -> bool;

    /// Enumerates the own keys in the host's order.
    fn own_keys(&self) -> Vec<Key>;
}
