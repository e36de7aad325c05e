// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property-level operations a traced view can be driven with.
//!
//! The method surface of [`View`](crate::View) covers ordinary use; this enum
//! exists for callers that replay recorded operation streams against a view
//! (fixtures, conformance harnesses). Read shapes forward and record; write
//! and introspection shapes are refused with
//! [`TraceError::Unsupported`](crate::TraceError::Unsupported) — inputs of a
//! memoized call are read-only, and tag/shape traffic is not modelled.
//!
//! Rejected variants carry only the key: the tracer refuses them before any
//! value would be consulted, so there is nothing else to carry.

use crate::key::Key;
use crate::reflect::Datum;

/// One property-level operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Read the value under a key.
    Get(Key),
    /// Probe whether a key exists.
    Has(Key),
    /// Enumerate the full own-key sequence.
    Keys,
    /// Assign a value under a key. Refused.
    Set(Key),
    /// Remove a key. Refused.
    Remove(Key),
    /// Redefine the shape of an entry. Refused.
    Define(Key),
    /// Query or replace the object's type tag. Refused.
    Retag,
    /// Seal the object against further extension. Refused.
    Seal,
    /// Call the underlying object. Refused.
    Invoke,
}

impl Access {
    /// Static string naming the operation.
    ///
    /// Single source of truth — never manually type these strings elsewhere.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Get(_) => "get",
            Self::Has(_) => "has",
            Self::Keys => "keys",
            Self::Set(_) => "set",
            Self::Remove(_) => "remove",
            Self::Define(_) => "define",
            Self::Retag => "retag",
            Self::Seal => "seal",
            Self::Invoke => "invoke",
        }
    }

    /// True for the operations the tracer forwards and records.
    pub fn is_read_shaped(&self) -> bool {
        matches!(self, Self::Get(_) | Self::Has(_) | Self::Keys)
    }
}

/// The outcome of a successfully dispatched read-shaped [`Access`].
#[derive(Clone, Debug)]
pub enum AccessReply {
    /// Reply to [`Access::Get`]: the value, or `None` for an absent key.
    Value(Option<Datum>),
    /// Reply to [`Access::Has`].
    Bool(bool),
    /// Reply to [`Access::Keys`], in the host's order.
    Keys(Vec<Key>),
}
