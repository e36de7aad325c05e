// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Frozen access records.
//!
//! An [`Imprint`] is the durable result of a trace: everything a computation
//! observed about one object (reads, existence probes, the own-key
//! enumeration, and the type tag seen at record time). Imprints are built
//! mutably inside the tracer, frozen at finalize, and from then on owned by
//! the tree map, which restructures them only through
//! [`split`](crate::split::split).
//!
//! # Path-sensitivity
//!
//! An imprint describes accesses *through one path*. When the same underlying
//! object is reachable under two keys, each key gets its own independent
//! sub-imprint holding only the accesses made through it. The cache records
//! what a call depended on; it makes no assumption about the input's aliasing
//! topology.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::key::Key;
use crate::value::{Prim, TypeTag};

/// Weak handle to the [`TypeTag`] observed on an object at record time.
///
/// Used only as a cheap pre-filter during matching. Holding it never extends
/// the tag's lifetime; a dead handle is skipped by the matcher and treated as
/// absent by split, never as a failure.
#[derive(Clone)]
pub struct CtorRef(Weak<TypeTag>);

impl CtorRef {
    pub(crate) fn of(tag: &Arc<TypeTag>) -> Self {
        Self(Arc::downgrade(tag))
    }

    /// Upgrades the handle if the tag is still alive.
    pub fn live(&self) -> Option<Arc<TypeTag>> {
        self.0.upgrade()
    }

    /// True when both handles are live and point at the same tag.
    pub(crate) fn same_live(&self, other: &Self) -> bool {
        match (self.0.upgrade(), other.0.upgrade()) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}

impl PartialEq for CtorRef {
    /// Structural identity: same tag allocation, live or not.
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CtorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.upgrade() {
            Some(tag) => write!(f, "ctor({})", tag.name()),
            None => write!(f, "ctor(<dead>)"),
        }
    }
}

/// What a single keyed read observed.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadObservation {
    /// The read yielded nothing: the key was absent.
    Absent,
    /// The read yielded this primitive.
    Prim(Prim),
    /// The read yielded an object, traced further through this sub-imprint.
    /// An empty sub-imprint still asserts "this key yields an object".
    Nested(Imprint),
}

/// The recorded set of access observations made against a single object.
#[derive(Clone, Default, PartialEq)]
pub struct Imprint {
    pub(crate) ctor: Option<CtorRef>,
    pub(crate) reads: BTreeMap<Key, ReadObservation>,
    pub(crate) has: BTreeMap<Key, bool>,
    pub(crate) own_keys: Option<Vec<Key>>,
}

impl Imprint {
    /// The type-tag handle observed at record time, if any.
    pub fn ctor(&self) -> Option<&CtorRef> {
        self.ctor.as_ref()
    }

    /// The observation recorded for a read of `key`, if one was made.
    pub fn read(&self, key: &Key) -> Option<&ReadObservation> {
        self.reads.get(key)
    }

    /// The outcome recorded for an existence probe of `key`, if one was made.
    pub fn probe(&self, key: &Key) -> Option<bool> {
        self.has.get(key).copied()
    }

    /// The own-key sequence observed, if an enumeration was taken.
    /// `Some(&[])` (an object with no keys) is a meaningful observation.
    pub fn own_keys(&self) -> Option<&[Key]> {
        self.own_keys.as_deref()
    }

    /// Iterates over all recorded reads in key order.
    pub fn reads(&self) -> impl Iterator<Item = (&Key, &ReadObservation)> {
        self.reads.iter()
    }

    /// Iterates over all recorded existence probes in key order.
    pub fn probes(&self) -> impl Iterator<Item = (&Key, bool)> {
        self.has.iter().map(|(k, b)| (k, *b))
    }

    /// True when the imprint asserts nothing at all.
    pub fn is_vacant(&self) -> bool {
        self.ctor.is_none()
            && self.reads.is_empty()
            && self.has.is_empty()
            && self.own_keys.is_none()
    }

    /// Unions `later`'s assertions over this imprint's, recursing into nested
    /// observations. On conflicting assertions `later` wins, the same
    /// last-observation-wins rule the tracer applies while recording.
    ///
    /// This is the inverse of [`split`](crate::split::split): overlaying a
    /// remainder onto the shared part reassembles the original imprint. The
    /// tree map's node chains compose the same way; the pattern a value was
    /// recorded against is the overlay of the deltas along its path.
    pub fn overlay(mut self, later: Self) -> Self {
        if later.ctor.is_some() {
            self.ctor = later.ctor;
        }
        for (key, obs) in later.reads {
            let merged = match (self.reads.remove(&key), obs) {
                (Some(ReadObservation::Nested(mine)), ReadObservation::Nested(theirs)) => {
                    ReadObservation::Nested(mine.overlay(theirs))
                }
                (_, obs) => obs,
            };
            self.reads.insert(key, merged);
        }
        self.has.extend(later.has);
        if later.own_keys.is_some() {
            self.own_keys = later.own_keys;
        }
        self
    }
}

impl fmt::Debug for Imprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Imprint");
        if let Some(ctor) = &self.ctor {
            s.field("ctor", ctor);
        }
        if !self.reads.is_empty() {
            s.field("reads", &self.reads);
        }
        if !self.has.is_empty() {
            s.field("has", &self.has);
        }
        if let Some(keys) = &self.own_keys {
            s.field("own_keys", keys);
        }
        s.finish()
    }
}
