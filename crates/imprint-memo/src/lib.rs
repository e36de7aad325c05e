// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! imprint-memo: function memoization over the imprint core.
//!
//! [`Memo`] composes the three core surfaces into the cache data flow: a
//! lookup miss traces the input, runs the computation against the traced
//! view, freezes the imprint, and stores the result; a hit returns the
//! stored result without running the computation at all.
//!
//! This layer is deliberately thin. Policy concerns (time-to-live, eviction,
//! per-instance lifecycles, annotation surfaces) belong to further wrappers
//! around [`Memo`] (or directly around the core surfaces), not here.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

use imprint_core::{trace, Datum, ImprintTreeMap, Reflect, TraceError};

/// A memoization cache for one computation.
///
/// The computation must be pure over what it reads: the cache records which
/// observations the computation made and replays only those on later inputs.
/// Values are returned by clone; store `Rc`/`Arc` payloads when cloning the
/// result itself would be expensive.
pub struct Memo<V> {
    map: ImprintTreeMap<V>,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Memo<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            map: ImprintTreeMap::new(),
        }
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<V: Clone> Memo<V> {
    /// Returns the cached result for `input`, computing and recording it on
    /// a miss.
    ///
    /// On a miss, `f` runs once against a traced view of `input`; everything
    /// it reads becomes the cache key for the stored result. Fails with
    /// [`TraceError::InvalidTarget`] when `input` is a primitive, since only
    /// objects carry observable structure to key on.
    pub fn get_or_compute(
        &mut self,
        input: &Datum,
        f: impl FnOnce(&dyn Reflect) -> V,
    ) -> Result<V, TraceError> {
        if let Datum::Object(obj) = input {
            if let Ok(hit) = self.map.lookup(&**obj) {
                tracing::debug!(entries = self.map.len(), "memo hit");
                return Ok(hit.clone());
            }
        }

        let active = trace(input.clone())?;
        let view = active.view();
        let out = f(&*view);
        let imprint = active.finalize();
        self.map.insert(imprint, out.clone());
        tracing::debug!(entries = self.map.len(), "memo miss recorded");
        Ok(out)
    }
}
