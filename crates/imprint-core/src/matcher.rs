// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The compatibility decision between an imprint and a candidate value.
//!
//! An imprint matches a candidate exactly when replaying the recorded
//! observations against the candidate reproduces them: same tag (when the
//! handle is still live), same probe outcomes, same own-key sequence, same
//! primitives under the same keys, and recursively compatible sub-objects.
//! If none of the recorded observations diverge, the traced computation would
//! behave identically on the candidate.

use std::sync::Arc;

use crate::imprint::{Imprint, ReadObservation};
use crate::reflect::{Datum, Reflect};

/// Decides whether `target` is compatible with `imprint`.
///
/// Checks run in pre-filter-first order and short-circuit on the first
/// divergence:
///
/// 1. live type-tag handle → the candidate's tag must be the identical
///    allocation; a dead handle is skipped, never a failure;
/// 2. every recorded existence probe must reproduce its boolean; both
///    polarities are meaningful, so a probe recorded `false` matches only
///    while the key is still absent;
/// 3. a recorded own-key enumeration must reproduce element-wise, in order;
/// 4. every recorded read must reproduce: absent stays absent, primitives
///    compare strictly (IEEE for floats, so `NaN` never matches), and nested
///    observations recurse.
pub fn matches(imprint: &Imprint, target: &dyn Reflect) -> bool {
    if let Some(ctor) = imprint.ctor() {
        if let Some(expected) = ctor.live() {
            match target.type_tag() {
                Some(actual) if Arc::ptr_eq(&expected, &actual) => {}
                _ => return false,
            }
        }
    }

    for (key, expected) in imprint.probes() {
        if target.has(key) != expected {
            return false;
        }
    }

    if let Some(expected) = imprint.own_keys() {
        if target.own_keys() != expected {
            return false;
        }
    }

    for (key, expected) in imprint.reads() {
        let compatible = match (expected, target.get(key)) {
            (ReadObservation::Absent, None) => true,
            (ReadObservation::Prim(p), Some(Datum::Prim(actual))) => *p == actual,
            (ReadObservation::Nested(nested), Some(Datum::Object(obj))) => {
                matches(nested, &*obj)
            }
            _ => false,
        };
        if !compatible {
            return false;
        }
    }

    true
}

/// [`matches`] lifted to a [`Datum`]: primitives are never compatible with an
/// imprint, since only objects can reproduce keyed observations.
pub fn matches_datum(imprint: &Imprint, candidate: &Datum) -> bool {
    match candidate {
        Datum::Prim(_) => false,
        Datum::Object(obj) => matches(imprint, &**obj),
    }
}
