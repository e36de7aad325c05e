// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Three-way imprint partition.
//!
//! [`split`] factors two imprints into their shared assertions and the
//! remainders each side keeps. It is the central subroutine of the tree map:
//! insertion splits the incoming imprint against existing roots so that
//! common prefixes are stored once, and lookup cost then scales with the
//! overlap between imprints instead of their total number.
//!
//! The operation is a partition: overlaying `A\I` back onto `I` reassembles
//! `A`, and likewise for `B`. No assertion is lost or duplicated into the
//! shared part.

use crate::imprint::{Imprint, ReadObservation};

/// Result of [`split`]: shared assertions and per-side remainders.
///
/// A side that ends up with no assertions at all is `None`, not a vacant
/// imprint: `shared: None` means the two imprints had no overlap, and a
/// `None` remainder means that side was fully subsumed by the shared part.
#[derive(Debug, Default)]
pub struct Split {
    /// Assertions present in both inputs.
    pub shared: Option<Imprint>,
    /// Assertions only the first input carried.
    pub a_only: Option<Imprint>,
    /// Assertions only the second input carried.
    pub b_only: Option<Imprint>,
}

fn non_vacant(imprint: Imprint) -> Option<Imprint> {
    (!imprint.is_vacant()).then_some(imprint)
}

/// Partitions `a` and `b` into intersection and remainders.
///
/// Field rules:
///
/// - type-tag handles move to the shared part only when both are live and
///   identical; a dead handle is treated as absent and dropped; otherwise
///   each side keeps its own;
/// - own-key sequences are atomic: identical sequences are shared, anything
///   else stays on its side in full;
/// - existence probes share equal booleans; conflicting booleans stay on
///   *both* sides;
/// - reads share equal primitives and matching absences; nested observations
///   split recursively, and the objectness assertion itself is shared (the
///   shared part keeps a nested entry even when the sub-split has no common
///   assertions); mismatched observation kinds stay on both sides.
pub fn split(a: Imprint, b: Imprint) -> Split {
    let mut shared = Imprint::default();
    let mut a_rest = Imprint::default();
    let mut b_rest = Imprint::default();

    match (a.ctor, b.ctor) {
        (Some(ca), Some(cb)) => {
            if ca.same_live(&cb) {
                shared.ctor = Some(ca);
            } else {
                if ca.live().is_some() {
                    a_rest.ctor = Some(ca);
                }
                if cb.live().is_some() {
                    b_rest.ctor = Some(cb);
                }
            }
        }
        (Some(ca), None) => {
            if ca.live().is_some() {
                a_rest.ctor = Some(ca);
            }
        }
        (None, Some(cb)) => {
            if cb.live().is_some() {
                b_rest.ctor = Some(cb);
            }
        }
        (None, None) => {}
    }

    match (a.own_keys, b.own_keys) {
        (Some(ka), Some(kb)) if ka == kb => shared.own_keys = Some(ka),
        (ka, kb) => {
            a_rest.own_keys = ka;
            b_rest.own_keys = kb;
        }
    }

    let mut b_has = b.has;
    for (key, va) in a.has {
        match b_has.remove(&key) {
            Some(vb) if va == vb => {
                shared.has.insert(key, va);
            }
            Some(vb) => {
                a_rest.has.insert(key.clone(), va);
                b_rest.has.insert(key, vb);
            }
            None => {
                a_rest.has.insert(key, va);
            }
        }
    }
    b_rest.has.extend(b_has);

    let mut b_reads = b.reads;
    for (key, ra) in a.reads {
        let Some(rb) = b_reads.remove(&key) else {
            a_rest.reads.insert(key, ra);
            continue;
        };
        match (ra, rb) {
            (ReadObservation::Nested(na), ReadObservation::Nested(nb)) => {
                let sub = split(na, nb);
                shared.reads.insert(
                    key.clone(),
                    ReadObservation::Nested(sub.shared.unwrap_or_default()),
                );
                if let Some(rest) = sub.a_only {
                    a_rest.reads.insert(key.clone(), ReadObservation::Nested(rest));
                }
                if let Some(rest) = sub.b_only {
                    b_rest.reads.insert(key, ReadObservation::Nested(rest));
                }
            }
            (ReadObservation::Absent, ReadObservation::Absent) => {
                shared.reads.insert(key, ReadObservation::Absent);
            }
            (ReadObservation::Prim(pa), ReadObservation::Prim(pb)) if pa == pb => {
                shared.reads.insert(key, ReadObservation::Prim(pa));
            }
            (ra, rb) => {
                a_rest.reads.insert(key.clone(), ra);
                b_rest.reads.insert(key, rb);
            }
        }
    }
    b_rest.reads.extend(b_reads);

    Split {
        shared: non_vacant(shared),
        a_only: non_vacant(a_rest),
        b_only: non_vacant(b_rest),
    }
}
