// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! imprint-core: dependency-tracking memoization core.
//!
//! Memoizes pure computations by what they *looked at*, not by what they were
//! given. A first evaluation runs against traced views that record every
//! keyed read, existence probe, and own-key enumeration into an [`Imprint`];
//! later inputs that reproduce the recorded observations reuse the stored
//! result, however much else about them differs.
//!
//! Three cooperating pieces:
//!
//! - the tracer ([`trace`], [`Trace`], [`View`]) — transparent read-only
//!   interception over a [`Reflect`] object graph;
//! - the matcher ([`matches`]) — decides whether a candidate value is
//!   compatible with a recorded imprint;
//! - the tree map ([`ImprintTreeMap`]) — stores many (imprint, value) pairs
//!   with shared prefixes factored out by [`split`], so lookup cost follows
//!   the overlap between imprints rather than their count.
//!
//! The crate is single-threaded by design: it instruments fine-grained
//! property access, which is not a useful concurrency boundary. Callers
//! serialize at the cache-entry level.
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

mod access;
mod imprint;
mod key;
mod matcher;
mod reflect;
mod split;
mod tracer;
mod tree;
mod value;

/// Property-level operation stream surface for traced views.
pub use access::{Access, AccessReply};
/// Frozen access records and their inspection API.
pub use imprint::{CtorRef, Imprint, ReadObservation};
/// Property keys.
pub use key::Key;
/// The compatibility decision.
pub use matcher::{matches, matches_datum};
/// The capability interface traced inputs implement.
pub use reflect::{Datum, Reflect};
/// Three-way imprint partition.
pub use split::{split, Split};
/// The access tracer.
pub use tracer::{trace, Trace, TraceError, View};
/// The imprint tree map.
pub use tree::{ImprintTreeMap, NoMatch};
/// The dynamic value model.
pub use value::{Prim, Record, TypeTag, Value};
