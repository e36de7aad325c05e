// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The access tracer: views that forward reads while recording them.
//!
//! [`trace`] wraps a root object in a [`View`]. The view implements
//! [`Reflect`], so it is drop-in for the root under read-only workloads:
//! reads yield the same values, probes the same booleans, enumeration the
//! same sequence. Every access is recorded into a mutable imprint node; reads
//! that yield objects hand out child views recording into child nodes.
//!
//! [`Trace::finalize`] freezes the recording into an [`Imprint`] and disables
//! every view created under the root: reads still forward, but record
//! nothing. A `Trace` that is dropped without finalize leaks its partial
//! recording and leaves outstanding views recording; callers own the
//! obligation to finalize every successful trace path.
//!
//! # Per-path recording
//!
//! Child views are cached per node and key, not per underlying object. When
//! the same object is reachable under two keys, each key gets its own view
//! and its own sub-imprint; accesses through one path never leak into the
//! other. Repeated reads of one key return the identical view (`Rc::ptr_eq`),
//! so consumers may compare view identities.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::access::{Access, AccessReply};
use crate::imprint::{CtorRef, Imprint, ReadObservation};
use crate::key::Key;
use crate::reflect::{Datum, Reflect};
use crate::value::TypeTag;

/// Errors surfaced by the tracer. Both variants indicate misuse by the
/// caller, not recoverable runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The trace root was null or a primitive; only objects can be traced.
    #[error("[TRACE_INVALID_TARGET] trace root must be an object, got {kind}")]
    InvalidTarget {
        /// Kind of value that was offered as a root.
        kind: &'static str,
    },
    /// A write-shaped or introspection-shaped operation reached a traced
    /// view. Inputs of a memoized call are read-only.
    #[error("[TRACE_UNSUPPORTED] operation `{kind}` is not a read; traced views forward reads only")]
    Unsupported {
        /// Name of the refused operation (see [`Access::kind`]).
        kind: &'static str,
    },
}

/// The mutable imprint node a view records into.
pub(crate) struct Node {
    ctor: Option<CtorRef>,
    reads: BTreeMap<Key, NodeRead>,
    has: BTreeMap<Key, bool>,
    own_keys: Option<Vec<Key>>,
}

enum NodeRead {
    Absent,
    Prim(crate::value::Prim),
    Nested(Rc<RefCell<Node>>),
}

impl Node {
    fn observing(target: &dyn Reflect) -> Self {
        Self {
            ctor: target.type_tag().as_ref().map(CtorRef::of),
            reads: BTreeMap::new(),
            has: BTreeMap::new(),
            own_keys: None,
        }
    }

    /// Converts the mutable recording into a frozen [`Imprint`].
    ///
    /// Nested observations are kept even when empty: they assert that the
    /// key yields an object. Nodes form a tree (one per path), so the
    /// recursion terminates even over cyclic object graphs.
    fn freeze(&self) -> Imprint {
        Imprint {
            ctor: self.ctor.clone(),
            reads: self
                .reads
                .iter()
                .map(|(key, read)| {
                    let obs = match read {
                        NodeRead::Absent => ReadObservation::Absent,
                        NodeRead::Prim(p) => ReadObservation::Prim(p.clone()),
                        NodeRead::Nested(child) => {
                            ReadObservation::Nested(child.borrow().freeze())
                        }
                    };
                    (key.clone(), obs)
                })
                .collect(),
            has: self.has.clone(),
            own_keys: self.own_keys.clone(),
        }
    }
}

/// An interception handle over one object of the traced graph.
///
/// Views are handed out as `Rc<View>` (and as `Datum::Object` from
/// [`Reflect::get`]); identity is stable per node and key for the lifetime of
/// the trace.
///
/// Do NOT add any of the following to this type: a method returning the
/// underlying `Rc<dyn Reflect>`, `Deref` to the target, or any write-shaped
/// method. The view is the read-only recording boundary; handing out the
/// target would let reads escape the trace.
pub struct View {
    target: Rc<dyn Reflect>,
    node: Rc<RefCell<Node>>,
    live: Rc<Cell<bool>>,
    children: RefCell<FxHashMap<Key, Rc<View>>>,
}

impl View {
    fn over(target: Rc<dyn Reflect>, node: Rc<RefCell<Node>>, live: Rc<Cell<bool>>) -> Rc<Self> {
        Rc::new(Self {
            target,
            node,
            live,
            children: RefCell::new(FxHashMap::default()),
        })
    }

    /// Returns the cached child view for `key`, creating it on first read.
    ///
    /// The cache key is the node-and-key pair, never the underlying object:
    /// per-path recording depends on aliased objects getting distinct views.
    fn child_view(&self, key: &Key, target: Rc<dyn Reflect>) -> Rc<View> {
        let mut children = self.children.borrow_mut();
        if let Some(existing) = children.get(key) {
            if self.live.get() {
                // Re-link in case an interleaved primitive read overwrote
                // this key's slot (last observation wins).
                self.node
                    .borrow_mut()
                    .reads
                    .insert(key.clone(), NodeRead::Nested(existing.node.clone()));
            }
            return existing.clone();
        }
        let node = Rc::new(RefCell::new(Node::observing(&*target)));
        if self.live.get() {
            self.node
                .borrow_mut()
                .reads
                .insert(key.clone(), NodeRead::Nested(node.clone()));
        }
        let view = View::over(target, node, self.live.clone());
        children.insert(key.clone(), view.clone());
        view
    }

    /// Drives the view with one property-level operation.
    ///
    /// Read shapes forward (and record, while the trace is live) exactly like
    /// the [`Reflect`] methods. Write and introspection shapes are refused
    /// with [`TraceError::Unsupported`].
    pub fn dispatch(&self, access: &Access) -> Result<AccessReply, TraceError> {
        match access {
            Access::Get(key) => Ok(AccessReply::Value(self.get(key))),
            Access::Has(key) => Ok(AccessReply::Bool(self.has(key))),
            Access::Keys => Ok(AccessReply::Keys(self.own_keys())),
            denied => Err(TraceError::Unsupported {
                kind: denied.kind(),
            }),
        }
    }
}

impl Reflect for View {
    fn type_tag(&self) -> Option<Arc<TypeTag>> {
        self.target.type_tag()
    }

    fn get(&self, key: &Key) -> Option<Datum> {
        match self.target.get(key) {
            None => {
                if self.live.get() {
                    self.node
                        .borrow_mut()
                        .reads
                        .insert(key.clone(), NodeRead::Absent);
                }
                None
            }
            Some(Datum::Prim(p)) => {
                if self.live.get() {
                    self.node
                        .borrow_mut()
                        .reads
                        .insert(key.clone(), NodeRead::Prim(p.clone()));
                }
                Some(Datum::Prim(p))
            }
            Some(Datum::Object(obj)) => {
                let child = self.child_view(key, obj);
                Some(Datum::Object(child))
            }
        }
    }

    fn has(&self, key: &Key) -> bool {
        let present = self.target.has(key);
        if self.live.get() {
            self.node.borrow_mut().has.insert(key.clone(), present);
        }
        present
    }

    fn own_keys(&self) -> Vec<Key> {
        let keys = self.target.own_keys();
        if self.live.get() {
            self.node.borrow_mut().own_keys = Some(keys.clone());
        }
        keys
    }
}

/// A live trace over one root object.
///
/// Owns the growing imprint until [`finalize`](Self::finalize) freezes it and
/// hands ownership onward.
pub struct Trace {
    root: Rc<View>,
    live: Rc<Cell<bool>>,
}

impl Trace {
    /// The root view; drop-in for the root object under read-only workloads.
    pub fn view(&self) -> Rc<View> {
        self.root.clone()
    }

    /// Freezes the recording and disables every view under this root.
    ///
    /// Disabled views keep forwarding reads but record nothing, so handles
    /// that escaped the traced call stay harmless.
    pub fn finalize(self) -> Imprint {
        self.live.set(false);
        let imprint = self.root.node.borrow().freeze();
        tracing::debug!(
            reads = imprint.reads.len(),
            probes = imprint.has.len(),
            enumerated = imprint.own_keys().is_some(),
            "trace finalized"
        );
        imprint
    }
}

/// Starts a trace over `root`.
///
/// Fails with [`TraceError::InvalidTarget`] when `root` is null or any other
/// primitive: there is nothing keyed to record against.
pub fn trace(root: Datum) -> Result<Trace, TraceError> {
    match root {
        Datum::Object(target) => {
            let node = Rc::new(RefCell::new(Node::observing(&*target)));
            let live = Rc::new(Cell::new(true));
            Ok(Trace {
                root: View::over(target, node, live.clone()),
                live,
            })
        }
        prim @ Datum::Prim(_) => Err(TraceError::InvalidTarget { kind: prim.kind() }),
    }
}
