// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The imprint tree map: many imprints, many values, shared prefixes stored
//! once.
//!
//! Each stored node carries the *delta* of assertions along its edge; the
//! pattern a value was recorded against is the overlay of deltas from a root
//! down to the valued node. Insertion factors the incoming imprint against
//! existing roots with [`split`]; lookup walks the forest with the matcher,
//! preferring the most specific entry: a matching child always wins over the
//! node's own value, and a node's value is the catch-all for inputs that
//! share its prefix without specializing further.

use std::mem;

use thiserror::Error;

use crate::imprint::Imprint;
use crate::matcher::matches;
use crate::reflect::Reflect;
use crate::split::split;

/// Lookup found no stored entry compatible with the input.
///
/// Normal control flow for a caching layer: translate into a cache miss,
/// recompute under tracing, insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("[MAP_NO_MATCH] no stored imprint matches the probed input")]
pub struct NoMatch;

struct TreeNode<V> {
    imprint: Imprint,
    value: Option<V>,
    children: Vec<TreeNode<V>>,
}

impl<V> TreeNode<V> {
    fn leaf(imprint: Imprint, value: V) -> Self {
        Self {
            imprint,
            value: Some(value),
            children: Vec::new(),
        }
    }
}

/// A forest of imprint-keyed entries.
pub struct ImprintTreeMap<V> {
    roots: Vec<TreeNode<V>>,
    len: usize,
}

impl<V> Default for ImprintTreeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ImprintTreeMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            len: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records that inputs matching `imprint` map to `value`.
    ///
    /// The incoming imprint is split against existing roots left to right;
    /// the first root with any overlap is refactored so the shared part is
    /// stored once. Re-inserting an imprint identical to a stored one
    /// overwrites that entry's value.
    pub fn insert(&mut self, imprint: Imprint, value: V) {
        let mut incoming = imprint;
        for at in 0..self.roots.len() {
            let node = &mut self.roots[at];
            let existing = mem::take(&mut node.imprint);
            let parts = split(existing, incoming);

            let Some(shared) = parts.shared else {
                node.imprint = parts.a_only.unwrap_or_default();
                incoming = parts.b_only.unwrap_or_default();
                if node.imprint.is_vacant() && incoming.is_vacant() {
                    // Two vacant imprints are identical; overwrite in place
                    // instead of duplicating the catch-all root.
                    self.set_value(at, value);
                    return;
                }
                continue;
            };

            node.imprint = shared;
            match (parts.a_only, parts.b_only) {
                // Incoming is exactly the stored pattern: overwrite.
                (None, None) => {
                    self.set_value(at, value);
                }
                // Stored pattern is a prefix of the incoming one: the new
                // entry becomes a more specific child.
                (None, Some(delta)) => {
                    self.attach_child(at, delta, value);
                }
                // Incoming is a prefix of the stored pattern: the old node
                // keeps its subtree one level down; the new entry lands on
                // the shared node as the catch-all.
                (Some(rest), None) => {
                    let node = &mut self.roots[at];
                    let demoted = TreeNode {
                        imprint: rest,
                        value: node.value.take(),
                        children: mem::take(&mut node.children),
                    };
                    node.children.push(demoted);
                    node.value = Some(value);
                    self.len += 1;
                }
                // Partial overlap: both specialize under the shared prefix.
                (Some(a_rest), Some(b_rest)) => {
                    let node = &mut self.roots[at];
                    let demoted = TreeNode {
                        imprint: a_rest,
                        value: node.value.take(),
                        children: mem::take(&mut node.children),
                    };
                    node.children.push(demoted);
                    node.children.push(TreeNode::leaf(b_rest, value));
                    self.len += 1;
                }
            }
            tracing::debug!(
                roots = self.roots.len(),
                entries = self.len,
                "imprint factored into existing root"
            );
            return;
        }

        self.roots.push(TreeNode::leaf(incoming, value));
        self.len += 1;
        tracing::debug!(
            roots = self.roots.len(),
            entries = self.len,
            "imprint appended as new root"
        );
    }

    /// Returns the value whose imprint chain matches `target`.
    pub fn lookup(&self, target: &dyn Reflect) -> Result<&V, NoMatch> {
        self.roots
            .iter()
            .find_map(|node| Self::descend(node, target))
            .ok_or(NoMatch)
    }

    fn descend<'a>(node: &'a TreeNode<V>, target: &dyn Reflect) -> Option<&'a V> {
        if !matches(&node.imprint, target) {
            return None;
        }
        node.children
            .iter()
            .find_map(|child| Self::descend(child, target))
            .or_else(|| node.value.as_ref())
    }

    fn set_value(&mut self, at: usize, value: V) {
        if self.roots[at].value.replace(value).is_none() {
            self.len += 1;
        }
    }

    fn attach_child(&mut self, at: usize, delta: Imprint, value: V) {
        let node = &mut self.roots[at];
        // Duplicate inserts of a child pattern overwrite, same as at roots.
        if let Some(child) = node.children.iter_mut().find(|c| c.imprint == delta) {
            if child.value.replace(value).is_none() {
                self.len += 1;
            }
            return;
        }
        node.children.push(TreeNode::leaf(delta, value));
        self.len += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::imprint::ReadObservation;
    use crate::key::Key;
    use crate::value::{Prim, Record};

    fn prim_reads(entries: &[(&str, i64)]) -> Imprint {
        Imprint {
            reads: entries
                .iter()
                .map(|(k, v)| (Key::name(k), ReadObservation::Prim(Prim::Int(*v))))
                .collect(),
            ..Imprint::default()
        }
    }

    #[test]
    fn lookup_on_empty_map_misses() {
        let map: ImprintTreeMap<u32> = ImprintTreeMap::new();
        assert_eq!(map.lookup(&Record::new()), Err(NoMatch));
    }

    #[test]
    fn overwrite_on_identical_imprint() {
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("x", 1)]), 10);
        map.insert(prim_reads(&[("x", 1)]), 11);
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(&Record::new().with("x", 1)), Ok(&11));
    }

    #[test]
    fn overwrite_on_identical_child_imprint() {
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("x", 1)]), 10);
        map.insert(prim_reads(&[("x", 1), ("y", 2)]), 20);
        map.insert(prim_reads(&[("x", 1), ("y", 2)]), 21);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.lookup(&Record::new().with("x", 1).with("y", 2)),
            Ok(&21)
        );
    }

    #[test]
    fn specific_child_wins_over_catch_all_value() {
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("x", 1)]), 10);
        map.insert(prim_reads(&[("x", 1), ("y", 2)]), 20);
        assert_eq!(map.lookup(&Record::new().with("x", 1).with("y", 2)), Ok(&20));
        assert_eq!(map.lookup(&Record::new().with("x", 1)), Ok(&10));
        assert_eq!(map.lookup(&Record::new().with("x", 1).with("y", 3)), Ok(&10));
    }

    #[test]
    fn prefix_insert_after_specific_insert_demotes() {
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("x", 1), ("y", 2)]), 20);
        map.insert(prim_reads(&[("x", 1)]), 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(&Record::new().with("x", 1).with("y", 2)), Ok(&20));
        assert_eq!(map.lookup(&Record::new().with("x", 1)), Ok(&10));
    }

    #[test]
    fn vacant_imprint_is_the_catch_all() {
        let mut map = ImprintTreeMap::new();
        map.insert(Imprint::default(), 1);
        map.insert(Imprint::default(), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(&Record::new().with("anything", 9)), Ok(&2));
    }

    #[test]
    fn catch_all_ordering_depends_on_insertion_order() {
        // A vacant imprint shares nothing with any other, so it always lands
        // as its own root and lookup resolves roots first-match-wins.

        // Vacant first: it matches every object and shadows later entries.
        let mut map = ImprintTreeMap::new();
        map.insert(Imprint::default(), 0);
        map.insert(prim_reads(&[("x", 1)]), 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(&Record::new().with("x", 1)), Ok(&0));

        // Specific first: the catch-all only picks up inputs the specific
        // entry rejects.
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("x", 1)]), 1);
        map.insert(Imprint::default(), 0);
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(&Record::new().with("x", 1)), Ok(&1));
        assert_eq!(map.lookup(&Record::new().with("x", 2)), Ok(&0));
    }

    #[test]
    fn disjoint_imprints_become_separate_roots() {
        let mut map = ImprintTreeMap::new();
        map.insert(prim_reads(&[("a", 1)]), 1);
        map.insert(prim_reads(&[("b", 2)]), 2);
        assert_eq!(map.lookup(&Record::new().with("a", 1)), Ok(&1));
        assert_eq!(map.lookup(&Record::new().with("b", 2)), Ok(&2));
        assert_eq!(map.lookup(&Record::new().with("a", 2)), Err(NoMatch));
    }
}
