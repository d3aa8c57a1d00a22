//! The "derives-from" graph between vocabulary entries.
//!
//! Edges point from a child to one of its ancestors. The graph stays acyclic:
//! every mutation that introduces edges checks reachability first and is
//! rejected as a whole when any edge would close a loop. Traversals use
//! explicit work lists, so depth is bounded by the depth limit only.

use crate::core::types::{AncestorLink, AncestryEdge, EntryId, RelationKind};
use crate::error::{LexiconError, Result};
use crate::etymology::tree::{AncestryTree, EntrySummary};
use crate::store::{AncestryStore, EdgeFilter};
use std::collections::{BTreeSet, HashSet, VecDeque};

pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ancestors,
    Descendants,
}

/// Ancestry graph service. Holds no edges itself; it reads and writes the
/// store passed to each call.
#[derive(Debug, Clone, Copy)]
pub struct AncestryGraph {
    default_max_depth: usize,
}

impl Default for AncestryGraph {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl AncestryGraph {
    pub fn new(default_max_depth: usize) -> Self {
        Self { default_max_depth }
    }

    /// True if making `child` descend from `candidate` would close a loop:
    /// either they are the same entry, or `child` is already reachable from
    /// `candidate` through ancestor edges.
    pub fn would_create_cycle<S: AncestryStore + ?Sized>(
        &self,
        store: &S,
        child: EntryId,
        candidate: EntryId,
    ) -> bool {
        if child == candidate {
            return true;
        }
        let mut visited = HashSet::from([candidate]);
        let mut queue = VecDeque::from([candidate]);
        while let Some(current) = queue.pop_front() {
            for edge in store.ancestry_edges(current) {
                if edge.ancestor_id == child {
                    return true;
                }
                if visited.insert(edge.ancestor_id) {
                    queue.push_back(edge.ancestor_id);
                }
            }
        }
        false
    }

    /// Appends `ancestor` to the ancestors of `child`. Linking an existing
    /// pair again returns the stored edge untouched.
    pub fn add_ancestor<S: AncestryStore + ?Sized>(
        &self,
        store: &mut S,
        child: EntryId,
        ancestor: EntryId,
        relation: RelationKind,
    ) -> Result<AncestryEdge> {
        if self.would_create_cycle(store, child, ancestor) {
            tracing::warn!(child, ancestor, "rejected ancestry edge: cycle");
            return Err(LexiconError::CycleDetected { child, ancestor });
        }

        let existing = store.ancestry_edges(child);
        if let Some(edge) = existing.iter().find(|e| e.ancestor_id == ancestor) {
            return Ok(edge.clone());
        }

        let position = match existing.iter().map(|e| e.position).max() {
            Some(last) => last.checked_add(1).ok_or(LexiconError::TooManyAncestors(child))?,
            None => 0,
        };
        let edge = AncestryEdge { child_id: child, ancestor_id: ancestor, position, relation };
        store.insert_edges(vec![edge.clone()])?;
        tracing::info!(child, ancestor, position, %relation, "added ancestry edge");
        Ok(edge)
    }

    /// Replaces every ancestor of `child` with `links`, in order. Repeated
    /// ancestors keep their first occurrence. Either all new edges are in
    /// place afterwards or the old ones are.
    pub fn set_ancestry<S: AncestryStore + ?Sized>(
        &self,
        store: &mut S,
        child: EntryId,
        links: &[AncestorLink],
    ) -> Result<Vec<AncestryEdge>> {
        let mut seen = HashSet::new();
        let mut edges = Vec::with_capacity(links.len());
        for link in links {
            if !seen.insert(link.ancestor_id) {
                continue;
            }
            // New edges all leave `child`, so any loop they could close runs
            // through old edges only; checking them one by one is enough.
            if self.would_create_cycle(store, child, link.ancestor_id) {
                tracing::warn!(
                    child,
                    ancestor = link.ancestor_id,
                    "rejected ancestry replacement: cycle"
                );
                return Err(LexiconError::CycleDetected { child, ancestor: link.ancestor_id });
            }
            let position =
                u32::try_from(edges.len()).map_err(|_| LexiconError::TooManyAncestors(child))?;
            edges.push(AncestryEdge {
                child_id: child,
                ancestor_id: link.ancestor_id,
                position,
                relation: link.relation,
            });
        }

        let previous = store.ancestry_edges(child);
        store.delete_edges(EdgeFilter::Child(child));
        if let Err(err) = store.insert_edges(edges.clone()) {
            store.insert_edges(previous)?;
            return Err(err);
        }
        tracing::info!(child, ancestors = edges.len(), "replaced ancestry");
        Ok(edges)
    }

    /// Removes one edge. Returns whether it existed.
    pub fn remove_ancestor<S: AncestryStore + ?Sized>(
        &self,
        store: &mut S,
        child: EntryId,
        ancestor: EntryId,
    ) -> bool {
        let removed = store.delete_edges(EdgeFilter::Pair { child, ancestor });
        if removed > 0 {
            tracing::info!(child, ancestor, "removed ancestry edge");
        }
        removed > 0
    }

    /// Cleanup hook for a deleted entry: drops every edge where it is the
    /// child or the ancestor.
    pub fn on_entry_deleted<S: AncestryStore + ?Sized>(store: &mut S, id: EntryId) -> usize {
        let removed = store.delete_edges(EdgeFilter::Child(id))
            + store.delete_edges(EdgeFilter::Ancestor(id));
        tracing::debug!(entry = id, removed, "cleaned up ancestry edges of deleted entry");
        removed
    }

    /// Builds the ancestor tree of `root`, `max_depth` levels deep
    /// (0 = the root alone). Each entry is expanded once per traversal, at
    /// its shallowest occurrence; later occurrences are leaves marked
    /// `shared`. An ancestor already on the path from the root is skipped.
    pub fn full_ancestry_tree<S: AncestryStore + ?Sized>(
        &self,
        store: &S,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<AncestryTree> {
        let max_depth = max_depth.unwrap_or(self.default_max_depth);
        let root_entry = store.entry(root).ok_or(LexiconError::EntryNotFound(root))?;

        let mut nodes = vec![AncestryTree::leaf(root_entry.into(), None, None)];
        let mut parents: Vec<Option<usize>> = vec![None];
        let mut depths = vec![0usize];
        let mut placed = HashSet::from([root]);
        let mut queue = VecDeque::from([0usize]);

        while let Some(idx) = queue.pop_front() {
            let edges = store.ancestry_edges(nodes[idx].entry.id);
            if edges.is_empty() {
                continue;
            }
            if depths[idx] >= max_depth {
                nodes[idx].truncated = true;
                continue;
            }
            for edge in edges {
                if on_path(&nodes, &parents, idx, edge.ancestor_id) {
                    tracing::warn!(
                        child = edge.child_id,
                        ancestor = edge.ancestor_id,
                        "ancestry cycle encountered while building tree"
                    );
                    continue;
                }
                let Some(entry) = store.entry(edge.ancestor_id) else {
                    tracing::warn!(
                        ancestor = edge.ancestor_id,
                        "ancestry edge points at a missing entry"
                    );
                    continue;
                };
                let mut node = AncestryTree::leaf(
                    EntrySummary::from(entry),
                    Some(edge.relation),
                    Some(edge.position),
                );
                let first_visit = placed.insert(edge.ancestor_id);
                node.shared = !first_visit;
                nodes.push(node);
                parents.push(Some(idx));
                depths.push(depths[idx] + 1);
                if first_visit {
                    queue.push_back(nodes.len() - 1);
                }
            }
        }

        // Children always sit at higher indices than their parent, so folding
        // from the back attaches every subtree before its parent moves.
        while nodes.len() > 1 {
            let idx = nodes.len() - 1;
            let Some(mut node) = nodes.pop() else { break };
            node.ancestors.reverse();
            if let Some(parent) = parents[idx] {
                nodes[parent].ancestors.push(node);
            }
        }
        let mut tree = nodes.pop().ok_or(LexiconError::EntryNotFound(root))?;
        tree.ancestors.reverse();
        Ok(tree)
    }

    /// Every entry `root` transitively derives from, up to `max_depth` hops.
    pub fn all_ancestor_ids<S: AncestryStore + ?Sized>(
        &self,
        store: &S,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<BTreeSet<EntryId>> {
        self.closure(store, root, max_depth, Direction::Ancestors)
    }

    /// Every entry that transitively derives from `root`, up to `max_depth` hops.
    pub fn all_descendant_ids<S: AncestryStore + ?Sized>(
        &self,
        store: &S,
        root: EntryId,
        max_depth: Option<usize>,
    ) -> Result<BTreeSet<EntryId>> {
        self.closure(store, root, max_depth, Direction::Descendants)
    }

    fn closure<S: AncestryStore + ?Sized>(
        &self,
        store: &S,
        root: EntryId,
        max_depth: Option<usize>,
        direction: Direction,
    ) -> Result<BTreeSet<EntryId>> {
        if !store.contains_entry(root) {
            return Err(LexiconError::EntryNotFound(root));
        }
        let max_depth = max_depth.unwrap_or(self.default_max_depth);

        let mut visited = BTreeSet::from([root]);
        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let next: Vec<EntryId> = match direction {
                Direction::Ancestors => {
                    store.ancestry_edges(current).into_iter().map(|e| e.ancestor_id).collect()
                }
                Direction::Descendants => {
                    store.descendant_edges(current).into_iter().map(|e| e.child_id).collect()
                }
            };
            for id in next {
                if visited.insert(id) {
                    queue.push_back((id, depth + 1));
                }
            }
        }
        visited.remove(&root);
        Ok(visited)
    }

    /// Looks for a loop in the stored edges. Returns the entries of one loop
    /// in edge order, or `None` when the graph is acyclic.
    pub fn find_cycle<S: AncestryStore + ?Sized>(store: &S) -> Option<Vec<EntryId>> {
        let edges = store.all_ancestry_edges();
        let nodes: BTreeSet<EntryId> = edges.iter().map(|e| e.child_id).collect();

        let mut done: HashSet<EntryId> = HashSet::new();
        for &start in &nodes {
            if done.contains(&start) {
                continue;
            }
            // (node, its ancestors, index of the next ancestor to visit)
            let mut path: Vec<(EntryId, Vec<EntryId>, usize)> =
                vec![(start, ancestor_ids(store, start), 0)];
            while let Some((node, ancestors, next)) = path.last_mut() {
                let node = *node;
                if *next == ancestors.len() {
                    done.insert(node);
                    path.pop();
                    continue;
                }
                let ancestor = ancestors[*next];
                *next += 1;
                if let Some(at) = path.iter().position(|(id, _, _)| *id == ancestor) {
                    return Some(path[at..].iter().map(|(id, _, _)| *id).collect());
                }
                if !done.contains(&ancestor) {
                    path.push((ancestor, ancestor_ids(store, ancestor), 0));
                }
            }
        }
        None
    }
}

fn ancestor_ids<S: AncestryStore + ?Sized>(store: &S, child: EntryId) -> Vec<EntryId> {
    store.ancestry_edges(child).into_iter().map(|e| e.ancestor_id).collect()
}

fn on_path(nodes: &[AncestryTree], parents: &[Option<usize>], from: usize, id: EntryId) -> bool {
    let mut cursor = Some(from);
    while let Some(idx) = cursor {
        if nodes[idx].entry.id == id {
            return true;
        }
        cursor = parents[idx];
    }
    false
}
