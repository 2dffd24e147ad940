use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};

/**
 * Pops `path` until its top equals `target`, removing the corresponding
 * entries from `members` as it goes. Grounded on `UniqueStack.pop_until` in
 * `searchspaces/partialplus.py::_traversal_helper`.
 */
fn pop_until(path: &mut Vec<Option<NodeId>>, members: &mut HashSet<Option<NodeId>>, target: Option<NodeId>) -> Result<()> {
    loop {
        match path.last().copied() {
            Some(top) if top == target => return Ok(()),
            Some(_) => {
                let popped = pop_path(path, members)?;
                debug_assert!(popped != target);
            }
            None => return Err(Error::SentinelNotFound),
        }
    }
}

fn pop_path(path: &mut Vec<Option<NodeId>>, members: &mut HashSet<Option<NodeId>>) -> Result<Option<NodeId>> {
    let top = path.pop().ok_or(Error::EmptyStackPop)?;
    members.remove(&top);
    Ok(top)
}

/**
 * Lazy depth-first traversal, visiting each distinct node (by identity)
 * exactly once in pre-order. Tracks an active-path set in parallel so a
 * back-edge is reported as [`Error::Cycle`] as soon as it is encountered,
 * rather than after the whole graph has been walked.
 *
 * Grounded on `searchspaces/partialplus.py::_traversal_helper`'s
 * `UniqueStack`-based active-path check, reworked from a generator into a
 * hand-rolled `Iterator` so a consumer can stop early via `.take_while` or
 * similar without finishing the walk (§4.3).
 */
pub struct DepthFirst {
    to_visit: Vec<(Option<NodeId>, Node)>,
    path: Vec<Option<NodeId>>,
    path_members: HashSet<Option<NodeId>>,
    visited: HashSet<NodeId>,
    errored: bool,
}

impl DepthFirst {
    fn new(root: Node) -> Self {
        let path = vec![None];
        let mut path_members = HashSet::new();
        path_members.insert(None);
        Self {
            to_visit: vec![(None, root)],
            path,
            path_members,
            visited: HashSet::new(),
            errored: false,
        }
    }
}

impl Iterator for DepthFirst {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }
        loop {
            let (parent, node) = self.to_visit.pop()?;

            if let Err(e) = pop_until(&mut self.path, &mut self.path_members, parent) {
                self.errored = true;
                return Some(Err(e));
            }

            let node_id = node.id();
            if self.path_members.contains(&Some(node_id)) {
                self.errored = true;
                return Some(Err(Error::Cycle));
            }
            self.path.push(Some(node_id));
            self.path_members.insert(Some(node_id));

            if self.visited.insert(node_id) {
                for child in node.children() {
                    self.to_visit.push((Some(node_id), child));
                }
                return Some(Ok(node));
            }
            // Already emitted this node on an earlier branch; keep walking
            // without yielding it again.
        }
    }
}

/**
 * Starts a depth-first traversal rooted at `root`. Each call performs a
 * fresh walk; the returned iterator is not restartable.
 */
pub fn depth_first(root: Node) -> DepthFirst {
    DepthFirst::new(root)
}

/**
 * A single DFS pass that both orders nodes and records, for every node, the
 * set of its immediate parents — the input the topological worklist needs.
 * The root's own parent set is seeded with the `None` sentinel and cleared
 * before returning, mirroring `_traversal_helper(root, build_inverted=True)`.
 */
fn collect_with_parents(root: Node) -> Result<(Vec<Node>, HashMap<NodeId, HashSet<NodeId>>)> {
    let root_id = root.id();
    let mut order = Vec::new();
    let mut parents: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut to_visit: Vec<(Option<NodeId>, Node)> = vec![(None, root)];
    let mut path: Vec<Option<NodeId>> = vec![None];
    let mut path_members: HashSet<Option<NodeId>> = HashSet::new();
    path_members.insert(None);

    while let Some((parent, node)) = to_visit.pop() {
        pop_until(&mut path, &mut path_members, parent)?;

        let node_id = node.id();
        if path_members.contains(&Some(node_id)) {
            return Err(Error::Cycle);
        }
        path.push(Some(node_id));
        path_members.insert(Some(node_id));

        let first_visit = visited.insert(node_id);
        let entry = parents.entry(node_id).or_insert_with(HashSet::new);
        if let Some(p) = parent {
            entry.insert(p);
        }

        if first_visit {
            order.push(node.clone());
            for child in node.children() {
                to_visit.push((Some(node_id), child));
            }
        }
    }

    if let Some(root_parents) = parents.get_mut(&root_id) {
        root_parents.clear();
    }

    Ok((order, parents))
}

/**
 * Lazy topological traversal: every node is yielded only after every node
 * that depends on it (the root first, leaves last). Built from an initial
 * DFS pass that records each node's immediate parents, then a worklist that
 * re-enqueues a candidate at the tail until all its parents have been
 * emitted — grounded on `sunscreen_circuit::Circuit::traverse`'s
 * `ready`/`visited` worklist (§4.3), generalized from `petgraph` neighbor
 * queries to this crate's own `parents` index.
 */
pub struct Topological {
    candidates: VecDeque<Node>,
    parents: HashMap<NodeId, HashSet<NodeId>>,
    emitted: HashSet<NodeId>,
    pending_error: Option<Error>,
}

impl Topological {
    fn new(root: Node) -> Self {
        match collect_with_parents(root) {
            Ok((order, parents)) => Self {
                candidates: order.into(),
                parents,
                emitted: HashSet::new(),
                pending_error: None,
            },
            Err(e) => Self {
                candidates: VecDeque::new(),
                parents: HashMap::new(),
                emitted: HashSet::new(),
                pending_error: Some(e),
            },
        }
    }
}

impl Iterator for Topological {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_error.take() {
            return Some(Err(e));
        }
        loop {
            let candidate = self.candidates.pop_front()?;
            let id = candidate.id();
            let ready = self
                .parents
                .get(&id)
                .map(|ps| ps.is_subset(&self.emitted))
                .unwrap_or(true);
            if ready {
                self.emitted.insert(id);
                return Some(Ok(candidate));
            } else {
                self.candidates.push_back(candidate);
            }
        }
    }
}

/**
 * Starts a topological traversal rooted at `root`. Each call performs a
 * fresh walk; the returned iterator is not restartable.
 */
pub fn topological(root: Node) -> Topological {
    Topological::new(root)
}
