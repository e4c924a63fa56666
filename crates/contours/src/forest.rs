//! Call-scoped storage for traced borders and their links.
//!
//! A [`ContourForest`] is what a tracer hands back: an arena of nodes where
//! each node knows its siblings, its first child and its parent. The forest
//! is flattened once into a depth-first order, and the resulting
//! [`FlatForest`] answers "what goes into output slot `i`" without touching
//! any shared mutable state, so slots can be filled from any thread.

use crate::{
    error::{ContourError, Result},
    types::{HierarchyEntry, Point},
};

/// Most nodes a forest holds; every output slot has to fit a hierarchy link.
pub const MAX_NODES: usize = i32::MAX as usize;

/// Identity of a node inside one [`ContourForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a border separates foreground from the outside or encloses a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderKind {
    Outer,
    Hole,
}

#[derive(Debug, Clone)]
pub struct ForestNode {
    pub points: Vec<Point>,
    pub border: BorderKind,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub parent: Option<NodeId>,
    last_child: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ContourForest {
    nodes: Vec<ForestNode>,
    first_root: Option<NodeId>,
    last_root: Option<NodeId>,
}

impl ContourForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ForestNode {
        &self.nodes[id.0]
    }

    /// Append a node as the last child of `parent`, or as the last root.
    ///
    /// The parent has to be pushed first, which keeps the parent graph acyclic.
    pub fn push(
        &mut self,
        points: Vec<Point>,
        border: BorderKind,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        ensure_capacity(self.nodes.len())?;
        let id = NodeId(self.nodes.len());

        let prev = match parent {
            Some(parent_id) => {
                let parent_node = self.nodes.get_mut(parent_id.0).ok_or_else(|| {
                    ContourError::Tracing(format!(
                        "border {} refers to unknown parent {}",
                        id.0, parent_id.0
                    ))
                })?;
                let prev = parent_node.last_child.replace(id);
                if parent_node.first_child.is_none() {
                    parent_node.first_child = Some(id);
                }
                prev
            }
            None => {
                let prev = self.last_root.replace(id);
                if self.first_root.is_none() {
                    self.first_root = Some(id);
                }
                prev
            }
        };

        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next = Some(id);
        }

        self.nodes.push(ForestNode {
            points,
            border,
            next: None,
            prev,
            first_child: None,
            parent,
            last_child: None,
        });

        Ok(id)
    }

    /// Top-level nodes in sibling order.
    pub fn roots(&self) -> Siblings<'_> {
        Siblings {
            forest: self,
            cursor: self.first_root,
        }
    }

    /// Direct children of `id` in sibling order.
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            forest: self,
            cursor: self.nodes[id.0].first_child,
        }
    }

    /// Depth-first pre-order over the whole forest, siblings left to right.
    pub fn flatten(&self) -> FlatForest<'_> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots().collect();
        stack.reverse();

        while let Some(id) = stack.pop() {
            order.push(id);
            let first = stack.len();
            stack.extend(self.children(id));
            stack[first..].reverse();
        }

        let mut index_of = vec![0usize; self.nodes.len()];
        for (index, id) in order.iter().enumerate() {
            index_of[id.0] = index;
        }

        debug_assert_eq!(order.len(), self.nodes.len());

        FlatForest {
            forest: self,
            order,
            index_of,
        }
    }
}

fn ensure_capacity(len: usize) -> Result<()> {
    if len >= MAX_NODES {
        return Err(ContourError::TooManyContours { limit: MAX_NODES });
    }
    Ok(())
}

/// Output slot as a hierarchy link. `push` keeps every slot below `MAX_NODES`.
fn slot_link(slot: usize) -> i32 {
    debug_assert!(slot < MAX_NODES);
    i32::try_from(slot).unwrap_or(i32::MAX)
}

/// Iterator over a sibling chain.
pub struct Siblings<'a> {
    forest: &'a ContourForest,
    cursor: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.forest.nodes[id.0].next;
        Some(id)
    }
}

/// A forest together with its flattened order and the node-to-index map.
pub struct FlatForest<'a> {
    forest: &'a ContourForest,
    order: Vec<NodeId>,
    index_of: Vec<usize>,
}

impl FlatForest<'_> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn index_of(&self, id: NodeId) -> usize {
        self.index_of[id.0]
    }

    /// Points of the node placed at output slot `index`.
    pub fn points(&self, index: usize) -> &[Point] {
        &self.forest.node(self.order[index]).points
    }

    /// Links of the node at output slot `index`, expressed as output slots.
    pub fn hierarchy(&self, index: usize) -> HierarchyEntry {
        let node = self.forest.node(self.order[index]);
        let resolve = |link: Option<NodeId>| link.map_or(-1, |id| slot_link(self.index_of[id.0]));

        HierarchyEntry {
            next: resolve(node.next),
            prev: resolve(node.prev),
            first_child: resolve(node.first_child),
            parent: resolve(node.parent),
        }
    }
}
