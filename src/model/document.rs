//! Arena-backed outline document.
//!
//! The document is produced by an external provider (a parser, a loader,
//! a test builder) and read by the presentation engine. The tree uses a
//! parent-pointer / first-child / next-sibling representation; nodes are
//! addressed by [`NodeId`] into one flat arena.

use std::collections::BTreeMap;

use super::node::{Block, BlockId, Node, NodeId};

/// A parsed outline document: one node arena plus document-level keywords.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// All nodes in the tree (index 0 is always the root).
    nodes: Vec<Node>,
    /// Document-level `#+KEY: value` keywords hoisted by the provider.
    pub keywords: BTreeMap<String, String>,
}

impl Document {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
            keywords: BTreeMap::new(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get the number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a document-level keyword by exact key.
    pub fn keyword(&self, key: &str) -> Option<&str> {
        self.keywords.get(key).map(String::as_str)
    }

    /// Allocate a new node and return its ID.
    pub fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append a child node to a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(child_node) = self.nodes.get_mut(child.0 as usize) {
            child_node.parent = Some(parent);
        }

        let Some(parent_node) = self.nodes.get(parent.0 as usize) else {
            return;
        };

        if let Some(first_child) = parent_node.first_child {
            // Find the last sibling and append after it.
            let mut current = first_child;
            while let Some(next) = self.nodes[current.0 as usize].next_sibling {
                current = next;
            }
            self.nodes[current.0 as usize].next_sibling = Some(child);
        } else {
            self.nodes[parent.0 as usize].first_child = Some(child);
        }
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        let first_child = self
            .nodes
            .get(parent.0 as usize)
            .and_then(|n| n.first_child);
        ChildIter {
            doc: self,
            current: first_child,
        }
    }

    /// Iterate over all nodes in pre-order, root included.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            doc: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Iterate over a subtree in pre-order, starting at `root`.
    pub fn iter_subtree(&self, root: NodeId) -> DfsIter<'_> {
        DfsIter {
            doc: self,
            stack: vec![root],
        }
    }

    /// Walk up to the depth-1 ancestor of a node (the node itself if it
    /// is already top-level). None for the root.
    pub fn top_level_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.node(current)?;
            match node.depth {
                0 => return None,
                1 => return Some(current),
                _ => current = node.parent?,
            }
        }
    }

    /// Resolve a block ID to its code block, if it names one.
    pub fn code_block(&self, id: BlockId) -> Option<&Block> {
        match self.node(id.node)?.body.get(id.index)? {
            block @ Block::Code { .. } => Some(block),
            _ => None,
        }
    }

    /// Set the `visible` flag on a code block. Returns false if the ID
    /// does not name a code block.
    pub fn set_code_visible(&mut self, id: BlockId, value: bool) -> bool {
        match self
            .node_mut(id.node)
            .and_then(|n| n.body.get_mut(id.index))
        {
            Some(Block::Code { visible, .. }) => {
                *visible = value;
                true
            }
            _ => false,
        }
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self
            .doc
            .node(current)
            .and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Pre-order iterator over a (sub)tree.
pub struct DfsIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right.
        let mut children: Vec<NodeId> = self.doc.children(current).collect();
        children.reverse();
        self.stack.extend(children);

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_doc() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let a = doc.alloc_node(Node::new("A", 1));
        doc.append_child(NodeId::ROOT, a);
        let a1 = doc.alloc_node(Node::new("A.1", 2));
        doc.append_child(a, a1);
        let b = doc.alloc_node(Node::new("B", 1));
        doc.append_child(NodeId::ROOT, b);
        (doc, a, a1, b)
    }

    #[test]
    fn preorder_order() {
        let (doc, a, a1, b) = two_level_doc();
        let order: Vec<NodeId> = doc.iter_dfs().collect();
        assert_eq!(order, vec![NodeId::ROOT, a, a1, b]);
    }

    #[test]
    fn subtree_iteration_stays_inside() {
        let (doc, a, a1, _b) = two_level_doc();
        let order: Vec<NodeId> = doc.iter_subtree(a).collect();
        assert_eq!(order, vec![a, a1]);
    }

    #[test]
    fn top_level_ancestor_walks_up() {
        let (doc, a, a1, b) = two_level_doc();
        assert_eq!(doc.top_level_ancestor(a1), Some(a));
        assert_eq!(doc.top_level_ancestor(b), Some(b));
        assert_eq!(doc.top_level_ancestor(NodeId::ROOT), None);
    }

    #[test]
    fn code_visibility_toggle() {
        let (mut doc, a, _a1, _b) = two_level_doc();
        doc.node_mut(a).unwrap().body.push(Block::Code {
            language: Some("rust".into()),
            source: "fn main() {}\n".into(),
            visible: true,
        });
        let id = BlockId::new(a, 0);
        assert!(doc.set_code_visible(id, false));
        assert!(matches!(
            doc.code_block(id),
            Some(Block::Code { visible: false, .. })
        ));
        // Text blocks are not code blocks.
        doc.node_mut(a).unwrap().body.push(Block::Text {
            text: "hello".into(),
        });
        assert!(!doc.set_code_visible(BlockId::new(a, 1), false));
    }
}
