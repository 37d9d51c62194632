//! Template decoding.
//!
//! A template block is decoded into a local graph with no arena involvement;
//! the expander splices and remaps it.

use std::collections::HashMap;

use crate::document::codec::decode_records;
use crate::document::ElementRecord;
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    /// Byte offset inside the template block.
    pub offset: usize,
    pub record: ElementRecord,
}

/// `parent` and `child` are local node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEdge {
    pub parent: usize,
    pub child: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefProblem {
    /// The offset does not start a record.
    Dangling,
    /// The target already has a parent.
    AlreadyParented,
    /// The target is the node itself or one of its ancestors.
    Cycle,
}

/// A child reference that could not become an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub parent: usize,
    /// Absolute offset inside the block.
    pub offset: usize,
    pub problem: RefProblem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateGraph {
    pub nodes: Vec<TemplateNode>,
    pub edges: Vec<ChildEdge>,
    pub unresolved: Vec<UnresolvedRef>,
}

impl TemplateGraph {
    /// Nodes with no parent, in block order. Node 0, when present, is always
    /// among them.
    pub fn roots(&self) -> Vec<usize> {
        let mut has_parent = vec![false; self.nodes.len()];
        for edge in &self.edges {
            has_parent[edge.child] = true;
        }
        (0..self.nodes.len()).filter(|&i| !has_parent[i]).collect()
    }
}

/// Decode a template block into a local graph.
///
/// Edges form a forest: each node keeps its first parent, and references
/// that would close a cycle are reported in `unresolved`.
pub fn decode_template(bytes: &[u8]) -> Result<TemplateGraph, DecodeError> {
    let nodes: Vec<TemplateNode> = decode_records(bytes)?
        .into_iter()
        .map(|(offset, record)| TemplateNode { offset, record })
        .collect();

    let by_offset: HashMap<usize, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.offset, i))
        .collect();

    let mut parent_of: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut edges = Vec::new();
    let mut unresolved = Vec::new();

    for (parent, node) in nodes.iter().enumerate() {
        for &relative in &node.record.child_refs {
            let offset = node.offset + relative as usize;
            let problem = match by_offset.get(&offset) {
                None => Some(RefProblem::Dangling),
                Some(&child) if parent_of[child].is_some() => Some(RefProblem::AlreadyParented),
                Some(&child) if is_ancestor_or_self(&parent_of, child, parent) => Some(RefProblem::Cycle),
                Some(&child) => {
                    parent_of[child] = Some(parent);
                    edges.push(ChildEdge { parent, child });
                    None
                }
            };
            if let Some(problem) = problem {
                unresolved.push(UnresolvedRef { parent, offset, problem });
            }
        }
    }

    Ok(TemplateGraph { nodes, edges, unresolved })
}

fn is_ancestor_or_self(parent_of: &[Option<usize>], ancestor: usize, node: usize) -> bool {
    let mut current = Some(node);
    while let Some(c) = current {
        if c == ancestor {
            return true;
        }
        current = parent_of[c];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::codec::encode_record;
    use crate::document::{DocumentBuilder, ElementSpec, TemplateWriter};

    fn block(writer: &TemplateWriter) -> Vec<u8> {
        let mut b = DocumentBuilder::new();
        b.component("T", vec![], writer);
        b.build().components.remove(0).template
    }

    #[test]
    fn test_decode_nested_template() {
        let mut t = TemplateWriter::new();
        let root = t.push(ElementSpec::container(), None);
        let row = t.push(ElementSpec::container(), Some(root));
        t.push(ElementSpec::label("a"), Some(row));
        t.push(ElementSpec::label("b"), Some(root));

        let graph = decode_template(&block(&t)).unwrap();
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(
            graph.edges,
            vec![
                ChildEdge { parent: 0, child: 1 },
                ChildEdge { parent: 0, child: 3 },
                ChildEdge { parent: 1, child: 2 },
            ]
        );
        assert_eq!(graph.roots(), vec![0]);
        assert!(graph.unresolved.is_empty());
    }

    #[test]
    fn test_dangling_ref_reported() {
        let mut t = TemplateWriter::new();
        let root = t.push(ElementSpec::container(), None);
        t.raw_child_ref(root, 1);
        let graph = decode_template(&block(&t)).unwrap();
        assert_eq!(graph.unresolved.len(), 1);
        assert_eq!(graph.unresolved[0].problem, RefProblem::Dangling);
    }

    #[test]
    fn test_multiple_roots() {
        let mut t = TemplateWriter::new();
        t.push(ElementSpec::container(), None);
        t.push(ElementSpec::container(), None);
        let graph = decode_template(&block(&t)).unwrap();
        assert_eq!(graph.roots(), vec![0, 1]);
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut t = TemplateWriter::new();
        let root = t.push(ElementSpec::container(), None);
        t.raw_child_ref(root, 0);
        let graph = decode_template(&block(&t)).unwrap();
        assert_eq!(graph.unresolved[0].problem, RefProblem::Cycle);
        assert_eq!(graph.roots(), vec![0]);
    }

    #[test]
    fn test_truncated_block_is_error() {
        let mut bytes = Vec::new();
        encode_record(&mut bytes, &ElementRecord::default());
        bytes.pop();
        assert!(decode_template(&bytes).is_err());
    }
}
