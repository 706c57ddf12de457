//! Flat parent/children index over an oxc subtree.
//!
//! oxc nodes carry no parent pointers and no uniform child list, so this
//! index records one entry per visited node (span, parent, children)
//! during a single walk. Descendant queries then run over plain
//! ids without touching the AST again.

use oxc_ast::ast::Statement;
use oxc_ast::AstKind;
use oxc_ast_visit::Visit;
use oxc_span::{GetSpan, Span};
use vine_carton::SmallVec;

/// Index of a node inside a [`SyntaxIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    span: Span,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

/// Parent/children table for a list of statements.
#[derive(Debug, Clone, Default)]
pub struct SyntaxIndex {
    nodes: Vec<NodeEntry>,
    roots: Vec<NodeId>,
}

impl SyntaxIndex {
    /// Index the given statements; each statement becomes one root.
    pub fn of_statements(stmts: &[Statement<'_>]) -> Self {
        let mut builder = IndexBuilder::default();
        for stmt in stmts {
            builder.visit_statement(stmt);
        }
        builder.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in source order.
    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct child nodes of `id` in visit order.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map_or(&[], |entry| entry.children.as_slice())
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|entry| entry.parent)
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.nodes.get(id.index()).map(|entry| entry.span)
    }

    /// Innermost node whose span is exactly `span`.
    pub fn find(&self, span: Span) -> Option<NodeId> {
        self.nodes
            .iter()
            .rposition(|entry| entry.span == span)
            .map(|index| NodeId::new(index as u32))
    }

    /// Check if `potential_descendant` is `node` or lies anywhere below it.
    pub fn is_descendant(&self, node: NodeId, potential_descendant: NodeId) -> bool {
        let mut stack: SmallVec<[NodeId; 32]> = SmallVec::new();
        stack.push(node);
        while let Some(current) = stack.pop() {
            if current == potential_descendant {
                return true;
            }
            stack.extend_from_slice(self.children(current));
        }
        false
    }

    /// Position of the root that contains `id`.
    pub fn enclosing_root(&self, id: NodeId) -> Option<usize> {
        self.roots
            .iter()
            .position(|&root| self.is_descendant(root, id))
    }
}

#[derive(Default)]
struct IndexBuilder {
    index: SyntaxIndex,
    stack: Vec<NodeId>,
}

impl<'a> Visit<'a> for IndexBuilder {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        let id = NodeId::new(self.index.nodes.len() as u32);
        let parent = self.stack.last().copied();
        match parent {
            Some(parent) => self.index.nodes[parent.index()].children.push(id),
            None => self.index.roots.push(id),
        }
        self.index.nodes.push(NodeEntry {
            span: kind.span(),
            parent,
            children: SmallVec::new(),
        });
        self.stack.push(id);
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn build(source: &str) -> SyntaxIndex {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        SyntaxIndex::of_statements(&ret.program.body)
    }

    #[test]
    fn test_roots_follow_statements() {
        let index = build("const a = 1\nfoo(a)\nlet b");
        assert_eq!(index.roots().len(), 3);
        assert_eq!(index.span(index.roots()[0]), Some(Span::new(0, 11)));
        assert_eq!(index.span(index.roots()[1]), Some(Span::new(12, 18)));
    }

    #[test]
    fn test_children_and_parent() {
        let index = build("const a = 1");
        let root = index.roots()[0];
        let children = index.children(root);
        assert_eq!(children.len(), 1);
        assert_eq!(index.span(children[0]), Some(Span::new(6, 11)));
        assert_eq!(index.parent(children[0]), Some(root));
        assert_eq!(index.parent(root), None);
    }

    #[test]
    fn test_is_descendant() {
        let source = "const a = 1\nfoo(bar(a))";
        let index = build(source);
        let inner_call = index
            .find(Span::new(16, 22))
            .expect("inner call is indexed");
        assert!(!index.children(inner_call).is_empty());

        let [first, second] = [index.roots()[0], index.roots()[1]];
        assert!(index.is_descendant(second, inner_call));
        assert!(!index.is_descendant(first, inner_call));
        assert!(index.is_descendant(inner_call, inner_call));
        assert!(!index.is_descendant(inner_call, second));
        assert_eq!(index.enclosing_root(inner_call), Some(1));
    }

    #[test]
    fn test_out_of_range_ids() {
        let index = build("");
        assert!(index.is_empty());
        let missing = NodeId::new(7);
        assert!(index.children(missing).is_empty());
        assert_eq!(index.span(missing), None);
        assert!(!index.is_descendant(missing, NodeId::new(0)));
    }
}
