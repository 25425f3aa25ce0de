/*!
# Fragments

Detached subtrees used as edit payloads. A fragment is built either by
deep-copying nodes of the live tree (fresh identities, text kept verbatim)
or by constructing synthetic nodes that the printer renders.
*/

use indexmap::IndexMap;

use super::{
    InfixOperator, Literal, Node, NodeId, NodeKind, Origin, PrefixOperator, SyntaxTree, ToSource,
};

/// Hands out node identities above the range used by the live tree.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    generation: u32,
    next: u32,
}

impl IdAllocator {
    /// Allocator whose first id is one past the last node of `tree`.
    pub fn after(tree: &SyntaxTree) -> Self {
        Self {
            generation: tree.generation(),
            next: tree.len() as u32,
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.generation, self.next);
        self.next += 1;
        id
    }
}

/// A detached subtree, owned by the edit that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    nodes: IndexMap<NodeId, Node>,
    root: NodeId,
}

impl Fragment {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[&self.root]
    }

    pub fn root_kind(&self) -> &NodeKind {
        &self.root_node().kind
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders the fragment; copied nodes are read from `document`.
    pub fn to_source(&self, document: &str) -> String {
        super::printer::render(self, self.root, document)
    }
}

impl ToSource for Fragment {
    fn to_source(&self, document: &str) -> String {
        Fragment::to_source(self, document)
    }
}

/// Builds one fragment. Node-returning methods give fragment-local ids that
/// can be passed as children to later constructor calls.
pub struct FragmentBuilder<'a> {
    tree: &'a SyntaxTree,
    ids: &'a mut IdAllocator,
    nodes: IndexMap<NodeId, Node>,
}

impl<'a> FragmentBuilder<'a> {
    pub fn new(tree: &'a SyntaxTree, ids: &'a mut IdAllocator) -> Self {
        Self {
            tree,
            ids,
            nodes: IndexMap::new(),
        }
    }

    /// Deep copy of a live node and its descendants.
    pub fn copy(&mut self, source: NodeId) -> NodeId {
        let tree = self.tree;
        let kind = tree.kind(source).map_children(|child| self.copy(child));
        let id = self.ids.next_id();
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                origin: Origin::Copied(tree.range(source)),
            },
        );
        id
    }

    /// Adds a synthetic node whose children were produced by this builder.
    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        debug_assert!(
            kind.children().iter().all(|c| self.nodes.contains_key(c)),
            "synthetic node refers to children outside the fragment"
        );
        let id = self.ids.next_id();
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                origin: Origin::Synthetic,
            },
        );
        id
    }

    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.node(NodeKind::Literal(literal))
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal(Literal::boolean(value))
    }

    pub fn null(&mut self) -> NodeId {
        self.literal(Literal::null())
    }

    pub fn name(&mut self, name: impl Into<String>) -> NodeId {
        self.node(NodeKind::Name(name.into()))
    }

    pub fn this(&mut self) -> NodeId {
        self.node(NodeKind::This)
    }

    pub fn infix(&mut self, operator: InfixOperator, left: NodeId, right: NodeId) -> NodeId {
        self.node(NodeKind::Infix {
            operator,
            left,
            right,
        })
    }

    pub fn prefix(&mut self, operator: PrefixOperator, operand: NodeId) -> NodeId {
        self.node(NodeKind::Prefix { operator, operand })
    }

    pub fn parenthesized(&mut self, expression: NodeId) -> NodeId {
        self.node(NodeKind::Parenthesized { expression })
    }

    pub fn call(
        &mut self,
        receiver: Option<NodeId>,
        name: impl Into<String>,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        self.node(NodeKind::MethodCall {
            receiver,
            name: name.into(),
            arguments,
        })
    }

    /// Logical negation of a live expression: `!e` yields a copy of `e`.
    pub fn negate(&mut self, expression: NodeId) -> NodeId {
        let tree = self.tree;
        let stripped = tree.node(expression).without_parentheses();
        if let NodeKind::Prefix {
            operator: PrefixOperator::Not,
            operand,
        } = stripped.kind()
        {
            return self.copy(*operand);
        }
        let operand = self.copy(expression);
        self.prefix(PrefixOperator::Not, operand)
    }

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.node(NodeKind::ExpressionStatement { expression })
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block { statements })
    }

    pub fn empty_statement(&mut self) -> NodeId {
        self.node(NodeKind::Empty)
    }

    pub fn finish(self, root: NodeId) -> Fragment {
        debug_assert!(self.nodes.contains_key(&root), "fragment root was not built");
        Fragment {
            nodes: self.nodes,
            root,
        }
    }
}
