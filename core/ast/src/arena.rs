use crate::{
    errors::AstError,
    nodes::{AstNode, Comments, Location, NodeId, NodeKind},
};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// Owns every node of one compilation unit.
///
/// Nodes refer to their children by id. The reverse direction lives in
/// `node_routes`, so a parent lookup is a single hash lookup and the tree
/// holds no reference cycles.
#[derive(Default, Clone, Debug)]
pub struct Arena {
    pub(crate) nodes: FxHashMap<NodeId, AstNode>,
    pub(crate) node_routes: FxHashMap<NodeId, NodeRoute>,
    root: Option<NodeId>,
    next_id: NodeId,
    /// Fields of the Babel `File` envelope the program was imported from.
    pub(crate) file: Option<Map<String, Value>>,
}

#[derive(Clone, Copy, Default, Debug)]
pub struct NodeRoute {
    pub id: NodeId,
    parent: Option<NodeId>,
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new node and links the parent route of each of its children.
    pub fn alloc(&mut self, location: Location, kind: NodeKind) -> NodeId {
        self.alloc_with(location, Comments::default(), Map::new(), kind)
    }

    pub fn alloc_with(
        &mut self,
        location: Location,
        comments: Comments,
        extra: Map<String, Value>,
        kind: NodeKind,
    ) -> NodeId {
        self.next_id += 1;
        let id = self.next_id;
        let children = kind.children();
        self.nodes.insert(
            id,
            AstNode {
                id,
                location,
                comments,
                extra,
                kind,
            },
        );
        self.node_routes
            .entry(id)
            .or_insert(NodeRoute { id, parent: None });
        for child in children {
            self.link(child, id);
        }
        id
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(&id)
    }

    /// Like [`Arena::get`] but reports a missing node as an error.
    pub fn node(&self, id: NodeId) -> Result<&AstNode, AstError> {
        self.nodes.get(&id).ok_or(AstError::UnknownNode { id })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut AstNode, AstError> {
        self.nodes.get_mut(&id).ok_or(AstError::UnknownNode { id })
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&id).map(|node| &node.kind)
    }

    #[must_use]
    pub fn find_parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.node_routes.get(&id).and_then(|route| route.parent)
    }

    #[must_use]
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        self.kind(id).and_then(NodeKind::as_identifier)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).map(NodeKind::children).unwrap_or_default()
    }

    /// Pre-order walk: every node is listed before its children, children
    /// in source order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(&current) {
                continue;
            }
            result.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        result
    }

    pub fn filter_nodes<T: Fn(&AstNode) -> bool>(&self, fn_predicate: T) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(&fn_predicate))
            .collect()
    }

    /// Applies `f` to the node kind and re-links the parent route of every
    /// child the node holds afterwards.
    pub fn modify<F, R>(&mut self, id: NodeId, f: F) -> Result<R, AstError>
    where
        F: FnOnce(&mut NodeKind) -> R,
    {
        let node = self.node_mut(id)?;
        let result = f(&mut node.kind);
        for child in node.kind.children() {
            self.link(child, id);
        }
        Ok(result)
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        self.node_routes
            .entry(child)
            .or_insert(NodeRoute {
                id: child,
                parent: None,
            })
            .parent = Some(parent);
    }
}
