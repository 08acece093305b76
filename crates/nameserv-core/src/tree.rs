//! Path-addressed tree of scopes and bindings.
//!
//! Nodes live in an index arena. Scopes own their children through a name
//! to index map; every node records its parent index, which is only used to
//! rebuild full paths for log messages and eviction reports. The tree is
//! built strictly top-down, so the parent links can never form a cycle.
//!
//! Every structural change to a scope's direct children (add or remove)
//! bumps that scope's serial number, which is what lets pollers skip
//! re-enumerating an idle scope.

use crate::path::{self, ROOT};
use crate::registration::Registration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Serial number a freshly created scope starts at. Clients that have never
/// polled a scope pass zero, so they always see the first listing.
pub const INITIAL_SERIAL: u64 = 1;

/// Errors raised by [`PathTree`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Badly formed path: {0}")]
    BadPath(String),

    #[error("Named node not found: {0}")]
    NodeNotFound(String),

    #[error("Node must be a scope: {0}")]
    NotAScope(String),

    #[error("Node must be a binding: {0}")]
    NotABinding(String),

    #[error("Node '{name}' already exists under {parent}")]
    DuplicateName { parent: String, name: String },

    #[error("The root scope cannot be removed")]
    RootRemoval,
}

pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The two kinds of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Scope,
    Binding,
}

#[derive(Debug)]
struct Node {
    name: String,
    description: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Scope(ScopeData),
    Binding(Registration),
}

#[derive(Debug)]
struct ScopeData {
    children: BTreeMap<String, NodeId>,
    serial: u64,
}

impl ScopeData {
    fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            serial: INITIAL_SERIAL,
        }
    }
}

impl Node {
    fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Scope(_) => NodeType::Scope,
            NodeKind::Binding(_) => NodeType::Binding,
        }
    }
}

/// A direct child seen through a [`ScopeCursor`].
#[derive(Debug, Clone, Copy)]
pub struct ChildEntry<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub kind: ChildKind<'a>,
}

/// Type-preserving view of a child node.
#[derive(Debug, Clone, Copy)]
pub enum ChildKind<'a> {
    Scope { serial: u64 },
    Binding(&'a Registration),
}

impl ChildEntry<'_> {
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            ChildKind::Scope { .. } => NodeType::Scope,
            ChildKind::Binding(_) => NodeType::Binding,
        }
    }
}

/// Cursor over the direct children of one scope, in name order.
pub struct ScopeCursor<'a> {
    tree: &'a PathTree,
    children: std::collections::btree_map::Values<'a, String, NodeId>,
}

impl<'a> Iterator for ScopeCursor<'a> {
    type Item = ChildEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        // Child links always point at live nodes; skip rather than panic if not.
        for id in self.children.by_ref() {
            if let Some(node) = tree.get(*id) {
                let kind = match &node.kind {
                    NodeKind::Scope(scope) => ChildKind::Scope {
                        serial: scope.serial,
                    },
                    NodeKind::Binding(reg) => ChildKind::Binding(reg),
                };
                return Some(ChildEntry {
                    name: &node.name,
                    description: &node.description,
                    kind,
                });
            }
        }
        None
    }
}

/// Events produced by a pre-order walk of the tree.
#[derive(Debug, Clone, Copy)]
pub enum WalkEvent<'a> {
    EnterScope {
        depth: usize,
        name: &'a str,
        description: &'a str,
    },
    Binding {
        depth: usize,
        name: &'a str,
        description: &'a str,
        registration: &'a Registration,
    },
    LeaveScope {
        depth: usize,
    },
}

/// The hierarchical namespace.
#[derive(Debug)]
pub struct PathTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    const ROOT_ID: NodeId = NodeId(0);

    /// Create a tree holding only the root scope.
    pub fn new() -> Self {
        let root = Node {
            name: ROOT.to_string(),
            description: "Root Scope".to_string(),
            parent: None,
            kind: NodeKind::Scope(ScopeData::new()),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// True when only the root scope exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    // ========================================
    // Arena plumbing
    // ========================================

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                if let NodeKind::Scope(scope) = node.kind {
                    pending.extend(scope.children.into_values());
                }
                self.free.push(current);
            }
        }
    }

    fn scope_data(&self, id: NodeId) -> Option<&ScopeData> {
        match &self.get(id)?.kind {
            NodeKind::Scope(scope) => Some(scope),
            NodeKind::Binding(_) => None,
        }
    }

    fn scope_data_mut(&mut self, id: NodeId) -> Option<&mut ScopeData> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Scope(scope) => Some(scope),
            NodeKind::Binding(_) => None,
        }
    }

    /// Rebuild the full path of a node by following parent links.
    pub fn full_path(&self, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            names.push(current.name.as_str());
            current = self.get(parent)?;
        }
        if names.is_empty() {
            return Some(ROOT.to_string());
        }
        names.reverse();
        Some(names.iter().fold(String::new(), |mut acc, name| {
            acc.push(path::SEPARATOR);
            acc.push_str(name);
            acc
        }))
    }

    // ========================================
    // Lookup
    // ========================================

    fn resolve(&self, node_path: &str) -> TreeResult<NodeId> {
        let segments =
            path::segments(node_path).ok_or_else(|| TreeError::BadPath(node_path.to_string()))?;
        let mut current = Self::ROOT_ID;
        for segment in segments {
            let scope = self
                .scope_data(current)
                .ok_or_else(|| TreeError::NodeNotFound(node_path.to_string()))?;
            current = *scope
                .children
                .get(segment)
                .ok_or_else(|| TreeError::NodeNotFound(node_path.to_string()))?;
        }
        Ok(current)
    }

    fn resolve_scope(&self, scope_path: &str) -> TreeResult<NodeId> {
        let id = self.resolve(scope_path)?;
        match self.scope_data(id) {
            Some(_) => Ok(id),
            None => Err(TreeError::NotAScope(scope_path.to_string())),
        }
    }

    /// What kind of node, if any, lives at `node_path`.
    ///
    /// Badly formed paths are reported as absent.
    pub fn exists(&self, node_path: &str) -> Option<NodeType> {
        self.resolve(node_path)
            .ok()
            .and_then(|id| self.get(id))
            .map(Node::node_type)
    }

    pub fn node_type(&self, node_path: &str) -> TreeResult<NodeType> {
        let id = self.resolve(node_path)?;
        self.get(id)
            .map(Node::node_type)
            .ok_or_else(|| TreeError::NodeNotFound(node_path.to_string()))
    }

    /// Name and description of any node.
    pub fn describe(&self, node_path: &str) -> TreeResult<(&str, &str)> {
        let id = self.resolve(node_path)?;
        let node = self
            .get(id)
            .ok_or_else(|| TreeError::NodeNotFound(node_path.to_string()))?;
        Ok((&node.name, &node.description))
    }

    pub fn scope_serial(&self, scope_path: &str) -> TreeResult<u64> {
        let id = self.resolve_scope(scope_path)?;
        self.scope_data(id)
            .map(|scope| scope.serial)
            .ok_or_else(|| TreeError::NotAScope(scope_path.to_string()))
    }

    pub fn binding(&self, binding_path: &str) -> TreeResult<&Registration> {
        let id = self.resolve(binding_path)?;
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Binding(reg)) => Ok(reg),
            _ => Err(TreeError::NotABinding(binding_path.to_string())),
        }
    }

    pub fn binding_mut(&mut self, binding_path: &str) -> TreeResult<&mut Registration> {
        let id = self.resolve(binding_path)?;
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Binding(reg)) => Ok(reg),
            _ => Err(TreeError::NotABinding(binding_path.to_string())),
        }
    }

    /// Cursor over the direct children of a scope.
    pub fn scope_cursor(&self, scope_path: &str) -> TreeResult<ScopeCursor<'_>> {
        let id = self.resolve_scope(scope_path)?;
        let scope = self
            .scope_data(id)
            .ok_or_else(|| TreeError::NotAScope(scope_path.to_string()))?;
        Ok(ScopeCursor {
            tree: self,
            children: scope.children.values(),
        })
    }

    /// Names of the direct children of a scope, optionally bindings only.
    pub fn list_children(&self, scope_path: &str, objects_only: bool) -> TreeResult<Vec<String>> {
        Ok(self
            .scope_cursor(scope_path)?
            .filter(|child| !objects_only || child.node_type() == NodeType::Binding)
            .map(|child| child.name.to_string())
            .collect())
    }

    // ========================================
    // Mutation
    // ========================================

    fn attach(
        &mut self,
        parent: NodeId,
        parent_path: &str,
        name: &str,
        description: &str,
        kind: NodeKind,
    ) -> TreeResult<NodeId> {
        if !path::is_valid_name(name) {
            return Err(TreeError::BadPath(path::join(parent_path, name)));
        }
        let taken = self
            .scope_data(parent)
            .ok_or_else(|| TreeError::NotAScope(parent_path.to_string()))?
            .children
            .contains_key(name);
        if taken {
            return Err(TreeError::DuplicateName {
                parent: parent_path.to_string(),
                name: name.to_string(),
            });
        }

        let id = self.alloc(Node {
            name: name.to_string(),
            description: description.to_string(),
            parent: Some(parent),
            kind,
        });
        if let Some(scope) = self.scope_data_mut(parent) {
            scope.children.insert(name.to_string(), id);
            scope.serial += 1;
        }
        Ok(id)
    }

    /// Add a scope under an existing scope. Fails if the name is taken.
    pub fn add_scope(
        &mut self,
        parent_path: &str,
        name: &str,
        description: &str,
    ) -> TreeResult<NodeId> {
        let parent = self.resolve_scope(parent_path)?;
        self.attach(
            parent,
            parent_path,
            name,
            description,
            NodeKind::Scope(ScopeData::new()),
        )
    }

    /// Make sure every scope along `scope_path` exists.
    ///
    /// Missing intermediate scopes get an empty description; the last one
    /// gets `description` if it has to be created. Existing scopes are left
    /// untouched.
    pub fn create_scope_path(&mut self, scope_path: &str, description: &str) -> TreeResult<NodeId> {
        let segments =
            path::segments(scope_path).ok_or_else(|| TreeError::BadPath(scope_path.to_string()))?;
        let last = segments.len().saturating_sub(1);
        let parts: Vec<(&str, &str)> = segments
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, if i == last { description } else { "" }))
            .collect();
        self.create_scope_parts(&parts)
    }

    /// Like [`PathTree::create_scope_path`], with one description per level.
    pub fn create_scope_parts(&mut self, parts: &[(&str, &str)]) -> TreeResult<NodeId> {
        let mut current = Self::ROOT_ID;
        let mut current_path = ROOT.to_string();
        for (name, description) in parts {
            let next_path = path::join(&current_path, name);
            let existing = self
                .scope_data(current)
                .ok_or_else(|| TreeError::NotAScope(current_path.clone()))?
                .children
                .get(*name)
                .copied();
            current = match existing {
                Some(id) if self.scope_data(id).is_some() => id,
                Some(_) => return Err(TreeError::NotAScope(next_path)),
                None => self.attach(
                    current,
                    &current_path,
                    name,
                    description,
                    NodeKind::Scope(ScopeData::new()),
                )?,
            };
            current_path = next_path;
        }
        Ok(current)
    }

    /// Add a binding under an existing scope. Insert-only: fails if any
    /// sibling already has that name.
    pub fn add_binding(
        &mut self,
        parent_path: &str,
        name: &str,
        registration: Registration,
        description: &str,
    ) -> TreeResult<NodeId> {
        let parent = self.resolve_scope(parent_path)?;
        self.attach(
            parent,
            parent_path,
            name,
            description,
            NodeKind::Binding(registration),
        )
    }

    /// Overwrite an existing binding's registration and description in place.
    ///
    /// Permanence set on the existing binding survives the overwrite. This
    /// is not a structural change, so no serial moves.
    pub fn replace_binding(
        &mut self,
        binding_path: &str,
        registration: Registration,
        description: &str,
    ) -> TreeResult<()> {
        let id = self.resolve(binding_path)?;
        let node = self
            .get_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(binding_path.to_string()))?;
        match &mut node.kind {
            NodeKind::Binding(existing) => {
                let permanent = existing.permanent;
                *existing = registration;
                existing.permanent |= permanent;
                node.description = description.to_string();
                Ok(())
            }
            NodeKind::Scope(_) => Err(TreeError::NotABinding(binding_path.to_string())),
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let name = node.name.clone();
        if let Some(parent) = node.parent {
            if let Some(scope) = self.scope_data_mut(parent) {
                if scope.children.remove(&name).is_some() {
                    scope.serial += 1;
                }
            }
        }
        self.release_subtree(id);
    }

    /// Remove a node and, for scopes, everything below it.
    pub fn remove_node(&mut self, node_path: &str) -> TreeResult<()> {
        if node_path == ROOT {
            return Err(TreeError::RootRemoval);
        }
        let id = self.resolve(node_path)?;
        self.detach(id);
        Ok(())
    }

    /// Remove every child of a scope, keeping the scope itself.
    ///
    /// Returns how many direct children were removed.
    pub fn clear_scope(&mut self, scope_path: &str) -> TreeResult<usize> {
        let id = self.resolve_scope(scope_path)?;
        let children: Vec<NodeId> = match self.scope_data_mut(id) {
            Some(scope) => std::mem::take(&mut scope.children).into_values().collect(),
            None => return Err(TreeError::NotAScope(scope_path.to_string())),
        };
        if !children.is_empty() {
            if let Some(scope) = self.scope_data_mut(id) {
                scope.serial += 1;
            }
        }
        for child in &children {
            self.release_subtree(*child);
        }
        Ok(children.len())
    }

    /// Remove every binding for which `is_expired` returns true.
    ///
    /// Scopes are only ever descended into, never removed. Returns the full
    /// paths of the removed bindings.
    pub fn sweep_bindings<F>(&mut self, mut is_expired: F) -> Vec<String>
    where
        F: FnMut(&Registration) -> bool,
    {
        let mut doomed = Vec::new();
        let mut pending = vec![Self::ROOT_ID];
        while let Some(scope_id) = pending.pop() {
            let Some(scope) = self.scope_data(scope_id) else {
                continue;
            };
            for child in scope.children.values() {
                match self.get(*child).map(|node| &node.kind) {
                    Some(NodeKind::Scope(_)) => pending.push(*child),
                    Some(NodeKind::Binding(reg)) if is_expired(reg) => doomed.push(*child),
                    _ => {}
                }
            }
        }

        let mut evicted = Vec::with_capacity(doomed.len());
        for id in doomed {
            if let Some(full) = self.full_path(id) {
                evicted.push(full);
            }
            self.detach(id);
        }
        evicted
    }

    /// Pre-order walk of the whole tree, starting at the root scope.
    ///
    /// Iterative, so arbitrarily deep scope paths cannot exhaust the stack.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(WalkEvent<'_>),
    {
        let mut pending = vec![WalkStep::Visit(Self::ROOT_ID, 0)];
        while let Some(step) = pending.pop() {
            let (id, depth) = match step {
                WalkStep::Visit(id, depth) => (id, depth),
                WalkStep::Leave(depth) => {
                    visit(WalkEvent::LeaveScope { depth });
                    continue;
                }
            };
            let Some(node) = self.get(id) else {
                continue;
            };
            match &node.kind {
                NodeKind::Scope(scope) => {
                    visit(WalkEvent::EnterScope {
                        depth,
                        name: &node.name,
                        description: &node.description,
                    });
                    pending.push(WalkStep::Leave(depth));
                    // Reversed so children pop in name order
                    pending.extend(
                        scope
                            .children
                            .values()
                            .rev()
                            .map(|child| WalkStep::Visit(*child, depth + 1)),
                    );
                }
                NodeKind::Binding(registration) => visit(WalkEvent::Binding {
                    depth,
                    name: &node.name,
                    description: &node.description,
                    registration,
                }),
            }
        }
    }
}

/// Pending work for [`PathTree::walk`].
enum WalkStep {
    Visit(NodeId, usize),
    Leave(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{Extras, ServiceRef};
    use chrono::Utc;

    fn reg(tag: &str) -> Registration {
        Registration::new(ServiceRef::from(tag), Extras::default(), Utc::now())
    }

    fn sample_tree() -> PathTree {
        let mut tree = PathTree::new();
        tree.create_scope_path("/CIDLib/CIDLogSrv", "Log Server").unwrap();
        tree.add_binding("/CIDLib/CIDLogSrv", "Primary", reg("R1"), "Primary logger")
            .unwrap();
        tree
    }

    #[test]
    fn test_new_tree_has_only_root() {
        let tree = PathTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.exists("/"), Some(NodeType::Scope));
        assert_eq!(tree.scope_serial("/").unwrap(), INITIAL_SERIAL);
    }

    #[test]
    fn test_exists_reports_type() {
        let tree = sample_tree();
        assert_eq!(tree.exists("/CIDLib"), Some(NodeType::Scope));
        assert_eq!(tree.exists("/CIDLib/CIDLogSrv/Primary"), Some(NodeType::Binding));
        assert_eq!(tree.exists("/CIDLib/Missing"), None);
        assert_eq!(tree.exists("not/a/path"), None);
        // A binding has no children
        assert_eq!(tree.exists("/CIDLib/CIDLogSrv/Primary/x"), None);
    }

    #[test]
    fn test_create_scope_path_is_idempotent() {
        let mut tree = sample_tree();
        let before = tree.len();
        tree.create_scope_path("/CIDLib/CIDLogSrv", "ignored").unwrap();
        assert_eq!(tree.len(), before);
        assert_eq!(tree.describe("/CIDLib/CIDLogSrv").unwrap().1, "Log Server");
    }

    #[test]
    fn test_create_scope_path_through_binding_fails() {
        let mut tree = sample_tree();
        let err = tree
            .create_scope_path("/CIDLib/CIDLogSrv/Primary/Sub", "")
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::NotAScope("/CIDLib/CIDLogSrv/Primary".to_string())
        );
    }

    #[test]
    fn test_create_scope_parts_uses_each_description() {
        let mut tree = PathTree::new();
        tree.create_scope_parts(&[("A", "Scope A"), ("B", "Scope B")])
            .unwrap();
        assert_eq!(tree.describe("/A").unwrap(), ("A", "Scope A"));
        assert_eq!(tree.describe("/A/B").unwrap(), ("B", "Scope B"));
    }

    #[test]
    fn test_add_binding_is_insert_only() {
        let mut tree = sample_tree();
        let err = tree
            .add_binding("/CIDLib/CIDLogSrv", "Primary", reg("R2"), "")
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
        assert_eq!(
            tree.binding("/CIDLib/CIDLogSrv/Primary")
                .unwrap()
                .service_ref,
            ServiceRef::from("R1")
        );
    }

    #[test]
    fn test_add_scope_requires_scope_parent() {
        let mut tree = sample_tree();
        assert!(matches!(
            tree.add_scope("/CIDLib/CIDLogSrv/Primary", "x", ""),
            Err(TreeError::NotAScope(_))
        ));
        assert!(matches!(
            tree.add_scope("/Nowhere", "x", ""),
            Err(TreeError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_replace_binding_keeps_permanence_and_serial() {
        let mut tree = sample_tree();
        tree.binding_mut("/CIDLib/CIDLogSrv/Primary")
            .unwrap()
            .permanent = true;
        let serial = tree.scope_serial("/CIDLib/CIDLogSrv").unwrap();

        tree.replace_binding("/CIDLib/CIDLogSrv/Primary", reg("R2"), "Updated")
            .unwrap();

        let binding = tree.binding("/CIDLib/CIDLogSrv/Primary").unwrap();
        assert_eq!(binding.service_ref, ServiceRef::from("R2"));
        assert!(binding.permanent);
        assert_eq!(tree.scope_serial("/CIDLib/CIDLogSrv").unwrap(), serial);
        assert_eq!(
            tree.describe("/CIDLib/CIDLogSrv/Primary").unwrap().1,
            "Updated"
        );
    }

    #[test]
    fn test_serial_moves_on_add_and_remove() {
        let mut tree = sample_tree();
        let start = tree.scope_serial("/CIDLib/CIDLogSrv").unwrap();

        tree.add_binding("/CIDLib/CIDLogSrv", "Backup", reg("R3"), "")
            .unwrap();
        let after_add = tree.scope_serial("/CIDLib/CIDLogSrv").unwrap();
        assert!(after_add > start);

        tree.remove_node("/CIDLib/CIDLogSrv/Backup").unwrap();
        assert!(tree.scope_serial("/CIDLib/CIDLogSrv").unwrap() > after_add);
    }

    #[test]
    fn test_remove_scope_is_recursive() {
        let mut tree = sample_tree();
        tree.remove_node("/CIDLib").unwrap();
        assert_eq!(tree.exists("/CIDLib"), None);
        assert_eq!(tree.exists("/CIDLib/CIDLogSrv/Primary"), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_root_fails() {
        let mut tree = sample_tree();
        assert_eq!(tree.remove_node("/"), Err(TreeError::RootRemoval));
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut tree = sample_tree();
        let before = tree.nodes.len();
        tree.remove_node("/CIDLib/CIDLogSrv/Primary").unwrap();
        tree.add_binding("/CIDLib/CIDLogSrv", "Again", reg("R4"), "")
            .unwrap();
        assert_eq!(tree.nodes.len(), before);
    }

    #[test]
    fn test_clear_scope_keeps_scope() {
        let mut tree = sample_tree();
        tree.add_scope("/CIDLib/CIDLogSrv", "Nested", "").unwrap();
        let removed = tree.clear_scope("/CIDLib/CIDLogSrv").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(tree.exists("/CIDLib/CIDLogSrv"), Some(NodeType::Scope));
        assert!(tree.list_children("/CIDLib/CIDLogSrv", false).unwrap().is_empty());
    }

    #[test]
    fn test_list_children_objects_only() {
        let mut tree = sample_tree();
        tree.add_scope("/CIDLib/CIDLogSrv", "Nested", "").unwrap();
        assert_eq!(
            tree.list_children("/CIDLib/CIDLogSrv", false).unwrap(),
            vec!["Nested".to_string(), "Primary".to_string()]
        );
        assert_eq!(
            tree.list_children("/CIDLib/CIDLogSrv", true).unwrap(),
            vec!["Primary".to_string()]
        );
    }

    #[test]
    fn test_scope_cursor_preserves_types() {
        let mut tree = sample_tree();
        tree.add_scope("/CIDLib/CIDLogSrv", "Nested", "Nested scope")
            .unwrap();
        let entries: Vec<_> = tree.scope_cursor("/CIDLib/CIDLogSrv").unwrap().collect();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].kind, ChildKind::Scope { .. }));
        assert_eq!(entries[0].description, "Nested scope");
        match entries[1].kind {
            ChildKind::Binding(reg) => assert_eq!(reg.service_ref, ServiceRef::from("R1")),
            ChildKind::Scope { .. } => panic!("expected a binding"),
        }
    }

    #[test]
    fn test_full_path_follows_parents() {
        let mut tree = PathTree::new();
        let id = tree.create_scope_path("/a/b/c", "").unwrap();
        assert_eq!(tree.full_path(id).unwrap(), "/a/b/c");
        assert_eq!(tree.full_path(PathTree::ROOT_ID).unwrap(), "/");
    }

    #[test]
    fn test_sweep_only_removes_matching_bindings() {
        let mut tree = sample_tree();
        tree.create_scope_path("/svc", "").unwrap();
        tree.add_binding("/svc", "keep", reg("keep"), "").unwrap();
        tree.add_binding("/svc", "drop", reg("drop"), "").unwrap();
        let serial = tree.scope_serial("/svc").unwrap();

        let evicted = tree.sweep_bindings(|reg| reg.service_ref == ServiceRef::from("drop"));

        assert_eq!(evicted, vec!["/svc/drop".to_string()]);
        assert_eq!(tree.exists("/svc/keep"), Some(NodeType::Binding));
        assert_eq!(tree.exists("/svc/drop"), None);
        assert_eq!(tree.exists("/svc"), Some(NodeType::Scope));
        assert!(tree.scope_serial("/svc").unwrap() > serial);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = sample_tree();
        let mut seen = Vec::new();
        tree.walk(|event| match event {
            WalkEvent::EnterScope { depth, name, .. } => seen.push(format!("+{}{}", depth, name)),
            WalkEvent::Binding { depth, name, .. } => seen.push(format!("={}{}", depth, name)),
            WalkEvent::LeaveScope { depth } => seen.push(format!("-{}", depth)),
        });
        assert_eq!(
            seen,
            vec!["+0/", "+1CIDLib", "+2CIDLogSrv", "=3Primary", "-2", "-1", "-0"]
        );
    }

    #[test]
    fn test_walk_interleaves_siblings_in_name_order() {
        let mut tree = PathTree::new();
        tree.create_scope_path("/m/b", "").unwrap();
        tree.add_binding("/m", "a", reg("A"), "").unwrap();
        tree.add_binding("/m", "c", reg("C"), "").unwrap();
        let mut seen = Vec::new();
        tree.walk(|event| match event {
            WalkEvent::EnterScope { depth, name, .. } => seen.push(format!("+{}{}", depth, name)),
            WalkEvent::Binding { depth, name, .. } => seen.push(format!("={}{}", depth, name)),
            WalkEvent::LeaveScope { depth } => seen.push(format!("-{}", depth)),
        });
        assert_eq!(
            seen,
            vec!["+0/", "+1m", "=2a", "+2b", "-2", "=2c", "-1", "-0"]
        );
    }

    #[test]
    fn test_walk_survives_very_deep_scopes() {
        const DEPTH: usize = 10_000;
        let deep = "/d".repeat(DEPTH);
        // Small stack so a recursive walk would overflow long before the end
        let handle = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || {
                let mut tree = PathTree::new();
                tree.create_scope_path(&deep, "").unwrap();
                let mut entered = 0;
                let mut max_depth = 0;
                tree.walk(|event| {
                    if let WalkEvent::EnterScope { depth, .. } = event {
                        entered += 1;
                        max_depth = max_depth.max(depth);
                    }
                });
                (entered, max_depth)
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), (DEPTH + 1, DEPTH));
    }
}
