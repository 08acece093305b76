//! Read-only lookup and enumeration methods on RegistryService.

use crate::api::{unless_missing, Expect};
use crate::dump::{self, DumpFormat};
use crate::error::{NameServerError, Result};
use crate::models::{
    BindingInfo, ExistsReply, LookupReply, NameInfo, NameServerInfo, ScopeInfo, ScopeKeys,
};
use crate::path;
use crate::tree::{ChildKind, NodeType, TreeError};
use crate::RegistryService;

impl RegistryService {
    // ========================================
    // Existence & lookup
    // ========================================

    /// Check whether a binding exists at `binding_path`.
    pub fn binding_exists(&self, binding_path: &str) -> Result<ExistsReply> {
        if path::split_binding_path(binding_path).is_none() {
            return Err(NameServerError::bad_path(binding_path));
        }
        let found = self.shared.tree.lock().exists(binding_path) == Some(NodeType::Binding);
        Ok(self.exists_reply(found))
    }

    /// Check whether a scope exists at `scope_path`.
    pub fn scope_exists(&self, scope_path: &str) -> Result<ExistsReply> {
        if !path::is_valid_scope_path(scope_path) {
            return Err(NameServerError::bad_path(scope_path));
        }
        let found = self.shared.tree.lock().exists(scope_path) == Some(NodeType::Scope);
        Ok(self.exists_reply(found))
    }

    /// Look up the service reference bound at `binding_path`.
    ///
    /// A missing path is reported through `found`; a path that names a
    /// scope is an error.
    pub fn get_object(&self, binding_path: &str) -> Result<LookupReply> {
        if path::split_binding_path(binding_path).is_none() {
            return Err(NameServerError::bad_path(binding_path));
        }
        let service_ref = {
            let tree = self.shared.tree.lock();
            match tree.binding(binding_path) {
                Ok(reg) => Some(reg.service_ref.clone()),
                Err(TreeError::NodeNotFound(_)) => None,
                Err(err) => return Err(Expect::Binding.translate(err)),
            }
        };
        Ok(LookupReply {
            found: service_ref.is_some(),
            service_ref,
            cookie: self.shared.cookie,
        })
    }

    /// Name and description of any node.
    pub fn query_name_info(&self, node_path: &str, throw_if_not: bool) -> Result<Option<NameInfo>> {
        let tree = self.shared.tree.lock();
        let described = tree.describe(node_path).map(|(name, description)| NameInfo {
            name: name.to_string(),
            description: description.to_string(),
        });
        unless_missing(described, throw_if_not, Expect::Node)
    }

    /// Name, description and extra values of a binding.
    pub fn query_name_info2(
        &self,
        binding_path: &str,
        throw_if_not: bool,
    ) -> Result<Option<BindingInfo>> {
        let tree = self.shared.tree.lock();
        let info = tree.binding(binding_path).and_then(|reg| {
            let (name, description) = tree.describe(binding_path)?;
            Ok(BindingInfo {
                name: name.to_string(),
                description: description.to_string(),
                extras: reg.extras.clone(),
            })
        });
        unless_missing(info, throw_if_not, Expect::Binding)
    }

    // ========================================
    // Enumeration
    // ========================================

    /// List a scope's children, but only if it changed since `client_serial`.
    ///
    /// When the serial matches nothing is enumerated. Returns `None` for a
    /// missing scope unless `throw_if_not` is set.
    pub fn query_scope_keys(
        &self,
        scope_path: &str,
        client_serial: u64,
        objects_only: bool,
        throw_if_not: bool,
    ) -> Result<Option<ScopeKeys>> {
        let tree = self.shared.tree.lock();
        let keys = tree.scope_serial(scope_path).and_then(|serial| {
            if serial == client_serial {
                return Ok(ScopeKeys::unchanged(serial));
            }
            Ok(ScopeKeys {
                changed: true,
                serial,
                names: tree.list_children(scope_path, objects_only)?,
            })
        });
        unless_missing(keys, throw_if_not, Expect::Scope)
    }

    /// Full listing of the bindings directly under a scope.
    pub fn enum_objects(&self, scope_path: &str, throw_if_not: bool) -> Result<Vec<NameServerInfo>> {
        let tree = self.shared.tree.lock();
        let listing = tree.scope_cursor(scope_path).map(|cursor| {
            cursor
                .filter_map(|child| match child.kind {
                    ChildKind::Binding(reg) => Some(NameServerInfo {
                        service_ref: reg.service_ref.clone(),
                        name: child.name.to_string(),
                        description: child.description.to_string(),
                        extras: reg.extras.clone(),
                    }),
                    ChildKind::Scope { .. } => None,
                })
                .collect::<Vec<_>>()
        });
        Ok(unless_missing(listing, throw_if_not, Expect::Scope)?.unwrap_or_default())
    }

    /// Full listing of the scopes directly under a scope.
    pub fn enum_subscopes(&self, scope_path: &str, throw_if_not: bool) -> Result<Vec<ScopeInfo>> {
        let tree = self.shared.tree.lock();
        let listing = tree.scope_cursor(scope_path).map(|cursor| {
            cursor
                .filter(|child| child.node_type() == NodeType::Scope)
                .map(|child| ScopeInfo {
                    name: child.name.to_string(),
                    description: child.description.to_string(),
                })
                .collect::<Vec<_>>()
        });
        Ok(unless_missing(listing, throw_if_not, Expect::Scope)?.unwrap_or_default())
    }

    // ========================================
    // Diagnostics
    // ========================================

    pub fn query_cookie(&self) -> u64 {
        self.shared.cookie
    }

    /// Render the whole tree for debugging.
    pub fn dump(&self, format: DumpFormat) -> String {
        let tree = self.shared.tree.lock();
        match format {
            DumpFormat::Text => dump::render_text(&tree),
            DumpFormat::Xml => dump::render_xml(&tree),
        }
    }

    fn exists_reply(&self, found: bool) -> ExistsReply {
        ExistsReply {
            found,
            cookie: self.shared.cookie,
        }
    }
}
