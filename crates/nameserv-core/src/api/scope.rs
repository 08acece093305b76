//! Scope management methods on RegistryService.

use tracing::debug;

use crate::api::Expect;
use crate::error::{NameServerError, Result};
use crate::path;
use crate::tree::NodeType;
use crate::RegistryService;

impl RegistryService {
    /// Add one scope under an existing scope. Fails if the name is taken.
    pub fn create_scope(&self, parent_scope: &str, name: &str, description: &str) -> Result<()> {
        let mut tree = self.shared.tree.lock();
        tree.add_scope(parent_scope, name, description)
            .map_err(|e| Expect::Scope.translate(e))?;
        Ok(())
    }

    /// Create every missing scope along `scope_path`. Existing scopes are
    /// left alone, so this is safe to call repeatedly.
    pub fn create_scope_path(&self, scope_path: &str, description: &str) -> Result<()> {
        if !path::is_valid_scope_path(scope_path) {
            return Err(NameServerError::bad_path(scope_path));
        }
        self.shared
            .tree
            .lock()
            .create_scope_path(scope_path, description)?;
        Ok(())
    }

    /// Like [`RegistryService::create_scope_path`], with a name and a
    /// description per level, starting below the root.
    pub fn create_scope_path_parts<N, D>(&self, parts: &[(N, D)]) -> Result<()>
    where
        N: AsRef<str>,
        D: AsRef<str>,
    {
        let parts: Vec<(&str, &str)> = parts
            .iter()
            .map(|(name, description)| (name.as_ref(), description.as_ref()))
            .collect();
        self.shared.tree.lock().create_scope_parts(&parts)?;
        Ok(())
    }

    /// Remove a scope and everything below it. The root cannot be removed.
    pub fn remove_scope(&self, scope_path: &str) -> Result<()> {
        if scope_path == path::ROOT {
            return Err(NameServerError::CantRemoveRoot);
        }
        let mut tree = self.shared.tree.lock();
        match tree.node_type(scope_path) {
            Ok(NodeType::Scope) => tree.remove_node(scope_path)?,
            Ok(NodeType::Binding) => {
                return Err(NameServerError::NotAScope {
                    path: scope_path.to_string(),
                })
            }
            Err(err) => return Err(Expect::Scope.translate(err)),
        }
        drop(tree);

        debug!("Removed scope {}", scope_path);
        Ok(())
    }

    /// Remove everything below a scope but keep the scope itself.
    ///
    /// Returns how many direct children were removed.
    pub fn clear_scope(&self, scope_path: &str) -> Result<usize> {
        if scope_path == path::ROOT {
            return Err(NameServerError::CantRemoveRoot);
        }
        let removed = self
            .shared
            .tree
            .lock()
            .clear_scope(scope_path)
            .map_err(|e| Expect::Scope.translate(e))?;
        debug!("Cleared {} node(s) from scope {}", removed, scope_path);
        Ok(removed)
    }
}
