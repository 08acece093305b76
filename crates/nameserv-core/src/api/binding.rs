//! Binding creation, batch rebind, lease renewal and binding updates.

use tracing::{debug, warn};

use crate::api::{unless_missing, Expect};
use crate::error::{NameServerError, Result};
use crate::models::{RebindInfo, RebindReply, RebindResult, RenewReply};
use crate::path;
use crate::registration::{Extras, Registration, ServiceRef};
use crate::tree::{NodeType, PathTree, TreeError, TreeResult};
use crate::RegistryService;

impl RegistryService {
    // ========================================
    // Insert-only binds
    // ========================================

    /// Bind a service reference at `binding_path`.
    ///
    /// Missing parent scopes are created. Fails with `AlreadyExists` if
    /// anything, binding or scope, already lives at that name.
    pub fn bind_obj(
        &self,
        binding_path: &str,
        description: &str,
        extras: Extras,
        service_ref: ServiceRef,
    ) -> Result<()> {
        let (parent, name) = path::split_binding_path(binding_path)
            .ok_or_else(|| NameServerError::bad_path(binding_path))?;
        let mut tree = self.shared.tree.lock();
        tree.create_scope_path(parent, "")?;
        let registration = Registration::new(service_ref, extras, self.shared.clock.now());
        tree.add_binding(parent, name, registration, description)?;
        drop(tree);

        debug!("Bound {}", binding_path);
        Ok(())
    }

    /// Like [`RegistryService::bind_obj`], with the parent scope and the
    /// binding name given separately.
    pub fn bind_obj2(
        &self,
        parent_scope: &str,
        name: &str,
        description: &str,
        extras: Extras,
        service_ref: ServiceRef,
    ) -> Result<()> {
        let binding_path = path::join(parent_scope, name);
        self.bind_obj(&binding_path, description, extras, service_ref)
    }

    /// Like [`RegistryService::bind_obj`], from a stored [`RebindInfo`].
    pub fn bind_obj3(&self, info: &RebindInfo) -> Result<()> {
        self.bind_obj(
            &info.full_path(),
            &info.description,
            info.extras.clone(),
            info.service_ref.clone(),
        )
    }

    // ========================================
    // Batch operations
    // ========================================

    /// Re-create a client's bindings, overwriting any that still exist.
    ///
    /// Nothing happens if `client_cookie` is stale; the client has to resync
    /// first. Item failures are reported per item and never abort the batch.
    pub fn rebind_objects(&self, items: &[RebindInfo], client_cookie: u64) -> RebindReply {
        let cookie = self.shared.cookie;
        if client_cookie != cookie {
            return RebindReply {
                ok: false,
                results: Vec::new(),
                cookie,
            };
        }

        let mut failures = Vec::new();
        let results: Vec<RebindResult> = {
            let mut tree = self.shared.tree.lock();
            let now = self.shared.clock.now();
            let results = items
                .iter()
                .map(|item| {
                    let full_path = item.full_path();
                    match tree.exists(&full_path) {
                        Some(NodeType::Scope) => {
                            failures.push(format!("{} is a scope, not a binding", full_path));
                            RebindResult::NotATerminal
                        }
                        _ => {
                            let registration = Registration::new(
                                item.service_ref.clone(),
                                item.extras.clone(),
                                now,
                            );
                            match upsert(&mut tree, item, &full_path, registration) {
                                Ok(()) => RebindResult::Success,
                                Err(err) => {
                                    failures.push(format!("{}: {}", full_path, err));
                                    RebindResult::Exception
                                }
                            }
                        }
                    }
                })
                .collect();
            results
        };

        for failure in &failures {
            warn!("Rebind failed for {}", failure);
        }
        RebindReply {
            ok: true,
            results,
            cookie,
        }
    }

    /// Renew the leases of a client's bindings.
    ///
    /// Each result is false when no binding lives at that path.
    pub fn renew_leases(&self, binding_paths: &[String], client_cookie: u64) -> RenewReply {
        let cookie = self.shared.cookie;
        if client_cookie != cookie {
            return RenewReply {
                ok: false,
                results: Vec::new(),
                cookie,
            };
        }

        let mut tree = self.shared.tree.lock();
        let now = self.shared.clock.now();
        let results = binding_paths
            .iter()
            .map(|binding_path| match tree.binding_mut(binding_path) {
                Ok(reg) => {
                    reg.renew(now);
                    true
                }
                Err(_) => false,
            })
            .collect();
        RenewReply {
            ok: true,
            results,
            cookie,
        }
    }

    // ========================================
    // Updates & removal
    // ========================================

    /// Remove the binding at `binding_path`.
    ///
    /// Returns false for a missing binding unless `throw_if_not` is set.
    /// A path naming a scope is always an error.
    pub fn remove_binding(&self, binding_path: &str, throw_if_not: bool) -> Result<bool> {
        let mut tree = self.shared.tree.lock();
        let removed = match tree.binding(binding_path) {
            Ok(_) => tree.remove_node(binding_path),
            Err(err) => Err(err),
        };
        Ok(unless_missing(removed, throw_if_not, Expect::Binding)?.is_some())
    }

    /// Change one extra value (slot 1 to 4) without resending the reference.
    pub fn update_extra_val(&self, binding_path: &str, index: u32, value: &str) -> Result<()> {
        let mut tree = self.shared.tree.lock();
        let reg = tree
            .binding_mut(binding_path)
            .map_err(|e| Expect::Binding.translate(e))?;
        if !reg.set_extra(index, value) {
            return Err(NameServerError::IndexOutOfRange {
                path: binding_path.to_string(),
                index,
            });
        }
        Ok(())
    }

    /// Exempt a binding from lease eviction.
    pub fn mark_permanent(&self, binding_path: &str) -> Result<()> {
        let mut tree = self.shared.tree.lock();
        tree.binding_mut(binding_path)
            .map_err(|e| Expect::Binding.translate(e))?
            .permanent = true;
        Ok(())
    }
}

fn upsert(
    tree: &mut PathTree,
    item: &RebindInfo,
    full_path: &str,
    registration: Registration,
) -> TreeResult<()> {
    if tree.exists(full_path) == Some(NodeType::Binding) {
        return tree.replace_binding(full_path, registration, &item.description);
    }
    if path::split_binding_path(full_path).is_none() {
        return Err(TreeError::BadPath(full_path.to_string()));
    }
    tree.create_scope_path(&item.parent_path, "")?;
    tree.add_binding(&item.parent_path, &item.node_name, registration, &item.description)
        .map(|_| ())
}
