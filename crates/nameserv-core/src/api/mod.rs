//! API implementation submodules.
//!
//! Each submodule contains `impl RegistryService` blocks that extend the
//! public API with one group of operations. The struct definition remains in
//! `lib.rs`.

mod binding;
mod builder;
mod lifecycle;
mod query;
mod scope;
mod state;

pub use builder::RegistryServiceBuilder;
pub(crate) use state::ServiceState;

use crate::error::NameServerError;
use crate::tree::TreeError;

/// What the caller was looking for when a tree operation failed.
///
/// The tree only knows a node was missing; the service knows whether that
/// means a missing scope, a missing binding, or just a missing path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Expect {
    Node,
    Scope,
    Binding,
}

impl Expect {
    pub(crate) fn translate(self, err: TreeError) -> NameServerError {
        match err {
            TreeError::BadPath(path) => NameServerError::BadPath { path },
            TreeError::NodeNotFound(path) => match self {
                Expect::Node => NameServerError::NotFound { path },
                Expect::Scope => NameServerError::ScopeNotFound { path },
                Expect::Binding => NameServerError::BindingNotFound { path },
            },
            TreeError::NotAScope(path) => NameServerError::NotAScope { path },
            TreeError::NotABinding(path) => NameServerError::NotABinding { path },
            TreeError::DuplicateName { parent, name } => {
                NameServerError::AlreadyExists { parent, name }
            }
            TreeError::RootRemoval => NameServerError::CantRemoveRoot,
        }
    }
}

impl From<TreeError> for NameServerError {
    fn from(err: TreeError) -> Self {
        Expect::Node.translate(err)
    }
}

/// Map "not found" onto `Ok(None)` when the caller asked not to throw.
pub(crate) fn unless_missing<T>(
    result: std::result::Result<T, TreeError>,
    throw_if_not: bool,
    expect: Expect,
) -> crate::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TreeError::NodeNotFound(_)) if !throw_if_not => Ok(None),
        Err(err) => Err(expect.translate(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_not_found_depends_on_expectation() {
        let missing = || TreeError::NodeNotFound("/a/b".into());
        assert!(matches!(
            Expect::Scope.translate(missing()),
            NameServerError::ScopeNotFound { .. }
        ));
        assert!(matches!(
            Expect::Binding.translate(missing()),
            NameServerError::BindingNotFound { .. }
        ));
        assert_eq!(
            NameServerError::from(missing()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_structural_errors_translate() {
        let dup = TreeError::DuplicateName {
            parent: "/a".into(),
            name: "b".into(),
        };
        assert_eq!(NameServerError::from(dup).kind(), ErrorKind::AlreadyExists);
        assert!(matches!(
            NameServerError::from(TreeError::RootRemoval),
            NameServerError::CantRemoveRoot
        ));
    }

    #[test]
    fn test_unless_missing() {
        let missing: std::result::Result<u8, _> = Err(TreeError::NodeNotFound("/x".into()));
        assert_eq!(
            unless_missing(missing.clone(), false, Expect::Scope).unwrap(),
            None
        );
        assert!(unless_missing(missing, true, Expect::Scope).is_err());

        // Wrong type is always an error
        let wrong: std::result::Result<u8, _> = Err(TreeError::NotAScope("/x".into()));
        assert!(unless_missing(wrong, false, Expect::Scope).is_err());
    }
}
