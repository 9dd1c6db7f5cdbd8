//! Type-only merge for one member.
//!
//! Merges a member's own declared type with the types the same member has in
//! ancestors. This is a resolver, not a type checker: it never computes a
//! common supertype. The own type wins outright; with no own type, the first
//! inherited source defines each type kind and later contributions are
//! discarded (re-contributing an identical type is an observable no-op).

use glint_types::{Type, TypeSubstitution};

use crate::data::TypeInfo;

#[derive(Default)]
pub struct TypeInheritanceResolver {
    own: Option<TypeInfo>,
    inherited_native: Option<Type>,
    inherited_annotated: Option<Type>,
}

impl TypeInheritanceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the result with the class's own declared type information.
    pub fn set_own(&mut self, info: TypeInfo) {
        self.own = Some(info);
    }

    /// Folds in one ancestor's type information, substituting the use-site
    /// generic bindings first. First inherited source wins per type kind.
    pub fn add_inherited(&mut self, info: &TypeInfo, substitution: &TypeSubstitution) {
        if self.inherited_native.is_none() {
            self.inherited_native = info.native.as_ref().map(|ty| substitution.apply(ty));
        }
        if self.inherited_annotated.is_none() {
            self.inherited_annotated = info.annotated.as_ref().map(|ty| substitution.apply(ty));
        }
    }

    #[cfg(test)]
    fn inherited_snapshot(&self) -> (Option<Type>, Option<Type>) {
        (
            self.inherited_native.clone(),
            self.inherited_annotated.clone(),
        )
    }

    /// The merged result: own type per kind where declared, else the first
    /// inherited one.
    pub fn resolve(self) -> TypeInfo {
        let own = self.own.unwrap_or_default();
        TypeInfo {
            native: own.native.or(self.inherited_native),
            annotated: own.annotated.or(self.inherited_annotated),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/type_resolver_tests.rs"]
mod tests;
