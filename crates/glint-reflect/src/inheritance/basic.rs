//! Single-member merge across one class and its ancestors.
//!
//! Contributions arrive in a fixed order: the class's own declaration, then
//! each used trait in declared order, then the inherited sources (parent,
//! then interfaces in declared order). The own declaration is authoritative
//! for everything but the merged type; with no own declaration, the first
//! used source becomes the base. Private members of inherited sources never
//! contribute — that is the rule that separates "used" from "inherited": a
//! trait's private helper is copied into every using class, while a parent's
//! private member stays invisible.

use glint_types::TypeSubstitution;

use crate::data::{TypedMap, Visibility, keys};

use super::type_resolver::TypeInheritanceResolver;

#[derive(Default)]
pub struct BasicInheritanceResolver {
    data: Option<TypedMap>,
    types: TypeInheritanceResolver,
}

impl BasicInheritanceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records this class's own declaration of the member.
    pub fn set_own(&mut self, data: TypedMap) {
        self.types.set_own(data.get(keys::TypeData));
        self.data = Some(data);
    }

    /// Merges in a used trait's version of the member.
    pub fn add_used(&mut self, data: &TypedMap, substitution: &TypeSubstitution) {
        self.types.add_inherited(&data.get(keys::TypeData), substitution);
        if self.data.is_none() {
            self.data = Some(data.clone());
        }
    }

    /// Merges in a parent's or interface's version of the member. Private
    /// members are never inherited.
    pub fn add_inherited(&mut self, data: &TypedMap, substitution: &TypeSubstitution) {
        if data.get(keys::Visibility) == Some(Visibility::Private) {
            return;
        }
        self.types.add_inherited(&data.get(keys::TypeData), substitution);
        if self.data.is_none() {
            self.data = Some(data.clone());
        }
    }

    /// `None` when no source ever contributed: the member does not exist in
    /// this hierarchy.
    pub fn resolve(self) -> Option<TypedMap> {
        let types = self.types;
        self.data
            .map(|data| data.with(keys::TypeData, types.resolve()))
    }
}

#[cfg(test)]
#[path = "../../tests/basic_resolver_tests.rs"]
mod tests;
