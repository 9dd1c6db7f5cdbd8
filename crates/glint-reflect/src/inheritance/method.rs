//! Method merge: the member record plus its parameters.
//!
//! Parameter lists are merged member-by-member *by parameter name*, not by
//! position. A renamed parameter in an overriding method therefore never
//! re-merges with a same-position but differently-named ancestor parameter,
//! and an ancestor-only name contributes its own entry. This is the chosen
//! policy, not an accident of implementation.

use glint_types::TypeSubstitution;

use indexmap::IndexMap;

use crate::data::{TypedMap, Visibility, keys};

use super::basic::BasicInheritanceResolver;

#[derive(Default)]
pub struct MethodInheritanceResolver {
    method: BasicInheritanceResolver,
    parameters: IndexMap<String, BasicInheritanceResolver>,
}

impl MethodInheritanceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_own(&mut self, data: TypedMap) {
        for (name, parameter) in data.get(keys::Parameters) {
            self.parameters.entry(name).or_default().set_own(parameter);
        }
        self.method.set_own(data);
    }

    pub fn add_used(&mut self, data: &TypedMap, substitution: &TypeSubstitution) {
        for (name, parameter) in data.get(keys::Parameters) {
            self.parameters
                .entry(name)
                .or_default()
                .add_used(&parameter, substitution);
        }
        self.method.add_used(data, substitution);
    }

    pub fn add_inherited(&mut self, data: &TypedMap, substitution: &TypeSubstitution) {
        if data.get(keys::Visibility) == Some(Visibility::Private) {
            return;
        }
        for (name, parameter) in data.get(keys::Parameters) {
            self.parameters
                .entry(name)
                .or_default()
                .add_inherited(&parameter, substitution);
        }
        self.method.add_inherited(data, substitution);
    }

    pub fn resolve(self) -> Option<TypedMap> {
        let data = self.method.resolve()?;
        let mut parameters = IndexMap::new();
        for (name, resolver) in self.parameters {
            if let Some(parameter) = resolver.resolve() {
                parameters.insert(name, parameter);
            }
        }
        Some(data.with(keys::Parameters, parameters))
    }
}
