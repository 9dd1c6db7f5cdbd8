//! Whole-class inheritance orchestration.
//!
//! For one class-like declaration this walks, in order: its own members,
//! each used trait (declared order, with use-site adaptations), the parent,
//! and each declared interface — every ancestor itself fully resolved
//! through the session first — and folds each member through a
//! [`BasicInheritanceResolver`] / [`MethodInheritanceResolver`].
//!
//! Class-level flags (kind, final, abstract, readonly) are never inherited;
//! they come only from the own declaration and are left untouched here.

use glint_common::DeclarationId;
use glint_types::{Type, TypeSubstitution};
use indexmap::IndexMap;
use tracing::trace;

use crate::change::ChangeDetector;
use crate::data::{Members, TraitMethodAlias, TypeReference, TypedMap, keys};
use crate::error::{ReflectError, Result};
use crate::session::Reflector;

use super::basic::BasicInheritanceResolver;
use super::method::MethodInheritanceResolver;

pub struct ClassInheritanceResolver<'a> {
    session: &'a Reflector,
    id: DeclarationId,
    data: TypedMap,
    constants: IndexMap<String, BasicInheritanceResolver>,
    properties: IndexMap<String, BasicInheritanceResolver>,
    methods: IndexMap<String, MethodInheritanceResolver>,
    /// Interface lists in merge order: own-declared, parent's, each trait's.
    own_interfaces: Vec<TypeReference>,
    parent_interfaces: Vec<TypeReference>,
    trait_interfaces: Vec<TypeReference>,
    resolved_parent: Option<TypeReference>,
    dependency_detectors: Vec<ChangeDetector>,
}

impl<'a> ClassInheritanceResolver<'a> {
    pub fn resolve(session: &'a Reflector, id: &DeclarationId, data: TypedMap) -> Result<TypedMap> {
        trace!(id = %id, "resolve class inheritance");
        let mut resolver = Self {
            session,
            id: id.clone(),
            data,
            constants: IndexMap::new(),
            properties: IndexMap::new(),
            methods: IndexMap::new(),
            own_interfaces: Vec::new(),
            parent_interfaces: Vec::new(),
            trait_interfaces: Vec::new(),
            resolved_parent: None,
            dependency_detectors: Vec::new(),
        };
        resolver.add_own();
        resolver.add_used_traits()?;
        resolver.add_parent()?;
        resolver.add_own_interfaces()?;
        Ok(resolver.finish())
    }

    fn add_own(&mut self) {
        let own_id = self.id.clone();
        for (name, constant) in self.data.get(keys::Constants) {
            let constant = constant.with(keys::DeclaringClass, Some(own_id.clone()));
            self.constants.entry(name).or_default().set_own(constant);
        }
        for (name, property) in self.data.get(keys::Properties) {
            let property = property.with(keys::DeclaringClass, Some(own_id.clone()));
            self.properties.entry(name).or_default().set_own(property);
        }
        for (name, method) in self.data.get(keys::Methods) {
            let method = method.with(keys::DeclaringClass, Some(own_id.clone()));
            self.methods.entry(name).or_default().set_own(method);
        }
    }

    fn add_used_traits(&mut self) -> Result<()> {
        let aliases = self.data.get(keys::TraitMethodAliases);
        let exclusions = self.data.get(keys::TraitMethodExclusions);

        for reference in self.data.get(keys::UnresolvedTraits) {
            let trait_data = self.dependency_data(&reference.class)?;
            let substitution = self.use_site_substitution(&reference, &trait_data);

            for (name, constant) in trait_data.get(keys::Constants) {
                let constant = self.as_used_member(constant);
                self.constants
                    .entry(name)
                    .or_default()
                    .add_used(&constant, &substitution);
            }
            for (name, property) in trait_data.get(keys::Properties) {
                let property = self.as_used_member(property);
                self.properties
                    .entry(name)
                    .or_default()
                    .add_used(&property, &substitution);
            }
            for (name, method) in trait_data.get(keys::Methods) {
                let excluded = exclusions
                    .iter()
                    .any(|exclusion| exclusion.of == reference.class && exclusion.method == name);
                let method = self.as_used_member(method);

                // Aliases contribute the method under the new name even when
                // the original is excluded at this use site.
                for alias in matching_aliases(&aliases, &reference.class, &name) {
                    if let Some(alias_name) = &alias.alias {
                        let mut aliased = method.clone();
                        if let Some(visibility) = alias.visibility {
                            aliased = aliased.with(keys::Visibility, Some(visibility));
                        }
                        self.methods
                            .entry(alias_name.clone())
                            .or_default()
                            .add_used(&aliased, &substitution);
                    }
                }

                if excluded {
                    continue;
                }

                let mut method = method;
                for alias in matching_aliases(&aliases, &reference.class, &name) {
                    if alias.alias.is_none() {
                        if let Some(visibility) = alias.visibility {
                            method = method.with(keys::Visibility, Some(visibility));
                        }
                    }
                }
                self.methods
                    .entry(name)
                    .or_default()
                    .add_used(&method, &substitution);
            }

            for interface in trait_data.get(keys::Interfaces) {
                self.trait_interfaces
                    .push(substitute_reference(interface, &substitution));
            }
        }
        Ok(())
    }

    fn add_parent(&mut self) -> Result<()> {
        let Some(reference) = self.data.get(keys::UnresolvedParent) else {
            return Ok(());
        };
        let parent_data = self.dependency_data(&reference.class)?;
        let substitution = self.use_site_substitution(&reference, &parent_data);

        for (name, constant) in parent_data.get(keys::Constants) {
            self.constants
                .entry(name)
                .or_default()
                .add_inherited(&constant, &substitution);
        }
        for (name, property) in parent_data.get(keys::Properties) {
            self.properties
                .entry(name)
                .or_default()
                .add_inherited(&property, &substitution);
        }
        for (name, method) in parent_data.get(keys::Methods) {
            self.methods
                .entry(name)
                .or_default()
                .add_inherited(&method, &substitution);
        }

        // A class implements everything its parent implements.
        for interface in parent_data.get(keys::Interfaces) {
            self.parent_interfaces
                .push(substitute_reference(interface, &substitution));
        }

        self.resolved_parent = Some(reference);
        Ok(())
    }

    fn add_own_interfaces(&mut self) -> Result<()> {
        for reference in self.data.get(keys::UnresolvedInterfaces) {
            let interface_data = self.dependency_data(&reference.class)?;
            let substitution = self.use_site_substitution(&reference, &interface_data);

            for (name, constant) in interface_data.get(keys::Constants) {
                self.constants
                    .entry(name)
                    .or_default()
                    .add_inherited(&constant, &substitution);
            }
            for (name, method) in interface_data.get(keys::Methods) {
                self.methods
                    .entry(name)
                    .or_default()
                    .add_inherited(&method, &substitution);
            }

            self.own_interfaces.push(reference);
            for transitive in interface_data.get(keys::Interfaces) {
                self.own_interfaces
                    .push(substitute_reference(transitive, &substitution));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> TypedMap {
        let mut interfaces: Vec<TypeReference> = Vec::new();
        let mut seen: Vec<DeclarationId> = Vec::new();
        for reference in self
            .own_interfaces
            .drain(..)
            .chain(self.parent_interfaces.drain(..))
            .chain(self.trait_interfaces.drain(..))
        {
            if !seen.contains(&reference.class) {
                seen.push(reference.class.clone());
                interfaces.push(reference);
            }
        }

        let constants = resolve_members(self.constants, BasicInheritanceResolver::resolve);
        let properties = resolve_members(self.properties, BasicInheritanceResolver::resolve);
        let methods = resolve_members(self.methods, MethodInheritanceResolver::resolve);

        let mut detectors = self.data.get(keys::UnresolvedChangeDetectors);
        detectors.extend(self.dependency_detectors);

        self.data
            .with(keys::Constants, constants)
            .with(keys::Properties, properties)
            .with(keys::Methods, methods)
            .with(keys::Interfaces, interfaces)
            .with(keys::Parent, self.resolved_parent)
            .with(keys::UnresolvedChangeDetectors, detectors)
    }

    /// Fully resolved data of one inheritance link. A link that does not
    /// resolve is fatal for this class: correctness of the merge requires
    /// every ancestor.
    fn dependency_data(&mut self, link: &DeclarationId) -> Result<TypedMap> {
        let data = self
            .session
            .declaration_data(link)?
            .ok_or_else(|| ReflectError::MalformedDependency {
                of: self.id.clone(),
                link: link.clone(),
            })?;
        if let Some(detector) = data.get(keys::ChangeDetector) {
            self.dependency_detectors
                .extend(detector.detectors().iter().cloned());
        }
        Ok(data)
    }

    fn use_site_substitution(
        &self,
        reference: &TypeReference,
        dependency_data: &TypedMap,
    ) -> TypeSubstitution {
        TypeSubstitution::for_use_site(
            &reference.class,
            &dependency_data.get(keys::Templates),
            &reference.args,
        )
    }

    /// Trait members are copied into the using class: the declaring class is
    /// rewritten to it.
    fn as_used_member(&self, member: TypedMap) -> TypedMap {
        member.with(keys::DeclaringClass, Some(self.id.clone()))
    }
}

fn matching_aliases<'d>(
    aliases: &'d [TraitMethodAlias],
    trait_id: &'d DeclarationId,
    method: &'d str,
) -> impl Iterator<Item = &'d TraitMethodAlias> {
    aliases.iter().filter(move |alias| {
        alias.method == method
            && alias
                .of
                .as_ref()
                .is_none_or(|restricted| restricted == trait_id)
    })
}

fn substitute_reference(reference: TypeReference, substitution: &TypeSubstitution) -> TypeReference {
    TypeReference {
        class: reference.class,
        args: reference
            .args
            .iter()
            .map(|arg: &Type| substitution.apply(arg))
            .collect(),
    }
}

fn resolve_members<R>(
    resolvers: IndexMap<String, R>,
    resolve: impl Fn(R) -> Option<TypedMap>,
) -> Members {
    let mut members = Members::new();
    for (name, resolver) in resolvers {
        if let Some(member) = resolve(resolver) {
            members.insert(name, member);
        }
    }
    members
}
