//! Built-in pipeline steps.
//!
//! Registration order is a contract: promotion-to-property runs before
//! readonly propagation, which runs before inheritance resolution, which
//! runs before the final cleanup that strips transient keys from the record
//! that gets cached. See [`crate::session::Reflector`] for the sequence.

use glint_common::DeclarationId;

use crate::change::ChangeDetectorSet;
use crate::data::{Attribute, CONSTRUCTOR, ClassKind, Members, TypedMap, keys};
use crate::error::Result;
use crate::hook::Hook;
use crate::session::Reflector;

/// Copies constructor-promoted parameters into the property map.
///
/// The parameter keeps its promoted marker but loses visibility and
/// readonly flags (those live on the property); the property drops the
/// default value (that stays a constructor concern).
pub struct CopyPromotedParameterToProperty;

impl Hook for CopyPromotedParameterToProperty {
    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        let kind = data.get(keys::ClassKind);
        if kind == ClassKind::Enum || kind == ClassKind::Interface {
            return Ok(data);
        }

        let mut methods = data.get(keys::Methods);
        let Some(constructor) = methods.get(CONSTRUCTOR).cloned() else {
            return Ok(data);
        };

        let mut parameters = constructor.get(keys::Parameters);
        let mut properties = data.get(keys::Properties);

        for (name, parameter) in parameters.clone() {
            if parameter.get(keys::Promoted) {
                parameters.insert(
                    name.clone(),
                    parameter
                        .without(keys::NativeReadonly)
                        .without(keys::AnnotatedReadonly)
                        .without(keys::Visibility),
                );
                properties.insert(name, parameter.without(keys::DefaultValue));
            }
        }

        methods.insert(
            CONSTRUCTOR.to_string(),
            constructor.with(keys::Parameters, parameters),
        );

        Ok(data
            .with(keys::Methods, methods)
            .with(keys::Properties, properties))
    }
}

/// Interface methods are implicitly abstract.
pub struct SetInterfaceMethodAbstract;

impl Hook for SetInterfaceMethodAbstract {
    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        if data.get(keys::ClassKind) != ClassKind::Interface {
            return Ok(data);
        }

        let methods: Members = data
            .get(keys::Methods)
            .into_iter()
            .map(|(name, method)| (name, method.with(keys::Abstract, true)))
            .collect();
        Ok(data.with(keys::Methods, methods))
    }
}

/// Properties of a readonly class are readonly.
pub struct EnsureReadonlyClassPropertiesAreReadonly;

impl Hook for EnsureReadonlyClassPropertiesAreReadonly {
    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        if data.get(keys::ClassKind) != ClassKind::Class {
            return Ok(data);
        }

        let mut data = data;
        if data.get(keys::NativeReadonly) {
            let properties: Members = data
                .get(keys::Properties)
                .into_iter()
                .map(|(name, property)| (name, property.with(keys::NativeReadonly, true)))
                .collect();
            data = data.with(keys::Properties, properties);
        }
        if data.get(keys::AnnotatedReadonly) {
            let properties: Members = data
                .get(keys::Properties)
                .into_iter()
                .map(|(name, property)| (name, property.with(keys::AnnotatedReadonly, true)))
                .collect();
            data = data.with(keys::Properties, properties);
        }
        Ok(data)
    }
}

/// Marks attributes that occur more than once on the same target.
pub struct ResolveAttributesRepeated;

impl ResolveAttributesRepeated {
    fn mark(attributes: Vec<Attribute>) -> Vec<Attribute> {
        let names: Vec<String> = attributes.iter().map(|a| a.name.clone()).collect();
        attributes
            .into_iter()
            .map(|mut attribute| {
                attribute.repeated =
                    names.iter().filter(|name| **name == attribute.name).count() > 1;
                attribute
            })
            .collect()
    }

    fn mark_map(map: TypedMap) -> TypedMap {
        if !map.contains(keys::Attributes) {
            return map;
        }
        let attributes = Self::mark(map.get(keys::Attributes));
        map.with(keys::Attributes, attributes)
    }

    fn mark_members(members: Members) -> Members {
        members
            .into_iter()
            .map(|(name, member)| {
                let member = Self::mark_map(member);
                let member = if member.contains(keys::Parameters) {
                    let parameters = Self::mark_members(member.get(keys::Parameters));
                    member.with(keys::Parameters, parameters)
                } else {
                    member
                };
                (name, member)
            })
            .collect()
    }

    fn process(data: TypedMap) -> TypedMap {
        let mut data = Self::mark_map(data);
        macro_rules! rewrite_members {
            ($key:expr) => {{
                let members = data.get($key);
                if !members.is_empty() {
                    data = data.with($key, Self::mark_members(members));
                }
            }};
        }
        rewrite_members!(keys::Constants);
        rewrite_members!(keys::Properties);
        rewrite_members!(keys::Methods);
        if !data.get(keys::Parameters).is_empty() {
            let parameters = Self::mark_members(data.get(keys::Parameters));
            data = data.with(keys::Parameters, parameters);
        }
        data
    }
}

impl Hook for ResolveAttributesRepeated {
    fn process_constant(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_function(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }
}

/// Records each parameter's zero-based position.
pub struct ResolveParametersIndex;

impl ResolveParametersIndex {
    fn index_parameters(parameters: Members) -> Members {
        parameters
            .into_iter()
            .enumerate()
            .map(|(index, (name, parameter))| (name, parameter.with(keys::Index, index)))
            .collect()
    }
}

impl Hook for ResolveParametersIndex {
    fn process_function(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        let parameters = Self::index_parameters(data.get(keys::Parameters));
        Ok(data.with(keys::Parameters, parameters))
    }

    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        let methods: Members = data
            .get(keys::Methods)
            .into_iter()
            .map(|(name, method)| {
                let parameters = Self::index_parameters(method.get(keys::Parameters));
                (name, method.with(keys::Parameters, parameters))
            })
            .collect();
        Ok(data.with(keys::Methods, methods))
    }
}

/// Aggregates the gathered detectors into the record's single detector set.
pub struct ResolveChangeDetector;

impl ResolveChangeDetector {
    fn process(data: TypedMap) -> TypedMap {
        let detectors = data.get(keys::UnresolvedChangeDetectors);
        data.with(
            keys::ChangeDetector,
            Some(ChangeDetectorSet::from_detectors(detectors)),
        )
    }
}

impl Hook for ResolveChangeDetector {
    fn process_constant(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_function(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }
}

/// Strips transient keys before the record is cached.
pub struct CleanUp;

impl CleanUp {
    fn process(data: TypedMap) -> TypedMap {
        data.without(keys::UnresolvedChangeDetectors)
            .without(keys::UnresolvedParent)
            .without(keys::UnresolvedInterfaces)
            .without(keys::UnresolvedTraits)
            .without(keys::TraitMethodAliases)
            .without(keys::TraitMethodExclusions)
    }
}

impl Hook for CleanUp {
    fn process_constant(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_function(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }

    fn process_class(
        &self,
        _id: &DeclarationId,
        data: TypedMap,
        _session: &Reflector,
    ) -> Result<TypedMap> {
        Ok(Self::process(data))
    }
}
