use super::*;
use crate::data::{TypeInfo, TypedMap, Visibility, keys};
use glint_common::DeclarationId;
use glint_types::{Type, TypeSubstitution};

fn member(visibility: Visibility, ty: Type, declared_by: &str) -> TypedMap {
    TypedMap::new()
        .with(keys::Visibility, Some(visibility))
        .with(keys::TypeData, TypeInfo::from_native(ty))
        .with(
            keys::DeclaringClass,
            Some(DeclarationId::class(declared_by)),
        )
}

#[test]
fn no_contribution_resolves_to_none() {
    assert_eq!(BasicInheritanceResolver::new().resolve(), None);
}

#[test]
fn own_declaration_is_authoritative() {
    let mut resolver = BasicInheritanceResolver::new();
    resolver.set_own(member(Visibility::Protected, Type::int(), "C"));
    resolver.add_inherited(
        &member(Visibility::Public, Type::String, "P"),
        &TypeSubstitution::new(),
    );

    let resolved = resolver.resolve().expect("member exists");
    assert_eq!(resolved.get(keys::Visibility), Some(Visibility::Protected));
    assert_eq!(
        resolved.get(keys::TypeData).resolved(),
        Some(&Type::int())
    );
}

#[test]
fn private_inherited_members_are_skipped() {
    let mut resolver = BasicInheritanceResolver::new();
    resolver.add_inherited(
        &member(Visibility::Private, Type::int(), "P"),
        &TypeSubstitution::new(),
    );
    assert_eq!(resolver.resolve(), None);
}

#[test]
fn private_used_members_do_contribute() {
    let mut resolver = BasicInheritanceResolver::new();
    resolver.add_used(
        &member(Visibility::Private, Type::String, "T"),
        &TypeSubstitution::new(),
    );

    let resolved = resolver.resolve().expect("trait member copied in");
    assert_eq!(resolved.get(keys::Visibility), Some(Visibility::Private));
}

#[test]
fn first_used_source_becomes_base_when_no_own_exists() {
    // Trait T declares `private string $x`; parent A declares
    // `protected int $x`; the class itself declares nothing. The first used
    // source is the base, and its type wins over the later inherited one.
    let mut resolver = BasicInheritanceResolver::new();
    resolver.add_used(
        &member(Visibility::Private, Type::String, "T"),
        &TypeSubstitution::new(),
    );
    resolver.add_inherited(
        &member(Visibility::Protected, Type::int(), "A"),
        &TypeSubstitution::new(),
    );

    let resolved = resolver.resolve().expect("member exists");
    assert_eq!(resolved.get(keys::Visibility), Some(Visibility::Private));
    assert_eq!(
        resolved.get(keys::TypeData).resolved(),
        Some(&Type::String)
    );
    assert_eq!(
        resolved.get(keys::DeclaringClass),
        Some(DeclarationId::class("T"))
    );
}

#[test]
fn later_used_sources_only_feed_the_type_resolver() {
    let mut resolver = BasicInheritanceResolver::new();
    resolver.add_used(
        &member(Visibility::Public, Type::String, "T1"),
        &TypeSubstitution::new(),
    );
    resolver.add_used(
        &member(Visibility::Protected, Type::int(), "T2"),
        &TypeSubstitution::new(),
    );

    let resolved = resolver.resolve().expect("member exists");
    // Base modifiers come from the first used source; the later trait's
    // conflicting type is discarded.
    assert_eq!(resolved.get(keys::Visibility), Some(Visibility::Public));
    assert_eq!(
        resolved.get(keys::TypeData).resolved(),
        Some(&Type::String)
    );
}
