use super::*;
use crate::data::{ClassKind, TypeInfo, keys};
use glint_types::Type;

#[test]
fn with_never_mutates_the_original() {
    let original = TypedMap::new();
    let updated = original.with(keys::Final, true);

    assert!(!original.contains(keys::Final));
    assert!(updated.get(keys::Final));
    assert!(!original.get(keys::Final));
}

#[test]
fn absent_optional_key_answers_with_fallback() {
    let map = TypedMap::new();
    assert_eq!(map.get(keys::Visibility), None);
    assert_eq!(map.get(keys::File), None);
    assert!(map.get(keys::Constants).is_empty());
    assert_eq!(map.get(keys::TypeData), TypeInfo::default());
}

#[test]
#[should_panic(expected = "missing mandatory key `ClassKind`")]
fn absent_mandatory_key_is_a_programming_error() {
    TypedMap::new().get(keys::ClassKind);
}

#[test]
fn without_removes_only_the_named_key() {
    let map = TypedMap::new()
        .with(keys::Static, true)
        .with(keys::Promoted, true);
    let map = map.without(keys::Promoted);

    assert!(map.get(keys::Static));
    assert!(!map.get(keys::Promoted));
    assert!(!map.contains(keys::Promoted));
}

#[test]
fn set_overwrites_previous_value() {
    let map = TypedMap::new()
        .with(keys::ClassKind, ClassKind::Class)
        .with(keys::ClassKind, ClassKind::Interface);
    assert_eq!(map.get(keys::ClassKind), ClassKind::Interface);
    assert_eq!(map.len(), 1);
}

#[test]
fn round_trips_through_serde() {
    let map = TypedMap::new()
        .with(keys::ClassKind, ClassKind::Enum)
        .with(keys::BackingType, Some(Type::String))
        .with(keys::Final, true);

    let bytes = serde_json::to_vec(&map).expect("serialize");
    let restored: TypedMap = serde_json::from_slice(&bytes).expect("deserialize");
    assert_eq!(map, restored);
}

#[test]
fn serialization_is_deterministic_for_equal_maps() {
    let build = || {
        TypedMap::new()
            .with(keys::ClassKind, ClassKind::Class)
            .with(keys::Abstract, true)
            .with(keys::File, Some("src/a.x".to_string()))
    };
    let first = serde_json::to_vec(&build()).expect("serialize");
    let second = serde_json::to_vec(&build()).expect("serialize");
    assert_eq!(first, second);
}
