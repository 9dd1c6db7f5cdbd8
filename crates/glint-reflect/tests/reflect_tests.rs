//! Session-level behavior: staging, commit, rollback, cache validation,
//! cycle rejection, the built-in pipeline steps, and expression evaluation.

mod support;

use std::io::Write;
use std::sync::Arc;

use glint_common::DeclarationId;
use glint_reflect::{
    ClassKind, Evaluated, EvaluatedKey, Expression, InMemoryCache, ReflectError, Resource,
    TypeInfo, TypeKind, TypedMap, Visibility, keys,
};
use glint_types::Type;
use support::*;

fn id(name: &str) -> DeclarationId {
    DeclarationId::class(name)
}

#[test]
fn reflecting_a_missing_class_is_not_found() {
    let session = Universe::new().build();
    match session.reflect_class("Missing") {
        Err(ReflectError::NotFound(missing)) => assert_eq!(missing, id("Missing")),
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
}

#[test]
fn missing_parent_is_a_malformed_dependency() {
    let session = Universe::new()
        .class("Orphan", |base| {
            class_record(base).with(
                keys::UnresolvedParent,
                Some(glint_reflect::TypeReference::new(id("Gone"))),
            )
        })
        .build();

    match session.reflect_class("Orphan") {
        Err(ReflectError::MalformedDependency { of, link }) => {
            assert_eq!(of, id("Orphan"));
            assert_eq!(link, id("Gone"));
        }
        other => panic!("expected MalformedDependency, got {:?}", other.err()),
    }
}

#[test]
fn inheritance_cycles_are_rejected_with_the_path() {
    let session = Universe::new()
        .class("A", |base| {
            class_record(base).with(
                keys::UnresolvedParent,
                Some(glint_reflect::TypeReference::new(id("B"))),
            )
        })
        .class("B", |base| {
            class_record(base).with(
                keys::UnresolvedParent,
                Some(glint_reflect::TypeReference::new(id("A"))),
            )
        })
        .build();

    match session.reflect_class("A") {
        Err(ReflectError::ResolutionCycle(path)) => {
            assert!(path.0.first() == path.0.last() && path.0.len() >= 2);
        }
        other => panic!("expected ResolutionCycle, got {:?}", other.err()),
    }
}

#[test]
fn mutually_referencing_constants_are_rejected_not_looped() {
    let session = Universe::new()
        .class("A", |base| {
            class_record(base).with(
                keys::Constants,
                members(vec![(
                    "X",
                    class_constant(Visibility::Public, Type::int()).with(
                        keys::DefaultValue,
                        Some(Expression::ClassConstant {
                            class: glint_reflect::ClassNameRef::Named(id("B")),
                            name: "Y".to_string(),
                        }),
                    ),
                )]),
            )
        })
        .class("B", |base| {
            class_record(base).with(
                keys::Constants,
                members(vec![(
                    "Y",
                    class_constant(Visibility::Public, Type::int()).with(
                        keys::DefaultValue,
                        Some(Expression::ClassConstant {
                            class: glint_reflect::ClassNameRef::Named(id("A")),
                            name: "X".to_string(),
                        }),
                    ),
                )]),
            )
        })
        .build();

    // Both classes resolve fine; only evaluation closes the loop.
    let class_a = session.reflect_class("A").expect("A resolves");
    let constant = class_a.constant("X").expect("constant exists");
    match constant.value() {
        Err(ReflectError::ResolutionCycle(_)) => {}
        other => panic!("expected ResolutionCycle, got {other:?}"),
    }
}

#[test]
fn resolving_twice_yields_bit_identical_data() {
    let build = || {
        Universe::new().class("Point", |base| {
            class_record(base)
                .with(keys::Final, true)
                .with(
                    keys::Properties,
                    members(vec![
                        ("x", property(Visibility::Public, Type::Float)),
                        ("y", property(Visibility::Public, Type::Float)),
                    ]),
                )
        })
    };

    let first = build().build();
    let second = build().build();
    let bytes_first =
        serde_json::to_vec(first.reflect_class("Point").expect("resolves").data()).unwrap();
    let bytes_second =
        serde_json::to_vec(second.reflect_class("Point").expect("resolves").data()).unwrap();
    assert_eq!(bytes_first, bytes_second);

    // And within one session, a repeated reflect sees the same record.
    let again = serde_json::to_vec(first.reflect_class("Point").expect("resolves").data()).unwrap();
    assert_eq!(bytes_first, again);
}

#[test]
fn committed_entries_are_served_from_the_cache() {
    let cache = Arc::new(InMemoryCache::new());

    let first = Universe::new()
        .class("Config", |base| {
            class_record(base).with(
                keys::Properties,
                members(vec![("value", property(Visibility::Public, Type::int()))]),
            )
        })
        .build_with_cache(Arc::clone(&cache));
    first.reflect_class("Config").expect("resolves");
    assert!(!cache.is_empty());

    // A second session over the same cache never consults its own fixture:
    // the fixture would produce a string property, but the cached record
    // (whose detector is still fresh) wins.
    let second = Universe::new()
        .class("Config", |base| {
            class_record(base).with(
                keys::Properties,
                members(vec![("value", property(Visibility::Public, Type::String))]),
            )
        })
        .build_with_cache(Arc::clone(&cache));
    let class = second.reflect_class("Config").expect("resolves");
    let value = class.property("value").expect("property");
    assert_eq!(value.ty(TypeKind::Resolved), Some(Type::int()));
}

#[test]
fn stale_change_detector_forces_re_resolution() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "v1").expect("write");
    file.flush().expect("flush");
    let path = file.path().to_string_lossy().to_string();

    let cache = Arc::new(InMemoryCache::new());
    let first = Universe::new()
        .declare_resource(
            id("Config"),
            Resource::new("v1").with_file(path.as_str()),
            |base| {
                class_record(base).with(
                    keys::Properties,
                    members(vec![("value", property(Visibility::Public, Type::int()))]),
                )
            },
        )
        .build_with_cache(Arc::clone(&cache));
    first.reflect_class("Config").expect("resolves");

    // The file changes; the cached entry's detector is now stale. The
    // explicit mtime bump defeats coarse filesystem timestamps.
    write!(file, " edited").expect("write");
    file.flush().expect("flush");
    let _ = file.as_file().set_modified(
        std::time::SystemTime::now() + std::time::Duration::from_secs(2),
    );

    let second = Universe::new()
        .declare_resource(
            id("Config"),
            Resource::new("v2").with_file(path.as_str()),
            |base| {
                class_record(base).with(
                    keys::Properties,
                    members(vec![("value", property(Visibility::Public, Type::String))]),
                )
            },
        )
        .build_with_cache(Arc::clone(&cache));
    let class = second.reflect_class("Config").expect("resolves");
    let value = class.property("value").expect("property");
    assert_eq!(value.ty(TypeKind::Resolved), Some(Type::String));
}

#[test]
fn reflect_code_leaves_the_cache_untouched() {
    let cache = Arc::new(InMemoryCache::new());
    let mut universe = Universe::new().class("Persisted", class_record);
    universe = universe.declare(id("Ephemeral"), |base| {
        class_record(base).with(keys::Final, true)
    });
    let session = universe.build_with_cache(Arc::clone(&cache));

    // Commit one class so the cache is non-empty.
    session.reflect_class("Persisted").expect("resolves");
    let before = cache.snapshot();

    let reflections = session
        .reflect_code("src:class:Ephemeral", TypedMap::new())
        .expect("ad-hoc reflection");
    assert_eq!(reflections.len(), 1);
    let class = reflections
        .get(&id("Ephemeral"))
        .expect("reflected");
    match class {
        glint_reflect::Reflection::Class(_) => {}
        _ => panic!("expected a class reflection"),
    }

    assert_eq!(cache.snapshot(), before);
}

#[test]
fn promoted_constructor_parameters_become_properties() {
    let session = Universe::new()
        .class("User", |base| {
            class_record(base).with(
                keys::Methods,
                members(vec![(
                    glint_reflect::data::CONSTRUCTOR,
                    method(Visibility::Public).with(
                        keys::Parameters,
                        members(vec![
                            (
                                "name",
                                parameter(TypeInfo::from_native(Type::String))
                                    .with(keys::Promoted, true)
                                    .with(keys::Visibility, Some(Visibility::Private))
                                    .with(keys::NativeReadonly, true)
                                    .with(
                                        keys::DefaultValue,
                                        Some(Expression::String("anon".to_string())),
                                    ),
                            ),
                            ("age", parameter(TypeInfo::from_native(Type::int()))),
                        ]),
                    ),
                )]),
            )
        })
        .build();

    let class = session.reflect_class("User").expect("resolves");

    let name = class.property("name").expect("promoted property");
    assert!(name.is_promoted());
    assert!(name.is_readonly());
    assert_eq!(name.visibility(), Some(Visibility::Private));
    assert!(!name.has_default());

    assert!(class.property("age").is_none());

    let constructor = class
        .method(glint_reflect::data::CONSTRUCTOR)
        .expect("constructor");
    let parameter = constructor.parameter("name").expect("parameter kept");
    assert_eq!(parameter.visibility(), None);
    assert!(parameter.has_default());
    assert_eq!(parameter.index(), 0);
    assert_eq!(constructor.parameter("age").expect("second").index(), 1);
}

#[test]
fn interface_methods_are_forced_abstract() {
    let session = Universe::new()
        .declare(id("Sequence"), |base| {
            interface_record(base).with(
                keys::Methods,
                members(vec![("first", method(Visibility::Public))]),
            )
        })
        .build();

    let interface = session.reflect_class("Sequence").expect("resolves");
    assert!(interface.method("first").expect("method").is_abstract());
}

#[test]
fn readonly_class_marks_every_property_readonly() {
    let session = Universe::new()
        .class("Frozen", |base| {
            class_record(base).with(keys::NativeReadonly, true).with(
                keys::Properties,
                members(vec![("state", property(Visibility::Public, Type::int()))]),
            )
        })
        .build();

    let class = session.reflect_class("Frozen").expect("resolves");
    assert!(class.property("state").expect("property").is_readonly());
}

#[test]
fn repeated_attributes_are_marked() {
    let session = Universe::new()
        .class("Routes", |base| {
            class_record(base).with(
                keys::Attributes,
                vec![
                    glint_reflect::Attribute::new("Route"),
                    glint_reflect::Attribute::new("Route"),
                    glint_reflect::Attribute::new("Deprecated"),
                ],
            )
        })
        .build();

    let attributes = session
        .reflect_class("Routes")
        .expect("resolves")
        .attributes();
    assert!(attributes[0].repeated);
    assert!(attributes[1].repeated);
    assert!(!attributes[2].repeated);
}

#[test]
fn default_values_evaluate_against_the_class_scope() {
    let session = Universe::new()
        .class("Defaults", |base| {
            class_record(base)
                .with(
                    keys::Constants,
                    members(vec![(
                        "LIMIT",
                        class_constant(Visibility::Public, Type::int())
                            .with(keys::DefaultValue, Some(Expression::Int(10))),
                    )]),
                )
                .with(
                    keys::Properties,
                    members(vec![(
                        "settings",
                        property(Visibility::Private, Type::array()).with(
                            keys::DefaultValue,
                            Some(Expression::Array(vec![
                                glint_reflect::ArrayItem::KeyValue(
                                    Expression::String("limit".to_string()),
                                    Expression::ClassConstant {
                                        class: glint_reflect::ClassNameRef::SelfClass,
                                        name: "LIMIT".to_string(),
                                    },
                                ),
                                glint_reflect::ArrayItem::Value(Expression::Concat(
                                    Box::new(Expression::String("v".to_string())),
                                    Box::new(Expression::Int(2)),
                                )),
                            ])),
                        ),
                    )]),
                )
        })
        .build();

    let class = session.reflect_class("Defaults").expect("resolves");
    let settings = class.property("settings").expect("property");
    let value = settings.default_value().expect("evaluates").expect("set");
    assert_eq!(
        value,
        Evaluated::Array(vec![
            (
                EvaluatedKey::String("limit".to_string()),
                Evaluated::Int(10)
            ),
            (EvaluatedKey::Int(0), Evaluated::String("v2".to_string())),
        ])
    );

    // Second read comes from the loaded state.
    assert_eq!(settings.default_value().expect("evaluates"), Some(value));
}

#[test]
fn backed_enum_cases_evaluate_their_backing_value() {
    let session = Universe::new()
        .declare(id("Status"), |base| {
            enum_record(base)
                .with(keys::BackingType, Some(Type::String))
                .with(
                    keys::Constants,
                    members(vec![(
                        "Active",
                        TypedMap::new()
                            .with(keys::EnumCase, true)
                            .with(
                                keys::BackingValue,
                                Some(Expression::String("active".to_string())),
                            ),
                    )]),
                )
        })
        .build();

    let status = session.reflect_class("Status").expect("resolves");
    assert_eq!(status.kind(), ClassKind::Enum);
    assert_eq!(status.backing_type(), Some(Type::String));

    let case = status.constant("Active").expect("case");
    assert!(case.is_enum_case());
    assert_eq!(
        case.value().expect("evaluates"),
        Evaluated::String("active".to_string())
    );
}

#[test]
fn functions_and_constants_reflect_and_evaluate() {
    let limit = DeclarationId::constant("LIMIT");
    let limit_ref = limit.clone();
    let session = Universe::new()
        .declare(limit.clone(), |base| {
            base.with(keys::TypeData, TypeInfo::from_native(Type::int()))
                .with(keys::DefaultValue, Some(Expression::Int(5)))
        })
        .declare(DeclarationId::function("clamp"), move |base| {
            base.with(keys::TypeData, TypeInfo::from_native(Type::int()))
                .with(
                    keys::Parameters,
                    members(vec![
                        ("value", parameter(TypeInfo::from_native(Type::int()))),
                        (
                            "max",
                            parameter(TypeInfo::from_native(Type::int())).with(
                                keys::DefaultValue,
                                Some(Expression::ConstantRef(limit_ref.clone())),
                            ),
                        ),
                    ]),
                )
        })
        .build();

    let function = session
        .reflect(DeclarationId::function("clamp"))
        .expect("resolves")
        .into_function()
        .expect("function");
    assert_eq!(function.ty(TypeKind::Resolved), Some(Type::int()));
    let max = function.parameter("max").expect("parameter");
    assert_eq!(max.index(), 1);
    assert_eq!(max.default_value().expect("evaluates"), Some(Evaluated::Int(5)));

    let constant = session
        .reflect(limit)
        .expect("resolves")
        .into_constant()
        .expect("constant");
    assert_eq!(constant.value().expect("evaluates"), Evaluated::Int(5));
}

#[test]
fn anonymous_classes_reflect_by_file_and_line() {
    let anonymous = DeclarationId::anonymous_class("src/app.x", 17);
    let session = Universe::new()
        .declare(anonymous.clone(), |base| {
            class_record(base).with(keys::Final, true)
        })
        .build();

    let class = session
        .reflect_class("class@src/app.x:17")
        .expect("resolves");
    assert_eq!(class.id(), &anonymous);
    assert!(class.is_final());
}
