use super::*;
use crate::types::{ArrayShape, CallableParam, ShapeElement, ShapeKey, TemplateDecl, TemplateRef, Type};
use glint_common::DeclarationId;

fn owner() -> DeclarationId {
    DeclarationId::class("Collection")
}

fn template_t() -> Type {
    Type::template(owner(), "T")
}

#[test]
fn substitution_basic() {
    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());

    subst.insert(TemplateRef::new(owner(), "T"), Type::String);
    assert_eq!(subst.len(), 1);
    assert_eq!(
        subst.get(&TemplateRef::new(owner(), "T")),
        Some(&Type::String)
    );
    assert_eq!(subst.get(&TemplateRef::new(owner(), "U")), None);
}

#[test]
fn for_use_site_pairs_params_with_args() {
    let templates = vec![TemplateDecl::new("K"), TemplateDecl::new("V")];
    let subst = TypeSubstitution::for_use_site(&owner(), &templates, &[Type::int(), Type::String]);

    assert_eq!(
        subst.get(&TemplateRef::new(owner(), "K")),
        Some(&Type::int())
    );
    assert_eq!(
        subst.get(&TemplateRef::new(owner(), "V")),
        Some(&Type::String)
    );
}

#[test]
fn for_use_site_missing_arg_uses_default_then_mixed() {
    let templates = vec![
        TemplateDecl::new("K").with_default(Type::String),
        TemplateDecl::new("V"),
    ];
    let subst = TypeSubstitution::for_use_site(&owner(), &templates, &[]);

    assert_eq!(
        subst.get(&TemplateRef::new(owner(), "K")),
        Some(&Type::String)
    );
    assert_eq!(
        subst.get(&TemplateRef::new(owner(), "V")),
        Some(&Type::Mixed)
    );
}

#[test]
fn unbound_template_passes_through() {
    let subst =
        TypeSubstitution::for_use_site(&owner(), &[TemplateDecl::new("T")], &[Type::Float]);
    let foreign = Type::template(DeclarationId::class("Other"), "T");
    assert_eq!(subst.apply(&foreign), foreign);
}

#[test]
fn substitutes_through_array_and_shape() {
    let mut subst = TypeSubstitution::new();
    subst.insert(TemplateRef::new(owner(), "T"), Type::int());

    let shaped = Type::Array {
        key: Box::new(Type::String),
        value: Box::new(template_t()),
        shape: Some(ArrayShape {
            elements: vec![ShapeElement {
                key: ShapeKey::String("first".to_string()),
                ty: template_t(),
                optional: false,
            }],
            sealed: true,
        }),
    };

    let expected = Type::Array {
        key: Box::new(Type::String),
        value: Box::new(Type::int()),
        shape: Some(ArrayShape {
            elements: vec![ShapeElement {
                key: ShapeKey::String("first".to_string()),
                ty: Type::int(),
                optional: false,
            }],
            sealed: true,
        }),
    };

    assert_eq!(subst.apply(&shaped), expected);
}

#[test]
fn substitutes_through_callable() {
    let mut subst = TypeSubstitution::new();
    subst.insert(TemplateRef::new(owner(), "T"), Type::String);

    let callable = Type::Callable {
        params: vec![CallableParam::required(template_t())],
        ret: Box::new(Type::nullable(template_t())),
    };

    let result = subst.apply(&callable);
    let Type::Callable { params, ret } = result else {
        panic!("expected callable, got {result:?}");
    };
    assert_eq!(params[0].ty, Type::String);
    assert_eq!(*ret, Type::union([Type::String, Type::Null]));
}

#[test]
fn substitutes_named_object_args() {
    let mut subst = TypeSubstitution::new();
    subst.insert(TemplateRef::new(owner(), "T"), Type::Bool);

    let named = Type::named(DeclarationId::class("Box"), [template_t()]);
    assert_eq!(
        subst.apply(&named),
        Type::named(DeclarationId::class("Box"), [Type::Bool])
    );
}

#[test]
fn nested_unions_collapse_on_substitution() {
    let mut subst = TypeSubstitution::new();
    subst.insert(
        TemplateRef::new(owner(), "T"),
        Type::union([Type::int(), Type::Null]),
    );

    let result = subst.apply(&Type::Union(vec![template_t(), Type::String]));
    assert_eq!(
        result,
        Type::Union(vec![Type::int(), Type::Null, Type::String])
    );
}

#[test]
fn true_false_union_folds_to_bool() {
    let mut subst = TypeSubstitution::new();
    subst.insert(TemplateRef::new(owner(), "T"), Type::True);

    let result = subst.apply(&Type::Union(vec![template_t(), Type::False]));
    assert_eq!(result, Type::Bool);
}

#[test]
fn self_static_parent_are_never_touched() {
    let mut subst = TypeSubstitution::new();
    subst.insert(TemplateRef::new(owner(), "T"), Type::int());

    for ty in [
        Type::SelfTy { resolved: None },
        Type::ParentTy { resolved: None },
        Type::StaticTy {
            resolved: Some(owner()),
        },
    ] {
        assert_eq!(subst.apply(&ty), ty);
    }
}

#[test]
fn empty_substitution_is_identity() {
    let subst = TypeSubstitution::new();
    let ty = Type::union([template_t(), Type::Null]);
    assert_eq!(subst.apply(&ty), ty);
}
