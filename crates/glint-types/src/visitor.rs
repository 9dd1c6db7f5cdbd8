//! Visitor dispatch over the type model.
//!
//! All downstream consumers — native conversion, nullability checks, display —
//! are implemented as visitors so the type model itself never grows
//! consumer-specific methods. Every visit method defaults to [`fallback`],
//! which keeps implementations compiling when the tag set is extended.
//!
//! [`fallback`]: TypeVisitor::fallback

use glint_common::DeclarationId;

use crate::types::{ArrayShape, CallableParam, ObjectShape, TemplateRef, Type, TypeList};

/// One handler per type tag, each defaulting to [`TypeVisitor::fallback`].
pub trait TypeVisitor {
    type Output;

    /// Mandatory default arm; called by every unoverridden handler.
    fn fallback(&mut self, ty: &Type) -> Self::Output;

    fn visit_never(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_void(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_null(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_true(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_false(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_bool(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_int(&mut self, ty: &Type, min: Option<i64>, max: Option<i64>) -> Self::Output {
        let _ = (min, max);
        self.fallback(ty)
    }

    fn visit_int_literal(&mut self, ty: &Type, value: i64) -> Self::Output {
        let _ = value;
        self.fallback(ty)
    }

    fn visit_float(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_string(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_string_literal(&mut self, ty: &Type, value: &str) -> Self::Output {
        let _ = value;
        self.fallback(ty)
    }

    fn visit_array(
        &mut self,
        ty: &Type,
        key: &Type,
        value: &Type,
        shape: Option<&ArrayShape>,
    ) -> Self::Output {
        let _ = (key, value, shape);
        self.fallback(ty)
    }

    fn visit_iterable(&mut self, ty: &Type, key: &Type, value: &Type) -> Self::Output {
        let _ = (key, value);
        self.fallback(ty)
    }

    fn visit_object(&mut self, ty: &Type, shape: Option<&ObjectShape>) -> Self::Output {
        let _ = shape;
        self.fallback(ty)
    }

    fn visit_named(&mut self, ty: &Type, class: &DeclarationId, args: &TypeList) -> Self::Output {
        let _ = (class, args);
        self.fallback(ty)
    }

    fn visit_self(&mut self, ty: &Type, resolved: Option<&DeclarationId>) -> Self::Output {
        let _ = resolved;
        self.fallback(ty)
    }

    fn visit_parent(&mut self, ty: &Type, resolved: Option<&DeclarationId>) -> Self::Output {
        let _ = resolved;
        self.fallback(ty)
    }

    fn visit_static(&mut self, ty: &Type, resolved: Option<&DeclarationId>) -> Self::Output {
        let _ = resolved;
        self.fallback(ty)
    }

    fn visit_callable(&mut self, ty: &Type, params: &[CallableParam], ret: &Type) -> Self::Output {
        let _ = (params, ret);
        self.fallback(ty)
    }

    fn visit_union(&mut self, ty: &Type, members: &TypeList) -> Self::Output {
        let _ = members;
        self.fallback(ty)
    }

    fn visit_intersection(&mut self, ty: &Type, members: &TypeList) -> Self::Output {
        let _ = members;
        self.fallback(ty)
    }

    fn visit_mixed(&mut self, ty: &Type) -> Self::Output {
        self.fallback(ty)
    }

    fn visit_template(&mut self, ty: &Type, template: &TemplateRef) -> Self::Output {
        let _ = template;
        self.fallback(ty)
    }
}

impl Type {
    /// Dispatches to the visitor handler matching this type's tag.
    pub fn accept<V: TypeVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Type::Never => visitor.visit_never(self),
            Type::Void => visitor.visit_void(self),
            Type::Null => visitor.visit_null(self),
            Type::True => visitor.visit_true(self),
            Type::False => visitor.visit_false(self),
            Type::Bool => visitor.visit_bool(self),
            Type::Int { min, max } => visitor.visit_int(self, *min, *max),
            Type::IntLiteral(value) => visitor.visit_int_literal(self, *value),
            Type::Float => visitor.visit_float(self),
            Type::String => visitor.visit_string(self),
            Type::StringLiteral(value) => visitor.visit_string_literal(self, value),
            Type::Array { key, value, shape } => {
                visitor.visit_array(self, key, value, shape.as_ref())
            }
            Type::Iterable { key, value } => visitor.visit_iterable(self, key, value),
            Type::Object { shape } => visitor.visit_object(self, shape.as_ref()),
            Type::Named { class, args } => visitor.visit_named(self, class, args),
            Type::SelfTy { resolved } => visitor.visit_self(self, resolved.as_ref()),
            Type::ParentTy { resolved } => visitor.visit_parent(self, resolved.as_ref()),
            Type::StaticTy { resolved } => visitor.visit_static(self, resolved.as_ref()),
            Type::Callable { params, ret } => visitor.visit_callable(self, params, ret),
            Type::Union(members) => visitor.visit_union(self, members),
            Type::Intersection(members) => visitor.visit_intersection(self, members),
            Type::Mixed => visitor.visit_mixed(self),
            Type::Template(template) => visitor.visit_template(self, template),
        }
    }
}

/// Calls `f` for every direct child type expression of `ty`.
pub fn for_each_child(ty: &Type, f: &mut impl FnMut(&Type)) {
    match ty {
        Type::Array { key, value, shape } => {
            f(key);
            f(value);
            if let Some(shape) = shape {
                for element in &shape.elements {
                    f(&element.ty);
                }
            }
        }
        Type::Iterable { key, value } => {
            f(key);
            f(value);
        }
        Type::Object { shape: Some(shape) } => {
            for property in &shape.properties {
                f(&property.ty);
            }
        }
        Type::Named { args, .. } => {
            for arg in args {
                f(arg);
            }
        }
        Type::Callable { params, ret } => {
            for param in params {
                f(&param.ty);
            }
            f(ret);
        }
        Type::Union(members) | Type::Intersection(members) => {
            for member in members {
                f(member);
            }
        }
        _ => {}
    }
}

/// True if any leaf of `ty` (including `ty` itself) satisfies `predicate`.
pub fn contains_type_matching(ty: &Type, predicate: &mut impl FnMut(&Type) -> bool) -> bool {
    if predicate(ty) {
        return true;
    }
    let mut found = false;
    for_each_child(ty, &mut |child| {
        if !found {
            found = contains_type_matching(child, predicate);
        }
    });
    found
}

/// True if the expression still carries an unsubstituted template leaf.
pub fn contains_template(ty: &Type) -> bool {
    contains_type_matching(ty, &mut |t| matches!(t, Type::Template(_)))
}

/// True if `null` is admitted: `null` itself, `mixed`, or a union with a
/// nullable member.
pub fn is_nullable(ty: &Type) -> bool {
    match ty {
        Type::Null | Type::Mixed => true,
        Type::Union(members) => members.iter().any(is_nullable),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_template_sees_nested_leaves() {
        let owner = DeclarationId::class("Box");
        let ty = Type::array_of(Type::String, Type::template(owner, "T"));
        assert!(contains_template(&ty));
        assert!(!contains_template(&Type::array()));
    }

    #[test]
    fn nullability() {
        assert!(is_nullable(&Type::union([Type::int(), Type::Null])));
        assert!(is_nullable(&Type::Mixed));
        assert!(!is_nullable(&Type::int()));
    }

    #[test]
    fn visitor_falls_back_for_unhandled_tags() {
        struct CountsTemplates(u32);

        impl TypeVisitor for CountsTemplates {
            type Output = ();

            fn fallback(&mut self, _ty: &Type) {}

            fn visit_template(&mut self, _ty: &Type, _template: &TemplateRef) {
                self.0 += 1;
            }
        }

        let mut visitor = CountsTemplates(0);
        Type::template(DeclarationId::class("Box"), "T").accept(&mut visitor);
        Type::Mixed.accept(&mut visitor);
        assert_eq!(visitor.0, 1);
    }
}
