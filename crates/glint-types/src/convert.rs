//! Conversion of resolved types to the host language's syntactic form.
//!
//! Native type syntax is much poorer than the annotated type model: no
//! bounds, no literals, no shapes, no generic arguments. Expressions that
//! cannot be narrowed to a syntactic form fail with [`NonConvertibleType`];
//! the failure is scoped to the single conversion call and never aborts the
//! resolution that produced the type.

use std::fmt;

use glint_common::DeclarationId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Type, TypeList};
use crate::visitor::TypeVisitor;

/// A type as the host language can spell it in source code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeType {
    /// A built-in or class name.
    Named(String),
    Union(Vec<NativeType>),
    Intersection(Vec<NativeType>),
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Named(name) => f.write_str(name),
            NativeType::Union(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            NativeType::Intersection(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str("&")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

/// The requested representation does not exist for this type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("type `{0}` has no native representation")]
pub struct NonConvertibleType(pub Type);

/// Converts a resolved type to its native syntactic form.
pub fn to_native_type(ty: &Type) -> Result<NativeType, NonConvertibleType> {
    ty.accept(&mut NativeConverter)
}

struct NativeConverter;

impl NativeConverter {
    fn named(&self, name: &str) -> Result<NativeType, NonConvertibleType> {
        Ok(NativeType::Named(name.to_string()))
    }
}

impl TypeVisitor for NativeConverter {
    type Output = Result<NativeType, NonConvertibleType>;

    fn fallback(&mut self, ty: &Type) -> Self::Output {
        Err(NonConvertibleType(ty.clone()))
    }

    fn visit_never(&mut self, _ty: &Type) -> Self::Output {
        self.named("never")
    }

    fn visit_void(&mut self, _ty: &Type) -> Self::Output {
        self.named("void")
    }

    fn visit_null(&mut self, _ty: &Type) -> Self::Output {
        self.named("null")
    }

    fn visit_true(&mut self, _ty: &Type) -> Self::Output {
        self.named("true")
    }

    fn visit_false(&mut self, _ty: &Type) -> Self::Output {
        self.named("false")
    }

    fn visit_bool(&mut self, _ty: &Type) -> Self::Output {
        self.named("bool")
    }

    fn visit_int(&mut self, ty: &Type, min: Option<i64>, max: Option<i64>) -> Self::Output {
        // Bounded integers have no syntactic equivalent.
        if min.is_some() || max.is_some() {
            return Err(NonConvertibleType(ty.clone()));
        }
        self.named("int")
    }

    fn visit_float(&mut self, _ty: &Type) -> Self::Output {
        self.named("float")
    }

    fn visit_string(&mut self, _ty: &Type) -> Self::Output {
        self.named("string")
    }

    fn visit_array(
        &mut self,
        _ty: &Type,
        _key: &Type,
        _value: &Type,
        _shape: Option<&crate::types::ArrayShape>,
    ) -> Self::Output {
        // Key/value types and shapes are annotation-level detail.
        self.named("array")
    }

    fn visit_iterable(&mut self, _ty: &Type, _key: &Type, _value: &Type) -> Self::Output {
        self.named("iterable")
    }

    fn visit_object(
        &mut self,
        ty: &Type,
        shape: Option<&crate::types::ObjectShape>,
    ) -> Self::Output {
        if shape.is_some() {
            return Err(NonConvertibleType(ty.clone()));
        }
        self.named("object")
    }

    fn visit_named(&mut self, _ty: &Type, class: &DeclarationId, _args: &TypeList) -> Self::Output {
        self.named(&class.name())
    }

    fn visit_self(&mut self, _ty: &Type, _resolved: Option<&DeclarationId>) -> Self::Output {
        self.named("self")
    }

    fn visit_parent(&mut self, _ty: &Type, _resolved: Option<&DeclarationId>) -> Self::Output {
        self.named("parent")
    }

    fn visit_static(&mut self, _ty: &Type, _resolved: Option<&DeclarationId>) -> Self::Output {
        self.named("static")
    }

    fn visit_callable(
        &mut self,
        _ty: &Type,
        _params: &[crate::types::CallableParam],
        _ret: &Type,
    ) -> Self::Output {
        self.named("callable")
    }

    fn visit_union(&mut self, _ty: &Type, members: &TypeList) -> Self::Output {
        let members = members
            .iter()
            .map(|member| member.accept(self))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NativeType::Union(members))
    }

    fn visit_intersection(&mut self, _ty: &Type, members: &TypeList) -> Self::Output {
        let members = members
            .iter()
            .map(|member| member.accept(self))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NativeType::Intersection(members))
    }

    fn visit_mixed(&mut self, _ty: &Type) -> Self::Output {
        self.named("mixed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_int_converts() {
        assert_eq!(
            to_native_type(&Type::int()),
            Ok(NativeType::Named("int".to_string()))
        );
    }

    #[test]
    fn bounded_int_is_not_convertible() {
        let bounded = Type::Int {
            min: Some(0),
            max: None,
        };
        assert_eq!(
            to_native_type(&bounded),
            Err(NonConvertibleType(bounded.clone()))
        );
    }

    #[test]
    fn union_converts_memberwise() {
        let ty = Type::union([Type::String, Type::Null]);
        assert_eq!(
            to_native_type(&ty).unwrap().to_string(),
            "string|null"
        );
    }

    #[test]
    fn literal_falls_back_to_error() {
        let ty = Type::StringLiteral("on".to_string());
        assert!(to_native_type(&ty).is_err());
    }

    #[test]
    fn template_leaf_is_not_convertible() {
        let ty = Type::template(glint_common::DeclarationId::class("Box"), "T");
        assert!(to_native_type(&ty).is_err());
    }
}
