//! Template substitution.
//!
//! [`TypeSubstitution`] binds generic parameters to concrete argument types
//! and rewrites expressions recursively. Unbound template leaves survive
//! untouched, which is what makes partial substitution work when only some
//! ancestors' parameters are known yet.

use glint_common::DeclarationId;
use rustc_hash::FxHashMap;

use crate::types::{ArrayShape, ObjectShape, TemplateDecl, TemplateRef, Type};

/// A binding of template parameters to argument types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    bindings: FxHashMap<TemplateRef, Type>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the bindings for one inheritance use site: pairs `templates`
    /// declared by `owner` with the `args` written at the use site. Missing
    /// arguments fall back to the parameter's declared default, else `mixed`.
    /// Surplus arguments are ignored.
    pub fn for_use_site(owner: &DeclarationId, templates: &[TemplateDecl], args: &[Type]) -> Self {
        let mut substitution = Self::new();
        for (index, template) in templates.iter().enumerate() {
            let argument = args
                .get(index)
                .cloned()
                .or_else(|| template.default.clone())
                .unwrap_or(Type::Mixed);
            substitution.insert(TemplateRef::new(owner.clone(), &template.name), argument);
        }
        substitution
    }

    pub fn insert(&mut self, template: TemplateRef, ty: Type) {
        self.bindings.insert(template, ty);
    }

    pub fn get(&self, template: &TemplateRef) -> Option<&Type> {
        self.bindings.get(template)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns `ty` with every bound template leaf replaced, recursively
    /// through all composite forms.
    ///
    /// `self`/`parent`/`static` leaves are never rewritten here: they are
    /// resolved from the calling context, not from generic bindings. Unions
    /// produced by replacement are re-normalized through [`Type::union`], so
    /// nested unions flatten and `true | false` folds to `bool`.
    pub fn apply(&self, ty: &Type) -> Type {
        if self.is_empty() {
            return ty.clone();
        }
        self.rewrite(ty)
    }

    fn rewrite(&self, ty: &Type) -> Type {
        match ty {
            Type::Template(template) => match self.bindings.get(template) {
                Some(replacement) => replacement.clone(),
                None => ty.clone(),
            },
            Type::Array { key, value, shape } => Type::Array {
                key: Box::new(self.rewrite(key)),
                value: Box::new(self.rewrite(value)),
                shape: shape.as_ref().map(|shape| self.rewrite_array_shape(shape)),
            },
            Type::Iterable { key, value } => Type::Iterable {
                key: Box::new(self.rewrite(key)),
                value: Box::new(self.rewrite(value)),
            },
            Type::Object { shape } => Type::Object {
                shape: shape.as_ref().map(|shape| self.rewrite_object_shape(shape)),
            },
            Type::Named { class, args } => Type::Named {
                class: class.clone(),
                args: args.iter().map(|arg| self.rewrite(arg)).collect(),
            },
            Type::Callable { params, ret } => Type::Callable {
                params: params
                    .iter()
                    .map(|param| {
                        let mut param = param.clone();
                        param.ty = self.rewrite(&param.ty);
                        param
                    })
                    .collect(),
                ret: Box::new(self.rewrite(ret)),
            },
            Type::Union(members) => Type::union(members.iter().map(|member| self.rewrite(member))),
            Type::Intersection(members) => {
                Type::intersection(members.iter().map(|member| self.rewrite(member)))
            }
            // Leaves, including self/parent/static, pass through unchanged.
            _ => ty.clone(),
        }
    }

    fn rewrite_array_shape(&self, shape: &ArrayShape) -> ArrayShape {
        ArrayShape {
            elements: shape
                .elements
                .iter()
                .map(|element| {
                    let mut element = element.clone();
                    element.ty = self.rewrite(&element.ty);
                    element
                })
                .collect(),
            sealed: shape.sealed,
        }
    }

    fn rewrite_object_shape(&self, shape: &ObjectShape) -> ObjectShape {
        ObjectShape {
            properties: shape
                .properties
                .iter()
                .map(|property| {
                    let mut property = property.clone();
                    property.ty = self.rewrite(&property.ty);
                    property
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/substitute_tests.rs"]
mod tests;
