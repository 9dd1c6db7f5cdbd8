//! Type expression model for the glint reflection engine.
//!
//! This crate provides:
//!
//! - A closed tagged union of type expressions ([`Type`]) with structural
//!   equality, so "type-identical by construction" is a plain `==`
//! - Generic parameter declarations ([`TemplateDecl`], [`Variance`]) and
//!   template substitution ([`TypeSubstitution`])
//! - Visitor dispatch ([`TypeVisitor`]) with a mandatory fallback arm, the
//!   mechanism every downstream consumer is built on
//! - Conversion to the host language's syntactic types ([`to_native_type`])

pub mod types;
pub use types::{
    ArrayShape, CallableParam, ObjectShape, ShapeElement, ShapeKey, ShapeProperty, TemplateDecl,
    TemplateRef, Type, TypeList, Variance,
};

pub mod substitute;
pub use substitute::TypeSubstitution;

pub mod visitor;
pub use visitor::{
    TypeVisitor, contains_template, contains_type_matching, for_each_child, is_nullable,
};

pub mod display;

pub mod convert;
pub use convert::{NativeType, NonConvertibleType, to_native_type};
