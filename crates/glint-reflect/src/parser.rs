//! Collaborator interfaces for parsing.
//!
//! The engine consumes already-parsed declarations: a [`SourceParser`] turns
//! source text into raw per-declaration data with all names fully qualified,
//! and an [`AnnotationParser`] turns documentation strings into structured
//! type information. Neither is implemented here.

use glint_common::{DeclarationId, DeclarationMap};
use glint_types::{TemplateDecl, Type};

use crate::data::{TypeReference, TypedMap};
use crate::error::Result;

/// Parses source text into raw declaration records.
pub trait SourceParser {
    /// Returns every top-level declaration found in `code`, keyed by
    /// identity, each record starting from a copy of `base`.
    ///
    /// All names in the returned data must already be fully qualified.
    fn parse(
        &self,
        code: &str,
        file: Option<&str>,
        base: &TypedMap,
    ) -> Result<DeclarationMap<TypedMap>>;
}

/// Structured annotation data for one declaration or member.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    /// Annotated type of the member.
    pub ty: Option<Type>,
    /// Generic parameter declarations with variance and bounds.
    pub templates: Vec<TemplateDecl>,
    /// Annotated `extends` references with type arguments.
    pub extends: Vec<TypeReference>,
    /// Annotated `implements` references with type arguments.
    pub implements: Vec<TypeReference>,
}

/// Parses one raw documentation string.
pub trait AnnotationParser {
    fn parse(&self, doc: &str) -> Annotations;
}
