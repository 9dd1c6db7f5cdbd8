//! Inheritance resolution.
//!
//! Three layers, innermost first: [`TypeInheritanceResolver`] merges one
//! member's types, [`BasicInheritanceResolver`] merges one whole member
//! record, and [`ClassInheritanceResolver`] orchestrates all member
//! categories for one class against its traits, parent, and interfaces.
//! [`ResolveInheritance`] is the pipeline step that runs the orchestrator.

pub mod basic;
pub mod class;
pub mod method;
pub mod type_resolver;

pub use basic::BasicInheritanceResolver;
pub use class::ClassInheritanceResolver;
pub use method::MethodInheritanceResolver;
pub use type_resolver::TypeInheritanceResolver;

use glint_common::DeclarationId;

use crate::data::TypedMap;
use crate::error::Result;
use crate::hook::Hook;
use crate::session::Reflector;

/// The inheritance step of the pipeline. Functions and constants have no
/// hierarchy and pass through unchanged.
pub struct ResolveInheritance;

impl Hook for ResolveInheritance {
    fn process_class(
        &self,
        id: &DeclarationId,
        data: TypedMap,
        session: &Reflector,
    ) -> Result<TypedMap> {
        ClassInheritanceResolver::resolve(session, id, data)
    }
}
