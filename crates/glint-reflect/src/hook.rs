//! The resolution pipeline.
//!
//! A hook is one pure transformation step: it consumes a declaration's
//! identity, its current data, and the session (to re-enter resolution of
//! other declarations), and returns the next data. Hooks run strictly in
//! registration order; each step's output is the next step's input. The
//! order is a contract — see [`crate::complete`] for the built-in sequence.

use std::sync::Arc;

use glint_common::DeclarationId;

use crate::data::TypedMap;
use crate::error::Result;
use crate::session::Reflector;

/// One pipeline step. Every method defaults to the identity transform, so a
/// hook only implements the declaration kinds it cares about.
pub trait Hook {
    fn process_constant(
        &self,
        id: &DeclarationId,
        data: TypedMap,
        session: &Reflector,
    ) -> Result<TypedMap> {
        let _ = (id, session);
        Ok(data)
    }

    fn process_function(
        &self,
        id: &DeclarationId,
        data: TypedMap,
        session: &Reflector,
    ) -> Result<TypedMap> {
        let _ = (id, session);
        Ok(data)
    }

    fn process_class(
        &self,
        id: &DeclarationId,
        data: TypedMap,
        session: &Reflector,
    ) -> Result<TypedMap> {
        let _ = (id, session);
        Ok(data)
    }
}

/// An ordered hook sequence.
pub struct Hooks {
    hooks: Vec<Arc<dyn Hook>>,
}

impl Hooks {
    pub fn new(hooks: Vec<Arc<dyn Hook>>) -> Self {
        Self { hooks }
    }

    /// Runs every hook in order, dispatching on the declaration kind.
    pub fn process(
        &self,
        id: &DeclarationId,
        mut data: TypedMap,
        session: &Reflector,
    ) -> Result<TypedMap> {
        for hook in &self.hooks {
            data = match id {
                DeclarationId::Constant(_) => hook.process_constant(id, data, session)?,
                DeclarationId::Function(_) | DeclarationId::AnonymousFunction { .. } => {
                    hook.process_function(id, data, session)?
                }
                DeclarationId::Class(_) | DeclarationId::AnonymousClass { .. } => {
                    hook.process_class(id, data, session)?
                }
            };
        }
        Ok(data)
    }
}
