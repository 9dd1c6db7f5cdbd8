//! Error taxonomy of the resolution engine.
//!
//! Class-level failures abort resolution of that class and bubble to the
//! caller; nothing is retried, and partial results are never returned as if
//! complete. Type-conversion failures live in `glint-types` and are scoped
//! to the single conversion call.

use std::fmt;

use glint_common::DeclarationId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReflectError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ReflectError {
    /// The requested declaration has no resource in the locator universe.
    #[error("declaration `{0}` does not exist")]
    NotFound(DeclarationId),

    /// A parent/interface/trait link of `of` cannot itself be resolved.
    #[error("cannot resolve `{of}`: dependency `{link}` does not exist")]
    MalformedDependency {
        of: DeclarationId,
        link: DeclarationId,
    },

    /// Resolution re-entered a declaration that is already being resolved.
    #[error("resolution cycle: {0}")]
    ResolutionCycle(CyclePath),

    /// The engine or a collaborator is misconfigured (e.g. the cache backend
    /// rejected a key).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A constant expression cannot be evaluated.
    #[error("cannot evaluate expression: {0}")]
    Evaluation(String),

    /// A collaborator failed to parse a resource.
    #[error("cannot parse resource: {0}")]
    Parse(String),
}

/// The chain of declarations that closed a cycle, first repeated last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CyclePath(pub Vec<DeclarationId>);

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(&id.name())?;
        }
        Ok(())
    }
}
