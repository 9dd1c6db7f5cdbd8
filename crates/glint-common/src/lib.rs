//! Common types for the glint reflection engine.
//!
//! This crate provides the foundational types used across all glint crates:
//! - Declaration identity (`DeclarationId`, `DeclarationMap`)
//! - Source spans and locations (`ByteSpan`, `SourceLocation`)

// Declaration identity - stable keys for declared entities
pub mod id;
pub use id::{DeclarationId, DeclarationMap};

// Span - source location tracking
pub mod span;
pub use span::{ByteSpan, SourceLocation};
