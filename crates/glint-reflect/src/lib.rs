//! Metadata-resolution engine for class hierarchies.
//!
//! glint builds a structured, strongly-typed description of every declared
//! or anonymous class, interface, trait, enum, function, and constant, and
//! computes the *effective* view of that data after inheritance: own members
//! merged with members from used traits, the parent, and implemented
//! interfaces, honoring visibility rules and substituting generic type
//! arguments, incrementally and cache-safely.
//!
//! The moving parts, leaf first:
//!
//! - [`data::TypedMap`] — the per-declaration attribute bag
//! - [`change`] — change detectors for cache invalidation
//! - [`inheritance`] — the member and class merge resolvers
//! - [`hook`] / [`complete`] — the ordered resolution pipeline
//! - [`storage`] — the transactional, cache-backed resolution store
//! - [`session::Reflector`] — the facade that ties it all together

pub mod cache;
pub mod change;
pub mod complete;
pub mod data;
pub mod error;
pub mod expr;
pub mod hook;
pub mod inheritance;
pub mod locator;
pub mod parser;
pub mod recursion;
pub mod reflection;
pub mod session;
pub mod storage;

pub use cache::{CacheBackend, CacheError, InMemoryCache};
pub use change::{ChangeDetector, ChangeDetectorSet};
pub use data::{
    Attribute, ClassKind, Deprecation, Key, Members, TraitMethodAlias, TraitMethodExclusion,
    TypeInfo, TypeKind, TypeReference, TypedMap, Visibility, keys,
};
pub use error::{CyclePath, ReflectError, Result};
pub use expr::{ArrayItem, ClassNameRef, Evaluated, EvaluatedKey, EvaluationScope, Expression};
pub use hook::{Hook, Hooks};
pub use locator::{LocatorChain, Resource, ResourceLocator, StaticLocator};
pub use parser::{AnnotationParser, Annotations, SourceParser};
pub use reflection::{
    ClassConstantReflection, ClassReflection, ConstantReflection, FunctionReflection,
    MethodReflection, ParameterReflection, Reflection,
};
pub use session::Reflector;
