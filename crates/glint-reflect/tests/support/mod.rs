//! Test fixtures: a programmatic source parser and universe builder.
//!
//! The engine consumes already-parsed declarations, so tests describe each
//! "file" as a builder from base data to a raw record, keyed by the resource
//! code token the locator hands out.

use std::collections::HashMap;
use std::sync::Arc;

use glint_common::{DeclarationId, DeclarationMap};
use glint_reflect::{
    ClassKind, InMemoryCache, Members, ReflectError, Reflector, Resource, ResourceLocator,
    Result, SourceParser, StaticLocator, TypeInfo, TypedMap, Visibility, keys,
};
use glint_types::Type;

type DeclBuilder = Arc<dyn Fn(&TypedMap) -> TypedMap>;

/// Routes engine tracing through `RUST_LOG` when a test needs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Default)]
pub struct FixtureParser {
    fixtures: HashMap<String, Vec<(DeclarationId, DeclBuilder)>>,
}

impl FixtureParser {
    pub fn add(
        &mut self,
        code: impl Into<String>,
        id: DeclarationId,
        builder: impl Fn(&TypedMap) -> TypedMap + 'static,
    ) {
        self.fixtures
            .entry(code.into())
            .or_default()
            .push((id, Arc::new(builder)));
    }
}

impl SourceParser for FixtureParser {
    fn parse(
        &self,
        code: &str,
        _file: Option<&str>,
        base: &TypedMap,
    ) -> Result<DeclarationMap<TypedMap>> {
        let declarations = self
            .fixtures
            .get(code)
            .ok_or_else(|| ReflectError::Parse(format!("unknown fixture `{code}`")))?;
        Ok(declarations
            .iter()
            .map(|(id, builder)| (id.clone(), builder(base)))
            .collect())
    }
}

/// Builds a session over a set of programmatic declarations.
#[derive(Default)]
pub struct Universe {
    parser: FixtureParser,
    locator: StaticLocator,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one declaration in its own pseudo-resource.
    pub fn declare(
        mut self,
        id: DeclarationId,
        builder: impl Fn(&TypedMap) -> TypedMap + 'static,
    ) -> Self {
        let code = format!("src:{}", id.cache_key());
        self.parser.add(code.as_str(), id.clone(), builder);
        self.locator = self.locator.add(id, Resource::new(code));
        self
    }

    /// Adds a class-like declaration by name.
    pub fn class(self, name: &str, builder: impl Fn(&TypedMap) -> TypedMap + 'static) -> Self {
        self.declare(DeclarationId::class(name), builder)
    }

    /// Adds one declaration backed by an existing resource (e.g. a real
    /// file); the parser fixture is keyed by the resource's code.
    pub fn declare_resource(
        mut self,
        id: DeclarationId,
        resource: Resource,
        builder: impl Fn(&TypedMap) -> TypedMap + 'static,
    ) -> Self {
        self.parser.add(resource.code.clone(), id.clone(), builder);
        self.locator = self.locator.add(id, resource);
        self
    }

    pub fn build(self) -> Reflector {
        self.build_with_cache(Arc::new(InMemoryCache::new()))
    }

    pub fn build_with_cache(self, cache: Arc<InMemoryCache>) -> Reflector {
        init_tracing();
        Reflector::build(
            vec![Box::new(self.locator) as Box<dyn ResourceLocator>],
            cache,
            Box::new(self.parser),
        )
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn class_record(base: &TypedMap) -> TypedMap {
    base.with(keys::ClassKind, ClassKind::Class)
}

pub fn interface_record(base: &TypedMap) -> TypedMap {
    base.with(keys::ClassKind, ClassKind::Interface)
}

pub fn trait_record(base: &TypedMap) -> TypedMap {
    base.with(keys::ClassKind, ClassKind::Trait)
}

pub fn enum_record(base: &TypedMap) -> TypedMap {
    base.with(keys::ClassKind, ClassKind::Enum)
}

pub fn property(visibility: Visibility, ty: Type) -> TypedMap {
    TypedMap::new()
        .with(keys::Visibility, Some(visibility))
        .with(keys::TypeData, TypeInfo::from_native(ty))
}

pub fn method(visibility: Visibility) -> TypedMap {
    TypedMap::new().with(keys::Visibility, Some(visibility))
}

pub fn method_returning(visibility: Visibility, ty: TypeInfo) -> TypedMap {
    method(visibility).with(keys::TypeData, ty)
}

pub fn parameter(ty: TypeInfo) -> TypedMap {
    TypedMap::new().with(keys::TypeData, ty)
}

pub fn class_constant(visibility: Visibility, ty: Type) -> TypedMap {
    TypedMap::new()
        .with(keys::Visibility, Some(visibility))
        .with(keys::TypeData, TypeInfo::from_native(ty))
}

pub fn members(pairs: Vec<(&str, TypedMap)>) -> Members {
    pairs
        .into_iter()
        .map(|(name, member)| (name.to_string(), member))
        .collect()
}
