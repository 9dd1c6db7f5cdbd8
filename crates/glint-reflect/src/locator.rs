//! Resource location.
//!
//! Where a declaration's source lives — filesystem, package layout, stub
//! sets — is a pluggable concern. The engine only asks an ordered list of
//! locators for a [`Resource`]; the list is explicit caller configuration,
//! never probed from the environment.

use std::sync::Arc;

use glint_common::DeclarationId;

use crate::change::ChangeDetector;
use crate::data::TypedMap;
use crate::data::keys;
use crate::hook::Hook;

/// Raw source for one or more declarations, plus resolution context.
#[derive(Clone)]
pub struct Resource {
    pub code: String,
    pub file: Option<String>,
    /// Starting data every declaration in this resource is built from.
    pub base_data: TypedMap,
    /// Extra pipeline steps attached by the locator.
    pub hooks: Vec<Arc<dyn Hook>>,
}

impl Resource {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            file: None,
            base_data: TypedMap::new(),
            hooks: Vec::new(),
        }
    }

    /// Associates the resource with a file: records the path in the base
    /// data and fingerprints the contents for cache invalidation.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        let file = file.into();
        let detector = ChangeDetector::for_file(&file)
            .unwrap_or_else(|_| ChangeDetector::for_contents(&self.code));
        self.base_data = self
            .base_data
            .with(keys::File, Some(file.clone()))
            .with(keys::UnresolvedChangeDetectors, vec![detector]);
        self.file = Some(file);
        self
    }

    pub fn with_base_data(mut self, base_data: TypedMap) -> Self {
        self.base_data = base_data;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

/// Locates the resource a declaration was written in.
pub trait ResourceLocator {
    fn locate(&self, id: &DeclarationId) -> Option<Resource>;
}

/// Asks each locator in order; first hit wins.
pub struct LocatorChain {
    locators: Vec<Box<dyn ResourceLocator>>,
}

impl LocatorChain {
    pub fn new(locators: Vec<Box<dyn ResourceLocator>>) -> Self {
        Self { locators }
    }
}

impl ResourceLocator for LocatorChain {
    fn locate(&self, id: &DeclarationId) -> Option<Resource> {
        self.locators.iter().find_map(|locator| locator.locate(id))
    }
}

/// A fixed id-to-resource table. The building block for tests and for
/// callers that assemble their universe up front.
#[derive(Default)]
pub struct StaticLocator {
    resources: Vec<(DeclarationId, Resource)>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, id: DeclarationId, resource: Resource) -> Self {
        self.resources.push((id, resource));
        self
    }
}

impl ResourceLocator for StaticLocator {
    fn locate(&self, id: &DeclarationId) -> Option<Resource> {
        self.resources
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, resource)| resource.clone())
    }
}
