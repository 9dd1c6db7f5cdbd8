//! The reflection session.
//!
//! [`Reflector`] wires the collaborators together: an explicit, ordered
//! locator list, a source parser, and a cache backend behind the resolution
//! store. Execution is single-threaded with cooperative recursion —
//! resolving one declaration directly resolves its dependencies — so the
//! session is deliberately not shared across threads.

use std::cell::RefCell;
use std::sync::Arc;

use glint_common::{DeclarationId, DeclarationMap};
use tracing::debug;

use crate::cache::CacheBackend;
use crate::complete::{
    CleanUp, CopyPromotedParameterToProperty, EnsureReadonlyClassPropertiesAreReadonly,
    ResolveAttributesRepeated, ResolveChangeDetector, ResolveParametersIndex,
    SetInterfaceMethodAbstract,
};
use crate::data::{TypedMap, keys};
use crate::error::{CyclePath, ReflectError, Result};
use crate::expr::{Evaluated, EvaluationScope};
use crate::hook::{Hook, Hooks};
use crate::inheritance::ResolveInheritance;
use crate::locator::{LocatorChain, ResourceLocator};
use crate::parser::SourceParser;
use crate::recursion::RecursionGuard;
use crate::reflection::{ClassReflection, ConstantReflection, FunctionReflection, Reflection};
use crate::storage::DataStorage;

/// Guard key for constant evaluation: declaration plus member name.
type EvaluationKey = (DeclarationId, Option<String>);

pub struct Reflector {
    locator: LocatorChain,
    parser: Box<dyn SourceParser>,
    storage: DataStorage,
    evaluation_guard: RefCell<RecursionGuard<EvaluationKey>>,
}

impl Reflector {
    /// Builds a session from an explicit locator list, a cache backend, and
    /// a source parser. Locators are consulted in the given order.
    pub fn build(
        locators: Vec<Box<dyn ResourceLocator>>,
        cache: Arc<dyn CacheBackend>,
        parser: Box<dyn SourceParser>,
    ) -> Self {
        Self {
            locator: LocatorChain::new(locators),
            parser,
            storage: DataStorage::new(cache),
            evaluation_guard: RefCell::new(RecursionGuard::new()),
        }
    }

    /// Reflects a class-like declaration by name. Accepts the
    /// `Name@file:line` form for anonymous classes.
    pub fn reflect_class(&self, name: &str) -> Result<ClassReflection<'_>> {
        let id = DeclarationId::class(name);
        let data = self
            .declaration_data(&id)?
            .ok_or_else(|| ReflectError::NotFound(id.clone()))?;
        Ok(ClassReflection::new(id, data, self))
    }

    /// Reflects any declaration by identity.
    pub fn reflect(&self, id: DeclarationId) -> Result<Reflection<'_>> {
        let data = self
            .declaration_data(&id)?
            .ok_or_else(|| ReflectError::NotFound(id.clone()))?;
        Ok(self.reflection_for(id, data))
    }

    /// Parses `code`, resolves every top-level declaration in it against
    /// `base_data`, and rolls all staged cache writes back: the persistent
    /// cache is left untouched.
    pub fn reflect_code(
        &self,
        code: &str,
        base_data: TypedMap,
    ) -> Result<DeclarationMap<Reflection<'_>>> {
        debug!("reflect ad-hoc code");
        let declarations = self.parser.parse(code, None, &base_data)?;
        let ids: Vec<DeclarationId> = declarations.keys().cloned().collect();
        self.stage_declarations(declarations, &[], false);

        let mut reflections = DeclarationMap::new();
        let mut failure = None;
        for id in ids {
            match self.storage.get(&id, self) {
                Ok(Some(data)) => {
                    reflections.insert(id.clone(), self.reflection_for(id, data));
                }
                Ok(None) => {}
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        self.storage.rollback();
        match failure {
            Some(error) => Err(error),
            None => Ok(reflections),
        }
    }

    /// Resolved data for `id`: staged or cached, else located, parsed,
    /// staged, resolved, and committed.
    pub(crate) fn declaration_data(&self, id: &DeclarationId) -> Result<Option<TypedMap>> {
        if let Some(data) = self.storage.get(id, self)? {
            return Ok(Some(data));
        }

        let Some(resource) = self.locator.locate(id) else {
            return Ok(None);
        };

        let declarations =
            self.parser
                .parse(&resource.code, resource.file.as_deref(), &resource.base_data)?;
        self.stage_declarations(declarations, &resource.hooks, true);

        let data = self.storage.get(id, self)?;
        self.storage.commit(self)?;
        Ok(data)
    }

    fn reflection_for(&self, id: DeclarationId, data: TypedMap) -> Reflection<'_> {
        match &id {
            DeclarationId::Constant(_) => Reflection::Constant(ConstantReflection::new(
                id.clone(),
                data,
                self,
            )),
            DeclarationId::Function(_) | DeclarationId::AnonymousFunction { .. } => {
                Reflection::Function(FunctionReflection::new(id.clone(), data, self))
            }
            DeclarationId::Class(_) | DeclarationId::AnonymousClass { .. } => {
                Reflection::Class(ClassReflection::new(id.clone(), data, self))
            }
        }
    }

    fn stage_declarations(
        &self,
        declarations: DeclarationMap<TypedMap>,
        resource_hooks: &[Arc<dyn Hook>],
        persist: bool,
    ) {
        let hooks = Arc::new(self.build_hooks(resource_hooks));
        for (id, data) in declarations {
            let hooks = Arc::clone(&hooks);
            let staged_id = id.clone();
            self.storage.stage(
                id,
                Box::new(move |session| hooks.process(&staged_id, data, session)),
                persist,
            );
        }
    }

    /// The pipeline, in its contractual order: resource hooks, completion
    /// steps, inheritance, change-detector aggregation, cleanup.
    fn build_hooks(&self, resource_hooks: &[Arc<dyn Hook>]) -> Hooks {
        let mut hooks: Vec<Arc<dyn Hook>> = resource_hooks.to_vec();
        hooks.push(Arc::new(CopyPromotedParameterToProperty));
        hooks.push(Arc::new(SetInterfaceMethodAbstract));
        hooks.push(Arc::new(EnsureReadonlyClassPropertiesAreReadonly));
        hooks.push(Arc::new(ResolveAttributesRepeated));
        hooks.push(Arc::new(ResolveParametersIndex));
        hooks.push(Arc::new(ResolveInheritance));
        hooks.push(Arc::new(ResolveChangeDetector));
        hooks.push(Arc::new(CleanUp));
        Hooks::new(hooks)
    }

    /// Evaluates a global constant's value.
    pub(crate) fn constant_value(&self, id: &DeclarationId) -> Result<Evaluated> {
        let key = (id.clone(), None);
        self.enter_evaluation(key.clone())?;
        let result = (|| {
            let data = self
                .declaration_data(id)?
                .ok_or_else(|| ReflectError::NotFound(id.clone()))?;
            let expression = data.get(keys::DefaultValue).ok_or_else(|| {
                ReflectError::Evaluation(format!("constant `{id}` has no value"))
            })?;
            expression.evaluate(&EvaluationScope::default(), self)
        })();
        self.leave_evaluation(&key);
        result
    }

    /// Evaluates a class constant's value (the backing value for enum
    /// cases). `self` in the expression binds to the declaring class.
    pub(crate) fn class_constant_value(
        &self,
        class: &DeclarationId,
        name: &str,
    ) -> Result<Evaluated> {
        let key = (class.clone(), Some(name.to_string()));
        self.enter_evaluation(key.clone())?;
        let result = (|| {
            let data = self
                .declaration_data(class)?
                .ok_or_else(|| ReflectError::NotFound(class.clone()))?;
            let constant = data.get(keys::Constants).get(name).cloned().ok_or_else(|| {
                ReflectError::Evaluation(format!("undefined constant `{class}::{name}`"))
            })?;
            let expression = constant
                .get(keys::DefaultValue)
                .or_else(|| constant.get(keys::BackingValue))
                .ok_or_else(|| {
                    ReflectError::Evaluation(format!("constant `{class}::{name}` has no value"))
                })?;

            let current = constant
                .get(keys::DeclaringClass)
                .unwrap_or_else(|| class.clone());
            let parent = data.get(keys::Parent).map(|reference| reference.class);
            expression.evaluate(&EvaluationScope::for_class(current, parent), self)
        })();
        self.leave_evaluation(&key);
        result
    }

    fn enter_evaluation(&self, key: EvaluationKey) -> Result<()> {
        self.evaluation_guard
            .borrow_mut()
            .enter(key)
            .map_err(|path| {
                ReflectError::ResolutionCycle(CyclePath(
                    path.into_iter().map(|(id, _)| id).collect(),
                ))
            })
    }

    fn leave_evaluation(&self, key: &EvaluationKey) {
        self.evaluation_guard.borrow_mut().leave(key);
    }
}
