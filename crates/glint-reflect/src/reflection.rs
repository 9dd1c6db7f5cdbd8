//! Typed views over resolved declaration data.
//!
//! A reflection object is a thin triple of identity, final data, and the
//! session it came from; every getter reads the typed map. Default values
//! are a two-state affair: unevaluated expression until first asked, then a
//! cached value.

use std::cell::OnceCell;

use glint_common::{DeclarationId, SourceLocation};
use glint_types::{TemplateDecl, Type};

use crate::change::ChangeDetectorSet;
use crate::data::{
    Attribute, ClassKind, Deprecation, TypeKind, TypeReference, TypedMap, Visibility, keys,
};
use crate::error::{ReflectError, Result};
use crate::expr::{Evaluated, EvaluationScope};
use crate::session::Reflector;

/// Any resolved declaration.
pub enum Reflection<'a> {
    Class(ClassReflection<'a>),
    Function(FunctionReflection<'a>),
    Constant(ConstantReflection<'a>),
}

impl<'a> Reflection<'a> {
    pub fn into_class(self) -> Option<ClassReflection<'a>> {
        match self {
            Reflection::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn into_function(self) -> Option<FunctionReflection<'a>> {
        match self {
            Reflection::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn into_constant(self) -> Option<ConstantReflection<'a>> {
        match self {
            Reflection::Constant(constant) => Some(constant),
            _ => None,
        }
    }
}

/// A resolved class-like declaration.
pub struct ClassReflection<'a> {
    id: DeclarationId,
    data: TypedMap,
    session: &'a Reflector,
}

impl<'a> ClassReflection<'a> {
    pub(crate) fn new(id: DeclarationId, data: TypedMap, session: &'a Reflector) -> Self {
        Self { id, data, session }
    }

    pub fn id(&self) -> &DeclarationId {
        &self.id
    }

    pub fn name(&self) -> String {
        self.id.name()
    }

    /// The raw resolved record.
    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn kind(&self) -> ClassKind {
        self.data.get(keys::ClassKind)
    }

    pub fn is_final(&self) -> bool {
        self.data.get(keys::Final)
    }

    pub fn is_abstract(&self) -> bool {
        self.data.get(keys::Abstract)
    }

    pub fn is_readonly(&self) -> bool {
        self.data.get(keys::NativeReadonly) || self.data.get(keys::AnnotatedReadonly)
    }

    pub fn file(&self) -> Option<String> {
        self.data.get(keys::File)
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.data.get(keys::Location)
    }

    pub fn deprecation(&self) -> Option<Deprecation> {
        self.data.get(keys::Deprecation)
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.data.get(keys::Attributes)
    }

    pub fn templates(&self) -> Vec<TemplateDecl> {
        self.data.get(keys::Templates)
    }

    pub fn parent(&self) -> Option<TypeReference> {
        self.data.get(keys::Parent)
    }

    /// Reflects the parent class, if any.
    pub fn parent_class(&self) -> Result<Option<ClassReflection<'a>>> {
        match self.parent() {
            Some(reference) => {
                let data = self
                    .session
                    .declaration_data(&reference.class)?
                    .ok_or_else(|| ReflectError::NotFound(reference.class.clone()))?;
                Ok(Some(ClassReflection::new(
                    reference.class,
                    data,
                    self.session,
                )))
            }
            None => Ok(None),
        }
    }

    /// Every interface this class-like implements, transitively.
    pub fn interfaces(&self) -> Vec<TypeReference> {
        self.data.get(keys::Interfaces)
    }

    pub fn implements(&self, interface: &DeclarationId) -> bool {
        self.interfaces()
            .iter()
            .any(|reference| reference.class == *interface)
    }

    /// Enum backing type, for backed enums.
    pub fn backing_type(&self) -> Option<Type> {
        self.data.get(keys::BackingType)
    }

    pub fn change_detector(&self) -> Option<ChangeDetectorSet> {
        self.data.get(keys::ChangeDetector)
    }

    pub fn constant(&self, name: &str) -> Option<ClassConstantReflection<'a>> {
        let data = self.data.get(keys::Constants).get(name).cloned()?;
        Some(ClassConstantReflection::new(
            self.id.clone(),
            name.to_string(),
            data,
            self.session,
        ))
    }

    pub fn constants(&self) -> Vec<ClassConstantReflection<'a>> {
        self.data
            .get(keys::Constants)
            .into_iter()
            .map(|(name, data)| {
                ClassConstantReflection::new(self.id.clone(), name, data, self.session)
            })
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<PropertyReflection<'a>> {
        let data = self.data.get(keys::Properties).get(name).cloned()?;
        Some(PropertyReflection::new(
            name.to_string(),
            data,
            self.member_scope(),
            self.session,
        ))
    }

    pub fn properties(&self) -> Vec<PropertyReflection<'a>> {
        let scope = self.member_scope();
        self.data
            .get(keys::Properties)
            .into_iter()
            .map(|(name, data)| PropertyReflection::new(name, data, scope.clone(), self.session))
            .collect()
    }

    pub fn method(&self, name: &str) -> Option<MethodReflection<'a>> {
        let data = self.data.get(keys::Methods).get(name).cloned()?;
        Some(MethodReflection::new(
            name.to_string(),
            data,
            self.member_scope(),
            self.session,
        ))
    }

    pub fn methods(&self) -> Vec<MethodReflection<'a>> {
        let scope = self.member_scope();
        self.data
            .get(keys::Methods)
            .into_iter()
            .map(|(name, data)| MethodReflection::new(name, data, scope.clone(), self.session))
            .collect()
    }

    fn member_scope(&self) -> EvaluationScope {
        EvaluationScope::for_class(
            self.id.clone(),
            self.parent().map(|reference| reference.class),
        )
    }
}

/// A resolved class constant or enum case.
pub struct ClassConstantReflection<'a> {
    class: DeclarationId,
    name: String,
    data: TypedMap,
    session: &'a Reflector,
}

impl<'a> ClassConstantReflection<'a> {
    fn new(class: DeclarationId, name: String, data: TypedMap, session: &'a Reflector) -> Self {
        Self {
            class,
            name,
            data,
            session,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.data.get(keys::Visibility)
    }

    pub fn is_final(&self) -> bool {
        self.data.get(keys::Final)
    }

    pub fn is_enum_case(&self) -> bool {
        self.data.get(keys::EnumCase)
    }

    pub fn declaring_class(&self) -> Option<DeclarationId> {
        self.data.get(keys::DeclaringClass)
    }

    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    /// Evaluates the constant's value (the backing value for enum cases).
    pub fn value(&self) -> Result<Evaluated> {
        self.session.class_constant_value(&self.class, &self.name)
    }
}

/// A resolved property.
pub struct PropertyReflection<'a> {
    name: String,
    data: TypedMap,
    scope: EvaluationScope,
    session: &'a Reflector,
    default: OnceCell<Option<Evaluated>>,
}

impl<'a> PropertyReflection<'a> {
    fn new(name: String, data: TypedMap, scope: EvaluationScope, session: &'a Reflector) -> Self {
        Self {
            name,
            data,
            scope,
            session,
            default: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.data.get(keys::Visibility)
    }

    pub fn is_static(&self) -> bool {
        self.data.get(keys::Static)
    }

    pub fn is_readonly(&self) -> bool {
        self.data.get(keys::NativeReadonly) || self.data.get(keys::AnnotatedReadonly)
    }

    pub fn is_promoted(&self) -> bool {
        self.data.get(keys::Promoted)
    }

    pub fn declaring_class(&self) -> Option<DeclarationId> {
        self.data.get(keys::DeclaringClass)
    }

    pub fn deprecation(&self) -> Option<Deprecation> {
        self.data.get(keys::Deprecation)
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.data.get(keys::Location)
    }

    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    pub fn has_default(&self) -> bool {
        self.data.get(keys::DefaultValue).is_some()
    }

    /// Evaluates the default value on first call and caches it.
    pub fn default_value(&self) -> Result<Option<Evaluated>> {
        if let Some(value) = self.default.get() {
            return Ok(value.clone());
        }
        let value = match self.data.get(keys::DefaultValue) {
            Some(expression) => Some(expression.evaluate(&self.scope, self.session)?),
            None => None,
        };
        let _ = self.default.set(value.clone());
        Ok(value)
    }
}

/// A resolved method.
pub struct MethodReflection<'a> {
    name: String,
    data: TypedMap,
    scope: EvaluationScope,
    session: &'a Reflector,
}

impl<'a> MethodReflection<'a> {
    fn new(name: String, data: TypedMap, scope: EvaluationScope, session: &'a Reflector) -> Self {
        Self {
            name,
            data,
            scope,
            session,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.data.get(keys::Visibility)
    }

    pub fn is_static(&self) -> bool {
        self.data.get(keys::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.data.get(keys::Abstract)
    }

    pub fn is_final(&self) -> bool {
        self.data.get(keys::Final)
    }

    pub fn declaring_class(&self) -> Option<DeclarationId> {
        self.data.get(keys::DeclaringClass)
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.data.get(keys::Location)
    }

    /// The return type.
    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterReflection<'a>> {
        let data = self.data.get(keys::Parameters).get(name).cloned()?;
        Some(ParameterReflection::new(
            name.to_string(),
            data,
            self.scope.clone(),
            self.session,
        ))
    }

    pub fn parameters(&self) -> Vec<ParameterReflection<'a>> {
        self.data
            .get(keys::Parameters)
            .into_iter()
            .map(|(name, data)| {
                ParameterReflection::new(name, data, self.scope.clone(), self.session)
            })
            .collect()
    }
}

/// A resolved parameter.
pub struct ParameterReflection<'a> {
    name: String,
    data: TypedMap,
    scope: EvaluationScope,
    session: &'a Reflector,
    default: OnceCell<Option<Evaluated>>,
}

impl<'a> ParameterReflection<'a> {
    fn new(name: String, data: TypedMap, scope: EvaluationScope, session: &'a Reflector) -> Self {
        Self {
            name,
            data,
            scope,
            session,
            default: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn index(&self) -> usize {
        self.data.get(keys::Index)
    }

    /// Present only on promoted parameters before promotion runs; the
    /// pipeline moves it to the property.
    pub fn visibility(&self) -> Option<Visibility> {
        self.data.get(keys::Visibility)
    }

    pub fn is_promoted(&self) -> bool {
        self.data.get(keys::Promoted)
    }

    pub fn is_variadic(&self) -> bool {
        self.data.get(keys::Variadic)
    }

    pub fn by_reference(&self) -> bool {
        self.data.get(keys::ByReference)
    }

    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    pub fn has_default(&self) -> bool {
        self.data.get(keys::DefaultValue).is_some()
    }

    pub fn default_value(&self) -> Result<Option<Evaluated>> {
        if let Some(value) = self.default.get() {
            return Ok(value.clone());
        }
        let value = match self.data.get(keys::DefaultValue) {
            Some(expression) => Some(expression.evaluate(&self.scope, self.session)?),
            None => None,
        };
        let _ = self.default.set(value.clone());
        Ok(value)
    }
}

/// A resolved standalone function.
pub struct FunctionReflection<'a> {
    id: DeclarationId,
    data: TypedMap,
    session: &'a Reflector,
}

impl<'a> FunctionReflection<'a> {
    pub(crate) fn new(id: DeclarationId, data: TypedMap, session: &'a Reflector) -> Self {
        Self { id, data, session }
    }

    pub fn id(&self) -> &DeclarationId {
        &self.id
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn file(&self) -> Option<String> {
        self.data.get(keys::File)
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.data.get(keys::Location)
    }

    /// The return type.
    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterReflection<'a>> {
        let data = self.data.get(keys::Parameters).get(name).cloned()?;
        Some(ParameterReflection::new(
            name.to_string(),
            data,
            EvaluationScope::default(),
            self.session,
        ))
    }

    pub fn parameters(&self) -> Vec<ParameterReflection<'a>> {
        self.data
            .get(keys::Parameters)
            .into_iter()
            .map(|(name, data)| {
                ParameterReflection::new(name, data, EvaluationScope::default(), self.session)
            })
            .collect()
    }
}

/// A resolved standalone constant.
pub struct ConstantReflection<'a> {
    id: DeclarationId,
    data: TypedMap,
    session: &'a Reflector,
}

impl<'a> ConstantReflection<'a> {
    pub(crate) fn new(id: DeclarationId, data: TypedMap, session: &'a Reflector) -> Self {
        Self { id, data, session }
    }

    pub fn id(&self) -> &DeclarationId {
        &self.id
    }

    pub fn data(&self) -> &TypedMap {
        &self.data
    }

    pub fn ty(&self, kind: TypeKind) -> Option<Type> {
        self.data.get(keys::TypeData).get(kind).cloned()
    }

    pub fn value(&self) -> Result<Evaluated> {
        self.session.constant_value(&self.id)
    }
}
