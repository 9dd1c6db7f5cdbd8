//! Declaration data: the typed map and its key catalogue.
//!
//! Every declaration — class-like, function, constant — and every member —
//! constant, property, method, parameter — is represented uniformly as a
//! [`TypedMap`]. The keys below are the closed attribute set; a record only
//! physically stores the keys that were written, everything else is answered
//! by the key's fallback rule.

use glint_common::DeclarationId;
use glint_types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod typed_map;
pub use typed_map::{Key, TypedMap};

/// Name members of a class-like are stored under, in declaration order.
pub type Members = IndexMap<String, TypedMap>;

/// The constructor method name.
pub const CONSTRUCTOR: &str = "constructor";

/// Member visibility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// What kind of class-like a declaration is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

/// Which view of a member's type is requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// As written in language syntax.
    Native,
    /// As written in structured documentation.
    Annotated,
    /// After precedence (annotated refines native) and inheritance.
    Resolved,
}

/// Independently tracked native and annotated types of one member.
///
/// Neither silently overwrites the other; the resolved view applies the
/// fixed precedence where the annotated type refines the native one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub native: Option<Type>,
    pub annotated: Option<Type>,
}

impl TypeInfo {
    pub fn new(native: Option<Type>, annotated: Option<Type>) -> Self {
        Self { native, annotated }
    }

    pub fn from_native(ty: Type) -> Self {
        Self::new(Some(ty), None)
    }

    pub fn from_annotated(ty: Type) -> Self {
        Self::new(None, Some(ty))
    }

    pub fn get(&self, kind: TypeKind) -> Option<&Type> {
        match kind {
            TypeKind::Native => self.native.as_ref(),
            TypeKind::Annotated => self.annotated.as_ref(),
            TypeKind::Resolved => self.resolved(),
        }
    }

    pub fn resolved(&self) -> Option<&Type> {
        self.annotated.as_ref().or(self.native.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_none() && self.annotated.is_none()
    }
}

/// A reference to another class-like with use-site type arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    pub class: DeclarationId,
    pub args: Vec<Type>,
}

impl TypeReference {
    pub fn new(class: DeclarationId) -> Self {
        Self {
            class,
            args: Vec::new(),
        }
    }

    pub fn with_args(class: DeclarationId, args: impl IntoIterator<Item = Type>) -> Self {
        Self {
            class,
            args: args.into_iter().collect(),
        }
    }
}

/// Deprecation marker with an optional message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deprecation {
    pub message: Option<String>,
}

/// One attribute instance attached to a declaration or member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub arguments: Vec<crate::expr::Expression>,
    /// Set by the pipeline when the same attribute name occurs on the
    /// target more than once.
    pub repeated: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            repeated: false,
        }
    }
}

/// One trait-use adaptation: alias a method and/or change its visibility.
///
/// `alias: None` changes the visibility of the method itself; `alias:
/// Some(name)` contributes the method a second time under the new name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitMethodAlias {
    /// Restricts the adaptation to one used trait; `None` matches any.
    pub of: Option<DeclarationId>,
    pub method: String,
    pub alias: Option<String>,
    pub visibility: Option<Visibility>,
}

/// Excludes one trait's method from the use site entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitMethodExclusion {
    pub of: DeclarationId,
    pub method: String,
}

macro_rules! data_keys {
    ($(
        $(#[$meta:meta])*
        $name:ident : $ty:ty = $fallback:expr;
    )*) => {
        /// Discriminant for every attribute a record can carry.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum DataKey {
            $($name,)*
        }

        /// Storage representation behind [`TypedMap`]. Not part of the API:
        /// all access goes through the typed key witnesses in [`keys`].
        #[doc(hidden)]
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        pub enum Value {
            $($name($ty),)*
        }

        /// Zero-sized key witnesses for typed map access.
        pub mod keys {
            use super::typed_map::{Key, TypedMap};
            use super::{DataKey, Value};

            $(
                $(#[$meta])*
                #[derive(Copy, Clone, Debug)]
                pub struct $name;

                impl Key for $name {
                    type Value = $ty;

                    const KEY: DataKey = DataKey::$name;
                    const NAME: &'static str = stringify!($name);

                    fn pack(value: Self::Value) -> Value {
                        Value::$name(value)
                    }

                    fn unpack(value: &Value) -> Option<Self::Value> {
                        match value {
                            Value::$name(value) => Some(value.clone()),
                            _ => None,
                        }
                    }

                    fn fallback(map: &TypedMap) -> Option<Self::Value> {
                        let fallback: fn(&TypedMap) -> Option<Self::Value> = $fallback;
                        fallback(map)
                    }
                }
            )*
        }
    };
}

data_keys! {
    /// Declaring file path; absent for declarations from ad-hoc code.
    File: Option<String> = |_| Some(None);
    /// Source lines of the declaration or member.
    Location: Option<glint_common::SourceLocation> = |_| Some(None);
    /// Class, interface, trait, or enum. Mandatory on class-like records.
    ClassKind: crate::data::ClassKind = |_| None;
    /// Class or member is final.
    Final: bool = |_| Some(false);
    /// Class or method is abstract.
    Abstract: bool = |_| Some(false);
    /// Declared readonly in language syntax.
    NativeReadonly: bool = |_| Some(false);
    /// Declared readonly in documentation.
    AnnotatedReadonly: bool = |_| Some(false);
    /// Deprecation marker.
    Deprecation: Option<crate::data::Deprecation> = |_| Some(None);
    /// Attributes attached to the declaration or member.
    Attributes: Vec<crate::data::Attribute> = |_| Some(Vec::new());
    /// Own generic parameter declarations.
    Templates: Vec<glint_types::TemplateDecl> = |_| Some(Vec::new());
    /// Parent reference as written, consumed by inheritance resolution.
    UnresolvedParent: Option<crate::data::TypeReference> = |_| Some(None);
    /// Declared interface list as written, consumed by inheritance resolution.
    UnresolvedInterfaces: Vec<crate::data::TypeReference> = |_| Some(Vec::new());
    /// Used trait list as written, consumed by inheritance resolution.
    UnresolvedTraits: Vec<crate::data::TypeReference> = |_| Some(Vec::new());
    /// Trait-use alias/visibility adaptations.
    TraitMethodAliases: Vec<crate::data::TraitMethodAlias> = |_| Some(Vec::new());
    /// Trait-use method exclusions.
    TraitMethodExclusions: Vec<crate::data::TraitMethodExclusion> = |_| Some(Vec::new());
    /// Resolved parent reference.
    Parent: Option<crate::data::TypeReference> = |_| Some(None);
    /// Every interface this class-like implements, transitively, deduped;
    /// own-declared first, then the parent's, then each trait's.
    Interfaces: Vec<crate::data::TypeReference> = |_| Some(Vec::new());
    /// Class constants and enum cases by name.
    Constants: crate::data::Members = |_| Some(crate::data::Members::new());
    /// Properties by name.
    Properties: crate::data::Members = |_| Some(crate::data::Members::new());
    /// Methods by name.
    Methods: crate::data::Members = |_| Some(crate::data::Members::new());
    /// Enum backing type.
    BackingType: Option<glint_types::Type> = |_| Some(None);
    /// Aggregated change detector of the resolved record.
    ChangeDetector: Option<crate::change::ChangeDetectorSet> = |_| Some(None);
    /// Detectors gathered while resolving; aggregated and then stripped.
    UnresolvedChangeDetectors: Vec<crate::change::ChangeDetector> = |_| Some(Vec::new());
    /// Member visibility; absent on plain parameters.
    Visibility: Option<crate::data::Visibility> = |_| Some(None);
    /// The class-like that declared this member.
    DeclaringClass: Option<glint_common::DeclarationId> = |_| Some(None);
    /// Native and annotated types of the member.
    TypeData: crate::data::TypeInfo = |_| Some(crate::data::TypeInfo::default());
    /// Lazy, unevaluated default-value expression.
    DefaultValue: Option<crate::expr::Expression> = |_| Some(None);
    /// Member is static.
    Static: bool = |_| Some(false);
    /// Parameter is constructor-promoted.
    Promoted: bool = |_| Some(false);
    /// Parameter is variadic.
    Variadic: bool = |_| Some(false);
    /// Parameter is passed by reference.
    ByReference: bool = |_| Some(false);
    /// Zero-based parameter position, computed by the pipeline.
    Index: usize = |_| Some(0);
    /// Function or method parameters by name.
    Parameters: crate::data::Members = |_| Some(crate::data::Members::new());
    /// Constant is an enum case.
    EnumCase: bool = |_| Some(false);
    /// Enum case backing value expression.
    BackingValue: Option<crate::expr::Expression> = |_| Some(None);
}
