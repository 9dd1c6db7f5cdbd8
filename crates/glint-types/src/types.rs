//! The type expression model.
//!
//! [`Type`] is a closed tagged union over every type form the engine can
//! describe. Values are plain data: structural `PartialEq`/`Hash` make two
//! independently built expressions compare equal, which is what the
//! inheritance resolvers rely on when deciding whether a re-contributed type
//! is identical to the one already chosen.
//!
//! A *resolved* type contains no [`Type::Template`] leaf bound in its
//! declaring context; template leaves are eliminated by
//! [`substitute`](crate::substitute) before a type is stored as resolved.

use glint_common::DeclarationId;
use serde::{Deserialize, Serialize};

/// Member list for unions, intersections, and type-argument lists.
///
/// Heap-backed: storing `Type` inline (as `SmallVec<[Type; 2]>`) would make
/// `Type` infinitely sized, so the list provides the indirection.
pub type TypeList = Vec<Type>;

/// A type expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The bottom type.
    Never,
    Void,
    Null,
    True,
    False,
    Bool,
    /// Integer, optionally bounded on either side.
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    IntLiteral(i64),
    Float,
    String,
    StringLiteral(String),
    /// Array with key and value types and an optional fixed element shape.
    Array {
        key: Box<Type>,
        value: Box<Type>,
        shape: Option<ArrayShape>,
    },
    Iterable {
        key: Box<Type>,
        value: Box<Type>,
    },
    /// Object, optionally constrained to a property shape.
    Object { shape: Option<ObjectShape> },
    /// A named class-like with type arguments.
    Named {
        class: DeclarationId,
        args: TypeList,
    },
    /// `self`, paired with the declaring class once known.
    SelfTy { resolved: Option<DeclarationId> },
    /// `parent`, paired with the parent class once known.
    ParentTy { resolved: Option<DeclarationId> },
    /// `static`, paired with the calling-context class once known.
    StaticTy { resolved: Option<DeclarationId> },
    Callable {
        params: Vec<CallableParam>,
        ret: Box<Type>,
    },
    /// Union of two or more members.
    Union(TypeList),
    /// Intersection of two or more members.
    Intersection(TypeList),
    /// The top type.
    Mixed,
    /// A generic parameter leaf, owned by one declaration.
    Template(TemplateRef),
}

/// A generic parameter occurrence: owning declaration plus parameter name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    pub owner: DeclarationId,
    pub name: String,
}

impl TemplateRef {
    pub fn new(owner: DeclarationId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

/// One parameter of a callable type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableParam {
    pub ty: Type,
    pub optional: bool,
    pub variadic: bool,
    pub by_reference: bool,
}

impl CallableParam {
    pub fn required(ty: Type) -> Self {
        Self {
            ty,
            optional: false,
            variadic: false,
            by_reference: false,
        }
    }
}

/// Fixed element shape of an array type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayShape {
    pub elements: Vec<ShapeElement>,
    /// A sealed shape admits no elements beyond the listed ones.
    pub sealed: bool,
}

/// One element of an array shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeElement {
    pub key: ShapeKey,
    pub ty: Type,
    pub optional: bool,
}

/// Array shape keys are string or integer literals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKey {
    String(String),
    Int(i64),
}

/// Property shape of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectShape {
    pub properties: Vec<ShapeProperty>,
}

/// One property of an object shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeProperty {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

/// Declared variance of a generic parameter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

/// A generic parameter *declaration* on a class-like or function.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateDecl {
    pub name: String,
    pub variance: Variance,
    /// Upper bound; `None` means unbounded (`mixed`).
    pub constraint: Option<Type>,
    /// Argument used when the use site supplies none.
    pub default: Option<Type>,
}

impl TemplateDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
            constraint: None,
            default: None,
        }
    }

    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_constraint(mut self, constraint: Type) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_default(mut self, default: Type) -> Self {
        self.default = Some(default);
        self
    }
}

impl Type {
    /// Unbounded integer.
    pub const fn int() -> Self {
        Self::Int {
            min: None,
            max: None,
        }
    }

    /// Plain array: `array<mixed, mixed>`.
    pub fn array() -> Self {
        Self::array_of(Self::array_key(), Self::Mixed)
    }

    /// The implicit array key type, `int | string`.
    pub fn array_key() -> Self {
        Self::Union(vec![Self::int(), Self::String])
    }

    pub fn array_of(key: Type, value: Type) -> Self {
        Self::Array {
            key: Box::new(key),
            value: Box::new(value),
            shape: None,
        }
    }

    pub fn list_of(value: Type) -> Self {
        Self::array_of(Self::int(), value)
    }

    pub fn object() -> Self {
        Self::Object { shape: None }
    }

    pub fn named(class: DeclarationId, args: impl IntoIterator<Item = Type>) -> Self {
        Self::Named {
            class,
            args: args.into_iter().collect(),
        }
    }

    pub fn template(owner: DeclarationId, name: impl Into<String>) -> Self {
        Self::Template(TemplateRef::new(owner, name))
    }

    pub fn nullable(ty: Type) -> Self {
        Self::union([ty, Self::Null])
    }

    /// Union smart constructor.
    ///
    /// Flattens nested unions and applies the single built-in fold:
    /// `true | false` collapses to `bool`. No other structural
    /// deduplication happens here; that is a caller concern.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: TypeList = Vec::new();
        for member in members {
            match member {
                Self::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        if flat.iter().any(|t| *t == Self::True) && flat.iter().any(|t| *t == Self::False) {
            let mut folded: TypeList = Vec::new();
            let mut bool_emitted = false;
            for member in flat {
                match member {
                    Self::True | Self::False => {
                        if !bool_emitted {
                            folded.push(Self::Bool);
                            bool_emitted = true;
                        }
                    }
                    other => folded.push(other),
                }
            }
            flat = folded;
        }

        match flat.len() {
            0 => Self::Never,
            1 => flat.into_iter().next().expect("length checked"),
            _ => Self::Union(flat),
        }
    }

    /// Intersection smart constructor; flattens nested intersections.
    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: TypeList = Vec::new();
        for member in members {
            match member {
                Self::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::Mixed,
            1 => flat.into_iter().next().expect("length checked"),
            _ => Self::Intersection(flat),
        }
    }
}
