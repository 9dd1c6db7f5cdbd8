//! Lazy constant expressions.
//!
//! Default values, enum backing values, and attribute arguments are stored
//! unevaluated as [`Expression`] trees and only evaluated on demand, against
//! the class scope they were written in. Evaluation may re-enter the
//! reflection session (constant references), so cycles between constants are
//! detected by the session's recursion guard rather than looping forever.

use glint_common::DeclarationId;
use serde::{Deserialize, Serialize};

use crate::error::{ReflectError, Result};
use crate::session::Reflector;

/// An unevaluated constant expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ArrayItem>),
    /// `array[key]`
    ArrayFetch {
        array: Box<Expression>,
        key: Box<Expression>,
    },
    /// String concatenation.
    Concat(Box<Expression>, Box<Expression>),
    /// A global constant reference.
    ConstantRef(DeclarationId),
    /// A class constant reference, e.g. `Other::LIMIT` or `self::LIMIT`.
    ClassConstant {
        class: ClassNameRef,
        name: String,
    },
    /// A class-name expression, e.g. `Other::class` or `parent::class`.
    ClassName(ClassNameRef),
}

/// One element of an array expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArrayItem {
    Value(Expression),
    KeyValue(Expression, Expression),
    Spread(Expression),
}

/// How an expression names a class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClassNameRef {
    Named(DeclarationId),
    SelfClass,
    ParentClass,
    StaticClass,
}

/// The class context an expression is evaluated in.
#[derive(Clone, Debug, Default)]
pub struct EvaluationScope {
    /// The class the expression was written in.
    pub current: Option<DeclarationId>,
    /// The resolved parent of that class.
    pub parent: Option<DeclarationId>,
}

impl EvaluationScope {
    pub fn for_class(current: DeclarationId, parent: Option<DeclarationId>) -> Self {
        Self {
            current: Some(current),
            parent,
        }
    }

    fn resolve(&self, class: &ClassNameRef) -> Result<DeclarationId> {
        match class {
            ClassNameRef::Named(id) => Ok(id.clone()),
            // `static` binds to the reflected class: reflection has no
            // runtime receiver to late-bind against.
            ClassNameRef::SelfClass | ClassNameRef::StaticClass => {
                self.current.clone().ok_or_else(|| {
                    ReflectError::Evaluation("`self` used outside a class scope".to_string())
                })
            }
            ClassNameRef::ParentClass => self.parent.clone().ok_or_else(|| {
                ReflectError::Evaluation("`parent` used in a class with no parent".to_string())
            }),
        }
    }
}

/// A fully evaluated constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluated {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value pairs; integer keys renumber like native arrays.
    Array(Vec<(EvaluatedKey, Evaluated)>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluatedKey {
    Int(i64),
    String(String),
}

impl Expression {
    /// Evaluates the expression in `scope`, re-entering `session` for
    /// constant references.
    pub fn evaluate(&self, scope: &EvaluationScope, session: &Reflector) -> Result<Evaluated> {
        match self {
            Expression::Null => Ok(Evaluated::Null),
            Expression::Bool(value) => Ok(Evaluated::Bool(*value)),
            Expression::Int(value) => Ok(Evaluated::Int(*value)),
            Expression::Float(value) => Ok(Evaluated::Float(*value)),
            Expression::String(value) => Ok(Evaluated::String(value.clone())),
            Expression::Array(items) => evaluate_array(items, scope, session),
            Expression::ArrayFetch { array, key } => {
                let array = array.evaluate(scope, session)?;
                let key = to_key(key.evaluate(scope, session)?)?;
                let Evaluated::Array(entries) = array else {
                    return Err(ReflectError::Evaluation(
                        "cannot index into a non-array value".to_string(),
                    ));
                };
                entries
                    .into_iter()
                    .find(|(entry_key, _)| *entry_key == key)
                    .map(|(_, value)| value)
                    .ok_or_else(|| {
                        ReflectError::Evaluation(format!("undefined array key {key:?}"))
                    })
            }
            Expression::Concat(left, right) => {
                let left = stringify(left.evaluate(scope, session)?)?;
                let right = stringify(right.evaluate(scope, session)?)?;
                Ok(Evaluated::String(left + &right))
            }
            Expression::ConstantRef(id) => session.constant_value(id),
            Expression::ClassConstant { class, name } => {
                let class = scope.resolve(class)?;
                session.class_constant_value(&class, name)
            }
            Expression::ClassName(class) => {
                Ok(Evaluated::String(scope.resolve(class)?.name()))
            }
        }
    }
}

fn evaluate_array(
    items: &[ArrayItem],
    scope: &EvaluationScope,
    session: &Reflector,
) -> Result<Evaluated> {
    fn insert(
        entries: &mut Vec<(EvaluatedKey, Evaluated)>,
        next_index: &mut i64,
        key: EvaluatedKey,
        value: Evaluated,
    ) {
        if let EvaluatedKey::Int(index) = key {
            *next_index = (*next_index).max(index + 1);
        }
        if let Some(slot) = entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
            slot.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    let mut entries: Vec<(EvaluatedKey, Evaluated)> = Vec::new();
    let mut next_index: i64 = 0;

    for item in items {
        match item {
            ArrayItem::Value(value) => {
                let value = value.evaluate(scope, session)?;
                let key = EvaluatedKey::Int(next_index);
                insert(&mut entries, &mut next_index, key, value);
            }
            ArrayItem::KeyValue(key, value) => {
                let key = to_key(key.evaluate(scope, session)?)?;
                let value = value.evaluate(scope, session)?;
                insert(&mut entries, &mut next_index, key, value);
            }
            ArrayItem::Spread(inner) => {
                let Evaluated::Array(spread) = inner.evaluate(scope, session)? else {
                    return Err(ReflectError::Evaluation(
                        "cannot spread a non-array value".to_string(),
                    ));
                };
                for (key, value) in spread {
                    // Integer keys renumber on spread; string keys carry over.
                    let key = match key {
                        EvaluatedKey::Int(_) => EvaluatedKey::Int(next_index),
                        string => string,
                    };
                    insert(&mut entries, &mut next_index, key, value);
                }
            }
        }
    }

    Ok(Evaluated::Array(entries))
}

fn to_key(value: Evaluated) -> Result<EvaluatedKey> {
    match value {
        Evaluated::Int(value) => Ok(EvaluatedKey::Int(value)),
        Evaluated::String(value) => Ok(EvaluatedKey::String(value)),
        Evaluated::Bool(value) => Ok(EvaluatedKey::Int(i64::from(value))),
        other => Err(ReflectError::Evaluation(format!(
            "value {other:?} cannot be used as an array key"
        ))),
    }
}

fn stringify(value: Evaluated) -> Result<String> {
    match value {
        Evaluated::Null => Ok(String::new()),
        Evaluated::Bool(true) => Ok("1".to_string()),
        Evaluated::Bool(false) => Ok(String::new()),
        Evaluated::Int(value) => Ok(value.to_string()),
        Evaluated::Float(value) => Ok(value.to_string()),
        Evaluated::String(value) => Ok(value),
        Evaluated::Array(_) => Err(ReflectError::Evaluation(
            "cannot convert an array to a string".to_string(),
        )),
    }
}
