//! Human-readable rendering of type expressions.

use std::fmt;

use crate::types::{ShapeKey, Type};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Never => f.write_str("never"),
            Type::Void => f.write_str("void"),
            Type::Null => f.write_str("null"),
            Type::True => f.write_str("true"),
            Type::False => f.write_str("false"),
            Type::Bool => f.write_str("bool"),
            Type::Int {
                min: None,
                max: None,
            } => f.write_str("int"),
            Type::Int { min, max } => {
                let min = min.map_or_else(|| "min".to_string(), |v| v.to_string());
                let max = max.map_or_else(|| "max".to_string(), |v| v.to_string());
                write!(f, "int<{min}, {max}>")
            }
            Type::IntLiteral(value) => write!(f, "{value}"),
            Type::Float => f.write_str("float"),
            Type::String => f.write_str("string"),
            Type::StringLiteral(value) => write!(f, "'{value}'"),
            Type::Array { key, value, shape } => {
                if let Some(shape) = shape {
                    f.write_str("array{")?;
                    for (index, element) in shape.elements.iter().enumerate() {
                        if index > 0 {
                            f.write_str(", ")?;
                        }
                        match &element.key {
                            ShapeKey::String(name) => f.write_str(name)?,
                            ShapeKey::Int(index) => write!(f, "{index}")?,
                        }
                        if element.optional {
                            f.write_str("?")?;
                        }
                        write!(f, ": {}", element.ty)?;
                    }
                    if !shape.sealed {
                        if !shape.elements.is_empty() {
                            f.write_str(", ")?;
                        }
                        f.write_str("...")?;
                    }
                    f.write_str("}")
                } else {
                    write!(f, "array<{key}, {value}>")
                }
            }
            Type::Iterable { key, value } => write!(f, "iterable<{key}, {value}>"),
            Type::Object { shape: None } => f.write_str("object"),
            Type::Object { shape: Some(shape) } => {
                f.write_str("object{")?;
                for (index, property) in shape.properties.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&property.name)?;
                    if property.optional {
                        f.write_str("?")?;
                    }
                    write!(f, ": {}", property.ty)?;
                }
                f.write_str("}")
            }
            Type::Named { class, args } => {
                f.write_str(&class.name())?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (index, arg) in args.iter().enumerate() {
                        if index > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::SelfTy { .. } => f.write_str("self"),
            Type::ParentTy { .. } => f.write_str("parent"),
            Type::StaticTy { .. } => f.write_str("static"),
            Type::Callable { params, ret } => {
                f.write_str("callable(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    if param.variadic {
                        f.write_str("...")?;
                    }
                    write!(f, "{}", param.ty)?;
                    if param.optional {
                        f.write_str("=")?;
                    }
                }
                write!(f, "): {ret}")
            }
            Type::Union(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str("|")?;
                    }
                    if matches!(member, Type::Intersection(_)) {
                        write!(f, "({member})")?;
                    } else {
                        write!(f, "{member}")?;
                    }
                }
                Ok(())
            }
            Type::Intersection(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str("&")?;
                    }
                    if matches!(member, Type::Union(_)) {
                        write!(f, "({member})")?;
                    } else {
                        write!(f, "{member}")?;
                    }
                }
                Ok(())
            }
            Type::Mixed => f.write_str("mixed"),
            Type::Template(template) => write!(f, "{}:{}", template.owner.name(), template.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Type;
    use glint_common::DeclarationId;

    #[test]
    fn renders_composites() {
        let ty = Type::union([
            Type::named(DeclarationId::class("Box"), [Type::int()]),
            Type::Null,
        ]);
        assert_eq!(ty.to_string(), "Box<int>|null");
    }

    #[test]
    fn renders_bounded_int() {
        let ty = Type::Int {
            min: Some(0),
            max: None,
        };
        assert_eq!(ty.to_string(), "int<0, max>");
    }
}
