//! Declaration identity.
//!
//! A [`DeclarationId`] distinguishes one declared entity — constant, function,
//! class-like — including anonymous ones. Identity depends only on *where the
//! declaration was written*, never on resolved data, so it can serve as a
//! cache key and as a map key in dependency graphs before any resolution has
//! happened.
//!
//! Anonymous declarations have no stable name and are identified by their
//! declaring file plus starting line instead.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key for one declared entity.
///
/// Class-likes (classes, interfaces, traits, enums) all use the `Class`
/// variants: their kind is resolved data, not identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeclarationId {
    /// A named constant, fully qualified.
    Constant(String),
    /// A named function, fully qualified.
    Function(String),
    /// An anonymous function (closure), keyed by declaring file + start line.
    AnonymousFunction { file: String, line: u32 },
    /// A named class, interface, trait, or enum, fully qualified.
    Class(String),
    /// An anonymous class, keyed by declaring file + start line.
    AnonymousClass { file: String, line: u32 },
}

impl DeclarationId {
    pub fn constant(name: impl Into<String>) -> Self {
        Self::Constant(name.into())
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    /// Identity for a named class-like declaration.
    ///
    /// Accepts the `Name@file:line` form produced by [`DeclarationId::name`]
    /// for anonymous classes and turns it back into the anonymous identity.
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        match Self::parse_anonymous(&name) {
            Some((file, line)) => Self::AnonymousClass {
                file: file.to_string(),
                line,
            },
            None => Self::Class(name),
        }
    }

    pub fn anonymous_class(file: impl Into<String>, line: u32) -> Self {
        Self::AnonymousClass {
            file: file.into(),
            line,
        }
    }

    pub fn anonymous_function(file: impl Into<String>, line: u32) -> Self {
        Self::AnonymousFunction {
            file: file.into(),
            line,
        }
    }

    /// True for the class-like variants.
    pub const fn is_class(&self) -> bool {
        matches!(self, Self::Class(_) | Self::AnonymousClass { .. })
    }

    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function(_) | Self::AnonymousFunction { .. })
    }

    pub const fn is_anonymous(&self) -> bool {
        matches!(
            self,
            Self::AnonymousClass { .. } | Self::AnonymousFunction { .. }
        )
    }

    /// The declared name, or the `@file:line` rendering for anonymous
    /// declarations.
    pub fn name(&self) -> String {
        match self {
            Self::Constant(name) | Self::Function(name) | Self::Class(name) => name.clone(),
            Self::AnonymousClass { file, line } => format!("class@{file}:{line}"),
            Self::AnonymousFunction { file, line } => format!("closure@{file}:{line}"),
        }
    }

    /// Stable string rendering used as the cache key.
    ///
    /// Validity constraints on the rendered key (length, character set) are
    /// the cache backend's concern.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Constant(name) => format!("const:{name}"),
            Self::Function(name) => format!("fn:{name}"),
            Self::AnonymousFunction { file, line } => format!("anon-fn:{file}:{line}"),
            Self::Class(name) => format!("class:{name}"),
            Self::AnonymousClass { file, line } => format!("anon-class:{file}:{line}"),
        }
    }

    fn parse_anonymous(name: &str) -> Option<(&str, u32)> {
        let (_, rest) = name.split_once('@')?;
        let (file, line) = rest.rsplit_once(':')?;
        let line = line.parse().ok()?;
        if file.is_empty() {
            return None;
        }
        Some((file, line))
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// An insertion-ordered map keyed by declaration identity.
///
/// Staging and result collections depend on deterministic iteration order,
/// so this is a thin association list rather than a hash map.
#[derive(Clone, Debug, Default)]
pub struct DeclarationMap<V> {
    entries: Vec<(DeclarationId, V)>,
}

impl<V> DeclarationMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &DeclarationId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &DeclarationId) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value)
    }

    /// Inserts or replaces, preserving the original position on replace.
    pub fn insert(&mut self, id: DeclarationId, value: V) -> Option<V> {
        for (key, slot) in &mut self.entries {
            if *key == id {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.entries.push((id, value));
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeclarationId, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &DeclarationId> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl<V> IntoIterator for DeclarationMap<V> {
    type Item = (DeclarationId, V);
    type IntoIter = std::vec::IntoIter<(DeclarationId, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V> FromIterator<(DeclarationId, V)> for DeclarationMap<V> {
    fn from_iter<T: IntoIterator<Item = (DeclarationId, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (id, value) in iter {
            map.insert(id, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_round_trips_anonymous_name() {
        let id = DeclarationId::anonymous_class("src/app.x", 42);
        assert_eq!(id.name(), "class@src/app.x:42");
        assert_eq!(DeclarationId::class(id.name()), id);
    }

    #[test]
    fn cache_keys_are_distinct_per_kind() {
        let class = DeclarationId::class("Foo");
        let function = DeclarationId::function("Foo");
        assert_ne!(class.cache_key(), function.cache_key());
    }

    #[test]
    fn declaration_map_preserves_insertion_order() {
        let mut map = DeclarationMap::new();
        map.insert(DeclarationId::class("B"), 1);
        map.insert(DeclarationId::class("A"), 2);
        map.insert(DeclarationId::class("B"), 3);

        let keys: Vec<_> = map.keys().map(DeclarationId::name).collect();
        assert_eq!(keys, ["B", "A"]);
        assert_eq!(map.get(&DeclarationId::class("B")), Some(&3));
    }
}
