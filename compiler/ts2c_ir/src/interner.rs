//! String interner for identifiers and literal text.
//!
//! Strings are leaked on first insertion so lookups can hand out
//! `&'static str` without tying callers to a lock guard. One interner is
//! created per compilation, so the leak is bounded by the input size.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct InternerInner {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Interner mapping strings to compact [`Name`]s.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    pub fn new() -> Self {
        let interner = StringInterner {
            inner: RwLock::new(InternerInner::default()),
        };
        // Index 0 is the empty string.
        interner.intern("");
        interner
    }

    /// Intern a string, returning its Name.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.inner.read().map.get(s) {
            return name;
        }

        let mut guard = self.inner.write();
        // Another writer may have inserted it between the two locks.
        if let Some(&name) = guard.map.get(s) {
            return name;
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let index = u32::try_from(guard.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_index(index);
        guard.strings.push(leaked);
        guard.map.insert(leaked, name);
        name
    }

    /// Look up the string for a Name.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.inner
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Find an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.inner.read().map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Only the pre-interned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_lookup() {
        let interner = StringInterner::new();

        let hello = interner.intern("hello");
        let world = interner.intern("world");
        let hello2 = interner.intern("hello");

        assert_eq!(hello, hello2);
        assert_ne!(hello, world);
        assert_eq!(interner.lookup(hello), "hello");
        assert_eq!(interner.lookup(world), "world");
    }

    #[test]
    fn test_empty_string_is_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert!(interner.is_empty());
    }

    #[test]
    fn test_get_does_not_insert() {
        let interner = StringInterner::new();
        assert_eq!(interner.get("missing"), None);
        assert_eq!(interner.len(), 1);
        let name = interner.intern("present");
        assert_eq!(interner.get("present"), Some(name));
    }
}
