//! User-defined aliases, substituted for the first word of a command.

use crate::command::ArgVector;
use std::fmt;

/// A single `name -> value` substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub value: String,
}

impl fmt::Display for Alias {
    /// Same form the `alias` builtin prints: `name='value'`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.name, self.value)
    }
}

/// Insertion-ordered set of aliases with unique names.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`. Redefining an existing name replaces its value and keeps its position.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(alias) => alias.value = value,
            None => self.entries.push(Alias { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Alias> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every alias.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace `args[0]` with the words of its alias value, if it has one.
    ///
    /// Expansion is a single pass: the words coming out of an alias are not looked up
    /// again, so `alias ls='ls -F'` cannot loop.
    pub fn expand(&self, mut args: ArgVector) -> ArgVector {
        let Some(alias) = args.first().and_then(|head| self.get(head)) else {
            return args;
        };
        let replacement: Vec<String> = alias.value.split_whitespace().map(String::from).collect();
        tracing::debug!(alias = %alias.name, value = %alias.value, "expanding alias");
        args.splice(0..1, replacement);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> ArgVector {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_add_replaces_existing_name() {
        let mut table = AliasTable::new();
        table.add("foo", "bar");
        table.add("ll", "ls -l");
        table.add("foo", "baz");

        assert_eq!(table.len(), 2);
        let names: Vec<_> = table.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "ll"]);
        assert_eq!(table.get("foo").unwrap().value, "baz");
    }

    #[test]
    fn test_display_format() {
        let alias = Alias {
            name: "foo".to_string(),
            value: "bar".to_string(),
        };
        assert_eq!(alias.to_string(), "foo='bar'");
    }

    #[test]
    fn test_expand_multi_word_value_keeps_args() {
        let mut table = AliasTable::new();
        table.add("ll", "ls -l");
        assert_eq!(table.expand(argv("ll /tmp")), argv("ls -l /tmp"));
    }

    #[test]
    fn test_expand_only_first_word() {
        let mut table = AliasTable::new();
        table.add("x", "echo");
        assert_eq!(table.expand(argv("ls x")), argv("ls x"));
    }

    #[test]
    fn test_expand_is_not_recursive() {
        let mut table = AliasTable::new();
        table.add("ls", "ls -F");
        table.add("a", "b");
        table.add("b", "a");
        assert_eq!(table.expand(argv("ls")), argv("ls -F"));
        assert_eq!(table.expand(argv("a")), argv("b"));
    }

    #[test]
    fn test_expand_empty_value_drops_word() {
        let mut table = AliasTable::new();
        table.add("nothing", "");
        assert_eq!(table.expand(argv("nothing")), ArgVector::new());
    }

    #[test]
    fn test_clear() {
        let mut table = AliasTable::new();
        table.add("a", "b");
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.expand(argv("a")), argv("a"));
    }
}
