//! Header storage: case-preserving on write, case-insensitive on lookup,
//! insertion-order on iteration.
//!
//! A `Vec<(String, String)>` rather than a `HashMap`, so headers come
//! back out in the order they were added when a message is
//! re-serialized.

use std::fmt;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Headers {
        Headers { entries: Vec::new() }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a header, preserving the case given here.
    ///
    /// If a header with the same name (case-insensitively) already
    /// exists, its value is replaced in place rather than appending a
    /// duplicate, which keeps serialization order stable across repeated
    /// `set` calls during handler execution.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Append a header without deduplicating, for producers (like the
    /// codec) that need to preserve multiple values under one name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parsed `Content-Length`, if present and well-formed.
    ///
    /// Present-but-unparseable is distinguished from absent (framing
    /// treats the two differently), so this returns the parse result
    /// rather than collapsing it to `None`.
    pub fn content_length(&self) -> Option<Result<u64, ()>> {
        self.get("Content-Length").map(|v| v.trim().parse::<u64>().map_err(|_| ()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (k, v) in self.iter() {
            write!(f, "{}: {}\r\n", k, v)?;
        }
        Ok(())
    }
}
