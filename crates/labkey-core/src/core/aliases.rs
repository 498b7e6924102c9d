//! Caller-facing column names and their server-native counterparts.

use crate::error::ValidationError;
use indexmap::IndexMap;

/// A validated, bijective alias mapping.
///
/// `forward` maps caller-facing names to native names for outgoing columns
/// and filters; `reverse` is its inverse and relabels response columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasMap {
    forward: IndexMap<String, String>,
    reverse: IndexMap<String, String>,
}

impl AliasMap {
    pub fn new(aliases: IndexMap<String, String>) -> Result<Self, ValidationError> {
        let mut reverse: IndexMap<String, String> = IndexMap::with_capacity(aliases.len());

        for (caller, native) in &aliases {
            if let Some(existing) = reverse.get(native) {
                return Err(ValidationError::AmbiguousAlias {
                    native: native.clone(),
                    first: existing.clone(),
                    second: caller.clone(),
                });
            }
            reverse.insert(native.clone(), caller.clone());
        }

        Ok(Self {
            forward: aliases,
            reverse,
        })
    }

    /// Caller-facing name -> native name, for outgoing columns and filters.
    /// Unmapped names pass through.
    pub fn to_native<'a>(&'a self, column: &'a str) -> &'a str {
        match self.forward.get(column) {
            Some(native) => native.as_str(),
            None => column,
        }
    }

    /// Native name -> caller-facing name, for response columns.
    pub fn to_caller<'a>(&'a self, column: &'a str) -> &'a str {
        match self.reverse.get(column) {
            Some(caller) => caller.as_str(),
            None => column,
        }
    }

    pub fn forward(&self) -> &IndexMap<String, String> {
        &self.forward
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }
}
