//! Form templates and recent submissions kept in an injected key-value store.
//!
//! The rule and validation engines never read or write a store. Forms that
//! want "save as template" or "fill from a recent submission" hand a
//! [`KeyValueStore`] to [`FormMemory`] explicitly.

use crate::error::StoreError;
use crate::types::FormData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String key-value storage, e.g. browser local storage or a file.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// In-process [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A named snapshot saved for reuse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub name: String,
    pub data: FormData,
}

/// Templates and recent submissions per form type.
#[derive(Debug)]
pub struct FormMemory<S: KeyValueStore> {
    store: S,
    recent_limit: usize,
}

impl<S: KeyValueStore> FormMemory<S> {
    pub const DEFAULT_RECENT_LIMIT: usize = 5;

    pub fn new(store: S) -> Self {
        FormMemory {
            store,
            recent_limit: Self::DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Saves `data` as template `name`, replacing a template of that name.
    pub fn save_template(
        &mut self,
        form_type: &str,
        name: &str,
        data: &FormData,
    ) -> Result<(), StoreError> {
        let key = templates_key(form_type);
        let mut templates = self.read_list::<FormTemplate>(&key)?;
        templates.retain(|t| t.name != name);
        templates.push(FormTemplate {
            name: name.to_string(),
            data: data.clone(),
        });
        self.write_list(&key, &templates)
    }

    pub fn templates(&self, form_type: &str) -> Result<Vec<FormTemplate>, StoreError> {
        self.read_list(&templates_key(form_type))
    }

    pub fn template(
        &self,
        form_type: &str,
        name: &str,
    ) -> Result<Option<FormTemplate>, StoreError> {
        Ok(self
            .templates(form_type)?
            .into_iter()
            .find(|t| t.name == name))
    }

    /// Returns whether a template was removed.
    pub fn delete_template(&mut self, form_type: &str, name: &str) -> Result<bool, StoreError> {
        let key = templates_key(form_type);
        let mut templates = self.read_list::<FormTemplate>(&key)?;
        let before = templates.len();
        templates.retain(|t| t.name != name);
        if templates.len() == before {
            return Ok(false);
        }
        self.write_list(&key, &templates)?;
        Ok(true)
    }

    /// Records a submission, newest first, keeping at most the recent limit.
    pub fn record_submission(
        &mut self,
        form_type: &str,
        data: &FormData,
    ) -> Result<(), StoreError> {
        let key = recent_key(form_type);
        let mut recent = self.read_list::<FormData>(&key)?;
        recent.insert(0, data.clone());
        recent.truncate(self.recent_limit);
        self.write_list(&key, &recent)
    }

    pub fn recent_submissions(&self, form_type: &str) -> Result<Vec<FormData>, StoreError> {
        self.read_list(&recent_key(form_type))
    }

    /// Drops templates and recent submissions of one form type.
    pub fn forget(&mut self, form_type: &str) {
        self.store.remove(&templates_key(form_type));
        self.store.remove(&recent_key(form_type));
    }

    fn read_list<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.store.get(key) {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, raw);
        Ok(())
    }
}

fn templates_key(form_type: &str) -> String {
    format!("form_templates_{}", form_type)
}

fn recent_key(form_type: &str) -> String {
    format!("recent_submissions_{}", form_type)
}
