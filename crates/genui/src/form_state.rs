//! Live state of the fields of the currently displayed form.
//!
//! Generative forms are rendered anew every turn with arbitrary field ids, so
//! the values are collected here as the renderer reports changes and handed
//! over in one piece when an action is dispatched. The map is cleared on every
//! dispatch and whenever a new model UI replaces the displayed form, so values
//! of an abandoned form never attach to a later, unrelated action.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub id: String,
    pub value: String,
    pub is_valid: bool,
}

/// Field states keyed by id, in the order fields first reported a change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFormData {
    fields: IndexMap<String, FieldState>,
}

impl ActiveFormData {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, id: &str) -> Option<&FieldState> {
        self.fields.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldState> {
        self.fields.values()
    }

    /// id → value, without validity flags
    pub fn values(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .map(|(id, field)| (id.clone(), field.value.clone()))
            .collect()
    }

    /// Ids marked invalid by their widget, in insertion order
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.fields
            .values()
            .filter(|field| !field.is_valid)
            .map(|field| field.id.as_str())
            .collect()
    }
}

impl FromIterator<FieldState> for ActiveFormData {
    fn from_iter<I: IntoIterator<Item = FieldState>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|field| (field.id.clone(), field))
                .collect(),
        }
    }
}

/// Copy-on-write holder of [`ActiveFormData`].
///
/// Readers get an `Arc` snapshot that later writes never touch. Writers
/// replace the snapshot under a short lock.
#[derive(Debug, Default)]
pub struct FormStateAggregator {
    current: Mutex<Arc<ActiveFormData>>,
}

impl FormStateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Arc<ActiveFormData>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Merge one field, leaving every other entry as it was. An existing id
    /// keeps its position.
    pub fn on_field_change(&self, id: impl Into<String>, value: impl Into<String>, is_valid: bool) {
        let id = id.into();
        let field = FieldState {
            id: id.clone(),
            value: value.into(),
            is_valid,
        };
        let mut current = self.lock();
        Arc::make_mut(&mut *current).fields.insert(id, field);
    }

    pub fn snapshot(&self) -> Arc<ActiveFormData> {
        self.lock().clone()
    }

    /// Take the whole map and leave an empty one, as one step.
    pub fn read_and_clear(&self) -> Arc<ActiveFormData> {
        std::mem::take(&mut *self.lock())
    }
}
