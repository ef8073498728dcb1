//! First-appearance entity indexing.
//!
//! Partitions panel rows by the value of an id column. Entities are listed
//! in the order their identifier first appears; each entity's rows keep
//! their original panel order, whether or not they are contiguous.

use std::collections::HashMap;

use dmdc_core::EntityKey;

use crate::error::PanelResult;
use crate::panel::Panel;

/// Ordered mapping from entity key to the panel rows carrying that key.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    /// Keys in first-seen order (index -> key).
    keys: Vec<EntityKey>,

    /// Row indices per entity, parallel to `keys`.
    rows: Vec<Vec<usize>>,

    /// Reverse lookup: key -> index into `keys`.
    lookup: HashMap<EntityKey, usize>,
}

impl EntityIndex {
    /// Build the index from `panel`'s id column.
    pub fn from_panel(panel: &Panel, id_column: &str) -> PanelResult<Self> {
        Ok(Self::from_keys(panel.keys(id_column)?))
    }

    /// Build the index from one key per row.
    pub fn from_keys(row_keys: impl IntoIterator<Item = EntityKey>) -> Self {
        let mut index = Self::default();
        for (row, key) in row_keys.into_iter().enumerate() {
            let existing = index.lookup.get(&key).copied();
            match existing {
                Some(slot) => index.rows[slot].push(row),
                None => {
                    index.lookup.insert(key.clone(), index.keys.len());
                    index.keys.push(key);
                    index.rows.push(vec![row]);
                }
            }
        }
        index
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> &[EntityKey] {
        &self.keys
    }

    /// Row indices for `key` (None if the key never appears).
    pub fn rows(&self, key: &EntityKey) -> Option<&[usize]> {
        self.lookup.get(key).map(|&slot| self.rows[slot].as_slice())
    }

    /// Iterate `(key, rows)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &[usize])> {
        self.keys.iter().zip(self.rows.iter().map(Vec::as_slice))
    }
}
