use maildraft_document::DEFAULT_COLUMNS;
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::undo_stack::DEFAULT_UNDO_LEVELS;
use crate::EditorError;

/// Editor session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Number of committed drops kept in the history buffer
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Seed for generated block ids
    #[serde(default = "default_id_seed")]
    pub id_seed: String,

    /// Columns given to a new `ColumnsContainer`
    #[serde(default = "default_columns")]
    pub default_columns: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_undo_levels() -> usize {
    DEFAULT_UNDO_LEVELS
}

fn default_id_seed() -> String {
    "maildraft".to_string()
}

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

impl EditorConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        let config: EditorConfig =
            serde_json::from_str(source).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        if self.history_capacity == 0 {
            return Err(EditorError::Config("historyCapacity must be at least 1".into()));
        }
        if self.default_columns == 0 {
            return Err(EditorError::Config("defaultColumns must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            undo_levels: default_undo_levels(),
            id_seed: default_id_seed(),
            default_columns: default_columns(),
        }
    }
}
