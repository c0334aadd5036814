use serde::{Deserialize, Serialize};

use super::Category;

/// Cap sent as `selectedSubFilter` with every exported category.
pub const DEFAULT_DEPTH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionType {
    #[default]
    Included,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub id: String,
    #[serde(rename = "text")]
    pub label: String,
    #[serde(rename = "selectionType", default)]
    pub selection_type: SelectionType,
}

impl FilterValue {
    pub fn included(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: value.clone(),
            label: value,
            selection_type: SelectionType::Included,
        }
    }

    pub fn excluded(value: impl Into<String>) -> Self {
        Self {
            selection_type: SelectionType::Excluded,
            ..Self::included(value)
        }
    }
}

/// Export form of one applied category, shaped for the search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCategory {
    #[serde(rename = "type")]
    pub name: Category,
    pub values: Vec<FilterValue>,
    #[serde(rename = "selectedSubFilter")]
    pub depth_limit: u32,
}
