use indexmap::IndexMap;
use tracing::debug;

use super::{
    Category, FilterCategory, FilterError, FilterValue, FlatFilterValue, FlatFilters,
    DEFAULT_DEPTH_LIMIT,
};

/// Placeholder shown by the add-category picker before anything was added.
pub const PICKER_PLACEHOLDER: &str = "Search Filter";

/// What an import did with each incoming key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub applied: Vec<Category>,
    /// Keys that name no category, or whose value is neither a string nor a
    /// list of strings.
    pub ignored: Vec<String>,
}

/// Applied categories with their value lists, plus the categories still
/// available to add.
///
/// `available` is always the category universe minus `applied`, kept in
/// universe order. Every mutation either fully succeeds or leaves the state
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    applied: IndexMap<Category, Vec<FilterValue>>,
    available: Vec<Category>,
    picker_open: bool,
    picker_label: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            applied: IndexMap::new(),
            available: Category::ALL.to_vec(),
            picker_open: false,
            picker_label: PICKER_PLACEHOLDER.to_string(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the state from the flat object published by the generator.
    ///
    /// A list (even an empty one) always applies its category; a string
    /// applies it only when it is not blank.
    pub fn import(flat: Option<&FlatFilters>) -> (Self, ImportReport) {
        let mut state = Self::new();
        let mut report = ImportReport::default();
        let Some(flat) = flat else {
            return (state, report);
        };

        for (key, value) in flat.iter() {
            let Some(category) = Category::parse(key) else {
                debug!(key = key.as_str(), "ignoring filter key with no category");
                report.ignored.push(key.clone());
                continue;
            };
            let incoming: Vec<&str> = match value {
                FlatFilterValue::List(items) => items.iter().map(String::as_str).collect(),
                FlatFilterValue::Text(text) if !text.trim().is_empty() => vec![text.as_str()],
                FlatFilterValue::Text(_) => continue,
                FlatFilterValue::Other(_) => {
                    debug!(key = key.as_str(), "ignoring filter value of unsupported shape");
                    report.ignored.push(key.clone());
                    continue;
                }
            };

            let values = state.applied.entry(category).or_default();
            for item in incoming {
                if !values.iter().any(|existing| existing.id == item) {
                    values.push(FilterValue::included(item));
                }
            }
            if !report.applied.contains(&category) {
                report.applied.push(category);
            }
        }

        state.refresh_available();
        (state, report)
    }

    pub fn applied(&self) -> &IndexMap<Category, Vec<FilterValue>> {
        &self.applied
    }

    pub fn values(&self, category: Category) -> Option<&[FilterValue]> {
        self.applied.get(&category).map(Vec::as_slice)
    }

    pub fn available(&self) -> &[Category] {
        &self.available
    }

    pub fn is_applied(&self, category: Category) -> bool {
        self.applied.contains_key(&category)
    }

    pub fn is_available(&self, category: Category) -> bool {
        self.available.contains(&category)
    }

    pub fn picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn picker_label(&self) -> &str {
        &self.picker_label
    }

    pub fn toggle_picker(&mut self) -> bool {
        self.picker_open = !self.picker_open;
        self.picker_open
    }

    /// Moves `category` from available to applied with no values yet.
    pub fn add_category(&mut self, category: Category) -> Result<(), FilterError> {
        if !self.is_available(category) {
            return Err(FilterError::CategoryUnavailable(category));
        }
        self.applied.insert(category, Vec::new());
        self.available.retain(|item| *item != category);
        self.picker_open = false;
        self.picker_label = category.as_str().to_string();
        Ok(())
    }

    /// Replaces the whole value list of an applied category.
    pub fn update_values(
        &mut self,
        category: Category,
        values: Vec<FilterValue>,
    ) -> Result<(), FilterError> {
        if !self.is_applied(category) {
            return Err(FilterError::CategoryNotApplied(category));
        }
        for (idx, value) in values.iter().enumerate() {
            if values[..idx].iter().any(|earlier| earlier.id == value.id) {
                return Err(FilterError::DuplicateValue {
                    category,
                    id: value.id.clone(),
                });
            }
        }
        if let Some(slot) = self.applied.get_mut(&category) {
            *slot = values;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Search payload: one entry per applied category that has at least one
    /// value. Empty categories stay applied but are not sent.
    pub fn export(&self) -> Vec<FilterCategory> {
        self.applied
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(category, values)| FilterCategory {
                name: *category,
                values: values.clone(),
                depth_limit: DEFAULT_DEPTH_LIMIT,
            })
            .collect()
    }

    fn refresh_available(&mut self) {
        self.available = Category::ALL
            .into_iter()
            .filter(|category| !self.applied.contains_key(category))
            .collect();
    }
}
