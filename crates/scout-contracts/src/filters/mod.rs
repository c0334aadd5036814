mod category;
mod errors;
mod flat;
mod state;
mod value;

pub use category::Category;
pub use errors::FilterError;
pub use flat::{FlatFilterValue, FlatFilters};
pub use state::{FilterState, ImportReport, PICKER_PLACEHOLDER};
pub use value::{FilterCategory, FilterValue, SelectionType, DEFAULT_DEPTH_LIMIT};
