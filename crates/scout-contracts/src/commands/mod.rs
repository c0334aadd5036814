mod parser;
mod registry;

pub use parser::{parse_command, parse_values, Command};
pub use registry::help_lines;
