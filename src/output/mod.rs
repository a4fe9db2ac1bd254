//! Output formatting.
//!
//! - [`config_js`] - rendering and writing the region to ping URL script
//! - [`terminal`] - provisioning summary on the terminal

mod config_js;
mod terminal;

pub use config_js::{render_config, write_config, write_sinks};
pub use terminal::{format_field, print_report, report_rows};
