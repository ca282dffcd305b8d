//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod fetch;
mod info;
mod install;
mod lint;
mod smoke;
mod uninstall;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use fetch::run_fetch;
pub use info::run_info;
pub use install::run_install;
pub use lint::run_lint;
pub use smoke::run_test;
pub use uninstall::run_uninstall;
