//! One module per user-facing command.

mod add;
mod checkout;
mod config;
mod json;
mod prune;
mod release;
mod remove;
mod status;
mod sync;
mod tree;

pub use add::{handle_add, handle_add_dir};
pub use checkout::handle_checkout;
pub use config::handle_config;
pub use json::{handle_json_export, handle_json_import};
pub use prune::handle_prune;
pub use release::{handle_ls_releases, handle_release};
pub use remove::handle_remove;
pub use status::{handle_show, handle_status};
pub use sync::{handle_clone, handle_fetch, handle_pull, handle_push};
pub use tree::handle_tree;
