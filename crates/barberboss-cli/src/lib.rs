// Library interface for barberboss-cli so integration tests can reach the
// renderers. commands.rs is also declared in main.rs, hence the #[path].

#[path = "commands.rs"]
pub mod commands;

pub use commands::{load_resolver, render_check, render_plans, render_unlock, OutputFormat};
