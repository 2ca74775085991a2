//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Snapshot file handling (init) and shared utilities (open_snapshot)
//! - `snapshot` - Editing commands (income, add, remove, list)
//! - `dashboard` - Derived figures (dashboard, breakdown)
//! - `calculate` - Standalone calculators (spending-power, analyze)
//! - `advise` - Advisory requests against the snapshot
//! - `ai` - AI backend diagnostics
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command

pub mod advise;
pub mod ai;
pub mod calculate;
pub mod core;
pub mod dashboard;
pub mod prompts;
pub mod serve;
pub mod snapshot;

// Re-export command functions for main.rs
pub use advise::*;
pub use ai::*;
pub use calculate::*;
pub use core::*;
pub use dashboard::*;
pub use prompts::*;
pub use serve::*;
pub use snapshot::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with two decimals
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
