//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_snapshot` / `save_snapshot` - Shared snapshot file access
//! - `parse_date` - Date argument parsing
//! - `cmd_init` - Create the snapshot file

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use spendwise_core::FinancialSnapshot;

/// Load the snapshot file
pub fn open_snapshot(path: &Path) -> Result<FinancialSnapshot> {
    if !path.exists() {
        bail!(
            "No snapshot at {}. Run 'spendwise init' first.",
            path.display()
        );
    }
    FinancialSnapshot::load(path)
        .with_context(|| format!("Failed to load snapshot from {}", path.display()))
}

/// Write the snapshot file
pub fn save_snapshot(path: &Path, snapshot: &FinancialSnapshot) -> Result<()> {
    snapshot
        .save(path)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date(value: &str, arg: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", arg))
}

pub fn cmd_init(path: &Path, income: f64, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Snapshot already exists at {}. Use --force to start over.",
            path.display()
        );
    }

    println!("🔧 Creating snapshot at {}...", path.display());
    let snapshot = FinancialSnapshot::with_income(income)?;
    save_snapshot(path, &snapshot)?;

    println!("✅ Snapshot created.");
    println!();
    println!("Next steps:");
    println!("  1. Add commitments: spendwise add fixed --name Rent --amount 30000");
    println!("  2. Record expenses: spendwise add expense --description Groceries --amount 2500 --category Groceries");
    println!("  3. See the figures: spendwise dashboard");

    Ok(())
}
