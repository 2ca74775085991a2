//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use clap::Parser;
use spendwise_core::{ExpenseCategory, FinancialSnapshot};
use tempfile::TempDir;

use crate::cli::{Cli, Commands, RecordKind};
use crate::commands::{self, money, truncate, EmiArgs};

/// Create a snapshot file with an income, returning (dir guard, path)
fn setup_snapshot(income: f64) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spendwise.json");
    commands::cmd_init(&path, income, false).unwrap();
    (dir, path)
}

fn load(path: &Path) -> FinancialSnapshot {
    FinancialSnapshot::load(path).unwrap()
}

// ========== Init / Income Tests ==========

#[test]
fn test_cmd_init_creates_snapshot() {
    let (_dir, path) = setup_snapshot(50000.0);
    assert_eq!(load(&path).monthly_income, 50000.0);
}

#[test]
fn test_cmd_init_refuses_overwrite() {
    let (_dir, path) = setup_snapshot(50000.0);
    assert!(commands::cmd_init(&path, 1.0, false).is_err());

    commands::cmd_init(&path, 1.0, true).unwrap();
    assert_eq!(load(&path).monthly_income, 1.0);
}

#[test]
fn test_cmd_without_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");

    let err = commands::cmd_income(&path, 100.0).unwrap_err();
    assert!(err.to_string().contains("spendwise init"));
}

#[test]
fn test_cmd_income_rejects_negative() {
    let (_dir, path) = setup_snapshot(50000.0);
    assert!(commands::cmd_income(&path, -10.0).is_err());
    assert_eq!(load(&path).monthly_income, 50000.0);
}

// ========== Add / Remove Tests ==========

#[test]
fn test_cmd_add_records() {
    let (_dir, path) = setup_snapshot(75000.0);

    commands::cmd_add_fixed(&path, "Rent", 30000.0).unwrap();
    commands::cmd_add_goal(&path, "Emergency fund", 10.0, true).unwrap();
    commands::cmd_add_emi(
        &path,
        EmiArgs {
            loan_type: "Car Loan".into(),
            principal: 500000.0,
            rate: 9.5,
            tenure: 36,
            installment: 15000.0,
            start: "2024-01-05".into(),
            end: "2026-12-05".into(),
        },
    )
    .unwrap();
    commands::cmd_add_expense(&path, "Dinner", 3200.0, "dining out", Some("2024-03-12"))
        .unwrap();

    let snapshot = load(&path);
    assert_eq!(snapshot.fixed_expenses_total(), 30000.0);
    assert_eq!(snapshot.savings_goals[0].is_percentage, Some(true));
    assert_eq!(snapshot.emi_total(), 15000.0);
    assert_eq!(
        snapshot.general_expenses[0].category,
        ExpenseCategory::DiningOut
    );
}

#[test]
fn test_cmd_add_expense_unknown_category() {
    let (_dir, path) = setup_snapshot(75000.0);
    let result = commands::cmd_add_expense(&path, "Gadget", 100.0, "Gadgets", None);
    assert!(result.is_err());
    assert!(load(&path).general_expenses.is_empty());
}

#[test]
fn test_cmd_add_emi_bad_date() {
    let (_dir, path) = setup_snapshot(75000.0);
    let result = commands::cmd_add_emi(
        &path,
        EmiArgs {
            loan_type: "Home Loan".into(),
            principal: 1.0,
            rate: 1.0,
            tenure: 1,
            installment: 1.0,
            start: "05/01/2024".into(),
            end: "2026-12-05".into(),
        },
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("--start"));
}

#[test]
fn test_cmd_remove() {
    let (_dir, path) = setup_snapshot(75000.0);
    commands::cmd_add_fixed(&path, "Rent", 30000.0).unwrap();
    let id = load(&path).fixed_expenses[0].id;

    // Wrong kind leaves the record alone
    assert!(commands::cmd_remove(&path, RecordKind::Expense, id).is_err());
    assert_eq!(load(&path).fixed_expenses.len(), 1);

    commands::cmd_remove(&path, RecordKind::Fixed, id).unwrap();
    assert!(load(&path).fixed_expenses.is_empty());
}

// ========== Report Tests ==========

#[test]
fn test_cmd_dashboard_and_breakdown() {
    let (_dir, path) = setup_snapshot(75000.0);
    commands::cmd_add_expense(&path, "Supermarket", 5000.0, "Groceries", Some("2024-03-02"))
        .unwrap();

    assert!(commands::cmd_dashboard(&path, false).is_ok());
    assert!(commands::cmd_dashboard(&path, true).is_ok());
    assert!(commands::cmd_breakdown(&path).is_ok());
    assert!(commands::cmd_list(&path).is_ok());
}

#[test]
fn test_cmd_breakdown_empty() {
    let (_dir, path) = setup_snapshot(0.0);
    assert!(commands::cmd_breakdown(&path).is_ok());
}

#[test]
fn test_cmd_calculators() {
    assert!(commands::cmd_spending_power(10000.0, 8000.0, 3000.0, 1500.0).is_ok());
    assert!(commands::cmd_analyze(60000.0, 20000.0).is_ok());
    assert!(commands::cmd_analyze(0.0, 20000.0).is_err());
    assert!(commands::cmd_spending_power(1000.0, -1.0, 0.0, 0.0).is_err());
}

#[test]
fn test_cmd_prompts() {
    assert!(commands::cmd_prompts_list().is_ok());
    assert!(commands::cmd_prompts_show("spending_advisor").is_ok());
    assert!(commands::cmd_prompts_show("no_such_prompt").is_ok());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_remove_args() {
    let id = uuid::Uuid::new_v4();
    let id_arg = id.to_string();
    let cli = Cli::try_parse_from([
        "spendwise",
        "--file",
        "custom.json",
        "remove",
        "emi",
        id_arg.as_str(),
    ])
    .unwrap();

    assert_eq!(cli.file, PathBuf::from("custom.json"));
    match cli.command {
        Commands::Remove { kind, id: parsed } => {
            assert!(matches!(kind, RecordKind::Emi));
            assert_eq!(parsed, id);
        }
        _ => panic!("expected remove command"),
    }
}

#[test]
fn test_parse_rejects_bad_id() {
    assert!(Cli::try_parse_from(["spendwise", "remove", "fixed", "not-a-uuid"]).is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long description", 10), "a very ...");
    assert_eq!(truncate("Café Crème Brûlée", 8), "Café ...");
}

#[test]
fn test_money() {
    assert_eq!(money(1234.5), "1234.50");
    assert_eq!(money(-2500.0), "-2500.00");
}
