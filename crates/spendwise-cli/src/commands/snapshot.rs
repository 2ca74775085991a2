//! Snapshot editing commands (income, add, remove, list)
//!
//! Records are never edited in place; remove one and add it again.

use std::path::Path;

use anyhow::{bail, Result};
use chrono::Local;
use spendwise_core::{
    ExpenseCategory, NewEmi, NewExpense, NewFixedExpense, NewSavingsGoal,
};
use uuid::Uuid;

use super::{money, open_snapshot, parse_date, save_snapshot, truncate};
use crate::cli::RecordKind;

/// EMI fields as given on the command line
pub struct EmiArgs {
    pub loan_type: String,
    pub principal: f64,
    pub rate: f64,
    pub tenure: u32,
    pub installment: f64,
    pub start: String,
    pub end: String,
}

pub fn cmd_income(path: &Path, amount: f64) -> Result<()> {
    let mut snapshot = open_snapshot(path)?;
    snapshot.set_monthly_income(amount)?;
    save_snapshot(path, &snapshot)?;

    println!("✓ Monthly income set to {}", money(amount));
    Ok(())
}

pub fn cmd_add_fixed(path: &Path, name: &str, amount: f64) -> Result<()> {
    let mut snapshot = open_snapshot(path)?;
    let id = snapshot.add_fixed_expense(NewFixedExpense {
        name: name.to_string(),
        amount,
    })?;
    save_snapshot(path, &snapshot)?;

    println!("✓ Added fixed expense '{}' ({}) [{}]", name, money(amount), id);
    Ok(())
}

pub fn cmd_add_goal(path: &Path, name: &str, amount: f64, percentage: bool) -> Result<()> {
    let mut snapshot = open_snapshot(path)?;
    let id = snapshot.add_savings_goal(NewSavingsGoal {
        name: name.to_string(),
        amount,
        is_percentage: percentage.then_some(true),
    })?;
    save_snapshot(path, &snapshot)?;

    println!("✓ Added savings goal '{}' ({}) [{}]", name, money(amount), id);
    if percentage {
        println!("  Note: the percentage flag is stored but amounts are always treated as absolute.");
    }
    Ok(())
}

pub fn cmd_add_emi(path: &Path, args: EmiArgs) -> Result<()> {
    let start_date = parse_date(&args.start, "start")?;
    let end_date = parse_date(&args.end, "end")?;

    let mut snapshot = open_snapshot(path)?;
    let id = snapshot.add_emi(NewEmi {
        loan_type: args.loan_type.clone(),
        principal: args.principal,
        interest_rate: args.rate,
        tenure: args.tenure,
        monthly_installment: args.installment,
        start_date,
        end_date,
    })?;
    save_snapshot(path, &snapshot)?;

    println!(
        "✓ Added EMI '{}' ({} / month) [{}]",
        args.loan_type,
        money(args.installment),
        id
    );
    Ok(())
}

pub fn cmd_add_expense(
    path: &Path,
    description: &str,
    amount: f64,
    category: &str,
    date: Option<&str>,
) -> Result<()> {
    let category: ExpenseCategory = category.parse()?;
    let date = match date {
        Some(d) => parse_date(d, "date")?,
        None => Local::now().date_naive(),
    };

    let mut snapshot = open_snapshot(path)?;
    let id = snapshot.add_expense(NewExpense {
        description: description.to_string(),
        amount,
        category,
        date,
    })?;
    save_snapshot(path, &snapshot)?;

    println!(
        "✓ Added expense '{}' ({}, {}) [{}]",
        description,
        money(amount),
        category,
        id
    );
    Ok(())
}

pub fn cmd_remove(path: &Path, kind: RecordKind, id: Uuid) -> Result<()> {
    let mut snapshot = open_snapshot(path)?;
    let (found, label) = match kind {
        RecordKind::Fixed => (snapshot.remove_fixed_expense(id), "Fixed expense"),
        RecordKind::Goal => (snapshot.remove_savings_goal(id), "Savings goal"),
        RecordKind::Emi => (snapshot.remove_emi(id), "EMI"),
        RecordKind::Expense => (snapshot.remove_expense(id), "Expense"),
    };

    if !found {
        bail!("{} {} not found", label, id);
    }
    save_snapshot(path, &snapshot)?;

    println!("✓ Removed {} {}", label.to_lowercase(), id);
    Ok(())
}

pub fn cmd_list(path: &Path) -> Result<()> {
    let snapshot = open_snapshot(path)?;

    println!();
    println!("Monthly income: {}", money(snapshot.monthly_income));

    println!();
    println!("Fixed expenses ({}):", snapshot.fixed_expenses.len());
    for e in &snapshot.fixed_expenses {
        println!("  {}  {:<30} {:>12}", e.id, truncate(&e.name, 30), money(e.amount));
    }

    println!();
    println!("Savings goals ({}):", snapshot.savings_goals.len());
    for g in &snapshot.savings_goals {
        let marker = if g.is_percentage == Some(true) { " (%)" } else { "" };
        println!(
            "  {}  {:<30} {:>12}{}",
            g.id,
            truncate(&g.name, 30),
            money(g.amount),
            marker
        );
    }

    println!();
    println!("EMIs ({}):", snapshot.emis.len());
    for e in &snapshot.emis {
        println!(
            "  {}  {:<30} {:>12}  {} → {}",
            e.id,
            truncate(&e.loan_type, 30),
            money(e.monthly_installment),
            e.start_date,
            e.end_date
        );
    }

    println!();
    println!("Expenses ({}):", snapshot.general_expenses.len());
    for e in &snapshot.general_expenses {
        println!(
            "  {}  {}  {:<24} {:<14} {:>12}",
            e.id,
            e.date,
            truncate(&e.description, 24),
            e.category.as_str(),
            money(e.amount)
        );
    }
    println!();

    Ok(())
}
