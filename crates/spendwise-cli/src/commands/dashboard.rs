//! Dashboard and breakdown commands

use std::path::Path;

use anyhow::Result;
use chrono::Local;

use super::{money, open_snapshot};

pub fn cmd_dashboard(path: &Path, json: bool) -> Result<()> {
    let snapshot = open_snapshot(path)?;
    let summary = snapshot.summary(Local::now().date_naive())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 Spendwise Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Monthly income:       {:>12}", money(summary.monthly_income));
    println!("  Fixed expenses:       {:>12}", money(summary.fixed_expenses_total));
    println!("  Savings goals:        {:>12}", money(summary.savings_goal_total));
    println!("  EMIs:                 {:>12}", money(summary.emi_total));
    println!("  Day-to-day expenses:  {:>12}", money(summary.expenses_total));
    println!("  ─────────────────────────────────────");
    println!("  Spending power:       {:>12}", money(summary.spending_power));
    if summary.spending_power < 0.0 {
        println!("  ⚠️  Commitments exceed income");
    }
    println!();

    match (summary.income_to_debt_ratio, summary.debt_tier) {
        (Some(ratio), Some(tier)) => {
            let icon = if tier.is_warning() { "⚠️ " } else { "✅" };
            println!("  Debt-to-income:       {:>11.2}%", ratio * 100.0);
            println!("  {} {}", icon, tier.message());
        }
        _ => println!("  Debt-to-income:       (enter an income first)"),
    }
    println!(
        "  Minimum salary for current EMIs: {}",
        money(summary.minimum_salary)
    );

    if !summary.upcoming_emis.is_empty() {
        println!();
        println!("  Upcoming EMIs:");
        for emi in &summary.upcoming_emis {
            println!(
                "    {:<24} {:>12}  due on day {:>2}, until {}",
                emi.loan_type,
                money(emi.amount),
                emi.due_day,
                emi.end_date
            );
        }
    }

    if !summary.category_breakdown.is_empty() {
        println!();
        println!("  Spending by category:");
        for total in summary.category_breakdown.iter() {
            println!("    {:<16} {:>12}", total.category.as_str(), money(total.amount));
        }
    }
    println!();

    Ok(())
}

pub fn cmd_breakdown(path: &Path) -> Result<()> {
    let snapshot = open_snapshot(path)?;
    let breakdown = snapshot.category_breakdown();

    if breakdown.is_empty() {
        println!("No expenses recorded yet.");
        return Ok(());
    }

    println!();
    println!("{:<16} {:>12} {:>8}", "CATEGORY", "AMOUNT", "SHARE");
    println!("{}", "-".repeat(38));
    let shares = breakdown.shares();
    for total in breakdown.in_declared_order() {
        let share = shares
            .iter()
            .find(|(category, _)| *category == total.category)
            .map_or(0.0, |(_, share)| share * 100.0);
        println!(
            "{:<16} {:>12} {:>7.1}%",
            total.category.as_str(),
            money(total.amount),
            share
        );
    }
    println!("{}", "-".repeat(38));
    println!("{:<16} {:>12}", "Total", money(breakdown.total()));
    println!();

    Ok(())
}
