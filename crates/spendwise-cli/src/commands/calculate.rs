//! Standalone calculators

use anyhow::Result;
use spendwise_core::{compute_spending_power, DebtAnalysis};

use super::money;

pub fn cmd_spending_power(income: f64, fixed: f64, savings: f64, emis: f64) -> Result<()> {
    let power = compute_spending_power(income, fixed, savings, emis)?;

    println!("Spending power: {}", money(power));
    if power < 0.0 {
        println!("⚠️  Commitments exceed income by {}", money(-power));
    }
    Ok(())
}

pub fn cmd_analyze(income: f64, emis: f64) -> Result<()> {
    let analysis = DebtAnalysis::compute(income, emis)?;

    println!();
    println!("📊 EMI & Salary Analysis");
    println!("   ─────────────────────────────");
    println!("   Total monthly EMIs:  {}", money(analysis.total_monthly_emis));
    println!(
        "   Debt-to-income:      {:.2}%",
        analysis.income_to_debt_ratio * 100.0
    );
    println!("   Minimum salary:      {}", money(analysis.minimum_salary));
    println!();
    let icon = if analysis.debt_tier.is_warning() {
        "⚠️ "
    } else {
        "✅"
    };
    println!("{} {}", icon, analysis.debt_tier.message());

    Ok(())
}
