//! Advisory request and response types
//!
//! These types are backend-agnostic and used across all AI implementations.
//! Inputs are validated before a request is built; outputs are the exact JSON
//! shape the prompts ask for, so a missing field fails deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::{compute_income_to_debt_ratio, compute_spending_power, CategoryBreakdown};
use crate::models::check_amount;
use crate::snapshot::FinancialSnapshot;

/// Placeholder sent when the user gave no spending description
pub const NO_SPENDING_DATA: &str = "No spending data available.";

/// Input for the spending advisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingAdvisorInput {
    /// Free text describing recent spending (may be empty)
    #[serde(default)]
    pub spending_data: String,
    pub income: f64,
    pub fixed_expenses: f64,
    pub savings_goal: f64,
    pub emi_payments: f64,
}

impl SpendingAdvisorInput {
    /// Build from snapshot totals. Without explicit text the category
    /// breakdown is described instead.
    pub fn from_snapshot(snapshot: &FinancialSnapshot, spending_data: Option<String>) -> Self {
        let spending_data =
            spending_data.unwrap_or_else(|| describe_breakdown(&snapshot.category_breakdown()));
        Self {
            spending_data,
            income: snapshot.monthly_income,
            fixed_expenses: snapshot.fixed_expenses_total(),
            savings_goal: snapshot.savings_goal_total(),
            emi_payments: snapshot.emi_total(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_amount("income", self.income)?;
        check_amount("fixed expenses", self.fixed_expenses)?;
        check_amount("savings goal", self.savings_goal)?;
        check_amount("EMI payments", self.emi_payments)?;
        Ok(())
    }

    /// Template variables for the spending advisor prompt
    pub fn prompt_vars(&self, currency: Option<&str>) -> HashMap<&'static str, String> {
        let spending_data = if self.spending_data.trim().is_empty() {
            NO_SPENDING_DATA.to_string()
        } else {
            self.spending_data.clone()
        };

        let mut vars = HashMap::new();
        vars.insert("income", self.income.to_string());
        vars.insert("fixed_expenses", self.fixed_expenses.to_string());
        vars.insert("savings_goal", self.savings_goal.to_string());
        vars.insert("emi_payments", self.emi_payments.to_string());
        vars.insert("spending_data", spending_data);
        vars.insert("currency", currency.unwrap_or_default().to_string());
        vars
    }
}

/// Output of the spending advisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAdvice {
    pub advice: String,
}

/// Input for the lifestyle guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleGuideInput {
    /// May be negative; passed through as computed
    pub spending_power: f64,
    pub total_monthly_expenses: f64,
    pub income_to_debt_ratio: f64,
}

impl LifestyleGuideInput {
    /// Build from snapshot figures. Fails with `ZeroIncome` when EMIs exist
    /// but no income has been entered.
    pub fn from_snapshot(snapshot: &FinancialSnapshot) -> Result<Self> {
        let emis = snapshot.emi_total();
        Ok(Self {
            spending_power: compute_spending_power(
                snapshot.monthly_income,
                snapshot.fixed_expenses_total(),
                snapshot.savings_goal_total(),
                emis,
            )?,
            total_monthly_expenses: snapshot.total_monthly_expenses(),
            income_to_debt_ratio: compute_income_to_debt_ratio(emis, snapshot.monthly_income)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spending_power.is_finite() {
            return Err(Error::InvalidAmount {
                field: "spending power",
                value: self.spending_power,
            });
        }
        check_amount("total monthly expenses", self.total_monthly_expenses)?;
        check_amount("income to debt ratio", self.income_to_debt_ratio)?;
        Ok(())
    }

    /// Template variables for the lifestyle guide prompt
    pub fn prompt_vars(&self, currency: Option<&str>) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("spending_power", self.spending_power.to_string());
        vars.insert(
            "total_monthly_expenses",
            self.total_monthly_expenses.to_string(),
        );
        vars.insert("income_to_debt_ratio", self.income_to_debt_ratio.to_string());
        vars.insert("currency", currency.unwrap_or_default().to_string());
        vars
    }
}

/// Output of the lifestyle guide. Both fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleGuide {
    pub lifestyle_advice: String,
    pub over_leveraging_tips: String,
}

/// A prompt ready to send: optional system text plus the user message
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
}

/// Backend details for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfo {
    pub backend: &'static str,
    pub host: String,
    pub model: String,
    /// Task-specific model overrides (only non-default)
    pub task_models: Vec<(String, String)>,
}

/// One line per category, e.g. "Groceries: 8500"
fn describe_breakdown(breakdown: &CategoryBreakdown) -> String {
    breakdown
        .iter()
        .map(|t| format!("{}: {}", t.category, t.amount))
        .collect::<Vec<_>>()
        .join("\n")
}
