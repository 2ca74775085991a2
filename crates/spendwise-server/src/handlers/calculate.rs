//! Standalone calculators
//!
//! These don't touch the session snapshot. Ratio and salary are rounded to
//! two decimals here, at the presentation boundary.

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::{json_body, AppError};
use spendwise_core::{compute_spending_power, round_currency, DebtAnalysis, DebtTier};

/// Request body for the spending power calculator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPowerRequest {
    pub monthly_income: f64,
    #[serde(default)]
    pub fixed_expenses: f64,
    #[serde(default)]
    pub savings_goal: f64,
    #[serde(default)]
    pub emis: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPowerResponse {
    /// Negative when commitments exceed income
    pub spending_power: f64,
}

/// POST /api/calculate/spending-power
pub async fn calculate_spending_power(
    payload: Result<Json<SpendingPowerRequest>, JsonRejection>,
) -> Result<Json<SpendingPowerResponse>, AppError> {
    let req = json_body(payload)?;
    let spending_power = compute_spending_power(
        req.monthly_income,
        req.fixed_expenses,
        req.savings_goal,
        req.emis,
    )?;
    Ok(Json(SpendingPowerResponse {
        spending_power: round_currency(spending_power),
    }))
}

/// Request body for the EMI & salary analysis
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub monthly_income: f64,
    pub total_emis: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub total_monthly_emis: f64,
    pub income_to_debt_ratio: f64,
    pub debt_tier: DebtTier,
    pub message: &'static str,
    pub minimum_salary: f64,
}

/// POST /api/calculate/analysis - Debt ratio, tier and minimum salary
pub async fn calculate_analysis(
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let req = json_body(payload)?;
    let analysis = DebtAnalysis::compute(req.monthly_income, req.total_emis)?;
    // Tier follows the ratio as reported, so 0.3640 reads 0.36 and stays healthy
    let ratio = round_currency(analysis.income_to_debt_ratio);
    let debt_tier = DebtTier::from_ratio(ratio);
    Ok(Json(AnalysisResponse {
        total_monthly_emis: analysis.total_monthly_emis,
        income_to_debt_ratio: ratio,
        debt_tier,
        message: debt_tier.message(),
        minimum_salary: round_currency(analysis.minimum_salary),
    }))
}
