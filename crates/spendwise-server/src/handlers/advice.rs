//! Advisory handlers
//!
//! Each contract allows one call in flight; a second POST while one is running
//! gets 409. The call runs in its own task so a dropped connection can't leave
//! the slot stuck.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{json_body, AppError, AppState};
use spendwise_core::{
    Advisory, LifestyleGuide, LifestyleGuideInput, SpendingAdvice, SpendingAdvisorInput,
};

/// Request body for spending advice
///
/// Figures left out are taken from the session snapshot.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingAdviceRequest {
    pub spending_data: Option<String>,
    pub income: Option<f64>,
    pub fixed_expenses: Option<f64>,
    pub savings_goal: Option<f64>,
    pub emi_payments: Option<f64>,
}

/// Request body for the lifestyle guide
///
/// Figures left out are computed from the session snapshot.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleGuideRequest {
    pub spending_power: Option<f64>,
    pub total_monthly_expenses: Option<f64>,
    pub income_to_debt_ratio: Option<f64>,
}

/// Latest stored result for one contract
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryState<T> {
    pub current: Option<Advisory<T>>,
    pub in_flight: bool,
}

/// POST /api/advice/spending - Ask for personalized spending advice
pub async fn request_spending_advice(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpendingAdviceRequest>, JsonRejection>,
) -> Result<Json<Advisory<SpendingAdvice>>, AppError> {
    let req = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => SpendingAdviceRequest::default(),
        other => json_body(other)?,
    };

    let input = {
        let snapshot = state.snapshot.read().await;
        let base = SpendingAdvisorInput::from_snapshot(&snapshot, req.spending_data);
        SpendingAdvisorInput {
            spending_data: base.spending_data,
            income: req.income.unwrap_or(base.income),
            fixed_expenses: req.fixed_expenses.unwrap_or(base.fixed_expenses),
            savings_goal: req.savings_goal.unwrap_or(base.savings_goal),
            emi_payments: req.emi_payments.unwrap_or(base.emi_payments),
        }
    };
    input.validate()?;

    let ticket = state
        .spending_advice
        .try_begin()
        .ok_or_else(|| AppError::conflict("Spending advice request already in progress"))?;

    let task_state = state.clone();
    let advisory = tokio::spawn(async move {
        let advisory = match &task_state.advisor {
            Some(advisor) => advisor
                .spending_advice(&input)
                .await
                .unwrap_or_else(|_| Advisory::fallback(SpendingAdvice::fallback())),
            None => {
                warn!("Spending advice requested but no AI backend is configured");
                Advisory::fallback(SpendingAdvice::fallback())
            }
        };
        task_state.spending_advice.complete(ticket, advisory.clone());
        advisory
    })
    .await?;

    Ok(Json(advisory))
}

/// GET /api/advice/spending - Latest spending advice
pub async fn get_spending_advice(
    State(state): State<Arc<AppState>>,
) -> Json<AdvisoryState<SpendingAdvice>> {
    Json(AdvisoryState {
        current: state.spending_advice.current(),
        in_flight: state.spending_advice.is_in_flight(),
    })
}

/// POST /api/advice/lifestyle - Ask for lifestyle advice and over-leveraging tips
pub async fn request_lifestyle_guide(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LifestyleGuideRequest>, JsonRejection>,
) -> Result<Json<Advisory<LifestyleGuide>>, AppError> {
    // An empty body means "use the snapshot"
    let req = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => LifestyleGuideRequest::default(),
        other => json_body(other)?,
    };

    let input = match (
        req.spending_power,
        req.total_monthly_expenses,
        req.income_to_debt_ratio,
    ) {
        (Some(spending_power), Some(total_monthly_expenses), Some(income_to_debt_ratio)) => {
            LifestyleGuideInput {
                spending_power,
                total_monthly_expenses,
                income_to_debt_ratio,
            }
        }
        _ => {
            let base = LifestyleGuideInput::from_snapshot(&*state.snapshot.read().await)?;
            LifestyleGuideInput {
                spending_power: req.spending_power.unwrap_or(base.spending_power),
                total_monthly_expenses: req
                    .total_monthly_expenses
                    .unwrap_or(base.total_monthly_expenses),
                income_to_debt_ratio: req.income_to_debt_ratio.unwrap_or(base.income_to_debt_ratio),
            }
        }
    };
    input.validate()?;

    let ticket = state
        .lifestyle_guide
        .try_begin()
        .ok_or_else(|| AppError::conflict("Lifestyle advice request already in progress"))?;

    let task_state = state.clone();
    let advisory = tokio::spawn(async move {
        let advisory = match &task_state.advisor {
            Some(advisor) => advisor
                .lifestyle_guide(&input)
                .await
                .unwrap_or_else(|_| Advisory::fallback(LifestyleGuide::fallback())),
            None => {
                warn!("Lifestyle advice requested but no AI backend is configured");
                Advisory::fallback(LifestyleGuide::fallback())
            }
        };
        task_state.lifestyle_guide.complete(ticket, advisory.clone());
        advisory
    })
    .await?;

    Ok(Json(advisory))
}

/// GET /api/advice/lifestyle - Latest lifestyle advice
pub async fn get_lifestyle_guide(
    State(state): State<Arc<AppState>>,
) -> Json<AdvisoryState<LifestyleGuide>> {
    Json(AdvisoryState {
        current: state.lifestyle_guide.current(),
        in_flight: state.lifestyle_guide.is_in_flight(),
    })
}
