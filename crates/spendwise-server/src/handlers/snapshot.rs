//! Session snapshot handlers
//!
//! Records are added and removed; an edit is a remove followed by an add.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{json_body, AppError, AppState, SuccessResponse};
use spendwise_core::{
    CategoryBreakdown, Emi, Expense, FinancialSnapshot, FinancialSummary, FixedExpense, NewEmi,
    NewExpense, NewFixedExpense, NewSavingsGoal, SavingsGoal,
};

/// Request body for setting the monthly income
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetIncomeRequest {
    pub monthly_income: f64,
}

/// GET /api/snapshot - Everything entered this session
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<FinancialSnapshot> {
    Json(state.snapshot.read().await.clone())
}

/// PUT /api/snapshot/income - Set the monthly income
pub async fn set_income(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetIncomeRequest>, JsonRejection>,
) -> Result<Json<FinancialSnapshot>, AppError> {
    let req = json_body(payload)?;
    let mut snapshot = state.snapshot.write().await;
    snapshot.set_monthly_income(req.monthly_income)?;
    Ok(Json(snapshot.clone()))
}

/// POST /api/fixed-expenses - Add a fixed monthly expense
pub async fn add_fixed_expense(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewFixedExpense>, JsonRejection>,
) -> Result<Json<FixedExpense>, AppError> {
    let new = json_body(payload)?;
    let mut snapshot = state.snapshot.write().await;
    let id = snapshot.add_fixed_expense(new)?;
    info!(%id, "Added fixed expense");
    created(&snapshot.fixed_expenses, id, |e| e.id)
}

/// DELETE /api/fixed-expenses/:id
pub async fn remove_fixed_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    removed(state.snapshot.write().await.remove_fixed_expense(id), "Fixed expense")
}

/// POST /api/savings-goals - Add a savings goal
pub async fn add_savings_goal(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSavingsGoal>, JsonRejection>,
) -> Result<Json<SavingsGoal>, AppError> {
    let new = json_body(payload)?;
    let mut snapshot = state.snapshot.write().await;
    let id = snapshot.add_savings_goal(new)?;
    info!(%id, "Added savings goal");
    created(&snapshot.savings_goals, id, |g| g.id)
}

/// DELETE /api/savings-goals/:id
pub async fn remove_savings_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    removed(state.snapshot.write().await.remove_savings_goal(id), "Savings goal")
}

/// POST /api/emis - Add an EMI
pub async fn add_emi(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewEmi>, JsonRejection>,
) -> Result<Json<Emi>, AppError> {
    let new = json_body(payload)?;
    let mut snapshot = state.snapshot.write().await;
    let id = snapshot.add_emi(new)?;
    info!(%id, "Added EMI");
    created(&snapshot.emis, id, |e| e.id)
}

/// DELETE /api/emis/:id
pub async fn remove_emi(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    removed(state.snapshot.write().await.remove_emi(id), "EMI")
}

/// POST /api/expenses - Add a day-to-day expense
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> Result<Json<Expense>, AppError> {
    let new = json_body(payload)?;
    let mut snapshot = state.snapshot.write().await;
    let id = snapshot.add_expense(new)?;
    info!(%id, "Added expense");
    created(&snapshot.general_expenses, id, |e| e.id)
}

/// DELETE /api/expenses/:id
pub async fn remove_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    removed(state.snapshot.write().await.remove_expense(id), "Expense")
}

/// GET /api/dashboard - Derived figures for the session
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FinancialSummary>, AppError> {
    let today = Local::now().date_naive();
    let summary = state.snapshot.read().await.summary(today)?;
    Ok(Json(summary))
}

/// GET /api/expenses/breakdown - Expense totals per category
pub async fn get_breakdown(State(state): State<Arc<AppState>>) -> Json<CategoryBreakdown> {
    Json(state.snapshot.read().await.category_breakdown())
}

fn created<T: Clone>(
    items: &[T],
    id: Uuid,
    id_of: impl Fn(&T) -> Uuid,
) -> Result<Json<T>, AppError> {
    items
        .iter()
        .find(|item| id_of(item) == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::internal("Record not found after creation"))
}

fn removed(found: bool, kind: &str) -> Result<Json<SuccessResponse>, AppError> {
    if !found {
        return Err(AppError::not_found(&format!("{} not found", kind)));
    }
    Ok(Json(SuccessResponse { success: true }))
}
