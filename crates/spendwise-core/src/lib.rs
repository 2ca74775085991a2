//! Spendwise Core Library
//!
//! Shared functionality for the Spendwise personal finance helper:
//! - Domain records and the in-memory financial snapshot
//! - Metrics engine (spending power, debt ratio and tier, category breakdown)
//! - Pluggable local AI backends (Ollama, OpenAI-compatible servers)
//! - Advisor with timeouts, fixed fallbacks and stale-result protection
//! - Prompt library for customizable AI prompts
//! - Advisor configuration with per-task overrides

pub mod advisor;
pub mod ai;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod snapshot;

/// Test utilities including mock generation server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{Advisor, Advisory, AdvisorySlot, AdvisoryStatus, Ticket};
pub use ai::{
    AIBackend, AIClient, BackendInfo, LifestyleGuide, LifestyleGuideInput, MockBackend, MockMode,
    OllamaBackend, OpenAICompatibleBackend, SpendingAdvice, SpendingAdvisorInput,
};
pub use config::{AdvisorConfig, TaskConfig, TaskType};
pub use error::{Error, Result};
pub use metrics::{
    aggregate_by_category, compute_income_to_debt_ratio, compute_minimum_recommended_salary,
    compute_spending_power, round_currency, CategoryBreakdown, CategoryTotal, DebtAnalysis,
    DebtTier,
};
pub use models::{
    Emi, Expense, ExpenseCategory, FixedExpense, NewEmi, NewExpense, NewFixedExpense,
    NewSavingsGoal, SavingsGoal,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use snapshot::{FinancialSnapshot, FinancialSummary, UpcomingEmi};
