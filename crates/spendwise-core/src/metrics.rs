//! Metrics engine
//!
//! Pure functions turning raw financial entries into the derived figures shown
//! on the dashboard, spending power, analysis and expense breakdown views.
//! Nothing here holds state and nothing rounds: rounding to cents is done by
//! whoever displays the result.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{check_amount, Expense, ExpenseCategory};

/// Upper bound (inclusive) of the healthy debt-to-income tier
pub const HEALTHY_RATIO_MAX: f64 = 0.36;

/// Upper bound (inclusive) of the manageable debt-to-income tier
pub const MANAGEABLE_RATIO_MAX: f64 = 0.43;

/// EMIs should be at most ~33% of income, so salary should be 3x the EMIs
pub const MIN_SALARY_EMI_MULTIPLIER: f64 = 3.0;

/// Money left after fixed expenses, savings and loan installments
///
/// The result is not clamped: a negative value means the user is
/// overcommitted.
pub fn compute_spending_power(
    income: f64,
    fixed_expenses_total: f64,
    savings_goal_total: f64,
    emi_total: f64,
) -> Result<f64> {
    if !income.is_finite() {
        return Err(Error::InvalidAmount {
            field: "income",
            value: income,
        });
    }
    let fixed = check_amount("fixed expenses", fixed_expenses_total)?;
    let savings = check_amount("savings goal", savings_goal_total)?;
    let emis = check_amount("EMIs", emi_total)?;

    Ok(income - fixed - savings - emis)
}

/// Fraction of income consumed by EMIs
///
/// No EMIs is always a ratio of zero, even when income is zero. Otherwise
/// income must be strictly positive.
pub fn compute_income_to_debt_ratio(total_emis: f64, income: f64) -> Result<f64> {
    let total_emis = check_amount("EMIs", total_emis)?;
    if total_emis == 0.0 {
        return Ok(0.0);
    }
    if !income.is_finite() {
        return Err(Error::InvalidAmount {
            field: "income",
            value: income,
        });
    }
    if income <= 0.0 {
        return Err(Error::ZeroIncome);
    }
    Ok(total_emis / income)
}

/// Salary needed to service the current EMIs comfortably
pub fn compute_minimum_recommended_salary(total_emis: f64) -> Result<f64> {
    let total_emis = check_amount("EMIs", total_emis)?;
    if total_emis > 0.0 {
        Ok(total_emis * MIN_SALARY_EMI_MULTIPLIER)
    } else {
        Ok(0.0)
    }
}

/// Interpretation of a debt-to-income ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtTier {
    /// No EMIs at all
    Excellent,
    /// Up to 36% of income
    Healthy,
    /// Up to 43% of income
    Manageable,
    /// Above 43% of income
    High,
}

impl DebtTier {
    /// Classify a ratio; each boundary belongs to the lower tier
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio <= 0.0 {
            Self::Excellent
        } else if ratio <= HEALTHY_RATIO_MAX {
            Self::Healthy
        } else if ratio <= MANAGEABLE_RATIO_MAX {
            Self::Manageable
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Healthy => "healthy",
            Self::Manageable => "manageable",
            Self::High => "high",
        }
    }

    /// Message shown next to the ratio
    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "No debt payments, excellent!",
            Self::Healthy => "Healthy debt level.",
            Self::Manageable => "Manageable, but be cautious.",
            Self::High => "High debt level, consider reducing.",
        }
    }

    /// Whether the user should be warned about this tier
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Manageable | Self::High)
    }
}

impl std::fmt::Display for DebtTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summed amount for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: f64,
}

/// Expense totals per category, in first-seen order
///
/// Categories without expenses are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryBreakdown {
    totals: Vec<CategoryTotal>,
}

impl CategoryBreakdown {
    pub fn get(&self, category: ExpenseCategory) -> Option<f64> {
        self.totals
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.amount)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.totals.iter()
    }

    /// Sum over all categories
    pub fn total(&self) -> f64 {
        self.totals.iter().map(|t| t.amount).sum()
    }

    /// Totals re-ordered by the declared category order
    pub fn in_declared_order(&self) -> Vec<CategoryTotal> {
        ExpenseCategory::all()
            .iter()
            .filter_map(|&category| {
                self.get(category)
                    .map(|amount| CategoryTotal { category, amount })
            })
            .collect()
    }

    /// Share of the total for each category, as a fraction in [0, 1]
    pub fn shares(&self) -> Vec<(ExpenseCategory, f64)> {
        let total = self.total();
        self.totals
            .iter()
            .map(|t| {
                let share = if total > 0.0 { t.amount / total } else { 0.0 };
                (t.category, share)
            })
            .collect()
    }
}

/// Group expenses by category and sum the amounts
pub fn aggregate_by_category<'a, I>(expenses: I) -> CategoryBreakdown
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(total) => total.amount += expense.amount,
            None => totals.push(CategoryTotal {
                category: expense.category,
                amount: expense.amount,
            }),
        }
    }

    CategoryBreakdown { totals }
}

/// Result of the EMI & salary analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtAnalysis {
    pub total_monthly_emis: f64,
    pub income_to_debt_ratio: f64,
    pub debt_tier: DebtTier,
    pub minimum_salary: f64,
}

impl DebtAnalysis {
    /// Analyse EMIs against income; income must be positive
    pub fn compute(income: f64, total_emis: f64) -> Result<Self> {
        check_positive_income(income)?;
        let ratio = compute_income_to_debt_ratio(total_emis, income)?;
        Ok(Self {
            total_monthly_emis: total_emis,
            income_to_debt_ratio: ratio,
            debt_tier: DebtTier::from_ratio(ratio),
            minimum_salary: compute_minimum_recommended_salary(total_emis)?,
        })
    }
}

fn check_positive_income(income: f64) -> Result<()> {
    if !income.is_finite() || income < 0.0 {
        return Err(Error::InvalidAmount {
            field: "income",
            value: income,
        });
    }
    if income == 0.0 {
        return Err(Error::ZeroIncome);
    }
    Ok(())
}

/// Round to two decimal places for display
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
