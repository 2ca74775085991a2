//! Domain models for Spendwise
//!
//! All records are plain values. Identifiers are generated when a record is
//! added to a [`FinancialSnapshot`](crate::snapshot::FinancialSnapshot) and
//! records are never edited in place (edit = remove + re-add).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Fixed set of categories an expense can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Groceries,
    Utilities,
    Transport,
    Entertainment,
    Healthcare,
    Education,
    #[serde(rename = "Dining Out")]
    DiningOut,
    Shopping,
    Travel,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::Utilities => "Utilities",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::DiningOut => "Dining Out",
            Self::Shopping => "Shopping",
            Self::Travel => "Travel",
            Self::Other => "Other",
        }
    }

    /// All categories in declared (display) order
    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Groceries,
            Self::Utilities,
            Self::Transport,
            Self::Entertainment,
            Self::Healthcare,
            Self::Education,
            Self::DiningOut,
            Self::Shopping,
            Self::Travel,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "groceries" => Ok(Self::Groceries),
            "utilities" => Ok(Self::Utilities),
            "transport" => Ok(Self::Transport),
            "entertainment" => Ok(Self::Entertainment),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "diningout" => Ok(Self::DiningOut),
            "shopping" => Ok(Self::Shopping),
            "travel" => Ok(Self::Travel),
            "other" => Ok(Self::Other),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A day-to-day expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
}

/// Input for creating a new expense
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
}

/// A recurring fixed monthly expense (rent, insurance, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
}

/// Input for creating a new fixed expense
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFixedExpense {
    pub name: String,
    pub amount: f64,
}

/// A monthly savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    /// Marks `amount` as a percentage of income. Stored but not interpreted
    /// by any computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_percentage: Option<bool>,
}

/// Input for creating a new savings goal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingsGoal {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub is_percentage: Option<bool>,
}

/// A loan repaid through equated monthly installments
///
/// Principal, rate, tenure and installment are all user supplied and are not
/// checked against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emi {
    pub id: Uuid,
    pub loan_type: String,
    pub principal: f64,
    /// Annual interest rate, in percent
    pub interest_rate: f64,
    /// Tenure in months
    pub tenure: u32,
    pub monthly_installment: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Input for creating a new EMI
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmi {
    pub loan_type: String,
    pub principal: f64,
    pub interest_rate: f64,
    pub tenure: u32,
    pub monthly_installment: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Reject NaN, infinities and negative amounts
pub fn check_amount(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAmount { field, value });
    }
    Ok(value)
}

/// Like [`check_amount`] but zero is also rejected
pub fn check_positive_amount(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidAmount { field, value });
    }
    Ok(value)
}

fn check_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidData(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        check_text("description", &self.description)?;
        check_positive_amount("amount", self.amount)?;
        Ok(())
    }
}

impl NewFixedExpense {
    pub fn validate(&self) -> Result<()> {
        check_text("name", &self.name)?;
        check_positive_amount("amount", self.amount)?;
        Ok(())
    }
}

impl NewSavingsGoal {
    pub fn validate(&self) -> Result<()> {
        check_text("name", &self.name)?;
        check_amount("amount", self.amount)?;
        Ok(())
    }
}

impl NewEmi {
    pub fn validate(&self) -> Result<()> {
        check_text("loan type", &self.loan_type)?;
        check_amount("principal", self.principal)?;
        check_amount("interest rate", self.interest_rate)?;
        check_positive_amount("monthly installment", self.monthly_installment)?;
        if self.tenure == 0 {
            return Err(Error::InvalidData("tenure must be at least one month".into()));
        }
        if self.start_date > self.end_date {
            return Err(Error::InvalidData(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}
