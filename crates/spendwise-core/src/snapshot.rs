//! Financial snapshot
//!
//! The caller-owned aggregate of everything a user has entered for the
//! session: income plus the fixed expense, savings goal, EMI and expense
//! lists. The metrics engine only ever borrows it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::metrics::{
    aggregate_by_category, compute_income_to_debt_ratio, compute_minimum_recommended_salary,
    compute_spending_power, CategoryBreakdown, DebtTier,
};
use crate::models::{
    check_amount, Emi, Expense, FixedExpense, NewEmi, NewExpense, NewFixedExpense,
    NewSavingsGoal, SavingsGoal,
};

/// Everything the user has entered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub monthly_income: f64,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
    #[serde(default)]
    pub savings_goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub emis: Vec<Emi>,
    #[serde(default)]
    pub general_expenses: Vec<Expense>,
}

impl FinancialSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_income(monthly_income: f64) -> Result<Self> {
        let mut snapshot = Self::new();
        snapshot.set_monthly_income(monthly_income)?;
        Ok(snapshot)
    }

    pub fn set_monthly_income(&mut self, amount: f64) -> Result<()> {
        self.monthly_income = check_amount("monthly income", amount)?;
        Ok(())
    }

    // ========== Fixed expenses ==========

    pub fn add_fixed_expense(&mut self, new: NewFixedExpense) -> Result<Uuid> {
        new.validate()?;
        let id = Uuid::new_v4();
        self.fixed_expenses.push(FixedExpense {
            id,
            name: new.name.trim().to_string(),
            amount: new.amount,
        });
        Ok(id)
    }

    pub fn remove_fixed_expense(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.fixed_expenses, |e| e.id == id)
    }

    // ========== Savings goals ==========

    pub fn add_savings_goal(&mut self, new: NewSavingsGoal) -> Result<Uuid> {
        new.validate()?;
        let id = Uuid::new_v4();
        self.savings_goals.push(SavingsGoal {
            id,
            name: new.name.trim().to_string(),
            amount: new.amount,
            is_percentage: new.is_percentage,
        });
        Ok(id)
    }

    pub fn remove_savings_goal(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.savings_goals, |g| g.id == id)
    }

    // ========== EMIs ==========

    pub fn add_emi(&mut self, new: NewEmi) -> Result<Uuid> {
        new.validate()?;
        let id = Uuid::new_v4();
        self.emis.push(Emi {
            id,
            loan_type: new.loan_type.trim().to_string(),
            principal: new.principal,
            interest_rate: new.interest_rate,
            tenure: new.tenure,
            monthly_installment: new.monthly_installment,
            start_date: new.start_date,
            end_date: new.end_date,
        });
        Ok(id)
    }

    pub fn remove_emi(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.emis, |e| e.id == id)
    }

    // ========== Expenses ==========

    pub fn add_expense(&mut self, new: NewExpense) -> Result<Uuid> {
        new.validate()?;
        let id = Uuid::new_v4();
        self.general_expenses.push(Expense {
            id,
            description: new.description.trim().to_string(),
            amount: new.amount,
            category: new.category,
            date: new.date,
        });
        Ok(id)
    }

    pub fn remove_expense(&mut self, id: Uuid) -> bool {
        remove_by(&mut self.general_expenses, |e| e.id == id)
    }

    // ========== Totals ==========

    pub fn fixed_expenses_total(&self) -> f64 {
        self.fixed_expenses.iter().map(|e| e.amount).sum()
    }

    /// Sum of savings goal amounts, taken at face value
    pub fn savings_goal_total(&self) -> f64 {
        self.savings_goals.iter().map(|g| g.amount).sum()
    }

    pub fn emi_total(&self) -> f64 {
        self.emis.iter().map(|e| e.monthly_installment).sum()
    }

    pub fn expenses_total(&self) -> f64 {
        self.general_expenses.iter().map(|e| e.amount).sum()
    }

    /// Fixed plus day-to-day expenses for the month
    pub fn total_monthly_expenses(&self) -> f64 {
        self.fixed_expenses_total() + self.expenses_total()
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        aggregate_by_category(&self.general_expenses)
    }

    /// EMIs still running on `as_of`, soonest to finish first
    pub fn upcoming_emis(&self, as_of: NaiveDate) -> Vec<UpcomingEmi> {
        let mut upcoming: Vec<UpcomingEmi> = self
            .emis
            .iter()
            .filter(|e| e.end_date >= as_of)
            .map(|e| UpcomingEmi {
                id: e.id,
                loan_type: e.loan_type.clone(),
                amount: e.monthly_installment,
                due_day: e.start_date.day(),
                end_date: e.end_date,
            })
            .collect();
        upcoming.sort_by_key(|e| e.end_date);
        upcoming
    }

    /// Compute every dashboard figure for this snapshot
    pub fn summary(&self, as_of: NaiveDate) -> Result<FinancialSummary> {
        let fixed = self.fixed_expenses_total();
        let savings = self.savings_goal_total();
        let emis = self.emi_total();

        let spending_power = compute_spending_power(self.monthly_income, fixed, savings, emis)?;

        // Without income there is no meaningful ratio unless there are no EMIs
        let income_to_debt_ratio = match compute_income_to_debt_ratio(emis, self.monthly_income) {
            Ok(ratio) => Some(ratio),
            Err(Error::ZeroIncome) => {
                debug!(emis, "Skipping debt ratio: no income entered");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(FinancialSummary {
            monthly_income: self.monthly_income,
            fixed_expenses_total: fixed,
            savings_goal_total: savings,
            emi_total: emis,
            expenses_total: self.expenses_total(),
            total_monthly_expenses: self.total_monthly_expenses(),
            spending_power,
            income_to_debt_ratio,
            debt_tier: income_to_debt_ratio.map(DebtTier::from_ratio),
            minimum_salary: compute_minimum_recommended_salary(emis)?,
            category_breakdown: self.category_breakdown(),
            upcoming_emis: self.upcoming_emis(as_of),
        })
    }

    /// Check amounts and id uniqueness, e.g. after loading from disk
    pub fn validate(&self) -> Result<()> {
        check_amount("monthly income", self.monthly_income)?;
        for e in &self.fixed_expenses {
            check_amount("fixed expense", e.amount)?;
        }
        for g in &self.savings_goals {
            check_amount("savings goal", g.amount)?;
        }
        for e in &self.emis {
            check_amount("monthly installment", e.monthly_installment)?;
        }
        for e in &self.general_expenses {
            check_amount("expense", e.amount)?;
        }

        ensure_unique("fixed expense", self.fixed_expenses.iter().map(|e| e.id))?;
        ensure_unique("savings goal", self.savings_goals.iter().map(|g| g.id))?;
        ensure_unique("EMI", self.emis.iter().map(|e| e.id))?;
        ensure_unique("expense", self.general_expenses.iter().map(|e| e.id))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// An EMI shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEmi {
    pub id: Uuid,
    pub loan_type: String,
    pub amount: f64,
    /// Day of month the installment falls due
    pub due_day: u32,
    pub end_date: NaiveDate,
}

/// Derived figures for a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub monthly_income: f64,
    pub fixed_expenses_total: f64,
    pub savings_goal_total: f64,
    pub emi_total: f64,
    pub expenses_total: f64,
    pub total_monthly_expenses: f64,
    pub spending_power: f64,
    /// None when EMIs exist but no income has been entered
    pub income_to_debt_ratio: Option<f64>,
    pub debt_tier: Option<DebtTier>,
    pub minimum_salary: f64,
    pub category_breakdown: CategoryBreakdown,
    pub upcoming_emis: Vec<UpcomingEmi>,
}

fn remove_by<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}

fn ensure_unique(kind: &str, ids: impl Iterator<Item = Uuid>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::InvalidData(format!("duplicate {} id {}", kind, id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseCategory;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn car_loan(installment: f64, end: &str) -> NewEmi {
        NewEmi {
            loan_type: "Car Loan".into(),
            principal: 600000.0,
            interest_rate: 9.0,
            tenure: 48,
            monthly_installment: installment,
            start_date: date("2023-01-15"),
            end_date: date(end),
        }
    }

    fn sample_snapshot() -> FinancialSnapshot {
        let mut s = FinancialSnapshot::with_income(75000.0).unwrap();
        s.add_fixed_expense(NewFixedExpense {
            name: "Rent".into(),
            amount: 25000.0,
        })
        .unwrap();
        s.add_fixed_expense(NewFixedExpense {
            name: "Insurance".into(),
            amount: 5000.0,
        })
        .unwrap();
        s.add_savings_goal(NewSavingsGoal {
            name: "Emergency fund".into(),
            amount: 10000.0,
            is_percentage: None,
        })
        .unwrap();
        s.add_emi(car_loan(15000.0, "2026-12-15")).unwrap();
        s
    }

    #[test]
    fn test_add_and_remove() {
        let mut s = FinancialSnapshot::new();
        let id = s
            .add_expense(NewExpense {
                description: "Weekly shop".into(),
                amount: 2500.0,
                category: ExpenseCategory::Groceries,
                date: date("2024-05-03"),
            })
            .unwrap();
        assert_eq!(s.general_expenses.len(), 1);

        assert!(s.remove_expense(id));
        assert!(!s.remove_expense(id));
        assert!(s.general_expenses.is_empty());
    }

    #[test]
    fn test_generated_ids_unique() {
        let mut s = FinancialSnapshot::new();
        let a = s
            .add_fixed_expense(NewFixedExpense {
                name: "Rent".into(),
                amount: 1.0,
            })
            .unwrap();
        let b = s
            .add_fixed_expense(NewFixedExpense {
                name: "Rent".into(),
                amount: 1.0,
            })
            .unwrap();
        assert_ne!(a, b);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_add_rejects_invalid() {
        let mut s = FinancialSnapshot::new();
        assert!(s
            .add_expense(NewExpense {
                description: "  ".into(),
                amount: 10.0,
                category: ExpenseCategory::Other,
                date: date("2024-05-03"),
            })
            .is_err());
        assert!(s
            .add_fixed_expense(NewFixedExpense {
                name: "Rent".into(),
                amount: -10.0,
            })
            .is_err());
        assert!(s.set_monthly_income(f64::NAN).is_err());
        assert!(s.fixed_expenses.is_empty());
        assert!(s.general_expenses.is_empty());
    }

    #[test]
    fn test_summary_end_to_end() {
        let s = sample_snapshot();
        let summary = s.summary(date("2024-06-01")).unwrap();

        assert_eq!(summary.fixed_expenses_total, 30000.0);
        assert_eq!(summary.spending_power, 20000.0);
        assert_eq!(summary.income_to_debt_ratio, Some(0.2));
        assert_eq!(summary.debt_tier, Some(DebtTier::Healthy));
        assert_eq!(summary.minimum_salary, 45000.0);
        assert_eq!(summary.upcoming_emis.len(), 1);
        assert_eq!(summary.upcoming_emis[0].due_day, 15);
    }

    #[test]
    fn test_summary_without_income() {
        let mut s = FinancialSnapshot::new();
        s.add_emi(car_loan(15000.0, "2026-12-15")).unwrap();
        let summary = s.summary(date("2024-06-01")).unwrap();

        assert_eq!(summary.income_to_debt_ratio, None);
        assert_eq!(summary.debt_tier, None);
        assert_eq!(summary.spending_power, -15000.0);
    }

    #[test]
    fn test_percentage_flag_not_interpreted() {
        let mut s = FinancialSnapshot::with_income(100000.0).unwrap();
        s.add_savings_goal(NewSavingsGoal {
            name: "Retirement".into(),
            amount: 10.0,
            is_percentage: Some(true),
        })
        .unwrap();
        assert_eq!(s.savings_goal_total(), 10.0);
    }

    #[test]
    fn test_upcoming_emis_sorted_and_filtered() {
        let mut s = FinancialSnapshot::new();
        s.add_emi(car_loan(15000.0, "2026-12-15")).unwrap();
        s.add_emi(NewEmi {
            loan_type: "Phone EMI".into(),
            monthly_installment: 2000.0,
            start_date: date("2024-01-20"),
            end_date: date("2024-12-20"),
            ..car_loan(0.0, "2024-12-20")
        })
        .unwrap();
        s.add_emi(car_loan(1000.0, "2024-01-15")).unwrap();

        let upcoming = s.upcoming_emis(date("2024-06-01"));
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].loan_type, "Phone EMI");
        assert_eq!(upcoming[0].due_day, 20);
        assert_eq!(upcoming[1].loan_type, "Car Loan");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let s = sample_snapshot();
        s.save(&path).unwrap();

        let loaded = FinancialSnapshot::load(&path).unwrap();
        assert_eq!(loaded, s);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"monthlyIncome\""));
        assert!(raw.contains("\"monthlyInstallment\""));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let mut s = sample_snapshot();
        let dup = s.fixed_expenses[0].clone();
        s.fixed_expenses.push(dup);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, serde_json::to_string(&s).unwrap()).unwrap();

        assert!(matches!(
            FinancialSnapshot::load(&path),
            Err(Error::InvalidData(_))
        ));
    }
}
