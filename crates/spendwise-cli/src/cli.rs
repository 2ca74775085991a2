//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

/// Spendwise - Know what you can spend
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Personal finance helper: spending power, debt health and advice", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Snapshot file
    #[arg(long, default_value = "spendwise.json", global = true)]
    pub file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty snapshot file
    Init {
        /// Monthly income to start with
        #[arg(long, default_value = "0")]
        income: f64,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Set the monthly income
    Income {
        /// Net monthly income
        amount: f64,
    },

    /// Add a record to the snapshot
    Add {
        #[command(subcommand)]
        record: AddRecord,
    },

    /// Remove a record by id (edit = remove + add)
    Remove {
        /// Kind of record
        #[arg(value_enum)]
        kind: RecordKind,

        /// Record id (see `spendwise list`)
        id: Uuid,
    },

    /// List every record with its id
    List,

    /// Show dashboard summary
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show expense totals per category
    Breakdown,

    /// Compute spending power from explicit figures
    SpendingPower {
        #[arg(long)]
        income: f64,
        #[arg(long, default_value = "0")]
        fixed: f64,
        #[arg(long, default_value = "0")]
        savings: f64,
        #[arg(long, default_value = "0")]
        emis: f64,
    },

    /// EMI & salary analysis from explicit figures
    Analyze {
        #[arg(long)]
        income: f64,
        /// Total monthly EMIs
        #[arg(long)]
        emis: f64,
    },

    /// Ask the AI backend for advice on the snapshot
    Advise {
        #[command(subcommand)]
        kind: AdviseKind,
    },

    /// Manage AI prompts (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// AI backend diagnostics
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Start the web server with the snapshot loaded
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "origin")]
        origins: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AddRecord {
    /// Recurring fixed monthly expense (rent, insurance, ...)
    Fixed {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
    },

    /// Monthly savings goal
    Goal {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        /// Mark the amount as a percentage of income (stored only)
        #[arg(long)]
        percentage: bool,
    },

    /// Loan repaid in equated monthly installments
    Emi {
        /// Loan type (e.g. "Home Loan")
        #[arg(long)]
        loan_type: String,
        #[arg(long)]
        principal: f64,
        /// Annual interest rate, in percent
        #[arg(long)]
        rate: f64,
        /// Tenure in months
        #[arg(long)]
        tenure: u32,
        /// Monthly installment
        #[arg(long)]
        installment: f64,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },

    /// Day-to-day expense
    Expense {
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: f64,
        /// Groceries, Utilities, Transport, Entertainment, Healthcare,
        /// Education, Dining Out, Shopping, Travel, Other
        #[arg(long)]
        category: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RecordKind {
    Fixed,
    Goal,
    Emi,
    Expense,
}

#[derive(Subcommand)]
pub enum AdviseKind {
    /// Suggestions for reducing spending
    Spending {
        /// Free-text description of spending (defaults to the category breakdown)
        #[arg(long)]
        data: Option<String>,
    },

    /// Lifestyle advice and over-leveraging tips
    Lifestyle,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., spending_advisor, lifestyle_guide)
        prompt_id: String,
    },

    /// Show the override directory path
    Path,
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Check the configured backend and run both contracts once
    Test,

    /// Show the effective advisor configuration
    Config,
}
