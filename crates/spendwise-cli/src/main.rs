//! Spendwise CLI - Personal finance helper
//!
//! Usage:
//!   spendwise init --income 75000     Create a snapshot file
//!   spendwise add expense ...         Record an expense
//!   spendwise dashboard               Spending power, debt tier, breakdown
//!   spendwise advise spending         Ask the AI backend for advice
//!   spendwise serve --port 3000       Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init { income, force } => commands::cmd_init(&cli.file, income, force),
        Commands::Income { amount } => commands::cmd_income(&cli.file, amount),
        Commands::Add { record } => match record {
            AddRecord::Fixed { name, amount } => {
                commands::cmd_add_fixed(&cli.file, &name, amount)
            }
            AddRecord::Goal {
                name,
                amount,
                percentage,
            } => commands::cmd_add_goal(&cli.file, &name, amount, percentage),
            AddRecord::Emi {
                loan_type,
                principal,
                rate,
                tenure,
                installment,
                start,
                end,
            } => commands::cmd_add_emi(
                &cli.file,
                commands::EmiArgs {
                    loan_type,
                    principal,
                    rate,
                    tenure,
                    installment,
                    start,
                    end,
                },
            ),
            AddRecord::Expense {
                description,
                amount,
                category,
                date,
            } => commands::cmd_add_expense(
                &cli.file,
                &description,
                amount,
                &category,
                date.as_deref(),
            ),
        },
        Commands::Remove { kind, id } => commands::cmd_remove(&cli.file, kind, id),
        Commands::List => commands::cmd_list(&cli.file),
        Commands::Dashboard { json } => commands::cmd_dashboard(&cli.file, json),
        Commands::Breakdown => commands::cmd_breakdown(&cli.file),
        Commands::SpendingPower {
            income,
            fixed,
            savings,
            emis,
        } => commands::cmd_spending_power(income, fixed, savings, emis),
        Commands::Analyze { income, emis } => commands::cmd_analyze(income, emis),
        Commands::Advise { kind } => match kind {
            AdviseKind::Spending { data } => commands::cmd_advise_spending(&cli.file, data).await,
            AdviseKind::Lifestyle => commands::cmd_advise_lifestyle(&cli.file).await,
        },
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Ai { action } => match action {
            AiAction::Test => commands::cmd_ai_test().await,
            AiAction::Config => commands::cmd_ai_config(),
        },
        Commands::Serve {
            port,
            host,
            origins,
        } => commands::cmd_serve(&cli.file, &host, port, origins).await,
    }
}
