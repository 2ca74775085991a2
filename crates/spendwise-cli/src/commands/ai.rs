//! AI backend diagnostics

use anyhow::Result;
use spendwise_core::config::default_config_path;
use spendwise_core::{
    AIBackend, AIClient, AdvisorConfig, LifestyleGuideInput, SpendingAdvisorInput, TaskType,
};

use super::{print_lifestyle_guide, print_spending_advice};

/// Test the configured backend and run both contracts once
pub async fn cmd_ai_test() -> Result<()> {
    println!("🔍 Testing AI backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
    println!("  AI_BACKEND: {}", backend);

    if AIClient::from_env().is_none() {
        println!("\n⚠️  No AI backend configured");
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull llama3.2");
        println!("  4. Set environment variable: export OLLAMA_HOST=http://localhost:11434");
        return Ok(());
    }

    let Some(advisor) = spendwise_server::advisor_from_env() else {
        return Ok(());
    };
    let client = advisor.client();
    println!("  Host: {}", client.host());
    println!("  Model: {}", client.model());

    print!("\nChecking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {}", client.host());
        return Ok(());
    }

    println!("\n💸 Testing spending advice...");
    let spending = SpendingAdvisorInput {
        spending_data: "Groceries: 8000, Dining Out: 6500, Shopping: 4000".to_string(),
        income: 60000.0,
        fixed_expenses: 25000.0,
        savings_goal: 8000.0,
        emi_payments: 12000.0,
    };
    let advice = advisor.spending_advice(&spending).await?;
    print_spending_advice(&advice);

    println!("🏠 Testing lifestyle guide...");
    let lifestyle = LifestyleGuideInput {
        spending_power: 15000.0,
        total_monthly_expenses: 43500.0,
        income_to_debt_ratio: 0.2,
    };
    let guide = advisor.lifestyle_guide(&lifestyle).await?;
    print_lifestyle_guide(&guide);

    if advice.is_fallback() || guide.is_fallback() {
        println!("⚠️  At least one call fell back. Run with --verbose for details.");
    } else {
        println!("✅ Both advisory calls succeeded");
    }

    Ok(())
}

/// Show the effective advisor configuration
pub fn cmd_ai_config() -> Result<()> {
    let config = AdvisorConfig::load()?;

    match config.config_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => {
            println!("Config file: (embedded defaults)");
            if let Some(path) = default_config_path() {
                println!("Override at: {}", path.display());
            }
        }
    }
    if let Some(currency) = &config.currency {
        println!("Currency: {}", currency);
    }

    println!();
    println!("{:<18} {:<24} {:>8} {:>12}", "TASK", "MODEL", "TIMEOUT", "TEMPERATURE");
    println!("{}", "-".repeat(65));
    for task in TaskType::all() {
        let task_config = config.for_task(*task);
        println!(
            "{:<18} {:<24} {:>7}s {:>12.2}",
            task.as_str(),
            task_config.model.as_deref().unwrap_or("(backend default)"),
            task_config.timeout.as_secs(),
            task_config.temperature
        );
    }

    Ok(())
}
