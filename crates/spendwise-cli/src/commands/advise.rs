//! Advisory commands
//!
//! Without a configured backend the fixed fallback text is shown, the same
//! as a failed call.

use std::path::Path;

use anyhow::Result;
use spendwise_core::{
    Advisor, Advisory, LifestyleGuide, LifestyleGuideInput, SpendingAdvice, SpendingAdvisorInput,
};

use super::open_snapshot;

/// Build the advisor from the environment, printing a tip when none is configured
pub fn advisor_or_tip() -> Option<Advisor> {
    let advisor = spendwise_server::advisor_from_env();
    if advisor.is_none() {
        println!("   💡 Tip: Set OLLAMA_HOST (or AI_BACKEND=openai_compatible) to get advice");
    }
    advisor
}

pub async fn cmd_advise_spending(path: &Path, data: Option<String>) -> Result<()> {
    let snapshot = open_snapshot(path)?;
    let input = SpendingAdvisorInput::from_snapshot(&snapshot, data);
    input.validate()?;

    println!("🤖 Asking for spending advice...");
    let advisory = match advisor_or_tip() {
        Some(advisor) => advisor.spending_advice(&input).await?,
        None => Advisory::fallback(SpendingAdvice::fallback()),
    };

    print_spending_advice(&advisory);
    Ok(())
}

pub async fn cmd_advise_lifestyle(path: &Path) -> Result<()> {
    let snapshot = open_snapshot(path)?;
    let input = LifestyleGuideInput::from_snapshot(&snapshot)?;
    input.validate()?;

    println!("🤖 Asking for lifestyle advice...");
    let advisory = match advisor_or_tip() {
        Some(advisor) => advisor.lifestyle_guide(&input).await?,
        None => Advisory::fallback(LifestyleGuide::fallback()),
    };

    print_lifestyle_guide(&advisory);
    Ok(())
}

pub fn print_spending_advice(advisory: &Advisory<SpendingAdvice>) {
    println!();
    if advisory.is_fallback() {
        println!("⚠️  {}", advisory.value.advice);
    } else {
        println!("{}", advisory.value.advice);
    }
    println!();
}

pub fn print_lifestyle_guide(advisory: &Advisory<LifestyleGuide>) {
    println!();
    if advisory.is_fallback() {
        println!("⚠️  {}", advisory.value.lifestyle_advice);
        println!("   {}", advisory.value.over_leveraging_tips);
    } else {
        println!("Lifestyle advice:");
        println!("{}", advisory.value.lifestyle_advice);
        println!();
        println!("Avoiding over-leveraging:");
        println!("{}", advisory.value.over_leveraging_tips);
    }
    println!();
}
