//! Mock backend for testing
//!
//! Provides configurable responses for both advisory contracts.
//! Useful for unit tests and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{
    BackendInfo, LifestyleGuide, LifestyleGuideInput, SpendingAdvice, SpendingAdvisorInput,
    NO_SPENDING_DATA,
};
use super::AIBackend;

/// How the mock answers advisory calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockMode {
    /// Well-formed answers derived from the input
    #[default]
    Valid,
    /// Answers that break the output contract
    InvalidResponse,
    /// Every call fails as if the server were unreachable
    Unavailable,
}

/// Mock AI backend for testing
///
/// Returns predictable responses derived from the input figures. An optional
/// delay lets tests exercise timeouts and stale-result handling.
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    pub mode: MockMode,
    pub delay: Option<Duration>,
    model: String,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            mode: MockMode::Valid,
            delay: None,
            model: "mock".to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an unhealthy mock backend whose calls all fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            mode: MockMode::Unavailable,
            ..Self::new()
        }
    }

    pub fn with_mode(mut self, mode: MockMode) -> Self {
        self.mode = mode;
        self
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of advisory calls received (shared between clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.mode == MockMode::Unavailable {
            return Err(Error::InvalidData("mock backend unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn spending_advice(&self, input: &SpendingAdvisorInput) -> Result<SpendingAdvice> {
        self.begin_call().await?;
        if self.mode == MockMode::InvalidResponse {
            return Err(Error::InvalidResponse(
                "Invalid spending advice JSON: missing field `advice`".into(),
            ));
        }

        let focus = if input.spending_data.trim().is_empty() {
            NO_SPENDING_DATA.to_string()
        } else {
            format!("Based on: {}.", input.spending_data.trim())
        };

        Ok(SpendingAdvice {
            advice: format!(
                "{} With {} of EMIs on an income of {}, trim discretionary categories first.",
                focus, input.emi_payments, input.income
            ),
        })
    }

    async fn lifestyle_guide(&self, input: &LifestyleGuideInput) -> Result<LifestyleGuide> {
        self.begin_call().await?;
        if self.mode == MockMode::InvalidResponse {
            return Err(Error::InvalidResponse(
                "Invalid lifestyle guide JSON: missing field `overLeveragingTips`".into(),
            ));
        }

        let lifestyle_advice = if input.spending_power < 0.0 {
            format!(
                "Your commitments exceed income by {}. Cut back before adding anything new.",
                -input.spending_power
            )
        } else {
            format!(
                "You have {} left each month. Keep lifestyle costs within it.",
                input.spending_power
            )
        };

        Ok(LifestyleGuide {
            lifestyle_advice,
            over_leveraging_tips: format!(
                "Your debt ratio is {}. Avoid new loans that push it past 0.36.",
                input.income_to_debt_ratio
            ),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            backend: "mock",
            host: self.host().to_string(),
            model: self.model.clone(),
            task_models: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spending_input(data: &str) -> SpendingAdvisorInput {
        SpendingAdvisorInput {
            spending_data: data.to_string(),
            income: 75000.0,
            fixed_expenses: 30000.0,
            savings_goal: 10000.0,
            emi_payments: 15000.0,
        }
    }

    #[tokio::test]
    async fn test_mock_spending_advice_uses_input() {
        let mock = MockBackend::new();
        let advice = mock.spending_advice(&spending_input("")).await.unwrap();
        assert!(advice.advice.starts_with(NO_SPENDING_DATA));

        let advice = mock
            .spending_advice(&spending_input("Dining Out: 12000"))
            .await
            .unwrap();
        assert!(advice.advice.contains("Dining Out: 12000"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_lifestyle_negative_power() {
        let mock = MockBackend::new();
        let guide = mock
            .lifestyle_guide(&LifestyleGuideInput {
                spending_power: -2500.0,
                total_monthly_expenses: 50000.0,
                income_to_debt_ratio: 0.6,
            })
            .await
            .unwrap();
        assert!(guide.lifestyle_advice.contains("exceed income by 2500"));
        assert!(guide.over_leveraging_tips.contains("0.6"));
    }

    #[tokio::test]
    async fn test_mock_failure_modes() {
        let broken = MockBackend::new().with_mode(MockMode::InvalidResponse);
        assert!(matches!(
            broken.spending_advice(&spending_input("")).await,
            Err(Error::InvalidResponse(_))
        ));

        let down = MockBackend::unhealthy();
        assert!(!down.health_check().await);
        assert!(down.spending_advice(&spending_input("")).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_call_count_shared_between_clones() {
        let mock = MockBackend::new();
        let clone = mock.clone();
        clone.spending_advice(&spending_input("")).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }
}
