//! Advisory request handling
//!
//! [`Advisor`] wraps an [`AIClient`] with per-task timeouts and turns every
//! generation failure into the contract's fixed fallback text. Callers only
//! see errors for invalid input.
//!
//! [`AdvisorySlot`] holds the latest displayed result for one contract and
//! makes sure a slow, superseded call can never overwrite a newer one.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::ai::{
    AIBackend, AIClient, LifestyleGuide, LifestyleGuideInput, SpendingAdvice,
    SpendingAdvisorInput,
};
use crate::config::{AdvisorConfig, TaskType};
use crate::error::{Error, Result};

pub const SPENDING_ADVICE_FALLBACK: &str =
    "Sorry, I couldn't generate advice at this time. Please try again later.";
pub const LIFESTYLE_ADVICE_FALLBACK: &str = "Could not fetch advice.";
pub const OVER_LEVERAGING_FALLBACK: &str = "Please check your connection and try again.";

impl SpendingAdvice {
    pub fn fallback() -> Self {
        Self {
            advice: SPENDING_ADVICE_FALLBACK.to_string(),
        }
    }
}

impl LifestyleGuide {
    /// Both fields fall back together
    pub fn fallback() -> Self {
        Self {
            lifestyle_advice: LIFESTYLE_ADVICE_FALLBACK.to_string(),
            over_leveraging_tips: OVER_LEVERAGING_FALLBACK.to_string(),
        }
    }
}

/// Where an advisory value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryStatus {
    Generated,
    Fallback,
}

/// An advisory result: generated text or the fixed fallback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory<T> {
    #[serde(flatten)]
    pub value: T,
    pub status: AdvisoryStatus,
}

impl<T> Advisory<T> {
    pub fn generated(value: T) -> Self {
        Self {
            value,
            status: AdvisoryStatus::Generated,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            status: AdvisoryStatus::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.status == AdvisoryStatus::Fallback
    }
}

/// Runs advisory calls against a backend with timeouts and fallbacks
#[derive(Clone)]
pub struct Advisor {
    client: AIClient,
    config: Arc<AdvisorConfig>,
}

impl Advisor {
    pub fn new(client: AIClient, config: AdvisorConfig) -> Self {
        let config = Arc::new(config);
        Self {
            client: client.with_config(config.clone()),
            config,
        }
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Personalized suggestions for reducing spending
    ///
    /// Returns `Err` only for invalid input. Backend failures and timeouts
    /// yield the fallback text.
    pub async fn spending_advice(
        &self,
        input: &SpendingAdvisorInput,
    ) -> Result<Advisory<SpendingAdvice>> {
        input.validate()?;
        let result = self
            .with_timeout(TaskType::SpendingAdvice, self.client.spending_advice(input))
            .await;
        Ok(settle(TaskType::SpendingAdvice, result, SpendingAdvice::fallback))
    }

    /// Lifestyle advice and over-leveraging tips
    ///
    /// A response missing either field falls back as a pair.
    pub async fn lifestyle_guide(
        &self,
        input: &LifestyleGuideInput,
    ) -> Result<Advisory<LifestyleGuide>> {
        input.validate()?;
        let result = self
            .with_timeout(TaskType::LifestyleGuide, self.client.lifestyle_guide(input))
            .await;
        Ok(settle(TaskType::LifestyleGuide, result, LifestyleGuide::fallback))
    }

    async fn with_timeout<T, F>(&self, task: TaskType, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.config.timeout_for_task(task);
        debug!(task = %task, model = self.client.model(), ?timeout, "Starting advisory call");
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout.as_secs())),
        }
    }
}

fn settle<T>(task: TaskType, result: Result<T>, fallback: impl FnOnce() -> T) -> Advisory<T> {
    match result {
        Ok(value) => Advisory::generated(value),
        Err(e) => {
            warn!(task = %task, error = %e, "Advisory call failed, using fallback");
            Advisory::fallback(fallback())
        }
    }
}

/// Identifies one call issued through an [`AdvisorySlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct SlotState<T> {
    latest: u64,
    in_flight: bool,
    current: Option<Advisory<T>>,
}

/// Latest displayed result for one advisory contract
///
/// Each [`begin`](Self::begin) issues a higher ticket. Only the holder of the
/// latest ticket may store a result; anything older is discarded. A fallback
/// never replaces a previously generated result.
#[derive(Debug)]
pub struct AdvisorySlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for AdvisorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AdvisorySlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                latest: 0,
                in_flight: false,
                current: None,
            }),
        }
    }
}

impl<T: Clone> AdvisorySlot<T> {
    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        // Poisoning is ignored; the state is plain data
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a call, superseding any call already in flight
    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        state.latest += 1;
        state.in_flight = true;
        Ticket(state.latest)
    }

    /// Start a call unless one is already in flight
    pub fn try_begin(&self) -> Option<Ticket> {
        let mut state = self.lock();
        if state.in_flight {
            return None;
        }
        state.latest += 1;
        state.in_flight = true;
        Some(Ticket(state.latest))
    }

    /// Finish a call. Returns whether the value was stored.
    pub fn complete(&self, ticket: Ticket, advisory: Advisory<T>) -> bool {
        let mut state = self.lock();
        if ticket.0 != state.latest {
            debug!(ticket = ticket.0, latest = state.latest, "Discarding stale advisory result");
            return false;
        }
        state.in_flight = false;

        let keep_previous = advisory.is_fallback()
            && state
                .current
                .as_ref()
                .is_some_and(|c| c.status == AdvisoryStatus::Generated);
        if keep_previous {
            return false;
        }

        state.current = Some(advisory);
        true
    }

    pub fn current(&self) -> Option<Advisory<T>> {
        self.lock().current.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Begin, await `call`, then complete with its result
    pub async fn run<F>(&self, call: F) -> Advisory<T>
    where
        F: Future<Output = Advisory<T>>,
    {
        let ticket = self.begin();
        let advisory = call.await;
        self.complete(ticket, advisory.clone());
        advisory
    }
}
