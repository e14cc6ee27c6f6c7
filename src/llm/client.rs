use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::error::PipelineError;
use crate::llm::limiter::RateLimiter;
use crate::llm::provider::CompletionProvider;

/// Configuration for the rate-limited completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Primary model (OpenRouter format)
    pub model: String,
    /// Fallback model tried once after the primary's retries are exhausted
    pub fallback_model: String,
    /// Sustained requests per second across all callers
    pub rate_limit_rps: f64,
    /// Burst capacity of the shared token bucket
    pub rate_limit_burst: u32,
    /// Retry attempts per model after the first failure
    pub max_retries: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Multiplier applied to the delay on each retry
    pub backoff_factor: f64,
    /// Cap on the retry delay
    pub max_delay: Duration,
    /// Per-call timeout
    pub request_timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            fallback_model: "openai/gpt-3.5-turbo".to_string(),
            rate_limit_rps: 0.5,
            rate_limit_burst: 10,
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// The single gateway to the completion provider. Every stage that needs a
/// completion goes through [`CompletionClient::complete`]; no stage issues a
/// raw network call.
///
/// Internally: shared token-bucket rate limiting, a per-call timeout,
/// exponential backoff with jitter, and a one-shot fallback model after the
/// primary model's retries are exhausted. Responses are parsed into the
/// requested schema at this boundary so untyped JSON never reaches merge
/// logic.
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    limiter: RateLimiter,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: CompletionConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit_rps, config.rate_limit_burst),
            provider,
            config,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Issue a completion and parse the response as `T`.
    pub async fn complete<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T, PipelineError> {
        let models = [
            self.config.model.as_str(),
            self.config.fallback_model.as_str(),
        ];

        let mut last_error = None;
        for (i, model) in models.iter().enumerate() {
            // The fallback model gets a single attempt
            let attempts = if i == 0 { self.config.max_retries + 1 } else { 1 };

            match self
                .complete_with_model::<T>(model, system, user, attempts)
                .await
            {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if i == 0 {
                        warn!("Model {} failed: {}. Trying fallback model...", model, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PipelineError::CompletionProvider("no models configured".to_string())
        }))
    }

    async fn complete_with_model<T: DeserializeOwned>(
        &self,
        model: &str,
        system: &str,
        user: &str,
        attempts: u32,
    ) -> Result<T, PipelineError> {
        let mut last_error: Option<PipelineError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry_delay(attempt - 1);
                warn!(
                    "Completion attempt {} on {} failed: {}. Retrying in {:.2}s...",
                    attempt,
                    model,
                    last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            self.limiter.acquire().await;

            let call = self.provider.complete(model, system, user);
            let outcome = match tokio::time::timeout(self.config.request_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::CompletionTimeout(
                    self.config.request_timeout,
                )),
            };

            match outcome.and_then(|text| parse_structured::<T>(&text)) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        if let Some(e) = &last_error {
            error!(
                "Completion failed after {} attempts on {}: {}",
                attempts, model, e
            );
        }
        Err(last_error.unwrap_or_else(|| {
            PipelineError::CompletionProvider("unknown completion failure".to_string())
        }))
    }

    /// `min(initial * factor^attempt, max)` with ±25% jitter.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay.as_secs_f64()
            * self.config.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.config.max_delay.as_secs_f64());
        let jitter = capped * 0.25 * rand::thread_rng().gen_range(-1.0..1.0);
        Duration::from_secs_f64((capped + jitter).max(0.1))
    }
}

/// Parse provider output as `T`, tolerating markdown code fences some models
/// wrap around JSON despite the response-format instruction.
fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, PipelineError> {
    let trimmed = strip_code_fences(text);
    serde_json::from_str(trimmed).map_err(|e| PipelineError::MalformedOutput(e.to_string()))
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim().strip_suffix("```").unwrap_or(rest).trim()
}
