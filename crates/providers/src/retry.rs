//! Rate-limit retry: a bounded, linearly backed-off model client.
//!
//! Attempt `n` that fails with a rate-limit-class error sleeps
//! `retry_delay * n` before attempt `n + 1`, up to `max_retries` attempts in
//! total. Any other failure is returned immediately.

use nova_core::error::ProviderError;
use nova_core::provider::{GenerateRequest, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How hard to push against a rate-limited endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (the first call included)
    pub max_retries: u32,
    /// Base delay; multiplied by the failed attempt's index
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(5))
    }
}

impl From<&nova_config::RetryConfig> for RetryPolicy {
    fn from(config: &nova_config::RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_secs(config.delay_secs))
    }
}

/// What a model call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// The generated text
    Text(String),
    /// Every attempt was rate limited
    Exhausted { attempts: u32 },
}

/// Issues prompts to a provider with fixed model settings and retry policy.
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    policy: RetryPolicy,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            policy: RetryPolicy::default(),
        }
    }

    /// Build a client from the application config.
    pub fn from_config(provider: Arc<dyn Provider>, config: &nova_config::AppConfig) -> Self {
        Self::new(provider, &config.model, config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_policy(RetryPolicy::from(&config.retry))
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate a reply for `prompt`.
    ///
    /// Rate-limit exhaustion is a normal outcome ([`ModelReply::Exhausted`]);
    /// every other provider failure is returned as an error.
    pub async fn generate(&self, prompt: &str) -> Result<ModelReply, ProviderError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut attempt = 1;
        loop {
            debug!(
                provider = %self.provider.name(),
                model = %self.model,
                attempt,
                max = self.policy.max_retries,
                "Model call"
            );

            match self.provider.generate(request.clone()).await {
                Ok(response) => return Ok(ModelReply::Text(response.text)),
                Err(e) if e.is_rate_limit() => {
                    if attempt >= self.policy.max_retries {
                        warn!(attempts = attempt, error = %e, "Rate limit retries exhausted");
                        return Ok(ModelReply::Exhausted { attempts: attempt });
                    }
                    let delay = self.policy.delay_for(attempt);
                    info!(
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        error = %e,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Model call failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nova_core::provider::GenerateResponse;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// A provider that plays back scripted results and records call times.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<String, ProviderError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn rate_limited_then_ok(failures: usize) -> Self {
            let mut script: Vec<Result<String, ProviderError>> = (0..failures)
                .map(|_| Err(ProviderError::RateLimited("429 Too Many Requests".into())))
                .collect();
            script.push(Ok("Here is your answer".into()));
            Self::new(script)
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            request: GenerateRequest,
        ) -> Result<GenerateResponse, ProviderError> {
            self.calls.lock().unwrap().push(Instant::now());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ProviderError::NotConfigured("script exhausted".into())));
            next.map(|text| GenerateResponse {
                text,
                model: request.model,
                usage: None,
            })
        }
    }

    fn client(provider: Arc<ScriptedProvider>, max_retries: u32) -> ModelClient {
        ModelClient::new(provider, "gemini-2.5-flash", 0.7)
            .with_policy(RetryPolicy::new(max_retries, Duration::from_secs(5)))
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let provider = Arc::new(ScriptedProvider::rate_limited_then_ok(0));
        let reply = client(provider.clone(), 2).generate("hi").await.unwrap();
        assert_eq!(reply, ModelReply::Text("Here is your answer".into()));
        assert_eq!(provider.call_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn two_rate_limits_exhaust_default_policy() {
        let provider = Arc::new(ScriptedProvider::rate_limited_then_ok(2));
        let reply = client(provider.clone(), 2).generate("hi").await.unwrap();
        assert_eq!(reply, ModelReply::Exhausted { attempts: 2 });

        let times = provider.call_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times[1] - times[0], Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn three_attempts_reach_success_with_linear_backoff() {
        let provider = Arc::new(ScriptedProvider::rate_limited_then_ok(2));
        let reply = client(provider.clone(), 3).generate("hi").await.unwrap();
        assert_eq!(reply, ModelReply::Text("Here is your answer".into()));

        let times = provider.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(5));
        assert_eq!(times[2] - times[1], Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn non_rate_limit_error_propagates_without_sleeping() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::AuthenticationFailed("bad key".into())),
            Ok("never reached".into()),
        ]));
        let start = Instant::now();
        let err = client(provider.clone(), 3).generate("hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
        assert_eq!(provider.call_times().len(), 1);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn quota_message_counts_as_rate_limit() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::ApiError {
                status_code: 400,
                message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
            }),
            Ok("recovered".into()),
        ]));
        let reply = client(provider.clone(), 2).generate("hi").await.unwrap();
        assert_eq!(reply, ModelReply::Text("recovered".into()));
    }

    #[test]
    fn policy_never_allows_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn policy_from_config() {
        let policy = RetryPolicy::from(&nova_config::RetryConfig::default());
        assert_eq!(policy, RetryPolicy::default());
    }
}
