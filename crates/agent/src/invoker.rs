//! Tool invoker: runs the helpers a message's intents call for and gathers
//! their output into one block of prompt context.
//!
//! Lookup failures never reach the caller. They are logged and the turn
//! continues without that helper's contribution.

use crate::intent::{extract_expression, Intents};
use nova_core::lookup::{Lookup, LookupOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Candidate articles the encyclopedia may try.
const ENCYCLOPEDIA_CANDIDATES: usize = 3;

const LOOKUP_PREFIX: &str = "\n\nRelevant information:\n";

/// A helper that contributed to a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Calculator,
    VideoSearch,
    Encyclopedia,
    WebSearch,
}

/// Everything the helpers produced for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReport {
    pub results: String,
    pub used: Vec<ToolKind>,
}

impl ToolReport {
    pub fn used_tools(&self) -> bool {
        !self.used.is_empty()
    }

    fn push(&mut self, kind: ToolKind, prefix: &str, text: &str) {
        self.results.push_str(prefix);
        self.results.push_str(text);
        self.used.push(kind);
    }
}

/// Result counts and time limits for the lookups.
#[derive(Debug, Clone, Copy)]
pub struct InvokerLimits {
    pub web_results: usize,
    pub video_results: usize,
    pub timeout: Duration,
}

impl Default for InvokerLimits {
    fn default() -> Self {
        Self {
            web_results: 3,
            video_results: 3,
            timeout: Duration::from_secs(15),
        }
    }
}

impl From<&nova_config::LookupConfig> for InvokerLimits {
    fn from(config: &nova_config::LookupConfig) -> Self {
        Self {
            web_results: config.web_results,
            video_results: config.video_results,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct ToolInvoker {
    encyclopedia: Arc<dyn Lookup>,
    web: Arc<dyn Lookup>,
    video: Arc<dyn Lookup>,
    limits: InvokerLimits,
}

impl ToolInvoker {
    pub fn new(
        encyclopedia: Arc<dyn Lookup>,
        web: Arc<dyn Lookup>,
        video: Arc<dyn Lookup>,
        limits: InvokerLimits,
    ) -> Self {
        Self {
            encyclopedia,
            web,
            video,
            limits,
        }
    }

    /// Run calculator, video search, then encyclopedia-or-web, in that order.
    pub async fn run(&self, input: &str, intents: &Intents) -> ToolReport {
        let mut report = ToolReport::default();

        if intents.calculation {
            match extract_expression(input).map(|expr| nova_tools::calculate(&expr)) {
                Some(Ok(calc)) => report.push(ToolKind::Calculator, "\n\n", &calc.to_string()),
                Some(Err(e)) => debug!(error = %e, "No usable expression"),
                None => debug!("Calculation intent without an expression"),
            }
        }

        if intents.video {
            let outcome = self
                .lookup(self.video.as_ref(), input, self.limits.video_results)
                .await;
            if let LookupOutcome::Found(text) = outcome {
                report.push(ToolKind::VideoSearch, "\n\n", &text);
            }
        }

        if intents.wants_lookup() {
            let outcome = self
                .lookup(self.encyclopedia.as_ref(), input, ENCYCLOPEDIA_CANDIDATES)
                .await;
            if let LookupOutcome::Found(text) = outcome {
                report.push(ToolKind::Encyclopedia, LOOKUP_PREFIX, &text);
            } else {
                let outcome = self
                    .lookup(self.web.as_ref(), input, self.limits.web_results)
                    .await;
                if let LookupOutcome::Found(text) = outcome {
                    report.push(ToolKind::WebSearch, LOOKUP_PREFIX, &text);
                }
            }
        }

        debug!(tools = ?report.used, "Tools finished");
        report
    }

    /// One bounded lookup call, normalised to an outcome.
    async fn lookup(&self, helper: &dyn Lookup, query: &str, max_results: usize) -> LookupOutcome {
        let call = helper.lookup(query, max_results);
        let outcome = match tokio::time::timeout(self.limits.timeout, call).await {
            Ok(result) => LookupOutcome::from(result),
            Err(_) => LookupOutcome::Failed(format!(
                "timed out after {}s",
                self.limits.timeout.as_secs()
            )),
        };

        match &outcome {
            LookupOutcome::Failed(reason) => {
                warn!(tool = %helper.name(), kind = %helper.kind(), reason = %reason, "Lookup failed");
            }
            LookupOutcome::Empty => debug!(tool = %helper.name(), "Lookup found nothing"),
            LookupOutcome::Found(_) => debug!(tool = %helper.name(), "Lookup found results"),
        }
        outcome
    }
}
