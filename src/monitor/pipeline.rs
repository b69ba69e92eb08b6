use crate::gate::{GateDecision, TriggerGate};
use crate::matcher::MatchEngine;
use crate::models::{AppIdentifier, Timestamp, UsageSample};
use crate::resolver::ForegroundResolver;
use std::time::Duration;

/// One tick's worth of work: resolve the foreground app, match it against the
/// blocklist snapshot, and feed the result to the gate.
#[derive(Debug, Clone)]
pub struct Pipeline {
    resolver: ForegroundResolver,
    engine: MatchEngine,
}

impl Pipeline {
    pub fn new(resolver: ForegroundResolver, engine: MatchEngine) -> Self {
        Self { resolver, engine }
    }

    pub fn lookback(&self) -> Duration {
        self.resolver.lookback()
    }

    pub fn evaluate(
        &self,
        gate: &mut TriggerGate,
        samples: &[UsageSample],
        blocklist: &[AppIdentifier],
        now: Timestamp,
    ) -> GateDecision {
        let resolved = self.resolver.resolve(samples, now);
        let matched = resolved
            .as_ref()
            .and_then(|app_id| self.engine.matches(app_id, blocklist));
        gate.observe(resolved.as_ref(), matched.as_ref())
    }
}
