use crate::models::AppIdentifier;

/// Where the gate is in the current blocked session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    Triggered(AppIdentifier),
}

/// What a single observation did to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// A new blocked session began: activate the corrective UI and notify.
    Fire { app_id: AppIdentifier, keyword: AppIdentifier },
    /// Same blocked app still in the foreground.
    Suppressed,
    /// The user left the blocked app.
    Cleared,
    /// Nothing changed.
    Unchanged,
}

/// Guards against re-triggering while the same blocked app stays in front.
///
/// `Idle -> Triggered(A)` and `Triggered(A) -> Triggered(B)` fire; staying on A
/// is suppressed; moving to an unblocked app clears; an unresolved tick
/// changes nothing.
#[derive(Debug, Default)]
pub struct TriggerGate {
    state: GateState,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Feed one tick's resolution and match result.
    ///
    /// `resolved` is `None` when the resolver could not determine a foreground
    /// app; `matched` is the keyword `resolved` matched, if any.
    pub fn observe(
        &mut self,
        resolved: Option<&AppIdentifier>,
        matched: Option<&AppIdentifier>,
    ) -> GateDecision {
        let Some(app_id) = resolved else {
            return GateDecision::Unchanged;
        };

        let in_session = matches!(&self.state, GateState::Triggered(current) if current == app_id);

        match (matched, in_session) {
            (Some(_), true) => GateDecision::Suppressed,
            (Some(keyword), false) => {
                self.state = GateState::Triggered(app_id.clone());
                GateDecision::Fire {
                    app_id: app_id.clone(),
                    keyword: keyword.clone(),
                }
            }
            (None, _) if self.state == GateState::Idle => GateDecision::Unchanged,
            (None, _) => {
                self.state = GateState::Idle;
                GateDecision::Cleared
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}
