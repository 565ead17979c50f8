use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{AnalysisError, DispatchError, ValidationError},
    navigation::NavigationState,
    request::AnalysisRequest,
    types::{AnalysisResult, SubmissionKind},
};

/// Identity of one accepted submission. Generations increase strictly within
/// a state machine, so a resolution can always be matched to its submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket {
    pub id: Uuid,
    pub generation: u64,
    pub kind: SubmissionKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Loading {
        ticket: SubmissionTicket,
    },
    Success {
        result: AnalysisResult,
        kind: SubmissionKind,
    },
    Failed {
        error: AnalysisError,
    },
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Loading { .. } => "loading",
            AnalysisState::Success { .. } => "success",
            AnalysisState::Failed { .. } => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("A {} analysis is already in progress", ticket.kind)]
    InFlight { ticket: SubmissionTicket },

    #[error("A result is being shown; go back before submitting again")]
    ResultShowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// Owns the request lifecycle and the navigation state derived from it.
///
/// `Idle`/`Failed` accept a submit, `Loading` refuses further submits until
/// its ticket resolves, and `back` returns to `Idle` from anywhere else.
#[derive(Debug, Default)]
pub struct AnalysisStateMachine {
    state: AnalysisState,
    navigation: NavigationState,
    last_generation: u64,
}

impl AnalysisStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn submit(
        &mut self,
        request: &AnalysisRequest,
    ) -> Result<SubmissionTicket, SubmitRejected> {
        match &self.state {
            AnalysisState::Loading { ticket } => {
                warn!(
                    generation = ticket.generation,
                    kind = %ticket.kind,
                    "rejected submit while a request is in flight"
                );
                return Err(SubmitRejected::InFlight { ticket: *ticket });
            }
            AnalysisState::Success { .. } => return Err(SubmitRejected::ResultShowing),
            AnalysisState::Idle | AnalysisState::Failed { .. } => {}
        }

        self.last_generation += 1;
        let ticket = SubmissionTicket {
            id: Uuid::new_v4(),
            generation: self.last_generation,
            kind: request.kind(),
        };
        self.navigation.select_tab(ticket.kind);
        self.state = AnalysisState::Loading { ticket };
        info!(
            id = %ticket.id,
            generation = ticket.generation,
            kind = %ticket.kind,
            "submitted analysis"
        );

        Ok(ticket)
    }

    /// Apply the outcome of `ticket`'s dispatch. Outcomes for any ticket other
    /// than the one currently loading are discarded.
    pub fn resolve(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, DispatchError>,
    ) -> Resolution {
        let current = match &self.state {
            AnalysisState::Loading { ticket } => Some(*ticket),
            _ => None,
        };
        if current != Some(ticket) {
            warn!(
                generation = ticket.generation,
                kind = %ticket.kind,
                state = self.state.name(),
                "discarded stale analysis response"
            );
            return Resolution::Stale;
        }

        self.state = match outcome {
            Ok(result) => {
                info!(generation = ticket.generation, kind = %ticket.kind, "analysis succeeded");
                AnalysisState::Success {
                    result,
                    kind: ticket.kind,
                }
            }
            Err(error) => {
                info!(generation = ticket.generation, error = %error, "analysis failed");
                AnalysisState::Failed {
                    error: error.into(),
                }
            }
        };
        Resolution::Applied
    }

    /// Record input that failed validation. Ignored while loading or showing
    /// a result, where the input controls are not reachable.
    pub fn reject_input(&mut self, error: ValidationError) -> bool {
        match self.state {
            AnalysisState::Idle | AnalysisState::Failed { .. } => {
                debug!(error = %error, "input rejected");
                self.state = AnalysisState::Failed {
                    error: error.into(),
                };
                true
            }
            _ => false,
        }
    }

    /// Drop any held result, error or in-flight ticket and restore navigation
    /// defaults. Returns false when already idle.
    pub fn back(&mut self) -> bool {
        if matches!(self.state, AnalysisState::Idle) {
            return false;
        }
        if let AnalysisState::Loading { ticket } = &self.state {
            info!(generation = ticket.generation, "abandoned in-flight analysis");
        }

        self.state = AnalysisState::Idle;
        self.navigation.reset();
        true
    }
}
