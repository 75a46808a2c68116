//! Resolution engine: turns a dispute plus its evidence into a terminal
//! `Decision`, either through the reasoning provider or from a human
//! validator's payload. Persistence happens in the caller; this module
//! holds no state, so a failed call can simply be retried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::prompt;
use crate::provider::ReasoningProvider;
use crate::types::{Decision, Dispute, DisputeKind, Evidence, ResolutionMethod};

/// Decider identity recorded on AI decisions.
pub const AI_DECIDER: &str = "ai-agent";
/// Default decider identity when a human omits their own.
pub const DEFAULT_HUMAN_DECIDER: &str = "human-validator";

/// Verdict entered directly by a human validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanDecision {
    pub winner: String,
    pub reason: String,
    #[serde(default, alias = "decidedBy")]
    pub decided_by: Option<String>,
}

/// Produce a decision for `dispute`.
///
/// The AI branch requires a provider and makes exactly one call to it; a
/// failed call is folded into the decision reason so the dispute still
/// reaches a terminal state. AI decisions carry no winner; the narrative
/// analysis is the verdict.
pub async fn resolve(
    dispute: &Dispute,
    evidence: &[Evidence],
    method: ResolutionMethod,
    human: Option<HumanDecision>,
    provider: Option<&dyn ReasoningProvider>,
    now: DateTime<Utc>,
) -> Result<Decision, DomainError> {
    match method {
        ResolutionMethod::Human => {
            let human = human.ok_or_else(|| {
                DomainError::Validation(
                    "human resolution requires a decision payload".into(),
                )
            })?;
            if !dispute.is_party(&human.winner) {
                return Err(DomainError::Validation(format!(
                    "winner {} is not a party to dispute {}",
                    human.winner, dispute.id
                )));
            }
            Ok(Decision {
                winner: Some(human.winner),
                reason: human.reason,
                decided_at: now,
                decided_by: human
                    .decided_by
                    .unwrap_or_else(|| DEFAULT_HUMAN_DECIDER.to_string()),
            })
        }
        ResolutionMethod::Ai => {
            let provider = provider.ok_or_else(|| {
                DomainError::ProviderUnavailable(
                    "AI resolution requires a configured reasoning provider".into(),
                )
            })?;
            let user_prompt = match dispute.kind {
                DisputeKind::Bet => prompt::bet_prompt(dispute),
                DisputeKind::Promise => {
                    let (creator, opponent) = prompt::partition_evidence(dispute, evidence);
                    prompt::promise_prompt(dispute, &creator, &opponent)
                }
            };

            let reason = match provider.ask(&user_prompt, prompt::SYSTEM_PROMPT).await {
                Ok(text) => text,
                // Recovered locally: the dispute must never stay stuck
                // because the provider call failed.
                Err(e) => format!("AI analysis error: {e}"),
            };

            Ok(Decision {
                winner: None,
                reason,
                decided_at: now,
                decided_by: AI_DECIDER.to_string(),
            })
        }
    }
}
