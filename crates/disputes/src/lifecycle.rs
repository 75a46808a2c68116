//! Dispute lifecycle controller: creation defaults, forward-only status
//! progression, and the one-time decision write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{
    new_dispute_id, Decision, Dispute, DisputeKind, DisputeStatus, ResolutionMethod,
    ValidatorType,
};

/// Validator identity recorded on AI-adjudicated disputes.
pub const AI_VALIDATOR_ID: &str = "ai-agent";

/// Caller-supplied fields for a new dispute. Validator fields are only
/// honored for Promise disputes; Bets are always AI-adjudicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisputeDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DisputeKind,
    #[serde(default)]
    pub description: String,
    pub opponent_id: String,
    pub creator_position: Option<String>,
    pub opponent_position: Option<String>,
    pub stake_amount: f64,
    pub opponent_stake_amount: f64,
    pub token: String,
    pub validator_type: Option<ValidatorType>,
    pub validator_id: Option<String>,
    pub resolution_method: Option<ResolutionMethod>,
    pub deadline: Option<DateTime<Utc>>,
    pub evidence_requirements: Option<String>,
    pub creator_wallet: Option<String>,
    pub opponent_wallet: Option<String>,
}

/// Validate a draft and produce a new `Draft`-status dispute.
///
/// Derivation rules: Bet disputes are forced to AI adjudication no matter
/// what the caller supplied. Promise disputes keep caller-supplied
/// validator fields, defaulting the validator type to `pending`; a
/// validator id is only retained when the validator is human.
pub fn open_dispute(
    creator_id: &str,
    draft: DisputeDraft,
    now: DateTime<Utc>,
) -> Result<Dispute, DomainError> {
    if draft.title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    if draft.token.trim().is_empty() {
        return Err(DomainError::Validation("token must not be empty".into()));
    }
    if draft.opponent_id == creator_id {
        return Err(DomainError::Validation(
            "creator and opponent must be distinct parties".into(),
        ));
    }
    check_stake("stake_amount", draft.stake_amount)?;
    check_stake("opponent_stake_amount", draft.opponent_stake_amount)?;

    let (validator_type, validator_id, resolution_method) = match draft.kind {
        DisputeKind::Bet => (
            ValidatorType::Ai,
            Some(AI_VALIDATOR_ID.to_string()),
            Some(ResolutionMethod::Ai),
        ),
        DisputeKind::Promise => {
            let vt = draft.validator_type.unwrap_or(ValidatorType::Pending);
            let vid = if vt == ValidatorType::Human {
                draft.validator_id
            } else {
                None
            };
            (vt, vid, draft.resolution_method)
        }
    };

    Ok(Dispute {
        id: new_dispute_id(now),
        title: draft.title,
        kind: draft.kind,
        description: draft.description,
        creator_id: creator_id.to_string(),
        opponent_id: draft.opponent_id,
        creator_position: draft.creator_position,
        opponent_position: draft.opponent_position,
        validator_id,
        validator_type,
        resolution_method,
        status: DisputeStatus::Draft,
        stake_amount: draft.stake_amount,
        opponent_stake_amount: draft.opponent_stake_amount,
        token: draft.token,
        creator_wallet: draft.creator_wallet,
        opponent_wallet: draft.opponent_wallet,
        escrow_tx_id: None,
        payout_tx_id: None,
        deadline: draft.deadline,
        evidence_requirements: draft.evidence_requirements,
        decision: None,
        created_at: now,
        funded_at: None,
        evidence_submitted_at: None,
        in_review_at: None,
        resolved_at: None,
    })
}

fn check_stake(field: &str, amount: f64) -> Result<(), DomainError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(DomainError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Move a dispute forward to `to`, stamping the matching lifecycle
/// timestamp the first time the state is reached. Backward moves are
/// rejected; re-asserting the current status is a no-op.
pub fn advance_status(
    dispute: &mut Dispute,
    to: DisputeStatus,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if to.rank() < dispute.status.rank() {
        return Err(DomainError::Validation(format!(
            "cannot move dispute {} from {} back to {}",
            dispute.id,
            dispute.status.as_str(),
            to.as_str()
        )));
    }
    dispute.status = to;
    let slot = match to {
        DisputeStatus::Draft => None,
        DisputeStatus::Funded => Some(&mut dispute.funded_at),
        DisputeStatus::EvidenceSubmitted => Some(&mut dispute.evidence_submitted_at),
        DisputeStatus::InReview => Some(&mut dispute.in_review_at),
        DisputeStatus::Resolved => Some(&mut dispute.resolved_at),
    };
    if let Some(ts) = slot {
        // Set once, never cleared.
        if ts.is_none() {
            *ts = Some(now);
        }
    }
    Ok(())
}

/// Record the terminal decision. A dispute carries at most one decision;
/// a second application is rejected rather than overwritten.
pub fn apply_decision(
    dispute: &mut Dispute,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if dispute.status.is_terminal() || dispute.decision.is_some() {
        return Err(DomainError::AlreadyResolved(dispute.id.clone()));
    }
    dispute.decision = Some(decision);
    dispute.status = DisputeStatus::Resolved;
    dispute.resolved_at = Some(now);
    Ok(())
}
