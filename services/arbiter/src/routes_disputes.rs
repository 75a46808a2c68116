use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use disputes::lifecycle::{self, DisputeDraft};
use disputes::types::{new_evidence_id, Decision, Dispute, DisputeStatus, Evidence, EvidenceKind};

use crate::error::ApiError;
use crate::state::SharedState;
use crate::store;

// TODO: derive the creator from an authenticated session once an identity
// collaborator exists.
pub const PLACEHOLDER_CREATOR: &str = "user1";

/// Dispute plus its evidence, as returned by every read path.
#[derive(Serialize)]
pub struct DisputeBody {
    #[serde(flatten)]
    pub dispute: Dispute,
    pub evidence: Vec<Evidence>,
}

async fn load_dispute(state: &SharedState, id: &str) -> Result<Dispute, ApiError> {
    store::fetch_dispute(&state.pg_pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dispute {id}")))
}

async fn dispute_body(state: &SharedState, dispute: Dispute) -> Result<DisputeBody, ApiError> {
    let evidence = store::evidence_for_dispute(&state.pg_pool, &dispute.id).await?;
    Ok(DisputeBody { dispute, evidence })
}

pub async fn create_dispute(
    State(state): State<SharedState>,
    Json(draft): Json<DisputeDraft>,
) -> Result<(StatusCode, Json<DisputeBody>), ApiError> {
    let dispute = lifecycle::open_dispute(PLACEHOLDER_CREATOR, draft, Utc::now())?;
    store::insert_dispute(&state.pg_pool, &dispute).await?;
    info!(dispute_id = %dispute.id, kind = dispute.kind.as_str(), "dispute created");
    Ok((
        StatusCode::CREATED,
        Json(DisputeBody {
            dispute,
            evidence: vec![],
        }),
    ))
}

pub async fn get_disputes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<DisputeBody>>, ApiError> {
    let disputes = store::list_disputes(&state.pg_pool).await?;
    let mut out = Vec::with_capacity(disputes.len());
    for d in disputes {
        out.push(dispute_body(&state, d).await?);
    }
    Ok(Json(out))
}

pub async fn get_dispute(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DisputeBody>, ApiError> {
    let dispute = load_dispute(&state, &id).await?;
    Ok(Json(dispute_body(&state, dispute).await?))
}

/// Generic partial update: status (stamps the matching lifecycle
/// timestamp), settlement echo fields, a nested decision, and a full
/// evidence replacement.
#[derive(Deserialize)]
pub struct UpdateDisputeRequest {
    pub status: Option<DisputeStatus>,
    pub creator_wallet: Option<String>,
    pub opponent_wallet: Option<String>,
    pub escrow_tx_id: Option<String>,
    pub payout_tx_id: Option<String>,
    pub decision: Option<Decision>,
    pub evidence: Option<Vec<EvidenceUpdate>>,
}

#[derive(Deserialize)]
pub struct EvidenceUpdate {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub content: String,
    #[serde(alias = "submittedBy")]
    pub submitted_by: String,
    pub description: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

pub async fn update_dispute(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDisputeRequest>,
) -> Result<Json<DisputeBody>, ApiError> {
    let mut dispute = load_dispute(&state, &id).await?;
    let now = Utc::now();

    if let Some(items) = req.evidence {
        let evidence = items
            .into_iter()
            .map(|e| {
                if !dispute.is_party(&e.submitted_by) {
                    return Err(ApiError::Validation(format!(
                        "evidence submitter {} is not a party to dispute {id}",
                        e.submitted_by
                    )));
                }
                Ok(Evidence {
                    id: e.id.unwrap_or_else(|| new_evidence_id(now)),
                    dispute_id: id.clone(),
                    kind: e.kind,
                    content: e.content,
                    submitted_by: e.submitted_by,
                    description: e.description,
                    submitted_at: e.submitted_at.unwrap_or(now),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        store::replace_evidence(&state.pg_pool, &id, &evidence).await?;
    }

    if let Some(decision) = req.decision {
        if !store::try_set_decision(&state.pg_pool, &id, &decision, now).await? {
            return Err(ApiError::Conflict(format!(
                "dispute {id} is already resolved"
            )));
        }
        // The in-memory copy is stale now; reload before any status change.
        dispute = load_dispute(&state, &id).await?;
    }

    // Everything below writes back from this copy; the store rejects the
    // write if the status changed underneath us in the meantime.
    let loaded_status = dispute.status;

    if let Some(status) = req.status {
        lifecycle::advance_status(&mut dispute, status, now)?;
    }
    if req.creator_wallet.is_some() {
        dispute.creator_wallet = req.creator_wallet;
    }
    if req.opponent_wallet.is_some() {
        dispute.opponent_wallet = req.opponent_wallet;
    }
    if req.escrow_tx_id.is_some() {
        dispute.escrow_tx_id = req.escrow_tx_id;
    }
    if req.payout_tx_id.is_some() {
        dispute.payout_tx_id = req.payout_tx_id;
    }
    if !store::update_dispute(&state.pg_pool, &dispute, loaded_status).await? {
        return Err(ApiError::Conflict(format!(
            "dispute {id} was modified concurrently; reload and retry"
        )));
    }

    let dispute = load_dispute(&state, &id).await?;
    Ok(Json(dispute_body(&state, dispute).await?))
}

pub async fn delete_dispute(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !store::delete_dispute(&state.pg_pool, &id).await? {
        return Err(ApiError::NotFound(format!("dispute {id}")));
    }
    info!(dispute_id = %id, "dispute deleted (evidence cascaded)");
    Ok(Json(serde_json::json!({ "deleted": id })))
}

#[derive(Deserialize)]
pub struct AddEvidenceRequest {
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub content: String,
    #[serde(alias = "submittedBy")]
    pub submitted_by: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct EvidenceAddedResponse {
    pub id: String,
    pub message: String,
}

/// Append one evidence item. Deliberately does not advance the dispute
/// status; the evidence-submitted transition is driven by the client.
pub async fn add_evidence(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<AddEvidenceRequest>,
) -> Result<(StatusCode, Json<EvidenceAddedResponse>), ApiError> {
    let dispute = load_dispute(&state, &id).await?;
    if !dispute.is_party(&req.submitted_by) {
        return Err(ApiError::Validation(format!(
            "submitter {} is not a party to dispute {id}",
            req.submitted_by
        )));
    }

    let now = Utc::now();
    let evidence = Evidence {
        id: new_evidence_id(now),
        dispute_id: id.clone(),
        kind: req.kind,
        content: req.content,
        submitted_by: req.submitted_by,
        description: req.description,
        submitted_at: now,
    };
    store::insert_evidence(&state.pg_pool, &evidence).await?;
    info!(dispute_id = %id, evidence_id = %evidence.id, "evidence added");

    Ok((
        StatusCode::CREATED,
        Json(EvidenceAddedResponse {
            id: evidence.id,
            message: "Evidence added".to_string(),
        }),
    ))
}
