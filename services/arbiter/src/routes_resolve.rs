use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use disputes::{engine, HumanDecision, ResolutionMethod};

use crate::error::ApiError;
use crate::routes_disputes::DisputeBody;
use crate::state::SharedState;
use crate::store;

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub method: ResolutionMethod,
    pub decision: Option<HumanDecision>,
}

/// Run the resolution engine for one dispute. AI resolution makes exactly
/// one provider call; provider failures are folded into the decision text
/// so the dispute still terminates. The decision write is conditional on
/// the dispute not being resolved yet, which also serves as the mutual
/// exclusion between concurrent resolvers.
pub async fn resolve_dispute(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<DisputeBody>, ApiError> {
    let dispute = store::fetch_dispute(&state.pg_pool, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dispute {id}")))?;
    if dispute.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "dispute {id} is already resolved"
        )));
    }

    // Evidence is read before the provider call; items added in between are
    // not picked up (single read, no spanning transaction).
    let evidence = store::evidence_for_dispute(&state.pg_pool, &id).await?;

    let now = Utc::now();
    let decision = engine::resolve(
        &dispute,
        &evidence,
        req.method,
        req.decision,
        state.provider.as_deref(),
        now,
    )
    .await?;

    if !store::try_set_decision(&state.pg_pool, &id, &decision, now).await? {
        warn!(dispute_id = %id, "decision write lost the race; dispute already resolved");
        return Err(ApiError::Conflict(format!(
            "dispute {id} is already resolved"
        )));
    }
    info!(
        dispute_id = %id,
        method = req.method.as_str(),
        decided_by = %decision.decided_by,
        "dispute resolved"
    );

    let dispute = store::fetch_dispute(&state.pg_pool, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dispute {id}")))?;
    let evidence = store::evidence_for_dispute(&state.pg_pool, &id).await?;
    Ok(Json(DisputeBody { dispute, evidence }))
}
