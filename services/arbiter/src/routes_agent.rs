//! Agent introspection and stateless analysis. Unlike the resolve path,
//! nothing here touches the dispute store: analyze works on caller-supplied
//! data, and its errors propagate instead of being folded into a decision.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use disputes::prompt;
use disputes::types::{Evidence, EvidenceKind};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct AgentStatusResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
    pub message: String,
}

/// Report whether a reasoning provider is configured and reachable.
pub async fn get_agent_status(State(state): State<SharedState>) -> Json<AgentStatusResponse> {
    let Some(provider) = &state.provider else {
        return Json(AgentStatusResponse {
            status: "not_configured".to_string(),
            provider: "none".to_string(),
            model: "none".to_string(),
            message: "No reasoning provider configured; set LLM_BASE_URL to enable AI resolution"
                .to_string(),
        });
    };

    let info = provider.info();
    match provider.ping().await {
        Ok(()) => Json(AgentStatusResponse {
            status: "ready".to_string(),
            provider: info.name,
            model: info.model,
            message: "Reasoning provider is configured and ready".to_string(),
        }),
        Err(e) => Json(AgentStatusResponse {
            status: "unreachable".to_string(),
            provider: info.name,
            model: info.model,
            message: format!("Provider ping failed: {e}"),
        }),
    }
}

#[derive(Deserialize)]
pub struct AnalysisEvidenceItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub content: String,
    #[serde(alias = "submittedBy")]
    pub submitted_by: String,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub dispute_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub creator_evidence: Vec<AnalysisEvidenceItem>,
    #[serde(default)]
    pub opponent_evidence: Vec<AnalysisEvidenceItem>,
    #[serde(default)]
    pub stake_amount: f64,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub dispute_id: String,
    pub recommendation: Option<String>,
    pub reasoning: String,
    pub status: String,
}

/// Run one analysis pass over caller-supplied dispute data without
/// persisting anything.
pub async fn analyze_dispute(
    State(state): State<SharedState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let provider = state.provider.as_deref().ok_or_else(|| {
        ApiError::Unavailable(
            "no reasoning provider configured; set LLM_BASE_URL to enable AI analysis".to_string(),
        )
    })?;

    let creator = to_evidence(&req.dispute_id, req.creator_evidence);
    let opponent = to_evidence(&req.dispute_id, req.opponent_evidence);
    let creator_refs: Vec<&Evidence> = creator.iter().collect();
    let opponent_refs: Vec<&Evidence> = opponent.iter().collect();

    let user_prompt = prompt::analysis_prompt(
        &req.title,
        &req.description,
        req.stake_amount,
        &creator_refs,
        &opponent_refs,
    );

    let reasoning = provider
        .ask(&user_prompt, prompt::SYSTEM_PROMPT)
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis failed: {e}")))?;
    info!(dispute_id = %req.dispute_id, "stateless analysis completed");

    Ok(Json(AnalysisResponse {
        dispute_id: req.dispute_id,
        // The narrative is the product; no structured winner is extracted.
        recommendation: None,
        reasoning,
        status: "completed".to_string(),
    }))
}

fn to_evidence(dispute_id: &str, items: Vec<AnalysisEvidenceItem>) -> Vec<Evidence> {
    let now = Utc::now();
    items
        .into_iter()
        .map(|e| Evidence {
            id: e.id,
            dispute_id: dispute_id.to_string(),
            kind: e.kind,
            content: e.content,
            submitted_by: e.submitted_by,
            description: None,
            submitted_at: now,
        })
        .collect()
}

#[derive(Serialize)]
pub struct QuickAnalysisResponse {
    pub dispute_id: String,
    pub preliminary_leaning: String,
    pub creator_evidence_count: usize,
    pub opponent_evidence_count: usize,
    pub message: String,
}

/// Evidence-count heuristic for immediate UI feedback; no provider call.
pub async fn quick_analysis(Json(req): Json<AnalyzeRequest>) -> Json<QuickAnalysisResponse> {
    let creator_count = req.creator_evidence.len();
    let opponent_count = req.opponent_evidence.len();

    Json(QuickAnalysisResponse {
        dispute_id: req.dispute_id,
        preliminary_leaning: preliminary_leaning(creator_count, opponent_count).to_string(),
        creator_evidence_count: creator_count,
        opponent_evidence_count: opponent_count,
        message: "This is a preliminary assessment. Full analysis pending.".to_string(),
    })
}

fn preliminary_leaning(creator: usize, opponent: usize) -> &'static str {
    if creator > opponent {
        "creator"
    } else if opponent > creator {
        "opponent"
    } else {
        "undecided"
    }
}
