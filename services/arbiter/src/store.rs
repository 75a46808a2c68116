//! sqlx-backed dispute and evidence stores. One connection per operation,
//! no retries; the only transactions are the evidence cascade on delete
//! and the replace-evidence path.

use chrono::{DateTime, Utc};
use disputes::{Decision, Dispute, DisputeStatus, Evidence};
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(sqlx::FromRow)]
struct DisputeRow {
    id: String,
    title: String,
    kind: String,
    description: String,
    creator_id: String,
    opponent_id: String,
    creator_position: Option<String>,
    opponent_position: Option<String>,
    validator_id: Option<String>,
    validator_type: String,
    resolution_method: Option<String>,
    status: String,
    stake_amount: f64,
    opponent_stake_amount: f64,
    token: String,
    creator_wallet: Option<String>,
    opponent_wallet: Option<String>,
    escrow_tx_id: Option<String>,
    payout_tx_id: Option<String>,
    deadline: Option<DateTime<Utc>>,
    evidence_requirements: Option<String>,
    created_at: DateTime<Utc>,
    funded_at: Option<DateTime<Utc>>,
    evidence_submitted_at: Option<DateTime<Utc>>,
    in_review_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    decision_winner: Option<String>,
    decision_reason: Option<String>,
    decision_decided_at: Option<DateTime<Utc>>,
    decision_decided_by: Option<String>,
}

impl DisputeRow {
    fn into_dispute(self) -> Result<Dispute, ApiError> {
        // A stored decision is recognized by a non-null reason, matching
        // the flattened-column layout.
        let decision = match self.decision_reason {
            Some(reason) => Some(Decision {
                winner: self.decision_winner,
                reason,
                decided_at: self.decision_decided_at.ok_or_else(|| {
                    ApiError::Internal(format!("dispute {}: decision missing decided_at", self.id))
                })?,
                decided_by: self.decision_decided_by.unwrap_or_default(),
            }),
            None => None,
        };

        Ok(Dispute {
            kind: disputes::DisputeKind::parse(&self.kind)?,
            validator_type: disputes::ValidatorType::parse(&self.validator_type)?,
            resolution_method: self
                .resolution_method
                .as_deref()
                .map(disputes::ResolutionMethod::parse)
                .transpose()?,
            status: DisputeStatus::parse(&self.status)?,
            id: self.id,
            title: self.title,
            description: self.description,
            creator_id: self.creator_id,
            opponent_id: self.opponent_id,
            creator_position: self.creator_position,
            opponent_position: self.opponent_position,
            validator_id: self.validator_id,
            stake_amount: self.stake_amount,
            opponent_stake_amount: self.opponent_stake_amount,
            token: self.token,
            creator_wallet: self.creator_wallet,
            opponent_wallet: self.opponent_wallet,
            escrow_tx_id: self.escrow_tx_id,
            payout_tx_id: self.payout_tx_id,
            deadline: self.deadline,
            evidence_requirements: self.evidence_requirements,
            decision,
            created_at: self.created_at,
            funded_at: self.funded_at,
            evidence_submitted_at: self.evidence_submitted_at,
            in_review_at: self.in_review_at,
            resolved_at: self.resolved_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EvidenceRow {
    id: String,
    dispute_id: String,
    kind: String,
    content: String,
    submitted_by: String,
    description: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl EvidenceRow {
    fn into_evidence(self) -> Result<Evidence, ApiError> {
        Ok(Evidence {
            kind: disputes::EvidenceKind::parse(&self.kind)?,
            id: self.id,
            dispute_id: self.dispute_id,
            content: self.content,
            submitted_by: self.submitted_by,
            description: self.description,
            submitted_at: self.submitted_at,
        })
    }
}

const DISPUTE_COLUMNS: &str = "\
    id, title, kind, description, creator_id, opponent_id, \
    creator_position, opponent_position, validator_id, validator_type, \
    resolution_method, status, stake_amount, opponent_stake_amount, token, \
    creator_wallet, opponent_wallet, escrow_tx_id, payout_tx_id, deadline, \
    evidence_requirements, created_at, funded_at, evidence_submitted_at, \
    in_review_at, resolved_at, decision_winner, decision_reason, \
    decision_decided_at, decision_decided_by";

pub async fn insert_dispute(pool: &PgPool, d: &Dispute) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO disputes (
            id, title, kind, description, creator_id, opponent_id,
            creator_position, opponent_position, validator_id, validator_type,
            resolution_method, status, stake_amount, opponent_stake_amount,
            token, creator_wallet, opponent_wallet, deadline,
            evidence_requirements, created_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
        )
        "#,
    )
    .bind(&d.id)
    .bind(&d.title)
    .bind(d.kind.as_str())
    .bind(&d.description)
    .bind(&d.creator_id)
    .bind(&d.opponent_id)
    .bind(&d.creator_position)
    .bind(&d.opponent_position)
    .bind(&d.validator_id)
    .bind(d.validator_type.as_str())
    .bind(d.resolution_method.map(|m| m.as_str()))
    .bind(d.status.as_str())
    .bind(d.stake_amount)
    .bind(d.opponent_stake_amount)
    .bind(&d.token)
    .bind(&d.creator_wallet)
    .bind(&d.opponent_wallet)
    .bind(d.deadline)
    .bind(&d.evidence_requirements)
    .bind(d.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_dispute(pool: &PgPool, id: &str) -> Result<Option<Dispute>, ApiError> {
    let row: Option<DisputeRow> = sqlx::query_as(&format!(
        "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(DisputeRow::into_dispute).transpose()
}

pub async fn list_disputes(pool: &PgPool) -> Result<Vec<Dispute>, ApiError> {
    let rows: Vec<DisputeRow> = sqlx::query_as(&format!(
        "SELECT {DISPUTE_COLUMNS} FROM disputes ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(DisputeRow::into_dispute).collect()
}

/// Persist the mutable fields of a dispute: status, lifecycle timestamps,
/// and the settlement echo fields. The decision columns are written only
/// through [`try_set_decision`].
///
/// The write is conditional on the stored status still being `expected`
/// (the status the caller loaded). A copy made stale by a concurrent
/// resolution cannot revert `Resolved` back to an earlier state, which
/// would reopen the decision guard. Returns `false` when the row moved.
pub async fn update_dispute(
    pool: &PgPool,
    d: &Dispute,
    expected: DisputeStatus,
) -> Result<bool, ApiError> {
    let res = sqlx::query(
        r#"
        UPDATE disputes
        SET status = $2,
            funded_at = $3,
            evidence_submitted_at = $4,
            in_review_at = $5,
            resolved_at = $6,
            creator_wallet = $7,
            opponent_wallet = $8,
            escrow_tx_id = $9,
            payout_tx_id = $10
        WHERE id = $1 AND status = $11
        "#,
    )
    .bind(&d.id)
    .bind(d.status.as_str())
    .bind(d.funded_at)
    .bind(d.evidence_submitted_at)
    .bind(d.in_review_at)
    .bind(d.resolved_at)
    .bind(&d.creator_wallet)
    .bind(&d.opponent_wallet)
    .bind(&d.escrow_tx_id)
    .bind(&d.payout_tx_id)
    .bind(expected.as_str())
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

/// Conditional decision write: only an unresolved dispute can take a
/// decision, so two concurrent resolvers cannot both win. Returns `false`
/// when the guard rejected the write.
pub async fn try_set_decision(
    pool: &PgPool,
    id: &str,
    decision: &Decision,
    resolved_at: DateTime<Utc>,
) -> Result<bool, ApiError> {
    let res = sqlx::query(
        r#"
        UPDATE disputes
        SET status = 'Resolved',
            resolved_at = $2,
            decision_winner = $3,
            decision_reason = $4,
            decision_decided_at = $5,
            decision_decided_by = $6
        WHERE id = $1 AND status <> 'Resolved'
        "#,
    )
    .bind(id)
    .bind(resolved_at)
    .bind(&decision.winner)
    .bind(&decision.reason)
    .bind(decision.decided_at)
    .bind(&decision.decided_by)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

/// Administrative delete. Evidence never outlives its dispute, so both
/// deletes run in one transaction.
pub async fn delete_dispute(pool: &PgPool, id: &str) -> Result<bool, ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM evidence WHERE dispute_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let res = sqlx::query("DELETE FROM disputes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(res.rows_affected() > 0)
}

pub async fn insert_evidence(pool: &PgPool, e: &Evidence) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO evidence (id, dispute_id, kind, content, submitted_by, description, submitted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&e.id)
    .bind(&e.dispute_id)
    .bind(e.kind.as_str())
    .bind(&e.content)
    .bind(&e.submitted_by)
    .bind(&e.description)
    .bind(e.submitted_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn evidence_for_dispute(pool: &PgPool, id: &str) -> Result<Vec<Evidence>, ApiError> {
    let rows: Vec<EvidenceRow> = sqlx::query_as(
        r#"
        SELECT id, dispute_id, kind, content, submitted_by, description, submitted_at
        FROM evidence
        WHERE dispute_id = $1
        ORDER BY submitted_at
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(EvidenceRow::into_evidence).collect()
}

/// True replace semantics: drop the dispute's existing evidence and insert
/// the new list in one transaction.
pub async fn replace_evidence(
    pool: &PgPool,
    dispute_id: &str,
    items: &[Evidence],
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM evidence WHERE dispute_id = $1")
        .bind(dispute_id)
        .execute(&mut *tx)
        .await?;
    for e in items {
        sqlx::query(
            r#"
            INSERT INTO evidence (id, dispute_id, kind, content, submitted_by, description, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&e.id)
        .bind(dispute_id)
        .bind(e.kind.as_str())
        .bind(&e.content)
        .bind(&e.submitted_by)
        .bind(&e.description)
        .bind(e.submitted_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}
