use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Dispute subtype. Bets are adjudicated on stated positions, Promises on
/// submitted evidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeKind {
    #[default]
    Promise,
    Bet,
}

impl DisputeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promise => "Promise",
            Self::Bet => "Bet",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Promise" => Ok(Self::Promise),
            "Bet" => Ok(Self::Bet),
            other => Err(DomainError::Validation(format!(
                "unknown dispute kind: {other}"
            ))),
        }
    }
}

/// Lifecycle status. Strictly forward: Draft, Funded, EvidenceSubmitted,
/// InReview, Resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStatus {
    Draft,
    Funded,
    EvidenceSubmitted,
    InReview,
    Resolved,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Funded => "Funded",
            Self::EvidenceSubmitted => "EvidenceSubmitted",
            Self::InReview => "InReview",
            Self::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Funded" => Ok(Self::Funded),
            "EvidenceSubmitted" => Ok(Self::EvidenceSubmitted),
            "InReview" => Ok(Self::InReview),
            "Resolved" => Ok(Self::Resolved),
            other => Err(DomainError::Validation(format!(
                "unknown dispute status: {other}"
            ))),
        }
    }

    /// Position in the forward progression, for monotonicity checks.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Funded => 1,
            Self::EvidenceSubmitted => 2,
            Self::InReview => 3,
            Self::Resolved => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorType {
    Pending,
    Ai,
    Human,
}

impl ValidatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ai => "ai",
            Self::Human => "human",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "ai" => Ok(Self::Ai),
            "human" => Ok(Self::Human),
            other => Err(DomainError::Validation(format!(
                "unknown validator type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Ai,
    Human,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Human => "human",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "ai" => Ok(Self::Ai),
            "human" => Ok(Self::Human),
            other => Err(DomainError::Validation(format!(
                "unknown resolution method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Text,
    Image,
    Document,
    Link,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Document => "document",
            Self::Link => "link",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "document" => Ok(Self::Document),
            "link" => Ok(Self::Link),
            other => Err(DomainError::Validation(format!(
                "unknown evidence kind: {other}"
            ))),
        }
    }
}

/// Terminal artifact of resolution. `winner` is always absent for
/// AI-produced decisions: the narrative analysis is the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub winner: Option<String>,
    pub reason: String,
    #[serde(alias = "decidedAt")]
    pub decided_at: DateTime<Utc>,
    #[serde(alias = "decidedBy")]
    pub decided_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DisputeKind,
    pub description: String,
    pub creator_id: String,
    pub opponent_id: String,
    pub creator_position: Option<String>,
    pub opponent_position: Option<String>,
    pub validator_id: Option<String>,
    pub validator_type: ValidatorType,
    pub resolution_method: Option<ResolutionMethod>,
    pub status: DisputeStatus,
    pub stake_amount: f64,
    pub opponent_stake_amount: f64,
    pub token: String,
    // Settlement echo fields. Never interpreted by this core.
    pub creator_wallet: Option<String>,
    pub opponent_wallet: Option<String>,
    pub escrow_tx_id: Option<String>,
    pub payout_tx_id: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub evidence_requirements: Option<String>,
    pub decision: Option<Decision>,
    pub created_at: DateTime<Utc>,
    pub funded_at: Option<DateTime<Utc>>,
    pub evidence_submitted_at: Option<DateTime<Utc>>,
    pub in_review_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Dispute {
    /// Whether `party` is one of the two parties to this dispute.
    pub fn is_party(&self, party: &str) -> bool {
        party == self.creator_id || party == self.opponent_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub dispute_id: String,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub content: String,
    #[serde(alias = "submittedBy")]
    pub submitted_by: String,
    pub description: Option<String>,
    #[serde(rename = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}

/// Fresh dispute id: millisecond timestamp plus a random suffix.
pub fn new_dispute_id(now: DateTime<Utc>) -> String {
    format!("dispute_{}_{}", now.timestamp_millis(), random_suffix())
}

/// Fresh evidence id, same scheme.
pub fn new_evidence_id(now: DateTime<Utc>) -> String {
    format!("evid_{}_{}", now.timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..8].to_string()
}
