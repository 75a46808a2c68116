//! Dispute lifecycle and resolution core for the SettleIt backend.
//!
//! Parties open disputes (bets or promises), submit evidence, and request a
//! resolution that is either produced by one call to a reasoning provider
//! or entered by a human validator. This crate owns the data model, the
//! lifecycle state machine, prompt construction, and the resolution engine;
//! transport and persistence live in the `arbiter` service.

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod prompt;
pub mod provider;
pub mod types;

pub use engine::{resolve, HumanDecision, AI_DECIDER, DEFAULT_HUMAN_DECIDER};
pub use error::DomainError;
pub use lifecycle::{advance_status, apply_decision, open_dispute, DisputeDraft, AI_VALIDATOR_ID};
pub use provider::{ProviderInfo, ReasoningProvider};
pub use types::{
    Decision, Dispute, DisputeKind, DisputeStatus, Evidence, EvidenceKind, ResolutionMethod,
    ValidatorType,
};
