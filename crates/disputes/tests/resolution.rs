use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use disputes::{
    engine, lifecycle::DisputeDraft, open_dispute, Dispute, DisputeKind, DisputeStatus,
    Evidence, EvidenceKind, HumanDecision, ProviderInfo, ReasoningProvider, ResolutionMethod,
};

/// Scripted provider: returns a canned response (or error) and records the
/// exact prompt and system instructions it was called with.
struct StubProvider {
    response: Result<String, String>,
    last_prompt: Mutex<Option<String>>,
    last_system: Mutex<Option<String>>,
}

impl StubProvider {
    fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            last_prompt: Mutex::new(None),
            last_system: Mutex::new(None),
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            response: Err(msg.to_string()),
            last_prompt: Mutex::new(None),
            last_system: Mutex::new(None),
        }
    }

    fn prompt(&self) -> String {
        self.last_prompt.lock().unwrap().clone().expect("provider was never called")
    }
}

#[async_trait]
impl ReasoningProvider for StubProvider {
    async fn ask(&self, prompt: &str, system_instructions: &str) -> anyhow::Result<String> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_system.lock().unwrap() = Some(system_instructions.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(anyhow::anyhow!("{msg}")),
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "stub".into(),
            model: "none".into(),
        }
    }
}

fn bet_dispute() -> Dispute {
    open_dispute(
        "user1",
        DisputeDraft {
            title: "Will it rain".into(),
            kind: DisputeKind::Bet,
            description: "Question: will it rain tomorrow?".into(),
            opponent_id: "user2".into(),
            creator_position: Some("yes".into()),
            opponent_position: Some("no".into()),
            stake_amount: 10.0,
            opponent_stake_amount: 10.0,
            token: "GAS".into(),
            ..Default::default()
        },
        Utc::now(),
    )
    .unwrap()
}

fn promise_dispute() -> Dispute {
    open_dispute(
        "user1",
        DisputeDraft {
            title: "Finish the marathon".into(),
            kind: DisputeKind::Promise,
            description: "I will finish under 4 hours".into(),
            opponent_id: "user2".into(),
            stake_amount: 5.0,
            opponent_stake_amount: 0.0,
            token: "GAS".into(),
            ..Default::default()
        },
        Utc::now(),
    )
    .unwrap()
}

fn text_evidence(d: &Dispute, by: &str, content: &str) -> Evidence {
    Evidence {
        id: format!("evid_{content}"),
        dispute_id: d.id.clone(),
        kind: EvidenceKind::Text,
        content: content.into(),
        submitted_by: by.into(),
        description: None,
        submitted_at: Utc::now(),
    }
}

#[tokio::test]
async fn ai_bet_resolution_has_no_winner() {
    let dispute = bet_dispute();
    let provider = StubProvider::replying("Creator's side looks right. Verdict: creator.");

    let decision = engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Ai,
        None,
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap();

    assert_eq!(decision.winner, None);
    assert!(!decision.reason.is_empty());
    assert_eq!(decision.decided_by, engine::AI_DECIDER);

    // Bet prompts are positional: positions in, evidence sections out.
    let prompt = provider.prompt();
    assert!(prompt.contains("**Creator's Position**: yes"));
    assert!(prompt.contains("**Opponent's Position**: no"));
    assert!(!prompt.contains("Evidence from Creator"));
    assert!(provider
        .last_system
        .lock()
        .unwrap()
        .as_deref()
        .unwrap()
        .contains("impartial AI arbitrator"));
}

#[tokio::test]
async fn promise_without_evidence_takes_research_branch() {
    let dispute = promise_dispute();
    let provider = StubProvider::replying("Researched it; promise was kept.");

    engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Ai,
        None,
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap();

    let prompt = provider.prompt();
    assert!(prompt.contains("No evidence provided by either party"));
    assert!(prompt.contains("conduct your own research"));
}

#[tokio::test]
async fn promise_with_evidence_embeds_both_partitions() {
    let dispute = promise_dispute();
    let evidence = vec![
        text_evidence(&dispute, "user1", "finish-line photo"),
        text_evidence(&dispute, "user2", "timing chip shows 4h12m"),
    ];
    let provider = StubProvider::replying("Opponent's timing data is stronger.");

    engine::resolve(
        &dispute,
        &evidence,
        ResolutionMethod::Ai,
        None,
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap();

    let prompt = provider.prompt();
    assert!(prompt.contains("1. [text] finish-line photo"));
    assert!(prompt.contains("1. [text] timing chip shows 4h12m"));
    assert!(!prompt.contains("No evidence provided by either party"));
}

#[tokio::test]
async fn provider_failure_still_yields_a_decision() {
    let dispute = bet_dispute();
    let provider = StubProvider::failing("connection refused");

    let decision = engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Ai,
        None,
        Some(&provider),
        Utc::now(),
    )
    .await
    .expect("provider failure must not propagate");

    assert_eq!(decision.winner, None);
    assert!(decision.reason.contains("AI analysis error"));
    assert!(decision.reason.contains("connection refused"));
    assert_eq!(decision.decided_by, engine::AI_DECIDER);
}

#[tokio::test]
async fn human_decision_defaults_decider_and_checks_winner() {
    let dispute = promise_dispute();
    let provider = StubProvider::replying("unused");

    let decision = engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Human,
        Some(HumanDecision {
            winner: "user1".into(),
            reason: "clear proof".into(),
            decided_by: None,
        }),
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap();

    assert_eq!(decision.winner.as_deref(), Some("user1"));
    assert_eq!(decision.decided_by, engine::DEFAULT_HUMAN_DECIDER);

    // Winner must be one of the two parties.
    let err = engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Human,
        Some(HumanDecision {
            winner: "stranger".into(),
            reason: "nope".into(),
            decided_by: None,
        }),
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("not a party"));

    // And the payload itself is required.
    let err = engine::resolve(
        &dispute,
        &[],
        ResolutionMethod::Human,
        None,
        Some(&provider),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("requires a decision payload"));
}

#[tokio::test]
async fn ai_resolution_without_provider_is_unavailable() {
    let dispute = bet_dispute();
    let err = engine::resolve(&dispute, &[], ResolutionMethod::Ai, None, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        disputes::DomainError::ProviderUnavailable(_)
    ));
}

#[tokio::test]
async fn resolved_dispute_reports_terminal_status() {
    let mut dispute = promise_dispute();
    let provider = StubProvider::replying("analysis");

    let now = Utc::now();
    let decision = engine::resolve(&dispute, &[], ResolutionMethod::Ai, None, Some(&provider), now)
        .await
        .unwrap();
    disputes::apply_decision(&mut dispute, decision, now).unwrap();

    assert_eq!(dispute.status, DisputeStatus::Resolved);
    assert!(dispute.resolved_at.unwrap() >= dispute.created_at);
}
