//! Prompt construction for the reasoning provider.
//!
//! Bets get a focused positional prompt with no evidence section; Promises
//! get the full evidence analysis, falling back to independent research
//! when neither party submitted anything.

use std::fmt::Write as _;

use crate::types::{Dispute, Evidence};

/// Fixed arbitrator persona sent with every resolution call. The ordering
/// requirement (creator, opponent, findings, verdict) is part of the
/// contract: the model must not pick a winner before analyzing both sides.
pub const SYSTEM_PROMPT: &str = "\
You are an impartial AI arbitrator for the SettleIt dispute resolution platform.

**CRITICAL INSTRUCTIONS:**
1. **DO NOT** pick a winner immediately - analyze both sides first
2. Analyze each party's position and evidence separately
3. If no evidence is provided, conduct your own research to determine the facts
4. Only after thorough analysis, provide your final verdict
5. Keep your response SHORT and CONCISE (max 300 words)

**Response Structure (in markdown):**
1. **Creator's Side**: Brief analysis of their position/evidence
2. **Opponent's Side**: Brief analysis of their position/evidence
3. **Research/Findings**: If no evidence, what you found through research
4. **Verdict**: Final decision (creator or opponent) with brief reasoning

Be impartial, concise, and base your verdict on facts and analysis, not assumptions.
";

/// Split a dispute's evidence into creator-submitted and opponent-submitted
/// subsets, solely by `submitted_by`.
pub fn partition_evidence<'a>(
    dispute: &Dispute,
    items: &'a [Evidence],
) -> (Vec<&'a Evidence>, Vec<&'a Evidence>) {
    let creator = items
        .iter()
        .filter(|e| e.submitted_by == dispute.creator_id)
        .collect();
    let opponent = items
        .iter()
        .filter(|e| e.submitted_by == dispute.opponent_id)
        .collect();
    (creator, opponent)
}

/// Positional prompt for a Bet dispute. Bets carry no evidence by design,
/// so the model is asked to research ground truth instead.
pub fn bet_prompt(dispute: &Dispute) -> String {
    let creator_pos = dispute.creator_position.as_deref().unwrap_or("Not specified");
    let opponent_pos = dispute.opponent_position.as_deref().unwrap_or("Not specified");

    format!(
        "Bet Dispute: {title}\n\n\
         **Question**: {question}\n\n\
         **Creator's Position**: {creator_pos}\n\
         **Opponent's Position**: {opponent_pos}\n\n\
         **Instructions:**\n\
         1. Analyze the Creator's position first\n\
         2. Analyze the Opponent's position second\n\
         3. Conduct research to determine which position is factually correct\n\
         4. After analyzing both sides, provide your verdict (creator or opponent)\n\
         5. Keep response under 200 words - be concise\n\n\
         Format in markdown with clear sections for each side's analysis and final verdict.\n",
        title = dispute.title,
        question = if dispute.description.is_empty() {
            "No description provided"
        } else {
            dispute.description.as_str()
        },
    )
}

/// Evidence-analysis prompt for a Promise dispute.
pub fn promise_prompt(
    dispute: &Dispute,
    creator_evidence: &[&Evidence],
    opponent_evidence: &[&Evidence],
) -> String {
    analysis_prompt(
        &dispute.title,
        &dispute.description,
        dispute.stake_amount,
        creator_evidence,
        opponent_evidence,
    )
}

/// Evidence-analysis prompt from bare dispute fields. Also serves the
/// stateless analyze endpoint, which has no persisted dispute to hand.
pub fn analysis_prompt(
    title: &str,
    description: &str,
    stake_amount: f64,
    creator_evidence: &[&Evidence],
    opponent_evidence: &[&Evidence],
) -> String {
    let has_evidence = !creator_evidence.is_empty() || !opponent_evidence.is_empty();

    let evidence_section = if has_evidence {
        format!(
            "\n## Evidence from Creator (Party A)\n{}\n\n\
             ## Evidence from Opponent (Party B)\n{}\n",
            format_evidence(creator_evidence),
            format_evidence(opponent_evidence),
        )
    } else {
        "\n**No evidence provided by either party.**\n\
         You must conduct your own research to determine the facts and reach a verdict.\n"
            .to_string()
    };

    format!(
        "Analyze this dispute and provide a verdict:\n\n\
         **Dispute**: {title}\n\
         **Description**: {description}\n\
         **Stake**: {stake}\n\
         {evidence_section}\n\
         **Instructions:**\n\
         1. First analyze the Creator's side (position/evidence)\n\
         2. Then analyze the Opponent's side (position/evidence)\n\
         3. If no evidence was provided, conduct research to find the facts\n\
         4. After analyzing both sides, provide your final verdict (creator or opponent)\n\
         5. Keep your response under 300 words and be concise\n\n\
         Format your response in markdown with clear sections for each side's \
         analysis and the final verdict.\n",
        title = title,
        description = description,
        stake = stake_amount,
    )
}

fn format_evidence(items: &[&Evidence]) -> String {
    if items.is_empty() {
        return "No evidence submitted.".to_string();
    }
    let mut out = String::new();
    for (i, e) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", i + 1, e.kind.as_str(), e.content);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{open_dispute, DisputeDraft};
    use crate::types::{DisputeKind, EvidenceKind};
    use chrono::Utc;

    fn dispute(kind: DisputeKind) -> Dispute {
        open_dispute(
            "user1",
            DisputeDraft {
                title: "Will it rain".into(),
                kind,
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

    fn item(dispute_id: &str, by: &str, content: &str) -> Evidence {
        Evidence {
            id: format!("evid_{content}"),
            dispute_id: dispute_id.into(),
            kind: EvidenceKind::Text,
            content: content.into(),
            submitted_by: by.into(),
            description: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn partition_is_exact_and_disjoint() {
        let d = dispute(DisputeKind::Promise);
        let items = vec![
            item(&d.id, "user1", "a"),
            item(&d.id, "user2", "b"),
            item(&d.id, "user1", "c"),
        ];
        let (creator, opponent) = partition_evidence(&d, &items);
        assert_eq!(creator.len(), 2);
        assert_eq!(opponent.len(), 1);
        assert_eq!(creator.len() + opponent.len(), items.len());
        assert!(creator.iter().all(|e| e.submitted_by == "user1"));
        assert!(opponent.iter().all(|e| e.submitted_by == "user2"));
    }

    #[test]
    fn bet_prompt_is_positional_not_evidentiary() {
        let d = dispute(DisputeKind::Bet);
        let p = bet_prompt(&d);
        assert!(p.contains("Will it rain"));
        assert!(p.contains("**Creator's Position**: yes"));
        assert!(p.contains("**Opponent's Position**: no"));
        assert!(p.contains("under 200 words"));
        assert!(!p.contains("Evidence from Creator"));
    }

    #[test]
    fn promise_prompt_numbers_evidence_by_party() {
        let d = dispute(DisputeKind::Promise);
        let items = vec![
            item(&d.id, "user1", "receipt photo"),
            item(&d.id, "user2", "counter statement"),
        ];
        let (c, o) = partition_evidence(&d, &items);
        let p = promise_prompt(&d, &c, &o);
        assert!(p.contains("1. [text] receipt photo"));
        assert!(p.contains("1. [text] counter statement"));
        assert!(p.contains("**Stake**: 10"));
        assert!(p.contains("under 300 words"));
        assert!(!p.contains("No evidence provided by either party"));
    }

    #[test]
    fn empty_evidence_switches_to_research_fallback() {
        let d = dispute(DisputeKind::Promise);
        let p = promise_prompt(&d, &[], &[]);
        assert!(p.contains("No evidence provided by either party"));
        assert!(p.contains("conduct your own research"));
    }
}
