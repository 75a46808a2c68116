//! A resolved dispute must stay resolved. The store enforces this two
//! ways: the decision write refuses already-resolved rows, and the
//! generic update refuses to write back a copy whose status went stale.
//! Run against a live database:
//!
//!   DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::Utc;
use disputes::lifecycle::{self, DisputeDraft};
use disputes::types::{Decision, DisputeKind, DisputeStatus};
use sqlx::PgPool;

use arbiter::store;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    let pool = PgPool::connect(&url).await.expect("connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
    pool
}

#[tokio::test]
#[ignore = "requires a live Postgres (set DATABASE_URL)"]
async fn stale_update_cannot_reopen_a_resolved_dispute() {
    let pool = test_pool().await;
    let now = Utc::now();

    let dispute = lifecycle::open_dispute(
        "user1",
        DisputeDraft {
            title: "Guard check".into(),
            kind: DisputeKind::Promise,
            description: "I will deliver by Friday".into(),
            opponent_id: "user2".into(),
            stake_amount: 5.0,
            opponent_stake_amount: 5.0,
            token: "GAS".into(),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    store::insert_dispute(&pool, &dispute).await.unwrap();

    // A second handler loads the same row before anything changes.
    let mut stale = store::fetch_dispute(&pool, &dispute.id).await.unwrap().unwrap();
    let stale_status = stale.status;

    // Meanwhile a resolve lands and records the decision.
    let first = Decision {
        winner: None,
        reason: "analysis complete".into(),
        decided_at: Utc::now(),
        decided_by: "ai-agent".into(),
    };
    assert!(store::try_set_decision(&pool, &dispute.id, &first, Utc::now())
        .await
        .unwrap());

    // The stale copy now tries to write its pre-resolution status back.
    lifecycle::advance_status(&mut stale, DisputeStatus::Funded, Utc::now()).unwrap();
    let wrote = store::update_dispute(&pool, &stale, stale_status).await.unwrap();
    assert!(!wrote, "stale status write must be rejected");

    // With the status intact, a second decision attempt also loses.
    let second = Decision {
        winner: Some("user2".into()),
        reason: "overwrite attempt".into(),
        decided_at: Utc::now(),
        decided_by: "human-validator".into(),
    };
    assert!(!store::try_set_decision(&pool, &dispute.id, &second, Utc::now())
        .await
        .unwrap());

    let current = store::fetch_dispute(&pool, &dispute.id).await.unwrap().unwrap();
    assert_eq!(current.status, DisputeStatus::Resolved);
    let decision = current.decision.expect("decision persisted");
    assert_eq!(decision.reason, "analysis complete");
    assert_eq!(decision.decided_by, "ai-agent");

    assert!(store::delete_dispute(&pool, &dispute.id).await.unwrap());
}
