//! End-to-end flows through the mission engine: pricing into frozen
//! missions, completion rewards, winner payouts, lifecycle staging,
//! peer review, and incremental-vs-batch stats agreement.

use chrono::{Duration, Utc};
use engage_economics::{LedgerReason, MemoryLedger};
use engage_engine::{EngineConfig, EngineError, MemoryMissionStore, MissionEngine};
use engage_payout::WinnerSelection;
use engage_pricing::PricingConfig;
use engage_review::{ReviewError, ReviewerIdentity};
use engage_stats::MemoryStatsStore;
use engage_status::LifecycleStage;
use engage_types::{
    Honors, MissionDraft, MissionId, MissionKind, MissionModel, ModelRequest, Platform,
    TargetAudience, TaskId, Usd, UserId,
};
use std::sync::Arc;

fn engine() -> MissionEngine {
    engine_with(EngineConfig::default())
}

fn engine_with(config: EngineConfig) -> MissionEngine {
    MissionEngine::new(
        config,
        Arc::new(MemoryMissionStore::new()),
        Arc::new(MemoryLedger::new()),
        Arc::new(MemoryStatsStore::new()),
    )
}

fn draft(creator: &str, tasks: &[&str], model: ModelRequest) -> MissionDraft {
    MissionDraft {
        creator: UserId::new(creator),
        platform: Platform::Twitter,
        kind: MissionKind::Engage,
        target: TargetAudience::Normal,
        tasks: tasks.iter().map(|t| TaskId::new(*t)).collect(),
        model,
    }
}

fn fixed_draft(creator: &str) -> MissionDraft {
    draft(
        creator,
        &["like", "retweet"],
        ModelRequest::Fixed { cap: 60 },
    )
}

fn degen_draft(creator: &str) -> MissionDraft {
    draft(
        creator,
        &["comment"],
        ModelRequest::Degen {
            duration_hours: 6,
            winners_cap: Some(3),
        },
    )
}

fn selection(user: &str, task: &str) -> WinnerSelection {
    WinnerSelection {
        user_id: UserId::new(user),
        task_id: TaskId::new(task),
    }
}

fn reviewer(n: u32) -> ReviewerIdentity {
    ReviewerIdentity {
        id: UserId::new(format!("reviewer-{n}")),
        handle: format!("reviewer{n}"),
    }
}

fn link_of(r: &ReviewerIdentity) -> String {
    format!("https://x.com/{}/status/1790112233445566778", r.handle)
}

#[tokio::test]
async fn test_fixed_mission_lifecycle() {
    let engine = engine();
    let now = Utc::now();
    let alice = UserId::new("alice");

    let mission = engine
        .create_mission(fixed_draft("creator"), Some(now + Duration::hours(48)), now)
        .await
        .unwrap();

    assert!(mission.id.as_str().starts_with("mission-"));
    assert_eq!(mission.total_cost_honors, Honors::from_whole(38_400));
    assert_eq!(mission.total_cost_usd.to_base_units(), 85_333_333);
    assert_eq!(
        mission.model,
        MissionModel::Fixed {
            cap: 60,
            per_user_honors: Honors::from_whole(320),
        }
    );

    let creator_stats = engine
        .user_stats(&UserId::new("creator"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creator_stats.missions_created, 1);

    // First task pays the catalog value immediately.
    let receipt = engine
        .record_task_completion(&mission.id, &alice, &TaskId::new("like"), None, now)
        .await
        .unwrap();
    assert!(receipt.newly_completed);
    assert_eq!(receipt.credited, Honors::from_whole(20));
    assert_eq!(receipt.stats_delta.missions_completed, 0);

    // Second task closes the required set.
    let receipt = engine
        .record_task_completion(&mission.id, &alice, &TaskId::new("retweet"), None, now)
        .await
        .unwrap();
    assert_eq!(receipt.credited, Honors::from_whole(300));
    assert_eq!(receipt.stats_delta.missions_completed, 1);

    assert_eq!(
        engine.wallets.balance(&alice).await.unwrap(),
        Honors::from_whole(320)
    );
    // Shadow balance converts per credit, so it is the sum of the two
    // truncated deltas, not one conversion of the total.
    assert_eq!(
        engine.wallets.usd_shadow(&alice).await.unwrap(),
        Honors::from_whole(20)
            .to_usd()
            .saturating_add(Honors::from_whole(300).to_usd())
    );
    let history = engine.wallets.history(&alice).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.reason == LedgerReason::TaskReward));
    assert!(history.iter().all(|e| e.mission_id.as_ref() == Some(&mission.id)));

    let stats = engine.user_stats(&alice).await.unwrap().unwrap();
    assert_eq!(stats.tasks_done, 2);
    assert_eq!(stats.missions_completed, 1);
    assert_eq!(stats.total_earned, Honors::from_whole(320));

    let participation = engine
        .participation(&mission.id, &alice)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(participation.total_honors_earned, Honors::from_whole(320));

    // Redelivered completion changes nothing.
    let receipt = engine
        .record_task_completion(&mission.id, &alice, &TaskId::new("like"), None, now)
        .await
        .unwrap();
    assert!(!receipt.newly_completed);
    assert!(receipt.credited.is_zero());
    assert!(receipt.stats_delta.is_zero());
    assert_eq!(
        engine.wallets.balance(&alice).await.unwrap(),
        Honors::from_whole(320)
    );
    let stats = engine.user_stats(&alice).await.unwrap().unwrap();
    assert_eq!(stats.tasks_done, 2);
}

#[tokio::test]
async fn test_degen_mission_freezes_payout_and_window() {
    let engine = engine();
    let now = Utc::now();
    let bob = UserId::new("bob");

    let mission = engine
        .create_mission(degen_draft("creator"), None, now)
        .await
        .unwrap();

    // 6h preset at $80, half the honor equivalent pooled for 3 winners.
    assert_eq!(mission.total_cost_usd, Usd::from_whole(80));
    assert_eq!(mission.total_cost_honors, Honors::from_whole(36_000));
    assert_eq!(mission.ends_at, Some(now + Duration::hours(6)));
    match &mission.model {
        MissionModel::Degen {
            duration_hours,
            winners_cap,
            winner_payout,
            task_rewards,
        } => {
            assert_eq!(*duration_hours, 6);
            assert_eq!(*winners_cap, 3);
            assert_eq!(*winner_payout, Some(Honors::from_whole(6_000)));
            assert!(task_rewards.is_empty());
        }
        _ => panic!("expected degen model"),
    }

    // Completions count toward stats and counters but pay nothing now.
    let receipt = engine
        .record_task_completion(&mission.id, &bob, &TaskId::new("comment"), None, now)
        .await
        .unwrap();
    assert!(receipt.newly_completed);
    assert!(receipt.credited.is_zero());

    assert_eq!(engine.wallets.balance(&bob).await.unwrap(), Honors::ZERO);
    let stats = engine.user_stats(&bob).await.unwrap().unwrap();
    assert_eq!(stats.tasks_done, 1);
    assert_eq!(stats.total_earned, Honors::from_whole(150));

    let aggregates = engine.counters.snapshot(&mission.id).await.unwrap();
    assert_eq!(aggregates.total_completions, 1);
    assert_eq!(aggregates.count_for(&TaskId::new("comment")), 1);
}

#[tokio::test]
async fn test_winner_selection_pays_and_records() {
    let engine = engine();
    let now = Utc::now();

    let mission = engine
        .create_mission(degen_draft("creator"), None, now)
        .await
        .unwrap();

    let selections = vec![
        selection("w1", "comment"),
        selection("w2", "comment"),
        selection("w3", "comment"),
    ];
    let receipt = engine.select_winners(&mission.id, &selections).await.unwrap();
    assert_eq!(receipt.winners_paid, 3);
    assert_eq!(receipt.total_paid, Honors::from_whole(18_000));
    // Per-winner USD deltas truncate at the sixth decimal.
    assert_eq!(receipt.total_usd, Usd::from_base_units(39_999_999));
    assert_eq!(receipt.stats_failures, 0);

    for w in ["w1", "w2", "w3"] {
        let user = UserId::new(w);
        assert_eq!(
            engine.wallets.balance(&user).await.unwrap(),
            Honors::from_whole(6_000)
        );
        let history = engine.wallets.history(&user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, LedgerReason::DegenPayout);
        assert_eq!(history[0].mission_id.as_ref(), Some(&mission.id));

        let stats = engine.user_stats(&user).await.unwrap().unwrap();
        assert_eq!(stats.tasks_done, 1);
        assert_eq!(stats.total_earned, Honors::from_whole(6_000));

        // The winner record backs the batch path, so nothing drifts.
        let report = engine.reconcile_user(&user).await.unwrap();
        assert!(!report.drifted);
    }
}

#[tokio::test]
async fn test_select_winners_guards() {
    let engine = engine();
    let now = Utc::now();

    let fixed = engine
        .create_mission(fixed_draft("creator"), Some(now + Duration::hours(48)), now)
        .await
        .unwrap();
    let err = engine
        .select_winners(&fixed.id, &[selection("w1", "like")])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotDegenMission(_)));

    // An empty selection distributes nothing and succeeds.
    let degen = engine
        .create_mission(degen_draft("creator"), None, now)
        .await
        .unwrap();
    let receipt = engine.select_winners(&degen.id, &[]).await.unwrap();
    assert_eq!(receipt.winners_paid, 0);
    assert!(receipt.total_paid.is_zero());
}

#[tokio::test]
async fn test_missing_and_deleted_mission_guards() {
    let engine = engine();
    let now = Utc::now();
    let alice = UserId::new("alice");

    let err = engine
        .record_task_completion(
            &MissionId::new("nope"),
            &alice,
            &TaskId::new("like"),
            None,
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MissionNotFound(_)));

    let mission = engine
        .create_mission(fixed_draft("creator"), Some(now + Duration::hours(48)), now)
        .await
        .unwrap();

    let err = engine
        .record_task_completion(&mission.id, &alice, &TaskId::new("follow"), None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TaskNotInMission { .. }));

    engine.delete_mission(&mission.id).await.unwrap();
    assert!(engine.mission(&mission.id).await.unwrap().deleted);

    let err = engine
        .record_task_completion(&mission.id, &alice, &TaskId::new("like"), None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MissionDeleted(_)));
}

#[tokio::test]
async fn test_task_cap_blocks_completion_and_completes_mission() {
    let config = EngineConfig {
        pricing: PricingConfig {
            min_fixed_cap: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = engine_with(config);
    let now = Utc::now();

    let mission = engine
        .create_mission(
            draft("creator", &["like", "retweet"], ModelRequest::Fixed { cap: 2 }),
            Some(now + Duration::hours(48)),
            now,
        )
        .await
        .unwrap();

    for user in ["u1", "u2"] {
        engine
            .record_task_completion(&mission.id, &UserId::new(user), &TaskId::new("like"), None, now)
            .await
            .unwrap();
    }

    // Cap reached on "like"; a third user is turned away from it but can
    // still complete the other task.
    let err = engine
        .record_task_completion(&mission.id, &UserId::new("u3"), &TaskId::new("like"), None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TaskCapReached { cap: 2, .. }));

    engine
        .record_task_completion(&mission.id, &UserId::new("u1"), &TaskId::new("retweet"), None, now)
        .await
        .unwrap();
    assert_eq!(
        engine.mission_stage(&mission.id, now + Duration::hours(1)).await.unwrap(),
        LifecycleStage::AlmostEnding
    );

    engine
        .record_task_completion(&mission.id, &UserId::new("u2"), &TaskId::new("retweet"), None, now)
        .await
        .unwrap();

    // Every task capped: completed long before the deadline.
    assert_eq!(
        engine.mission_stage(&mission.id, now + Duration::hours(1)).await.unwrap(),
        LifecycleStage::Completed
    );
}

#[tokio::test]
async fn test_degen_stage_follows_time() {
    let engine = engine();
    let now = Utc::now();
    let mission = engine
        .create_mission(degen_draft("creator"), None, now)
        .await
        .unwrap();

    assert_eq!(
        engine.mission_stage(&mission.id, now + Duration::hours(1)).await.unwrap(),
        LifecycleStage::InProgress
    );
    assert_eq!(
        engine
            .mission_stage(&mission.id, now + Duration::minutes(6 * 60 * 9 / 10))
            .await
            .unwrap(),
        LifecycleStage::AlmostEnding
    );
    assert_eq!(
        engine.mission_stage(&mission.id, now + Duration::hours(6)).await.unwrap(),
        LifecycleStage::Completed
    );
}

#[tokio::test]
async fn test_review_flow_end_to_end() {
    let engine = engine();
    let now = Utc::now();
    let alice = UserId::new("alice");

    let mission = engine
        .create_mission(
            draft("creator", &["comment"], ModelRequest::Fixed { cap: 60 }),
            Some(now + Duration::hours(48)),
            now,
        )
        .await
        .unwrap();

    // No completion yet: nothing to review.
    let err = engine
        .open_review(&mission.id, &alice, &TaskId::new("comment"), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CompletionNotFound { .. }));

    engine
        .record_task_completion(
            &mission.id,
            &alice,
            &TaskId::new("comment"),
            Some("https://x.com/alice/status/1790112233445566700".into()),
            now,
        )
        .await
        .unwrap();

    let key = engine
        .open_review(&mission.id, &alice, &TaskId::new("comment"), now)
        .await
        .unwrap();
    // Re-opening is idempotent.
    let again = engine
        .open_review(&mission.id, &alice, &TaskId::new("comment"), now)
        .await
        .unwrap();
    assert_eq!(key, again);

    for (n, rating) in [(1, 4u8), (2, 5), (3, 3)] {
        let r = reviewer(n);
        engine
            .submit_review(&r, &key, rating, &link_of(&r), now)
            .await
            .unwrap();
    }

    let submission = engine.review.submission(&key).await.unwrap();
    assert!(submission.closed);
    assert_eq!(submission.submission_avg, Some(4.0));

    let r4 = reviewer(4);
    let err = engine
        .submit_review(&r4, &key, 5, &link_of(&r4), now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Review(ReviewError::QuorumReached { quorum: 3 })
    ));

    let quality = engine.review.submitter_quality(&alice).await.unwrap();
    assert_eq!(quality.average(), Some(4.0));

    // Each accepted reviewer was paid and counted once, and the stored
    // reward record keeps the batch path in step.
    let r1 = reviewer(1);
    assert_eq!(
        engine.wallets.balance(&r1.id).await.unwrap(),
        Honors::from_whole(50)
    );
    let history = engine.wallets.history(&r1.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason, LedgerReason::ReviewReward);

    let stats = engine.user_stats(&r1.id).await.unwrap().unwrap();
    assert_eq!(stats.reviews_done, 1);
    assert_eq!(stats.total_earned, Honors::from_whole(50));

    let report = engine.reconcile_user(&r1.id).await.unwrap();
    assert!(!report.drifted);
}

#[tokio::test]
async fn test_soft_delete_reconciles_creator() {
    let engine = engine();
    let now = Utc::now();
    let creator = UserId::new("creator");

    let mission = engine
        .create_mission(fixed_draft("creator"), Some(now + Duration::hours(48)), now)
        .await
        .unwrap();
    assert_eq!(
        engine.user_stats(&creator).await.unwrap().unwrap().missions_created,
        1
    );

    engine.delete_mission(&mission.id).await.unwrap();

    // The creation credit was incremental; the rebuild drops the deleted
    // mission and corrects the stored summary downward.
    let report = engine.reconcile_user(&creator).await.unwrap();
    assert!(report.drifted);
    assert_eq!(report.recomputed.missions_created, 0);
    assert_eq!(
        engine.user_stats(&creator).await.unwrap().unwrap().missions_created,
        0
    );
}

#[tokio::test]
async fn test_incremental_matches_batch_over_full_history() {
    let engine = engine();
    let now = Utc::now();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    let fixed = engine
        .create_mission(fixed_draft("creator"), Some(now + Duration::hours(48)), now)
        .await
        .unwrap();
    let degen = engine
        .create_mission(degen_draft("creator"), None, now)
        .await
        .unwrap();

    for task in ["like", "retweet"] {
        engine
            .record_task_completion(&fixed.id, &alice, &TaskId::new(task), None, now)
            .await
            .unwrap();
    }
    engine
        .record_task_completion(&fixed.id, &bob, &TaskId::new("like"), None, now)
        .await
        .unwrap();
    engine
        .record_task_completion(&degen.id, &alice, &TaskId::new("comment"), None, now)
        .await
        .unwrap();

    engine
        .select_winners(&degen.id, &[selection("alice", "comment")])
        .await
        .unwrap();

    let key = engine
        .open_review(&degen.id, &alice, &TaskId::new("comment"), now)
        .await
        .unwrap();
    for (n, rating) in [(1, 5u8), (2, 4), (3, 3)] {
        let r = reviewer(n);
        engine
            .submit_review(&r, &key, rating, &link_of(&r), now)
            .await
            .unwrap();
    }

    // Alice: 3 completions, one winner payout, one completed mission per
    // model. Incremental totals must equal the from-scratch rebuild.
    let stats = engine.user_stats(&alice).await.unwrap().unwrap();
    assert_eq!(stats.tasks_done, 4);
    assert_eq!(stats.missions_completed, 2);
    assert_eq!(stats.total_earned, Honors::from_whole(320 + 150 + 6_000));

    for user in ["creator", "alice", "bob", "reviewer-1", "reviewer-2", "reviewer-3"] {
        let report = engine.reconcile_user(&UserId::new(user)).await.unwrap();
        assert!(!report.drifted, "stats drifted for {user}");
    }
}
