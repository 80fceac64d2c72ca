// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compensation on partial failure, and the retention sweep.
//!
//! Failures are injected at named repository calls; after each failed
//! mutation the stored state must match what it was before the call.

use chrono::Duration;
use nostalgic_core::{Clock, NostalgicError, ServiceKind, WidgetEntity, keys};
use nostalgic_services::bbs::{BbsCreateParams, PostRequest};
use nostalgic_services::counter::CounterCreateParams;
use nostalgic_services::like::LikeCreateParams;
use nostalgic_services::ranking::{RankingCreateParams, ScoreSubmission};
use nostalgic_services::{NumericWidgetService, WidgetService};
use nostalgic_test_utils::TestHarness;

const TOKEN: &str = "abcd1234";
const URL: &str = "https://a.example";

// ---- Create ----

#[tokio::test]
async fn test_create_undoes_owner_hash_when_mapping_fails() {
    let h = TestHarness::new().await.unwrap();
    h.faults.fail("url_mappings.reserve");
    let err = h
        .services
        .counter
        .create(URL, TOKEN, CounterCreateParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to create counter");
    h.faults.heal_all();

    assert!(h.storage.url_mappings.list(ServiceKind::Counter).await.unwrap().is_empty());
    h.services
        .counter
        .create(URL, TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_undoes_mapping_when_entity_save_fails() {
    let h = TestHarness::new().await.unwrap();
    // The owner hash write goes through; the entity write fails.
    h.faults.fail_after("entities.save", 1);
    let err = h
        .services
        .like
        .create(URL, TOKEN, LikeCreateParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, NostalgicError::Validation(_)));
    h.faults.heal_all();

    assert!(h.storage.url_mappings.list(ServiceKind::Like).await.unwrap().is_empty());
    h.services
        .like
        .create(URL, TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
}

// ---- Counter ----

#[tokio::test]
async fn test_counter_failure_restores_total_and_marker() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create(URL, TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let id = entity.id();
    let visitor = TestHarness::visitor("v");

    h.faults.fail("daily.increment");
    assert!(counter.increment(id, &visitor).await.is_err());
    h.faults.heal_all();
    assert_eq!(h.storage.counters.get(&counter.total_key(id)).await.unwrap(), 0);

    h.faults.fail("entities.save");
    assert!(counter.increment(id, &visitor).await.is_err());
    h.faults.heal_all();
    assert_eq!(h.storage.counters.get(&counter.total_key(id)).await.unwrap(), 0);
    let day = h.ctx.calendar.day_of(h.clock.now());
    assert_eq!(
        h.storage.daily.get(&counter.entity_key(id), day).await.unwrap(),
        0
    );

    // The visit marker was released, so the same visitor still counts today.
    assert_eq!(counter.increment(id, &visitor).await.unwrap().total, 1);
}

// ---- Like ----

#[tokio::test]
async fn test_counter_delete_clears_daily_when_total_cleanup_fails() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create(URL, TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();
    counter.increment(&id, &TestHarness::visitor("a")).await.unwrap();

    h.faults.fail("counters.delete");
    counter.delete(URL, TOKEN).await.unwrap();
    h.faults.heal_all();

    let key = counter.entity_key(&id);
    let day = h.ctx.calendar.day_of(h.clock.now());
    assert_eq!(h.storage.daily.get(&key, day).await.unwrap(), 0);
    assert!(h.storage.entities.get(&key).await.unwrap().is_none());
    assert!(h.storage.url_mappings.list(ServiceKind::Counter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_like_failure_leaves_visitor_able_to_like() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create(URL, TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("v");

    h.faults.fail("entities.save");
    assert!(like.toggle(entity.id(), &visitor).await.is_err());
    h.faults.heal_all();

    let data = like.get(entity.id(), Some(&visitor)).await.unwrap();
    assert_eq!((data.total, data.user_liked), (0, false));
    let data = like.toggle(entity.id(), &visitor).await.unwrap();
    assert_eq!((data.total, data.user_liked), (1, true));
}

#[tokio::test]
async fn test_unlike_failure_keeps_like() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create(URL, TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("v");
    like.toggle(entity.id(), &visitor).await.unwrap();

    h.faults.fail("entities.save");
    assert!(like.toggle(entity.id(), &visitor).await.is_err());
    h.faults.heal_all();

    let data = like.get(entity.id(), Some(&visitor)).await.unwrap();
    assert_eq!((data.total, data.user_liked), (1, true));
}

// ---- Ranking ----

#[tokio::test]
async fn test_ranking_failure_restores_score_and_cooldown() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create(URL, TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("v");
    let submission = ScoreSubmission {
        name: "Alice".into(),
        score: 10,
        display_score: Some("10 pts".into()),
    };

    h.faults.fail("entities.save");
    assert!(ranking.submit(entity.id(), &visitor, submission.clone()).await.is_err());
    h.faults.heal_all();

    let scores_key = keys::ranking_scores(entity.id());
    assert_eq!(h.storage.sorted_sets.score(&scores_key, "Alice").await.unwrap(), None);
    assert_eq!(
        h.storage
            .hashes
            .get(&keys::ranking_display(entity.id()), "Alice")
            .await
            .unwrap(),
        None
    );

    // No cooldown is left behind by the failed attempt.
    let outcome = ranking.submit(entity.id(), &visitor, submission).await.unwrap();
    assert!(outcome.accepted);
}

#[tokio::test]
async fn test_ranking_trim_failure_does_not_fail_submission() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create(
            URL,
            TOKEN,
            RankingCreateParams {
                max_entries: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let scores_key = keys::ranking_scores(entity.id());
    let submit = |name: &str, score: i64| ScoreSubmission {
        name: name.into(),
        score,
        display_score: None,
    };

    ranking
        .submit(entity.id(), &TestHarness::visitor("a"), submit("a", 5))
        .await
        .unwrap();
    h.faults.fail("sorted_sets.remove_range");
    let outcome = ranking
        .submit(entity.id(), &TestHarness::visitor("b"), submit("b", 7))
        .await
        .unwrap();
    h.faults.heal_all();
    assert_eq!(h.storage.sorted_sets.count(&scores_key).await.unwrap(), 2);
    // The stored total tracks what is actually in the set.
    assert_eq!(outcome.data.total_entries, 2);

    ranking
        .submit(entity.id(), &TestHarness::visitor("c"), submit("c", 9))
        .await
        .unwrap();
    assert_eq!(h.storage.sorted_sets.count(&scores_key).await.unwrap(), 1);
    assert_eq!(h.storage.sorted_sets.score(&scores_key, "c").await.unwrap(), Some(9));
    let data = ranking.get(entity.id(), None).await.unwrap();
    assert_eq!(data.total_entries, 1);
}

// ---- BBS ----

#[tokio::test]
async fn test_bbs_failure_removes_message_and_cooldown() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create(URL, TOKEN, BbsCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("v");
    let request = PostRequest {
        author: None,
        message: "hello".into(),
        selects: Vec::new(),
    };

    h.faults.fail("entities.save");
    assert!(bbs.post(entity.id(), &visitor, request.clone()).await.is_err());
    h.faults.heal_all();

    let list_key = keys::bbs_messages(entity.id());
    assert_eq!(h.storage.lists.length(&list_key).await.unwrap(), 0);
    let outcome = bbs.post(entity.id(), &visitor, request).await.unwrap();
    assert_eq!(outcome.data.pagination.total_messages, 1);
}

// ---- Retention sweep ----

#[tokio::test]
async fn test_sweep_purges_idle_widgets_and_orphans() {
    let h = TestHarness::new().await.unwrap();
    let services = &h.services;
    let counter = services
        .counter
        .create(URL, TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    services
        .counter
        .increment(counter.id(), &TestHarness::visitor("v"))
        .await
        .unwrap();
    let like = services
        .like
        .create(URL, TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    services
        .like
        .toggle(like.id(), &TestHarness::visitor("v"))
        .await
        .unwrap();
    h.storage
        .url_mappings
        .reserve(ServiceKind::Bbs, "https://ghost.example", "ghost-example-00000000")
        .await
        .unwrap();

    h.clock.advance(Duration::days(366));
    services
        .like
        .toggle(like.id(), &TestHarness::visitor("v"))
        .await
        .unwrap();

    let report = services.sweeper.run(h.clock.now()).await.unwrap();
    assert_eq!(report.examined, 3);
    assert_eq!(report.purged, 2);
    assert_eq!(report.markers_purged, 1);

    let err = services.counter.get_view(counter.id()).await.unwrap_err();
    assert!(matches!(err, NostalgicError::NotFound(_)));
    assert_eq!(services.like.get(like.id(), None).await.unwrap().total, 2);
    assert!(h.storage.url_mappings.list(ServiceKind::Bbs).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sweep_keeps_recent_widgets() {
    let h = TestHarness::new().await.unwrap();
    h.services
        .bbs
        .create(URL, TOKEN, BbsCreateParams::default())
        .await
        .unwrap();
    h.clock.advance(Duration::days(364));
    let report = h.services.sweeper.run(h.clock.now()).await.unwrap();
    assert_eq!(report.examined, 1);
    assert_eq!(report.purged, 0);
}
