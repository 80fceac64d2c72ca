// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end behaviour of the four widget services.
//!
//! Each test creates an isolated TestHarness over a temp SQLite database with
//! a mock clock. Tests are independent and order-insensitive.

use chrono::Duration;
use nostalgic_core::traits::MarkerKey;
use nostalgic_core::{Clock, NostalgicError, SelectDefinition, SortOrder, WidgetEntity, keys};
use nostalgic_services::bbs::{BbsCreateParams, MessageEdit, PostRequest};
use nostalgic_services::counter::CounterCreateParams;
use nostalgic_services::like::LikeCreateParams;
use nostalgic_services::ranking::{RankingCreateParams, RankingSettingsUpdate, ScoreSubmission};
use nostalgic_services::{NumericWidgetService, SettingsUpdate, WidgetService};
use nostalgic_test_utils::TestHarness;

const TOKEN: &str = "abcd1234";

fn score(name: &str, score: i64) -> ScoreSubmission {
    ScoreSubmission {
        name: name.to_string(),
        score,
        display_score: None,
    }
}

fn post(message: &str) -> PostRequest {
    PostRequest {
        author: None,
        message: message.to_string(),
        selects: Vec::new(),
    }
}

// ---- Counter ----

#[tokio::test]
async fn test_counter_counts_each_visitor_once_per_day() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create("https://a.example", TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let id = entity.id();

    let h1 = TestHarness::visitor("h1");
    let h2 = TestHarness::visitor("h2");
    assert_eq!(counter.increment(id, &h1).await.unwrap().total, 1);
    assert_eq!(counter.increment(id, &h1).await.unwrap().total, 1);
    let data = counter.increment(id, &h2).await.unwrap();
    assert_eq!(data.total, 2);
    assert_eq!(data.today, 2);
    assert_eq!(data.yesterday, 0);
}

#[tokio::test]
async fn test_counter_visitor_counts_again_next_day() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create("https://a.example", TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("h1");

    counter.increment(entity.id(), &visitor).await.unwrap();
    h.clock.advance(Duration::days(1));
    let data = counter.increment(entity.id(), &visitor).await.unwrap();
    assert_eq!(data.total, 2);
    assert_eq!(data.today, 1);
    assert_eq!(data.yesterday, 1);
    assert_eq!(data.week, 2);
    assert_eq!(data.month, 2);

    h.clock.advance(Duration::days(8));
    let data = counter.get_view(entity.id()).await.unwrap();
    assert_eq!(data.today, 0);
    assert_eq!(data.week, 0);
    assert_eq!(data.month, 2);
}

#[tokio::test]
async fn test_counter_concurrent_increments_count_once() {
    let h = TestHarness::new().await.unwrap();
    let counter = h.services.counter.clone();
    let entity = counter
        .create("https://a.example", TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let counter = counter.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            counter.increment(&id, &TestHarness::visitor("same")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(counter.get_view(&id).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_counter_owner_set_value() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create("https://a.example", TOKEN, CounterCreateParams::default())
        .await
        .unwrap();

    let updated = counter.set_value("https://a.example", TOKEN, 500).await.unwrap();
    assert_eq!(updated.total_count, 500);
    assert_eq!(counter.get_view(entity.id()).await.unwrap().total, 500);

    let err = counter.set_value("https://a.example", TOKEN, -1).await.unwrap_err();
    assert!(matches!(err, NostalgicError::Validation(_)));
    let err = counter
        .set_value("https://a.example", "wrongtoken", 1)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid token or entity not found");
}

#[tokio::test]
async fn test_counter_increment_sends_webhook() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let entity = counter
        .create(
            "https://a.example",
            TOKEN,
            CounterCreateParams {
                title: None,
                webhook_url: Some("https://hooks.example.net/counter".into()),
            },
        )
        .await
        .unwrap();

    counter
        .increment(entity.id(), &TestHarness::visitor("h1"))
        .await
        .unwrap();
    counter
        .increment(entity.id(), &TestHarness::visitor("h1"))
        .await
        .unwrap();

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "https://hooks.example.net/counter");
    assert_eq!(sent[0].1.event, "counter.increment");
    assert_eq!(sent[0].1.service_id, entity.id().as_str());
    assert_eq!(sent[0].1.data["total"], 1);
}

// ---- Like ----

#[tokio::test]
async fn test_like_toggle_and_untoggle() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create("https://a.example", TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let v1 = TestHarness::visitor("v1");

    let data = like.toggle(entity.id(), &v1).await.unwrap();
    assert_eq!((data.total, data.user_liked), (1, true));
    let data = like.toggle(entity.id(), &v1).await.unwrap();
    assert_eq!((data.total, data.user_liked), (0, false));
    let data = like.toggle(entity.id(), &v1).await.unwrap();
    assert_eq!((data.total, data.user_liked), (1, true));
}

#[tokio::test]
async fn test_like_double_click_counts_once() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create("https://a.example", TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let v1 = TestHarness::visitor("v1");

    let (a, b) = tokio::join!(like.toggle(entity.id(), &v1), like.toggle(entity.id(), &v1));
    a.unwrap();
    b.unwrap();

    let data = like.get(entity.id(), Some(&v1)).await.unwrap();
    assert_eq!((data.total, data.user_liked), (1, true));
}

#[tokio::test]
async fn test_like_get_reflects_visitor_state() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create("https://a.example", TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let v1 = TestHarness::visitor("v1");
    let v2 = TestHarness::visitor("v2");

    like.toggle(entity.id(), &v1).await.unwrap();
    assert!(like.get(entity.id(), Some(&v1)).await.unwrap().user_liked);
    assert!(!like.get(entity.id(), Some(&v2)).await.unwrap().user_liked);
    assert!(!like.get(entity.id(), None).await.unwrap().user_liked);
    assert_eq!(like.get(entity.id(), None).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_like_state_resets_next_day() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create("https://a.example", TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let v1 = TestHarness::visitor("v1");

    like.toggle(entity.id(), &v1).await.unwrap();
    h.clock.advance(Duration::days(1));
    assert!(!like.get(entity.id(), Some(&v1)).await.unwrap().user_liked);
    let data = like.toggle(entity.id(), &v1).await.unwrap();
    assert_eq!((data.total, data.user_liked), (2, true));
}

#[tokio::test]
async fn test_like_events() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let entity = like
        .create(
            "https://a.example",
            TOKEN,
            LikeCreateParams {
                title: None,
                webhook_url: Some("https://hooks.example.net/like".into()),
            },
        )
        .await
        .unwrap();
    let v1 = TestHarness::visitor("v1");
    like.toggle(entity.id(), &v1).await.unwrap();
    like.toggle(entity.id(), &v1).await.unwrap();
    assert_eq!(h.notifier.events(), vec!["like.like", "like.unlike"]);
}

// ---- Ranking ----

#[tokio::test]
async fn test_ranking_requires_strict_improvement() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create(
            "https://a.example",
            TOKEN,
            RankingCreateParams {
                max_entries: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let player = TestHarness::visitor("p1");

    let outcome = ranking.submit(entity.id(), &player, score("Alice", 10)).await.unwrap();
    assert!(outcome.accepted);

    let outcome = ranking.submit(entity.id(), &player, score("Alice", 5)).await.unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.data.entries[0].score, 10);

    h.clock.advance(Duration::seconds(11));
    let outcome = ranking.submit(entity.id(), &player, score("Alice", 20)).await.unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.entry.unwrap().score, 20);
    assert_eq!(outcome.data.total_entries, 1);
}

#[tokio::test]
async fn test_ranking_concurrent_submissions_keep_highest_score() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create("https://a.example", TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    ranking
        .submit(entity.id(), &TestHarness::visitor("seed"), score("Alice", 10))
        .await
        .unwrap();

    let va = TestHarness::visitor("va");
    let vb = TestHarness::visitor("vb");
    let (a, b) = tokio::join!(
        ranking.submit(entity.id(), &va, score("Alice", 20)),
        ranking.submit(entity.id(), &vb, score("Alice", 15)),
    );
    assert!(a.unwrap().accepted);
    b.unwrap();

    let scores_key = keys::ranking_scores(entity.id());
    assert_eq!(h.storage.sorted_sets.score(&scores_key, "Alice").await.unwrap(), Some(20));
    let data = ranking.get(entity.id(), None).await.unwrap();
    assert_eq!(data.entries.len(), 1);
    assert_eq!(data.entries[0].score, 20);
    assert_eq!(data.total_entries, 1);
}

#[tokio::test]
async fn test_ranking_improvement_ignores_ascending_order() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create(
            "https://golf.example",
            TOKEN,
            RankingCreateParams {
                sort_order: Some(SortOrder::Asc),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let player = TestHarness::visitor("p1");

    ranking.submit(entity.id(), &player, score("Bob", 72)).await.unwrap();
    h.clock.advance(Duration::seconds(11));
    let outcome = ranking.submit(entity.id(), &player, score("Bob", 68)).await.unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.data.entries[0].score, 72);
}

#[tokio::test]
async fn test_ranking_owner_submit_overwrites() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create("https://a.example", TOKEN, RankingCreateParams::default())
        .await
        .unwrap();

    ranking
        .submit(entity.id(), &TestHarness::visitor("p1"), score("Alice", 50))
        .await
        .unwrap();
    let outcome = ranking
        .owner_submit(
            "https://a.example",
            TOKEN,
            &TestHarness::visitor("owner"),
            score("Alice", 5),
        )
        .await
        .unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.data.entries[0].score, 5);
}

#[tokio::test]
async fn test_ranking_cooldown_blocks_rapid_submissions() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create("https://a.example", TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    let player = TestHarness::visitor("p1");

    ranking.submit(entity.id(), &player, score("Alice", 1)).await.unwrap();
    let err = ranking
        .submit(entity.id(), &player, score("Carol", 2))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "please wait before submitting again");

    ranking
        .submit(entity.id(), &TestHarness::visitor("p2"), score("Carol", 2))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(11));
    ranking.submit(entity.id(), &player, score("Dave", 3)).await.unwrap();
}

#[tokio::test]
async fn test_ranking_cap_trims_smallest_scores() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create(
            "https://a.example",
            TOKEN,
            RankingCreateParams {
                max_entries: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for (i, (name, value)) in [("a", 40), ("b", 10), ("c", 30), ("d", 20)].into_iter().enumerate() {
        let visitor = TestHarness::visitor(&format!("p{i}"));
        ranking
            .submit(
                entity.id(),
                &visitor,
                ScoreSubmission {
                    name: name.into(),
                    score: value,
                    display_score: Some(format!("{value} pts")),
                },
            )
            .await
            .unwrap();
    }

    let data = ranking.get(entity.id(), None).await.unwrap();
    let names: Vec<_> = data.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c", "d"]);
    assert_eq!(data.total_entries, 3);
    assert_eq!(data.entries[0].display_score.as_deref(), Some("40 pts"));

    let displays = h
        .storage
        .hashes
        .get_all(&keys::ranking_display(entity.id()))
        .await
        .unwrap();
    assert_eq!(displays.len(), 3);
    assert!(displays.iter().all(|(name, _)| name != "b"));
}

#[tokio::test]
async fn test_ranking_ties_share_rank() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let entity = ranking
        .create("https://a.example", TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    for (i, (name, value)) in [("x", 50), ("y", 50), ("z", 10)].into_iter().enumerate() {
        ranking
            .submit(entity.id(), &TestHarness::visitor(&format!("p{i}")), score(name, value))
            .await
            .unwrap();
    }
    let ranks: Vec<u32> = ranking
        .get(entity.id(), None)
        .await
        .unwrap()
        .entries
        .iter()
        .map(|e| e.rank)
        .collect();
    assert_eq!(ranks, vec![1, 1, 3]);
}

#[tokio::test]
async fn test_ranking_owner_maintenance() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let url = "https://a.example";
    let entity = ranking
        .create(url, TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        ranking
            .submit(entity.id(), &TestHarness::visitor(name), score(name, i as i64))
            .await
            .unwrap();
    }

    let data = ranking.update_score(url, TOKEN, score("a", 99)).await.unwrap();
    assert_eq!(data.entries[0].name, "a");
    let err = ranking.update_score(url, TOKEN, score("nobody", 1)).await.unwrap_err();
    assert!(matches!(err, NostalgicError::NotFound(_)));

    let data = ranking.remove_entry(url, TOKEN, "b").await.unwrap();
    assert_eq!(data.total_entries, 2);

    let updated = ranking
        .update_settings(
            url,
            TOKEN,
            RankingSettingsUpdate {
                max_entries: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_entries, 1);
    assert_eq!(ranking.get(entity.id(), Some(50)).await.unwrap().entries.len(), 1);

    let data = ranking.clear(url, TOKEN).await.unwrap();
    assert!(data.entries.is_empty());
    assert_eq!(data.total_entries, 0);
}

// ---- BBS ----

#[tokio::test]
async fn test_bbs_pagination_and_author_delete() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create(
            "https://a.example",
            TOKEN,
            BbsCreateParams {
                messages_per_page: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut outcomes = Vec::new();
    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        let visitor = TestHarness::visitor(&format!("poster{i}"));
        outcomes.push(bbs.post(entity.id(), &visitor, post(text)).await.unwrap());
    }
    assert_eq!(outcomes[2].data.pagination.page, 2);

    let page1 = bbs.get(entity.id(), Some(1)).await.unwrap();
    let texts: Vec<_> = page1.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(page1.pagination.total_pages, 2);
    assert!(page1.pagination.has_next);

    let page2 = bbs.get(entity.id(), Some(2)).await.unwrap();
    assert_eq!(page2.messages.len(), 1);
    assert_eq!(page2.messages[0].message, "three");
    assert_eq!(page2.messages[0].author, "Anonymous");

    let third = &outcomes[2];
    bbs.delete_message_by_id(entity.id(), &third.message_id, &third.edit_token)
        .await
        .unwrap();
    let data = bbs.get(entity.id(), None).await.unwrap();
    assert_eq!(data.pagination.total_messages, 2);
    assert_eq!(data.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_bbs_page_out_of_range_is_clamped() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create("https://a.example", TOKEN, BbsCreateParams::default())
        .await
        .unwrap();

    let empty = bbs.get(entity.id(), Some(7)).await.unwrap();
    assert_eq!(empty.pagination.page, 1);
    assert!(empty.messages.is_empty());

    bbs.post(entity.id(), &TestHarness::visitor("a"), post("hello"))
        .await
        .unwrap();
    let data = bbs.get(entity.id(), Some(0)).await.unwrap();
    assert_eq!(data.pagination.page, 1);
    assert_eq!(data.messages.len(), 1);
}

#[tokio::test]
async fn test_bbs_edit_requires_matching_token() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create("https://a.example", TOKEN, BbsCreateParams::default())
        .await
        .unwrap();
    let posted = bbs
        .post(entity.id(), &TestHarness::visitor("a"), post("original"))
        .await
        .unwrap();

    let edit = MessageEdit {
        author: None,
        message: "changed".into(),
        selects: None,
    };
    let err = bbs
        .edit_message_by_id(entity.id(), &posted.message_id, "not-the-token", edit.clone())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid edit token");

    let view = bbs
        .edit_message_by_id(entity.id(), &posted.message_id, &posted.edit_token, edit)
        .await
        .unwrap();
    assert_eq!(view.message, "changed");
    assert!(view.edited.is_some());

    let err = bbs
        .delete_message_by_id(entity.id(), "999", &posted.edit_token)
        .await
        .unwrap_err();
    assert!(matches!(err, NostalgicError::NotFound(_)));
}

#[tokio::test]
async fn test_bbs_post_cooldown() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create("https://a.example", TOKEN, BbsCreateParams::default())
        .await
        .unwrap();
    let visitor = TestHarness::visitor("a");

    bbs.post(entity.id(), &visitor, post("first")).await.unwrap();
    let err = bbs.post(entity.id(), &visitor, post("second")).await.unwrap_err();
    assert_eq!(err.to_string(), "please wait before posting again");
    h.clock.advance(Duration::minutes(5));
    bbs.post(entity.id(), &visitor, post("second")).await.unwrap();
}

#[tokio::test]
async fn test_bbs_selects_and_cap() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let entity = bbs
        .create(
            "https://a.example",
            TOKEN,
            BbsCreateParams {
                max_messages: Some(2),
                selects: vec![SelectDefinition {
                    label: "Mood".into(),
                    options: vec!["happy".into(), "sad".into()],
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let bad = PostRequest {
        author: Some("Ann".into()),
        message: "hi".into(),
        selects: vec![Some("angry".into())],
    };
    let err = bbs
        .post(entity.id(), &TestHarness::visitor("a"), bad)
        .await
        .unwrap_err();
    assert!(matches!(err, NostalgicError::Validation(_)));

    for (i, text) in ["m1", "m2", "m3"].into_iter().enumerate() {
        let request = PostRequest {
            author: Some("Ann".into()),
            message: text.into(),
            selects: vec![Some("happy".into())],
        };
        bbs.post(entity.id(), &TestHarness::visitor(&format!("p{i}")), request)
            .await
            .unwrap();
    }
    let data = bbs.get(entity.id(), None).await.unwrap();
    let texts: Vec<_> = data.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["m2", "m3"]);
    assert_eq!(data.messages[0].selects, vec![Some("happy".to_string())]);
}

#[tokio::test]
async fn test_bbs_owner_moderation() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let url = "https://a.example";
    let entity = bbs.create(url, TOKEN, BbsCreateParams::default()).await.unwrap();
    let posted = bbs
        .post(entity.id(), &TestHarness::visitor("a"), post("spam"))
        .await
        .unwrap();

    let edit = MessageEdit {
        author: Some("Mod".into()),
        message: "[removed]".into(),
        selects: None,
    };
    let view = bbs.edit_message(url, TOKEN, &posted.message_id, edit).await.unwrap();
    assert_eq!(view.author, "Mod");

    let data = bbs.delete_message(url, TOKEN, &posted.message_id).await.unwrap();
    assert!(data.messages.is_empty());

    bbs.post(entity.id(), &TestHarness::visitor("b"), post("again"))
        .await
        .unwrap();
    let data = bbs.clear(url, TOKEN).await.unwrap();
    assert_eq!(data.pagination.total_messages, 0);
}

// ---- Shared lifecycle ----

#[tokio::test]
async fn test_duplicate_url_rejected_per_kind() {
    let h = TestHarness::new().await.unwrap();
    h.services
        .counter
        .create("https://a.example/", TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let err = h
        .services
        .counter
        .create("HTTPS://A.EXAMPLE", TOKEN, CounterCreateParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "counter already exists for this url");

    h.services
        .like
        .create("https://a.example", TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_validates_token_and_url() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    assert!(
        counter
            .create("https://a.example", "short", CounterCreateParams::default())
            .await
            .is_err()
    );
    assert!(
        counter
            .create("ftp://a.example", TOKEN, CounterCreateParams::default())
            .await
            .is_err()
    );
    assert!(
        counter
            .create(
                "https://a.example",
                TOKEN,
                CounterCreateParams {
                    title: None,
                    webhook_url: Some("http://127.0.0.1/hook".into()),
                },
            )
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_delete_removes_widget_and_children() {
    let h = TestHarness::new().await.unwrap();
    let counter = &h.services.counter;
    let url = "https://a.example";
    let entity = counter
        .create(url, TOKEN, CounterCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();
    counter.increment(&id, &TestHarness::visitor("a")).await.unwrap();

    let err = counter.delete(url, "wrongtoken").await.unwrap_err();
    assert_eq!(err.to_string(), "invalid token or entity not found");

    counter.delete(url, TOKEN).await.unwrap();
    let err = counter.get_view(&id).await.unwrap_err();
    assert!(matches!(err, NostalgicError::NotFound(_)));

    let key = counter.entity_key(&id);
    let day = h.ctx.calendar.day_of(h.clock.now());
    assert_eq!(h.storage.counters.get(&counter.total_key(&id)).await.unwrap(), 0);
    assert_eq!(h.storage.daily.get(&key, day).await.unwrap(), 0);
    assert!(h.storage.entities.get(&key).await.unwrap().is_none());

    counter.create(url, TOKEN, CounterCreateParams::default()).await.unwrap();
}

#[tokio::test]
async fn test_like_delete_removes_total_and_markers() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let url = "https://a.example";
    let entity = like
        .create(url, TOKEN, LikeCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();
    let v1 = TestHarness::visitor("v1");
    like.toggle(&id, &v1).await.unwrap();

    like.delete(url, TOKEN).await.unwrap();

    let now = h.clock.now();
    let marker = MarkerKey {
        widget: like.entity_key(&id),
        actor: v1.as_str().to_string(),
        marker_type: "like".to_string(),
        partition: h.ctx.calendar.partition(now),
    };
    assert_eq!(h.storage.counters.get(&like.total_key(&id)).await.unwrap(), 0);
    assert!(h.storage.markers.get(&marker, now).await.unwrap().is_none());
    assert!(h.storage.entities.get(&like.entity_key(&id)).await.unwrap().is_none());
    assert!(matches!(
        like.get(&id, None).await.unwrap_err(),
        NostalgicError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_ranking_delete_removes_scores_and_display_scores() {
    let h = TestHarness::new().await.unwrap();
    let ranking = &h.services.ranking;
    let url = "https://a.example";
    let entity = ranking
        .create(url, TOKEN, RankingCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();
    let player = TestHarness::visitor("p1");
    let submission = ScoreSubmission {
        display_score: Some("1:23.4".into()),
        ..score("Alice", 83)
    };
    ranking.submit(&id, &player, submission).await.unwrap();

    ranking.delete(url, TOKEN).await.unwrap();

    let now = h.clock.now();
    let cooldown = MarkerKey {
        widget: ranking.entity_key(&id),
        actor: player.as_str().to_string(),
        marker_type: "submit".to_string(),
        partition: "cooldown".to_string(),
    };
    let scores_key = keys::ranking_scores(&id);
    assert_eq!(h.storage.sorted_sets.count(&scores_key).await.unwrap(), 0);
    assert_eq!(h.storage.sorted_sets.score(&scores_key, "Alice").await.unwrap(), None);
    assert!(h.storage.hashes.get_all(&keys::ranking_display(&id)).await.unwrap().is_empty());
    assert!(h.storage.markers.get(&cooldown, now).await.unwrap().is_none());
    assert!(h.storage.entities.get(&ranking.entity_key(&id)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bbs_delete_removes_messages_and_sequence() {
    let h = TestHarness::new().await.unwrap();
    let bbs = &h.services.bbs;
    let url = "https://a.example";
    let entity = bbs
        .create(url, TOKEN, BbsCreateParams::default())
        .await
        .unwrap();
    let id = entity.id().clone();
    bbs.post(&id, &TestHarness::visitor("p1"), post("hello"))
        .await
        .unwrap();
    bbs.post(&id, &TestHarness::visitor("p2"), post("again"))
        .await
        .unwrap();

    bbs.delete(url, TOKEN).await.unwrap();

    let messages_key = keys::bbs_messages(&id);
    assert_eq!(h.storage.lists.length(&messages_key).await.unwrap(), 0);
    assert!(h.storage.lists.get_item(&messages_key, "1").await.unwrap().is_none());
    assert_eq!(h.storage.counters.get(&keys::bbs_sequence(&id)).await.unwrap(), 0);
    assert!(h.storage.entities.get(&bbs.entity_key(&id)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_settings_changes_title_and_clears_webhook() {
    let h = TestHarness::new().await.unwrap();
    let like = &h.services.like;
    let url = "https://a.example";
    like.create(
        url,
        TOKEN,
        LikeCreateParams {
            title: Some("Hearts".into()),
            webhook_url: Some("https://hooks.example.net/x".into()),
        },
    )
    .await
    .unwrap();

    let updated = like
        .update_settings(
            url,
            TOKEN,
            SettingsUpdate {
                title: Some("Stars".into()),
                webhook_url: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.settings.title.as_deref(), Some("Stars"));
    assert!(updated.settings.webhook_url.is_none());
}
