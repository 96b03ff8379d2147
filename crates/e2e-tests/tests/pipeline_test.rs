//! Full pipeline E2E tests: export document in, story and share token out.

use chrono::FixedOffset;
use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{
    alternating_turns, at, chatgpt_conversation, claude_conversation, TestHarness, Turn,
};
use wrapped_analytics::{persona_by_title, Aggregator};
use wrapped_parsers::parse_export;
use wrapped_story::{decode_share_token, Step};
use wrapped_types::{AnalyticsResult, Platform};

/// Ten exchanges over Monday to Wednesday of one week, all at 14:00 UTC.
fn three_weekday_export() -> serde_json::Value {
    let mut days = vec![(2024, 3, 4); 4];
    days.extend([(2024, 3, 5); 3]);
    days.extend([(2024, 3, 6); 3]);
    let turns = alternating_turns(&days, 14, "tomato garden planning");
    json!([chatgpt_conversation("c1", "Garden", &turns)])
}

fn titles(story: &[Step]) -> Vec<&str> {
    story.iter().map(Step::title).collect()
}

#[tokio::test]
async fn test_three_weekday_scenario() {
    let harness = TestHarness::new();
    let report = harness
        .pipeline
        .run(&three_weekday_export().to_string(), "ChatGPT")
        .await
        .unwrap();
    let a = &report.analytics;

    assert_eq!(a.platform, Platform::ChatGpt);
    assert_eq!(a.total_conversations, 1);
    assert_eq!(a.total_messages, 20);
    assert_eq!(a.user_message_count, 10);
    assert_eq!(a.assistant_message_count, 10);
    assert_eq!(a.avg_messages_per_convo, 20.0);
    assert_eq!(a.monthly_activity.len(), 1);
    assert_eq!(a.monthly_activity[0].month, "Mar 2024");
    assert_eq!(a.busiest_day.day, "Monday");
    assert_eq!(a.busiest_day.count, 8);
    assert_eq!(a.busiest_hour.hour, "14:00");
    assert_eq!(a.busiest_hour.count, 20);
    assert_eq!(a.active_days, 3);
    assert_eq!(a.longest_streak, 3);
    assert_eq!(a.first_chat_date, at(2024, 3, 4, 14, 0));
    assert_eq!(a.word_frequency[0].text, "tomato");
    assert_eq!(a.word_frequency[0].value, 10);
    assert!(persona_by_title(&a.user_persona.title).is_some());

    assert_eq!(
        titles(&report.story),
        vec![
            "Your Year in Review",
            "Message Volume",
            "Deep Dives",
            "Your Top Topic",
            "Busiest Day of the Week",
            "Most Active Hour",
            "Pop Quiz!",
            "Your AI Personality Is...",
        ]
    );

    match &report.story[3] {
        Step::Stat { value, .. } => assert_eq!(value, "Tomato Enthusiast"),
        other => panic!("Expected top topic stat, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chatgpt_skips_system_hidden_and_empty_messages() {
    let ts = at(2024, 5, 1, 9, 0).timestamp() as f64;
    let doc = json!([
        {
            "id": "with-noise",
            "title": "Noise",
            "create_time": ts,
            "mapping": {
                "root": {"message": null},
                "sys": {"message": {
                    "author": {"role": "system"},
                    "content": {"content_type": "text", "parts": ["You are helpful"]},
                    "create_time": ts
                }},
                "hidden": {"message": {
                    "author": {"role": "user"},
                    "content": {"content_type": "text", "parts": ["custom instructions"]},
                    "create_time": ts,
                    "metadata": {"is_visually_hidden_from_conversation": true}
                }},
                "blank": {"message": {
                    "author": {"role": "assistant"},
                    "content": {"content_type": "text", "parts": [""]},
                    "create_time": ts + 5.0
                }},
                "q": {"message": {
                    "author": {"role": "user"},
                    "content": {"content_type": "text", "parts": ["Which bread rises fastest?"]},
                    "create_time": ts + 10.0
                }},
                "a": {"message": {
                    "author": {"role": "assistant"},
                    "content": {"content_type": "text", "parts": ["Focaccia, usually."]},
                    "create_time": ts + 20.0
                }}
            }
        },
        chatgpt_conversation(
            "second",
            "Second",
            &[Turn::user("sourdough starter feeding", at(2024, 5, 2, 9, 0))],
        ),
    ]);

    let conversations = parse_export(&doc.to_string(), "chatgpt").unwrap();
    assert_eq!(conversations.len(), 2);
    let contents: Vec<&str> = conversations[0]
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(contents, vec!["Which bread rises fastest?", "Focaccia, usually."]);

    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "ChatGPT")
        .await
        .unwrap();
    assert_eq!(report.analytics.total_messages, 3);
    assert_eq!(report.analytics.user_message_count, 2);
    assert_eq!(report.analytics.avg_messages_per_convo, 1.5);
}

#[tokio::test]
async fn test_histograms_sum_to_total() {
    let turns = vec![
        Turn::user("first light question", at(2024, 1, 7, 6, 15)),
        Turn::assistant("answer", at(2024, 1, 7, 6, 16)),
        Turn::user("midnight snack ideas", at(2024, 2, 14, 0, 5)),
        Turn::assistant("answer", at(2024, 2, 14, 0, 6)),
        Turn::user("weekend plans", at(2024, 4, 20, 18, 40)),
    ];
    let doc = json!([claude_conversation("c1", "Mixed", &turns)]);

    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "Claude")
        .await
        .unwrap();
    let a = &report.analytics;

    assert_eq!(a.daily_activity.len(), 7);
    assert_eq!(a.hourly_activity.len(), 24);
    let daily: usize = a.daily_activity.iter().map(|d| d.count).sum();
    let hourly: usize = a.hourly_activity.iter().map(|h| h.count).sum();
    let monthly: usize = a.monthly_activity.iter().map(|m| m.count).sum();
    assert_eq!(daily, a.total_messages);
    assert_eq!(hourly, a.total_messages);
    assert_eq!(monthly, a.total_messages);

    let months: Vec<&str> = a.monthly_activity.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["Jan 2024", "Feb 2024", "Apr 2024"]);
    assert!(titles(&report.story).contains(&"Monthly Activity"));
}

#[tokio::test]
async fn test_streak_bounded_by_active_days() {
    let days = [
        (2024, 6, 1),
        (2024, 6, 2),
        (2024, 6, 3),
        (2024, 6, 5),
        (2024, 6, 6),
        (2024, 6, 30),
    ];
    let doc = json!([claude_conversation(
        "c1",
        "Streaks",
        &alternating_turns(&days, 12, "daily check in")
    )]);

    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "Claude")
        .await
        .unwrap();
    assert_eq!(report.analytics.active_days, 6);
    assert_eq!(report.analytics.longest_streak, 3);
    assert!(report.analytics.longest_streak <= report.analytics.active_days);
}

#[tokio::test]
async fn test_offset_moves_calendar_buckets() {
    // 02:30 UTC on a Saturday is 21:30 Friday at UTC-5.
    let turns = [Turn::user("late reading list", at(2024, 3, 9, 2, 30))];
    let doc = json!([claude_conversation("c1", "Late", &turns)]).to_string();
    let harness = TestHarness::new();

    let utc = harness.pipeline.run(&doc, "Claude").await.unwrap();
    assert_eq!(utc.analytics.busiest_day.day, "Saturday");
    assert_eq!(utc.analytics.busiest_hour.hour, "2:00");

    let shifted = harness
        .pipeline
        .clone()
        .with_offset(FixedOffset::west_opt(5 * 3600).unwrap())
        .run(&doc, "Claude")
        .await
        .unwrap();
    assert_eq!(shifted.analytics.busiest_day.day, "Friday");
    assert_eq!(shifted.analytics.busiest_hour.hour, "21:00");
    assert_eq!(
        shifted.analytics.first_chat_date,
        utc.analytics.first_chat_date
    );
}

#[tokio::test]
async fn test_seeded_runs_are_identical() {
    let doc = three_weekday_export().to_string();
    let first = TestHarness::with_seed(7).pipeline.run(&doc, "ChatGPT").await.unwrap();
    let second = TestHarness::with_seed(7).pipeline.run(&doc, "ChatGPT").await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_first_matching_persona_wins() {
    // Every message lands at 23:00, so the night detector also matches,
    // but the philosophy detector is evaluated first.
    let days: Vec<(i32, u32, u32)> = (1..=6).map(|d| (2024, 9, d)).collect();
    let doc = json!([claude_conversation(
        "c1",
        "Late thoughts",
        &alternating_turns(&days, 23, "I think")
    )]);
    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "Claude")
        .await
        .unwrap();
    assert_eq!(report.analytics.user_persona.title, "The Philosopher");

    let doc = json!([claude_conversation(
        "c1",
        "Late chats",
        &alternating_turns(&days, 23, "lamp")
    )]);
    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "Claude")
        .await
        .unwrap();
    assert_eq!(report.analytics.user_persona.title, "The Night Owl");

    match report.story.last() {
        Some(Step::Persona { persona_title, .. }) => {
            assert_eq!(persona_title, "🌙 The Night Owl 🌙")
        }
        other => panic!("Expected persona step last, got {other:?}"),
    }
}

#[tokio::test]
async fn test_assistant_only_export_is_silent_observer() {
    let turns = [Turn::assistant("Welcome back!", at(2024, 2, 1, 10, 0))];
    let doc = json!([claude_conversation("c1", "Hello", &turns)]);
    let report = TestHarness::new()
        .pipeline
        .run(&doc.to_string(), "Claude")
        .await
        .unwrap();

    assert_eq!(report.analytics.user_message_count, 0);
    assert_eq!(report.analytics.user_persona.title, "The Silent Observer");
}

#[tokio::test]
async fn test_trivia_is_well_formed() {
    for seed in 0..20 {
        let report = TestHarness::with_seed(seed)
            .pipeline
            .run(&three_weekday_export().to_string(), "ChatGPT")
            .await
            .unwrap();
        let question = report
            .story
            .iter()
            .find_map(|step| match step {
                Step::Trivia { question, .. } => Some(question),
                _ => None,
            })
            .expect("story has a trivia step");

        assert_eq!(question.options.len(), 4, "seed {seed}");
        assert!(question.correct_answer_index < question.options.len());
        let mut unique = question.options.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4, "duplicate options for seed {seed}");
    }
}

#[tokio::test]
async fn test_share_token_round_trip() {
    let report = TestHarness::new()
        .pipeline
        .run(&three_weekday_export().to_string(), "ChatGPT")
        .await
        .unwrap();

    let decoded = decode_share_token(&report.share_token).unwrap();
    assert!(decoded.user_messages.is_empty());
    assert_eq!(
        decoded,
        AnalyticsResult {
            user_messages: Vec::new(),
            ..report.analytics.clone()
        }
    );
}

#[tokio::test]
async fn test_export_read_from_disk() {
    let harness = TestHarness::new();
    let path = harness.write_export("conversations.json", &three_weekday_export());

    let raw = std::fs::read_to_string(&path).unwrap();
    let report = harness.pipeline.run(&raw, "gpt").await.unwrap();
    assert_eq!(report.analytics.total_messages, 20);
}

#[test]
fn test_aggregate_parsed_claude_export() {
    let turns = alternating_turns(&[(2023, 12, 31), (2024, 1, 1)], 20, "new year");
    let doc = json!({ "conversations": [claude_conversation("c1", "NYE", &turns)] });

    let conversations = parse_export(&doc.to_string(), "Claude").unwrap();
    let analytics = Aggregator::new(Platform::Claude).aggregate(&conversations).unwrap();
    assert_eq!(analytics.monthly_activity.len(), 2);
    assert_eq!(analytics.monthly_activity[0].month, "Dec 2023");
    assert_eq!(analytics.longest_streak, 2);
}
