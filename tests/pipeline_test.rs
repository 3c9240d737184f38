// End-to-end pipeline behaviour
//
// Trains a classifier on a small synthetic dataset, then drives sessions
// through the public pipeline API.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use mindguard::analysis::{RiskLevel, RiskRule};
use mindguard::config::SessionConfig;
use mindguard::crisis::{KeywordCatalog, CRISIS_RESPONSE};
use mindguard::errors::PipelineError;
use mindguard::models::{MemoryArtifactStore, StateClassifier, StateLabel};
use mindguard::pipeline::{Pipeline, TECHNICAL_DIFFICULTY_RESPONSE};
use mindguard::providers::{FallbackResponder, ResponseGenerator};
use mindguard::recommend::{CRISIS_RESOURCES, EMERGENCY_ACTIONS};
use mindguard::session::{Role, SessionStore, Turn};

fn trained_pipeline() -> Pipeline {
    let temp_dir = TempDir::new().unwrap();
    let dataset = common::write_dataset(temp_dir.path());
    let store = MemoryArtifactStore::new();
    let classifier = StateClassifier::initialize(&store, Some(&dataset), &common::training_config());
    assert!(classifier.is_ready());

    Pipeline::new(
        Arc::new(KeywordCatalog::builtin()),
        classifier,
        Arc::new(SessionStore::new(SessionConfig::default())),
    )
}

struct Unreachable;

#[async_trait::async_trait]
impl ResponseGenerator for Unreachable {
    async fn generate(&self, _user_text: &str, _context: &[Turn]) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

#[test]
fn test_worried_conversation_follows_decision_table() {
    let pipeline = trained_pipeline();
    pipeline
        .record_turn(
            "anxious",
            Role::User,
            "I'm really worried about everything, can't sleep, feeling overwhelmed",
        )
        .unwrap();

    let report = pipeline.end_session("anxious").unwrap();
    let analysis = &report.analysis;
    let label = analysis.classification.predicted_state;

    assert!(!analysis.fallback);
    assert!(matches!(label, StateLabel::Anxiety | StateLabel::Normal));
    assert_eq!(analysis.conversation_insights.crisis_indicators, 0);
    assert_eq!(analysis.conversation_insights.anxiety_indicators, 2);

    // Anxiety is medium either way: confident, or through the default row
    let expected = match label {
        StateLabel::Normal => RiskLevel::Low,
        _ => RiskLevel::Medium,
    };
    assert_eq!(analysis.risk_level, expected);
    assert_eq!(report.recommendations.primary_concern, label);
}

#[test]
fn test_probabilities_cover_all_labels() {
    let pipeline = trained_pipeline();
    let analysis = pipeline
        .analyze(&["manic energy and spending sprees with wild mood swings"])
        .unwrap();

    let probabilities = &analysis.classification.state_probabilities;
    assert_eq!(probabilities.len(), 5);
    let total: f64 = probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert_eq!(analysis.classification.predicted_state, StateLabel::Bipolar);
    assert_eq!(
        analysis.classification.confidence,
        probabilities[&StateLabel::Bipolar]
    );
}

#[tokio::test]
async fn test_crisis_message_mid_conversation() {
    let pipeline = trained_pipeline();
    let responder = FallbackResponder::new();

    let first = pipeline
        .handle_message(&responder, None, "Hi, I just wanted to talk")
        .await
        .unwrap();
    assert!(!first.is_crisis);
    let session_id = first.session_id.clone().unwrap();

    let crisis = pipeline
        .handle_message(&responder, Some(&session_id), "I want to kill myself")
        .await
        .unwrap();
    assert!(crisis.is_crisis);
    assert_eq!(crisis.response, CRISIS_RESPONSE);
    assert_eq!(crisis.session_id.as_deref(), Some(session_id.as_str()));

    let transcript = pipeline.sessions().transcript(&session_id).unwrap();
    assert!(transcript
        .iter()
        .any(|t| t.role == Role::User && t.content == "I want to kill myself"));

    let report = pipeline.end_session(&session_id).unwrap();
    assert!(report.analysis.conversation_insights.crisis_indicators >= 1);
    assert_eq!(report.analysis.risk_level, RiskLevel::High);
    assert_eq!(report.recommendations.professional_resources, CRISIS_RESOURCES.to_vec());
    assert_eq!(report.recommendations.immediate_actions, EMERGENCY_ACTIONS.to_vec());
    assert_eq!(report.session_summary.user_messages, 2);
    assert_eq!(report.session_summary.total_messages, 4);
}

#[tokio::test]
async fn test_crisis_reply_survives_degraded_classifier_and_full_store() {
    let pipeline = Pipeline::new(
        Arc::new(KeywordCatalog::builtin()),
        StateClassifier::uninitialized(),
        Arc::new(SessionStore::new(SessionConfig {
            max_sessions: 0,
            ..SessionConfig::default()
        })),
    );

    let reply = pipeline
        .handle_message(&FallbackResponder::new(), None, "I keep thinking about suicide")
        .await
        .unwrap();
    assert!(reply.is_crisis);
    assert_eq!(reply.response, CRISIS_RESPONSE);
    assert!(reply.session_id.is_none());

    // Non-crisis messages do need a session
    let result = pipeline
        .handle_message(&FallbackResponder::new(), None, "hello")
        .await;
    assert!(matches!(result, Err(PipelineError::SessionLimit { .. })));
}

#[tokio::test]
async fn test_generator_failure_returns_technical_reply() {
    let pipeline = trained_pipeline();
    let reply = pipeline
        .handle_message(&Unreachable, Some("s"), "I had a long day")
        .await
        .unwrap();

    assert!(!reply.is_crisis);
    assert_eq!(reply.response, TECHNICAL_DIFFICULTY_RESPONSE);
    assert_eq!(pipeline.sessions().transcript("s").unwrap().len(), 2);
}

#[test]
fn test_session_state_errors() {
    let pipeline = trained_pipeline();

    assert!(matches!(
        pipeline.end_session("does-not-exist"),
        Err(PipelineError::SessionNotFound(_))
    ));

    let empty = pipeline.sessions().create().unwrap();
    assert!(matches!(
        pipeline.end_session(&empty),
        Err(PipelineError::NoDataToAnalyze(_))
    ));
    // Still active and usable afterwards
    pipeline.record_turn(&empty, Role::User, "ok now I have something").unwrap();
    assert!(pipeline.end_session(&empty).is_ok());
}

#[test]
fn test_end_session_idempotent_and_info_private() {
    let pipeline = trained_pipeline();
    pipeline
        .record_turn("s", Role::User, "hopeless and exhausted, staying in bed all week")
        .unwrap();

    let first = pipeline.end_session("s").unwrap();
    let second = pipeline.end_session("s").unwrap();
    assert_eq!(
        first.analysis.analysis_timestamp,
        second.analysis.analysis_timestamp
    );
    assert_eq!(first.analysis.classification, second.analysis.classification);

    let info = pipeline.sessions().info("s").unwrap();
    assert!(!info.active);
    assert!(info.ended_at.is_some());
    assert_eq!(info.message_count, 1);
    assert!(info.analysis.is_some());

    let json = serde_json::to_string(&info).unwrap();
    assert!(!json.contains("staying in bed"));
    let bundle_json = serde_json::to_string(&first.recommendations).unwrap();
    assert!(!bundle_json.contains("staying in bed"));
}

#[test]
fn test_suicidal_classification_is_high_risk() {
    let pipeline = trained_pipeline();
    let analysis = pipeline
        .analyze(&["I dont want to live anymore and keep writing goodbye letters"])
        .unwrap();

    assert_eq!(analysis.classification.predicted_state, StateLabel::Suicidal);
    assert_eq!(analysis.risk_rule, RiskRule::SuicidalState);
    assert_eq!(analysis.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn test_concurrent_messages_to_one_session() {
    let pipeline = Arc::new(trained_pipeline());
    let responder = Arc::new(FallbackResponder::new());
    let session_id = pipeline.sessions().create().unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let pipeline = Arc::clone(&pipeline);
        let responder = Arc::clone(&responder);
        let session_id = session_id.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .handle_message(&*responder, Some(&session_id), &format!("message {}", i))
                .await
                .map(|reply| reply.is_crisis)
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().unwrap());
    }

    let transcript = pipeline.sessions().transcript(&session_id).unwrap();
    assert_eq!(transcript.len(), 32);
    assert_eq!(transcript.iter().filter(|t| t.role == Role::User).count(), 16);
}

/// Replies slowly to "first", immediately to anything else, and records the
/// context each call saw
#[derive(Default)]
struct SlowFirst {
    seen: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait::async_trait]
impl ResponseGenerator for SlowFirst {
    async fn generate(&self, user_text: &str, context: &[Turn]) -> anyhow::Result<String> {
        let earlier = context.iter().map(|t| t.content.clone()).collect();
        self.seen.lock().unwrap().push((user_text.to_string(), earlier));
        if user_text == "first" {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(format!("reply to {}", user_text))
    }

    fn name(&self) -> &str {
        "slow-first"
    }
}

#[tokio::test]
async fn test_user_turns_keep_arrival_order() {
    let pipeline = Arc::new(trained_pipeline());
    let generator = Arc::new(SlowFirst::default());
    let session_id = pipeline.sessions().create().unwrap();

    let slow = {
        let pipeline = Arc::clone(&pipeline);
        let generator = Arc::clone(&generator);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            pipeline
                .handle_message(&*generator, Some(&session_id), "first")
                .await
                .map(|reply| reply.response)
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = pipeline
        .handle_message(&*generator, Some(&session_id), "second")
        .await
        .unwrap();
    assert_eq!(second.response, "reply to second");
    assert_eq!(slow.await.unwrap().unwrap(), "reply to first");

    let user_turns: Vec<String> = pipeline
        .sessions()
        .transcript(&session_id)
        .unwrap()
        .into_iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content)
        .collect();
    assert_eq!(user_turns, vec!["first", "second"]);

    // The later reply was generated with the earlier message in view
    let seen = generator.seen.lock().unwrap();
    let (_, context) = seen.iter().find(|(text, _)| text == "second").unwrap();
    assert_eq!(context, &vec!["first".to_string()]);
}
