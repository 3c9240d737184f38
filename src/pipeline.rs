// Conversation risk and state inference pipeline
//
// Per message: crisis gate, then generation, then transcript append.
// Per session end: signal counting and classification over the user turns,
// risk escalation, recommendation selection.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::analysis::{assess_risk_with_rule, count_signals, ConversationInsights, RiskLevel, RiskRule};
use crate::config::Config;
use crate::crisis::{CrisisDetector, KeywordCatalog, CRISIS_RESPONSE};
use crate::errors::{ClassifyError, PipelineError, PipelineResult};
use crate::models::{ClassificationResult, DirArtifactStore, StateClassifier};
use crate::providers::ResponseGenerator;
use crate::recommend::{select, RecommendationBundle};
use crate::session::{Role, SessionStore};
use crate::text;

/// Reply used when the generator fails; still lists crisis contacts
pub const TECHNICAL_DIFFICULTY_RESPONSE: &str = "I'm experiencing some technical difficulties right now, but I'm still here to support you.

If you're in crisis, please don't wait:
• Call 988 (Suicide & Crisis Lifeline)
• Text HOME to 741741 (Crisis Text Line)
• Call 911 for emergencies

I'll be back online shortly to continue our conversation.";

/// Psychological analysis of one ended session
#[derive(Debug, Clone, Serialize)]
pub struct ConversationAnalysis {
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub risk_level: RiskLevel,
    /// Decision-table row that produced `risk_level`
    pub risk_rule: RiskRule,
    pub conversation_insights: ConversationInsights,
    pub analysis_timestamp: DateTime<Utc>,
    /// Number of user turns analyzed
    pub total_messages: usize,
    /// Characters in the joined user text
    pub conversation_length: usize,
    /// True when the classifier could not run and the fallback result was used
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub total_messages: usize,
    pub user_messages: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Everything returned by `end_session`
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub analysis: ConversationAnalysis,
    pub recommendations: RecommendationBundle,
    pub session_summary: SessionSummary,
}

/// Outcome of one inbound chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// Absent only when a crisis reply was sent but no session could be recorded
    pub session_id: Option<String>,
    pub is_crisis: bool,
    pub timestamp: DateTime<Utc>,
}

/// Pipeline handle, constructed once by the host and shared by reference
pub struct Pipeline {
    catalog: Arc<KeywordCatalog>,
    detector: CrisisDetector,
    classifier: StateClassifier,
    sessions: Arc<SessionStore>,
}

impl Pipeline {
    pub fn new(
        catalog: Arc<KeywordCatalog>,
        classifier: StateClassifier,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            detector: CrisisDetector::new(Arc::clone(&catalog)),
            catalog,
            classifier,
            sessions,
        }
    }

    /// Build from configuration: keyword catalog, classifier, session store
    ///
    /// Only an unreadable keyword catalog is fatal. A missing model leaves the
    /// classifier degraded and analyses fall back.
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        let catalog = match &config.keywords_path {
            Some(path) => KeywordCatalog::load_from_file(path)
                .with_context(|| format!("Failed to load keywords from {}", path.display()))?,
            None => KeywordCatalog::builtin(),
        };
        tracing::info!(version = catalog.version, "Loaded keyword catalog");

        let store = DirArtifactStore::new(&config.model_dir);
        let classifier = StateClassifier::initialize(
            &store,
            config.dataset_path.as_deref(),
            &config.training,
        );
        if !classifier.is_ready() {
            tracing::error!(model_dir = %config.model_dir.display(), "State classifier unavailable, using fallback analysis");
        }

        let sessions = Arc::new(SessionStore::new(config.sessions.clone()));
        Ok(Self::new(Arc::new(catalog), classifier, sessions))
    }

    pub fn normalize(&self, raw: &str) -> String {
        text::normalize(raw)
    }

    pub fn detects_crisis(&self, raw: &str) -> bool {
        self.detector.detects_crisis(raw)
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn classifier(&self) -> &StateClassifier {
        &self.classifier
    }

    pub fn catalog(&self) -> &KeywordCatalog {
        &self.catalog
    }

    /// Append a turn, creating the session on first use
    pub fn record_turn(&self, session_id: &str, role: Role, content: &str) -> PipelineResult<()> {
        self.sessions.get_or_create(Some(session_id))?;
        self.sessions.append_turn(session_id, role, content)?;
        Ok(())
    }

    /// Handle one inbound user message
    ///
    /// The crisis check runs first and needs nothing else to work: if the
    /// session cannot be created or written, the crisis reply is still
    /// returned. Generator failures produce the technical-difficulty reply.
    ///
    /// The user turn is stored before the generator runs and the reply after
    /// it returns. Each generator sees every message received before its own.
    pub async fn handle_message(
        &self,
        generator: &dyn ResponseGenerator,
        session_id: Option<&str>,
        message: &str,
    ) -> PipelineResult<ChatReply> {
        let is_crisis = self.detects_crisis(message);

        if is_crisis {
            let recorded = self.sessions.get_or_create(session_id).and_then(|id| {
                self.sessions.append_turn(&id, Role::User, message)?;
                self.sessions.append_turn(&id, Role::Assistant, CRISIS_RESPONSE)?;
                Ok(id)
            });
            let session_id = match recorded {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to record crisis message");
                    session_id.map(str::to_string)
                }
            };
            return Ok(ChatReply {
                response: CRISIS_RESPONSE.to_string(),
                session_id,
                is_crisis: true,
                timestamp: Utc::now(),
            });
        }

        // The user turn lands before generation; the reply is appended when
        // it is ready, so concurrent exchanges on one session may interleave
        let id = self.sessions.get_or_create(session_id)?;
        let context = self.sessions.begin_exchange(&id, message)?;

        let response = match generator.generate(message, &context).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(session_id = %id, generator = generator.name(), error = %e, "Response generation failed");
                TECHNICAL_DIFFICULTY_RESPONSE.to_string()
            }
        };

        self.sessions.append_turn(&id, Role::Assistant, &response)?;

        Ok(ChatReply {
            response,
            session_id: Some(id),
            is_crisis: false,
            timestamp: Utc::now(),
        })
    }

    /// End a session and produce its analysis and recommendations
    ///
    /// Repeated calls return the cached report.
    pub fn end_session(&self, session_id: &str) -> PipelineResult<SessionReport> {
        self.sessions.with_session(session_id, |session| {
            if let Some(report) = session.report() {
                return Ok(report.clone());
            }
            if session.turns().is_empty() {
                tracing::warn!(session_id = %session_id, "No messages found in session");
                return Err(PipelineError::NoDataToAnalyze(session_id.to_string()));
            }

            tracing::info!(session_id = %session_id, "Performing psychological analysis");
            let user_turns = session.user_turns();
            let analysis = self.analyze(&user_turns)?;
            let recommendations = select(
                analysis.classification.predicted_state,
                analysis.risk_level,
                analysis.classification.confidence,
            );

            let ended_at = Utc::now();
            let report = SessionReport {
                session_id: session_id.to_string(),
                session_summary: SessionSummary {
                    total_messages: session.turns().len(),
                    user_messages: user_turns.len(),
                    started_at: session.created_at,
                    ended_at,
                },
                analysis,
                recommendations,
            };

            session.finish(ended_at, report.clone());
            tracing::info!(
                session_id = %session_id,
                label = %report.analysis.classification.predicted_state,
                risk = %report.analysis.risk_level,
                fallback = report.analysis.fallback,
                "Session ended"
            );
            Ok(report)
        })?
    }

    /// Analyze a list of user turns without touching any session
    ///
    /// When the classifier cannot run, the fallback classification still goes
    /// through the risk decision table rather than being pinned to low, so
    /// crisis indicators in the text escalate it to high.
    pub fn analyze<S: AsRef<str>>(&self, user_turns: &[S]) -> PipelineResult<ConversationAnalysis> {
        let insights = count_signals(&self.catalog, user_turns);

        let joined = user_turns
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        let normalized = text::normalize(&joined);

        let (classification, fallback) = match self.classifier.classify(&normalized) {
            Ok(result) => (result, false),
            Err(ClassifyError::Invariant(reason)) => {
                tracing::error!(reason = %reason, "Classifier invariant violated");
                return Err(PipelineError::Invariant(reason));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Using fallback classification");
                (ClassificationResult::fallback(), true)
            }
        };

        let risk_rule = assess_risk_with_rule(
            classification.predicted_state,
            classification.confidence,
            &insights,
        );

        Ok(ConversationAnalysis {
            risk_level: risk_rule.level(),
            risk_rule,
            classification,
            conversation_insights: insights,
            analysis_timestamp: Utc::now(),
            total_messages: user_turns.len(),
            conversation_length: joined.chars().count(),
            fallback,
        })
    }
}
