// Assistant module
// Ties the ranker, the conversation store and the language model together


use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::corpus::load_chunks;
use crate::llm::{CompletionModel, DEFAULT_SYSTEM_PROMPT, build_messages};
use crate::retrieval::{RankedChunk, Ranker, RetrievalConfig};
use crate::session::{SessionConfig, SessionId, SessionStore};
use crate::{RagError, Result};

/// A model reply together with the chunks that were placed into its prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<RankedChunk>,
}

/// Answers questions from a chunk corpus, keeping per-session history
///
/// The ranker is read-only after construction and the session store locks
/// internally, so one assistant can serve many sessions from many threads.
/// Concurrent answers within the same session are not serialised: both see
/// the history as it was before either finished, and their turns are appended
/// in completion order.
#[derive(Debug)]
pub struct Assistant<M: CompletionModel> {
    ranker: Ranker,
    sessions: SessionStore,
    model: M,
    retrieval: RetrievalConfig,
    system_prompt: String,
}

impl<M: CompletionModel> Assistant<M> {
    #[inline]
    pub fn new(
        ranker: Ranker,
        model: M,
        retrieval: RetrievalConfig,
        session: &SessionConfig,
    ) -> Self {
        Self {
            ranker,
            sessions: SessionStore::from_config(session),
            model,
            retrieval,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    #[inline]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Build an assistant from settings, loading the configured chunk list
    ///
    /// A missing or unreadable chunk list leaves the ranker unready, so every
    /// answer is produced without context.
    #[inline]
    pub fn from_config(config: &Config, model: M) -> Self {
        let ranker = load_ranker(&config.chunks_path());
        Self::new(ranker, model, config.retrieval.clone(), &config.session)
            .with_system_prompt(config.llm.system_prompt.as_str())
    }

    #[inline]
    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    #[inline]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[inline]
    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    #[inline]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Rank the corpus with the configured `top_k` and `min_score`
    #[inline]
    pub fn search(&self, query: &str) -> Vec<RankedChunk> {
        self.ranker
            .rank(query, self.retrieval.top_k, self.retrieval.min_score)
    }

    /// Answer a question within a session and remember the exchange
    ///
    /// Sessions idle past their TTL are purged first, so the store only holds
    /// live conversations.
    #[inline]
    pub fn answer(&self, session: &SessionId, question: &str) -> Result<Answer> {
        self.answer_at(session, question, Utc::now())
    }

    /// Same as [`Assistant::answer`] with an explicit clock
    #[inline]
    pub fn answer_at(
        &self,
        session: &SessionId,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question is empty".to_string()));
        }

        self.sessions.purge_expired_at(now);

        let sources = self.search(question);
        let history = self.sessions.history_at(session, now);
        debug!(
            "Session {}: {} context chunks, {} past turns",
            session,
            sources.len(),
            history.len()
        );

        let messages = build_messages(&self.system_prompt, &history, &sources, question);
        let text = self.model.complete(&messages)?;

        self.sessions.record_at(session, question, &text, now);
        Ok(Answer { text, sources })
    }

    /// Forget a session's history. Returns whether it existed.
    #[inline]
    pub fn reset(&self, session: &SessionId) -> bool {
        let existed = self.sessions.end(session);
        if existed {
            debug!("Session {} reset", session);
        }
        existed
    }
}

/// Load a chunk list into a ranker, logging instead of failing
#[inline]
pub fn load_ranker(path: &Path) -> Ranker {
    if !path.exists() {
        warn!(
            "Chunks file {} not found; answering without knowledge base context",
            path.display()
        );
        return Ranker::new();
    }

    match load_chunks(path) {
        Ok(chunks) => {
            let ranker = Ranker::from_chunks(chunks);
            info!(
                "Knowledge base ready: {} chunks, {} terms",
                ranker.len(),
                ranker.vocabulary_size()
            );
            ranker
        }
        Err(e) => {
            warn!("Failed to load chunks from {}: {:#}", path.display(), e);
            Ranker::new()
        }
    }
}
