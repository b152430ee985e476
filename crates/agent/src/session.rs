//! Chat sessions
//!
//! Each session pins the authenticated caller and the tool set chosen at
//! creation; neither can be widened mid-conversation. The manager hands
//! out per-session async mutexes so concurrent messages to the same
//! session serialize while different sessions proceed in parallel.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use clinic_agent_core::ConversationTurn;
use clinic_agent_tools::{CallerContext, ToolKind};

use crate::AgentError;

/// One conversation's state
#[derive(Debug)]
pub struct ChatSession {
    pub id: Uuid,
    /// Full turn history, oldest first
    pub history: Vec<ConversationTurn>,
    /// Authenticated caller; tools take identity from here
    pub caller: CallerContext,
    /// Tools the model may use in this conversation
    pub enabled_tools: HashSet<ToolKind>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(caller: CallerContext, enabled_tools: HashSet<ToolKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
            caller,
            enabled_tools,
            created_at: Utc::now(),
        }
    }
}

/// In-memory session table with a hard capacity cap
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<Mutex<ChatSession>>>,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
        }
    }

    /// Create a session and return its id
    pub fn create(
        &self,
        caller: CallerContext,
        enabled_tools: HashSet<ToolKind>,
    ) -> Result<Uuid, AgentError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(AgentError::SessionLimitReached(self.max_sessions));
        }

        let session = ChatSession::new(caller, enabled_tools);
        let id = session.id;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::info!(session_id = %id, active = self.sessions.len(), "Session created");
        Ok(id)
    }

    /// Look up a session's lock
    pub fn get(&self, id: Uuid) -> Result<Arc<Mutex<ChatSession>>, AgentError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(AgentError::SessionNotFound(id))
    }

    /// Drop a session; unknown ids are a no-op
    pub fn remove(&self, id: Uuid) {
        if self.sessions.remove(&id).is_some() {
            tracing::info!(session_id = %id, active = self.sessions.len(), "Session removed");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
