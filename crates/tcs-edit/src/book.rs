//! The externally visible cases and the sessions open against them.

use std::collections::HashMap;

use tracing::debug;

use tcs_model::{CaseDocument, NodeId};

use crate::error::{EditError, Result};
use crate::session::{EditSession, SessionEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// Cases keyed by id, with at most one open session each.
///
/// Visible documents change only when a session commits or rolls back.
#[derive(Debug, Clone, Default)]
pub struct CaseBook {
    cases: Vec<CaseDocument>,
    sessions: HashMap<NodeId, EditSession>,
}

impl CaseBook {
    pub fn new(cases: Vec<CaseDocument>) -> Self {
        Self {
            cases,
            sessions: HashMap::new(),
        }
    }

    pub fn cases(&self) -> &[CaseDocument] {
        &self.cases
    }

    pub fn get(&self, id: &NodeId) -> Option<&CaseDocument> {
        self.cases.iter().find(|case| &case.id == id)
    }

    fn position(&self, id: &NodeId) -> Result<usize> {
        self.cases
            .iter()
            .position(|case| &case.id == id)
            .ok_or_else(|| EditError::UnknownCase(id.clone()))
    }

    /// Adds a case, replacing one with the same id unless it is being edited.
    pub fn insert(&mut self, case: CaseDocument) -> Result<()> {
        if self.sessions.contains_key(&case.id) {
            return Err(EditError::AlreadyOpen(case.id));
        }
        match self.position(&case.id) {
            Ok(index) => self.cases[index] = case,
            Err(_) => self.cases.push(case),
        }
        Ok(())
    }

    pub fn state(&self, id: &NodeId) -> SessionState {
        if self.sessions.contains_key(id) {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn open(&mut self, id: &NodeId) -> Result<&mut EditSession> {
        if self.sessions.contains_key(id) {
            return Err(EditError::AlreadyOpen(id.clone()));
        }
        let index = self.position(id)?;
        let session = EditSession::open(&self.cases[index]);
        Ok(self.sessions.entry(id.clone()).or_insert(session))
    }

    pub fn session(&self, id: &NodeId) -> Option<&EditSession> {
        self.sessions.get(id)
    }

    pub fn session_mut(&mut self, id: &NodeId) -> Result<&mut EditSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| EditError::NotOpen(id.clone()))
    }

    /// Publishes the working copy and closes the session.
    pub fn commit(&mut self, id: &NodeId) -> Result<&CaseDocument> {
        let session = self.take(id)?;
        self.close(id, session.commit())
    }

    /// Restores the snapshot and closes the session.
    pub fn rollback(&mut self, id: &NodeId) -> Result<&CaseDocument> {
        let session = self.take(id)?;
        self.close(id, session.rollback())
    }

    fn take(&mut self, id: &NodeId) -> Result<EditSession> {
        self.sessions
            .remove(id)
            .ok_or_else(|| EditError::NotOpen(id.clone()))
    }

    fn close(&mut self, id: &NodeId, end: SessionEnd) -> Result<&CaseDocument> {
        let index = self.position(id)?;
        debug!(case = %id, committed = matches!(end, SessionEnd::Committed(_)), "closed session");
        self.cases[index] = end.into_document();
        Ok(&self.cases[index])
    }

    pub fn into_cases(self) -> Vec<CaseDocument> {
        self.cases
    }
}
