//! Templates derived from historical cases.
//!
//! A template is a copy of a historical case under a new id. Saving one
//! fills the single saved-template slot; the history is never written.

use tracing::info;

use tcs_model::{CaseDocument, NodeId, TEMPLATE_ID_PREFIX};

use crate::error::{EditError, Result};
use crate::session::EditSession;

pub const TEMPLATE_NAME_SUFFIX: &str = " (template)";

/// Copy of `case` under a fresh template id and a derived name.
pub fn derive(case: &CaseDocument) -> CaseDocument {
    CaseDocument {
        id: NodeId::fresh(TEMPLATE_ID_PREFIX),
        name: format!("{}{TEMPLATE_NAME_SUFFIX}", case.name),
        sections: case.sections.clone(),
    }
}

/// The last saved template and the history index it came from. The index
/// is for display only.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTemplate {
    pub document: CaseDocument,
    pub source_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateDesk {
    history: Vec<CaseDocument>,
    saved: Option<SavedTemplate>,
    active: Option<(usize, EditSession)>,
}

impl TemplateDesk {
    pub fn new(history: Vec<CaseDocument>) -> Self {
        Self {
            history,
            saved: None,
            active: None,
        }
    }

    pub fn history(&self) -> &[CaseDocument] {
        &self.history
    }

    pub fn saved(&self) -> Option<&SavedTemplate> {
        self.saved.as_ref()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.active.as_ref().map(|(_, session)| session)
    }

    pub fn session_mut(&mut self) -> Result<&mut EditSession> {
        let (_, session) = self.active.as_mut().ok_or(EditError::NoOpenTemplate)?;
        Ok(session)
    }

    /// Starts editing a fresh template of history entry `index`.
    pub fn derive_template(&mut self, index: usize) -> Result<&mut EditSession> {
        self.ensure_idle()?;
        let source = self
            .history
            .get(index)
            .ok_or(EditError::NoHistoricalCase(index))?;
        let template = derive(source);
        info!(source = %source.id, template = %template.id, "derived template");
        Ok(self.start(index, &template))
    }

    /// Resumes the saved template when its source is still in the history,
    /// otherwise derives from the first historical case.
    pub fn reopen(&mut self) -> Result<&mut EditSession> {
        self.ensure_idle()?;
        let resume = self
            .saved
            .as_ref()
            .filter(|saved| saved.source_index < self.history.len())
            .map(|saved| (saved.source_index, saved.document.clone()));
        match resume {
            Some((index, document)) => Ok(self.start(index, &document)),
            None => self.derive_template(0),
        }
    }

    /// Commits the open template into the saved slot.
    pub fn save(&mut self) -> Result<&SavedTemplate> {
        let (source_index, session) = self.active.take().ok_or(EditError::NoOpenTemplate)?;
        let document = session.commit().into_document();
        info!(template = %document.id, source_index, "saved template");
        Ok(self.saved.insert(SavedTemplate {
            document,
            source_index,
        }))
    }

    /// Discards the open template. The saved slot is left as it was.
    pub fn cancel(&mut self) -> Result<()> {
        let (_, session) = self.active.take().ok_or(EditError::NoOpenTemplate)?;
        session.rollback();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.active {
            Some((_, session)) => Err(EditError::AlreadyOpen(session.case_id().clone())),
            None => Ok(()),
        }
    }

    fn start(&mut self, index: usize, document: &CaseDocument) -> &mut EditSession {
        let (_, session) = self.active.insert((index, EditSession::open(document)));
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<CaseDocument> {
        vec![
            CaseDocument::new(NodeId::new("HTC001").unwrap(), "Monthly bill"),
            CaseDocument::new(NodeId::new("HTC002").unwrap(), "Offering change"),
        ]
    }

    #[test]
    fn derived_template_has_new_identity() {
        let mut desk = TemplateDesk::new(history());
        let session = desk.derive_template(1).unwrap();
        let template = session.working();
        assert!(template.id.as_str().starts_with(TEMPLATE_ID_PREFIX));
        assert_eq!(template.name, "Offering change (template)");
        assert!(matches!(desk.derive_template(0), Err(EditError::AlreadyOpen(_))));
    }

    #[test]
    fn saving_never_touches_history() {
        let mut desk = TemplateDesk::new(history());
        desk.derive_template(0)
            .unwrap()
            .rename_case("My billing template")
            .unwrap();
        let saved = desk.save().unwrap();
        assert_eq!(saved.document.name, "My billing template");
        assert_eq!(saved.source_index, 0);
        assert_eq!(desk.history(), history().as_slice());
    }

    #[test]
    fn cancel_keeps_saved_slot() {
        let mut desk = TemplateDesk::new(history());
        desk.derive_template(1).unwrap();
        let saved = desk.save().unwrap().clone();

        desk.reopen().unwrap().rename_case("Scratch").unwrap();
        desk.cancel().unwrap();
        assert_eq!(desk.saved(), Some(&saved));
        assert!(desk.session().is_none());
    }

    #[test]
    fn reopen_resumes_saved_or_falls_back() {
        let mut desk = TemplateDesk::new(history());
        desk.derive_template(1).unwrap().rename_case("Kept").unwrap();
        desk.save().unwrap();
        assert_eq!(desk.reopen().unwrap().working().name, "Kept");
        desk.cancel().unwrap();

        let mut short = TemplateDesk::new(history());
        short.derive_template(1).unwrap();
        short.save().unwrap();
        short.history.truncate(1);
        assert_eq!(
            short.reopen().unwrap().working().name,
            "Monthly bill (template)"
        );
        assert!(matches!(
            TemplateDesk::new(Vec::new()).reopen(),
            Err(EditError::NoHistoricalCase(0))
        ));
    }

    #[test]
    fn save_without_session_fails() {
        let mut desk = TemplateDesk::new(history());
        assert!(matches!(desk.save(), Err(EditError::NoOpenTemplate)));
        assert!(desk.cancel().is_err());
    }
}
