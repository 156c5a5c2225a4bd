//! Lesson navigation within a project
//!
//! [`LessonNavigator`] is the index state machine; [`Session`] couples it to
//! the journal so moving between lessons reopens the matching record.

use anyhow::{Result, Context, bail};

use crate::journal::{Journal, KeyValueStore, ObjectiveOutcome};
use crate::completion::ObjectiveSource;
use crate::types::{JournalKey, Lesson, LessonMeta, Project};

/// Active lesson index for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonNavigator {
    index: usize,
    len: usize,
}

impl LessonNavigator {
    /// Start at the first lesson. A project always has at least one.
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            bail!("Cannot navigate a project with no lessons");
        }
        Ok(Self { index: 0, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Advance; returns false when already on the last lesson
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Go back; returns false when already on the first lesson
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump directly to a lesson
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            bail!("Lesson {} out of range (project has {} lessons)", index + 1, self.len);
        }
        self.index = index;
        Ok(())
    }

    /// "Lesson i of N"
    pub fn position(&self) -> String {
        format!("Lesson {} of {}", self.index + 1, self.len)
    }

    /// Lessons before the active one are shown as done
    pub fn completed_before(&self, index: usize) -> bool {
        index < self.index
    }
}

/// A project opened for study: navigator plus journal, kept in step
pub struct Session<S: KeyValueStore> {
    project: Project,
    navigator: LessonNavigator,
    journal: Journal<S>,
}

impl<S: KeyValueStore> Session<S> {
    /// Open a project on its first lesson
    pub fn open(project: Project, store: S) -> Result<Self> {
        let navigator = LessonNavigator::new(project.lessons.len())
            .with_context(|| format!("Project '{}' cannot be opened", project.id))?;
        let key = JournalKey::new(project.id.clone(), project.lessons[0].id.clone());
        let journal = Journal::open(store, key)?;
        Ok(Self { project, navigator, journal })
    }

    /// Open a project directly on a lesson id
    pub fn open_at(project: Project, store: S, lesson_id: &str) -> Result<Self> {
        let index = project
            .lesson_index(lesson_id)
            .with_context(|| format!("Lesson '{}' not found in project '{}'", lesson_id, project.id))?;
        let mut session = Self::open(project, store)?;
        session.select(index)?;
        Ok(session)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn navigator(&self) -> &LessonNavigator {
        &self.navigator
    }

    pub fn journal(&self) -> &Journal<S> {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut Journal<S> {
        &mut self.journal
    }

    pub fn current_lesson(&self) -> &Lesson {
        &self.project.lessons[self.navigator.index()]
    }

    pub fn meta(&self) -> LessonMeta {
        LessonMeta::new(&self.project, self.current_lesson())
    }

    pub fn next(&mut self) -> Result<bool> {
        if !self.navigator.next() {
            return Ok(false);
        }
        self.sync_journal()?;
        Ok(true)
    }

    pub fn previous(&mut self) -> Result<bool> {
        if !self.navigator.previous() {
            return Ok(false);
        }
        self.sync_journal()?;
        Ok(true)
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.navigator.select(index)?;
        self.sync_journal()
    }

    /// Get Objective for the current lesson
    pub async fn fetch_objective(&mut self, source: &dyn ObjectiveSource) -> Result<ObjectiveOutcome> {
        let meta = self.meta();
        self.journal.fetch_objective(&meta, source).await
    }

    fn sync_journal(&mut self) -> Result<()> {
        let key = JournalKey::new(self.project.id.clone(), self.current_lesson().id.clone());
        if *self.journal.key() != key {
            self.journal.switch_to(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::journal::MemoryKvStore;
    use crate::types::JournalField;
    use std::sync::Arc;

    #[test]
    fn test_next_blocked_at_last() {
        let mut nav = LessonNavigator::new(2).unwrap();
        assert!(nav.is_first());
        assert!(nav.next());
        assert!(nav.is_last());
        assert!(!nav.next());
        assert_eq!(nav.index(), 1);
    }

    #[test]
    fn test_previous_blocked_at_first() {
        let mut nav = LessonNavigator::new(3).unwrap();
        assert!(!nav.previous());
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn test_select_and_position() {
        let mut nav = LessonNavigator::new(4).unwrap();
        nav.select(2).unwrap();
        assert_eq!(nav.position(), "Lesson 3 of 4");
        assert!(nav.completed_before(1));
        assert!(!nav.completed_before(2));
        assert!(nav.select(4).is_err());
        assert_eq!(nav.index(), 2);
    }

    #[test]
    fn test_single_lesson_is_first_and_last() {
        let nav = LessonNavigator::new(1).unwrap();
        assert!(nav.is_first() && nav.is_last());
        assert!(LessonNavigator::new(0).is_err());
    }

    #[test]
    fn test_session_switch_reloads_journal() {
        let catalog = Catalog::bundled().unwrap();
        let project = catalog.project("deepfake-detective").unwrap().clone();
        let store = Arc::new(MemoryKvStore::new());
        let mut session = Session::open(project, store).unwrap();

        session.journal_mut().set_field(JournalField::Context, "lesson one notes").unwrap();
        assert!(session.next().unwrap());
        assert_eq!(session.journal().key().lesson_id, "dd-2");
        assert!(session.journal().entry().is_blank());

        session.journal_mut().set_field(JournalField::Context, "lesson two notes").unwrap();
        assert!(session.previous().unwrap());
        assert_eq!(session.journal().entry().context, "lesson one notes");

        session.select(1).unwrap();
        assert_eq!(session.journal().entry().context, "lesson two notes");
    }

    #[test]
    fn test_open_at_lesson() {
        let catalog = Catalog::bundled().unwrap();
        let project = catalog.project("algorithm-audit").unwrap().clone();
        let session = Session::open_at(project.clone(), Arc::new(MemoryKvStore::new()), "aa-3").unwrap();
        assert_eq!(session.navigator().index(), 2);
        assert_eq!(session.meta().lesson_title, "Reading the Results");
        assert!(Session::open_at(project, Arc::new(MemoryKvStore::new()), "zz").is_err());
    }
}
