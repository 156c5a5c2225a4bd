//! Shared types used across modules
//!
//! Catalog records (projects, lessons, dashboard modules) and the CORE
//! journal entry live here so the catalog, navigator, journal and server
//! can all depend on them without depending on each other.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A learning project in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub participants: u32,
    pub difficulty: Difficulty,
    pub status: ProjectStatus,
    /// Completion percentage (0-100)
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub color_accent: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub ai_features: Vec<String>,
    #[serde(default)]
    pub outcomes: Vec<String>,
}

impl Project {
    /// Find a lesson by id
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Position of a lesson in the project's ordering
    pub fn lesson_index(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == lesson_id)
    }

    pub fn is_locked(&self) -> bool {
        self.status == ProjectStatus::Locked
    }
}

/// A single lesson, owned by exactly one project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    #[serde(rename = "type")]
    pub kind: LessonType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LessonType {
    AiAssisted,
    Interactive,
    Practical,
    Research,
    Analysis,
}

impl LessonType {
    /// Badge label shown next to the lesson title
    pub fn label(&self) -> &'static str {
        match self {
            LessonType::AiAssisted => "AI-Assisted",
            LessonType::Interactive => "Interactive",
            LessonType::Practical => "Practical",
            LessonType::Research => "Research",
            LessonType::Analysis => "Analysis",
        }
    }
}

impl std::fmt::Display for LessonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Available,
    InProgress,
    Completed,
    Locked,
}

impl ProjectStatus {
    /// Parse from the wire form (`in-progress`, `locked`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(ProjectStatus::Available),
            "in-progress" | "in_progress" | "inprogress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "locked" => Some(ProjectStatus::Locked),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Available => f.pad("Available"),
            ProjectStatus::InProgress => f.pad("In Progress"),
            ProjectStatus::Completed => f.pad("Completed"),
            ProjectStatus::Locked => f.pad("Locked"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => f.pad("Beginner"),
            Difficulty::Intermediate => f.pad("Intermediate"),
            Difficulty::Advanced => f.pad("Advanced"),
        }
    }
}

/// Dashboard module card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub students: u32,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub color_accent: Option<String>,
}

/// Dashboard quick stat ("Day Streak: 12")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

/// Lesson details the objective request and the local fallback need
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonMeta {
    pub project_id: String,
    pub lesson_id: String,
    #[serde(default)]
    pub lesson_title: String,
    #[serde(default)]
    pub category: String,
}

impl LessonMeta {
    pub fn new(project: &Project, lesson: &Lesson) -> Self {
        Self {
            project_id: project.id.clone(),
            lesson_id: lesson.id.clone(),
            lesson_title: lesson.title.clone(),
            category: project.category.clone(),
        }
    }

    pub fn key(&self) -> JournalKey {
        JournalKey::new(self.project_id.clone(), self.lesson_id.clone())
    }
}

/// Composite key of a journal record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalKey {
    pub project_id: String,
    pub lesson_id: String,
}

impl JournalKey {
    pub fn new(project_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            lesson_id: lesson_id.into(),
        }
    }

    /// Key under which the record is kept in the key-value store
    pub fn storage_key(&self) -> String {
        format!("core-journal:{}:{}", self.project_id, self.lesson_id)
    }
}

impl std::fmt::Display for JournalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project_id, self.lesson_id)
    }
}

/// The four CORE fields of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalField {
    Context,
    Objective,
    Reflection,
    Evaluation,
}

impl JournalField {
    pub fn all() -> [JournalField; 4] {
        [
            JournalField::Context,
            JournalField::Objective,
            JournalField::Reflection,
            JournalField::Evaluation,
        ]
    }

    /// Heading used in summaries (C-O-R-E)
    pub fn heading(&self) -> &'static str {
        match self {
            JournalField::Context => "Context",
            JournalField::Objective => "Objective",
            JournalField::Reflection => "Reflect",
            JournalField::Evaluation => "Evaluate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "context" | "c" => Some(JournalField::Context),
            "objective" | "o" => Some(JournalField::Objective),
            "reflection" | "reflect" | "r" => Some(JournalField::Reflection),
            "evaluation" | "evaluate" | "e" => Some(JournalField::Evaluation),
            _ => None,
        }
    }
}

/// A CORE journal record for one lesson
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub reflection: String,
    #[serde(default)]
    pub evaluation: String,
    #[serde(default)]
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    pub fn field(&self, field: JournalField) -> &str {
        match field {
            JournalField::Context => &self.context,
            JournalField::Objective => &self.objective,
            JournalField::Reflection => &self.reflection,
            JournalField::Evaluation => &self.evaluation,
        }
    }

    pub fn set(&mut self, field: JournalField, value: String) {
        match field {
            JournalField::Context => self.context = value,
            JournalField::Objective => self.objective = value,
            JournalField::Reflection => self.reflection = value,
            JournalField::Evaluation => self.evaluation = value,
        }
    }

    /// True when every text field is empty
    pub fn is_blank(&self) -> bool {
        JournalField::all().iter().all(|f| self.field(*f).is_empty())
    }
}
