//! Static content catalog
//!
//! Projects, their ordered lessons, and the dashboard modules and quick
//! stats. The catalog is loaded once at startup and never mutated.

use anyhow::{Result, Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::types::{Lesson, Module, Project, ProjectStatus, Stat};

/// Catalog compiled into the binary
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Read-only catalog of learning content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    projects: Vec<Project>,
    #[serde(default)]
    modules: Vec<Module>,
    #[serde(default)]
    stats: Vec<Stat>,
}

impl Catalog {
    /// Load the catalog bundled with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG).context("Bundled catalog is invalid")
    }

    /// Load a catalog from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid catalog file {}", path.display()))
    }

    /// Load from config: explicit path if set, bundled data otherwise
    pub fn load(config: &crate::config::Config) -> Result<Self> {
        match &config.catalog.path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Parse and validate catalog JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .context("Failed to parse catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut project_ids = HashSet::new();
        for project in &self.projects {
            if !project_ids.insert(project.id.as_str()) {
                bail!("Duplicate project id '{}'", project.id);
            }
            if project.lessons.is_empty() {
                bail!("Project '{}' has no lessons", project.id);
            }
            if project.progress > 100 {
                bail!("Project '{}' has progress {} (max 100)", project.id, project.progress);
            }
            let mut lesson_ids = HashSet::new();
            for lesson in &project.lessons {
                if !lesson_ids.insert(lesson.id.as_str()) {
                    bail!("Duplicate lesson id '{}' in project '{}'", lesson.id, project.id);
                }
            }
        }
        Ok(())
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Lessons of a project, in order
    pub fn lessons(&self, project_id: &str) -> Option<&[Lesson]> {
        self.project(project_id).map(|p| p.lessons.as_slice())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn stats(&self) -> &[Stat] {
        &self.stats
    }

    pub fn projects_by_status(&self, status: ProjectStatus) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.status == status).collect()
    }

    /// Case-insensitive match on title, category and tags
    pub fn search(&self, query: &str) -> Vec<&Project> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.projects.iter().collect();
        }
        self.projects
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.projects().is_empty());
        assert_eq!(catalog.modules().len(), 6);
        assert_eq!(catalog.stats().len(), 3);
    }

    #[test]
    fn test_lessons_in_order() {
        let catalog = Catalog::bundled().unwrap();
        let lessons = catalog.lessons("deepfake-detective").unwrap();
        let ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["dd-1", "dd-2", "dd-3", "dd-4"]);
        assert!(catalog.lessons("missing").is_none());
    }

    #[test]
    fn test_search_matches_tags() {
        let catalog = Catalog::bundled().unwrap();
        let hits = catalog.search("POLARIZATION");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "algorithm-audit");
        assert_eq!(catalog.search("  ").len(), catalog.projects().len());
    }

    #[test]
    fn test_filter_by_status() {
        let catalog = Catalog::bundled().unwrap();
        let locked = catalog.projects_by_status(ProjectStatus::Locked);
        assert!(locked.iter().all(|p| p.is_locked()));
        assert!(!locked.is_empty());
    }

    #[test]
    fn test_duplicate_lesson_ids_rejected() {
        let json = r#"{"projects": [{
            "id": "p", "title": "P", "description": "", "category": "C",
            "duration": "1 week", "participants": 1, "difficulty": "Beginner",
            "status": "available",
            "lessons": [
                {"id": "l", "title": "A", "description": "", "duration": "1h", "type": "research"},
                {"id": "l", "title": "B", "description": "", "duration": "1h", "type": "research"}
            ]
        }]}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate lesson id"));
    }

    #[test]
    fn test_project_without_lessons_rejected() {
        let json = r#"{"projects": [{
            "id": "p", "title": "P", "description": "", "category": "C",
            "duration": "1 week", "participants": 1, "difficulty": "Beginner",
            "status": "available", "lessons": []
        }]}"#;
        assert!(Catalog::from_json(json).is_err());
    }
}
