//! The student registry.
//!
//! An ordered list of student names. Each submission carries one mark per
//! registered student, in registration order.

use crate::config::{read_json_or_default, write_json, Paths};
use crate::error::{RegistryError, RegistryResult};
use std::path::PathBuf;
use tracing::debug;

/// Registered students, persisted as a JSON array of names.
#[derive(Debug, Clone)]
pub struct StudentRegistry {
    file: PathBuf,
    students: Vec<String>,
}

impl StudentRegistry {
    /// Load the registry from the configuration directory.
    pub fn load(paths: &Paths) -> RegistryResult<Self> {
        Self::load_from(paths.students_file())
    }

    /// Load the registry from a specific file. A missing file is empty.
    pub fn load_from(file: impl Into<PathBuf>) -> RegistryResult<Self> {
        let file = file.into();
        let students: Vec<String> = read_json_or_default(&file)?;
        debug!(count = students.len(), "loaded student registry");
        Ok(Self { file, students })
    }

    /// Persist the registry.
    pub fn save(&self) -> RegistryResult<()> {
        write_json(&self.file, &self.students)?;
        Ok(())
    }

    /// Registered names, in order.
    pub fn list(&self) -> &[String] {
        &self.students
    }

    /// Number of registered students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Check if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Check if a student is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.students.iter().any(|s| s == name.trim())
    }

    /// Replace the whole list from newline-separated names. Blank lines are
    /// skipped and repeated names are kept once. Returns the new count.
    pub fn register_lines(&mut self, text: &str) -> usize {
        let mut students: Vec<String> = Vec::new();
        for name in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !students.iter().any(|s| s == name) {
                students.push(name.to_string());
            }
        }

        self.students = students;
        self.students.len()
    }

    /// Register one more student at the end of the list.
    pub fn add(&mut self, name: &str) -> RegistryResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.contains(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }

        self.students.push(name.to_string());
        Ok(())
    }

    /// Remove a student. Their past attendance rows are kept.
    pub fn remove(&mut self, name: &str) -> RegistryResult<()> {
        let name = name.trim();
        let before = self.students.len();
        self.students.retain(|s| s != name);

        if self.students.len() == before {
            return Err(RegistryError::NotRegistered(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_registry(dir: &tempfile::TempDir) -> StudentRegistry {
        StudentRegistry::load_from(dir.path().join("students.json")).unwrap()
    }

    #[test]
    fn test_register_lines_trims_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = empty_registry(&dir);

        let count = registry.register_lines("  Alice\n\nBob\nAlice\n   \nCarol  \n");
        assert_eq!(count, 3);
        assert_eq!(registry.list(), ["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_register_lines_replaces_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = empty_registry(&dir);
        registry.register_lines("Alice\nBob");
        registry.register_lines("Dan");
        assert_eq!(registry.list(), ["Dan"]);
    }

    #[test]
    fn test_add_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = empty_registry(&dir);

        registry.add("Alice").unwrap();
        assert!(matches!(
            registry.add(" Alice "),
            Err(RegistryError::AlreadyRegistered(_))
        ));
        assert!(matches!(registry.add(""), Err(RegistryError::EmptyName)));

        registry.remove("Alice").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove("Alice"),
            Err(RegistryError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_registry_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = empty_registry(&dir);
        registry.register_lines("Alice\nBob");
        registry.save().unwrap();

        let reloaded = empty_registry(&dir);
        assert_eq!(reloaded.list(), ["Alice", "Bob"]);
        assert_eq!(reloaded.len(), 2);
    }
}
