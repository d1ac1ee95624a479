use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherDirectoryEntry {
    pub name: String,
    pub email: String,
}

/// Folds a teacher's name into the local part of a school address:
/// lowercase, accents dropped, spaces turned into dots, anything else that is
/// not alphanumeric removed. `"Natàlia Muñoz"` becomes `"natalia.munoz"`.
pub fn normalize_name_to_email(name: &str) -> String {
    name.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == ' ' { '.' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect()
}

/// Read-only list of teachers offered in the contact form.
#[derive(Debug, Clone)]
pub struct TeacherDirectory {
    domain: String,
    entries: Vec<TeacherDirectoryEntry>,
}

impl TeacherDirectory {
    pub fn new(domain: impl Into<String>, entries: Vec<TeacherDirectoryEntry>) -> Self {
        TeacherDirectory {
            domain: domain.into(),
            entries,
        }
    }

    /// The institute's published contacts.
    pub fn institute(domain: &str) -> Self {
        let entries = ["Jordi Pipó", "Anna Bresolí", "Gerard Corominas", "Roger Codina"]
            .iter()
            .map(|name| TeacherDirectoryEntry {
                name: name.to_string(),
                email: format!("{}@{}", normalize_name_to_email(name), domain),
            })
            .collect();
        TeacherDirectory::new(domain, entries)
    }

    pub fn entries(&self) -> &[TeacherDirectoryEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&TeacherDirectoryEntry> {
        let wanted = normalize_name_to_email(name.trim());
        self.entries
            .iter()
            .find(|entry| normalize_name_to_email(&entry.name) == wanted)
    }

    /// Listed address when the name is known, otherwise one derived from the name.
    pub fn resolve_email(&self, name: &str) -> String {
        match self.find(name) {
            Some(entry) => entry.email.clone(),
            None => format!("{}@{}", normalize_name_to_email(name.trim()), self.domain),
        }
    }
}
