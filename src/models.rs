//! Section, term, and person identity models
//!
//! These types carry the components of the graderoster label and the person
//! references aggregated by the roster. They mirror the identity model of the
//! companion section/person services; this crate only reads them.

/// Academic term (year plus quarter)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// Calendar year (e.g., 2013)
    pub year: i32,
    /// Lowercase quarter name (e.g., "summer")
    pub quarter: String,
}

impl Term {
    /// Create a new term
    pub fn new(year: i32, quarter: impl Into<String>) -> Self {
        Self {
            year,
            quarter: quarter.into(),
        }
    }
}

/// Course section within a term
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    /// Term the section is offered in
    pub term: Term,
    /// Curriculum abbreviation (e.g., "CSS")
    pub curriculum_abbr: String,
    /// Course number (e.g., "161")
    pub course_number: String,
    /// Section letter(s) (e.g., "A")
    pub section_id: String,
}

impl Section {
    /// Create a new section
    pub fn new(
        term: Term,
        curriculum_abbr: impl Into<String>,
        course_number: impl Into<String>,
        section_id: impl Into<String>,
    ) -> Self {
        Self {
            term,
            curriculum_abbr: curriculum_abbr.into(),
            course_number: course_number.into(),
            section_id: section_id.into(),
        }
    }
}

/// A person known to the directory service
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    /// 32-character registration id
    pub uwregid: String,
    /// Network id, used for the "act as" request header
    pub uwnetid: String,
    /// Display name, when the directory provides one
    pub display_name: Option<String>,
}

impl Person {
    /// Create a new person reference
    pub fn new(uwregid: impl Into<String>, uwnetid: impl Into<String>) -> Self {
        Self {
            uwregid: uwregid.into(),
            uwnetid: uwnetid.into(),
            display_name: None,
        }
    }
}

/// A person authorized to submit grades on the instructor's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeSubmissionDelegate {
    /// The delegated person
    pub person: Person,
    /// Delegation level reported by the service
    pub delegate_level: String,
}
