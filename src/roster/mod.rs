//! Graderoster document model
//!
//! A graderoster is one section/instructor's class roster and grade
//! submission form, exchanged with the student web service as an XHTML
//! document. `parsing` is the read path (document to model) and `render`
//! is the write path (model to document); the two share one `class`/`rel`
//! vocabulary so a rendered roster re-parses to the same model.

mod parsing;
mod render;

use crate::models::{GradeSubmissionDelegate, Person, Section};
use chrono::NaiveDate;

/// The XHTML namespace the service uses for roster documents
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// One section/instructor's grade roster
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeRoster {
    /// Section the roster belongs to
    pub section: Section,
    /// Instructor of record
    pub instructor: Person,
    /// Section-wide credit value, verbatim from the document
    pub section_credits: Option<String>,
    /// Whether the section allows writing credit; `None` when the document
    /// does not say
    pub allows_writing_credit: Option<bool>,
    /// People authorized to submit grades, in document order
    pub authorized_grade_submitters: Vec<Person>,
    /// Grade submission delegates, in document order
    pub grade_submission_delegates: Vec<GradeSubmissionDelegate>,
    /// Student rows, in document order
    pub items: Vec<GradeRosterItem>,
}

impl GradeRoster {
    /// Create an empty roster for a section and instructor
    pub fn new(section: Section, instructor: Person) -> Self {
        Self {
            section,
            instructor,
            section_credits: None,
            allows_writing_credit: None,
            authorized_grade_submitters: Vec::new(),
            grade_submission_delegates: Vec::new(),
            items: Vec::new(),
        }
    }

    /// The composite identifier used as the resource path key:
    /// `year,quarter,curriculum,course-number,section,instructor-reg-id`
    pub fn graderoster_label(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.section.term.year,
            self.section.term.quarter,
            self.section.curriculum_abbr,
            self.section.course_number,
            self.section.section_id,
            self.instructor.uwregid
        )
    }
}

/// One student's row on a grade roster
///
/// Equality is defined solely by the (registration id, duplicate code) pair,
/// the uniqueness key within a roster.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeRosterItem {
    /// Student registration id
    pub student_uwregid: String,
    /// Suffix disambiguating duplicate registration ids; absent when the
    /// document carries none (an empty code is treated as absent)
    pub duplicate_code: Option<String>,
    /// Student first name, from the comma-separated name field
    pub student_first_name: Option<String>,
    /// Student surname, from the comma-separated name field
    pub student_surname: Option<String>,
    /// Former name, when non-empty in the document
    pub student_former_name: Option<String>,
    /// Numeric student number
    pub student_number: Option<u32>,
    /// Student classification reported by callers; not part of the wire
    /// vocabulary
    pub student_type: Option<String>,
    /// Credits the student is registered for, verbatim from the document
    pub student_credits: Option<String>,
    /// Section the student belongs to; defaults to the roster's section when
    /// the row carries none
    pub section_id: Option<String>,
    /// Student is auditing
    pub is_auditor: bool,
    /// An incomplete may be assigned
    pub allows_incomplete: bool,
    /// An incomplete is assigned
    pub has_incomplete: bool,
    /// Writing credit is assigned
    pub has_writing_credit: bool,
    /// "No grade now" is set
    pub no_grade_now: bool,
    /// The grade dropdown is enabled
    pub allows_grade_change: bool,
    /// Date the student withdrew, if any
    pub date_withdrawn: Option<NaiveDate>,
    /// Currently selected grade; always a member of `grade_choices`
    pub grade: Option<String>,
    /// Every selectable grade option, in document order
    pub grade_choices: Vec<String>,
    /// Grade document id assigned by the service
    pub grade_document_id: Option<String>,
    /// Date the grade was recorded (server-populated)
    pub date_graded: Option<NaiveDate>,
    /// Person who submitted the grade (server-populated)
    pub grade_submitter_person: Option<Person>,
    /// Submission source code (server-populated)
    pub grade_submitter_source: Option<String>,
    /// Per-item status code reported after submission (server-populated)
    pub status_code: Option<String>,
    /// Per-item status message reported after submission (server-populated)
    pub status_message: Option<String>,
}

impl GradeRosterItem {
    /// Create an item for a student registration id
    pub fn new(student_uwregid: impl Into<String>) -> Self {
        Self {
            student_uwregid: student_uwregid.into(),
            ..Self::default()
        }
    }

    /// The student's unique label within a roster: the registration id,
    /// joined with the duplicate code when one is present
    pub fn student_label(&self, separator: &str) -> String {
        match self.duplicate_code.as_deref() {
            Some(code) if !code.is_empty() => {
                format!("{}{}{}", self.student_uwregid, separator, code)
            }
            _ => self.student_uwregid.clone(),
        }
    }
}

impl PartialEq for GradeRosterItem {
    fn eq(&self, other: &Self) -> bool {
        self.student_uwregid == other.student_uwregid
            && self.duplicate_code == other.duplicate_code
    }
}

impl Eq for GradeRosterItem {}
