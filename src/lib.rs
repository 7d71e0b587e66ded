#![doc = include_str!("../README.md")]

mod client;
mod error;
/// Grading scale definitions and classification
pub mod gradingscale;
/// Section, term, and person identity models
pub mod models;
/// Graderoster document model (XHTML read and write paths)
pub mod roster;

pub use client::{
    GRADEROSTER_URL, GradeRosterClient, PersonDirectory, RestDao, RestResponse,
    encode_section_label,
};
pub use error::{Result, SwsError};
pub use gradingscale::{GradingScale, matching_scale, sorted_scale};
pub use models::{GradeSubmissionDelegate, Person, Section, Term};
pub use roster::{GradeRoster, GradeRosterItem, XHTML_NAMESPACE};
