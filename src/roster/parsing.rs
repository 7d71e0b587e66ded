//! Graderoster document read path
//!
//! The service describes a roster as an XHTML tree whose `class` and `rel`
//! attributes act as the schema; element names carry no meaning. The parser
//! is a single streaming pass that tracks which vocabulary scope it is
//! inside (roster header, submitter, delegate, item, student anchor) by
//! element depth, and dispatches leaf fields through the explicit
//! [`ItemField`] mapping.
//!
//! Field rules:
//! - text fields are trimmed; a labeled element with no text never
//!   overwrites a set field with an empty string
//! - boolean fields derive from `checked`/`disabled` attributes, not text
//! - every `grade` option's text joins the choice list; the `selected` one
//!   becomes the current grade
//! - empty `duplicate_code`/`student_former_name` text means absent

use std::collections::HashMap;

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::client::PersonDirectory;
use crate::error::{Result, SwsError};
use crate::models::{GradeSubmissionDelegate, Person, Section};
use crate::roster::{GradeRoster, GradeRosterItem};

/// Leaf fields recognized inside a `graderoster_item` element, keyed by the
/// element's `class` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    DuplicateCode,
    SectionId,
    StudentFormerName,
    StudentNumber,
    StudentCredits,
    DateWithdrawn,
    GradeDocumentId,
    DateGraded,
    GradeSubmitterSource,
    StatusCode,
    StatusMessage,
}

impl ItemField {
    /// Map a `class` attribute to a field. The date labels carry extra
    /// class tokens ("date_withdrawn date"), so those match by token.
    fn from_class(class: &str) -> Option<Self> {
        match class {
            "duplicate_code" => Some(Self::DuplicateCode),
            "section_id" => Some(Self::SectionId),
            "student_former_name" => Some(Self::StudentFormerName),
            "student_number" => Some(Self::StudentNumber),
            "student_credits" => Some(Self::StudentCredits),
            "grade_document_id" => Some(Self::GradeDocumentId),
            "grade_submitter_source" => Some(Self::GradeSubmitterSource),
            "code" => Some(Self::StatusCode),
            "message" => Some(Self::StatusMessage),
            _ if class.split_whitespace().any(|t| t == "date_withdrawn") => {
                Some(Self::DateWithdrawn)
            }
            _ if class.split_whitespace().any(|t| t == "date_graded") => Some(Self::DateGraded),
            _ => None,
        }
    }
}

/// Where the next text node should land
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextTarget {
    DefaultSectionId,
    SectionCredits,
    SubmitterRegId,
    DelegateRegId,
    DelegateLevel,
    StudentRegId,
    StudentName,
    ItemSubmitterRegId,
    GradeOption { selected: bool },
    Item(ItemField),
}

struct DocParser<'a> {
    directory: &'a dyn PersonDirectory,
    /// Reg-id lookups memoized for the duration of this one parse
    people: HashMap<String, Person>,
    roster: GradeRoster,
    default_section_id: Option<String>,

    depth: usize,
    done: bool,
    roster_depth: Option<usize>,
    items_depth: Option<usize>,
    section_anchor_depth: Option<usize>,
    submitter_depth: Option<usize>,
    delegate_depth: Option<usize>,
    student_anchor_depth: Option<usize>,
    item_submitter_depth: Option<usize>,

    delegate_person: Option<Person>,
    delegate_level: Option<String>,

    item: Option<GradeRosterItem>,
    item_depth: usize,

    pending: Option<TextTarget>,
}

impl GradeRoster {
    /// Parse a roster document fetched for `section`/`instructor`
    ///
    /// Person references other than the instructor are resolved through
    /// `directory`; each distinct reg-id is looked up at most once per parse.
    ///
    /// # Errors
    ///
    /// - [`SwsError::MissingElement`] - no `graderoster` container, or an
    ///   item without a student reg-id
    /// - [`SwsError::Xml`] - the document is not well-formed XML
    /// - any error returned by the directory lookup
    pub fn from_xhtml(
        xml: &str,
        section: Section,
        instructor: Person,
        directory: &dyn PersonDirectory,
    ) -> Result<GradeRoster> {
        let mut people = HashMap::new();
        people.insert(instructor.uwregid.clone(), instructor.clone());

        let mut parser = DocParser {
            directory,
            people,
            roster: GradeRoster::new(section, instructor),
            default_section_id: None,
            depth: 0,
            done: false,
            roster_depth: None,
            items_depth: None,
            section_anchor_depth: None,
            submitter_depth: None,
            delegate_depth: None,
            student_anchor_depth: None,
            item_submitter_depth: None,
            delegate_person: None,
            delegate_level: None,
            item: None,
            item_depth: 0,
            pending: None,
        };

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut seen_roster = false;
        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    parser.handle_start(e, false)?;
                    seen_roster |= parser.roster_depth.is_some();
                }
                Event::Empty(ref e) => parser.handle_start(e, true)?,
                Event::Text(ref e) => {
                    let text = e.unescape().unwrap_or_default();
                    parser.handle_text(text.trim())?;
                }
                Event::End(_) => parser.handle_end()?,
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_roster {
            return Err(SwsError::MissingElement("graderoster".to_string()));
        }
        Ok(parser.roster)
    }
}

impl DocParser<'_> {
    fn handle_start(&mut self, e: &BytesStart, is_empty: bool) -> Result<()> {
        // A sibling element ends any pending text association
        self.flush_pending();

        let depth = self.depth + 1;
        if !is_empty {
            self.depth = depth;
        }
        if self.done {
            return Ok(());
        }

        let class = attr_value(e, "class");
        let class = class.as_deref();
        let rel = attr_value(e, "rel");
        let rel = rel.as_deref();

        if self.roster_depth.is_none() {
            if class == Some("graderoster") && !is_empty {
                self.roster_depth = Some(depth);
            }
            return Ok(());
        }

        if self.item.is_some() {
            self.handle_item_element(e, is_empty, depth, class, rel);
        } else if self.items_depth.is_some() {
            if class == Some("graderoster_item") && !is_empty {
                self.item = Some(GradeRosterItem {
                    section_id: self.default_section_id.clone(),
                    ..GradeRosterItem::default()
                });
                self.item_depth = depth;
            }
        } else {
            self.handle_header_element(e, is_empty, depth, class, rel);
        }
        Ok(())
    }

    /// Header scope: everything inside the roster container before the
    /// item list
    fn handle_header_element(
        &mut self,
        e: &BytesStart,
        is_empty: bool,
        depth: usize,
        class: Option<&str>,
        rel: Option<&str>,
    ) {
        if class == Some("graderoster_items") && !is_empty {
            self.items_depth = Some(depth);
            return;
        }

        if self.submitter_depth.is_some() {
            if class == Some("reg_id") && !is_empty {
                self.pending = Some(TextTarget::SubmitterRegId);
            }
            return;
        }
        if self.delegate_depth.is_some() {
            if !is_empty {
                match class {
                    Some("reg_id") => self.pending = Some(TextTarget::DelegateRegId),
                    Some("delegate_level") => self.pending = Some(TextTarget::DelegateLevel),
                    _ => {}
                }
            }
            return;
        }
        if self.section_anchor_depth.is_some() {
            if class == Some("section_id") && !is_empty {
                self.pending = Some(TextTarget::DefaultSectionId);
            }
            return;
        }

        match rel {
            Some("section") if !is_empty => {
                self.section_anchor_depth = Some(depth);
                return;
            }
            Some("authorized_grade_submitter") if !is_empty => {
                self.submitter_depth = Some(depth);
                return;
            }
            _ => {}
        }

        match class {
            Some("grade_submission_delegate") if !is_empty => {
                self.delegate_depth = Some(depth);
                self.delegate_person = None;
                self.delegate_level = None;
            }
            Some("section_credits") if !is_empty => {
                self.pending = Some(TextTarget::SectionCredits);
            }
            Some("writing_credit_display") => {
                if is_flag(e, "checked") {
                    self.roster.allows_writing_credit = Some(true);
                }
            }
            _ => {}
        }
    }

    /// Item scope: one `graderoster_item` subtree
    fn handle_item_element(
        &mut self,
        e: &BytesStart,
        is_empty: bool,
        depth: usize,
        class: Option<&str>,
        rel: Option<&str>,
    ) {
        match rel {
            Some("student") if !is_empty => {
                self.student_anchor_depth = Some(depth);
                return;
            }
            Some("grade_submitter_person") if !is_empty => {
                self.item_submitter_depth = Some(depth);
                return;
            }
            _ => {}
        }

        if self.student_anchor_depth.is_some() && !is_empty {
            match class {
                Some("reg_id") => {
                    self.pending = Some(TextTarget::StudentRegId);
                    return;
                }
                Some("name") => {
                    self.pending = Some(TextTarget::StudentName);
                    return;
                }
                _ => {}
            }
        }
        if self.item_submitter_depth.is_some() && class == Some("reg_id") {
            if !is_empty {
                self.pending = Some(TextTarget::ItemSubmitterRegId);
            }
            return;
        }

        let Some(item) = self.item.as_mut() else {
            return;
        };
        match class {
            Some("incomplete") => {
                if is_flag(e, "checked") {
                    item.has_incomplete = true;
                }
                if !is_flag(e, "disabled") {
                    item.allows_incomplete = true;
                }
            }
            Some("writing_course") => {
                if is_flag(e, "checked") {
                    item.has_writing_credit = true;
                }
            }
            Some("auditor") => {
                if is_flag(e, "checked") {
                    item.is_auditor = true;
                }
            }
            Some("no_grade_now") => {
                if is_flag(e, "checked") {
                    item.no_grade_now = true;
                }
            }
            Some("grades") => {
                if !is_flag(e, "disabled") {
                    item.allows_grade_change = true;
                }
            }
            Some("grade") => {
                let selected = is_flag(e, "selected");
                if is_empty {
                    // An option with no text is still a (blank) choice
                    item.grade_choices.push(String::new());
                    if selected {
                        item.grade = Some(String::new());
                    }
                } else {
                    self.pending = Some(TextTarget::GradeOption { selected });
                }
            }
            Some(label) => {
                if let Some(field) = ItemField::from_class(label) {
                    if !is_empty {
                        self.pending = Some(TextTarget::Item(field));
                    }
                }
            }
            None => {}
        }
    }

    fn handle_text(&mut self, text: &str) -> Result<()> {
        let Some(target) = self.pending.take() else {
            return Ok(());
        };

        match target {
            TextTarget::DefaultSectionId => {
                if self.default_section_id.is_none() {
                    self.default_section_id = Some(text.to_uppercase());
                }
            }
            TextTarget::SectionCredits => {
                self.roster.section_credits = Some(text.to_string());
            }
            TextTarget::SubmitterRegId => {
                let person = self.resolve(text)?;
                self.roster.authorized_grade_submitters.push(person);
            }
            TextTarget::DelegateRegId => {
                self.delegate_person = Some(self.resolve(text)?);
            }
            TextTarget::DelegateLevel => {
                self.delegate_level = Some(text.to_string());
            }
            TextTarget::StudentRegId => {
                if let Some(item) = self.item.as_mut() {
                    item.student_uwregid = text.to_string();
                }
            }
            TextTarget::StudentName => {
                // "SURNAME,FIRST"; no comma leaves both names unset
                if let Some((surname, first_name)) = text.split_once(',') {
                    if let Some(item) = self.item.as_mut() {
                        item.student_surname = Some(surname.trim().to_string());
                        item.student_first_name = Some(first_name.trim().to_string());
                    }
                }
            }
            TextTarget::ItemSubmitterRegId => {
                let person = self.resolve(text)?;
                if let Some(item) = self.item.as_mut() {
                    item.grade_submitter_person = Some(person);
                }
            }
            TextTarget::GradeOption { selected } => {
                if let Some(item) = self.item.as_mut() {
                    item.grade_choices.push(text.to_string());
                    if selected {
                        item.grade = Some(text.to_string());
                    }
                }
            }
            TextTarget::Item(field) => {
                if let Some(item) = self.item.as_mut() {
                    apply_item_field(item, field, text);
                }
            }
        }
        Ok(())
    }

    fn handle_end(&mut self) -> Result<()> {
        self.flush_pending();
        let depth = self.depth;

        if depth == self.item_depth {
            if let Some(item) = self.item.take() {
                if item.student_uwregid.is_empty() {
                    return Err(SwsError::MissingElement(
                        "graderoster_item student reg_id".to_string(),
                    ));
                }
                self.roster.items.push(item);
            }
        }
        if self.student_anchor_depth == Some(depth) {
            self.student_anchor_depth = None;
        }
        if self.item_submitter_depth == Some(depth) {
            self.item_submitter_depth = None;
        }
        if self.section_anchor_depth == Some(depth) {
            self.section_anchor_depth = None;
        }
        if self.submitter_depth == Some(depth) {
            self.submitter_depth = None;
        }
        if self.delegate_depth == Some(depth) {
            self.delegate_depth = None;
            if let Some(person) = self.delegate_person.take() {
                self.roster
                    .grade_submission_delegates
                    .push(GradeSubmissionDelegate {
                        person,
                        delegate_level: self.delegate_level.take().unwrap_or_default(),
                    });
            }
        }
        if self.items_depth == Some(depth) {
            self.items_depth = None;
        }
        if self.roster_depth == Some(depth) {
            self.roster_depth = None;
            self.done = true;
        }

        self.depth = depth.saturating_sub(1);
        Ok(())
    }

    /// A pending grade option that never saw a text node is a blank choice;
    /// any other pending field stays unset (absence, not empty string)
    fn flush_pending(&mut self) {
        if let Some(TextTarget::GradeOption { selected }) = self.pending.take() {
            if let Some(item) = self.item.as_mut() {
                item.grade_choices.push(String::new());
                if selected {
                    item.grade = Some(String::new());
                }
            }
        }
    }

    fn resolve(&mut self, regid: &str) -> Result<Person> {
        if let Some(person) = self.people.get(regid) {
            return Ok(person.clone());
        }
        let person = self.directory.get_person_by_regid(regid)?;
        self.people.insert(regid.to_string(), person.clone());
        Ok(person)
    }
}

fn apply_item_field(item: &mut GradeRosterItem, field: ItemField, text: &str) {
    match field {
        ItemField::DuplicateCode => {
            if !text.is_empty() {
                item.duplicate_code = Some(text.to_string());
            }
        }
        ItemField::SectionId => item.section_id = Some(text.to_string()),
        ItemField::StudentFormerName => {
            if !text.is_empty() {
                item.student_former_name = Some(text.to_string());
            }
        }
        ItemField::StudentNumber => item.student_number = text.parse().ok(),
        ItemField::StudentCredits => item.student_credits = Some(text.to_string()),
        ItemField::DateWithdrawn => item.date_withdrawn = parse_date(text),
        ItemField::GradeDocumentId => item.grade_document_id = Some(text.to_string()),
        ItemField::DateGraded => item.date_graded = parse_date(text),
        ItemField::GradeSubmitterSource => {
            item.grade_submitter_source = Some(text.to_string());
        }
        ItemField::StatusCode => item.status_code = Some(text.to_string()),
        ItemField::StatusMessage => item.status_message = Some(text.to_string()),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn attr_value(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| a.unescape_value().unwrap_or_default().into_owned())
}

fn is_flag(e: &BytesStart, name: &str) -> bool {
    attr_value(e, name).as_deref() == Some(name)
}
