//! Graderoster document write path
//!
//! Renders a [`GradeRoster`] into the XHTML dialect the service accepts for
//! PUT bodies. The output uses the same `class`/`rel` vocabulary the read
//! path consumes, so a rendered roster re-parses to the same model.
//! Server-populated fields (`date_graded`, `grade_submitter_source`) are
//! emitted as empty elements when unset so the service can fill them; the
//! per-item status `code`/`message` pair is emitted only once the server has
//! reported one.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::roster::{GradeRoster, GradeRosterItem, XHTML_NAMESPACE};

type XhtmlWriter = Writer<Cursor<Vec<u8>>>;

impl GradeRoster {
    /// Render this roster as an XHTML document body
    pub fn to_xhtml(&self) -> String {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut root = BytesStart::new("div");
        root.push_attribute(("class", "graderoster"));
        root.push_attribute(("xmlns", XHTML_NAMESPACE));
        writer.write_event(Event::Start(root)).unwrap();

        self.write_header(&mut writer);

        start_el(&mut writer, "ol", &[("class", "graderoster_items")]);
        for item in &self.items {
            write_item(&mut writer, item);
        }
        end_el(&mut writer, "ol");

        writer.write_event(Event::End(BytesEnd::new("div"))).unwrap();

        let body = writer.into_inner().into_inner();
        String::from_utf8(body).unwrap()
    }

    fn write_header(&self, writer: &mut XhtmlWriter) {
        start_el(writer, "div", &[("class", "graderoster_header")]);

        start_el(writer, "a", &[("rel", "section")]);
        text_el(
            writer,
            "span",
            "section_id",
            Some(self.section.section_id.as_str()),
        );
        end_el(writer, "a");

        start_el(writer, "a", &[("rel", "instructor")]);
        text_el(
            writer,
            "span",
            "reg_id",
            Some(self.instructor.uwregid.as_str()),
        );
        end_el(writer, "a");

        text_el(
            writer,
            "span",
            "section_credits",
            self.section_credits.as_deref(),
        );
        checkbox(
            writer,
            "writing_credit_display",
            self.allows_writing_credit == Some(true),
            false,
        );

        start_el(writer, "ol", &[("class", "authorized_grade_submitters")]);
        for person in &self.authorized_grade_submitters {
            start_el(writer, "li", &[]);
            start_el(writer, "a", &[("rel", "authorized_grade_submitter")]);
            text_el(writer, "span", "reg_id", Some(person.uwregid.as_str()));
            end_el(writer, "a");
            end_el(writer, "li");
        }
        end_el(writer, "ol");

        start_el(writer, "ol", &[("class", "grade_submission_delegates")]);
        for delegate in &self.grade_submission_delegates {
            start_el(writer, "li", &[("class", "grade_submission_delegate")]);
            start_el(writer, "a", &[("rel", "person")]);
            text_el(
                writer,
                "span",
                "reg_id",
                Some(delegate.person.uwregid.as_str()),
            );
            end_el(writer, "a");
            text_el(
                writer,
                "span",
                "delegate_level",
                Some(delegate.delegate_level.as_str()),
            );
            end_el(writer, "li");
        }
        end_el(writer, "ol");

        end_el(writer, "div");
    }
}

fn write_item(writer: &mut XhtmlWriter, item: &GradeRosterItem) {
    start_el(writer, "li", &[("class", "graderoster_item")]);

    start_el(writer, "a", &[("rel", "student")]);
    text_el(writer, "span", "reg_id", Some(item.student_uwregid.as_str()));
    let name = item.student_surname.as_ref().map(|surname| {
        format!(
            "{},{}",
            surname,
            item.student_first_name.as_deref().unwrap_or_default()
        )
    });
    text_el(writer, "span", "name", name.as_deref());
    end_el(writer, "a");

    text_el(writer, "span", "duplicate_code", item.duplicate_code.as_deref());
    text_el(
        writer,
        "span",
        "student_former_name",
        item.student_former_name.as_deref(),
    );
    let number = item.student_number.map(|n| n.to_string());
    text_el(writer, "span", "student_number", number.as_deref());
    text_el(
        writer,
        "span",
        "student_credits",
        item.student_credits.as_deref(),
    );
    text_el(writer, "span", "section_id", item.section_id.as_deref());

    let withdrawn = item.date_withdrawn.map(|d| d.format("%Y-%m-%d").to_string());
    text_el(writer, "span", "date_withdrawn date", withdrawn.as_deref());

    checkbox(writer, "auditor", item.is_auditor, false);
    checkbox(
        writer,
        "incomplete",
        item.has_incomplete,
        !item.allows_incomplete,
    );
    checkbox(writer, "writing_course", item.has_writing_credit, false);
    checkbox(writer, "no_grade_now", item.no_grade_now, false);

    let mut select = BytesStart::new("select");
    select.push_attribute(("class", "grades"));
    if !item.allows_grade_change {
        select.push_attribute(("disabled", "disabled"));
    }
    writer.write_event(Event::Start(select)).unwrap();
    for choice in &item.grade_choices {
        let mut option = BytesStart::new("option");
        option.push_attribute(("class", "grade"));
        if item.grade.as_deref() == Some(choice.as_str()) {
            option.push_attribute(("selected", "selected"));
        }
        if choice.is_empty() {
            writer.write_event(Event::Empty(option)).unwrap();
        } else {
            writer.write_event(Event::Start(option)).unwrap();
            writer
                .write_event(Event::Text(BytesText::new(choice)))
                .unwrap();
            writer.write_event(Event::End(BytesEnd::new("option"))).unwrap();
        }
    }
    end_el(writer, "select");

    text_el(
        writer,
        "span",
        "grade_document_id",
        item.grade_document_id.as_deref(),
    );

    if let Some(person) = &item.grade_submitter_person {
        start_el(writer, "a", &[("rel", "grade_submitter_person")]);
        text_el(writer, "span", "reg_id", Some(person.uwregid.as_str()));
        end_el(writer, "a");
    }
    text_el(
        writer,
        "span",
        "grade_submitter_source",
        item.grade_submitter_source.as_deref(),
    );
    let graded = item.date_graded.map(|d| d.format("%Y-%m-%d").to_string());
    text_el(writer, "span", "date_graded date", graded.as_deref());

    if item.status_code.is_some() {
        text_el(writer, "span", "code", item.status_code.as_deref());
        text_el(writer, "span", "message", item.status_message.as_deref());
    }

    end_el(writer, "li");
}

fn start_el(writer: &mut XhtmlWriter, tag: &str, attrs: &[(&str, &str)]) {
    let mut el = BytesStart::new(tag);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    writer.write_event(Event::Start(el)).unwrap();
}

fn end_el(writer: &mut XhtmlWriter, tag: &str) {
    writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
}

/// Write `<tag class="..">text</tag>`, or an empty element when there is no
/// text. The read path treats the empty element as absence.
fn text_el(writer: &mut XhtmlWriter, tag: &str, class: &str, text: Option<&str>) {
    let mut el = BytesStart::new(tag);
    el.push_attribute(("class", class));
    match text {
        Some(text) if !text.is_empty() => {
            writer.write_event(Event::Start(el)).unwrap();
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .unwrap();
            writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
        }
        _ => writer.write_event(Event::Empty(el)).unwrap(),
    }
}

fn checkbox(writer: &mut XhtmlWriter, class: &str, checked: bool, disabled: bool) {
    let mut el = BytesStart::new("input");
    el.push_attribute(("type", "checkbox"));
    el.push_attribute(("class", class));
    if checked {
        el.push_attribute(("checked", "checked"));
    }
    if disabled {
        el.push_attribute(("disabled", "disabled"));
    }
    writer.write_event(Event::Empty(el)).unwrap();
}
