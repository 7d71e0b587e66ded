//! Integration tests for the graderoster fetch/update cycle
//!
//! These run against an in-memory mock of the REST data-access object; no
//! network is involved. The PUT mock mirrors the live service: it echoes the
//! submitted roster back with the server-populated fields filled in and a
//! per-item submission status attached.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDate;
use sws_graderoster::{
    GradeRoster, GradeRosterClient, Person, PersonDirectory, RestDao, RestResponse, Result,
    Section, SwsError, Term,
};

const ROSTER_XHTML: &str = include_str!("resources/graderoster.xhtml");

const INSTRUCTOR_REGID: &str = "FBB38FE46A7C11D5A4AE0004AC494FFE";

fn section() -> Section {
    Section::new(Term::new(2013, "summer"), "CSS", "161", "A")
}

fn instructor() -> Person {
    Person::new(INSTRUCTOR_REGID, "bill")
}

/// Directory resolving every reg-id to a synthetic person
struct TestDirectory;

impl PersonDirectory for TestDirectory {
    fn get_person_by_regid(&self, regid: &str) -> Result<Person> {
        Ok(Person::new(regid, format!("u{}", &regid[..8])))
    }
}

/// In-memory stand-in for the service: GET returns the fixture document,
/// PUT echoes the submitted roster with server fields filled in
struct MockDao {
    /// (method, url, headers) of every request issued
    requests: RefCell<Vec<(String, String, HashMap<String, String>)>>,
    /// Reg-ids whose submission should be rejected
    fail_regids: Vec<String>,
}

impl MockDao {
    fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            fail_regids: Vec::new(),
        }
    }

    fn failing(regids: &[&str]) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            fail_regids: regids.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn record(&self, method: &str, url: &str, headers: &[(&str, &str)]) {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.requests
            .borrow_mut()
            .push((method.to_string(), url.to_string(), headers));
    }

    /// What the live service does on PUT: fill `date_graded` and
    /// `grade_submitter_source` where empty, and attach a status to every
    /// item
    fn submitted_body(&self, body: &str) -> String {
        let mut roster =
            GradeRoster::from_xhtml(body, section(), instructor(), &TestDirectory).unwrap();
        for item in &mut roster.items {
            if item.date_graded.is_none() {
                item.date_graded = NaiveDate::from_ymd_opt(2013, 6, 1);
            }
            if item.grade_submitter_source.is_none() {
                item.grade_submitter_source = Some("WEBCGB".to_string());
            }
            if self.fail_regids.contains(&item.student_uwregid) {
                item.status_code = Some("500".to_string());
                item.status_message = Some("Invalid grade".to_string());
            } else {
                item.status_code = Some("200".to_string());
                item.status_message = Some(String::new());
            }
        }
        roster.to_xhtml()
    }
}

impl RestDao for MockDao {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RestResponse> {
        self.record("GET", url, headers);
        Ok(RestResponse {
            status: 200,
            body: ROSTER_XHTML.as_bytes().to_vec(),
        })
    }

    fn put(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<RestResponse> {
        self.record("PUT", url, headers);
        Ok(RestResponse {
            status: 200,
            body: self.submitted_body(body).into_bytes(),
        })
    }
}

#[test]
fn test_get_graderoster() {
    let client = GradeRosterClient::new(MockDao::new(), TestDirectory);
    let graderoster = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap();

    assert_eq!(
        graderoster.graderoster_label(),
        format!("2013,summer,CSS,161,A,{}", INSTRUCTOR_REGID)
    );
    assert_eq!(graderoster.section_credits.as_deref(), Some("5.0"));
    assert_eq!(graderoster.grade_submission_delegates.len(), 2);
    assert_eq!(
        graderoster.grade_submission_delegates[0].delegate_level,
        "Primary"
    );
    assert_eq!(graderoster.authorized_grade_submitters.len(), 1);
    assert_eq!(
        graderoster.authorized_grade_submitters[0].uwnetid, "bill",
        "instructor resolved without a directory lookup"
    );
    assert_eq!(graderoster.items.len(), 5);

    let grades = [Some("0.7"), None, Some("3.1"), Some("1.5"), Some("4.0")];
    let labels = [
        "1914B1B26A7D11D5A4AE0004AC494FFE",
        "511FC8241DC611DB9943F9D03AACCE31",
        "F00E253C634211DA9755000629C31437",
        "C7EED7406A7C11D5A4AE0004AC494FFE",
        "A9D2DDFA6A7D11D5A4AE0004AC494FFE,A",
    ];
    let surnames = ["AVERAGE", "AVERAGE", "AVERAGE", "AVERAGE", "TEACHER"];
    let first_names = ["CHARLIE", "JASON A", "STEPHEN J", "MICHAEL S.", "PHIL AVERAGE"];

    for (idx, item) in graderoster.items.iter().enumerate() {
        assert_eq!(item.grade_choices.len(), 36, "full composite grade scale");
        assert_eq!(item.grade.as_deref(), grades[idx]);
        assert_eq!(item.student_label(","), labels[idx]);
        assert_eq!(item.student_surname.as_deref(), Some(surnames[idx]));
        assert_eq!(item.student_first_name.as_deref(), Some(first_names[idx]));
        assert_eq!(item.grade_document_id.as_deref(), Some("08261300000"));
        assert_eq!(item.section_id.as_deref(), Some("A"));
        assert!(item.allows_incomplete);
        assert!(item.allows_grade_change);
        assert_eq!(item.status_code, None, "no status before submission");
        assert_eq!(item.date_graded, None);
    }

    if let Some(grade) = &graderoster.items[0].grade {
        assert!(graderoster.items[0].grade_choices.contains(grade));
    }
}

#[test]
fn test_request_url_and_headers() {
    let dao = MockDao::new();
    let requestor = Person::new("0C0A1BA55E0A11D58B63000629C31437", "jdelegate");
    {
        let client = GradeRosterClient::new(&dao, TestDirectory);
        let graderoster = client
            .get_graderoster(&section(), &instructor(), &requestor)
            .unwrap();
        client.update_graderoster(&graderoster, &requestor).unwrap();
    }
    let requests = dao.requests.borrow();

    let expected_url = format!("/student/v5/graderoster/2013,summer,CSS,161,A,{}", INSTRUCTOR_REGID);
    let (method, url, headers) = &requests[0];
    assert_eq!(method, "GET");
    assert_eq!(url, &expected_url);
    assert_eq!(headers.get("Accept").map(String::as_str), Some("text/xhtml"));
    assert_eq!(
        headers.get("Connection").map(String::as_str),
        Some("keep-alive")
    );
    assert_eq!(
        headers.get("X-UW-Act-as").map(String::as_str),
        Some("jdelegate")
    );

    let (method, url, headers) = &requests[1];
    assert_eq!(method, "PUT");
    assert_eq!(url, &expected_url);
    assert_eq!(
        headers.get("Content-Type").map(String::as_str),
        Some("application/xhtml+xml")
    );
    assert_eq!(
        headers.get("X-UW-Act-as").map(String::as_str),
        Some("jdelegate")
    );
}

#[test]
fn test_update_graderoster() {
    let client = GradeRosterClient::new(MockDao::new(), TestDirectory);
    let mut graderoster = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap();

    let new_grades = ["3.8", "2.9", "1.2", "0.8", "2.0"];
    for (item, grade) in graderoster.items.iter_mut().zip(new_grades) {
        assert!(item.grade_choices.iter().any(|c| c == grade));
        item.grade = Some(grade.to_string());
    }

    let submitted = client
        .update_graderoster(&graderoster, &instructor())
        .unwrap();

    assert_eq!(submitted.items.len(), 5);
    for (idx, item) in submitted.items.iter().enumerate() {
        assert_eq!(item.grade.as_deref(), Some(new_grades[idx]), "grade echoed");
        assert_eq!(item.status_code.as_deref(), Some("200"));
        assert_eq!(item.status_message, None, "empty message stays absent");
        assert_eq!(item.date_graded, NaiveDate::from_ymd_opt(2013, 6, 1));
        assert_eq!(item.grade_submitter_source.as_deref(), Some("WEBCGB"));
    }

    // Item identity survives the round trip
    assert_eq!(submitted.items, graderoster.items);
}

#[test]
fn test_partial_submission_failure_is_not_an_error() {
    let rejected = "A9D2DDFA6A7D11D5A4AE0004AC494FFE";
    let client = GradeRosterClient::new(MockDao::failing(&[rejected]), TestDirectory);
    let mut graderoster = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap();
    for item in &mut graderoster.items {
        item.grade = Some("4.0".to_string());
    }

    let submitted = client
        .update_graderoster(&graderoster, &instructor())
        .unwrap();

    for item in &submitted.items {
        if item.student_uwregid == rejected {
            assert_eq!(item.status_code.as_deref(), Some("500"));
            assert_eq!(item.status_message.as_deref(), Some("Invalid grade"));
        } else {
            assert_eq!(item.status_code.as_deref(), Some("200"));
        }
    }
}

/// DAO returning a fixed error response
struct ErrorDao {
    status: u16,
    body: &'static str,
}

impl RestDao for ErrorDao {
    fn get(&self, _url: &str, _headers: &[(&str, &str)]) -> Result<RestResponse> {
        Ok(RestResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }

    fn put(&self, _url: &str, _headers: &[(&str, &str)], _body: &str) -> Result<RestResponse> {
        Ok(RestResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

#[test]
fn test_non_2xx_response_raises_data_failure() {
    let dao = ErrorDao {
        status: 500,
        body: r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
            <div class="status_description">No employee found for ID 1234567890</div>
        </body></html>"#,
    };
    let client = GradeRosterClient::new(dao, TestDirectory);

    let err = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap_err();
    match err {
        SwsError::DataFailure {
            url,
            status,
            message,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "No employee found for ID 1234567890");
            assert!(url.starts_with("/student/v5/graderoster/2013,summer,CSS,161,A,"));
        }
        other => panic!("expected DataFailure, got {:?}", other),
    }
}

#[test]
fn test_not_found_with_plain_text_body() {
    let dao = ErrorDao {
        status: 404,
        body: "grading period not active for year/quarter",
    };
    let client = GradeRosterClient::new(dao, TestDirectory);

    let err = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap_err();
    match err {
        SwsError::DataFailure { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "grading period not active for year/quarter");
        }
        other => panic!("expected DataFailure, got {:?}", other),
    }
}

#[test]
fn test_malformed_success_body() {
    let dao = ErrorDao {
        status: 200,
        body: "<html><body><p>not a roster</p></body></html>",
    };
    let client = GradeRosterClient::new(dao, TestDirectory);

    let err = client
        .get_graderoster(&section(), &instructor(), &instructor())
        .unwrap_err();
    assert!(matches!(err, SwsError::MalformedResponse { .. }));
}
