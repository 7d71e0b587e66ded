//! Fetch/update orchestration for the graderoster resource
//!
//! The client owns no transport: GET and PUT go through an injected
//! [`RestDao`], and person references found while parsing are resolved
//! through an injected [`PersonDirectory`]. Both operations are synchronous,
//! perform exactly one network call, and never retry; transport errors
//! surface unmodified.

use tracing::{debug, trace};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Result, SwsError};
use crate::models::{Person, Section};
use crate::roster::GradeRoster;

/// Base path of the graderoster resource
pub const GRADEROSTER_URL: &str = "/student/v5/graderoster";

/// Raw response from a [`RestDao`] call
#[derive(Debug, Clone)]
pub struct RestResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl RestResponse {
    /// Check if the response indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP data-access collaborator
///
/// Implementations carry the transport details (base URL, TLS, auth,
/// mocking); the client only supplies the path, headers, and body.
pub trait RestDao {
    /// Issue a GET for `url` with the given headers
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RestResponse>;

    /// Issue a PUT for `url` with the given headers and body
    fn put(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<RestResponse>;
}

impl<D: RestDao + ?Sized> RestDao for &D {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RestResponse> {
        (**self).get(url, headers)
    }

    fn put(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<RestResponse> {
        (**self).put(url, headers, body)
    }
}

/// Person-directory collaborator, looked up by registration id
pub trait PersonDirectory {
    /// Resolve a person from their 32-character registration id
    fn get_person_by_regid(&self, regid: &str) -> Result<Person>;
}

impl<P: PersonDirectory + ?Sized> PersonDirectory for &P {
    fn get_person_by_regid(&self, regid: &str) -> Result<Person> {
        (**self).get_person_by_regid(regid)
    }
}

/// Client for fetching and updating graderoster resources
pub struct GradeRosterClient<D, P> {
    dao: D,
    directory: P,
}

impl<D: RestDao, P: PersonDirectory> GradeRosterClient<D, P> {
    /// Create a client over a data-access object and a person directory
    pub fn new(dao: D, directory: P) -> Self {
        Self { dao, directory }
    }

    /// Fetch the graderoster for a section and instructor
    ///
    /// The request is made "as" `requestor` via the `X-UW-Act-as` header.
    ///
    /// # Errors
    ///
    /// - [`SwsError::DataFailure`] - non-2xx response, carrying the URL,
    ///   status, and the message extracted from the error body
    /// - [`SwsError::MalformedResponse`] - 2xx response whose body is not a
    ///   well-formed graderoster document
    pub fn get_graderoster(
        &self,
        section: &Section,
        instructor: &Person,
        requestor: &Person,
    ) -> Result<GradeRoster> {
        let label = GradeRoster::new(section.clone(), instructor.clone()).graderoster_label();
        let url = format!("{}/{}", GRADEROSTER_URL, encode_section_label(&label));
        trace!(url = %url, "fetching graderoster");

        let headers = [
            ("Accept", "text/xhtml"),
            ("Connection", "keep-alive"),
            ("X-UW-Act-as", requestor.uwnetid.as_str()),
        ];
        let response = self.dao.get(&url, &headers)?;
        let body = check_response(&url, response)?;

        let roster =
            GradeRoster::from_xhtml(&body, section.clone(), instructor.clone(), &self.directory)
                .map_err(|e| wrap_parse_error(&url, e))?;
        debug!(
            label = %label,
            items = roster.items.len(),
            "fetched graderoster"
        );
        Ok(roster)
    }

    /// Submit a graderoster update
    ///
    /// The roster is rendered to XHTML and PUT to the resource; the server
    /// echoes back the accepted state, which is parsed into a fresh roster.
    /// Per-item submission failures are not errors: inspect each returned
    /// item's `status_code`/`status_message`.
    ///
    /// # Errors
    ///
    /// Same failure kinds as [`Self::get_graderoster`].
    pub fn update_graderoster(
        &self,
        graderoster: &GradeRoster,
        requestor: &Person,
    ) -> Result<GradeRoster> {
        let label = graderoster.graderoster_label();
        let url = format!("{}/{}", GRADEROSTER_URL, encode_section_label(&label));
        trace!(url = %url, "updating graderoster");

        let headers = [
            ("Content-Type", "application/xhtml+xml"),
            ("Connection", "keep-alive"),
            ("X-UW-Act-as", requestor.uwnetid.as_str()),
        ];
        let body = graderoster.to_xhtml();
        let response = self.dao.put(&url, &headers, &body)?;
        let body = check_response(&url, response)?;

        let roster = GradeRoster::from_xhtml(
            &body,
            graderoster.section.clone(),
            graderoster.instructor.clone(),
            &self.directory,
        )
        .map_err(|e| wrap_parse_error(&url, e))?;
        debug!(
            label = %label,
            items = roster.items.len(),
            "updated graderoster"
        );
        Ok(roster)
    }
}

/// Turn a non-2xx response into a [`SwsError::DataFailure`]; decode a
/// successful body as UTF-8
fn check_response(url: &str, response: RestResponse) -> Result<String> {
    if !response.is_success() {
        return Err(SwsError::DataFailure {
            url: url.to_string(),
            status: response.status,
            message: extract_status_description(&response.body),
        });
    }
    Ok(String::from_utf8(response.body)?)
}

/// Wrap document-level parse failures with the request URL; anything else
/// (directory lookups, IO) passes through untouched
fn wrap_parse_error(url: &str, err: SwsError) -> SwsError {
    match err {
        err @ (SwsError::Xml(_) | SwsError::MissingElement(_)) => SwsError::MalformedResponse {
            url: url.to_string(),
            source: Box::new(err),
        },
        other => other,
    }
}

/// Pull the human-readable message out of an XHTML error body
///
/// Error responses carry an element with class `status_description`. Bodies
/// without one (including plain-text bodies) fall back to the trimmed body
/// itself.
fn extract_status_description(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut pending = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                pending = e
                    .attributes()
                    .flatten()
                    .any(|a| a.key.as_ref() == b"class" && a.value.as_ref() == b"status_description");
            }
            Ok(Event::Text(ref e)) if pending => {
                return e.unescape().unwrap_or_default().trim().to_string();
            }
            Ok(Event::End(_)) => pending = false,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Percent-encode a graderoster label for use as a path segment
///
/// Unreserved characters plus `/` and `,` pass through; everything else is
/// encoded, matching what the upstream service expects for labels like
/// `2013,autumn,EDC&I,461,A`.
pub fn encode_section_label(label: &str) -> String {
    let mut encoded = String::with_capacity(label.len());
    for byte in label.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b'/'
            | b',' => encoded.push(byte as char),
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{:02X}", byte));
            }
        }
    }
    encoded
}
