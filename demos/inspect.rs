//! Parse a graderoster XHTML document from disk and print its items
//!
//! Usage: cargo run --example inspect -- <roster.xhtml>

use sws_graderoster::{GradeRoster, Person, PersonDirectory, Section, Term};

/// Offline directory: synthesizes a person from the reg-id alone
struct LocalDirectory;

impl PersonDirectory for LocalDirectory {
    fn get_person_by_regid(&self, regid: &str) -> sws_graderoster::Result<Person> {
        Ok(Person::new(regid, regid.to_lowercase()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: inspect <roster.xhtml>");
        std::process::exit(2);
    };
    let xml = std::fs::read_to_string(&path)?;

    let section = Section::new(Term::new(2013, "summer"), "CSS", "161", "A");
    let instructor = Person::new("FBB38FE46A7C11D5A4AE0004AC494FFE", "bill");
    let roster = GradeRoster::from_xhtml(&xml, section, instructor, &LocalDirectory)?;

    println!("{}", roster.graderoster_label());
    for item in &roster.items {
        println!(
            "  {:<36} {}",
            item.student_label(","),
            item.grade.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
