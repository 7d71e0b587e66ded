//! Grading scale definitions and classification
//!
//! The institution grades against five fixed scales. A course's grade-option
//! list (as parsed from a graderoster document) can be classified by
//! canonicalizing it and comparing against the scale definitions.

/// One of the institution's fixed grading scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradingScale {
    /// Undergraduate numeric scale, 4.0 down to 0.7
    Undergraduate,
    /// Graduate numeric scale, 4.0 down to 1.7
    Graduate,
    /// School of Medicine pass/no pass scale
    PassFail,
    /// Credit/no credit scale
    Credit,
    /// Honors/high pass/pass/fail scale
    HighPassFail,
}

const UNDERGRADUATE_GRADES: &[&str] = &[
    "4.0", "3.9", "3.8", "3.7", "3.6", "3.5", "3.4", "3.3", "3.2", "3.1", "3.0", "2.9", "2.8",
    "2.7", "2.6", "2.5", "2.4", "2.3", "2.2", "2.1", "2.0", "1.9", "1.8", "1.7", "1.6", "1.5",
    "1.4", "1.3", "1.2", "1.1", "1.0", "0.9", "0.8", "0.7",
];

const GRADUATE_GRADES: &[&str] = &[
    "4.0", "3.9", "3.8", "3.7", "3.6", "3.5", "3.4", "3.3", "3.2", "3.1", "3.0", "2.9", "2.8",
    "2.7", "2.6", "2.5", "2.4", "2.3", "2.2", "2.1", "2.0", "1.9", "1.8", "1.7",
];

const PASSFAIL_GRADES: &[&str] = &["P", "F"];
const CREDIT_GRADES: &[&str] = &["CR", "NC"];
const HIGHPASSFAIL_GRADES: &[&str] = &["H", "HP", "P", "F"];

impl GradingScale {
    /// All scales, in classification precedence order
    pub const ALL: [GradingScale; 5] = [
        GradingScale::Undergraduate,
        GradingScale::Graduate,
        GradingScale::PassFail,
        GradingScale::Credit,
        GradingScale::HighPassFail,
    ];

    /// Short identifier used by the upstream service
    pub fn code(&self) -> &'static str {
        match self {
            GradingScale::Undergraduate => "ug",
            GradingScale::Graduate => "gr",
            GradingScale::PassFail => "pf",
            GradingScale::Credit => "cnc",
            GradingScale::HighPassFail => "hpf",
        }
    }

    /// Human-readable scale name
    pub fn description(&self) -> &'static str {
        match self {
            GradingScale::Undergraduate => "Undergraduate Scale (4.0-0.7)",
            GradingScale::Graduate => "Graduate Scale (4.0-1.7)",
            GradingScale::PassFail => "School of Medicine Pass/No Pass Scale",
            GradingScale::Credit => "Credit/No Credit Scale",
            GradingScale::HighPassFail => "Honors/High Pass/Pass/Fail Scale",
        }
    }

    /// The canonical ordered grade list for this scale
    pub fn grades(&self) -> &'static [&'static str] {
        match self {
            GradingScale::Undergraduate => UNDERGRADUATE_GRADES,
            GradingScale::Graduate => GRADUATE_GRADES,
            GradingScale::PassFail => PASSFAIL_GRADES,
            GradingScale::Credit => CREDIT_GRADES,
            GradingScale::HighPassFail => HIGHPASSFAIL_GRADES,
        }
    }

    /// Check whether a grade-option list is exactly this scale
    ///
    /// The input is canonicalized with [`sorted_scale`] first, so member
    /// order and letter case do not matter; membership must be exact.
    pub fn matches<S: AsRef<str>>(&self, values: &[S]) -> bool {
        let sorted = sorted_scale(values);
        sorted.len() == self.grades().len()
            && sorted
                .iter()
                .map(String::as_str)
                .eq(self.grades().iter().copied())
    }
}

/// Sort key controlling the order of all valid grades, including mixed
/// sorting with numeric 4.0-scale grades.
///
/// Non-numeric tokens map to synthetic keys above every numeric grade;
/// numeric grades sort by their own string form. The lexicographic compare
/// coincides with numeric order only because every numeric grade is one
/// integer digit, a dot, and one decimal digit. Do not replace this table
/// with numeric comparison.
fn grade_order(grade: &str) -> &str {
    match grade {
        "" => "9.9",
        "I" => "9.8",
        "W" => "9.7",
        "HW" => "9.5",
        "H" => "7.3",
        "HP" => "7.2",
        "P" => "7.1",
        "F" => "7.0",
        "CR" => "6.1",
        "NC" => "6.0",
        "N" => "5",
        other => other,
    }
}

/// Canonicalize a grade-option list: uppercase every token and sort
/// descending by the fixed grade order.
pub fn sorted_scale<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut grades: Vec<String> = values.iter().map(|v| v.as_ref().to_uppercase()).collect();
    grades.sort_by(|a, b| grade_order(b).cmp(grade_order(a)));
    grades
}

/// Find the scale a grade-option list belongs to, if any
pub fn matching_scale<S: AsRef<str>>(values: &[S]) -> Option<GradingScale> {
    GradingScale::ALL.into_iter().find(|s| s.matches(values))
}
