//! Code normalization and family/variant matching.
//!
//! Pure functions. A *family match* is a substring relation between the
//! derived pattern and a candidate's code; a *variant match* is equality of
//! displayed code and order code, verbatim or case-folded.

use cartfill_schemas::{PatternError, Variant};

/// Suffix appended to the leading digit run of an order code.
pub const PATTERN_SUFFIX: char = 'x';

/// Article labels some catalogs render in front of a code (`"art.: 100x"`).
const ARTICLE_LABELS: &[&str] = &["art.:", "art:"];

/// Trim whitespace and drop a leading article label.
pub fn normalize_code(raw: &str) -> &str {
    let t = raw.trim();
    for label in ARTICLE_LABELS {
        let has_label = t
            .get(..label.len())
            .map(|p| p.eq_ignore_ascii_case(label))
            .unwrap_or(false);
        if has_label {
            return t[label.len()..].trim_start();
        }
    }
    t
}

/// Family pattern derived from an order code: first digit run + `x`.
///
/// `"123ABC"` -> `"123x"`, `"A100B"` -> `"100x"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchPattern(String);

impl MatchPattern {
    pub fn derive(code: &str) -> Result<Self, PatternError> {
        let code = normalize_code(code);
        let digits: String = code
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        if digits.is_empty() {
            return Err(PatternError::NoDigitRun(code.to_string()));
        }

        let mut pattern = digits;
        pattern.push(PATTERN_SUFFIX);
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the candidate's normalized code contains this pattern.
    pub fn matches_family(&self, candidate_code: &str) -> bool {
        normalize_code(candidate_code).contains(self.0.as_str())
    }
}

/// Displayed variant code equals the wanted code, verbatim or lower-cased.
pub fn codes_match(displayed: &str, wanted: &str) -> bool {
    let d = normalize_code(displayed);
    let w = normalize_code(wanted);
    d == w || d.to_lowercase() == w.to_lowercase()
}

/// First variant (in listed order) whose code matches `code`.
pub fn first_matching_variant<'v>(variants: &'v [Variant], code: &str) -> Option<&'v Variant> {
    variants.iter().find(|v| codes_match(&v.displayed_code, code))
}
