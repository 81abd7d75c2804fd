//! Field-level validation rules and normalization
//!
//! Every form declares a static table of [`FieldSpec`]s. Validation walks the
//! whole table so that all violations are reported together; within a single
//! field the first failing spec wins (e.g. "required" before "valid date").

use crate::state::{Credentials, PolicyDraft, PolicyStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// Names of every validated field across the forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Name,
    Company,
    Value,
    Premium,
    StartDate,
    EndDate,
    Nominees,
    Email,
    Password,
}

impl FieldName {
    /// Key used on the wire and in logs
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Value => "value",
            Self::Premium => "premium",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::Nominees => "nominees",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

/// Semantic type of a field's raw string value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Email,
    Secret,
}

/// Constraint predicate applied to a raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MinChars(usize),
    NonEmpty,
    PositiveNumber,
    Date,
    WholeNumberInRange(u8, u8),
    Email,
}

impl Rule {
    pub fn holds(&self, raw: &str) -> bool {
        match *self {
            Rule::MinChars(min) => raw.chars().count() >= min,
            Rule::NonEmpty => !raw.trim().is_empty(),
            Rule::PositiveNumber => parse_positive_number(raw).is_some(),
            Rule::Date => parse_instant(raw).is_some(),
            Rule::WholeNumberInRange(min, max) => parse_whole_in_range(raw, min, max).is_some(),
            Rule::Email => is_valid_email(raw),
        }
    }
}

/// A named validation rule for one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: FieldName,
    pub kind: FieldKind,
    pub rule: Rule,
    pub message: &'static str,
}

const fn spec(name: FieldName, kind: FieldKind, rule: Rule, message: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        rule,
        message,
    }
}

pub const NOMINEES_MIN: u8 = 1;
pub const NOMINEES_MAX: u8 = 5;

pub const POLICY_FIELDS: &[FieldSpec] = &[
    spec(
        FieldName::Name,
        FieldKind::Text,
        Rule::MinChars(3),
        "Name must be at least 3 characters",
    ),
    spec(
        FieldName::Company,
        FieldKind::Text,
        Rule::MinChars(2),
        "Company must be at least 2 characters",
    ),
    spec(
        FieldName::Value,
        FieldKind::Number,
        Rule::PositiveNumber,
        "Value must be a positive number",
    ),
    spec(
        FieldName::Premium,
        FieldKind::Number,
        Rule::PositiveNumber,
        "Premium must be a positive number",
    ),
    spec(FieldName::StartDate, FieldKind::Date, Rule::NonEmpty, "Start date is required"),
    spec(FieldName::StartDate, FieldKind::Date, Rule::Date, "Start date must be a valid date"),
    spec(FieldName::EndDate, FieldKind::Date, Rule::NonEmpty, "End date is required"),
    spec(FieldName::EndDate, FieldKind::Date, Rule::Date, "End date must be a valid date"),
    spec(
        FieldName::Nominees,
        FieldKind::Number,
        Rule::WholeNumberInRange(NOMINEES_MIN, NOMINEES_MAX),
        "Nominees must be a whole number between 1 and 5",
    ),
];

pub const LOGIN_FIELDS: &[FieldSpec] = &[
    spec(FieldName::Email, FieldKind::Email, Rule::Email, "Enter a valid email address"),
    spec(FieldName::Password, FieldKind::Secret, Rule::NonEmpty, "Password is required"),
];

pub const END_BEFORE_START: &str = "End date must be after start date";

/// Field → message for every violated field
pub type ErrorMap = BTreeMap<FieldName, String>;

/// Anything that can hand out the raw string value of a field
pub trait FieldSource {
    fn raw(&self, name: FieldName) -> &str;
}

/// Optional rules layered on top of the per-field checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyRules {
    /// Require the end date to be strictly after the start date
    pub enforce_date_order: bool,
}

/// Evaluate a spec table against a source, collecting one message per field
pub fn check_fields(specs: &[FieldSpec], source: &impl FieldSource) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for spec in specs {
        if errors.contains_key(&spec.name) {
            continue;
        }
        if !spec.rule.holds(source.raw(spec.name)) {
            tracing::trace!(field = spec.name.key(), kind = ?spec.kind, "field rejected");
            errors.insert(spec.name, spec.message.to_string());
        }
    }
    errors
}

/// Validate policy input and normalize it into a draft
pub fn validate_policy(
    source: &impl FieldSource,
    rules: &PolicyRules,
) -> Result<PolicyDraft, ErrorMap> {
    let mut errors = check_fields(POLICY_FIELDS, source);

    let start = parse_instant(source.raw(FieldName::StartDate));
    let end = parse_instant(source.raw(FieldName::EndDate));

    if rules.enforce_date_order {
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors
                    .entry(FieldName::EndDate)
                    .or_insert_with(|| END_BEFORE_START.to_string());
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let value = parse_positive_number(source.raw(FieldName::Value));
    let premium = parse_positive_number(source.raw(FieldName::Premium));
    let nominees = parse_whole_in_range(
        source.raw(FieldName::Nominees),
        NOMINEES_MIN,
        NOMINEES_MAX,
    );

    match (value, premium, start, end, nominees) {
        (Some(value), Some(premium), Some(start_date), Some(end_date), Some(nominees)) => {
            Ok(PolicyDraft {
                name: source.raw(FieldName::Name).to_string(),
                company: source.raw(FieldName::Company).to_string(),
                value,
                premium,
                start_date,
                end_date,
                nominees,
                status: PolicyStatus::default(),
            })
        }
        // Unreachable while the table and parsers agree; report instead of panicking
        _ => Err(check_fields(POLICY_FIELDS, source)),
    }
}

/// Validate login input into credentials
pub fn validate_login(source: &impl FieldSource) -> Result<Credentials, ErrorMap> {
    let errors = check_fields(LOGIN_FIELDS, source);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Credentials {
        email: source.raw(FieldName::Email).trim().to_string(),
        password: source.raw(FieldName::Password).to_string(),
    })
}

/// Finite number strictly greater than zero
pub fn parse_positive_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Whole number within `[min, max]`; `"2.0"` counts as whole
pub fn parse_whole_in_range(raw: &str, min: u8, max: u8) -> Option<u8> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(min) || value > f64::from(max) {
        return None;
    }
    Some(value as u8)
}

/// Parse a date or datetime string into a UTC instant.
///
/// Accepts RFC 3339, a bare `YYYY-MM-DD` (midnight UTC) and naive
/// `YYYY-MM-DD[T ]HH:MM[:SS]` (taken as UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// Pragmatic email syntax check: `local@label.label[...]`, no whitespace
pub fn is_valid_email(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
