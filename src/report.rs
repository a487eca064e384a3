//! Validation findings and the verdict returned to callers.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::types::ExpectedType;

/// A value whose JSON type does not match the declared one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidType {
    /// Field path, e.g. `parent.list[2].field`.
    pub path: String,
    pub expected_type: ExpectedType,
    /// The value the caller supplied.
    pub actually_value: Value,
}

impl fmt::Display for InvalidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        };
        write!(
            f,
            "{}: expected {}, got {}",
            path, self.expected_type, self.actually_value
        )
    }
}

/// Findings of one validation call.
///
/// Both lists keep the order in which fields were visited. Empty lists are left
/// out when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Paths of required fields that were absent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_type: Vec<InvalidType>,
}

impl ValidationReport {
    /// A report with a single missing field.
    pub fn missing(path: impl Into<String>) -> Self {
        ValidationReport {
            required: vec![path.into()],
            invalid_type: Vec::new(),
        }
    }

    /// A report with a single type mismatch.
    pub fn invalid(
        path: impl Into<String>,
        expected_type: impl Into<ExpectedType>,
        actually_value: &Value,
    ) -> Self {
        ValidationReport {
            required: Vec::new(),
            invalid_type: vec![InvalidType {
                path: path.into(),
                expected_type: expected_type.into(),
                actually_value: actually_value.clone(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.invalid_type.is_empty()
    }

    /// Number of findings across both categories.
    pub fn len(&self) -> usize {
        self.required.len() + self.invalid_type.len()
    }

    /// Concatenate two reports, `self` first.
    pub fn merge(self, other: ValidationReport) -> ValidationReport {
        let ValidationReport {
            mut required,
            mut invalid_type,
        } = self;
        required.extend(other.required);
        invalid_type.extend(other.invalid_type);
        ValidationReport {
            required,
            invalid_type,
        }
    }
}

impl FromIterator<ValidationReport> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationReport>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ValidationReport::default(), ValidationReport::merge)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self
            .required
            .iter()
            .map(|path| format!("missing required field: {}", path))
            .chain(
                self.invalid_type
                    .iter()
                    .map(|invalid| format!("invalid type at {}", invalid)),
            )
            .peekable();

        while let Some(line) = lines.next() {
            f.write_str(&line)?;
            if lines.peek().is_some() {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a validation call.
///
/// Invalid data is an expected outcome, not an error: callers should surface the
/// report to whoever supplied the data and not send the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    Invalid(ValidationReport),
}

impl Verdict {
    /// `Valid` for an empty report, `Invalid` otherwise.
    pub fn from_report(report: ValidationReport) -> Self {
        if report.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid(report)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(report) => Some(report),
        }
    }

    pub fn into_report(self) -> Option<ValidationReport> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(report) => Some(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;
    use serde_json::json;

    #[test]
    fn empty_categories_are_omitted() {
        let report = ValidationReport::missing("name");
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "required": ["name"] })
        );

        let report = ValidationReport::invalid("objId", DataType::String, &json!(123));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "invalid_type": [
                    { "path": "objId", "expected_type": "string", "actually_value": 123 }
                ]
            })
        );
    }

    #[test]
    fn collect_keeps_order() {
        let report: ValidationReport = vec![
            ValidationReport::missing("a"),
            ValidationReport::default(),
            ValidationReport::invalid("b", ExpectedType::Enum, &json!("X")),
            ValidationReport::missing("c"),
        ]
        .into_iter()
        .collect();

        assert_eq!(report.required, vec!["a", "c"]);
        assert_eq!(report.invalid_type.len(), 1);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn verdict_from_report() {
        assert_eq!(
            Verdict::from_report(ValidationReport::default()),
            Verdict::Valid
        );

        let verdict = Verdict::from_report(ValidationReport::missing("id"));
        assert!(!verdict.is_valid());
        assert_eq!(verdict.report().unwrap().required, vec!["id"]);
    }

    #[test]
    fn display_lists_findings() {
        let report = ValidationReport::missing("parent.name").merge(ValidationReport::invalid(
            "list[1]",
            DataType::Integer,
            &json!(true),
        ));
        assert_eq!(
            report.to_string(),
            "missing required field: parent.name\ninvalid type at list[1]: expected integer, got true"
        );
    }
}
