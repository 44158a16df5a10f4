//! OperationOutcome resource

use crate::common::*;
use crate::element::fhir_element;

fhir_element! {
    /// Information about the success/failure of an action
    domain_resource OperationOutcome {
        /// A single issue associated with the action
        issue: Vec<OperationOutcomeIssue> = "issue",
    }
}

fhir_element! {
    backbone OperationOutcomeIssue("OperationOutcome.issue") {
        /// fatal | error | warning | information
        severity: Primitive<Code> = "severity",
        /// Error or warning code
        code: Primitive<Code> = "code",
        /// Additional details about the error
        details: Option<Box<CodeableConcept>> = "details",
        diagnostics: Primitive<FhirString> = "diagnostics",
        location: Vec<Primitive<FhirString>> = "location",
        /// FHIRPath of element(s) related to issue
        expression: Vec<Primitive<FhirString>> = "expression",
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl IssueSeverity {
    pub fn as_code(&self) -> &'static str {
        match self {
            IssueSeverity::Fatal => "fatal",
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Information => "information",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "fatal" => Some(IssueSeverity::Fatal),
            "error" => Some(IssueSeverity::Error),
            "warning" => Some(IssueSeverity::Warning),
            "information" => Some(IssueSeverity::Information),
            _ => None,
        }
    }
}

impl OperationOutcomeIssue {
    pub fn new(severity: IssueSeverity, code: &str, diagnostics: &str) -> Result<Self> {
        Ok(Self {
            severity: Primitive::new(Code::new(severity.as_code())?),
            code: Primitive::new(Code::new(code)?),
            diagnostics: Primitive::new(FhirString::new(diagnostics)?),
            ..Default::default()
        })
    }

    pub fn severity(&self) -> Option<IssueSeverity> {
        IssueSeverity::from_code(self.severity.value()?.as_str())
    }
}

impl OperationOutcome {
    /// Whether any issue is an error or fatal.
    pub fn has_errors(&self) -> bool {
        self.issue.iter().any(|issue| {
            matches!(
                issue.severity(),
                Some(IssueSeverity::Error | IssueSeverity::Fatal)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reports_errors() {
        let mut outcome = OperationOutcome::default();
        assert!(!outcome.has_errors());
        outcome.issue.push(
            OperationOutcomeIssue::new(IssueSeverity::Warning, "informational", "heads up")
                .unwrap(),
        );
        assert!(!outcome.has_errors());
        outcome.issue.push(
            OperationOutcomeIssue::new(IssueSeverity::Error, "structure", "unknown field")
                .unwrap(),
        );
        assert!(outcome.has_errors());
    }

    #[test]
    fn diagnostics_must_not_be_empty() {
        assert!(OperationOutcomeIssue::new(IssueSeverity::Error, "invalid", "").is_err());
    }
}
