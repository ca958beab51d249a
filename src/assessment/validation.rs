use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::IndicatorLookup;
use super::domain::{FormData, IndicatorId, PillarId};
use super::evidence::{validate_evidence, FileEvidence};
use super::scoring::is_evidence_required;

const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
];

/// Rejections raised before a submission is scored and recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionViolation {
    #[error("submission does not answer any indicator")]
    EmptySubmission,
    #[error("{} indicator(s) have missing or invalid evidence", issues.len())]
    Evidence { issues: Vec<EvidenceIssue> },
}

impl SubmissionViolation {
    pub fn issues(&self) -> &[EvidenceIssue] {
        match self {
            SubmissionViolation::EmptySubmission => &[],
            SubmissionViolation::Evidence { issues } => issues,
        }
    }
}

/// A single indicator whose evidence cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceIssue {
    pub pillar: PillarId,
    pub indicator: IndicatorId,
    pub problem: EvidenceProblem,
}

impl fmt::Display for EvidenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "indicator {}: {}", self.indicator, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceProblem {
    /// The answer claims something that must be substantiated, but nothing valid is attached.
    Missing,
    FileTooLarge { size: u64, limit: u64 },
    UnsupportedFileType { file_type: String },
}

impl fmt::Display for EvidenceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceProblem::Missing => f.write_str("evidence is required for this answer"),
            EvidenceProblem::FileTooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit}")
            }
            EvidenceProblem::UnsupportedFileType { file_type } => {
                write!(f, "file type '{file_type}' is not accepted")
            }
        }
    }
}

/// Upload limits applied to file evidence.
#[derive(Debug, Clone)]
pub struct EvidencePolicyLimits {
    max_file_bytes: u64,
}

impl EvidencePolicyLimits {
    pub fn new(max_file_bytes: u64) -> Self {
        let sanitized = if max_file_bytes > 0 {
            max_file_bytes
        } else {
            DEFAULT_MAX_FILE_BYTES
        };
        Self {
            max_file_bytes: sanitized,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn accepts_type(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        mime.starts_with("image/") || ACCEPTED_MIME_TYPES.contains(&mime.as_str())
    }

    fn check_file(&self, file: &FileEvidence) -> Option<EvidenceProblem> {
        if let Some(size) = file.file_size.filter(|size| *size > self.max_file_bytes) {
            return Some(EvidenceProblem::FileTooLarge {
                size,
                limit: self.max_file_bytes,
            });
        }

        match file.resolved_type() {
            Some(file_type) if !self.accepts_type(&file_type) => {
                Some(EvidenceProblem::UnsupportedFileType { file_type })
            }
            None => Some(EvidenceProblem::UnsupportedFileType {
                file_type: "unknown".to_string(),
            }),
            Some(_) => None,
        }
    }
}

impl Default for EvidencePolicyLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

/// Combines per-indicator evidence requirements with evidence validity checks.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    limits: EvidencePolicyLimits,
}

impl SubmissionGuard {
    pub fn with_limits(limits: EvidencePolicyLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &EvidencePolicyLimits {
        &self.limits
    }

    /// Accept the form for scoring, or list every indicator that blocks it.
    pub fn review(
        &self,
        lookup: &dyn IndicatorLookup,
        form: &FormData,
    ) -> Result<(), SubmissionViolation> {
        if form.answered_count() == 0 {
            return Err(SubmissionViolation::EmptySubmission);
        }

        let mut issues = Vec::new();
        for (pillar, indicator, response) in form.responses() {
            let value = response.answered_value();

            if let Some(file) = response.evidence.as_ref().and_then(|bundle| bundle.file.as_ref()) {
                if !file.file_name.trim().is_empty() {
                    if let Some(problem) = self.limits.check_file(file) {
                        issues.push(EvidenceIssue {
                            pillar,
                            indicator: indicator.clone(),
                            problem,
                        });
                        continue;
                    }
                }
            }

            let substantiated = response.evidence.as_ref().is_some_and(validate_evidence);
            if is_evidence_required(lookup, indicator, value) && !substantiated {
                issues.push(EvidenceIssue {
                    pillar,
                    indicator: indicator.clone(),
                    problem: EvidenceProblem::Missing,
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SubmissionViolation::Evidence { issues })
        }
    }
}
