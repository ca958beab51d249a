use serde::{Deserialize, Deserializer, Serialize};

use super::domain::lenient_option;

/// Free-text justification for an indicator answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEvidence {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// External reference substantiating an indicator answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEvidence {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Uploaded document metadata. Storage is handled outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEvidence {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub file_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

impl FileEvidence {
    /// Declared MIME type, falling back to a guess from the file extension.
    pub fn resolved_type(&self) -> Option<String> {
        self.file_type
            .as_deref()
            .map(str::trim)
            .filter(|declared| !declared.is_empty())
            .map(|declared| declared.to_ascii_lowercase())
            .or_else(|| {
                mime_guess::from_path(self.file_name.trim())
                    .first_raw()
                    .map(str::to_string)
            })
    }
}

/// Up to three kinds of evidence attached to one indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<TextEvidence>,
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Option<LinkEvidence>,
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub file: Option<FileEvidence>,
}

impl EvidenceBundle {
    pub fn text(description: impl Into<String>) -> Self {
        Self {
            text: Some(TextEvidence {
                description: description.into(),
            }),
            ..Self::default()
        }
    }

    pub fn link(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            link: Some(LinkEvidence {
                url: url.into(),
                description: description.into(),
            }),
            ..Self::default()
        }
    }

    pub fn file(file: FileEvidence) -> Self {
        Self {
            file: Some(file),
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => text,
        _ => String::new(),
    })
}

/// A bundle is valid when at least one of its parts carries its discriminating field.
pub fn validate_evidence(bundle: &EvidenceBundle) -> bool {
    let text_ok = bundle
        .text
        .as_ref()
        .is_some_and(|text| !text.description.trim().is_empty());
    let link_ok = bundle
        .link
        .as_ref()
        .is_some_and(|link| is_absolute_url(&link.url));
    let file_ok = bundle
        .file
        .as_ref()
        .is_some_and(|file| !file.file_name.trim().is_empty());

    text_ok || link_ok || file_ok
}

/// Syntactic check for an absolute URL: `scheme:rest`, with a host for network schemes.
pub fn is_absolute_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((scheme, rest)) = candidate.split_once(':') else {
        return false;
    };

    let mut scheme_chars = scheme.chars();
    let scheme_ok = scheme_chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() {
        return false;
    }

    match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" | "ftp" => {
            let Some(authority) = rest.strip_prefix("//") else {
                return false;
            };
            let host = authority
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default()
                .rsplit('@')
                .next()
                .unwrap_or_default();
            let host = match host.rsplit_once(':') {
                Some((name, port))
                    if !host.ends_with(']') && port.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    name
                }
                _ => host,
            };
            !host.is_empty()
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bundle_is_invalid() {
        assert!(!validate_evidence(&EvidenceBundle::default()));
    }

    #[test]
    fn whitespace_only_fields_are_invalid() {
        let bundle = EvidenceBundle {
            text: Some(TextEvidence {
                description: "   ".to_string(),
            }),
            link: Some(LinkEvidence {
                url: " ".to_string(),
                description: "annual report".to_string(),
            }),
            file: Some(FileEvidence {
                file_name: "\t".to_string(),
                ..FileEvidence::default()
            }),
        };
        assert!(!validate_evidence(&bundle));
    }

    #[test]
    fn any_single_valid_part_is_enough() {
        assert!(validate_evidence(&EvidenceBundle::text("x")));
        assert!(validate_evidence(&EvidenceBundle::link(
            "https://example.org/report.pdf",
            ""
        )));
        assert!(validate_evidence(&EvidenceBundle::file(FileEvidence {
            file_name: "strategy.pdf".to_string(),
            ..FileEvidence::default()
        })));
    }

    #[test]
    fn null_and_mistyped_fields_read_as_empty() {
        let bundle: EvidenceBundle = serde_json::from_str(
            r#"{ "text": { "description": null }, "link": { "url": "https://x.org", "description": null } }"#,
        )
        .expect("bundle parses");
        assert_eq!(bundle.text, Some(TextEvidence::default()));
        assert!(validate_evidence(&bundle));

        let bundle: EvidenceBundle = serde_json::from_str(
            r#"{ "text": "see file", "link": { "url": 42 }, "file": { "fileName": null, "fileSize": "big" } }"#,
        )
        .expect("bundle parses");
        assert!(bundle.text.is_none());
        assert_eq!(bundle.link.as_ref().map(|link| link.url.as_str()), Some(""));
        let file = bundle.file.as_ref().expect("file part kept");
        assert_eq!(file.file_size, None);
        assert!(!validate_evidence(&bundle));
    }

    #[test]
    fn url_check_requires_scheme_and_host() {
        assert!(is_absolute_url("https://example.org"));
        assert!(is_absolute_url("http://localhost:8080/path?q=1"));
        assert!(is_absolute_url("mailto:office@example.org"));
        assert!(!is_absolute_url("not-a-url"));
        assert!(!is_absolute_url("example.org/report"));
        assert!(!is_absolute_url("https://"));
        assert!(!is_absolute_url("https:example.org"));
        assert!(!is_absolute_url("https://exa mple.org"));
        assert!(!is_absolute_url("1http://example.org"));
    }

    #[test]
    fn file_type_falls_back_to_extension() {
        let declared = FileEvidence {
            file_name: "scan.bin".to_string(),
            file_type: Some("Application/PDF".to_string()),
            ..FileEvidence::default()
        };
        assert_eq!(declared.resolved_type().as_deref(), Some("application/pdf"));

        let guessed = FileEvidence {
            file_name: "minutes.pdf".to_string(),
            ..FileEvidence::default()
        };
        assert_eq!(guessed.resolved_type().as_deref(), Some("application/pdf"));

        let unknown = FileEvidence {
            file_name: "notes".to_string(),
            ..FileEvidence::default()
        };
        assert!(unknown.resolved_type().is_none());
    }
}
