use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::models::PipelineResult;

/// Machine-readable extraction report: the pipeline result plus run
/// metadata, as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub run_id: String,
    /// RFC 3339, UTC
    pub generated_at: String,
    pub contact_count: usize,
    pub service_count: usize,
    pub messages_kept: usize,
}

impl ExtractionReport {
    pub fn new(result: PipelineResult, run_id: &str) -> Self {
        let metadata = ReportMetadata {
            run_id: run_id.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            contact_count: result.contacts.len(),
            service_count: result.services.len(),
            messages_kept: result.filtered_transcript.len(),
        };
        Self { result, metadata }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable rendering of an extraction report
pub struct HumanReport<'a> {
    report: &'a ExtractionReport,
}

impl<'a> HumanReport<'a> {
    pub fn new(report: &'a ExtractionReport) -> Self {
        Self { report }
    }

    pub fn format(&self) -> String {
        let result = &self.report.result;
        let mut output = String::new();

        output.push_str("=== Meeting Summary ===\n");
        output.push_str(&result.summary.summary);
        output.push('\n');
        if !result.summary.key_topics.is_empty() {
            output.push_str(&format!(
                "Topics: {}\n",
                result.summary.key_topics.join(", ")
            ));
        }

        output.push_str(&format!("\n=== Contacts ({}) ===\n", result.contacts.len()));
        for contact in &result.contacts {
            output.push_str(&format!("- {}", contact.name));
            if !contact.roles.is_empty() {
                let roles: Vec<&str> = contact.roles.iter().map(String::as_str).collect();
                output.push_str(&format!(" [{}]", roles.join(", ")));
            }
            if let Some(email) = &contact.email {
                output.push_str(&format!(" <{}>", email));
            }
            if let Some(phone) = &contact.phone {
                output.push_str(&format!(" ({})", phone));
            }
            output.push('\n');
            for link in &contact.links {
                output.push_str(&format!("    {}\n", link));
            }
        }

        output.push_str(&format!("\n=== Services ({}) ===\n", result.services.len()));
        for service in &result.services {
            output.push_str(&format!(
                "- [{}] {}: {}\n",
                service.kind.as_str().to_uppercase(),
                service.owner_name,
                service.description
            ));
            for link in &service.links {
                output.push_str(&format!("    {}\n", link));
            }
        }

        if result.partial {
            output.push_str("\n[!] Partial result: the run hit its deadline.\n");
        }
        if !result.errors.is_empty() {
            output.push_str(&format!("\n=== Recovered errors ({}) ===\n", result.errors.len()));
            for error in &result.errors {
                output.push_str(&format!("- {}\n", error));
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{
        ContactRecord, MeetingSummary, ServiceKind, ServiceRecord,
    };

    fn sample_report() -> ExtractionReport {
        let result = PipelineResult {
            contacts: vec![ContactRecord {
                name: "Carly".to_string(),
                email: Some("carly@example.com".to_string()),
                phone: None,
                roles: BTreeSet::from(["Gator".to_string()]),
                links: BTreeSet::from(["https://blinq.me/carly".to_string()]),
            }],
            services: vec![ServiceRecord {
                kind: ServiceKind::Offer,
                description: "Off market duplex".to_string(),
                owner_name: "Carly".to_string(),
                links: BTreeSet::from(["https://deals.example.com".to_string()]),
            }],
            profiles: vec![],
            summary: MeetingSummary {
                summary: "Networking call.".to_string(),
                key_topics: vec!["real estate".to_string()],
            },
            filtered_transcript: vec![],
            partial: false,
            errors: vec![],
        };
        ExtractionReport::new(result, "run-1")
    }

    #[test]
    fn test_metadata_counts() {
        let report = sample_report();
        assert_eq!(report.metadata.run_id, "run-1");
        assert_eq!(report.metadata.contact_count, 1);
        assert_eq!(report.metadata.service_count, 1);
    }

    #[test]
    fn test_json_roundtrips_through_disk() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        report.write_json(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["contacts"][0]["name"], "Carly");
        assert_eq!(written["metadata"]["run_id"], "run-1");
    }

    #[test]
    fn test_human_format_sections() {
        let report = sample_report();
        let text = HumanReport::new(&report).format();

        assert!(text.contains("=== Meeting Summary ==="));
        assert!(text.contains("- Carly [Gator] <carly@example.com>"));
        assert!(text.contains("    https://blinq.me/carly"));
        assert!(text.contains("[OFFER] Carly: Off market duplex"));
        assert!(text.contains("https://deals.example.com"));
        assert!(!text.contains("Partial result"));
    }
}
