use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    // Saved survey pages, one *.html file per page
    pub data_directory: Option<String>,
    pub output_file: Option<String>,
    pub csv_output: Option<String>,
    pub summary_term: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.thegradcafe.com".to_string(),
            data_directory: Some("data-source".to_string()),
            output_file: Some("applicant_data.json".to_string()),
            csv_output: None,
            summary_term: Some("Fall 2025".to_string()),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One applicant submission. Every field is optional: a field that was never
/// matched is `None` and is left out of serialized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_origin: Option<String>,
    #[serde(rename = "GPA", default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(rename = "GRE", default, skip_serializing_if = "Option::is_none")]
    pub gre: Option<String>,
    #[serde(rename = "GRE_V", default, skip_serializing_if = "Option::is_none")]
    pub gre_v: Option<String>,
    #[serde(rename = "GRE_AW", default, skip_serializing_if = "Option::is_none")]
    pub gre_aw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ApplicantRecord {
    pub fn is_international(&self) -> bool {
        self.origin_is("international")
    }

    pub fn is_american(&self) -> bool {
        self.origin_is("american")
    }

    pub fn is_accepted(&self) -> bool {
        self.status
            .as_deref()
            .map(|status| status.contains("Accepted"))
            .unwrap_or(false)
    }

    pub fn in_term(&self, term: &str) -> bool {
        self.term
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(term))
            .unwrap_or(false)
    }

    pub fn numeric_gpa(&self) -> Option<f64> {
        parse_score(self.gpa.as_deref())
    }

    pub fn numeric_gre(&self) -> Option<f64> {
        parse_score(self.gre.as_deref())
    }

    pub fn numeric_gre_v(&self) -> Option<f64> {
        parse_score(self.gre_v.as_deref())
    }

    pub fn numeric_gre_aw(&self) -> Option<f64> {
        parse_score(self.gre_aw.as_deref())
    }

    fn origin_is(&self, origin: &str) -> bool {
        self.applicant_origin
            .as_deref()
            .map(|o| o.eq_ignore_ascii_case(origin))
            .unwrap_or(false)
    }
}

fn parse_score(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Extracted records keyed by entry identifier.
pub type ApplicantData = BTreeMap<String, ApplicantRecord>;
