use crate::models::ApplicantData;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs;
use std::path::Path;

const CSV_HEADERS: [&str; 14] = [
    "entry",
    "university",
    "program",
    "degree",
    "publish_date",
    "url",
    "status",
    "term",
    "applicant_origin",
    "GPA",
    "GRE",
    "GRE_V",
    "GRE_AW",
    "comment",
];

pub fn save_json(data: &ApplicantData, file_path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(data)?;
    fs::write(file_path, content)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;
    log::info!("{} entries were saved to {}", data.len(), file_path.display());
    Ok(())
}

pub fn load_json(file_path: &Path) -> Result<ApplicantData> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let data = serde_json::from_str(&content)
        .with_context(|| format!("Invalid applicant data in {}", file_path.display()))?;
    Ok(data)
}

pub fn export_csv(data: &ApplicantData, file_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;

    writer.write_record(CSV_HEADERS)?;

    for (entry, record) in data {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        writer.write_record([
            entry.clone(),
            field(&record.university),
            field(&record.program),
            field(&record.degree),
            field(&record.publish_date),
            field(&record.url),
            field(&record.status),
            field(&record.term),
            field(&record.applicant_origin),
            field(&record.gpa),
            field(&record.gre),
            field(&record.gre_v),
            field(&record.gre_aw),
            field(&record.comment),
        ])?;
    }

    writer.flush()?;
    log::info!("{} entries were exported to {}", data.len(), file_path.display());
    Ok(())
}
