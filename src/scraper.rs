use crate::extractor::RawRow;
use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads survey pages saved to disk and hands their table rows to the
/// extractor, in page order then document order.
pub struct RowSource {
    row_selector: Selector,
}

impl RowSource {
    pub fn new() -> Self {
        Self {
            row_selector: Selector::parse("tr").unwrap(),
        }
    }

    pub fn scrape_file(&self, file_path: &Path) -> Result<Vec<RawRow>> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let rows = self.parse_rows(&content);
        if rows.is_empty() {
            log::warn!("No table rows found in {}", file_path.display());
        } else {
            log::info!("Found {} rows in {}", rows.len(), file_path.display());
        }

        Ok(rows)
    }

    /// Rows of every `*.html` file in `dir`, files taken in name order.
    pub fn scrape_directory(&self, dir: &Path) -> Result<Vec<RawRow>> {
        let mut pages: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("html") {
                pages.push(path);
            }
        }
        pages.sort();

        if pages.is_empty() {
            log::warn!("No HTML pages found in {}", dir.display());
        }

        let mut rows = Vec::new();
        for page in &pages {
            rows.extend(self.scrape_file(page)?);
        }
        Ok(rows)
    }

    pub fn parse_rows(&self, content: &str) -> Vec<RawRow> {
        let document = Html::parse_document(content);
        document
            .select(&self.row_selector)
            .map(RawRow::from_element)
            .collect()
    }
}

impl Default for RowSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><table>
        <thead><tr><th>School</th><th>Program</th><th>Added On</th><th>Decision</th></tr></thead>
        <tbody>
          <tr>
            <td>Johns Hopkins University</td>
            <td><div><span>Computer Science</span></div></td>
            <td>March 3, 2025</td>
            <td><a href="/result/123456">Accepted on 1 Mar</a></td>
          </tr>
          <tr><td colspan="4">Fall 2025 International GPA 3.80 <p>Thrilled!</p></td></tr>
        </tbody>
    </table></body></html>"#;

    #[test]
    fn parse_rows_keeps_document_order() {
        let rows = RowSource::new().parse_rows(PAGE);

        assert_eq!(rows.len(), 3);
        // header row uses <th>, so no cells
        assert!(rows[0].cells.is_empty());
        assert_eq!(rows[1].cells.len(), 4);
        assert_eq!(rows[1].cells[0].trim(), "Johns Hopkins University");
        assert!(rows[1].html.contains("/result/123456"));
        assert_eq!(rows[2].cells.len(), 1);
        assert!(rows[2].html.contains("<p>Thrilled!</p>"));
    }

    #[test]
    fn page_without_table_has_no_rows() {
        let rows = RowSource::new().parse_rows("<html><body><p>Nothing</p></body></html>");
        assert!(rows.is_empty());
    }

    #[test]
    fn scrape_directory_reads_html_pages_in_name_order() {
        let dir = std::env::temp_dir().join(format!("gradcafe-rows-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("page_2.html"), PAGE.replace("123456", "222")).unwrap();
        fs::write(dir.join("page_1.html"), PAGE.replace("123456", "111")).unwrap();
        fs::write(dir.join("notes.txt"), "<tr><td>ignored</td></tr>").unwrap();

        let rows = RowSource::new().scrape_directory(&dir).unwrap();

        assert_eq!(rows.len(), 6);
        assert!(rows[1].html.contains("/result/111"));
        assert!(rows[4].html.contains("/result/222"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let missing = std::env::temp_dir().join("gradcafe-rows-does-not-exist");
        assert!(RowSource::new().scrape_directory(&missing).is_err());
    }
}
