use crate::models::{ApplicantData, ApplicantRecord};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::borrow::Cow;

/// Separator between the program name and the degree inside the program cell.
const PROGRAM_SEPARATOR: &str = "\n\n\n\n";

/// Elements that separate words when a comment is reduced to text.
const BREAKING_TAGS: [&str; 5] = ["br", "p", "div", "li", "tr"];

lazy_static! {
    static ref CELL_SELECTOR: Selector = Selector::parse("td").unwrap();
    static ref ENTRY_LINK: Regex = Regex::new(r"/result/(\d+)").unwrap();
    static ref DIGIT: Regex = Regex::new(r"\d").unwrap();

    static ref QUOTED_WORD: Regex = Regex::new(r#"/"(.*?)"/"#).unwrap();
    static ref LINE_BREAK: Regex = Regex::new(r"\s*\r?\n\s*").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();

    static ref DETAIL_PATTERNS: Vec<DetailPattern> = vec![
        DetailPattern::new(DetailField::Term, r"(?i)\b(Fall\s+\d{4}|Spring\s+\d{4})\b", verbatim),
        DetailPattern::new(DetailField::Origin, r"(?i)\b(international|american)\b", verbatim),
        DetailPattern::new(DetailField::Gpa, r"(?i)\bGPA\s+(\d\.\d{1,2})", verbatim),
        DetailPattern::new(DetailField::Gre, r"(?i)\bGRE\s+(\d+)", verbatim),
        DetailPattern::new(DetailField::GreV, r"(?i)\bGRE\s+V\s+(\d+)", verbatim),
        DetailPattern::new(DetailField::GreAw, r"(?i)\bGRE\s+AW\s+(\d+)", verbatim),
        DetailPattern::new(DetailField::Comment, r"(?is)<p[^>]*>(.*?)</p>", clean_comment),
    ];
}

/// A table row as handed over by the row source: the text of each cell and
/// the raw HTML of the whole row.
pub trait TableRow {
    fn cells(&self) -> Vec<String>;
    fn raw(&self) -> Cow<'_, str>;
}

impl<T: TableRow + ?Sized> TableRow for &T {
    fn cells(&self) -> Vec<String> {
        (**self).cells()
    }

    fn raw(&self) -> Cow<'_, str> {
        (**self).raw()
    }
}

impl TableRow for ElementRef<'_> {
    fn cells(&self) -> Vec<String> {
        self.select(&CELL_SELECTOR)
            .map(|cell| cell.text().collect::<String>())
            .collect()
    }

    fn raw(&self) -> Cow<'_, str> {
        Cow::Owned(self.html())
    }
}

/// Owned snapshot of a `<tr>`, detached from the parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
    pub html: String,
}

impl RawRow {
    pub fn new(cells: Vec<String>, html: impl Into<String>) -> Self {
        Self {
            cells,
            html: html.into(),
        }
    }

    pub fn from_element(row: ElementRef<'_>) -> Self {
        Self {
            cells: row.cells(),
            html: row.html(),
        }
    }
}

impl TableRow for RawRow {
    fn cells(&self) -> Vec<String> {
        self.cells.clone()
    }

    fn raw(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.html)
    }
}

#[derive(Debug, Clone, Copy)]
enum DetailField {
    Term,
    Origin,
    Gpa,
    Gre,
    GreV,
    GreAw,
    Comment,
}

impl DetailField {
    fn slot(self, record: &mut ApplicantRecord) -> &mut Option<String> {
        match self {
            DetailField::Term => &mut record.term,
            DetailField::Origin => &mut record.applicant_origin,
            DetailField::Gpa => &mut record.gpa,
            DetailField::Gre => &mut record.gre,
            DetailField::GreV => &mut record.gre_v,
            DetailField::GreAw => &mut record.gre_aw,
            DetailField::Comment => &mut record.comment,
        }
    }
}

struct DetailPattern {
    field: DetailField,
    regex: Regex,
    transform: fn(&str) -> String,
}

impl DetailPattern {
    fn new(field: DetailField, pattern: &str, transform: fn(&str) -> String) -> Self {
        Self {
            field,
            regex: Regex::new(pattern).unwrap(),
            transform,
        }
    }
}

fn verbatim(value: &str) -> String {
    value.to_string()
}

fn clean_comment(value: &str) -> String {
    clean_html(&unescape_html(value))
}

/// Decode entities and drop nested markup, leaving a space where a line
/// break or block element stood.
fn unescape_html(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let mut out = String::new();
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if BREAKING_TAGS.contains(&element.name()) => out.push(' '),
            _ => {}
        }
    }
    out
}

/// Flatten multi-line HTML text into a single tidy line.
pub fn clean_html(text: &str) -> String {
    let text = QUOTED_WORD.replace_all(text, "'$1'");
    let text = LINE_BREAK.replace_all(&text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

pub fn contains_digit(text: &str) -> bool {
    DIGIT.is_match(text)
}

/// Digits of the first `/result/<digits>` link in `raw`, if any.
pub fn entry_identifier(raw: &str) -> Option<String> {
    ENTRY_LINK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Merge every detail pattern that matches `text` into `record`. Fields with
/// no match this time are left as they were.
pub fn apply_details(record: &mut ApplicantRecord, text: &str) {
    for pattern in DETAIL_PATTERNS.iter() {
        if let Some(value) = pattern.regex.captures(text).and_then(|caps| caps.get(1)) {
            *pattern.field.slot(record) = Some((pattern.transform)(value.as_str()));
        }
    }
}

#[derive(Debug, Default)]
struct ExtractionState {
    active: Option<String>,
    records: ApplicantData,
}

impl ExtractionState {
    fn ingest<R: TableRow + ?Sized>(mut self, row: &R, base_url: &str) -> Self {
        let raw = row.raw();
        if let Some(identifier) = entry_identifier(&raw) {
            self.active = Some(identifier);
        }

        let cells = row.cells();
        match cells.len() {
            n if n >= 4 => self.ingest_primary(&cells, base_url),
            1 => self.ingest_detail(&raw),
            _ => {}
        }
        self
    }

    fn ingest_primary(&mut self, cells: &[String], base_url: &str) {
        let university = cells[0].trim();
        if contains_digit(university) {
            self.active = None;
            return;
        }

        let Some(identifier) = self.active.clone() else {
            return;
        };

        let mut program_parts = cells[1].trim().split(PROGRAM_SEPARATOR);
        let program = program_parts.next().unwrap_or_default().to_string();
        let degree = program_parts.next().map(str::to_string);

        let record = ApplicantRecord {
            university: Some(university.to_string()),
            program: Some(program),
            degree,
            publish_date: Some(cells[2].trim().to_string()),
            url: Some(format!("{}/result/{}", base_url, identifier)),
            status: Some(cells[3].trim().to_string()),
            ..Default::default()
        };

        self.records.insert(identifier, record);
    }

    fn ingest_detail(&mut self, raw: &str) {
        let Some(identifier) = self.active.as_deref() else {
            return;
        };
        if let Some(record) = self.records.get_mut(identifier) {
            apply_details(record, raw);
        }
    }
}

/// Turn an ordered sequence of survey table rows into applicant records keyed
/// by entry identifier.
///
/// Each entry spans a primary row (four or more cells) and an optional
/// single-cell detail row. The most recent `/result/<digits>` link decides
/// which entry a row belongs to. Malformed rows are skipped, never reported.
pub fn extract<I>(rows: I, base_url: &str) -> ApplicantData
where
    I: IntoIterator,
    I::Item: TableRow,
{
    rows.into_iter()
        .fold(ExtractionState::default(), |state, row| {
            state.ingest(&row, base_url)
        })
        .records
}
