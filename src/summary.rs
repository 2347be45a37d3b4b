use crate::models::{ApplicantData, ApplicantRecord};
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreAverages {
    pub gpa: f64,
    pub gre: f64,
    pub gre_v: f64,
    pub gre_aw: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub term: String,
    pub total_entries: usize,
    pub term_entries: usize,
    pub international_percentage: f64,
    pub international_scores: Option<ScoreAverages>,
    pub american_average_gpa: Option<f64>,
    pub accepted_average_gpa: Option<f64>,
    pub acceptance_percentage: f64,
    pub jhu_cs_masters: usize,
}

pub struct ApplicantAnalyzer<'a> {
    data: &'a ApplicantData,
}

impl<'a> ApplicantAnalyzer<'a> {
    pub fn new(data: &'a ApplicantData) -> Self {
        Self { data }
    }

    pub fn summarize(&self, term: &str) -> Summary {
        Summary {
            term: term.to_string(),
            total_entries: self.data.len(),
            term_entries: self.count_term(term),
            international_percentage: self.international_percentage(),
            international_scores: self.average_scores_international(term),
            american_average_gpa: self.average_gpa_american(term),
            accepted_average_gpa: self.average_gpa_accepted(term),
            acceptance_percentage: self.acceptance_percentage(term),
            jhu_cs_masters: self.count_program(
                &["johns hopkins", "jhu"],
                &["computer science", "cs"],
                "Masters",
            ),
        }
    }

    pub fn count_term(&self, term: &str) -> usize {
        self.records().filter(|r| r.in_term(term)).count()
    }

    pub fn international_percentage(&self) -> f64 {
        self.percentage_of_all(|r| r.is_international())
    }

    pub fn acceptance_percentage(&self, term: &str) -> f64 {
        self.percentage_of_all(|r| r.is_accepted() && r.in_term(term))
    }

    /// Averages over international applicants in `term` whose four scores all
    /// fall in their valid ranges.
    pub fn average_scores_international(&self, term: &str) -> Option<ScoreAverages> {
        let scores: Vec<(f64, f64, f64, f64)> = self
            .records()
            .filter(|r| r.is_international() && r.in_term(term))
            .filter_map(|r| {
                let gpa = r.numeric_gpa().filter(|v| valid_gpa(*v))?;
                let gre = r.numeric_gre().filter(|v| (260.0..=340.0).contains(v))?;
                let gre_v = r.numeric_gre_v().filter(|v| (130.0..=170.0).contains(v))?;
                let gre_aw = r.numeric_gre_aw().filter(|v| valid_gre_aw(*v))?;
                Some((gpa, gre, gre_v, gre_aw))
            })
            .collect();

        if scores.is_empty() {
            return None;
        }

        let count = scores.len() as f64;
        let sum = scores.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, s| {
            (acc.0 + s.0, acc.1 + s.1, acc.2 + s.2, acc.3 + s.3)
        });

        Some(ScoreAverages {
            gpa: round2(sum.0 / count),
            gre: round2(sum.1 / count),
            gre_v: round2(sum.2 / count),
            gre_aw: round2(sum.3 / count),
        })
    }

    pub fn average_gpa_american(&self, term: &str) -> Option<f64> {
        self.average_gpa(|r| r.is_american() && r.in_term(term))
    }

    pub fn average_gpa_accepted(&self, term: &str) -> Option<f64> {
        self.average_gpa(|r| r.is_accepted() && r.in_term(term))
    }

    /// Entries whose university or program mentions one of `universities`,
    /// whose program mentions one of `programs`, and whose degree is exactly
    /// `degree`. Keywords match whole words, ignoring case.
    pub fn count_program(&self, universities: &[&str], programs: &[&str], degree: &str) -> usize {
        let (Some(university_words), Some(program_words)) =
            (keyword_matcher(universities), keyword_matcher(programs))
        else {
            return 0;
        };

        self.records()
            .filter(|r| {
                let school = r.university.as_deref().unwrap_or_default();
                let course = r.program.as_deref().unwrap_or_default();
                (university_words.is_match(school) || university_words.is_match(course))
                    && program_words.is_match(course)
                    && r.degree.as_deref() == Some(degree)
            })
            .count()
    }

    fn records(&self) -> impl Iterator<Item = &'a ApplicantRecord> {
        self.data.values()
    }

    fn percentage_of_all(&self, predicate: impl Fn(&ApplicantRecord) -> bool) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let matching = self.records().filter(|r| predicate(*r)).count();
        round2(100.0 * matching as f64 / self.data.len() as f64)
    }

    fn average_gpa(&self, predicate: impl Fn(&ApplicantRecord) -> bool) -> Option<f64> {
        let gpas: Vec<f64> = self
            .records()
            .filter(|r| predicate(*r))
            .filter_map(|r| r.numeric_gpa())
            .filter(|gpa| valid_gpa(*gpa))
            .collect();

        if gpas.is_empty() {
            None
        } else {
            Some(round2(gpas.iter().sum::<f64>() / gpas.len() as f64))
        }
    }
}

fn keyword_matcher(keywords: &[&str]) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}

fn valid_gpa(gpa: f64) -> bool {
    (0.0..=4.0).contains(&gpa)
}

// Analytical writing is scored in half-point steps
fn valid_gre_aw(score: f64) -> bool {
    (0.0..=6.0).contains(&score) && ((score * 10.0).round() as i64) % 5 == 0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(origin: &str, term: &str, status: &str, gpa: &str) -> ApplicantRecord {
        ApplicantRecord {
            applicant_origin: Some(origin.to_string()),
            term: Some(term.to_string()),
            status: Some(status.to_string()),
            gpa: Some(gpa.to_string()),
            ..Default::default()
        }
    }

    fn sample() -> ApplicantData {
        let mut data = ApplicantData::new();
        let mut intl = record("International", "Fall 2025", "Accepted on 2 Feb", "3.60");
        intl.gre = Some("320".to_string());
        intl.gre_v = Some("160".to_string());
        intl.gre_aw = Some("4".to_string());
        data.insert("1".to_string(), intl);

        let mut intl_bad_gre = record("international", "Fall 2025", "Rejected", "3.90");
        intl_bad_gre.gre = Some("900".to_string());
        intl_bad_gre.gre_v = Some("160".to_string());
        intl_bad_gre.gre_aw = Some("4".to_string());
        data.insert("2".to_string(), intl_bad_gre);

        data.insert("3".to_string(), record("American", "Fall 2025", "Accepted", "3.20"));
        data.insert("4".to_string(), record("American", "Fall 2025", "Rejected", "9.50"));
        data.insert("5".to_string(), record("American", "Spring 2025", "Accepted", "4.00"));
        data
    }

    #[test]
    fn counts_and_percentages() {
        let data = sample();
        let analyzer = ApplicantAnalyzer::new(&data);

        assert_eq!(analyzer.count_term("Fall 2025"), 4);
        assert_eq!(analyzer.international_percentage(), 40.0);
        assert_eq!(analyzer.acceptance_percentage("Fall 2025"), 40.0);
    }

    #[test]
    fn international_scores_skip_out_of_range_entries() {
        let data = sample();
        let averages = ApplicantAnalyzer::new(&data)
            .average_scores_international("Fall 2025")
            .unwrap();

        assert_eq!(
            averages,
            ScoreAverages {
                gpa: 3.6,
                gre: 320.0,
                gre_v: 160.0,
                gre_aw: 4.0,
            }
        );
    }

    #[test]
    fn gpa_averages_ignore_invalid_values() {
        let data = sample();
        let analyzer = ApplicantAnalyzer::new(&data);

        assert_eq!(analyzer.average_gpa_american("Fall 2025"), Some(3.2));
        assert_eq!(analyzer.average_gpa_accepted("Fall 2025"), Some(3.4));
        assert_eq!(analyzer.average_gpa_american("Fall 2030"), None);
    }

    #[test]
    fn empty_data_yields_zero_percentages() {
        let data = ApplicantData::new();
        let summary = ApplicantAnalyzer::new(&data).summarize("Fall 2025");

        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.international_percentage, 0.0);
        assert!(summary.international_scores.is_none());
    }

    #[test]
    fn program_count_matches_keywords_and_degree() {
        let mut data = ApplicantData::new();
        for (id, university, program, degree) in [
            ("1", "Johns Hopkins University", "Computer Science", Some("Masters")),
            ("2", "Johns Hopkins University", "Computer Science", Some("PhD")),
            ("3", "Stanford University", "Computer Science", Some("Masters")),
            ("4", "JHU", "computer science", Some("Masters")),
            ("5", "Johns Hopkins University (JHU)", "Computer Science", Some("Masters")),
            ("6", "JHU", "JHU CS", Some("Masters")),
            ("7", "Johns Hopkins University", "Physics", Some("Masters")),
        ] {
            data.insert(
                id.to_string(),
                ApplicantRecord {
                    university: Some(university.to_string()),
                    program: Some(program.to_string()),
                    degree: degree.map(str::to_string),
                    ..Default::default()
                },
            );
        }
        let analyzer = ApplicantAnalyzer::new(&data);

        assert_eq!(
            analyzer.count_program(&["johns hopkins"], &["computer science"], "Masters"),
            2
        );
        assert_eq!(analyzer.count_program(&["jhu"], &["cs"], "Masters"), 1);
        assert_eq!(analyzer.count_program(&[], &["cs"], "Masters"), 0);
        assert_eq!(analyzer.summarize("Fall 2025").jhu_cs_masters, 4);
    }
}
