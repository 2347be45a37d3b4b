use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use gradcafe_extractor::models::Config;
use gradcafe_extractor::scraper::RowSource;
use gradcafe_extractor::summary::{ApplicantAnalyzer, Summary};
use gradcafe_extractor::{extract, logger, storage};
use std::path::Path;

fn main() -> Result<()> {
    logger::init();

    let matches = Command::new("gradcafe-extractor")
        .version("0.1")
        .about("Extracts applicant records from saved GradCafe survey pages")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("DIR")
                .help("Directory of saved survey pages (overrides data_directory)"),
        )
        .arg(
            Arg::new("no-summary")
                .long("no-summary")
                .help("Skip the statistics summary")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .context("missing config path")?;

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        log::info!("Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Invalid configuration file: {}", config_file))?
    } else {
        log::info!("Creating default configuration file: {}", config_file);
        Config::default().save_to_file(config_file)?;
        println!("Please review {} and run the program again.", config_file);
        return Ok(());
    };

    let data_dir = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .or(config.data_directory.as_deref())
        .unwrap_or("data-source");
    let output_file = config.output_file.as_deref().unwrap_or("applicant_data.json");

    let rows = RowSource::new().scrape_directory(Path::new(data_dir))?;
    log::info!("Read {} table rows from {}", rows.len(), data_dir);

    let data = extract(&rows, &config.base_url);
    if data.is_empty() {
        log::warn!("No applicant entries extracted from {}", data_dir);
    }

    storage::save_json(&data, Path::new(output_file))?;
    if let Some(csv_path) = &config.csv_output {
        storage::export_csv(&data, Path::new(csv_path))?;
    }

    if !matches.get_flag("no-summary") {
        let term = config.summary_term.as_deref().unwrap_or("Fall 2025");
        print_summary(&ApplicantAnalyzer::new(&data).summarize(term));
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("\nSUMMARY");
    println!("=======\n");
    println!("Entries extracted: {}", summary.total_entries);
    println!("Entries for {}: {}", summary.term, summary.term_entries);
    println!("International applicants: {:.2}%", summary.international_percentage);

    match &summary.international_scores {
        Some(scores) => println!(
            "International {} averages: GPA {:.2}, GRE {:.2}, GRE V {:.2}, GRE AW {:.2}",
            summary.term, scores.gpa, scores.gre, scores.gre_v, scores.gre_aw
        ),
        None => println!("International {} averages: no complete score sets", summary.term),
    }

    println!(
        "Average GPA of American applicants ({}): {}",
        summary.term,
        format_optional(summary.american_average_gpa)
    );
    println!(
        "Average GPA of accepted applicants ({}): {}",
        summary.term,
        format_optional(summary.accepted_average_gpa)
    );
    println!(
        "Accepted in {}: {:.2}% of all entries",
        summary.term, summary.acceptance_percentage
    );
    println!("JHU Computer Science Masters entries: {}", summary.jhu_cs_masters);
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}
