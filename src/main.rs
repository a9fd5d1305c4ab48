mod batch;
mod document;
mod output;
mod parser;
mod record;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use document::Form;
use parser::labels;

#[derive(Parser)]
#[command(
    name = "questionnaire_scraper",
    about = "Extract film submission questionnaires (HTML) into JSON and CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every questionnaire in a folder
    Extract {
        /// Folder holding the .html questionnaires
        #[arg(short, long, env = "QS_INPUT_DIR", default_value = "questionare")]
        input: PathBuf,
        /// Folder the artifacts are written to
        #[arg(short, long, env = "QS_OUTPUT_DIR", default_value = "extracted_data")]
        output: PathBuf,
        /// Skip the flattened CSV table
        #[arg(long)]
        no_csv: bool,
    },
    /// Extract one questionnaire and print its record
    Show { file: PathBuf },
    /// List every form control with its resolved label
    Inspect { file: PathBuf },
    /// Compact table of a folder's questionnaires
    Overview {
        #[arg(short, long, env = "QS_INPUT_DIR", default_value = "questionare")]
        input: PathBuf,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            no_csv,
        } => {
            let paths = batch::list_documents(&input)?;
            if paths.is_empty() {
                println!("No questionnaires in {}.", input.display());
            } else {
                println!("Extracting {} questionnaires...", paths.len());
            }
            let report = batch::run(&paths)?;
            let written = output::write_artifacts(&output, &report.records, !no_csv)?;
            report.print();
            for path in written {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Show { file } => {
            let record = batch::extract_document(&file)?;
            output::print_record(&record)
        }
        Commands::Inspect { file } => {
            let form = Form::load(&file)?;
            let controls = labels::describe_controls(&form);
            if controls.is_empty() {
                println!("No form controls in {}.", file.display());
                return Ok(());
            }

            println!(
                "{:>3} | {:<8} | {:<28} | {:<24} | {:<30}",
                "#", "Control", "Label", "Section", "Value"
            );
            println!("{}", "-".repeat(105));
            for (i, c) in controls.iter().enumerate() {
                println!(
                    "{:>3} | {:<8} | {:<28} | {:<24} | {:<30}",
                    i + 1,
                    c.tag,
                    truncate(&c.label, 28),
                    truncate(&c.section, 24),
                    truncate(&c.value.replace('\n', " / "), 30),
                );
            }
            println!("\n{} controls", controls.len());
            Ok(())
        }
        Commands::Overview { input, limit } => {
            let paths = batch::list_documents(&input)
                .with_context(|| "overview needs an input folder")?;
            let report = batch::run(&paths)?;
            if report.records.is_empty() {
                println!("No questionnaires extracted.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<24} | {:<28} | {:<16} | {:<24} | {:>4} | {:>5}",
                "#", "Source", "Title", "Country", "Genres", "Cast", "Fill"
            );
            println!("{}", "-".repeat(120));

            for (i, r) in report.records.iter().take(limit).enumerate() {
                let cast = r
                    .lookup("Crew.Cast")
                    .and_then(|v| v.as_array())
                    .map_or(0, Vec::len);
                println!(
                    "{:>3} | {:<24} | {:<28} | {:<16} | {:<24} | {:>4} | {:>4.0}%",
                    i + 1,
                    truncate(r.source().unwrap_or("-"), 24),
                    truncate(&r.text_or_sentinel("Film.Title_English"), 28),
                    truncate(&r.text_or_sentinel("Film.Country_of_production"), 16),
                    truncate(&r.text_or_sentinel("Film.Genre_List"), 24),
                    cast,
                    r.fill().percent(),
                );
            }

            if !report.failures.is_empty() {
                println!("\n--- Skipped ---");
                for f in &report.failures {
                    println!("  {}: {}", f.path.display(), f.reason);
                }
            }

            println!(
                "\n{} of {} questionnaires shown",
                report.records.len().min(limit),
                report.total
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_width() {
        assert_eq!(truncate("Summer", 10), "Summer");
        assert_eq!(truncate("Summer in the City", 10), "Summer ...");
        assert_eq!(truncate("Ljeto u gradu", 8).chars().count(), 8);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["questionnaire_scraper", "extract", "--no-csv"]).unwrap();
        match cli.command {
            Commands::Extract { no_csv, .. } => assert!(no_csv),
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(std::time::Duration::from_secs(125)), "2m 5s");
    }
}
