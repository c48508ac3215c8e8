use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

mod analysis;
mod chart;
mod gemini;
mod markdown;
mod models;
mod report;
mod store;

use analysis::Analyzer;
use gemini::GeminiClient;
use markdown::RenderStyle;
use models::{Gender, RecordDraft, ViolationRecord, ALL_VIOLATION_TYPES};
use report::FileSurface;
use store::{seed_records, seed_roster, RecordStore, Roster};

#[derive(Parser)]
#[command(name = "uniform-violation-tracker")]
#[command(about = "Uniform violation tracking and AI analysis for duty teachers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List violation records, optionally filtered by student name or class
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the top-offenders breakdown
    Chart,
    /// Request an AI analysis of the current records
    Analyze {
        /// Also write the rendered HTML fragment to this path
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Run the analysis and compose the printable report
    Report {
        /// Name signed under the report's signature block
        #[arg(long)]
        operator: String,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
    },
    /// Interactive session: add, edit and delete records, manage the roster
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Session state only; nothing is persisted between runs.
    let mut store = RecordStore::with_records(seed_records());
    let mut roster = seed_roster();

    match cli.command {
        Commands::List { search } => {
            print_records(&store.filter(search.as_deref().unwrap_or("")));
        }
        Commands::Chart => {
            print_chart(store.records());
        }
        Commands::Analyze { html } => {
            let analyzer = Analyzer::from_env(GeminiClient::new());
            let text = analyzer.analyze(store.records()).await;
            println!("{text}");
            if let Some(path) = html {
                let fragment = markdown::render(&text, &RenderStyle::modal());
                std::fs::write(&path, fragment)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Rendered analysis written to {}.", path.display());
            }
        }
        Commands::Report { operator, out } => {
            run_report(&operator, &out, store.records()).await;
        }
        Commands::Shell => {
            run_shell(&mut store, &mut roster).await?;
        }
    }

    Ok(())
}

fn print_records(records: &[&ViolationRecord]) {
    if records.is_empty() {
        println!("No matching violation records.");
        return;
    }
    for record in records {
        let violations = record
            .violations
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "[{}] {} | {} ({}, {}) | {}",
            record.id, record.date, record.student_name, record.student_class, record.gender,
            violations
        );
        if let Some(notes) = &record.notes {
            println!("    notes: {notes}");
        }
    }
    println!("{} record(s).", records.len());
}

fn print_chart(records: &[ViolationRecord]) {
    let buckets = chart::chart_buckets(records);
    if buckets.is_empty() {
        println!("No data to chart yet.");
        return;
    }
    let total: usize = buckets.iter().map(|b| b.value).sum();
    println!("Top offenders ({total} violation entries):");
    for bucket in &buckets {
        let percent = bucket.value as f64 * 100.0 / total as f64;
        println!("- {}: {} ({percent:.0}%)", bucket.name, bucket.value);
    }
}

/// Analysis-then-print flow. Configuration errors block the report; the
/// failure strings from the service path are printed like any other outcome.
async fn run_report(operator: &str, out: &Path, records: &[ViolationRecord]) {
    let operator = operator.trim();
    if operator.is_empty() {
        eprintln!("An operator name is required for the report's signature block.");
        return;
    }

    let analyzer = Analyzer::from_env(GeminiClient::new());
    let text = analyzer.analyze(records).await;
    if text.starts_with("Error:") {
        eprintln!("{text}");
        return;
    }

    let mut surface = FileSurface::new(out.to_path_buf());
    if let Err(err) = report::print_report(
        &mut surface,
        &text,
        operator,
        records,
        Local::now().date_naive(),
    ) {
        eprintln!("Report aborted: {err:#}");
    }
}

async fn run_shell(store: &mut RecordStore, roster: &mut Roster) -> anyhow::Result<()> {
    println!("Violation tracking session. State lasts until you quit; type 'help' for commands.");

    loop {
        let line = match read_line("> ")? {
            Some(line) => line,
            None => break,
        };
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => continue,
        };
        let rest = line[command.len()..].trim().to_string();

        match command {
            "help" => print_help(),
            "list" => print_records(&store.filter(&rest)),
            "chart" => print_chart(store.records()),
            "add" => match read_draft(roster)? {
                Some(draft) => {
                    let record = store.add(draft);
                    println!(
                        "Recorded violation {} for {}.",
                        record.id, record.student_name
                    );
                }
                None => println!("Cancelled."),
            },
            "edit" => {
                if rest.is_empty() {
                    println!("Usage: edit <id>");
                    continue;
                }
                if store.find(&rest).is_none() {
                    println!("No record with id {rest}.");
                    continue;
                }
                match read_draft(roster)? {
                    Some(draft) => {
                        store.edit(&rest, draft);
                        println!("Record {rest} updated.");
                    }
                    None => println!("Cancelled."),
                }
            }
            "delete" => {
                if rest.is_empty() {
                    println!("Usage: delete <id>");
                    continue;
                }
                let confirm = read_line(&format!("Delete record {rest}? [y/N] "))?;
                if matches!(confirm.as_deref(), Some("y") | Some("Y") | Some("yes")) {
                    if store.delete(&rest) {
                        println!("Record {rest} deleted. {} record(s) remain.", store.len());
                    } else {
                        println!("No record with id {rest}.");
                    }
                }
            }
            "roster" => print_roster(roster),
            "student" => handle_student(roster, &rest)?,
            "analyze" => {
                println!("Analyzing data, please wait...");
                let analyzer = Analyzer::from_env(GeminiClient::new());
                let text = analyzer.analyze(store.records()).await;
                println!("{text}");
            }
            "report" => {
                let operator = read_line("Operator name for the report: ")?.unwrap_or_default();
                let out = read_line("Output path [report.html]: ")?
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| "report.html".to_string());
                run_report(&operator, Path::new(&out), store.records()).await;
            }
            "quit" | "exit" => break,
            _ => println!("Unknown command '{command}'. Type 'help' for the command list."),
        }
    }

    println!("Session over; in-memory data discarded.");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  list [term]        records filtered by student name or class, newest first");
    println!("  add                log a new violation record");
    println!("  edit <id>          replace a record's fields");
    println!("  delete <id>        delete a record (asks for confirmation)");
    println!("  chart              top-offenders breakdown");
    println!("  roster             classes and enrolled students");
    println!("  student add|del    manage the roster");
    println!("  analyze            request the AI narrative analysis");
    println!("  report             analyze and compose the printable report");
    println!("  quit               end the session");
}

fn print_roster(roster: &Roster) {
    let classes: Vec<&str> = roster.classes().collect();
    if classes.is_empty() {
        println!("The roster is empty.");
        return;
    }
    for class in classes {
        println!("{class}:");
        if let Some(students) = roster.students(class) {
            for student in students {
                println!("  - {} ({})", student.name, student.gender);
            }
        }
    }
}

fn handle_student(roster: &mut Roster, action: &str) -> anyhow::Result<()> {
    match action {
        "add" => {
            let Some(class) = read_required("Class: ")? else {
                return Ok(());
            };
            let Some(name) = read_required("Student name: ")? else {
                return Ok(());
            };
            let Some(gender) = read_gender()? else {
                println!("Cancelled.");
                return Ok(());
            };
            let before = roster.students(&class).map_or(0, |s| s.len());
            roster.add_student(&class, &name, gender);
            let after = roster.students(&class).map_or(0, |s| s.len());
            if after > before {
                println!("Added {name} to {class}.");
            } else {
                println!("{name} is already enrolled in {class}.");
            }
        }
        "del" => {
            let Some(class) = read_required("Class: ")? else {
                return Ok(());
            };
            let Some(name) = read_required("Student name: ")? else {
                return Ok(());
            };
            roster.delete_student(&class, &name);
            println!("Removed {name} from {class} (if enrolled).");
        }
        _ => println!("Usage: student add | student del"),
    }
    Ok(())
}

/// Interactive form shared by add and edit. Enforces the form-boundary
/// rules: the student must be on the roster (gender comes from there), the
/// date must parse, and at least one violation type must be picked. Returns
/// None when the operator backs out or input is invalid.
fn read_draft(roster: &Roster) -> anyhow::Result<Option<RecordDraft>> {
    let Some(class) = read_required("Class: ")? else {
        return Ok(None);
    };
    let Some(name) = read_required("Student name: ")? else {
        return Ok(None);
    };
    let Some(gender) = roster.gender_of(&class, &name) else {
        println!("{name} is not on the roster for {class}; add them first with 'student add'.");
        return Ok(None);
    };

    let date_input = read_line("Date (YYYY-MM-DD, empty for today): ")?.unwrap_or_default();
    let date = if date_input.is_empty() {
        Local::now().date_naive()
    } else {
        match NaiveDate::parse_from_str(&date_input, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                println!("Unrecognized date '{date_input}'.");
                return Ok(None);
            }
        }
    };

    println!("Violation types:");
    for violation in ALL_VIOLATION_TYPES {
        println!("  {}. {}", violation.code(), violation.label());
    }
    let picks = read_line("Numbers, comma separated: ")?.unwrap_or_default();
    let mut violations = Vec::new();
    for token in picks.split([',', ' ']).filter(|t| !t.is_empty()) {
        let parsed = token
            .parse::<usize>()
            .ok()
            .and_then(models::ViolationType::from_code);
        let Some(violation) = parsed else {
            println!("Unknown violation code '{token}'.");
            return Ok(None);
        };
        if !violations.contains(&violation) {
            violations.push(violation);
        }
    }
    if violations.is_empty() {
        println!("At least one violation type is required.");
        return Ok(None);
    }

    let notes = read_line("Notes (optional): ")?.filter(|n| !n.is_empty());

    Ok(Some(RecordDraft {
        student_name: name,
        student_class: class,
        gender,
        date,
        violations,
        notes,
    }))
}

fn read_gender() -> anyhow::Result<Option<Gender>> {
    let input = read_line("Gender (m/f): ")?.unwrap_or_default();
    Ok(match input.to_lowercase().as_str() {
        "m" | "male" => Some(Gender::Male),
        "f" | "female" => Some(Gender::Female),
        _ => None,
    })
}

fn read_required(prompt: &str) -> anyhow::Result<Option<String>> {
    let value = read_line(prompt)?.unwrap_or_default();
    if value.is_empty() {
        println!("A value is required.");
        return Ok(None);
    }
    Ok(Some(value))
}

/// Prompts and reads one trimmed line; None on end of input.
fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin()
        .read_line(&mut line)
        .context("failed reading from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
