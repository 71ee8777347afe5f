mod dashboard;
mod db;
mod filter;
mod models;
mod state;
mod stats;
mod tracker;
mod tui;
mod view;

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dashboard::truncate;
use db::Database;
use filter::Filter;
use log::debug;
use models::{NewApplication, Status};
use std::path::PathBuf;
use tracker::Tracker;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Track job applications and see how the search is going")]
struct Cli {
    /// Path to the database file
    #[arg(long, global = true, env = "JOBTRACK_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and show where it lives
    Init,

    /// Record a new application
    Add {
        /// Job title
        #[arg(short, long)]
        title: String,

        /// Company name
        #[arg(short, long)]
        company: String,

        /// Location (e.g. Remote, NYC)
        #[arg(short, long, default_value = "")]
        location: String,

        /// Advertised salary range
        #[arg(short, long, default_value = "")]
        salary_range: String,

        /// Link to the posting or application
        #[arg(long, default_value = "")]
        link: String,

        /// Date applied (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List applications
    List {
        /// Case-insensitive text to look for in title, company, location and notes
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by status (applied, interviewing, offer, rejected, accepted)
        #[arg(short = 'S', long)]
        status: Option<Status>,
    },

    /// Show application details
    Show {
        /// Application ID
        id: i64,
    },

    /// Change an application's status and offered salary
    Update {
        /// Application ID
        id: i64,

        /// New status (applied, interviewing, offer, rejected, accepted)
        #[arg(short = 'S', long)]
        status: Status,

        /// Specific salary offered, e.g. "$90,000" (omit to keep, "" to clear)
        #[arg(short, long)]
        salary: Option<String>,
    },

    /// Delete one or more applications
    Delete {
        /// Application IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Show the statistics dashboard
    Stats,

    /// Browse applications interactively
    Browse,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(Database::default_path);
    debug!("Using database at {}", path.display());
    let mut tracker = Tracker::load(Database::open(&path)?);

    match cli.command {
        Commands::Init => {
            println!("Database initialized at {}", tracker.db().path().display());
        }

        Commands::Add {
            title,
            company,
            location,
            salary_range,
            link,
            date,
            notes,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let id = tracker.add(NewApplication {
                job_title: title,
                company,
                location,
                salary_range,
                application_link: link,
                date_applied: date.format("%Y-%m-%d").to_string(),
                notes,
            })?;
            println!("Added application #{}", id);
        }

        Commands::List { search, status } => {
            let filter = Filter::new(search.as_deref(), status);
            let apps = tracker.filtered(&filter);
            if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<6} {:<13} {:<28} {:<20} {:<16} {:<10}",
                    "ID", "STATUS", "TITLE", "COMPANY", "LOCATION", "APPLIED"
                );
                println!("{}", "-".repeat(98));
                for app in apps {
                    println!(
                        "{:<6} {:<13} {:<28} {:<20} {:<16} {:<10}",
                        app.id,
                        app.status,
                        truncate(&app.job_title, 26),
                        truncate(&app.company, 18),
                        truncate(&app.location, 14),
                        truncate(&app.date_applied, 10)
                    );
                }
            }
        }

        Commands::Show { id } => {
            let app = tracker.require(id)?;
            println!("Application #{}", app.id);
            println!("Title: {}", app.job_title);
            println!("Company: {}", app.company);
            println!("Status: {}", app.status);
            println!("Location: {}", or_dash(&app.location));
            println!("Salary Range: {}", or_dash(&app.salary_range));
            println!("Specific Salary: {}", or_dash(&app.specific_salary));
            println!("Date Applied: {}", app.date_applied);
            println!("Link: {}", or_dash(&app.application_link));
            if !app.notes.is_empty() {
                println!("\n--- Notes ---\n{}", app.notes);
            }
        }

        Commands::Update { id, status, salary } => {
            let salary = match salary {
                Some(salary) => salary,
                None => tracker.require(id)?.specific_salary.clone(),
            };
            tracker.update_status(id, status, &salary)?;
            println!("Application #{} marked as {}.", id, status);
        }

        Commands::Delete { ids } => {
            if let [id] = ids.as_slice() {
                tracker.delete(*id)?;
                println!("Deleted application #{}.", id);
            } else {
                let removed = tracker.delete_many(&ids)?;
                println!("Deleted {} of {} application(s).", removed, ids.len());
            }
        }

        Commands::Stats => {
            let report = tracker.stats(Utc::now());
            print!("{}", dashboard::render_text(&report));
        }

        Commands::Browse => {
            tui::run_browse(&mut tracker)?;
        }
    }

    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { dashboard::PLACEHOLDER } else { s }
}
