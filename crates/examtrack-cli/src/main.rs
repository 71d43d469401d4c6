//! examtrack CLI — score exams and chart study progress from record files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "examtrack",
    version,
    about = "Exam score calculator and study progress tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute nets and placement scores for one exam sitting
    Score {
        /// Exam format: LGS, TYT, AYT_SAY, AYT_EA, AYT_SOZ, AYT_DIL, GENERAL
        #[arg(long)]
        format: String,

        /// Subject results as key=correct[:incorrect] (repeatable)
        #[arg(long = "subject", value_name = "KEY=C[:W]")]
        subjects: Vec<String>,

        /// High-school diploma score, 0-100 (TYT/AYT only)
        #[arg(long)]
        diploma: Option<f64>,

        /// Output format: text, json
        #[arg(long = "format-output", default_value = "text")]
        output: String,
    },

    /// Aggregate records into buckets and classify them against a target
    Progress {
        /// Path to a record file or directory
        #[arg(long)]
        records: PathBuf,

        /// Record kind to aggregate: practice, exams
        #[arg(long, default_value = "practice")]
        kind: String,

        /// Bucket size: daily, weekly, monthly (default from config)
        #[arg(long)]
        granularity: Option<String>,

        /// Only records of this student
        #[arg(long)]
        student: Option<String>,

        /// Only exams of this format
        #[arg(long)]
        exam_format: Option<String>,

        /// First bucket key to include
        #[arg(long)]
        from: Option<String>,

        /// Last bucket key to include
        #[arg(long)]
        to: Option<String>,

        /// Target each bucket is classified against (default from config)
        #[arg(long)]
        target: Option<f64>,

        /// Accuracy series subject: "all" or a subject key
        #[arg(long, default_value = "all")]
        subject: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        output: String,

        /// Also save the report as JSON to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate record files
    Validate {
        /// Path to a record file or directory
        #[arg(long)]
        records: PathBuf,
    },

    /// Create starter config and example record file
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examtrack=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            format,
            subjects,
            diploma,
            output,
        } => commands::score::execute(format, subjects, diploma, output),
        Commands::Progress {
            records,
            kind,
            granularity,
            student,
            exam_format,
            from,
            to,
            target,
            subject,
            output,
            save,
            config,
        } => commands::progress::execute(commands::progress::ProgressArgs {
            records,
            kind,
            granularity,
            student,
            exam_format,
            from,
            to,
            target,
            subject,
            output,
            save,
            config,
        }),
        Commands::Validate { records } => commands::validate::execute(records),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
