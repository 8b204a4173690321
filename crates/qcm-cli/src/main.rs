//! The `qcm` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qcm_core::model::OrderMode;

mod commands;

use commands::Globals;

#[derive(Parser)]
#[command(name = "qcm", version, about = "Multiple-choice quiz trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the module folders
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Statistics file
    #[arg(long, global = true)]
    stats_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules
    Modules,

    /// List the lessons of a module
    Lessons {
        /// Module name
        #[arg(long)]
        module: String,
    },

    /// Take a quiz on a lesson or an exam across a module
    Quiz {
        /// Module name
        #[arg(long)]
        module: String,

        /// Lesson name
        #[arg(long, conflicts_with = "exam", required_unless_present = "exam")]
        lesson: Option<String>,

        /// Exam size; without a value the configured size is used
        #[arg(long, num_args = 0..=1)]
        exam: Option<Option<usize>>,

        /// Question order: random or fixed
        #[arg(long)]
        order: Option<OrderMode>,

        /// Countdown in minutes (1-120)
        #[arg(long)]
        timer: Option<u32>,

        /// Write a JSON report of the session
        #[arg(long)]
        report: Option<PathBuf>,

        /// Do not update the statistics file
        #[arg(long)]
        no_stats: bool,
    },

    /// Add a question to a lesson, creating module and lesson if needed
    Add {
        /// Module name
        #[arg(long)]
        module: String,

        /// Lesson name
        #[arg(long)]
        lesson: String,

        /// Question text
        #[arg(long)]
        question: String,

        /// Answer choice (repeat for each choice)
        #[arg(long = "choice", required = true)]
        choices: Vec<String>,

        /// Correct choices as letters, e.g. "A,C"
        #[arg(long)]
        correct: String,
    },

    /// Show aggregated results
    Stats,

    /// Check the lessons of a module
    Validate {
        /// Module name
        #[arg(long)]
        module: String,
    },

    /// Create a starter config and a sample module
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("qcm=warn,qcm_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let globals = Globals {
        config: cli.config,
        root: cli.root,
        stats_file: cli.stats_file,
    };

    let result = match cli.command {
        Commands::Modules => commands::modules::execute(&globals),
        Commands::Lessons { module } => commands::lessons::execute(&globals, &module),
        Commands::Quiz {
            module,
            lesson,
            exam,
            order,
            timer,
            report,
            no_stats,
        } => commands::quiz::execute(
            &globals,
            commands::quiz::QuizArgs {
                module,
                lesson,
                exam,
                order,
                timer,
                report,
                no_stats,
            },
        ),
        Commands::Add {
            module,
            lesson,
            question,
            choices,
            correct,
        } => commands::add::execute(&globals, &module, &lesson, question, choices, &correct),
        Commands::Stats => commands::stats::execute(&globals),
        Commands::Validate { module } => commands::validate::execute(&globals, &module),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
