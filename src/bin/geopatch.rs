//! geopatch: apply task files to geosite datasets from the command line.

use clap::{Parser, Subcommand};
use geopatch::dataset::GeoSiteList;
use geopatch::{load_dataset, run, RunOptions, TaskList};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "geopatch")]
#[command(version = "0.1.0")]
#[command(about = "Apply declarative edit tasks to geosite datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a task file (the default command)
    Apply {
        /// Task file (JSON, or YAML for .yml/.yaml)
        #[arg(short, long, default_value = "./tasks.json")]
        tasks: PathBuf,

        /// Source dataset path or URL, replacing the task file's `src`
        #[arg(long)]
        src: Option<String>,

        /// Destination path, replacing the task file's `dst`
        #[arg(long)]
        dst: Option<PathBuf>,

        /// Apply tasks without writing the destination
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the records of a dataset
    List {
        /// Dataset path or URL
        dataset: String,

        /// Only show records with this country code, including their rules
        #[arg(short, long)]
        country: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Apply {
        tasks: PathBuf::from("./tasks.json"),
        src: None,
        dst: None,
        dry_run: false,
        verbose: false,
    });

    let result = match command {
        Commands::Apply {
            tasks,
            src,
            dst,
            dry_run,
            verbose,
        } => {
            init_logging(verbose);
            let options = RunOptions {
                src_override: src,
                dst_override: dst,
                dry_run,
            };
            apply(&tasks, &options)
        }
        Commands::List {
            dataset,
            country,
            verbose,
        } => {
            init_logging(verbose);
            list(&dataset, country.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn apply(tasks: &Path, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let task_list = TaskList::from_path(tasks)?;
    let summary = run(&task_list, options)?;

    if summary.written {
        println!(
            "Modified dataset has been saved to '{}'.",
            summary.destination.display()
        );
    } else {
        println!(
            "Dry run: {} changes, {} bytes would be written to '{}'.",
            summary.report.changes().len(),
            summary.output_size,
            summary.destination.display()
        );
    }
    Ok(())
}

fn list(dataset: &str, country: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let list = load_dataset(dataset)?;

    match country {
        Some(code) => print_records(&list, code),
        None => {
            for site in &list {
                println!("{}\t{}", site.country_code, site.domains.len());
            }
            println!(
                "{} entries, {} domains",
                list.len(),
                list.domain_count()
            );
        }
    }
    Ok(())
}

fn print_records(list: &GeoSiteList, code: &str) {
    let mut found = false;
    for site in list.iter().filter(|s| s.is_keyed(code)) {
        found = true;
        println!("{} ({} domains)", site.country_code, site.domains.len());
        for domain in &site.domains {
            println!("  {}:{}", domain.kind, domain.value);
        }
    }
    if !found {
        eprintln!("No entry for {}", code);
    }
}
