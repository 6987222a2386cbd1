use std::io;

use anyhow::{Context, Result};
use chrono::{Days, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::log::LogOptions;
use wl_cli::commands::util::local_now;
use wl_cli::commands::{commit, doctor, log, status, task};
use wl_cli::{Cli, Commands, Config, TaskAction};

/// Maps `-v` repetitions to a filter, deferring to `RUST_LOG` otherwise.
fn env_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let mut store = config.open_store().context("failed to open work log")?;

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    match command {
        Commands::Commit {
            category,
            kind,
            id,
            offset_minutes,
            time,
            force,
        } => {
            let request = commit::request(
                (*category).into(),
                (*kind).into(),
                id.as_deref(),
                *offset_minutes,
                time.as_deref(),
                *force,
            )?;
            commit::run(&mut store, &request, &Local::now())?;
        }
        Commands::Task(action) => match action {
            TaskAction::List => task::list(&mut stdout, store.log())?,
            TaskAction::Report { id, json } => {
                task::report(&mut stdout, store.log(), id, *json, local_now())?;
            }
        },
        Commands::Status { yesterday, fmt } => {
            let targets = config.targets().context("invalid working hour targets")?;
            let now = local_now();
            let today = now.date_naive();
            let query_date = if *yesterday {
                today
                    .checked_sub_days(Days::new(1))
                    .context("date out of range")?
            } else {
                today
            };
            status::run(
                &mut stdout,
                &mut stderr,
                store.log(),
                targets,
                query_date,
                fmt.as_deref(),
                now,
            )?;
        }
        Commands::Doctor => {
            let found = doctor::run(&mut stderr, store.log(), local_now().date_naive())?;
            tracing::info!(problems = found, "doctor finished");
        }
        Commands::Log {
            number,
            all,
            category,
            no_pager,
        } => {
            let number = if *all {
                None
            } else {
                Some(usize::try_from(*number).context("entry count too large")?)
            };
            let options = LogOptions {
                number,
                category: category.map(Into::into),
                no_pager: *no_pager,
                pager_threshold: config.pager_threshold,
            };
            log::run(&mut stdout, store.log(), options)?;
        }
    }

    Ok(())
}
