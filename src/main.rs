use clap::Parser;
use obs_index::config::Settings;
use obs_index::error::IndexResult;
use obs_index::fs::FsVault;
use obs_index::notice::ConsoleNotifier;
use obs_index::{Args, Mode, RootStatus, generate_indexes};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn main() {
    let args = Args::parse();
    setup_logging(args.debug);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns `false` when at least one root failed.
fn run(args: &Args) -> IndexResult<bool> {
    let mut settings = Settings::load(&args.vault_path, args.config.as_deref())?;
    if !args.roots.is_empty() {
        settings.roots = args.roots.clone();
    }

    let vault = FsVault::new(&args.vault_path).with_exclude(&settings.exclude)?;
    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        Mode::Write
    };
    let report = generate_indexes(&vault, &settings, &ConsoleNotifier, mode)?;

    for outcome in &report.outcomes {
        if let RootStatus::Rendered { index_path, content } = &outcome.status {
            println!("==> {index_path} <==\n{content}");
        }
    }
    Ok(!report.has_failures())
}

/// `RUST_LOG` wins when set; otherwise `-d` repetitions pick the level.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}
