use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use projtree_core::config::{self, Settings};
use projtree_core::{TreeConfig, TreePrinter};

/// Print a directory's contents as an ASCII tree.
#[derive(Debug, Parser)]
#[command(name = "projtree", version)]
struct Cli {
    /// Directory to print (defaults to the working directory)
    path: Option<PathBuf>,

    /// Also skip directories with this name (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    exclude_dirs: Vec<String>,

    /// Also skip entries with this name (repeatable)
    #[arg(long = "exclude-file", value_name = "NAME")]
    exclude_files: Vec<String>,

    /// Start from empty exclusion lists instead of the built-in ones
    #[arg(long)]
    no_default_excludes: bool,

    /// Ignore global and project settings files
    #[arg(long)]
    no_config: bool,
}

impl Cli {
    fn tree_config(&self, root: &Path) -> TreeConfig {
        let mut settings = if self.no_config {
            Settings::default()
        } else {
            config::load_settings(root)
        };

        if self.no_default_excludes {
            settings.use_default_exclusions = false;
        }

        settings
            .into_tree_config()
            .with_excluded_dirs(self.exclude_dirs.iter().cloned())
            .with_excluded_files(self.exclude_files.iter().cloned())
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.path.clone() {
        Some(p) => p,
        None => std::env::current_dir().context("could not determine working directory")?,
    };

    let printer = TreePrinter::new(cli.tree_config(&root));
    debug!(root = %root.display(), config = ?printer.config(), "printing tree");

    let mut out = io::stdout().lock();
    let stats = printer.write_report(&root, &mut out)?;
    out.flush()?;

    debug!(
        directories = stats.directories,
        files = stats.files,
        "tree printed"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).context("traversal failed") {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
