//! Command-line front end for applying an update archive.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zipapply::update::destination;
use zipapply::{ArchiveApplier, ArchiveWalker, Cli, FileInstaller};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    let applier = ArchiveApplier::new(FileInstaller).with_ignore_rules(cli.ignore_rules());
    let opts = cli.options();

    if cli.list {
        return list_files(&applier, &cli);
    }

    applier.apply(&cli.archive, &opts)?;
    Ok(())
}

/// Print each file the archive would install and where it would go.
///
/// Walks the archive exactly like an update would, with a visitor that
/// drops every stream unread.
fn list_files(applier: &ArchiveApplier, cli: &Cli) -> Result<()> {
    let base = applier.target_dir(&cli.options())?;
    let walker = ArchiveWalker::open(&cli.archive, cli.ignore_rules())?;

    let count = walker.walk(|name, _src| {
        println!("{}", destination(&base, name)?.display());
        Ok(())
    })?;

    if cli.quiet == 0 {
        eprintln!("{count} files");
    }
    Ok(())
}
