use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    cbtrip::logging::init().context("init logging")?;

    let cli = cbtrip::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let ripper = cbtrip::rip::Ripper::from_cli(&cli).context("configure ripper")?;
    let summary = ripper
        .run(&cli.url)
        .with_context(|| format!("rip chapters from {}", cli.url))?;

    tracing::info!(
        chapters = summary.archives.len(),
        pages = summary.pages,
        "done"
    );
    Ok(())
}
