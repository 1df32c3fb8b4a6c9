use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use deskboard::cli::{self, Cli};
use deskboard::{Config, Profile, SqliteStore, Storage, TerminalDisplay, Workspace, logging};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_with_profile(profile)?,
    };

    logging::init(&config.log_filter).map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    let db_path = config.get_database_path();
    tracing::debug!(path = %db_path.display(), "opening database");
    let storage = Storage::new(SqliteStore::open(&db_path)?);
    let display = TerminalDisplay::new(config.prefer_dark);
    let mut workspace = Workspace::open(storage, Box::new(display));

    cli::run(cli.command, &mut workspace)?;

    Ok(())
}
