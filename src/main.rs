use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::rc::Rc;

use aquaritual::cli::{self, Cli, Commands};
use aquaritual::{Config, Database, Profile, Session, SystemClock};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Profile is chosen solely by the --dev flag
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load_with_profile(profile)?,
    };

    if let Err(e) = aquaritual::logging::init_logging(&config.log_level, &config.get_log_dir()) {
        eprintln!("warning: file logging disabled: {}", e);
    }

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    let mut session = Session::open(db, Rc::new(SystemClock));

    match cli.command.unwrap_or(Commands::List) {
        Commands::Add { title } => cli::handle_add(title, &mut session)?,
        Commands::Toggle { id } => cli::handle_toggle(id, &mut session)?,
        Commands::Delete { id } => cli::handle_delete(id, &mut session)?,
        Commands::List => cli::handle_list(&session)?,
        Commands::Status => cli::handle_status(&session)?,
    }

    Ok(())
}
