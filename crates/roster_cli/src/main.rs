//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `roster_core` linkage by running one insert/update/delete cycle.
//! - Use the database path from the first argument, or an in-memory database.

use roster_core::{RosterConfig, SqliteUserStore, User, UserRepository};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => RosterConfig::with_db_path(path),
        None => RosterConfig::default(),
    };
    config.init_logging()?;

    println!("roster_core version={}", roster_core::core_version());
    let repo = UserRepository::new(SqliteUserStore::from_config(&config)?);

    let mut user = repo.insert(&User::new("Ana", "Diaz", 30)?)?;
    println!("inserted {user:?}");
    println!("users={:?}", repo.get_all()?);

    user.age += 1;
    repo.update(&user)?;
    println!("updated users={:?}", repo.get_all()?);

    let removed = repo.delete_by_id(user.id)?;
    println!("deleted rows={removed} users={:?}", repo.get_all()?);
    Ok(())
}
