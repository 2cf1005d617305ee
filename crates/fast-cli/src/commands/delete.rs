//! Delete command: remove a session from history.

use std::io::Write;

use anyhow::{Context, Result};

use fast_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, id: &str, config: &Config) -> Result<()> {
    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    db.delete_session(id)?;
    writeln!(writer, "Deleted fast {id}.")?;
    Ok(())
}
