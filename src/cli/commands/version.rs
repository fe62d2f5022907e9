//! Version command implementation.

use crate::error::Result;
use crate::storage::schema::SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    schema: i64,
    sqlite: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let sqlite = rusqlite::version();

    if json {
        let output = VersionOutput {
            version,
            build,
            schema: SCHEMA_VERSION,
            sqlite,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
        return Ok(());
    }

    println!("orq version {version} ({build}, schema {SCHEMA_VERSION}, sqlite {sqlite})");
    Ok(())
}
