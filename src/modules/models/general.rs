use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use snafu::ResultExt;

use crate::errors::{ConnectionSnafu, CustomResult};

const CREATE_TABLES: &str = include_str!("../../../migrations/2025-06-20-000000_create_tables/up.sql");

/// # establish connection
/// open the sqlite store at `database_url` and make sure the schema exists.
/// `:memory:` gives a fresh private store.
///
/// ## Arguments
/// * `database_url` - path of the database file
///
/// ## Returns
/// * `SqliteConnection` - the open connection with foreign keys enforced
pub fn establish_connection(database_url: &str) -> CustomResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url).context(ConnectionSnafu {
        path: database_url.to_string(),
    })?;

    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    run_migrations(&mut conn)?;

    debug!(target: "models/general:establish_connection", "opened store {}", database_url);
    Ok(conn)
}

/// create every table that does not exist yet
pub fn run_migrations(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(CREATE_TABLES)
}
