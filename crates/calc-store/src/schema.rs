use rusqlite::Connection;

use calc_core::HistoryError;

pub fn init_db(conn: &Connection) -> Result<(), HistoryError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            expression TEXT NOT NULL,
            result TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| HistoryError::Database(e.to_string()))?;

    Ok(())
}
