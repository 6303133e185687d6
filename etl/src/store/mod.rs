//! SQLite persistence for the output relation.
//!
//! A table is always written whole: the previous table of the same name is
//! dropped and recreated inside one transaction.

use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::models::{Cell, Relation};

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(SqlValue::Null),
            Cell::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// Handle on a SQLite database file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replace table `name` with the contents of `relation`.
    ///
    /// Column order is kept; each column gets INTEGER or TEXT affinity from
    /// its cells. Returns the number of rows written.
    pub fn replace_table(&mut self, name: &str, relation: &Relation) -> StoreResult<usize> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidTableName(name.to_string()));
        }

        let table = quote_identifier(name);
        let column_defs: Vec<String> = relation
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} {}", quote_identifier(c), relation.column_type(i).sql_name()))
            .collect();
        let placeholders = vec!["?"; relation.column_count()].join(", ");

        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(
            &format!("CREATE TABLE {} ({})", table, column_defs.join(", ")),
            [],
        )?;
        {
            let mut insert = tx.prepare(&format!("INSERT INTO {} VALUES ({})", table, placeholders))?;
            for row in relation.rows() {
                insert.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        Ok(relation.row_count())
    }

    /// Read a whole table back as a relation, in rowid order.
    pub fn read_table(&self, name: &str) -> StoreResult<Relation> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote_identifier(name)))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| {
                        Ok(match row.get::<_, SqlValue>(i)? {
                            SqlValue::Null => Cell::Null,
                            SqlValue::Integer(v) => Cell::Integer(v),
                            SqlValue::Real(v) => Cell::Text(v.to_string()),
                            SqlValue::Text(s) => Cell::Text(s),
                            SqlValue::Blob(b) => Cell::Text(String::from_utf8_lossy(&b).into_owned()),
                        })
                    })
                    .collect::<rusqlite::Result<Vec<Cell>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Relation::from_rows(columns, rows)?)
    }

    /// Whether a table with this name exists.
    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
