//! Pervasive catalog access over ODBC.

use async_trait::async_trait;
use odbc_api::{
    buffers::TextRowSet, Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata,
};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::catalog::{CatalogRow, CatalogSource, CatalogValue};
use crate::drivers::common::WorkerCatalog;
use crate::error::{ReverseError, Result};

/// Catalog connection through the Pervasive ODBC driver.
///
/// One connection is opened per parse and lives on a dedicated thread.
/// Values are returned undecoded; the parser transcodes them with the
/// configured encoding hints.
pub struct OdbcCatalog {
    worker: WorkerCatalog,
}

/// Build the ODBC connection string for a Pervasive source.
pub fn connection_string(config: &SourceConfig) -> String {
    format!(
        "Driver={{{}}};ServerName={}.{};DBQ={};UID={};PWD={};",
        config.odbc_driver,
        config.host,
        config.effective_port(),
        config.database,
        config.user,
        config.password,
    )
}

impl OdbcCatalog {
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let connection_string = connection_string(config);
        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};ServerName={}.{};DBQ={};...",
            config.odbc_driver,
            config.host,
            config.effective_port(),
            config.database
        );

        let driver = config.odbc_driver.clone();
        let worker = WorkerCatalog::spawn("pervasive", move |session| {
            let env = match Environment::new() {
                Ok(env) => env,
                Err(e) => {
                    return session.fail(ReverseError::Config(format!(
                        "Failed to create ODBC environment: {}. Make sure the {} driver is installed.",
                        e, driver
                    )))
                }
            };
            let conn = match env
                .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            {
                Ok(conn) => conn,
                Err(e) => {
                    return session.fail(ReverseError::Config(format!(
                        "Failed to connect to Pervasive via ODBC: {}. Check that the username and password are correct.",
                        e
                    )))
                }
            };
            session.serve(|sql| run_query(&conn, sql));
        })
        .await?;

        info!(
            "Connected to Pervasive via ODBC: {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );
        Ok(Self { worker })
    }
}

fn run_query(conn: &Connection<'_>, sql: &str) -> Result<Vec<CatalogRow>> {
    let fail = |e: odbc_api::Error| ReverseError::catalog(sql, e.to_string());

    let mut rows = Vec::new();
    if let Some(mut cursor) = conn.execute(sql, ()).map_err(fail)? {
        let names = cursor
            .column_names()
            .map_err(fail)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(fail)?;

        let mut buffers = TextRowSet::for_cursor(1000, &mut cursor, Some(4096)).map_err(fail)?;
        let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(fail)?;

        while let Some(batch) = row_cursor.fetch().map_err(fail)? {
            for row_idx in 0..batch.num_rows() {
                let mut row = CatalogRow::new();
                for (col_idx, name) in names.iter().enumerate() {
                    let value = match batch.at(col_idx, row_idx) {
                        Some(bytes) => CatalogValue::Raw(bytes.to_vec()),
                        None => CatalogValue::Null,
                    };
                    row.push(name, value);
                }
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

#[async_trait]
impl CatalogSource for OdbcCatalog {
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        self.worker.query(sql).await
    }

    fn backend(&self) -> &str {
        self.worker.backend()
    }
}
