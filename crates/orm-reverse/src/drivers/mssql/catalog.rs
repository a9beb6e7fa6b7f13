//! Tiberius-backed catalog connection for SQL Server.

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::catalog::{CatalogRow, CatalogSource, CatalogValue};
use crate::error::{ReverseError, Result};

/// One live SQL Server connection answering catalog queries.
pub struct TiberiusCatalog {
    client: Client<Compat<TcpStream>>,
}

impl TiberiusCatalog {
    fn build_config(source: &SourceConfig) -> Config {
        let mut config = Config::new();
        config.host(&source.host);
        config.port(source.effective_port());
        config.database(&source.database);
        config.authentication(AuthMethod::sql_server(&source.user, &source.password));

        // Encryption settings
        if source.encrypt {
            if source.trust_server_cert {
                config.trust_cert();
            }
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }
        config
    }

    /// Open a connection using the source configuration.
    pub async fn connect(source: &SourceConfig) -> Result<Self> {
        let config = Self::build_config(source);
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            }
        })?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(config, tcp.compat_write()).await?;
        info!(
            "Connected to SQL Server catalog {}:{}/{}",
            source.host,
            source.effective_port(),
            source.database
        );
        Ok(Self { client })
    }
}

/// Convert a TDS value into a catalog value.
///
/// Catalog procedures only return strings, integers and flags; other types
/// are kept as their textual rendering.
fn convert_value(data: ColumnData<'static>) -> CatalogValue {
    fn text<T: ToString>(v: Option<T>) -> CatalogValue {
        v.map(|v| CatalogValue::Text(v.to_string()))
            .unwrap_or(CatalogValue::Null)
    }

    match data {
        ColumnData::String(v) => v
            .map(|s| CatalogValue::Text(s.into_owned()))
            .unwrap_or(CatalogValue::Null),
        ColumnData::U8(v) => text(v),
        ColumnData::I16(v) => text(v),
        ColumnData::I32(v) => text(v),
        ColumnData::I64(v) => text(v),
        ColumnData::F32(v) => text(v),
        ColumnData::F64(v) => text(v),
        ColumnData::Bit(v) => text(v.map(u8::from)),
        ColumnData::Guid(v) => text(v),
        ColumnData::Numeric(v) => text(v),
        ColumnData::Binary(v) => v
            .map(|b| CatalogValue::Raw(b.into_owned()))
            .unwrap_or(CatalogValue::Null),
        other => CatalogValue::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl CatalogSource for TiberiusCatalog {
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        let stream = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| ReverseError::catalog(sql, e.to_string()))?;
        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| ReverseError::catalog(sql, e.to_string()))?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
            let mut catalog_row = CatalogRow::new();
            for (name, data) in names.iter().zip(row.into_iter()) {
                catalog_row.push(name, convert_value(data));
            }
            result.push(catalog_row);
        }
        debug!("Catalog query returned {} rows", result.len());
        Ok(result)
    }

    fn backend(&self) -> &str {
        "mssql"
    }
}
