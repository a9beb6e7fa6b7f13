//! A catalog connection owned by one dedicated blocking thread.
//!
//! Blocking drivers (ODBC) cannot hold a connection across `.await` points
//! on the runtime. The worker thread opens the connection once, answers
//! every query of the parse on it, and closes it when the
//! [`WorkerCatalog`] is dropped.

use std::thread;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::core::catalog::{CatalogRow, CatalogSource};
use crate::error::{ReverseError, Result};

type Reply = oneshot::Sender<Result<Vec<CatalogRow>>>;

/// The worker thread's end of the channel.
pub struct Session {
    ready: Option<oneshot::Sender<Result<()>>>,
    requests: mpsc::Receiver<(String, Reply)>,
}

impl Session {
    /// Report that the connection could not be opened.
    pub fn fail(mut self, error: ReverseError) {
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(Err(error));
        }
    }

    /// Report the connection as open, then answer queries with `query` until
    /// the catalog is dropped.
    pub fn serve<F>(mut self, mut query: F)
    where
        F: FnMut(&str) -> Result<Vec<CatalogRow>>,
    {
        if let Some(ready) = self.ready.take() {
            if ready.send(Ok(())).is_err() {
                return;
            }
        }
        while let Some((sql, reply)) = self.requests.blocking_recv() {
            let _ = reply.send(query(&sql));
        }
        debug!("Catalog worker shutting down");
    }
}

/// Async handle to a connection living on a worker thread.
pub struct WorkerCatalog {
    backend: &'static str,
    requests: mpsc::Sender<(String, Reply)>,
}

impl WorkerCatalog {
    /// Start a worker running `open` and wait until it has either connected
    /// or failed.
    pub async fn spawn<F>(backend: &'static str, open: F) -> Result<Self>
    where
        F: FnOnce(Session) + Send + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (requests_tx, requests_rx) = mpsc::channel(1);
        let session = Session {
            ready: Some(ready_tx),
            requests: requests_rx,
        };

        thread::Builder::new()
            .name(format!("{}-catalog", backend))
            .spawn(move || open(session))?;

        ready_rx.await.map_err(|_| {
            ReverseError::Config(format!("{} catalog worker exited before connecting", backend))
        })??;
        Ok(Self {
            backend,
            requests: requests_tx,
        })
    }
}

#[async_trait]
impl CatalogSource for WorkerCatalog {
    async fn query(&mut self, sql: &str) -> Result<Vec<CatalogRow>> {
        let gone = || ReverseError::catalog(sql, "catalog connection worker has stopped");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send((sql.to_string(), reply_tx))
            .await
            .map_err(|_| gone())?;
        reply_rx.await.map_err(|_| gone())?
    }

    fn backend(&self) -> &str {
        self.backend
    }
}
