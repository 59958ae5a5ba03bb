// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: wires config, store, transport, monitor, engine and
//! façade together for one `.tether/` directory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tether_core::LocalStore;
use tracing::debug;

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;
use crate::sync::{
    Connectivity, ConnectivityMonitor, EngineConfig, HttpTransport, OfflineFacade, RemoteRequest,
    SyncEngine, Transport, TransportError, TransportResult,
};

/// The transport the CLI runs with.
pub enum ConfiguredTransport {
    Http(HttpTransport),
    /// No `[remote]` section: always unreachable.
    Detached,
}

impl ConfiguredTransport {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.remote {
            Some(remote) => Ok(ConfiguredTransport::Http(HttpTransport::new(remote)?)),
            None => Ok(ConfiguredTransport::Detached),
        }
    }
}

impl Transport for ConfiguredTransport {
    fn send(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Value>> + Send + '_>> {
        match self {
            ConfiguredTransport::Http(http) => http.send(request),
            ConfiguredTransport::Detached => Box::pin(async {
                Err(TransportError::ConnectionFailed(
                    "no remote configured".to_string(),
                ))
            }),
        }
    }

    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        match self {
            ConfiguredTransport::Http(http) => http.probe(),
            ConfiguredTransport::Detached => Box::pin(async { false }),
        }
    }
}

/// Everything a command needs, built once per invocation.
pub struct SyncContext<T: Transport> {
    work_dir: PathBuf,
    config: Config,
    transport: Arc<T>,
    engine: Arc<SyncEngine<T>>,
    facade: OfflineFacade<T>,
}

impl SyncContext<ConfiguredTransport> {
    /// Find `.tether/` from the current directory and open it.
    pub async fn open() -> Result<Self> {
        let work_dir = find_work_dir()?;
        Self::open_at(&work_dir).await
    }

    /// Open a `.tether/` directory. Initial connectivity comes from one
    /// probe of the remote.
    pub async fn open_at(work_dir: &Path) -> Result<Self> {
        let config = Config::load(work_dir)?;
        let transport = Arc::new(ConfiguredTransport::from_config(&config)?);
        let reachable = transport.probe().await;
        debug!(reachable, "initial connectivity probe");
        Self::with_transport(
            work_dir,
            config,
            transport,
            Connectivity::from_reachable(reachable),
        )
    }
}

impl<T: Transport> SyncContext<T> {
    /// Build a context around an existing transport.
    pub fn with_transport(
        work_dir: &Path,
        config: Config,
        transport: Arc<T>,
        initial: Connectivity,
    ) -> Result<Self> {
        let registry = Arc::new(config.registry()?);
        let store = LocalStore::open(&get_db_path(work_dir))?;
        let monitor = Arc::new(ConnectivityMonitor::new(initial));
        let mut engine_config = EngineConfig {
            max_attempts: config.sync.max_attempts,
            ..EngineConfig::default()
        };
        if let Some(remote) = &config.remote {
            engine_config.request_timeout = remote.timeout();
        }

        let engine = Arc::new(SyncEngine::new(
            Arc::new(Mutex::new(store)),
            Arc::clone(&transport),
            registry,
            monitor,
            engine_config,
        ));
        let facade = OfflineFacade::new(Arc::clone(&engine));
        Ok(SyncContext {
            work_dir: work_dir.to_path_buf(),
            config,
            transport,
            engine,
            facade,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn engine(&self) -> &Arc<SyncEngine<T>> {
        &self.engine
    }

    pub fn facade(&self) -> &OfflineFacade<T> {
        &self.facade
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
