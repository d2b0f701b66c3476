//! The Stakeway node: owns the ledger environment and the HTTP server task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use stakeway_rewards::{RewardEngine, StakeService};
use stakeway_rpc::{HttpMetrics, RpcServer, RpcState};
use stakeway_store::LedgerStore;
use stakeway_store_lmdb::{LmdbEnvironment, LmdbLedgerStore};
use stakeway_types::SystemClock;

use crate::config::NodeConfig;
use crate::shutdown::ShutdownController;
use crate::NodeError;

pub struct StakewayNode {
    pub config: NodeConfig,
    env: LmdbEnvironment,
    service: Arc<dyn StakeService>,
    metrics: Option<Arc<HttpMetrics>>,
    pub shutdown: Arc<ShutdownController>,
    rpc_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl StakewayNode {
    /// Open (or create) the ledger under `config.data_dir` and verify it.
    ///
    /// Does not bind any socket; call [`StakewayNode::start`] for that.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        Self::with_service(config, |store| Arc::new(RewardEngine::new(store)))
    }

    /// Like [`StakewayNode::new`], with `make_service` deciding what serves
    /// the HTTP API on top of the opened ledger.
    pub fn with_service<F>(config: NodeConfig, make_service: F) -> Result<Self, NodeError>
    where
        F: FnOnce(LmdbLedgerStore) -> Arc<dyn StakeService>,
    {
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes()?)?;

        let report = env.check_integrity()?;
        if !report.is_healthy() {
            for error in &report.errors {
                tracing::error!(%error, "ledger integrity problem");
            }
            return Err(NodeError::Integrity(format!(
                "{} problem(s) in {}",
                report.errors.len(),
                config.data_dir.display()
            )));
        }

        let store = env.ledger_store(Arc::new(SystemClock));
        tracing::info!(
            data_dir = %config.data_dir.display(),
            stakes = store.stake_count()?,
            wallets = report.wallets,
            "ledger opened"
        );

        let metrics = if config.enable_metrics {
            let metrics = HttpMetrics::new().map_err(|e| NodeError::Metrics(e.to_string()))?;
            Some(Arc::new(metrics))
        } else {
            None
        };

        Ok(Self {
            config,
            env,
            service: make_service(store),
            metrics,
            shutdown: Arc::new(ShutdownController::new()),
            rpc_handle: None,
            local_addr: None,
        })
    }

    /// The staking service backing the HTTP API.
    pub fn service(&self) -> Arc<dyn StakeService> {
        Arc::clone(&self.service)
    }

    /// Address the HTTP server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener and spawn the HTTP server. Returns the bound address,
    /// which differs from the configured one when port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, NodeError> {
        let state = RpcState::new(self.service(), self.metrics.clone());
        let server =
            RpcServer::bind(self.config.listen_addr, state, self.config.request_timeout()).await?;
        let addr = server.local_addr()?;

        let signal = self.shutdown.signalled();
        let handle = tokio::spawn(async move {
            match server.serve(signal).await {
                Ok(()) => tracing::info!("RPC server exited"),
                Err(e) => tracing::error!("RPC server error: {e}"),
            }
        });

        self.rpc_handle = Some(handle);
        self.local_addr = Some(addr);
        tracing::info!(%addr, metrics = self.metrics.is_some(), "Stakeway node started");
        Ok(addr)
    }

    /// Start, serve until SIGINT/SIGTERM, then stop.
    pub async fn run(&mut self) -> Result<(), NodeError> {
        self.start().await?;
        self.shutdown.wait_for_signal().await;
        self.stop().await
    }

    /// Signal the server to stop accepting connections and wait up to the
    /// configured grace period for in-flight requests. The server task is
    /// aborted if it does not finish in time.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        let mut handle = self.rpc_handle.take().ok_or(NodeError::NotStarted)?;
        tracing::info!("Stakeway node stopping");

        self.shutdown.shutdown();

        let grace = self.config.shutdown_grace();
        let outcome = match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "RPC server task failed");
                Ok(())
            }
            Err(_) => {
                tracing::warn!("shutdown timeout ({:?}), aborting RPC server", grace);
                handle.abort();
                Err(NodeError::ShutdownTimeout)
            }
        };

        // Flush LMDB
        if let Err(e) = self.env.force_sync() {
            tracing::warn!("LMDB force_sync failed: {e}");
        } else {
            tracing::info!("LMDB flushed to disk");
        }

        self.local_addr = None;
        tracing::info!("Stakeway node stopped");
        outcome
    }
}
