use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] stakeway_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] stakeway_store_lmdb::LmdbError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC server error: {0}")]
    Rpc(#[from] stakeway_rpc::RpcError),

    #[error("metrics error: {0}")]
    Metrics(String),

    #[error("database integrity check failed: {0}")]
    Integrity(String),

    #[error("node not started")]
    NotStarted,

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
