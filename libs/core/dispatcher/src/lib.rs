//! In-process job dispatcher
//!
//! Accepts jobs from many concurrent callers, runs them on a fixed pool of
//! worker tasks, and hands each caller exactly its own result.
//!
//! # Features
//!
//! - **Bounded queue**: a full queue rejects immediately instead of blocking
//! - **Correlated results**: every job carries a fresh correlation id; each
//!   pending slot is filled at most once
//! - **Timeouts**: callers wait a bounded time; late results are dropped
//! - **Panic isolation**: a panicking processor fails only its own caller
//! - **Graceful shutdown**: workers finish their current job, waiting callers
//!   are released with [`DispatchError::Closed`]
//! - **Prometheus metrics**: queue depth, latency, rejections and timeouts
//!
//! # Flow
//!
//! ```text
//!  caller ──register(id)──▶ PendingRegistry ◀──complete(id, out)── worker
//!    │                                                               ▲
//!    └──try_send(id, job)──▶ bounded mpsc queue ──recv──────────────┘
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod metrics;
pub mod registry;

pub use config::{DispatcherConfig, DEFAULT_SUBMIT_TIMEOUT};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use job::{Job, JobProcessor};
pub use metrics::{init_metrics, prometheus_handle, DispatcherMetrics};
pub use registry::{PendingGuard, PendingRegistry};
