//! sentinel-runtime: the process-level owner of a Sentinel deployment.
//!
//! `SentinelRuntime` holds the storage engine, resolved configuration,
//! event dispatcher, cooldown ledger and external collaborators, and exposes
//! the operations callers use: running a pipeline cycle, querying alerts,
//! reading and overriding thresholds, feedback and the brand watchlist.

pub mod discovery;
pub mod pipeline;
pub mod reasoning_client;
pub mod runtime;

pub use discovery::CompetitorCache;
pub use reasoning_client::{HttpReasoningClient, ReasoningClientConfig};
pub use runtime::{Collaborators, RuntimeOptions, SentinelRuntime};
