//! # solink-bridge
//!
//! The delegate bridge: an alternative analysis path that hands a document
//! to an out-of-process worker through a polled, file-based request/response
//! protocol.
//!
//! The delegate runs in a separate process with no shared memory or socket
//! access to the host sandbox; a designated writable directory is the only
//! mutually reachable medium. [`BridgeClient`] is the caller side (request
//! out, poll for a result, reject stale answers); [`BridgeServer`] is the
//! worker side, generic over the [`DelegateAnalyzer`] doing the actual
//! reading.

mod io;

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{BridgeClient, PollOptions};
pub use protocol::{
    ANALYZE_COMMAND, BridgeRequest, BridgeResult, REQUEST_FILE, RESULT_FILE, WireLayer,
    normalize_layers,
};
pub use server::{BridgeServer, DelegateAnalyzer};
