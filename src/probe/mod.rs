//! Probe strategies
//!
//! A strategy performs exactly one reachability attempt and reports the
//! outcome as a [`ProbeResult`]; it never returns an error. Two strategies
//! exist: direct TCP connects for hosts where sockets are available, and
//! plain HTTP requests for sandboxed environments that only allow HTTP.

pub mod http;
pub mod tcp;

pub use http::HttpProbeStrategy;
pub use tcp::TcpProbeStrategy;

use crate::classifier::Fault;
use crate::logging::Logger;
use crate::models::ProbeResult;
use crate::types::{ProbeMode, ProbeTarget, StrategyKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// One way of checking whether a host is reachable
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// Single attempt against `target`. Faults are classified into the result.
    async fn probe(&self, target: &ProbeTarget, timeout: Duration, packet_size: usize) -> ProbeResult;

    /// Direct TCP connection to `host:port`, returning the time to connect
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> std::result::Result<Duration, Fault> {
        tcp::connect_once(host, port, timeout).await
    }

    fn kind(&self) -> StrategyKind;
}

/// Whether this process may open TCP sockets at all
pub fn socket_capable() -> bool {
    tokio::net::TcpSocket::new_v4().is_ok() || tokio::net::TcpSocket::new_v6().is_ok()
}

/// Pick the strategy for a session; `Auto` prefers TCP when sockets work
pub fn select_strategy(mode: ProbeMode, logger: &Logger) -> Arc<dyn ProbeStrategy> {
    let use_tcp = match mode {
        ProbeMode::Tcp => true,
        ProbeMode::Http => false,
        ProbeMode::Auto => socket_capable(),
    };

    if use_tcp {
        Arc::new(TcpProbeStrategy::new(logger.named("PROBE")))
    } else {
        Arc::new(HttpProbeStrategy::new(logger.named("PROBE")))
    }
}
