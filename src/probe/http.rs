//! HTTP-only strategy for environments without raw socket access

use super::ProbeStrategy;
use crate::classifier::Fault;
use crate::logging::Logger;
use crate::models::ProbeResult;
use crate::types::{ErrorKind, ProbeTarget, StrategyKind};
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::net::Ipv6Addr;
use std::time::{Duration, Instant};

/// Header carrying the synthetic payload
pub const PAYLOAD_HEADER: &str = "X-Probe-Payload";

/// Probes a host with a single `GET`; any HTTP response proves reachability
pub struct HttpProbeStrategy {
    logger: Logger,
}

impl HttpProbeStrategy {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    async fn request(&self, url: &str, timeout: Duration, packet_size: usize) -> std::result::Result<Duration, Fault> {
        // A fresh client per probe so no pooled connection hides a handshake
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(Fault::from_reqwest)?;

        let started = Instant::now();
        let response = client
            .get(url)
            .header(PAYLOAD_HEADER, "x".repeat(packet_size))
            .send()
            .await
            .map_err(Fault::from_reqwest)?;
        let latency = started.elapsed();

        let status = response.status();
        if let Err(e) = response.bytes().await {
            self.logger
                .debug("Response body could not be drained")
                .field("url", url)
                .fault(&Fault::from_reqwest(e))
                .log()
                .await;
        }

        self.logger
            .debug(&format!("GET {} -> {}", url, status.as_u16()))
            .field("status", status.as_u16())
            .field("latency_ms", latency.as_millis() as u64)
            .log()
            .await;

        Ok(latency)
    }
}

#[async_trait]
impl ProbeStrategy for HttpProbeStrategy {
    async fn probe(&self, target: &ProbeTarget, timeout: Duration, packet_size: usize) -> ProbeResult {
        let url = probe_url(target.host());
        if let Err(e) = url::Url::parse(&url) {
            return ProbeResult::failure(target.host(), ErrorKind::Other, format!("Invalid probe URL {}: {}", url, e));
        }

        match self.request(&url, timeout, packet_size).await {
            Ok(latency) => ProbeResult::success(target.host(), latency),
            Err(fault) => {
                self.logger.debug(&format!("GET {} failed", url)).fault(&fault).log().await;
                ProbeResult::from_fault(target.host(), &fault)
            }
        }
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::HttpOnly
    }
}

/// `http://` URL for a bare host; anything already carrying a scheme is kept
pub fn probe_url(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else if host.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{}]", host)
    } else {
        format!("http://{}", host)
    }
}
