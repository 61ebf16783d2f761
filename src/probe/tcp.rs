//! Native strategy: TCP handshake against a fixed list of well-known ports

use super::ProbeStrategy;
use crate::classifier::Fault;
use crate::defaults;
use crate::logging::Logger;
use crate::models::ProbeResult;
use crate::types::{ErrorKind, ProbeTarget, StrategyKind};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

const FILLER_BYTE: u8 = b'x';

/// Probes a host by completing a TCP handshake on the first open candidate port
pub struct TcpProbeStrategy {
    ports: Vec<u16>,
    logger: Logger,
}

impl TcpProbeStrategy {
    pub fn new(logger: Logger) -> Self {
        Self {
            ports: defaults::CANDIDATE_PORTS.to_vec(),
            logger,
        }
    }

    /// Replace the candidate ports, tried in the given order
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

#[async_trait]
impl ProbeStrategy for TcpProbeStrategy {
    async fn probe(&self, target: &ProbeTarget, timeout: Duration, packet_size: usize) -> ProbeResult {
        let started = Instant::now();
        let host = target.host();

        let ips = match resolve(host, timeout).await {
            Ok(ips) => ips,
            Err(fault) => {
                self.logger.debug("Host resolution failed").fault(&fault).log().await;
                return ProbeResult::from_fault(host, &fault);
            }
        };

        let mut port_errors = Vec::with_capacity(self.ports.len());
        for &port in &self.ports {
            let addrs: Vec<SocketAddr> = ips.iter().map(|ip| SocketAddr::new(*ip, port)).collect();

            match connect_any(&addrs, timeout).await {
                Ok(mut stream) => {
                    if let Err(fault) = send_filler(&mut stream, packet_size, timeout).await {
                        self.logger
                            .debug("Payload write failed after connect")
                            .field("port", port)
                            .fault(&fault)
                            .log()
                            .await;
                    }
                    return ProbeResult::success(host, started.elapsed());
                }
                Err(fault) => {
                    self.logger
                        .debug(&format!("Port {} failed on {}", port, host))
                        .field("port", port)
                        .fault(&fault)
                        .log()
                        .await;
                    port_errors.push(format!("{}: {}", port, fault));
                }
            }
        }

        ProbeResult::failure(
            host,
            ErrorKind::NetworkUnreachable,
            format!("all ports failed ({})", port_errors.join("; ")),
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }
}

/// Resolve `host` to its addresses within `timeout`
pub(crate) async fn resolve(host: &str, timeout: Duration) -> std::result::Result<Vec<IpAddr>, Fault> {
    match tokio::time::timeout(timeout, tokio::net::lookup_host((host, 0))).await {
        Ok(Ok(addrs)) => {
            let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
            if ips.is_empty() {
                Err(Fault::resolution(host, "no addresses returned"))
            } else {
                Ok(ips)
            }
        }
        Ok(Err(e)) => Err(Fault::resolution(host, e)),
        Err(_) => Err(Fault::elapsed("host lookup", timeout)),
    }
}

/// Connect to the first address that accepts, all within one deadline
async fn connect_any(addrs: &[SocketAddr], timeout: Duration) -> std::result::Result<TcpStream, Fault> {
    let attempt = async {
        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(match last_error {
            Some(e) => Fault::from_io(&e),
            None => Fault::from_message("no addresses to connect to"),
        })
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(Fault::elapsed("connect", timeout)),
    }
}

async fn send_filler(stream: &mut TcpStream, packet_size: usize, timeout: Duration) -> std::result::Result<(), Fault> {
    let payload = vec![FILLER_BYTE; packet_size];
    let write = async {
        stream.write_all(&payload).await?;
        stream.flush().await?;
        stream.shutdown().await
    };

    match tokio::time::timeout(timeout, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Fault::from_io(&e)),
        Err(_) => Err(Fault::elapsed("payload write", timeout)),
    }
}

/// Single direct connection used by the environment checks
pub(crate) async fn connect_once(host: &str, port: u16, timeout: Duration) -> std::result::Result<Duration, Fault> {
    let started = Instant::now();
    let ips = resolve(host, timeout).await?;
    let addrs: Vec<SocketAddr> = ips.into_iter().map(|ip| SocketAddr::new(ip, port)).collect();

    let stream = connect_any(&addrs, timeout.saturating_sub(started.elapsed())).await?;
    drop(stream);
    Ok(started.elapsed())
}
