//! Failure classification
//!
//! Every fault raised while probing is reduced to an [`ErrorKind`]. Structured
//! codes (raw OS error numbers, `io::ErrorKind`, elapsed timers, failed name
//! lookups) take priority; the fault message is only consulted when no code
//! is present or the code is not one we recognize.

use crate::types::ErrorKind;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Structured identity of a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// Raw platform error number (errno, WinSock code)
    Os(i32),
    /// Portable I/O error kind, used when no raw code is available
    Io(io::ErrorKind),
    /// A `tokio::time::timeout` deadline elapsed
    Elapsed,
    /// Name resolution returned an error
    Resolution,
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::Os(code) => write!(f, "os error {}", code),
            FaultCode::Io(kind) => write!(f, "io {:?}", kind),
            FaultCode::Elapsed => f.write_str("elapsed"),
            FaultCode::Resolution => f.write_str("resolution"),
        }
    }
}

/// A raw failure observed while probing, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    code: Option<FaultCode>,
    message: String,
}

impl Fault {
    pub fn new(code: Option<FaultCode>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Fault with only a message to go on
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// Deadline expiry for `what` after `after`
    pub fn elapsed(what: &str, after: std::time::Duration) -> Self {
        Self::new(
            Some(FaultCode::Elapsed),
            format!("{} timeout after {}ms", what, after.as_millis()),
        )
    }

    /// Failed address lookup for `host`
    pub fn resolution(host: &str, detail: impl fmt::Display) -> Self {
        Self::new(
            Some(FaultCode::Resolution),
            format!("host lookup failed for {}: {}", host, detail),
        )
    }

    /// Raw OS code when the platform supplied one, the portable kind otherwise
    pub fn from_io(error: &io::Error) -> Self {
        let code = match error.raw_os_error() {
            Some(raw) => FaultCode::Os(raw),
            None => FaultCode::Io(error.kind()),
        };
        Self::new(Some(code), error.to_string())
    }

    /// Convert an HTTP client error, searching its cause chain for an I/O error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        // The URL would leak the target host into the message tier
        let error = error.without_url();

        let mut parts = vec![error.to_string()];
        let mut io_code = None;
        let mut source = error.source();
        while let Some(cause) = source {
            parts.push(cause.to_string());
            if io_code.is_none() {
                if let Some(io_error) = cause.downcast_ref::<io::Error>() {
                    io_code = Fault::from_io(io_error).code;
                }
            }
            source = cause.source();
        }
        parts.dedup();

        let code = if error.is_timeout() {
            Some(FaultCode::Elapsed)
        } else {
            io_code
        };
        Self::new(code, parts.join(": "))
    }

    pub fn code(&self) -> Option<FaultCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Shorthand for [`classify`]
    pub fn kind(&self) -> ErrorKind {
        classify(self)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Fault {}

impl From<io::Error> for Fault {
    fn from(error: io::Error) -> Self {
        Fault::from_io(&error)
    }
}

impl From<tokio::time::error::Elapsed> for Fault {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        Fault::new(Some(FaultCode::Elapsed), error.to_string())
    }
}

/// Map a fault to its [`ErrorKind`]. Total: never fails, never panics.
pub fn classify(fault: &Fault) -> ErrorKind {
    fault
        .code
        .and_then(classify_code)
        .unwrap_or_else(|| classify_message(&fault.message))
}

/// `None` means the code gives no verdict and the message decides
fn classify_code(code: FaultCode) -> Option<ErrorKind> {
    match code {
        FaultCode::Elapsed => Some(ErrorKind::Timeout),
        FaultCode::Resolution => Some(ErrorKind::HostNotFound),
        FaultCode::Os(raw) => classify_os_code(raw),
        FaultCode::Io(kind) => classify_io_kind(kind),
    }
}

fn classify_io_kind(kind: io::ErrorKind) -> Option<ErrorKind> {
    use io::ErrorKind as Io;

    match kind {
        Io::TimedOut => Some(ErrorKind::Timeout),
        Io::NetworkUnreachable | Io::HostUnreachable => Some(ErrorKind::NetworkUnreachable),
        Io::PermissionDenied => Some(ErrorKind::PermissionDenied),
        Io::ConnectionRefused
        | Io::ConnectionReset
        | Io::ConnectionAborted
        | Io::NotConnected
        | Io::AddrInUse
        | Io::AddrNotAvailable
        | Io::BrokenPipe => Some(ErrorKind::Other),
        _ => None,
    }
}

fn classify_os_code(raw: i32) -> Option<ErrorKind> {
    let table = &os_codes::TABLE;
    if table.timeout.contains(&raw) {
        Some(ErrorKind::Timeout)
    } else if table.host_not_found.contains(&raw) {
        Some(ErrorKind::HostNotFound)
    } else if table.unreachable.contains(&raw) {
        Some(ErrorKind::NetworkUnreachable)
    } else if table.permission.contains(&raw) {
        Some(ErrorKind::PermissionDenied)
    } else if table.unmapped.contains(&raw) {
        Some(ErrorKind::Other)
    } else {
        None
    }
}

fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_lowercase();

    if message.contains("timeout") {
        ErrorKind::Timeout
    } else if message.contains("host") || message.contains("dns") || message.contains("getaddrinfo") {
        ErrorKind::HostNotFound
    } else if message.contains("permission") {
        ErrorKind::PermissionDenied
    } else {
        ErrorKind::Other
    }
}

struct OsCodeTable {
    timeout: &'static [i32],
    host_not_found: &'static [i32],
    unreachable: &'static [i32],
    permission: &'static [i32],
    /// Known connection failures with no dedicated kind
    unmapped: &'static [i32],
}

#[cfg(target_os = "linux")]
mod os_codes {
    pub(super) const TABLE: super::OsCodeTable = super::OsCodeTable {
        // ETIMEDOUT
        timeout: &[110],
        host_not_found: &[],
        // ENETUNREACH, EHOSTUNREACH
        unreachable: &[101, 113],
        // EACCES, EPERM
        permission: &[13, 1],
        // ECONNREFUSED, ECONNRESET, ECONNABORTED, ENOTCONN, EADDRINUSE, EADDRNOTAVAIL, EPIPE
        unmapped: &[111, 104, 103, 107, 98, 99, 32],
    };
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
mod os_codes {
    pub(super) const TABLE: super::OsCodeTable = super::OsCodeTable {
        timeout: &[60],
        host_not_found: &[],
        unreachable: &[51, 65],
        permission: &[13, 1],
        unmapped: &[61, 54, 53, 57, 48, 49, 32],
    };
}

#[cfg(windows)]
mod os_codes {
    pub(super) const TABLE: super::OsCodeTable = super::OsCodeTable {
        // WSAETIMEDOUT
        timeout: &[10060],
        // WSAHOST_NOT_FOUND, WSATRY_AGAIN, WSANO_DATA
        host_not_found: &[11001, 11002, 11004],
        // WSAENETUNREACH, WSAEHOSTUNREACH
        unreachable: &[10051, 10065],
        // WSAEACCES
        permission: &[10013],
        unmapped: &[10061, 10054, 10053, 10057, 10048, 10049],
    };
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    windows
)))]
mod os_codes {
    pub(super) const TABLE: super::OsCodeTable = super::OsCodeTable {
        timeout: &[],
        host_not_found: &[],
        unreachable: &[],
        permission: &[],
        unmapped: &[],
    };
}
