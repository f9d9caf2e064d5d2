//! Error type shared by every kernel interrogation in the crate.
//!
//! Failures come in two shapes: a native system error carrying the
//! platform errno, and "the platform has no way to answer this query".
//! Degraded-but-successful results (absent ARP entry, unsupported
//! resource kind) are not errors; they surface as typed sentinels in the
//! data model so callers never have to probe numeric ranges.

use std::fmt;
use std::io;

/// Result alias used throughout the crate.
pub type SysResult<T> = Result<T, SysError>;

/// Errno substituted for an `io::Error` that carries no native code (EIO).
const FALLBACK_ERRNO: i32 = 5;

/// Failure of a kernel interrogation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysError {
    /// Native system error, identified by the platform errno.
    Sys(i32),
    /// The platform exposes no implementation for this query.
    NotImplemented,
}

impl SysError {
    /// Captures the calling thread's last OS error.
    pub fn last_os() -> Self {
        SysError::Sys(io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    /// Native errno, if this is a system error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            SysError::Sys(code) => Some(*code),
            SysError::NotImplemented => None,
        }
    }
}

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysError::Sys(code) => {
                write!(f, "{} (errno {})", io::Error::from_raw_os_error(*code), code)
            }
            SysError::NotImplemented => {
                write!(f, "this function has not been implemented on this platform")
            }
        }
    }
}

impl std::error::Error for SysError {}

impl From<io::Error> for SysError {
    fn from(e: io::Error) -> Self {
        SysError::Sys(e.raw_os_error().unwrap_or(FALLBACK_ERRNO))
    }
}
