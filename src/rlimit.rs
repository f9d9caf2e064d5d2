//! Process resource limits.
//!
//! A fixed table maps abstract resource kinds to native limit
//! identifiers. Kinds the platform does not support report a
//! not-implemented sentinel, never an error, so callers can render a
//! complete table on any platform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SysResult;

/// Abstract resource kinds, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Cpu,
    FileSize,
    Data,
    Stack,
    Core,
    Memory,
    Processes,
    OpenFiles,
    VirtualMemory,
}

impl ResourceKind {
    /// Every kind, in table order.
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Cpu,
        ResourceKind::FileSize,
        ResourceKind::Data,
        ResourceKind::Stack,
        ResourceKind::Core,
        ResourceKind::Memory,
        ResourceKind::Processes,
        ResourceKind::OpenFiles,
        ResourceKind::VirtualMemory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::FileSize => "file_size",
            ResourceKind::Data => "data",
            ResourceKind::Stack => "stack",
            ResourceKind::Core => "core",
            ResourceKind::Memory => "memory",
            ResourceKind::Processes => "processes",
            ResourceKind::OpenFiles => "open_files",
            ResourceKind::VirtualMemory => "virtual_memory",
        }
    }
}

/// One limit value; `NotImplemented` is a sentinel, distinct from zero
/// and from "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitValue {
    Value(u64),
    Unlimited,
    NotImplemented,
}

impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitValue::Value(v) => write!(f, "{v}"),
            LimitValue::Unlimited => f.write_str("unlimited"),
            LimitValue::NotImplemented => f.write_str("-"),
        }
    }
}

/// Soft and hard limit for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPair {
    pub current: LimitValue,
    pub maximum: LimitValue,
}

impl LimitPair {
    /// Sentinel pair for unsupported kinds.
    pub const NOT_IMPLEMENTED: LimitPair = LimitPair {
        current: LimitValue::NotImplemented,
        maximum: LimitValue::NotImplemented,
    };
}

/// Seam over the native limit query, mockable in tests.
pub trait LimitSource {
    /// Limit pair for one kind; an error means the kind is unsupported
    /// on this platform.
    fn limit(&self, kind: ResourceKind) -> SysResult<LimitPair>;
}

/// Point-in-time snapshot of every resource limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub cpu: LimitPair,
    pub file_size: LimitPair,
    pub data: LimitPair,
    pub stack: LimitPair,
    pub core: LimitPair,
    pub memory: LimitPair,
    pub processes: LimitPair,
    pub open_files: LimitPair,
    pub virtual_memory: LimitPair,
}

impl ResourceLimits {
    /// Walks the resource table, degrading unsupported kinds to the
    /// not-implemented sentinel.
    pub fn collect<S: LimitSource>(source: &S) -> Self {
        let get = |kind| source.limit(kind).unwrap_or(LimitPair::NOT_IMPLEMENTED);
        Self {
            cpu: get(ResourceKind::Cpu),
            file_size: get(ResourceKind::FileSize),
            data: get(ResourceKind::Data),
            stack: get(ResourceKind::Stack),
            core: get(ResourceKind::Core),
            memory: get(ResourceKind::Memory),
            processes: get(ResourceKind::Processes),
            open_files: get(ResourceKind::OpenFiles),
            virtual_memory: get(ResourceKind::VirtualMemory),
        }
    }

    /// Limit pair for one kind.
    pub fn get(&self, kind: ResourceKind) -> LimitPair {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::FileSize => self.file_size,
            ResourceKind::Data => self.data,
            ResourceKind::Stack => self.stack,
            ResourceKind::Core => self.core,
            ResourceKind::Memory => self.memory,
            ResourceKind::Processes => self.processes,
            ResourceKind::OpenFiles => self.open_files,
            ResourceKind::VirtualMemory => self.virtual_memory,
        }
    }
}

#[cfg(unix)]
pub use self::sys::KernelLimits;

#[cfg(unix)]
mod sys {
    use super::*;
    use crate::error::SysError;

    /// `LimitSource` backed by the native getrlimit call.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct KernelLimits;

    impl KernelLimits {
        pub fn new() -> Self {
            Self
        }
    }

    fn convert(raw: libc::rlim_t) -> LimitValue {
        if raw == libc::RLIM_INFINITY {
            LimitValue::Unlimited
        } else {
            LimitValue::Value(raw as u64)
        }
    }

    impl LimitSource for KernelLimits {
        fn limit(&self, kind: ResourceKind) -> SysResult<LimitPair> {
            let resource = match kind {
                ResourceKind::Cpu => libc::RLIMIT_CPU,
                ResourceKind::FileSize => libc::RLIMIT_FSIZE,
                ResourceKind::Data => libc::RLIMIT_DATA,
                ResourceKind::Stack => libc::RLIMIT_STACK,
                ResourceKind::Core => libc::RLIMIT_CORE,
                ResourceKind::Memory => libc::RLIMIT_RSS,
                ResourceKind::Processes => libc::RLIMIT_NPROC,
                ResourceKind::OpenFiles => libc::RLIMIT_NOFILE,
                ResourceKind::VirtualMemory => libc::RLIMIT_AS,
            };
            let mut rl = libc::rlimit {
                rlim_cur: 0,
                rlim_max: 0,
            };
            let rc = unsafe { libc::getrlimit(resource, &mut rl) };
            if rc != 0 {
                return Err(SysError::last_os());
            }
            Ok(LimitPair {
                current: convert(rl.rlim_cur),
                maximum: convert(rl.rlim_max),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SysError;

    struct MockLimits;

    impl LimitSource for MockLimits {
        fn limit(&self, kind: ResourceKind) -> SysResult<LimitPair> {
            match kind {
                ResourceKind::OpenFiles => Ok(LimitPair {
                    current: LimitValue::Value(1024),
                    maximum: LimitValue::Value(4096),
                }),
                ResourceKind::Cpu => Ok(LimitPair {
                    current: LimitValue::Unlimited,
                    maximum: LimitValue::Unlimited,
                }),
                // pretend this platform has no RSS limit
                ResourceKind::Memory => Err(SysError::NotImplemented),
                _ => Ok(LimitPair {
                    current: LimitValue::Value(0),
                    maximum: LimitValue::Value(0),
                }),
            }
        }
    }

    #[test]
    fn test_collect_walks_the_whole_table() {
        let limits = ResourceLimits::collect(&MockLimits);
        assert_eq!(limits.open_files.current, LimitValue::Value(1024));
        assert_eq!(limits.open_files.maximum, LimitValue::Value(4096));
        assert_eq!(limits.cpu.current, LimitValue::Unlimited);
    }

    #[test]
    fn test_unsupported_kind_reports_sentinel_not_error() {
        let limits = ResourceLimits::collect(&MockLimits);
        assert_eq!(limits.memory, LimitPair::NOT_IMPLEMENTED);
        assert_eq!(limits.memory.current.to_string(), "-");
    }

    #[test]
    fn test_get_matches_fields() {
        let limits = ResourceLimits::collect(&MockLimits);
        for kind in ResourceKind::ALL {
            let _ = limits.get(kind); // every kind is addressable
        }
        assert_eq!(
            limits.get(ResourceKind::OpenFiles).current,
            LimitValue::Value(1024)
        );
    }

    #[test]
    fn test_limit_value_display() {
        assert_eq!(LimitValue::Value(42).to_string(), "42");
        assert_eq!(LimitValue::Unlimited.to_string(), "unlimited");
        assert_eq!(LimitValue::NotImplemented.to_string(), "-");
    }

    #[cfg(unix)]
    #[test]
    fn test_kernel_limits_report_open_files() {
        let limits = ResourceLimits::collect(&KernelLimits::new());
        // every process has some file-descriptor limit
        assert_ne!(limits.open_files.current, LimitValue::NotImplemented);
    }
}
