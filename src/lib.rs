//! hostfacts — point-in-time host facts through OS-independent types.
//!
//! Provides:
//! - `collection` — append-only collections with chunked capacity growth
//! - `net` — interface enumeration, per-interface configuration, FQDN
//!   derivation
//! - `who` — logged-in sessions from the login-accounting file
//! - `rlimit` — process resource limits
//! - `fs` — filesystem access seam and filesystem-kind classification
//! - `error` — shared error taxonomy
//!
//! Every query is a one-shot synchronous snapshot against a kernel seam
//! (`NetKernel`, `HostResolver`, `FileSystem`, `LimitSource`); real
//! implementations are provided on Unix and mock fixtures everywhere,
//! so monitoring callers get identical accessor semantics regardless of
//! the underlying kernel.
//!
//! # Example
//!
//! ```
//! use hostfacts::net::mock::MockKernel;
//! use hostfacts::net::NetCollector;
//!
//! let mut net = NetCollector::new(MockKernel::typical_host());
//! let names = net.interface_list().unwrap();
//! for name in names.iter() {
//!     let config = net.interface_config(name).unwrap();
//!     println!("{}: {} [{}]", config.name, config.address, config.flags);
//! }
//! ```

pub mod collection;
pub mod error;
pub mod fs;
pub mod net;
pub mod rlimit;
pub mod who;

pub use collection::GrowableCollection;
pub use error::{SysError, SysResult};
pub use fs::{FileSystem, FsCategory, MemFs, RealFs};
pub use net::{
    FqdnResolver, HardwareAddr, HostEntry, HostResolver, InterfaceFlags, NetCollector, NetKernel,
    NetworkInterfaceConfig,
};
pub use rlimit::{LimitPair, LimitValue, ResourceKind, ResourceLimits};
pub use who::{WhoCollector, WhoEntry};
