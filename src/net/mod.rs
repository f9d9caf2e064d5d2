//! Network interrogation: interface enumeration, per-interface
//! configuration and FQDN derivation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    NetCollector                      │
//! │  interface_list ──► adaptive-buffer enumeration      │
//! │  interface_config ─► per-name queries + hwaddr       │
//! │                      strategy (direct/link/arp)      │
//! │  session: IfconfBuffer (grows, never shrinks)        │
//! └───────────────────────────┬──────────────────────────┘
//!                             │
//!                      ┌──────▼──────┐
//!                      │  NetKernel  │ (trait)
//!                      └──────┬──────┘
//!              ┌──────────────┴──────────────┐
//!       ┌──────▼──────┐              ┌───────▼──────┐
//!       │ RealKernel  │              │  MockKernel  │
//!       │ (ioctls)    │              │  (fixtures)  │
//!       └─────────────┘              └──────────────┘
//! ```
//!
//! [`FqdnResolver`] sits on top: it combines a [`HostResolver`] with a
//! `NetCollector` for its IP-substitution fallback.

pub mod config;
pub mod connection;
pub mod enumerate;
pub mod fqdn;
pub mod kernel;
pub mod mock;
pub mod record;

pub use config::{
    HardwareAddr, HwAddrStrategy, InterfaceFlags, NetworkInterfaceConfig, ParseHardwareAddrError,
};
pub use connection::{ConnectionProtocol, TcpState};
pub use enumerate::IfconfBuffer;
pub use fqdn::{DOMAIN_UNSET, FqdnResolver, HostEntry, HostResolver, is_fqdn};
pub use kernel::{HwAddrCapabilities, NetKernel};
#[cfg(unix)]
pub use kernel::RealKernel;
#[cfg(unix)]
pub use fqdn_sys::SystemResolver;

use crate::collection::GrowableCollection;
use crate::error::SysResult;

#[cfg(unix)]
mod fqdn_sys;

/// Network fact collector over one kernel seam.
///
/// Owns the session enumeration buffer, so a collector must not be
/// shared between threads mid-call; distinct collectors are fully
/// independent. Every query is a one-shot synchronous snapshot.
pub struct NetCollector<K: NetKernel> {
    kernel: K,
    session: IfconfBuffer,
    strategy: HwAddrStrategy,
}

impl<K: NetKernel> NetCollector<K> {
    /// Creates a collector, selecting the hardware-address strategy from
    /// the kernel's capabilities once.
    pub fn new(kernel: K) -> Self {
        let strategy = HwAddrStrategy::select(kernel.capabilities());
        Self {
            kernel,
            session: IfconfBuffer::default(),
            strategy,
        }
    }

    /// Current interface names, in kernel-reported order.
    pub fn interface_list(&mut self) -> SysResult<GrowableCollection<String>> {
        enumerate::interface_list(&self.kernel, &mut self.session)
    }

    /// Point-in-time configuration of one named interface.
    pub fn interface_config(&mut self, name: &str) -> SysResult<NetworkInterfaceConfig> {
        // the link-table scan reads the enumeration buffer, which is
        // only populated by a list call
        if self.strategy == HwAddrStrategy::LinkScan && self.session.is_empty() {
            self.interface_list()?;
        }
        config::resolve(&self.kernel, &self.session, self.strategy, name)
    }

    /// Strategy chosen at construction.
    pub fn hwaddr_strategy(&self) -> HwAddrStrategy {
        self.strategy
    }

    /// Session buffer, for inspection.
    pub fn session(&self) -> &IfconfBuffer {
        &self.session
    }
}
