//! Per-interface configuration resolution.
//!
//! Given one interface name, gathers address, netmask, flags,
//! broadcast/destination, MTU, metric and hardware address into a
//! [`NetworkInterfaceConfig`]. Only the address lookup is mandatory;
//! everything else degrades to a zero default. The hardware address is
//! resolved by exactly one of three strategies, selected once from the
//! kernel's capabilities.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::SysResult;
use crate::net::enumerate::IfconfBuffer;
use crate::net::kernel::{HwAddrCapabilities, NetKernel};
use crate::net::record;

/// Six-byte link-layer address.
///
/// Renders as canonical colon-separated uppercase hexadecimal
/// (`"01:AB:00:FF:10:0A"`). The all-zero value stands for "no hardware
/// address" (loopback interfaces, absent neighbor-table entries).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HardwareAddr([u8; 6]);

impl HardwareAddr {
    /// The null (all-zero) address.
    pub const NULL: HardwareAddr = HardwareAddr([0; 6]);

    /// Builds an address from the first six bytes of `bytes`, zero-padding
    /// short input.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut octets = [0u8; 6];
        let n = bytes.len().min(6);
        octets[..n].copy_from_slice(&bytes[..n]);
        HardwareAddr(octets)
    }

    /// `true` for the null address.
    pub fn is_null(&self) -> bool {
        self.0 == [0; 6]
    }

    /// Raw octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for HardwareAddr {
    fn from(octets: [u8; 6]) -> Self {
        HardwareAddr(octets)
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// Error parsing a hardware address from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHardwareAddrError;

impl fmt::Display for ParseHardwareAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected six colon-separated hex octets")
    }
}

impl std::error::Error for ParseHardwareAddrError {}

impl FromStr for HardwareAddr {
    type Err = ParseHardwareAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in &mut octets {
            let part = parts.next().ok_or(ParseHardwareAddrError)?;
            *octet = u8::from_str_radix(part, 16).map_err(|_| ParseHardwareAddrError)?;
        }
        if parts.next().is_some() {
            return Err(ParseHardwareAddrError);
        }
        Ok(HardwareAddr(octets))
    }
}

impl Serialize for HardwareAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardwareAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// OS-independent interface flag bitset.
///
/// Real kernels translate their native flag bits into these values, so
/// callers can test flags without platform conditionals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceFlags(pub u64);

impl InterfaceFlags {
    pub const UP: InterfaceFlags = InterfaceFlags(0x1);
    pub const BROADCAST: InterfaceFlags = InterfaceFlags(0x2);
    pub const DEBUG: InterfaceFlags = InterfaceFlags(0x4);
    pub const LOOPBACK: InterfaceFlags = InterfaceFlags(0x8);
    pub const POINTOPOINT: InterfaceFlags = InterfaceFlags(0x10);
    pub const RUNNING: InterfaceFlags = InterfaceFlags(0x40);
    pub const NOARP: InterfaceFlags = InterfaceFlags(0x80);
    pub const PROMISC: InterfaceFlags = InterfaceFlags(0x100);
    pub const ALLMULTI: InterfaceFlags = InterfaceFlags(0x200);
    pub const MULTICAST: InterfaceFlags = InterfaceFlags(0x800);

    /// `true` if every bit of `other` is set.
    pub fn contains(self, other: InterfaceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if no bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for InterfaceFlags {
    type Output = InterfaceFlags;

    fn bitor(self, rhs: InterfaceFlags) -> InterfaceFlags {
        InterfaceFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for InterfaceFlags {
    fn bitor_assign(&mut self, rhs: InterfaceFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(InterfaceFlags, &str); 10] = [
            (InterfaceFlags::UP, "UP"),
            (InterfaceFlags::BROADCAST, "BROADCAST"),
            (InterfaceFlags::DEBUG, "DEBUG"),
            (InterfaceFlags::LOOPBACK, "LOOPBACK"),
            (InterfaceFlags::POINTOPOINT, "POINTOPOINT"),
            (InterfaceFlags::RUNNING, "RUNNING"),
            (InterfaceFlags::NOARP, "NOARP"),
            (InterfaceFlags::PROMISC, "PROMISC"),
            (InterfaceFlags::ALLMULTI, "ALLMULTI"),
            (InterfaceFlags::MULTICAST, "MULTICAST"),
        ];
        let mut first = true;
        for (flag, label) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(label)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Point-in-time configuration of one network interface.
///
/// Derived transiently per call; never cached. For loopback interfaces
/// the destination mirrors the address, the broadcast is zero and the
/// hardware address is null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceConfig {
    pub name: String,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub hwaddr: HardwareAddr,
    pub flags: InterfaceFlags,
    pub mtu: u64,
    pub metric: u64,
}

impl NetworkInterfaceConfig {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: Ipv4Addr::UNSPECIFIED,
            netmask: Ipv4Addr::UNSPECIFIED,
            broadcast: Ipv4Addr::UNSPECIFIED,
            destination: Ipv4Addr::UNSPECIFIED,
            hwaddr: HardwareAddr::NULL,
            flags: InterfaceFlags::default(),
            mtu: 0,
            metric: 0,
        }
    }
}

/// Hardware-address lookup strategy, selected once per collector from the
/// kernel's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwAddrStrategy {
    /// Native per-interface hardware address query.
    DirectQuery,
    /// Scan of link-layer records in the session enumeration buffer.
    LinkScan,
    /// Neighbor-table lookup by IP address; absent entries yield the
    /// null address instead of failing.
    ArpProbe,
}

impl HwAddrStrategy {
    /// Picks the best available strategy, in priority order.
    pub fn select(caps: HwAddrCapabilities) -> Self {
        if caps.direct_query {
            HwAddrStrategy::DirectQuery
        } else if caps.link_records {
            HwAddrStrategy::LinkScan
        } else {
            HwAddrStrategy::ArpProbe
        }
    }

    /// Resolves the hardware address of a non-loopback interface.
    /// Never fails; anything unresolvable degrades to the null address.
    pub(crate) fn resolve<K: NetKernel>(
        self,
        kernel: &K,
        session: &IfconfBuffer,
        name: &str,
        address: Ipv4Addr,
    ) -> HardwareAddr {
        match self {
            HwAddrStrategy::DirectQuery => {
                kernel.hardware_address(name).unwrap_or(HardwareAddr::NULL)
            }
            HwAddrStrategy::LinkScan => {
                for rec in session.bytes().chunks_exact(record::RECORD_LEN) {
                    if record::family(rec) == record::FAMILY_LINK && record::name(rec) == name {
                        return HardwareAddr::from_bytes(&record::data(rec)[..6]);
                    }
                }
                HardwareAddr::NULL
            }
            HwAddrStrategy::ArpProbe => {
                kernel.arp_lookup(address).unwrap_or(HardwareAddr::NULL)
            }
        }
    }
}

/// Populates a [`NetworkInterfaceConfig`] for `name`.
///
/// The address lookup is mandatory; its failure aborts the whole
/// resolution. Every other field is best-effort.
pub(crate) fn resolve<K: NetKernel>(
    kernel: &K,
    session: &IfconfBuffer,
    strategy: HwAddrStrategy,
    name: &str,
) -> SysResult<NetworkInterfaceConfig> {
    let mut config = NetworkInterfaceConfig::empty(name);

    // an interface we cannot address is unusable
    config.address = kernel.interface_address(name).inspect_err(|e| {
        debug!(interface = name, error = %e, "address lookup failed");
    })?;

    if let Ok(netmask) = kernel.interface_netmask(name) {
        config.netmask = netmask;
    }
    if let Ok(flags) = kernel.interface_flags(name) {
        config.flags = flags;
    }

    if config.flags.contains(InterfaceFlags::LOOPBACK) {
        config.destination = config.address;
        config.broadcast = Ipv4Addr::UNSPECIFIED;
        config.hwaddr = HardwareAddr::NULL;
    } else {
        if let Ok(destination) = kernel.interface_destination(name) {
            config.destination = destination;
        }
        if let Ok(broadcast) = kernel.interface_broadcast(name) {
            config.broadcast = broadcast;
        }
        config.hwaddr = strategy.resolve(kernel, session, name, config.address);
    }

    if let Ok(mtu) = kernel.interface_mtu(name) {
        config.mtu = mtu;
    }
    if let Ok(metric) = kernel.interface_metric(name) {
        // zero is not a meaningful metric
        config.metric = if metric == 0 { 1 } else { metric };
    }

    Ok(config)
}
