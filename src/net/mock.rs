//! Mock kernel and resolver for tests and doctests.
//!
//! Mirrors the fixture style of the filesystem mocks: scenario
//! constructors for the common shapes, builder methods for the odd ones.

use std::cell::Cell;
use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::error::{SysError, SysResult};
use crate::net::config::{HardwareAddr, InterfaceFlags};
use crate::net::fqdn::{HostEntry, HostResolver};
use crate::net::kernel::{HwAddrCapabilities, NetKernel, OVERFLOW_ERRNO};
use crate::net::record;

const ENODEV: i32 = 19;
const LOOKUP_FAILED: i32 = 2;

/// One scripted interface.
#[derive(Debug, Clone)]
pub struct MockInterface {
    pub name: String,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub flags: InterfaceFlags,
    pub mtu: u64,
    pub metric: u64,
    pub hwaddr: HardwareAddr,
}

impl MockInterface {
    /// Standard loopback interface.
    pub fn loopback() -> Self {
        let addr = Ipv4Addr::new(127, 0, 0, 1);
        Self {
            name: "lo".to_string(),
            address: addr,
            netmask: Ipv4Addr::new(255, 0, 0, 0),
            broadcast: Ipv4Addr::UNSPECIFIED,
            destination: addr,
            flags: InterfaceFlags::UP | InterfaceFlags::LOOPBACK | InterfaceFlags::RUNNING,
            mtu: 65536,
            metric: 0,
            hwaddr: HardwareAddr::NULL,
        }
    }

    /// Ethernet-style interface.
    pub fn ethernet(name: &str, address: Ipv4Addr, hwaddr: HardwareAddr) -> Self {
        let octets = address.octets();
        Self {
            name: name.to_string(),
            address,
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            broadcast: Ipv4Addr::new(octets[0], octets[1], octets[2], 255),
            destination: address,
            flags: InterfaceFlags::UP
                | InterfaceFlags::BROADCAST
                | InterfaceFlags::RUNNING
                | InterfaceFlags::MULTICAST,
            mtu: 1500,
            metric: 0,
            hwaddr,
        }
    }
}

/// How the mock kernel reports an enumeration buffer that is too small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowMode {
    /// Fill as many whole records as fit and report success.
    Truncate,
    /// Report the overflow errno.
    Signal,
}

/// Scripted `NetKernel`.
#[derive(Debug)]
pub struct MockKernel {
    interfaces: Vec<MockInterface>,
    overflow: OverflowMode,
    caps: HwAddrCapabilities,
    link_records: bool,
    conf_error: Option<i32>,
    shrink_after_first_call: Option<usize>,
    address_errors: HashMap<String, i32>,
    arp: HashMap<Ipv4Addr, HardwareAddr>,
    conf_calls: Cell<usize>,
}

impl MockKernel {
    /// Empty kernel with direct hardware-address capability.
    pub fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            overflow: OverflowMode::Truncate,
            caps: HwAddrCapabilities {
                direct_query: true,
                link_records: false,
            },
            link_records: false,
            conf_error: None,
            shrink_after_first_call: None,
            address_errors: HashMap::new(),
            arp: HashMap::new(),
            conf_calls: Cell::new(0),
        }
    }

    /// Loopback plus one ethernet interface at 10.0.0.5.
    pub fn typical_host() -> Self {
        let mut kernel = Self::new();
        kernel.interfaces.push(MockInterface::loopback());
        kernel.interfaces.push(MockInterface::ethernet(
            "eth0",
            Ipv4Addr::new(10, 0, 0, 5),
            HardwareAddr::from([0x00, 0x16, 0x3E, 0xAA, 0xBB, 0xCC]),
        ));
        kernel
    }

    /// Only the loopback interface.
    pub fn loopback_only() -> Self {
        let mut kernel = Self::new();
        kernel.interfaces.push(MockInterface::loopback());
        kernel
    }

    /// `count` ethernet interfaces named `mock0..mockN`.
    pub fn with_interface_count(count: usize) -> Self {
        let mut kernel = Self::new();
        for i in 0..count {
            kernel.interfaces.push(MockInterface::ethernet(
                &format!("mock{i}"),
                Ipv4Addr::new(10, 1, (i / 250) as u8, (i % 250) as u8),
                HardwareAddr::from([0x02, 0, 0, 0, 0, i as u8]),
            ));
        }
        kernel
    }

    pub fn add_interface(mut self, interface: MockInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn overflow_mode(mut self, mode: OverflowMode) -> Self {
        self.overflow = mode;
        self
    }

    /// Makes every enumeration call fail with `errno`.
    pub fn conf_error(mut self, errno: i32) -> Self {
        self.conf_error = Some(errno);
        self
    }

    /// Emits a link-layer record per interface alongside the IPv4 one,
    /// the way BSD-style kernels do.
    pub fn emit_link_records(mut self) -> Self {
        self.link_records = true;
        self
    }

    /// After the first enumeration call, reports only the first `count`
    /// interfaces, as if the rest were removed mid-protocol.
    pub fn shrink_after_first_call(mut self, count: usize) -> Self {
        self.shrink_after_first_call = Some(count);
        self
    }

    pub fn capabilities_mask(mut self, caps: HwAddrCapabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Makes the address query for `name` fail with `errno`.
    pub fn address_error(mut self, name: &str, errno: i32) -> Self {
        self.address_errors.insert(name.to_string(), errno);
        self
    }

    /// Adds a neighbor-table entry.
    pub fn arp_entry(mut self, address: Ipv4Addr, hwaddr: HardwareAddr) -> Self {
        self.arp.insert(address, hwaddr);
        self
    }

    /// Number of enumeration attempts seen so far.
    pub fn conf_calls(&self) -> usize {
        self.conf_calls.get()
    }

    fn find(&self, name: &str) -> SysResult<&MockInterface> {
        self.interfaces
            .iter()
            .find(|i| i.name == name)
            .ok_or(SysError::Sys(ENODEV))
    }

    fn encode_records(&self) -> Vec<u8> {
        let mut visible: &[MockInterface] = &self.interfaces;
        if let Some(count) = self.shrink_after_first_call {
            if self.conf_calls.get() > 1 && count < visible.len() {
                visible = &visible[..count];
            }
        }
        let mut out = Vec::new();
        let mut rec = vec![0u8; record::RECORD_LEN];
        for interface in visible {
            record::encode_into(
                &mut rec,
                &interface.name,
                record::FAMILY_INET,
                &interface.address.octets(),
            );
            out.extend_from_slice(&rec);
            if self.link_records {
                record::encode_into(
                    &mut rec,
                    &interface.name,
                    record::FAMILY_LINK,
                    &interface.hwaddr.octets(),
                );
                out.extend_from_slice(&rec);
            }
        }
        out
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl NetKernel for MockKernel {
    fn interface_conf(&self, buf: &mut [u8]) -> SysResult<usize> {
        self.conf_calls.set(self.conf_calls.get() + 1);
        if let Some(errno) = self.conf_error {
            return Err(SysError::Sys(errno));
        }

        let records = self.encode_records();
        if records.len() > buf.len() {
            match self.overflow {
                OverflowMode::Signal => return Err(SysError::Sys(OVERFLOW_ERRNO)),
                OverflowMode::Truncate => {
                    let fit = buf.len() / record::RECORD_LEN * record::RECORD_LEN;
                    buf[..fit].copy_from_slice(&records[..fit]);
                    return Ok(fit);
                }
            }
        }
        buf[..records.len()].copy_from_slice(&records);
        Ok(records.len())
    }

    fn interface_address(&self, name: &str) -> SysResult<Ipv4Addr> {
        if let Some(&errno) = self.address_errors.get(name) {
            return Err(SysError::Sys(errno));
        }
        Ok(self.find(name)?.address)
    }

    fn interface_netmask(&self, name: &str) -> SysResult<Ipv4Addr> {
        Ok(self.find(name)?.netmask)
    }

    fn interface_flags(&self, name: &str) -> SysResult<InterfaceFlags> {
        Ok(self.find(name)?.flags)
    }

    fn interface_destination(&self, name: &str) -> SysResult<Ipv4Addr> {
        Ok(self.find(name)?.destination)
    }

    fn interface_broadcast(&self, name: &str) -> SysResult<Ipv4Addr> {
        Ok(self.find(name)?.broadcast)
    }

    fn interface_mtu(&self, name: &str) -> SysResult<u64> {
        Ok(self.find(name)?.mtu)
    }

    fn interface_metric(&self, name: &str) -> SysResult<u64> {
        Ok(self.find(name)?.metric)
    }

    fn hardware_address(&self, name: &str) -> SysResult<HardwareAddr> {
        if !self.caps.direct_query {
            return Err(SysError::NotImplemented);
        }
        Ok(self.find(name)?.hwaddr)
    }

    fn arp_lookup(&self, address: Ipv4Addr) -> SysResult<HardwareAddr> {
        // absent entries degrade to the null address
        Ok(self.arp.get(&address).copied().unwrap_or(HardwareAddr::NULL))
    }

    fn capabilities(&self) -> HwAddrCapabilities {
        self.caps
    }
}

/// Scripted `HostResolver`.
#[derive(Debug, Clone)]
pub struct MockResolver {
    hostname: Result<String, i32>,
    forward: HashMap<String, HostEntry>,
    reverse: HashMap<Ipv4Addr, HostEntry>,
    domain: Option<String>,
}

impl MockResolver {
    /// Resolver that knows the short hostname and nothing else.
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: Ok(hostname.to_string()),
            forward: HashMap::new(),
            reverse: HashMap::new(),
            domain: None,
        }
    }

    /// Makes the hostname query itself fail with `errno`.
    pub fn hostname_error(mut self, errno: i32) -> Self {
        self.hostname = Err(errno);
        self
    }

    pub fn with_forward(mut self, name: &str, entry: HostEntry) -> Self {
        self.forward.insert(name.to_string(), entry);
        self
    }

    pub fn with_reverse(mut self, address: Ipv4Addr, entry: HostEntry) -> Self {
        self.reverse.insert(address, entry);
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }
}

impl HostResolver for MockResolver {
    fn local_hostname(&self) -> SysResult<String> {
        self.hostname.clone().map_err(SysError::Sys)
    }

    fn lookup_host(&self, name: &str) -> SysResult<HostEntry> {
        self.forward
            .get(name)
            .cloned()
            .ok_or(SysError::Sys(LOOKUP_FAILED))
    }

    fn lookup_address(&self, address: Ipv4Addr) -> SysResult<HostEntry> {
        self.reverse
            .get(&address)
            .cloned()
            .ok_or(SysError::Sys(LOOKUP_FAILED))
    }

    fn local_domain(&self) -> SysResult<String> {
        self.domain.clone().ok_or(SysError::NotImplemented)
    }
}
