//! Kernel seam for network interrogation.
//!
//! `NetKernel` abstracts the one-shot kernel queries the collectors are
//! built on, so the enumeration and resolution protocols can run against
//! either the real kernel or [`crate::net::mock::MockKernel`] fixtures.

use std::net::Ipv4Addr;

use crate::error::SysResult;
use crate::net::config::{HardwareAddr, InterfaceFlags};
use crate::net::record;

/// Errno the kernel uses to signal that the enumeration buffer was too
/// small; distinct from "no more data".
#[cfg(unix)]
pub(crate) const OVERFLOW_ERRNO: i32 = libc::EINVAL;
#[cfg(not(unix))]
pub(crate) const OVERFLOW_ERRNO: i32 = 22;

/// Hardware-address lookup paths the platform exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HwAddrCapabilities {
    /// A native per-interface hardware-address query exists.
    pub direct_query: bool,
    /// Link-layer records appear in the enumeration buffer.
    pub link_records: bool,
}

/// One-shot kernel queries underlying the network collectors.
///
/// Every method is a synchronous snapshot; implementations must not
/// retain state between calls beyond what the kernel itself holds.
pub trait NetKernel {
    /// Fills `buf` with fixed-size enumeration records and returns the
    /// number of bytes written. A buffer-too-small condition is reported
    /// as `SysError::Sys(EINVAL)`; callers drive the adaptive retry.
    fn interface_conf(&self, buf: &mut [u8]) -> SysResult<usize>;

    /// Address family accepted when partitioning the enumeration buffer
    /// into interface names.
    fn list_family(&self) -> u16 {
        record::FAMILY_INET
    }

    fn interface_address(&self, name: &str) -> SysResult<Ipv4Addr>;

    fn interface_netmask(&self, name: &str) -> SysResult<Ipv4Addr>;

    fn interface_flags(&self, name: &str) -> SysResult<InterfaceFlags>;

    fn interface_destination(&self, name: &str) -> SysResult<Ipv4Addr>;

    fn interface_broadcast(&self, name: &str) -> SysResult<Ipv4Addr>;

    fn interface_mtu(&self, name: &str) -> SysResult<u64>;

    fn interface_metric(&self, name: &str) -> SysResult<u64>;

    /// Direct hardware-address query, where the platform has one.
    fn hardware_address(&self, name: &str) -> SysResult<HardwareAddr>;

    /// Neighbor/ARP-table lookup by IP address.
    fn arp_lookup(&self, address: Ipv4Addr) -> SysResult<HardwareAddr>;

    /// Which hardware-address lookup paths this kernel supports.
    fn capabilities(&self) -> HwAddrCapabilities;
}

#[cfg(unix)]
pub use self::real::RealKernel;

#[cfg(unix)]
mod real {
    use super::*;
    use crate::error::SysError;

    /// `NetKernel` backed by the platform's ioctl interface.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RealKernel;

    impl RealKernel {
        pub fn new() -> Self {
            Self
        }
    }

    /// Datagram socket released on every exit path.
    struct Socket(libc::c_int);

    impl Socket {
        fn dgram() -> SysResult<Self> {
            let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
            if fd < 0 {
                return Err(SysError::last_os());
            }
            Ok(Socket(fd))
        }
    }

    impl Drop for Socket {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.0);
            }
        }
    }

    fn ifreq_for(name: &str) -> SysResult<libc::ifreq> {
        let bytes = name.as_bytes();
        if bytes.len() >= record::NAME_LEN {
            return Err(SysError::Sys(libc::ENAMETOOLONG));
        }
        let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
        for (dst, src) in ifr.ifr_name.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }
        Ok(ifr)
    }

    fn query(name: &str, request: libc::c_ulong) -> SysResult<libc::ifreq> {
        let sock = Socket::dgram()?;
        let mut ifr = ifreq_for(name)?;
        let rc = unsafe { libc::ioctl(sock.0, request as _, &mut ifr) };
        if rc < 0 {
            return Err(SysError::last_os());
        }
        Ok(ifr)
    }

    fn sockaddr_v4(sa: &libc::sockaddr) -> Ipv4Addr {
        let sin = unsafe { &*(sa as *const libc::sockaddr as *const libc::sockaddr_in) };
        Ipv4Addr::from(sin.sin_addr.s_addr.to_ne_bytes())
    }

    fn translate_flags(native: i64) -> InterfaceFlags {
        let pairs: [(i64, InterfaceFlags); 10] = [
            (libc::IFF_UP as i64, InterfaceFlags::UP),
            (libc::IFF_BROADCAST as i64, InterfaceFlags::BROADCAST),
            (libc::IFF_DEBUG as i64, InterfaceFlags::DEBUG),
            (libc::IFF_LOOPBACK as i64, InterfaceFlags::LOOPBACK),
            (libc::IFF_POINTOPOINT as i64, InterfaceFlags::POINTOPOINT),
            (libc::IFF_RUNNING as i64, InterfaceFlags::RUNNING),
            (libc::IFF_NOARP as i64, InterfaceFlags::NOARP),
            (libc::IFF_PROMISC as i64, InterfaceFlags::PROMISC),
            (libc::IFF_ALLMULTI as i64, InterfaceFlags::ALLMULTI),
            (libc::IFF_MULTICAST as i64, InterfaceFlags::MULTICAST),
        ];
        let mut flags = InterfaceFlags::default();
        for (bit, flag) in pairs {
            if native & bit != 0 {
                flags |= flag;
            }
        }
        flags
    }

    impl NetKernel for RealKernel {
        fn interface_conf(&self, buf: &mut [u8]) -> SysResult<usize> {
            let sock = Socket::dgram()?;
            let mut ifc: libc::ifconf = unsafe { std::mem::zeroed() };
            ifc.ifc_len = buf.len() as libc::c_int;
            ifc.ifc_ifcu.ifcu_buf = buf.as_mut_ptr() as *mut libc::c_char;

            let rc = unsafe { libc::ioctl(sock.0, libc::SIOCGIFCONF as _, &mut ifc) };
            if rc < 0 {
                return Err(SysError::last_os());
            }
            Ok(ifc.ifc_len as usize)
        }

        fn interface_address(&self, name: &str) -> SysResult<Ipv4Addr> {
            let ifr = query(name, libc::SIOCGIFADDR as libc::c_ulong)?;
            Ok(sockaddr_v4(unsafe { &ifr.ifr_ifru.ifru_addr }))
        }

        fn interface_netmask(&self, name: &str) -> SysResult<Ipv4Addr> {
            let ifr = query(name, libc::SIOCGIFNETMASK as libc::c_ulong)?;
            Ok(sockaddr_v4(unsafe { &ifr.ifr_ifru.ifru_addr }))
        }

        fn interface_flags(&self, name: &str) -> SysResult<InterfaceFlags> {
            let ifr = query(name, libc::SIOCGIFFLAGS as libc::c_ulong)?;
            Ok(translate_flags(unsafe { ifr.ifr_ifru.ifru_flags } as i64))
        }

        fn interface_destination(&self, name: &str) -> SysResult<Ipv4Addr> {
            let ifr = query(name, libc::SIOCGIFDSTADDR as libc::c_ulong)?;
            Ok(sockaddr_v4(unsafe { &ifr.ifr_ifru.ifru_addr }))
        }

        fn interface_broadcast(&self, name: &str) -> SysResult<Ipv4Addr> {
            let ifr = query(name, libc::SIOCGIFBRDADDR as libc::c_ulong)?;
            Ok(sockaddr_v4(unsafe { &ifr.ifr_ifru.ifru_addr }))
        }

        fn interface_mtu(&self, name: &str) -> SysResult<u64> {
            let ifr = query(name, libc::SIOCGIFMTU as libc::c_ulong)?;
            Ok(unsafe { ifr.ifr_ifru.ifru_mtu } as u64)
        }

        fn interface_metric(&self, name: &str) -> SysResult<u64> {
            let ifr = query(name, libc::SIOCGIFMETRIC as libc::c_ulong)?;
            Ok(unsafe { ifr.ifr_ifru.ifru_metric }.max(0) as u64)
        }

        #[cfg(any(target_os = "linux", target_os = "android"))]
        fn hardware_address(&self, name: &str) -> SysResult<HardwareAddr> {
            let ifr = query(name, libc::SIOCGIFHWADDR as libc::c_ulong)?;
            let sa = unsafe { &ifr.ifr_ifru.ifru_hwaddr };
            let mut octets = [0u8; 6];
            for (dst, src) in octets.iter_mut().zip(sa.sa_data.iter()) {
                *dst = *src as u8;
            }
            Ok(HardwareAddr::from(octets))
        }

        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        fn hardware_address(&self, _name: &str) -> SysResult<HardwareAddr> {
            Err(SysError::NotImplemented)
        }

        #[cfg(any(target_os = "linux", target_os = "android"))]
        fn arp_lookup(&self, address: Ipv4Addr) -> SysResult<HardwareAddr> {
            let sock = Socket::dgram()?;
            let mut areq: libc::arpreq = unsafe { std::mem::zeroed() };
            let pa = unsafe {
                &mut *(&mut areq.arp_pa as *mut libc::sockaddr as *mut libc::sockaddr_in)
            };
            pa.sin_family = libc::AF_INET as libc::sa_family_t;
            pa.sin_addr.s_addr = u32::from_ne_bytes(address.octets());

            let rc = unsafe { libc::ioctl(sock.0, libc::SIOCGARP as _, &mut areq) };
            if rc < 0 {
                // absent neighbor entries degrade to the null address
                return Ok(HardwareAddr::NULL);
            }
            let mut octets = [0u8; 6];
            for (dst, src) in octets.iter_mut().zip(areq.arp_ha.sa_data.iter()) {
                *dst = *src as u8;
            }
            Ok(HardwareAddr::from(octets))
        }

        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        fn arp_lookup(&self, _address: Ipv4Addr) -> SysResult<HardwareAddr> {
            Err(SysError::NotImplemented)
        }

        fn capabilities(&self) -> HwAddrCapabilities {
            HwAddrCapabilities {
                direct_query: cfg!(any(target_os = "linux", target_os = "android")),
                // BSD-style kernels expose AF_LINK records in the
                // enumeration buffer instead
                link_records: cfg!(not(any(target_os = "linux", target_os = "android"))),
            }
        }
    }
}
