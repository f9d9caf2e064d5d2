//! `HostResolver` backed by the platform resolver.
//!
//! Uses the classic non-reentrant lookup calls; results are copied out
//! immediately. Not safe to call concurrently with other users of the
//! same libc resolver state, which matches the crate's single-threaded
//! session model.

use std::ffi::{CStr, CString};
use std::net::Ipv4Addr;

use crate::error::{SysError, SysResult};
use crate::net::fqdn::{HostEntry, HostResolver};

const HOSTNAME_MAX: usize = 256;

// classic resolver entry points, not exported by the libc crate
unsafe extern "C" {
    fn gethostbyname(name: *const libc::c_char) -> *mut libc::hostent;
    fn gethostbyaddr(
        addr: *const libc::c_void,
        len: libc::socklen_t,
        family: libc::c_int,
    ) -> *mut libc::hostent;
}

/// Platform hostname/DNS resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

unsafe fn entry_from_hostent(h: *const libc::hostent) -> HostEntry {
    let mut entry = HostEntry::default();
    unsafe {
        if (*h).h_name.is_null() {
            return entry;
        }
        entry.canonical = CStr::from_ptr((*h).h_name).to_string_lossy().into_owned();

        let mut alias = (*h).h_aliases;
        if !alias.is_null() {
            while !(*alias).is_null() {
                entry
                    .aliases
                    .push(CStr::from_ptr(*alias).to_string_lossy().into_owned());
                alias = alias.add(1);
            }
        }

        if (*h).h_addrtype == libc::AF_INET && (*h).h_length == 4 {
            let mut addr = (*h).h_addr_list;
            if !addr.is_null() {
                while !(*addr).is_null() {
                    let octets = *(*addr as *const [u8; 4]);
                    entry.addresses.push(Ipv4Addr::from(octets));
                    addr = addr.add(1);
                }
            }
        }
    }
    entry
}

impl HostResolver for SystemResolver {
    fn local_hostname(&self) -> SysResult<String> {
        let mut buf = [0u8; HOSTNAME_MAX];
        let rc = unsafe {
            libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len() - 1)
        };
        if rc != 0 {
            return Err(SysError::last_os());
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    fn lookup_host(&self, name: &str) -> SysResult<HostEntry> {
        let c_name = CString::new(name).map_err(|_| SysError::Sys(libc::EINVAL))?;
        let h = unsafe { gethostbyname(c_name.as_ptr()) };
        if h.is_null() {
            return Err(SysError::last_os());
        }
        Ok(unsafe { entry_from_hostent(h) })
    }

    fn lookup_address(&self, address: Ipv4Addr) -> SysResult<HostEntry> {
        let octets = address.octets();
        let h = unsafe {
            gethostbyaddr(
                octets.as_ptr() as *const libc::c_void,
                octets.len() as libc::socklen_t,
                libc::AF_INET,
            )
        };
        if h.is_null() {
            return Err(SysError::last_os());
        }
        Ok(unsafe { entry_from_hostent(h) })
    }

    fn local_domain(&self) -> SysResult<String> {
        let mut buf = [0u8; HOSTNAME_MAX];
        let rc = unsafe {
            // length parameter type differs across libcs
            libc::getdomainname(buf.as_mut_ptr() as *mut libc::c_char, (buf.len() - 1) as _)
        };
        if rc != 0 {
            return Err(SysError::last_os());
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }
}
