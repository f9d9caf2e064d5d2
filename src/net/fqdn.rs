//! Fully-qualified hostname derivation.
//!
//! Best-effort by design: apart from the initial kernel hostname query,
//! every stage is a pure fallback and the resolver always hands back
//! *some* name, degrading to a bare IP address last. A name counts as
//! fully qualified as soon as it contains a dot.

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::error::SysResult;
use crate::net::NetCollector;
use crate::net::config::InterfaceFlags;
use crate::net::kernel::NetKernel;

/// Platform sentinel for "no domain configured".
pub const DOMAIN_UNSET: &str = "(none)";

/// Working definition of "fully qualified".
pub fn is_fqdn(name: &str) -> bool {
    name.contains('.')
}

/// An alias is usable only when it is dotted and actually corresponds to
/// the record's host (prefix match), rather than an unrelated CNAME.
fn alias_match(alias: &str, host: &str) -> bool {
    is_fqdn(alias) && alias.starts_with(host)
}

/// Result of a forward or reverse hostname lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEntry {
    /// Authoritative name returned by the lookup.
    pub canonical: String,
    /// Alternative names, in resolver order.
    pub aliases: Vec<String>,
    /// Addresses associated with the host.
    pub addresses: Vec<Ipv4Addr>,
}

impl HostEntry {
    /// Entry whose canonical name is a bare short name with no aliases
    /// or addresses.
    pub fn bare(name: &str) -> Self {
        Self {
            canonical: name.to_string(),
            ..Self::default()
        }
    }
}

/// Hostname and DNS queries the FQDN derivation is built on.
pub trait HostResolver {
    /// Local short hostname from the kernel.
    fn local_hostname(&self) -> SysResult<String>;

    /// Forward lookup: name to addresses, aliases and canonical name.
    fn lookup_host(&self, name: &str) -> SysResult<HostEntry>;

    /// Reverse lookup: address to name and aliases.
    fn lookup_address(&self, address: Ipv4Addr) -> SysResult<HostEntry>;

    /// Local domain suffix; may be empty or the platform's unset
    /// sentinel.
    fn local_domain(&self) -> SysResult<String>;
}

/// Derives the best available fully-qualified hostname.
///
/// Ordered fallback, first success wins; no stage retries. Only the
/// kernel hostname query can fail the call.
pub struct FqdnResolver<R: HostResolver> {
    resolver: R,
}

impl<R: HostResolver> FqdnResolver<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolves the local machine's fully-qualified hostname.
    ///
    /// The network collector feeds the IP-substitution fallback: when no
    /// dotted name can be derived, the address of the first non-loopback
    /// interface stands in.
    pub fn resolve<K: NetKernel>(&self, net: &mut NetCollector<K>) -> SysResult<String> {
        let short = self.resolver.local_hostname().inspect_err(|e| {
            debug!(error = %e, "kernel hostname query failed");
        })?;
        debug!(hostname = %short, "kernel hostname");

        let entry = match self.resolver.lookup_host(&short) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(hostname = %short, error = %e, "forward lookup failed");
                if is_fqdn(&short) {
                    return Ok(short);
                }
                return Ok(interface_address_fallback(net).unwrap_or(short));
            }
        };

        if is_fqdn(&entry.canonical) {
            debug!(fqdn = %entry.canonical, "resolved from canonical name");
            return Ok(entry.canonical);
        }
        debug!("canonical name is not qualified");

        for alias in &entry.aliases {
            if alias_match(alias, &entry.canonical) {
                debug!(fqdn = %alias, "resolved from forward alias");
                return Ok(alias.clone());
            }
        }
        debug!("no qualified forward alias");

        for &address in &entry.addresses {
            let Ok(reverse) = self.resolver.lookup_address(address) else {
                continue;
            };
            if is_fqdn(&reverse.canonical) {
                debug!(fqdn = %reverse.canonical, "resolved from reverse lookup");
                return Ok(reverse.canonical);
            }
            for alias in &reverse.aliases {
                if alias_match(alias, &reverse.canonical) {
                    debug!(fqdn = %alias, "resolved from reverse alias");
                    return Ok(alias.clone());
                }
            }
        }
        debug!("no qualified reverse result");

        if !is_fqdn(&short) {
            match self.resolver.local_domain() {
                Ok(domain) if !domain.is_empty() && domain != DOMAIN_UNSET => {
                    let qualified = format!("{short}.{domain}");
                    debug!(fqdn = %qualified, "resolved from domain suffix");
                    return Ok(qualified);
                }
                _ => debug!("no usable domain suffix"),
            }

            if let Some(address) = interface_address_fallback(net) {
                return Ok(address);
            }
        }

        Ok(short)
    }
}

/// Dotted-decimal address of the first non-loopback interface.
fn interface_address_fallback<K: NetKernel>(net: &mut NetCollector<K>) -> Option<String> {
    let names = net.interface_list().ok()?;
    for name in names.iter() {
        let Ok(config) = net.interface_config(name) else {
            continue;
        };
        if config.flags.contains(InterfaceFlags::LOOPBACK) {
            continue;
        }
        let address = config.address.to_string();
        warn!(interface = %name, address = %address, "no qualified hostname, using interface address");
        return Some(address);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SysError;
    use crate::net::mock::{MockKernel, MockResolver};

    fn net() -> NetCollector<MockKernel> {
        NetCollector::new(MockKernel::typical_host())
    }

    #[test]
    fn test_canonical_name_wins_over_everything() {
        let resolver = MockResolver::new("host").with_forward(
            "host",
            HostEntry {
                canonical: "host.example.com".to_string(),
                aliases: vec!["host.other.example.com".to_string()],
                addresses: vec![Ipv4Addr::new(10, 0, 0, 5)],
            },
        );
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "host.example.com");
    }

    #[test]
    fn test_alias_prefix_match_rule() {
        let resolver = MockResolver::new("host").with_forward(
            "host",
            HostEntry {
                canonical: "host".to_string(),
                aliases: vec![
                    "otherhost.example.com".to_string(),
                    "host.internal.example.com".to_string(),
                ],
                addresses: vec![],
            },
        );
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        // the unrelated CNAME is rejected even though it is dotted
        assert_eq!(fqdn, "host.internal.example.com");
    }

    #[test]
    fn test_reverse_lookup_canonical() {
        let addr = Ipv4Addr::new(10, 0, 0, 5);
        let resolver = MockResolver::new("host")
            .with_forward(
                "host",
                HostEntry {
                    canonical: "host".to_string(),
                    aliases: vec![],
                    addresses: vec![addr],
                },
            )
            .with_reverse(
                addr,
                HostEntry {
                    canonical: "host.example.com".to_string(),
                    aliases: vec![],
                    addresses: vec![],
                },
            );
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "host.example.com");
    }

    #[test]
    fn test_reverse_lookup_alias() {
        let addr = Ipv4Addr::new(10, 0, 0, 5);
        let resolver = MockResolver::new("host")
            .with_forward(
                "host",
                HostEntry {
                    canonical: "host".to_string(),
                    aliases: vec![],
                    addresses: vec![addr],
                },
            )
            .with_reverse(
                addr,
                HostEntry {
                    canonical: "host".to_string(),
                    aliases: vec!["host.rev.example.com".to_string()],
                    addresses: vec![],
                },
            );
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "host.rev.example.com");
    }

    #[test]
    fn test_domain_suffix_concatenation() {
        let resolver = MockResolver::new("host")
            .with_forward("host", HostEntry::bare("host"))
            .with_domain("example.com");
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "host.example.com");
    }

    #[test]
    fn test_unset_domain_sentinel_is_rejected() {
        let resolver = MockResolver::new("host")
            .with_forward("host", HostEntry::bare("host"))
            .with_domain(DOMAIN_UNSET);
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        // falls through to the non-loopback interface address
        assert_eq!(fqdn, "10.0.0.5");
    }

    #[test]
    fn test_failed_forward_lookup_falls_back_to_ip() {
        let resolver = MockResolver::new("host");
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "10.0.0.5");
    }

    #[test]
    fn test_failed_forward_lookup_keeps_dotted_hostname() {
        let resolver = MockResolver::new("host.example.com");
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net()).unwrap();
        assert_eq!(fqdn, "host.example.com");
    }

    #[test]
    fn test_loopback_only_host_keeps_short_name() {
        let resolver = MockResolver::new("host");
        let mut net = NetCollector::new(MockKernel::loopback_only());
        let fqdn = FqdnResolver::new(resolver).resolve(&mut net).unwrap();
        assert_eq!(fqdn, "host");
    }

    #[test]
    fn test_hostname_failure_is_fatal() {
        let resolver = MockResolver::new("host").hostname_error(13);
        let err = FqdnResolver::new(resolver).resolve(&mut net()).unwrap_err();
        assert_eq!(err, SysError::Sys(13));
    }

    #[test]
    fn test_is_fqdn_and_alias_match() {
        assert!(is_fqdn("a.b"));
        assert!(!is_fqdn("ab"));
        assert!(alias_match("host.internal.example.com", "host"));
        assert!(!alias_match("otherhost.example.com", "host"));
        assert!(!alias_match("host", "host"));
    }
}
