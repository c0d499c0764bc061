//! Listener address resolution.
//!
//! A controller is attached to its subsystem through a listener: either a
//! TCP endpoint (IPv4 or IPv6) or a PCIe function emulated by the engine.
//! [`Listener::resolve_tcp`] is the strict entry point used on the request
//! path; it panics on structurally invalid input, so callers validate
//! operator-supplied addresses up front with [`Listener::try_tcp`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::types::PciEndpoint;

/// Transport family of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// NVMe/TCP over IPv4.
    TcpIpv4,
    /// NVMe/TCP over IPv6.
    TcpIpv6,
    /// Emulated PCIe function.
    PcieFunction,
}

/// A transport-tagged listener descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum Listener {
    /// A TCP endpoint.
    Tcp {
        /// Listening address.
        addr: IpAddr,
        /// Listening port.
        port: u16,
    },
    /// A PCIe physical/virtual function pair.
    Pcie(PciEndpoint),
}

/// Reasons a TCP endpoint string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    /// The endpoint string is empty.
    #[error("listener endpoint is empty")]
    Empty,

    /// The endpoint has no `:port` suffix.
    #[error("listener endpoint {0:?} has no port")]
    MissingPort(String),

    /// The port is not a number in `0..=65535`.
    #[error("listener endpoint {0:?} has an invalid port")]
    InvalidPort(String),

    /// The host part is neither an IPv4 nor an IPv6 address.
    #[error("listener endpoint {0:?} is not an IP address")]
    InvalidHost(String),
}

impl Listener {
    /// Resolve a `host:port` endpoint into a TCP listener.
    ///
    /// IPv6 hosts must be enclosed in brackets. The host is tried as IPv4
    /// first, then as IPv6.
    ///
    /// # Panics
    ///
    /// Panics if the endpoint is empty, has no port, has a port that does not
    /// parse, or has a host that is not an IP address.
    #[must_use]
    pub fn resolve_tcp(endpoint: &str) -> Self {
        match Self::try_tcp(endpoint) {
            Ok(listener) => listener,
            Err(e) => panic!("cannot resolve listener: {e}"),
        }
    }

    /// Non-panicking form of [`Listener::resolve_tcp`].
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] describing the structural violation.
    pub fn try_tcp(endpoint: &str) -> Result<Self, ListenerError> {
        if endpoint.is_empty() {
            return Err(ListenerError::Empty);
        }
        let (host, port) = endpoint
            .rsplit_once(':')
            .ok_or_else(|| ListenerError::MissingPort(endpoint.to_string()))?;

        // A bare IPv6 address has colons but no brackets and therefore no port.
        let bracketed = host.strip_prefix('[').and_then(|h| h.strip_suffix(']'));
        if bracketed.is_none() && host.contains(':') {
            return Err(ListenerError::MissingPort(endpoint.to_string()));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| ListenerError::InvalidPort(endpoint.to_string()))?;

        let addr = match bracketed {
            Some(h) => h
                .parse::<Ipv6Addr>()
                .map(IpAddr::V6)
                .map_err(|_| ListenerError::InvalidHost(endpoint.to_string()))?,
            None => match host.parse::<Ipv4Addr>() {
                Ok(v4) => IpAddr::V4(v4),
                Err(_) => host
                    .parse::<Ipv6Addr>()
                    .map(IpAddr::V6)
                    .map_err(|_| ListenerError::InvalidHost(endpoint.to_string()))?,
            },
        };

        Ok(Self::Tcp { addr, port })
    }

    /// Build a PCIe-function listener.
    #[must_use]
    pub const fn pcie(endpoint: PciEndpoint) -> Self {
        Self::Pcie(endpoint)
    }

    /// Transport family of this listener.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        match self {
            Self::Tcp {
                addr: IpAddr::V4(_),
                ..
            } => Transport::TcpIpv4,
            Self::Tcp {
                addr: IpAddr::V6(_),
                ..
            } => Transport::TcpIpv6,
            Self::Pcie(_) => Transport::PcieFunction,
        }
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp {
                addr: IpAddr::V4(a),
                port,
            } => write!(f, "{a}:{port}"),
            Self::Tcp {
                addr: IpAddr::V6(a),
                port,
            } => write!(f, "[{a}]:{port}"),
            Self::Pcie(ep) => write!(
                f,
                "pf{}-vf{}",
                ep.physical_function, ep.virtual_function
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_ipv4() {
        let listener = Listener::resolve_tcp("10.10.10.10:12345");
        assert_eq!(
            listener,
            Listener::Tcp {
                addr: IpAddr::V4(Ipv4Addr::new(10, 10, 10, 10)),
                port: 12345,
            }
        );
        assert_eq!(listener.transport(), Transport::TcpIpv4);
        assert_eq!(listener.to_string(), "10.10.10.10:12345");
    }

    #[test]
    fn resolves_ipv6() {
        let listener = Listener::resolve_tcp("[2002:0db0:8833:0000:0000:8a8a:0330:7337]:54321");
        let expected: Ipv6Addr = "2002:db0:8833::8a8a:330:7337".parse().unwrap();
        assert_eq!(
            listener,
            Listener::Tcp {
                addr: IpAddr::V6(expected),
                port: 54321,
            }
        );
        assert_eq!(listener.transport(), Transport::TcpIpv6);
    }

    #[test]
    #[should_panic(expected = "cannot resolve listener")]
    fn empty_endpoint_panics() {
        let _ = Listener::resolve_tcp("");
    }

    #[test]
    #[should_panic(expected = "has no port")]
    fn missing_port_panics() {
        let _ = Listener::resolve_tcp("10.10.10.10");
    }

    #[test]
    #[should_panic(expected = "is not an IP address")]
    fn non_ip_host_panics() {
        let _ = Listener::resolve_tcp("wrong:12345");
    }

    #[test]
    #[should_panic(expected = "cannot resolve listener")]
    fn free_text_panics() {
        let _ = Listener::resolve_tcp("some string which is not ip address");
    }

    #[test]
    fn try_tcp_reports_each_violation() {
        assert_eq!(Listener::try_tcp(""), Err(ListenerError::Empty));
        assert!(matches!(
            Listener::try_tcp("10.0.0.1:http"),
            Err(ListenerError::InvalidPort(_))
        ));
        assert!(matches!(
            Listener::try_tcp("10.0.0.1:70000"),
            Err(ListenerError::InvalidPort(_))
        ));
        assert!(matches!(
            Listener::try_tcp("::1"),
            Err(ListenerError::MissingPort(_))
        ));
        assert!(matches!(
            Listener::try_tcp("[not-v6]:4420"),
            Err(ListenerError::InvalidHost(_))
        ));
    }

    #[test]
    fn pcie_listener() {
        let listener = Listener::pcie(PciEndpoint {
            physical_function: 1,
            virtual_function: 3,
        });
        assert_eq!(listener.transport(), Transport::PcieFunction);
        assert_eq!(listener.to_string(), "pf1-vf3");
    }

    #[test]
    fn serializes_with_transport_tag() {
        let listener = Listener::resolve_tcp("127.0.0.1:4420");
        let json = serde_json::to_value(&listener).unwrap();
        assert_eq!(json["transport"], "tcp");
        assert_eq!(json["addr"], "127.0.0.1");
        assert_eq!(json["port"], 4420);
    }
}
