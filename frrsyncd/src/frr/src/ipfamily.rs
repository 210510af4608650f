use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Address family of a textual address or CIDR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpFamily {
    #[default]
    #[serde(rename = "ipv4")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
}

impl IpFamily {
    /// Classifies `addr`, which may be a bare address or a CIDR.
    ///
    /// Inputs are schema-validated upstream, so a parse failure is
    /// reported as a validation error by the caller.
    pub fn of(addr: &str) -> Result<IpFamily, Error> {
        if let Ok(net) = IpNet::from_str(addr) {
            return Ok(match net {
                IpNet::V4(_) => IpFamily::Ipv4,
                IpNet::V6(_) => IpFamily::Ipv6,
            });
        }
        match IpAddr::from_str(addr) {
            Ok(IpAddr::V4(_)) => Ok(IpFamily::Ipv4),
            Ok(IpAddr::V6(_)) => Ok(IpFamily::Ipv6),
            Err(_) => Err(Error::InvalidAddress(addr.to_string())),
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::Ipv4 => write!(f, "ipv4"),
            IpFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}
