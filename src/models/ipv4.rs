//! IPv4 CIDR blocks and the candidate-block allocator used by the subnet loop.
//!
//! Provides [`Ipv4`] for representing an address with a prefix length and
//! [`CidrAllocator`] for walking `10.x.0.0/20` candidates.

use crate::config::{CIDR_FIRST_OCTET, CIDR_OCTET_STEP, CIDR_PREFIX_LEN};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// IPv4 address with CIDR notation support.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR {s}: {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.22.0.0/20").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let parts: Vec<&str> = addr_cidr.split('/').collect();
        if parts.len() != 2 {
            return Err("Invalid address/mask".into());
        }
        let addr = Ipv4Addr::from_str(parts[0])
            .map_err(|_| format!("Invalid address {}", parts[0]))?;
        let mask: u8 = parts[1].parse()?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

/// Hands out candidate `10.<octet>.0.0/20` blocks for one region.
///
/// The second octet starts at 22 and grows by 2 per call. Create a fresh
/// allocator for every region so no state leaks between regions.
#[derive(Debug, Clone)]
pub struct CidrAllocator {
    next_octet: u8,
}

impl CidrAllocator {
    pub fn new() -> CidrAllocator {
        CidrAllocator {
            next_octet: CIDR_FIRST_OCTET,
        }
    }

    /// Return the current candidate and advance to the next one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Ipv4 {
        let block = Ipv4 {
            addr: Ipv4Addr::new(10, self.next_octet, 0, 0),
            mask: CIDR_PREFIX_LEN,
        };
        self.next_octet = self.next_octet.saturating_add(CIDR_OCTET_STEP);
        block
    }
}

impl Default for CidrAllocator {
    fn default() -> Self {
        Self::new()
    }
}
