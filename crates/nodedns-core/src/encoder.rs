// # Address Encoder
//
// Turns a node address into the subdomain label that identifies the node in
// DNS. The label is a direct hex transcription of the four IPv4 octets, so the
// same address always maps to the same label and no two addresses share one.
// Nothing is stored: every run recomputes the names from the live addresses.

use crate::error::{Error, Result};
use std::net::Ipv4Addr;

/// Hex-encode the four octets of an IPv4 address (8 lowercase digits)
pub fn encode_ipv4(address: Ipv4Addr) -> String {
    let [a, b, c, d] = address.octets();
    format!("{a:02x}{b:02x}{c:02x}{d:02x}")
}

/// Parse an address string as IPv4
///
/// IPv6 and anything else that is not a dotted quad is rejected with
/// [`Error::InvalidAddress`].
pub fn parse_ipv4(address: &str) -> Result<Ipv4Addr> {
    address
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| Error::invalid_address(format!("'{}' is not an IPv4 address", address)))
}

/// Build the subdomain label for an address
///
/// # Example
///
/// ```rust
/// use nodedns_core::encoder::subdomain_name;
///
/// assert_eq!(subdomain_name("node-", "192.168.1.10").unwrap(), "node-c0a8010a");
/// ```
pub fn subdomain_name(prefix: &str, address: &str) -> Result<String> {
    let ip = parse_ipv4(address)?;
    Ok(format!("{}{}", prefix, encode_ipv4(ip)))
}
