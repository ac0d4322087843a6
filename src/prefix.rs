// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Address range to routing prefix conversion.
//!
//! The controller reports address pools as inclusive `start`/`end` pairs. Routes
//! need a prefix, so each pool is collapsed into `"<start>/<len>"` where `len`
//! is measured on a byte-wise mask:
//!
//! ```text
//! mask[i] = 255 - (start[i] ^ end[i])
//! len     = number of leading one-bits of mask
//! ```
//!
//! The address part is the normalized `start`, not the network address of the
//! resulting block.

use crate::constants::{IPV4_BITS, IPV6_BITS};
use crate::controller::AddressPool;
use crate::errors::RoutesError;
use std::net::IpAddr;

const OPERATION: &str = "range_to_prefix";

/// Convert an inclusive address range into a routing prefix string.
///
/// Both endpoints must belong to the same family. IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`) are treated as IPv4.
///
/// # Example
///
/// ```rust
/// use zt_routes::prefix::range_to_prefix;
///
/// let prefix = range_to_prefix("10.147.17.1", "10.147.17.254").unwrap();
/// assert_eq!(prefix, "10.147.17.1/24");
/// ```
///
/// # Errors
///
/// Returns [`RoutesError::InvalidAddress`] if either endpoint does not parse or
/// the endpoints mix IPv4 and IPv6.
pub fn range_to_prefix(start: &str, end: &str) -> Result<String, RoutesError> {
    let start_ip = normalize(parse_address(start)?);
    let end_ip = normalize(parse_address(end)?);

    let prefix_len = match (start_ip, end_ip) {
        (IpAddr::V4(s), IpAddr::V4(e)) => mask_prefix_len(&s.octets(), &e.octets()),
        (IpAddr::V6(s), IpAddr::V6(e)) => mask_prefix_len(&s.octets(), &e.octets()),
        _ => {
            return Err(RoutesError::InvalidAddress {
                operation: OPERATION,
                address: format!("{start}-{end}"),
                reason: "range endpoints belong to different address families".to_string(),
            })
        }
    };

    debug_assert!(prefix_len <= if start_ip.is_ipv4() { IPV4_BITS } else { IPV6_BITS });

    Ok(format!("{start_ip}/{prefix_len}"))
}

/// Convert every pool into its prefix, preserving the controller's order.
///
/// # Errors
///
/// Returns the first [`RoutesError::InvalidAddress`] encountered.
pub fn pool_prefixes(pools: &[AddressPool]) -> Result<Vec<String>, RoutesError> {
    pools
        .iter()
        .map(|pool| range_to_prefix(&pool.range_start, &pool.range_end))
        .collect()
}

fn parse_address(address: &str) -> Result<IpAddr, RoutesError> {
    address
        .parse::<IpAddr>()
        .map_err(|e| RoutesError::InvalidAddress {
            operation: OPERATION,
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Collapse IPv4-mapped IPv6 addresses to their 4-byte form.
fn normalize(address: IpAddr) -> IpAddr {
    match address {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(address, IpAddr::V4),
        IpAddr::V4(_) => address,
    }
}

/// Count the leading one-bits of the byte-wise mask `255 - (start ^ end)`.
///
/// Non-canonical masks are measured, not rejected: counting stops inside the
/// first partial byte, so a last byte of `0b1111_1010` adds five bits and the
/// length comes out as `/29`. A canonical-mask size check would report `0` for
/// the same mask.
pub(crate) fn mask_prefix_len(start: &[u8], end: &[u8]) -> u32 {
    let mut ones = 0;
    for (s, e) in start.iter().zip(end) {
        let mask = u8::MAX - (s ^ e);
        ones += mask.leading_ones();
        if mask != u8::MAX {
            break;
        }
    }
    ones
}
