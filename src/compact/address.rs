use super::error::AddressError;

/// Address family of a textual IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Any `:` means IPv6; everything else is treated as IPv4.
    pub fn detect(ip: &str) -> Self {
        if ip.contains(':') {
            IpFamily::V6
        } else {
            IpFamily::V4
        }
    }
}

/// Packs a dotted-quad IPv4 address into 4 bytes.
///
/// ```
/// use btwire::compact::pack_ipv4;
///
/// assert_eq!(pack_ipv4("127.0.0.1").unwrap(), [127, 0, 0, 1]);
/// assert!(pack_ipv4("256.0.0.1").is_err());
/// ```
pub fn pack_ipv4(ip: &str) -> Result<[u8; 4], AddressError> {
    let invalid = || AddressError::InvalidIpv4(ip.to_string());

    let mut out = [0u8; 4];
    let mut segments = ip.split('.');
    for byte in out.iter_mut() {
        let segment = segments.next().ok_or_else(invalid)?;
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *byte = segment.parse().map_err(|_| invalid())?;
    }

    if segments.next().is_some() {
        return Err(invalid());
    }
    Ok(out)
}

/// Expands `::` zero-compression so the address has all 8 groups, each
/// padded to 4 hex digits. Addresses without `::` are returned unchanged.
///
/// ```
/// use btwire::compact::expand_ipv6;
///
/// assert_eq!(
///     expand_ipv6("2001:4860:4860::8888").unwrap(),
///     "2001:4860:4860:0000:0000:0000:0000:8888"
/// );
/// ```
pub fn expand_ipv6(ip: &str) -> Result<String, AddressError> {
    let invalid = || AddressError::InvalidIpv6(ip.to_string());

    let Some((left, right)) = ip.split_once("::") else {
        return Ok(ip.to_string());
    };
    if right.contains("::") {
        return Err(invalid());
    }

    let left = split_groups(left).ok_or_else(invalid)?;
    let right = split_groups(right).ok_or_else(invalid)?;

    let present = left.len() + right.len();
    if present >= 8 {
        return Err(invalid());
    }
    let missing = 8 - present;

    let groups: Vec<String> = left
        .iter()
        .map(|g| format!("{:0>4}", g))
        .chain(std::iter::repeat("0000".to_string()).take(missing))
        .chain(right.iter().map(|g| format!("{:0>4}", g)))
        .collect();

    Ok(groups.join(":"))
}

/// Groups on one side of `::`. `None` if a group is empty, as in `:::`.
fn split_groups(side: &str) -> Option<Vec<&str>> {
    if side.is_empty() {
        return Some(Vec::new());
    }
    let groups: Vec<&str> = side.split(':').collect();
    if groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    Some(groups)
}

/// Packs an IPv6 address into 16 bytes, expanding `::` first.
///
/// ```
/// use btwire::compact::pack_ipv6;
///
/// assert_eq!(
///     pack_ipv6("fafb::8888").unwrap(),
///     [250, 251, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 136, 136]
/// );
/// ```
pub fn pack_ipv6(ip: &str) -> Result<[u8; 16], AddressError> {
    let invalid = || AddressError::InvalidIpv6(ip.to_string());

    let expanded = expand_ipv6(ip)?;
    let mut out = [0u8; 16];
    let mut groups = expanded.split(':');

    for pair in out.chunks_exact_mut(2) {
        let group = groups.next().ok_or_else(invalid)?;
        if group.is_empty()
            || group.len() > 4
            || !group.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(invalid());
        }
        let value = u16::from_str_radix(group, 16).map_err(|_| invalid())?;
        pair.copy_from_slice(&value.to_be_bytes());
    }

    if groups.next().is_some() {
        return Err(invalid());
    }
    Ok(out)
}

/// Packs a port number as 2 big-endian bytes.
pub fn pack_port(port: u16) -> [u8; 2] {
    port.to_be_bytes()
}

/// Packs an address of either family into its compact byte form.
pub fn pack_ip(ip: &str) -> Result<Vec<u8>, AddressError> {
    match IpFamily::detect(ip) {
        IpFamily::V4 => pack_ipv4(ip).map(|b| b.to_vec()),
        IpFamily::V6 => pack_ipv6(ip).map(|b| b.to_vec()),
    }
}
