//! Parsers for `/proc/self/status`

/// Extract a `kB` valued field (e.g. `VmRSS`) from `/proc/self/status` content,
/// returned in bytes
///
/// Lines look like: `VmRSS:\t   10240 kB`
pub fn parse_status_kib(status: &str, key: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        let mut parts = rest.split_whitespace();
        let value = parts.next()?.parse::<u64>().ok()?;
        match parts.next() {
            Some(unit) if unit.eq_ignore_ascii_case("kb") => value.checked_mul(1024),
            None => Some(value),
            Some(_) => None,
        }
    })
}
