//! IP allow/deny lists.
//!
//! At most one list is active. A whitelist rejects every peer not on it; a
//! blacklist rejects every peer on it.

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;

use crate::config::IpFilterConfig;

/// Which list rejected a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpListKind {
    WhiteList,
    BlackList,
}

impl fmt::Display for IpListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpListKind::WhiteList => f.write_str("white list"),
            IpListKind::BlackList => f.write_str("black list"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum IpFilter {
    #[default]
    Disabled,
    WhiteList(HashSet<IpAddr>),
    BlackList(HashSet<IpAddr>),
}

impl IpFilter {
    /// Build the active filter. The whitelist takes precedence if both are
    /// enabled; validation rejects that configuration before it gets here.
    pub fn from_config(config: &IpFilterConfig) -> Self {
        if config.enable_white_list {
            IpFilter::WhiteList(parse_list(&config.white_list))
        } else if config.enable_black_list {
            IpFilter::BlackList(parse_list(&config.black_list))
        } else {
            IpFilter::Disabled
        }
    }

    /// `Err` names the list that rejected `ip`.
    pub fn check(&self, ip: IpAddr) -> Result<(), IpListKind> {
        let ip = canonical(ip);
        match self {
            IpFilter::Disabled => Ok(()),
            IpFilter::WhiteList(allowed) if allowed.contains(&ip) => Ok(()),
            IpFilter::WhiteList(_) => Err(IpListKind::WhiteList),
            IpFilter::BlackList(denied) if denied.contains(&ip) => Err(IpListKind::BlackList),
            IpFilter::BlackList(_) => Ok(()),
        }
    }
}

fn parse_list(entries: &[String]) -> HashSet<IpAddr> {
    entries
        .iter()
        .filter_map(|entry| entry.parse::<IpAddr>().ok())
        .map(canonical)
        .collect()
}

/// IPv4-mapped IPv6 peers compare as their IPv4 address.
pub(crate) fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn whitelist_rejects_unlisted() {
        let filter = IpFilter::from_config(&IpFilterConfig {
            enable_white_list: true,
            white_list: vec!["10.0.0.1".into()],
            ..Default::default()
        });
        assert_eq!(filter.check(ip("10.0.0.1")), Ok(()));
        assert_eq!(filter.check(ip("10.0.0.2")), Err(IpListKind::WhiteList));
    }

    #[test]
    fn blacklist_rejects_listed() {
        let filter = IpFilter::from_config(&IpFilterConfig {
            enable_black_list: true,
            black_list: vec!["127.0.0.1".into()],
            ..Default::default()
        });
        assert_eq!(filter.check(ip("127.0.0.1")), Err(IpListKind::BlackList));
        assert_eq!(filter.check(ip("::ffff:127.0.0.1")), Err(IpListKind::BlackList));
        assert_eq!(filter.check(ip("127.0.0.2")), Ok(()));
    }

    #[test]
    fn disabled_accepts_everyone() {
        let filter = IpFilter::from_config(&IpFilterConfig {
            white_list: vec!["10.0.0.1".into()],
            ..Default::default()
        });
        assert_eq!(filter.check(ip("192.168.1.1")), Ok(()));
    }
}
