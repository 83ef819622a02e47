//! Network address discovery and the startup URL listing.
//!
//! After a successful bind the server advertises every reachable IPv4
//! address as a clickable URL, loopback first, with the port highlighted.

use std::io::{self, Write};
use std::net::IpAddr;

/// Category shown next to an advertised URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceLabel {
    Local,
    Network,
}

impl InterfaceLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Network => "Network",
        }
    }
}

/// One reachable address, formatted for the startup listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisedUrl {
    /// Fully formed `http://host:port/`, with loopback shown as `localhost`.
    pub url: String,
    pub label: InterfaceLabel,
}

/// Snapshot the machine's interface addresses. Enumeration failures degrade
/// to an empty listing; the server keeps running either way.
pub fn interface_addresses() -> Vec<IpAddr> {
    match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces.into_iter().map(|(_name, addr)| addr).collect(),
        Err(err) => {
            tracing::warn!("failed to enumerate network interfaces: {err}");
            Vec::new()
        }
    }
}

/// Build the advertised listing for `port`: IPv4 addresses only, loopback
/// entries labeled `Local` and sorted ahead of the rest. Order within each
/// category follows the enumeration order.
pub fn resolve_server_urls(addresses: &[IpAddr], port: u16) -> Vec<AdvertisedUrl> {
    let mut urls: Vec<AdvertisedUrl> = addresses
        .iter()
        .filter(|addr| addr.is_ipv4())
        .map(|addr| {
            let host = addr.to_string();
            let label = if host.contains("127.0.0.1") {
                InterfaceLabel::Local
            } else {
                InterfaceLabel::Network
            };
            AdvertisedUrl {
                url: format!("http://{host}:{port}/").replace("127.0.0.1", "localhost"),
                label,
            }
        })
        .collect();
    urls.sort_by_key(|entry| entry.label != InterfaceLabel::Local);
    urls
}

/// Write the formatted listing, one line per URL:
/// a green arrow, the bold label padded to a fixed column, the cyan URL.
pub fn print_server_urls(
    urls: &[AdvertisedUrl],
    port: u16,
    sink: &mut impl Write,
) -> io::Result<()> {
    for entry in urls {
        let label = format!("{}:", style::bold(entry.label.as_str()));
        writeln!(
            sink,
            "  {}  {label:<18}{}",
            style::green("\u{279c}"),
            color_url(&entry.url, port)
        )?;
    }
    Ok(())
}

/// Colorize a URL cyan with the port digits bolded.
fn color_url(url: &str, port: u16) -> String {
    let plain = format!(":{port}/");
    let emphasized = format!(":{}/", style::bold(&port.to_string()));
    style::cyan(&url.replacen(&plain, &emphasized, 1))
}

/// ANSI styling helpers. Hardcoded escapes, isolated here so the listing
/// format stays testable and swappable.
mod style {
    pub fn bold(s: &str) -> String {
        format!("\x1b[1m{s}\x1b[22m")
    }

    pub fn green(s: &str) -> String {
        format!("\x1b[32m{s}\x1b[39m")
    }

    pub fn cyan(s: &str) -> String {
        format!("\x1b[36m{s}\x1b[39m")
    }
}
