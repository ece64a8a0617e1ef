use log::warn;
use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::config::ServerConfig;

/// One line per non-loopback interface listing every address it can be
/// reached on. Loopback is always listed first.
pub fn banner_lines(config: &ServerConfig, interfaces: &[(String, IpAddr)]) -> Vec<String> {
    let prefix = config.url_prefix();
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, ip) in interfaces.iter().filter(|(_, ip)| !ip.is_loopback()) {
        let host = match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        };
        grouped
            .entry(name)
            .or_default()
            .push(format!("http://{}:{}{}", host, config.port, prefix));
    }

    let mut lines = vec![
        "Serving on:".to_string(),
        format!("  http://localhost:{}{}  (loopback)", config.port, prefix),
    ];
    lines.extend(
        grouped
            .into_iter()
            .map(|(name, urls)| format!("  {}  ({})", urls.join("  "), name)),
    );
    lines
}

pub fn print_banner(config: &ServerConfig) {
    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(err) => {
            warn!("Could not enumerate network interfaces: {}", err);
            Vec::new()
        }
    };
    if let Some(root) = &config.root {
        println!("Sharing {}", root.display());
    }
    for line in banner_lines(config, &interfaces) {
        println!("{}", line);
    }
}
