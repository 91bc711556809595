use crate::collect::{Collector, format_size};
use buildenv_core::{BuildEnvError, Document, Value};
use std::net::{IpAddr, Ipv4Addr};
use sysinfo::Networks;

pub struct NetworkCollector {
    networks: Networks,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for NetworkCollector {
    fn name(&self) -> &str {
        "network"
    }

    fn collect(&mut self) -> Result<Value, BuildEnvError> {
        self.networks.refresh();

        let mut interfaces: Vec<(&String, Document)> = Vec::new();
        let mut sent: u64 = 0;
        let mut received: u64 = 0;

        for (name, data) in self.networks.iter() {
            let mut interface = Document::new();
            interface.insert("name", name.clone());
            interface.insert("mac_address", data.mac_address().to_string());
            interface.insert(
                "addresses",
                data.ip_networks()
                    .iter()
                    .map(|network| address_document(network.addr, network.prefix))
                    .collect::<Vec<_>>(),
            );
            interface.insert("bytes_sent", format_size(data.total_transmitted()));
            interface.insert("bytes_received", format_size(data.total_received()));

            sent = sent.saturating_add(data.total_transmitted());
            received = received.saturating_add(data.total_received());
            interfaces.push((name, interface));
        }
        // Interface iteration order is platform dependent.
        interfaces.sort_by(|a, b| a.0.cmp(b.0));

        let mut info = Document::new();
        info.insert(
            "interfaces",
            interfaces.into_iter().map(|(_, doc)| doc).collect::<Vec<_>>(),
        );
        info.insert("bytes_sent", format_size(sent));
        info.insert("bytes_received", format_size(received));

        tracing::debug!(sent, received, "network totals");
        Ok(Value::Document(info))
    }
}

/// One address of an interface.
///
/// IPv4 entries also carry `netmask` and `broadcast_ip`.
fn address_document(addr: IpAddr, prefix: u8) -> Document {
    let mut doc = Document::new();
    doc.insert("ip_address", addr.to_string());
    doc.insert("prefix", i64::from(prefix));
    if let IpAddr::V4(v4) = addr {
        doc.insert("netmask", ipv4_netmask(prefix).to_string());
        doc.insert("broadcast_ip", ipv4_broadcast(v4, prefix).to_string());
    }
    doc
}

/// Netmask of an IPv4 prefix length. Prefixes above 32 saturate.
pub fn ipv4_netmask(prefix: u8) -> Ipv4Addr {
    let host_bits = 32u32.saturating_sub(u32::from(prefix));
    Ipv4Addr::from(u32::MAX.checked_shl(host_bits).unwrap_or(0))
}

/// Broadcast address of the IPv4 network containing `addr`.
pub fn ipv4_broadcast(addr: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(addr) | !u32::from(ipv4_netmask(prefix)))
}

/// IPv4 address and MAC of the first non-loopback interface, by name.
pub fn primary_address(networks: &Networks) -> Option<(Ipv4Addr, String)> {
    let mut candidates: Vec<(&String, Ipv4Addr, String)> = networks
        .iter()
        .flat_map(|(name, data)| {
            data.ip_networks().iter().filter_map(move |network| match network.addr {
                IpAddr::V4(addr) if !addr.is_loopback() => {
                    Some((name, addr, data.mac_address().to_string()))
                }
                _ => None,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));
    candidates
        .into_iter()
        .next()
        .map(|(_, addr, mac)| (addr, mac))
}
