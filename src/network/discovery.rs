use crate::Label;
use crate::error::DiscoveryError;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::lookup_host;
use tracing::{debug, info};

const DELIMITER: char = ',';

/// Directly attached router, as listed in the discovery file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub label: Label,
    pub addr: SocketAddr,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NeighborEntry {
    label: Label,
    host: String,
    port: u16,
    cost: u32,
}

/// Reads `label,host,port,cost` lines and resolves every host to IPv4.
pub async fn load_neighbors(path: impl AsRef<Path>) -> Result<Vec<Neighbor>, DiscoveryError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DiscoveryError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let neighbors = parse_neighbors(&content).await?;
    info!("Loaded {} neighbors from {}", neighbors.len(), path.display());
    Ok(neighbors)
}

pub async fn parse_neighbors(content: &str) -> Result<Vec<Neighbor>, DiscoveryError> {
    let mut neighbors = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let Some(entry) = parse_line(number + 1, line)? else {
            continue;
        };
        let addr = resolve(number + 1, &entry.host, entry.port).await?;
        debug!(label = %entry.label, %addr, cost = entry.cost, "neighbor");
        neighbors.push(Neighbor {
            label: entry.label,
            addr,
            cost: entry.cost,
        });
    }

    Ok(neighbors)
}

fn parse_line(line_number: usize, line: &str) -> Result<Option<NeighborEntry>, DiscoveryError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() < 4 {
        return Ok(None);
    }

    let label = fields[0]
        .chars()
        .next()
        .and_then(Label::from_char)
        .ok_or_else(|| DiscoveryError::InvalidLabel {
            line: line_number,
            value: fields[0].to_string(),
        })?;
    let port = fields[2].parse::<u16>().map_err(|_| DiscoveryError::InvalidPort {
        line: line_number,
        value: fields[2].to_string(),
    })?;
    // Costs travel as signed 32-bit values on the wire.
    let cost = fields[3]
        .parse::<u32>()
        .ok()
        .filter(|cost| i32::try_from(*cost).is_ok())
        .ok_or_else(|| DiscoveryError::InvalidCost {
            line: line_number,
            value: fields[3].to_string(),
        })?;

    Ok(Some(NeighborEntry {
        label,
        host: fields[1].to_string(),
        port,
        cost,
    }))
}

async fn resolve(line_number: usize, host: &str, port: u16) -> Result<SocketAddr, DiscoveryError> {
    let unresolved = || DiscoveryError::Unresolved {
        line: line_number,
        host: host.to_string(),
    };

    let mut addrs = lookup_host((host, port)).await.map_err(|_| unresolved())?;
    addrs.find(SocketAddr::is_ipv4).ok_or_else(unresolved)
}
