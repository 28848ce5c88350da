// SimTrace: Time-Series Analysis and Visualization of Packet-Level Network Simulator Traces
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Identity of the simulated network devices that appear in the queue and drop logs.
use std::{convert::Infallible, fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DEVICE_PATH: Regex = Regex::new(
        r"^/NodeList/(?P<node>[0-9]+)/DeviceList/(?P<device>[0-9]+)/\$ns3::(?P<kind>CsmaNetDevice|PointToPointNetDevice)(/.*)?$"
    )
    .unwrap();
}

/// A network device, parsed once from the hierarchical trace path of the simulator (e.g.,
/// `/NodeList/2/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue`). The trace source
/// suffix is not part of the identity. Paths of any other shape are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceId {
    Csma { node: u32, device: u32 },
    PointToPoint { node: u32, device: u32 },
    Other(String),
}

impl DeviceId {
    /// First device of a CSMA node, which is how the bottleneck switches are attached.
    pub fn csma(node: u32) -> Self {
        Self::Csma { node, device: 0 }
    }
}

impl FromStr for DeviceId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(caps) = DEVICE_PATH.captures(s) else {
            return Ok(Self::Other(s.to_string()));
        };
        // the regex only matches digits, but they may still overflow
        let (Ok(node), Ok(device)) = (caps["node"].parse(), caps["device"].parse()) else {
            return Ok(Self::Other(s.to_string()));
        };
        Ok(match &caps["kind"] {
            "CsmaNetDevice" => Self::Csma { node, device },
            _ => Self::PointToPoint { node, device },
        })
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(x) => x,
            Err(e) => match e {},
        }
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Csma { node, device } => {
                write!(f, "/NodeList/{node}/DeviceList/{device}/$ns3::CsmaNetDevice")
            }
            Self::PointToPoint { node, device } => {
                write!(
                    f,
                    "/NodeList/{node}/DeviceList/{device}/$ns3::PointToPointNetDevice"
                )
            }
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Simulated topology, which determines where the bottleneck switches are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Topology {
    /// Two bottleneck switches (A and B).
    #[default]
    Small,
    /// Four bottleneck switches (A, B, D and G) and three receivers.
    Large,
}

/// A device whose queue is of interest, with the name of the switch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bottleneck {
    pub switch: &'static str,
    pub device: DeviceId,
}

impl Topology {
    pub fn bottlenecks(&self) -> Vec<Bottleneck> {
        let switches: &[(u32, &'static str)] = match self {
            Topology::Small => &[(2, "A"), (3, "B")],
            Topology::Large => &[(6, "A"), (7, "B"), (9, "D"), (12, "G")],
        };
        switches
            .iter()
            .map(|(node, switch)| Bottleneck {
                switch: *switch,
                device: DeviceId::csma(*node),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_queue_source() {
        let id: DeviceId = "/NodeList/2/DeviceList/0/$ns3::CsmaNetDevice/TxQueue/PacketsInQueue"
            .parse()
            .unwrap();
        assert_eq!(id, DeviceId::csma(2));

        let id: DeviceId = "/NodeList/12/DeviceList/3/$ns3::PointToPointNetDevice/TxQueue/Drop"
            .parse()
            .unwrap();
        assert_eq!(
            id,
            DeviceId::PointToPoint {
                node: 12,
                device: 3
            }
        );
    }

    #[test]
    fn unknown_paths_are_kept() {
        let id: DeviceId = "/NodeList/2/$ns3::TcpL4Protocol".parse().unwrap();
        assert_eq!(id, DeviceId::Other("/NodeList/2/$ns3::TcpL4Protocol".to_string()));
        assert_ne!(id, DeviceId::csma(2));
    }

    #[test]
    fn bottlenecks_per_topology() {
        let small = Topology::Small.bottlenecks();
        assert_eq!(
            small.iter().map(|b| b.switch).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(small[1].device, DeviceId::csma(3));
        let large = Topology::Large.bottlenecks();
        assert_eq!(
            large.iter().map(|b| b.device.clone()).collect::<Vec<_>>(),
            [6, 7, 9, 12].map(DeviceId::csma).to_vec()
        );
        assert_eq!(Topology::Large.to_string(), "large");
    }
}
