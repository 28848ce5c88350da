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
//! Module defining record data types to (de-)serialize packet captures and device logs to CSV.
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceId;

/// Header of the canonical packet capture, in column order.
pub const PACKET_COLUMNS: [&str; 20] = [
    "Timestamp",
    "Flow ID",
    "Packet ID",
    "Packet Size",
    "IP ID",
    "DSCP",
    "ECN",
    "Payload Size",
    "TTL",
    "Proto",
    "Source IP",
    "Destination IP",
    "TCP Source Port",
    "TCP Destination Port",
    "TCP Sequence Number",
    "TCP Window Size",
    "Delay",
    "Workload ID",
    "Application ID",
    "Message ID",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One received packet in the canonical schema. Field order matches `PACKET_COLUMNS`.
pub struct PacketRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: f64,
    #[serde(rename = "Flow ID")]
    pub flow_id: u32,
    #[serde(rename = "Packet ID")]
    pub packet_id: u64,
    #[serde(rename = "Packet Size")]
    pub packet_size: u32,
    #[serde(rename = "IP ID")]
    pub ip_id: u32,
    #[serde(rename = "DSCP")]
    pub dscp: u8,
    #[serde(rename = "ECN")]
    pub ecn: u8,
    #[serde(rename = "Payload Size")]
    pub payload_size: u32,
    #[serde(rename = "TTL")]
    pub ttl: u8,
    #[serde(rename = "Proto")]
    pub proto: u8,
    #[serde(rename = "Source IP")]
    pub src_ip: Ipv4Addr,
    #[serde(rename = "Destination IP")]
    pub dst_ip: Ipv4Addr,
    #[serde(rename = "TCP Source Port")]
    pub src_port: u16,
    #[serde(rename = "TCP Destination Port")]
    pub dst_port: u16,
    #[serde(rename = "TCP Sequence Number")]
    pub seq: u64,
    #[serde(rename = "TCP Window Size")]
    pub window_size: u32,
    /// End-to-end delay in seconds.
    #[serde(rename = "Delay")]
    pub delay: f64,
    #[serde(rename = "Workload ID")]
    pub workload_id: u32,
    #[serde(rename = "Application ID")]
    pub application_id: u32,
    #[serde(rename = "Message ID")]
    pub message_id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One packet leaving a sender, as captured on the sender side.
pub struct SenderRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: f64,
    #[serde(rename = "Packet Size")]
    pub packet_size: u32,
    #[serde(rename = "Packet ID")]
    pub packet_id: u64,
    #[serde(rename = "TCP Sequence Number")]
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Queue occupancy (in packets) of a device after a change.
pub struct QueueSample {
    pub source: DeviceId,
    pub time: f64,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// A packet dropped at a device.
pub struct DropEvent {
    pub source: DeviceId,
    pub time: f64,
    pub packetsize: u32,
    #[serde(default)]
    pub seq: Option<u64>,
}

/// Records that carry a timestamp and a size, and can therefore be binned into windows.
pub trait Timed {
    /// Time in seconds.
    fn time(&self) -> f64;
    /// Size in bytes.
    fn size(&self) -> u32;
}

impl Timed for PacketRecord {
    fn time(&self) -> f64 {
        self.timestamp
    }

    fn size(&self) -> u32 {
        self.packet_size
    }
}

impl Timed for SenderRecord {
    fn time(&self) -> f64 {
        self.timestamp
    }

    fn size(&self) -> u32 {
        self.packet_size
    }
}

impl Timed for DropEvent {
    fn time(&self) -> f64 {
        self.time
    }

    fn size(&self) -> u32 {
        self.packetsize
    }
}
