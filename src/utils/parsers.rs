// This file is part of sigdissect.
// Copyright 2023 - The IVRE project
//
// Sigdissect is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Sigdissect is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public
// License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Sigdissect. If not, see <http://www.gnu.org/licenses/>.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::*;
use pnet::packet::{
    ethernet::{EtherTypes, EthernetPacket},
    ip::{IpNextHeaderProtocol, IpNextHeaderProtocols},
    ipv4::Ipv4Packet,
    ipv6::Ipv6Packet,
    tcp::TcpPacket,
    Packet,
};

use crate::proto::sasp::Reassembler;

/* Generic IP packet (either IPv4 or IPv6) */
pub enum IpPacket<'a> {
    V4(Ipv4Packet<'a>),
    V6(Ipv6Packet<'a>),
}

impl<'a> IpPacket<'a> {
    pub fn src(&self) -> IpAddr {
        match self {
            IpPacket::V4(p) => IpAddr::V4(p.get_source()),
            IpPacket::V6(p) => IpAddr::V6(p.get_source()),
        }
    }
    pub fn dst(&self) -> IpAddr {
        match self {
            IpPacket::V4(p) => IpAddr::V4(p.get_destination()),
            IpPacket::V6(p) => IpAddr::V6(p.get_destination()),
        }
    }
    pub fn next_header(&self) -> IpNextHeaderProtocol {
        match self {
            IpPacket::V4(p) => p.get_next_level_protocol(),
            IpPacket::V6(p) => p.get_next_header(),
        }
    }
    pub fn payload(&self) -> &[u8] {
        match self {
            IpPacket::V4(p) => p.payload(),
            IpPacket::V6(p) => p.payload(),
        }
    }
}

/// TCP payload of a captured frame with its endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment {
    pub ts: Duration,
    pub src: SocketAddr,
    pub dst: SocketAddr,
    pub payload: Vec<u8>,
}

/* Ethernet / IPv4 or IPv6 / TCP; anything else is skipped */
pub fn extract_tcp(frame: &[u8], ts: Duration) -> Option<TcpSegment> {
    let eth = EthernetPacket::new(frame)?;
    let payload = eth.payload();
    let ip = match eth.get_ethertype() {
        EtherTypes::Ipv4 => match Ipv4Packet::new(payload) {
            Some(p) => IpPacket::V4(p),
            None => {
                warn!("error parsing IPv4 packet");
                return None;
            }
        },
        EtherTypes::Ipv6 => match Ipv6Packet::new(payload) {
            Some(p) => IpPacket::V6(p),
            None => {
                warn!("error parsing IPv6 packet");
                return None;
            }
        },
        t => {
            trace!("skipping layer 2 type: {}", t);
            return None;
        }
    };
    if ip.next_header() != IpNextHeaderProtocols::Tcp {
        trace!("skipping layer 4 protocol: {}", ip.next_header());
        return None;
    }
    let tcp = match TcpPacket::new(ip.payload()) {
        Some(p) => p,
        None => {
            warn!("error parsing TCP packet");
            return None;
        }
    };
    Some(TcpSegment {
        ts,
        src: SocketAddr::new(ip.src(), tcp.get_source()),
        dst: SocketAddr::new(ip.dst(), tcp.get_destination()),
        payload: tcp.payload().to_vec(),
    })
}

/// SASP reassembly, one [`Reassembler`] per (source, destination) pair
/// with the SASP port on either side.
pub struct SaspStreams {
    port: u16,
    streams: HashMap<(SocketAddr, SocketAddr), Reassembler>,
}

impl SaspStreams {
    pub fn new(port: u16) -> Self {
        SaspStreams {
            port,
            streams: HashMap::new(),
        }
    }

    pub fn matches(&self, seg: &TcpSegment) -> bool {
        seg.src.port() == self.port || seg.dst.port() == self.port
    }

    /// Complete PDUs carried by `seg` (with what was pending in its stream).
    pub fn push(&mut self, seg: &TcpSegment) -> Vec<Vec<u8>> {
        if !self.matches(seg) || seg.payload.is_empty() {
            return Vec::new();
        }
        self.streams
            .entry((seg.src, seg.dst))
            .or_insert_with(Reassembler::new)
            .push(&seg.payload)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SASP_PDU: [u8; 18] = [
        0x20, 0x10, 0x00, 0x0d, 0x01, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x01, 0x10, 0x15,
        0x00, 0x03, 0x00,
    ];

    fn eth_ipv4_tcp(sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
        let mut f = vec![
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0x08, 0x00,
        ];
        let total = (20 + 20 + payload.len()) as u16;
        f.extend_from_slice(&[0x45, 0x00]);
        f.extend_from_slice(&total.to_be_bytes());
        f.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00]);
        f.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
        f.extend_from_slice(&sport.to_be_bytes());
        f.extend_from_slice(&dport.to_be_bytes());
        f.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0x50, 0x18, 0xff, 0xff, 0, 0, 0, 0]);
        f.extend_from_slice(payload);
        f
    }

    #[test]
    fn tcp_payload() {
        let frame = eth_ipv4_tcp(40000, 3860, &SASP_PDU);
        let seg = extract_tcp(&frame, Duration::from_secs(1)).unwrap();
        assert_eq!(seg.src, "10.0.0.1:40000".parse::<SocketAddr>().unwrap());
        assert_eq!(seg.dst, "10.0.0.2:3860".parse::<SocketAddr>().unwrap());
        assert_eq!(seg.payload, SASP_PDU.to_vec());
        /* ARP is not TCP */
        let mut arp = frame.clone();
        arp[12] = 0x08;
        arp[13] = 0x06;
        assert!(extract_tcp(&arp, Duration::from_secs(1)).is_none());
        /* UDP either */
        let mut udp = frame;
        udp[23] = 0x11;
        assert!(extract_tcp(&udp, Duration::from_secs(1)).is_none());
    }

    #[test]
    fn streams_split_by_direction() {
        let mut s = SaspStreams::new(3860);
        let seg = |sport, dport, payload: &[u8]| {
            extract_tcp(&eth_ipv4_tcp(sport, dport, payload), Duration::from_secs(0)).unwrap()
        };
        assert!(s.push(&seg(40000, 3860, &SASP_PDU[..10])).is_empty());
        /* another port is ignored */
        assert!(s.push(&seg(40000, 80, &SASP_PDU)).is_empty());
        assert_eq!(s.len(), 1);
        let out = s.push(&seg(40000, 3860, &SASP_PDU[10..]));
        assert_eq!(out, vec![SASP_PDU.to_vec()]);
        let out = s.push(&seg(3860, 40000, &SASP_PDU));
        assert_eq!(out, vec![SASP_PDU.to_vec()]);
        assert_eq!(s.len(), 2);
    }
}
