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

use std::fs::File;
use std::io::{self, BufRead};

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::*;
use pcap_file::pcap::PcapReader;

use sigdissect::context::{DecodeOptions, Direction, DEFAULT_MAX_BER_DEPTH, DEFAULT_SASP_PORT};
use sigdissect::logger::{ConsoleLogger, FrameInfo, LogfmtLogger, MetaLogger};
use sigdissect::proto::{dissect, Protocol};
use sigdissect::utils::{extract_tcp, SaspStreams};

const VERSION: &str = "0.1.0";

fn decode(proto: Protocol, data: &[u8], opts: &DecodeOptions, info: &FrameInfo, log: &MetaLogger) {
    match dissect(proto, data, opts) {
        Ok(d) => {
            for diag in d.diagnostics() {
                debug!("frame {}: {}", info.index, diag.name);
            }
            log.frame_decoded(info, &d);
        }
        Err(e) => {
            warn!("frame {}: {}", info.index, e);
            log.frame_failed(info, &e);
        }
    }
}

/* "05 30", "05:30" and "0530" are the same frame */
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let cleaned = cleaned.trim_start_matches("0x");
    hex::decode(cleaned).with_context(|| format!("invalid hex frame {:?}", s))
}

fn read_pcap(path: &str, opts: &DecodeOptions, log: &MetaLogger) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("failed to open capture file {:?}", path))?;
    let mut reader =
        PcapReader::new(file).with_context(|| format!("failed to parse capture file {:?}", path))?;
    let mut streams = SaspStreams::new(opts.sasp_port);
    let mut count = 0;
    while let Some(pkt) = reader.next_packet() {
        let pkt = match pkt {
            Ok(p) => p,
            Err(e) => {
                warn!("error reading packet - {}", e);
                break;
            }
        };
        let seg = match extract_tcp(&pkt.data, pkt.timestamp) {
            Some(s) => s,
            None => continue,
        };
        for pdu in streams.push(&seg) {
            count += 1;
            let info = FrameInfo {
                index: count,
                ts: Some(seg.ts),
                src: Some(seg.src),
                dst: Some(seg.dst),
            };
            decode(Protocol::Sasp, &pdu, opts, &info, log);
        }
    }
    info!("{} SASP stream(s), {} PDU(s)", streams.len(), count);
    Ok(count)
}

fn options(args: &ArgMatches) -> Result<DecodeOptions> {
    let mut opts = DecodeOptions::default();
    if let Some(d) = args.get_one::<String>("direction") {
        opts.direction = d.parse::<Direction>().map_err(|e| anyhow!(e))?;
    }
    if let Some(p) = args.get_one::<u16>("sasp-port") {
        opts.sasp_port = *p;
    }
    if let Some(d) = args.get_one::<usize>("max-ber-depth") {
        opts.max_ber_depth = *d;
    }
    Ok(opts)
}

fn main() -> Result<()> {
    /* parse arguments from CLI */
    let args = Command::new("Signalling dissector")
        .version(VERSION)
        .about("Decoder for GSM A-interface (BSSMAP, DTAP, RP) and SASP messages")
        .arg(
            Arg::new("protocol")
                .short('p')
                .long("protocol")
                .value_name("proto")
                .help("protocol of the hex frames")
                .value_parser(["bssmap", "dtap", "rp", "sasp"]),
        )
        .arg(
            Arg::new("hex")
                .short('x')
                .long("hex")
                .value_name("frame")
                .help("frame to decode, as hex (repeatable; read from stdin if no frame nor capture is given)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("read")
                .short('r')
                .long("read")
                .value_name("pcap")
                .help("capture file to read SASP over TCP from")
                .conflicts_with("hex"),
        )
        .arg(
            Arg::new("direction")
                .short('d')
                .long("direction")
                .help("link direction of GSM A frames")
                .value_parser(["uplink", "downlink", "unknown"]),
        )
        .arg(
            Arg::new("sasp-port")
                .long("sasp-port")
                .value_name("port")
                .help(format!("TCP port of SASP [default: {}]", DEFAULT_SASP_PORT))
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("max-ber-depth")
                .long("max-ber-depth")
                .value_name("depth")
                .help(format!(
                    "maximum nesting of BER components [default: {}]",
                    DEFAULT_MAX_BER_DEPTH
                ))
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("output format")
                .value_parser(["console", "logfmt"])
                .default_value("console"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase message verbosity"),
        )
        .get_matches();
    let verbose = args.get_count("verbosity") as usize;
    /* initialise logger */
    stderrlog::new()
        .module(module_path!())
        .verbosity(verbose)
        .init()
        .context("error while initializing logging module")?;
    warn!("warn messages enabled");
    info!("info messages enabled");
    debug!("debug messages enabled");
    trace!("trace messages enabled");

    let opts = options(&args)?;
    info!("direction......{}", opts.direction);
    info!("sasp port......{}", opts.sasp_port);
    info!("max ber depth..{}", opts.max_ber_depth);

    let mut log = MetaLogger::new();
    match args.get_one::<String>("format").map(String::as_str) {
        Some("logfmt") => log.add(Box::new(LogfmtLogger::new())),
        _ => log.add(Box::new(ConsoleLogger::new())),
    }
    log.init();

    if let Some(path) = args.get_one::<String>("read") {
        read_pcap(path, &opts, &log)?;
        return Ok(());
    }

    let proto = match args.get_one::<String>("protocol") {
        Some(p) => p.parse::<Protocol>().map_err(|e| anyhow!(e))?,
        None => bail!("--protocol is required to decode hex frames"),
    };
    let frames: Vec<String> = match args.get_many::<String>("hex") {
        Some(v) => v.cloned().collect(),
        None => {
            let mut lines = Vec::new();
            for line in io::stdin().lock().lines() {
                let line = line.context("error reading standard input")?;
                if !line.trim().is_empty() {
                    lines.push(line);
                }
            }
            lines
        }
    };
    for (i, f) in frames.iter().enumerate() {
        let data = parse_hex(f)?;
        decode(proto, &data, &opts, &FrameInfo::new(i + 1), &log);
    }
    Ok(())
}
