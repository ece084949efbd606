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

use std::fmt::{Display, Error};
use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::DecodeError;
use crate::field::Dissection;

mod console;
mod logfmt;
mod meta;

pub use console::ConsoleLogger;
pub use logfmt::LogfmtLogger;
pub use meta::MetaLogger;

/* Where a frame came from: its rank in the input, the capture timestamp
 * and the TCP endpoints when read from a capture file */
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct FrameInfo {
    pub index: usize,
    pub ts: Option<Duration>,
    pub src: Option<SocketAddr>,
    pub dst: Option<SocketAddr>,
}

impl FrameInfo {
    pub fn new(index: usize) -> Self {
        FrameInfo {
            index,
            ..Default::default()
        }
    }

    /// Capture time as UTC, `-` when unknown.
    pub fn timestamp(&self) -> String {
        self.ts
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.as_secs() as i64, ts.subsec_nanos()))
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl Display for FrameInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), Error> {
        match (self.src, self.dst) {
            (Some(s), Some(d)) => write!(f, "{} > {}", s, d),
            _ => write!(f, "#{}", self.index),
        }
    }
}

pub trait Logger {
    fn init(&self);
    /* notifications a logger might or might not implement */
    fn frame_enabled(&self) -> bool {
        true
    }
    fn frame_decoded(&self, _i: &FrameInfo, _d: &Dissection) {}
    fn frame_failed(&self, _i: &FrameInfo, _e: &DecodeError) {}
}
