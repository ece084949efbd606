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

use crate::error::DecodeError;
use crate::field::Dissection;
use crate::logger::{FrameInfo, Logger};

/// One `key=value` line per frame.
pub struct LogfmtLogger {}

impl Default for LogfmtLogger {
    fn default() -> Self {
        LogfmtLogger::new()
    }
}

/* values with blanks, quotes or '=' get quoted */
fn value(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

impl LogfmtLogger {
    pub fn new() -> Self {
        LogfmtLogger {}
    }
    fn prolog(&self, i: &FrameInfo) -> String {
        let mut out = format!("ts={} frame={}", value(&i.timestamp()), i.index);
        if let Some(s) = i.src {
            out.push_str(&format!(" src={}", s));
        }
        if let Some(d) = i.dst {
            out.push_str(&format!(" dst={}", d));
        }
        out
    }
    pub fn render(&self, i: &FrameInfo, d: &Dissection) -> String {
        let diags = d.diagnostics();
        let mut out = format!(
            "{} proto={} info={} len={} diagnostics={}",
            self.prolog(i),
            value(d.protocol),
            value(&d.info),
            d.tree.len,
            diags.len()
        );
        if let Some(first) = diags.first() {
            out.push_str(&format!(" first_diagnostic={}", value(&first.name)));
        }
        out
    }
    pub fn render_error(&self, i: &FrameInfo, e: &DecodeError) -> String {
        format!("{} error={}", self.prolog(i), value(&e.to_string()))
    }
}

impl Logger for LogfmtLogger {
    fn init(&self) {}
    fn frame_decoded(&self, i: &FrameInfo, d: &Dissection) {
        println!("{}", self.render(i, d));
    }
    fn frame_failed(&self, i: &FrameInfo, e: &DecodeError) {
        println!("{}", self.render_error(i, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::context::DecodeOptions;
    use crate::proto::{dissect, Protocol};

    #[test]
    fn quoting() {
        assert_eq!(value("SASP"), "SASP");
        assert_eq!(value("MM Null"), "\"MM Null\"");
        assert_eq!(value("a\"b"), "\"a\\\"b\"");
        assert_eq!(value(""), "\"\"");
    }

    #[test]
    fn render_line() {
        let opts = DecodeOptions::default();
        let d = dissect(Protocol::Dtap, &[0x06, 0x01, 0xaa], &opts).unwrap();
        let mut i = FrameInfo::new(7);
        i.src = "10.0.0.1:3860".parse().ok();
        let out = LogfmtLogger::new().render(&i, &d);
        assert_eq!(
            out,
            "ts=- frame=7 src=10.0.0.1:3860 proto=\"GSM A-I/F DTAP\" \
             info=\"Unknown DTAP Message Type (0x01)\" len=3 diagnostics=1 \
             first_diagnostic=\"Unknown DTAP Message Type (0x01)\""
        );
    }
}
