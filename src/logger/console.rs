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

/// Human-readable output: one header line per frame, then the indented
/// field tree with bit patterns.
pub struct ConsoleLogger {
    tree: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        ConsoleLogger::new()
    }
}

impl ConsoleLogger {
    pub fn new() -> Self {
        ConsoleLogger { tree: true }
    }
    /// Header lines only.
    pub fn summary_only() -> Self {
        ConsoleLogger { tree: false }
    }
    fn prolog(&self, i: &FrameInfo) -> String {
        format!("{}\t{}\t", i.timestamp(), i)
    }
    pub fn render(&self, i: &FrameInfo, d: &Dissection) -> String {
        let mut out = format!("{}{}\t{}", self.prolog(i), d.protocol, d.info);
        let diags = d.diagnostics().len();
        if diags > 0 {
            out.push_str(&format!("\t[{} diagnostic(s)]", diags));
        }
        out.push('\n');
        if self.tree {
            out.push_str(&d.tree.pretty());
        }
        out
    }
    pub fn render_error(&self, i: &FrameInfo, e: &DecodeError) -> String {
        format!("{}error\t{}\n", self.prolog(i), e)
    }
}

impl Logger for ConsoleLogger {
    fn init(&self) {}
    fn frame_decoded(&self, i: &FrameInfo, d: &Dissection) {
        print!("{}", self.render(i, d));
    }
    fn frame_failed(&self, i: &FrameInfo, e: &DecodeError) {
        print!("{}", self.render_error(i, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::context::DecodeOptions;
    use crate::proto::{dissect, Protocol};

    #[test]
    fn render_mm_null() {
        let d = dissect(Protocol::Dtap, &[0x05, 0x30], &DecodeOptions::default()).unwrap();
        let mut i = FrameInfo::new(1);
        i.ts = Some(Duration::new(1_600_000_000, 500_000_000));
        let out = ConsoleLogger::new().render(&i, &d);
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("2020-09-13 12:26:40.500000\t#1\tGSM A-I/F DTAP\tMM Null")
        );
        assert_eq!(lines.next(), Some("GSM A-I/F DTAP - MM Null"));
        assert!(out.contains("    0000 .... = Skip Indicator: 0"));
        let out = ConsoleLogger::summary_only().render(&i, &d);
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn render_error() {
        let e = DecodeError::Truncated {
            offset: 1,
            needed: 1,
        };
        let out = ConsoleLogger::new().render_error(&FrameInfo::new(2), &e);
        assert_eq!(
            out,
            "-\t#2\terror\tbuffer exhausted at offset 1 (1 more byte(s) needed)\n"
        );
    }
}
