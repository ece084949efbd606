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

use std::fmt;
use std::str::FromStr;

use strum_macros::EnumIter;

use crate::error::{DResult, DecodeError};
use crate::field::DecodedField;

pub const DEFAULT_MAX_BER_DEPTH: usize = 32;
pub const DEFAULT_SASP_PORT: u16 = 3860;

/// Link direction. Some GSM-A fields change meaning with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// MS to network
    Uplink,
    /// network to MS
    Downlink,
    Unknown,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Unknown
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uplink" | "ul" | "up" => Ok(Direction::Uplink),
            "downlink" | "dl" | "down" => Ok(Direction::Downlink),
            "unknown" => Ok(Direction::Unknown),
            _ => Err(format!("invalid direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Uplink => "uplink",
            Direction::Downlink => "downlink",
            Direction::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// User-facing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Used for messages whose direction is not fixed by their type.
    pub direction: Direction,
    pub max_ber_depth: usize,
    pub sasp_port: u16,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            direction: Direction::Unknown,
            max_ber_depth: DEFAULT_MAX_BER_DEPTH,
            sasp_port: DEFAULT_SASP_PORT,
        }
    }
}

/// Protocols embedded in GSM-A elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubProtocol {
    /// Layer 3 Information / Layer 3 Message Contents
    Dtap,
    /// CP-User Data
    Rp,
    /// RP-User Data
    SmsTpdu,
    /// PCO protocol entry (LCP, PAP, CHAP, IPCP...)
    Ppp { protocol: u16 },
    /// ROS component parameter
    SsParameter { opcode: Option<u32> },
}

/// Delegation to sibling decoders. The returned field offsets are relative
/// to `data`; callers rebase them.
pub trait Handoff: Sync {
    fn dissect(&self, proto: SubProtocol, data: &[u8], ctx: &DecodeContext) -> DResult<DecodedField>;
}

/// Call-scoped state threaded through every decoder.
#[derive(Clone, Copy)]
pub struct DecodeContext<'h> {
    pub direction: Direction,
    pub max_ber_depth: usize,
    /// current BER nesting level
    pub ber_depth: usize,
    pub handoff: &'h dyn Handoff,
}

impl<'h> DecodeContext<'h> {
    pub fn new(opts: &DecodeOptions, handoff: &'h dyn Handoff) -> Self {
        DecodeContext {
            direction: opts.direction,
            max_ber_depth: opts.max_ber_depth,
            ber_depth: 0,
            handoff,
        }
    }

    pub fn with_direction(&self, direction: Direction) -> Self {
        DecodeContext { direction, ..*self }
    }

    pub fn is_uplink(&self) -> bool {
        self.direction == Direction::Uplink
    }

    /// Context for one more level of BER nesting.
    pub fn nested(&self) -> DResult<Self> {
        if self.ber_depth >= self.max_ber_depth {
            return Err(DecodeError::RecursionLimitExceeded {
                depth: self.max_ber_depth,
            });
        }
        Ok(DecodeContext {
            ber_depth: self.ber_depth + 1,
            ..*self
        })
    }
}

impl<'h> fmt::Debug for DecodeContext<'h> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("direction", &self.direction)
            .field("max_ber_depth", &self.max_ber_depth)
            .field("ber_depth", &self.ber_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Value;
    use strum::IntoEnumIterator;

    struct NoHandoff;

    impl Handoff for NoHandoff {
        fn dissect(&self, _p: SubProtocol, data: &[u8], _c: &DecodeContext) -> DResult<DecodedField> {
            Ok(DecodedField::new("Data", 0, data.len(), Value::Bytes(data.to_vec())))
        }
    }

    #[test]
    fn direction_parse() {
        for d in Direction::iter() {
            assert_eq!(d.to_string().parse::<Direction>(), Ok(d));
        }
        assert_eq!("UL".parse::<Direction>(), Ok(Direction::Uplink));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn nesting_limit() {
        let opts = DecodeOptions {
            max_ber_depth: 2,
            ..Default::default()
        };
        let ctx = DecodeContext::new(&opts, &NoHandoff);
        let one = ctx.nested().unwrap();
        let two = one.nested().unwrap();
        assert_eq!(two.ber_depth, 2);
        assert_eq!(
            two.nested().unwrap_err(),
            DecodeError::RecursionLimitExceeded { depth: 2 }
        );
        /* direction override leaves the rest untouched */
        let up = two.with_direction(Direction::Uplink);
        assert!(up.is_uplink());
        assert_eq!(up.ber_depth, 2);
    }
}
