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

//! Dissectors for the GSM A-interface (BSSMAP, DTAP and RP, with the
//! ROS/BER components of supplementary services) and for SASP
//! (RFC 4678).
//!
//! Every frame decoder takes a byte buffer and a [`context::DecodeContext`]
//! and returns a [`field::Dissection`]: a tree of named fields with their
//! offsets, lengths and values. Anomalies that do not prevent decoding are
//! reported as diagnostic fields inside the tree; only conditions that make
//! the rest of the buffer unreadable are returned as [`error::DecodeError`].
//!
//! ```
//! use sigdissect::context::DecodeOptions;
//! use sigdissect::proto::{dissect, Protocol};
//!
//! let d = dissect(Protocol::Dtap, &[0x05, 0x30], &DecodeOptions::default()).unwrap();
//! assert_eq!(d.info, "MM Null");
//! ```

pub mod context;
pub mod error;
pub mod field;
pub mod logger;
pub mod proto;
pub mod utils;

pub use context::{DecodeContext, DecodeOptions, Direction, Handoff, SubProtocol};
pub use error::{DResult, DecodeError};
pub use field::{DecodedField, Diagnostic, Dissection, Value};
pub use proto::{dissect, BuiltinHandoff, Protocol};
