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

use thiserror::Error;

/// Failures that stop a decode call (or, for `ShortData`, the element being
/// decoded). Everything else is reported as a diagnostic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The caller's buffer ended before the grammar did.
    #[error("buffer exhausted at offset {offset} ({needed} more byte(s) needed)")]
    Truncated { offset: usize, needed: usize },
    /// A declared length ended before the grammar of the element did.
    #[error("short data at offset {offset}")]
    ShortData { offset: usize },
    #[error("BER nesting deeper than {depth} levels")]
    RecursionLimitExceeded { depth: usize },
}

pub type DResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = DecodeError::Truncated {
            offset: 4,
            needed: 2,
        };
        assert_eq!(
            e.to_string(),
            "buffer exhausted at offset 4 (2 more byte(s) needed)"
        );
        let e = DecodeError::RecursionLimitExceeded { depth: 32 };
        assert_eq!(e.to_string(), "BER nesting deeper than 32 levels");
    }
}
