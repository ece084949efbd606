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

use std::borrow::Cow;

/// What to print when a value is missing from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Unknown,
    Reserved,
    /// "Unknown (%u)"
    UnknownValue,
    Static(&'static str),
}

/// Static value -> label table, searched linearly.
#[derive(Debug)]
pub struct ValueString {
    pub table: &'static [(u32, &'static str)],
    pub fallback: Fallback,
}

impl ValueString {
    pub const fn new(table: &'static [(u32, &'static str)], fallback: Fallback) -> Self {
        ValueString { table, fallback }
    }

    pub fn get(&self, value: u32) -> Option<&'static str> {
        self.table
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, s)| *s)
    }

    pub fn label(&self, value: u32) -> Cow<'static, str> {
        match self.get(value) {
            Some(s) => Cow::Borrowed(s),
            None => match self.fallback {
                Fallback::Unknown => Cow::Borrowed("Unknown"),
                Fallback::Reserved => Cow::Borrowed("Reserved"),
                Fallback::UnknownValue => Cow::Owned(format!("Unknown ({})", value)),
                Fallback::Static(s) => Cow::Borrowed(s),
            },
        }
    }
}

/// Label for a boolean bit ("true string", "false string").
#[derive(Debug, Clone, Copy)]
pub struct TrueFalse(pub &'static str, pub &'static str);

impl TrueFalse {
    pub fn label(&self, set: bool) -> &'static str {
        if set {
            self.0
        } else {
            self.1
        }
    }
}

pub static TF_SET: TrueFalse = TrueFalse("Set", "Not set");
pub static TF_SUPPORTED: TrueFalse = TrueFalse("Supported", "Not supported");
pub static TF_ALLOWED: TrueFalse = TrueFalse("Allowed", "Not allowed");

#[cfg(test)]
mod tests {
    use super::*;

    static VS: ValueString = ValueString::new(&[(0, "zero"), (2, "two")], Fallback::UnknownValue);
    static VS_R: ValueString = ValueString::new(&[(0, "zero")], Fallback::Reserved);

    #[test]
    fn lookup() {
        assert_eq!(VS.label(0), "zero");
        assert_eq!(VS.label(2), "two");
        assert_eq!(VS.label(1), "Unknown (1)");
        assert_eq!(VS_R.label(7), "Reserved");
        assert!(VS.get(3).is_none());
    }

    #[test]
    fn true_false() {
        assert_eq!(TF_SET.label(true), "Set");
        assert_eq!(TF_SUPPORTED.label(false), "Not supported");
    }
}
