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

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DResult, DecodeError};

/// ### Cursor
/// A read position over a byte buffer, used to dissect fields.
///
/// Offsets are absolute in the buffer the cursor was created on, so that
/// fields produced at any nesting level can be located in the original
/// message. A cursor is either *unbounded* (it ends where the caller's
/// buffer ends: overrunning it means the message is truncated) or
/// *bounded* by a declared length (overrunning it means the element is
/// shorter than its grammar).
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    bounded: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Cursor<'a> {
        Cursor {
            buf,
            pos: 0,
            end: buf.len(),
            bounded: false,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    pub fn is_bounded(&self) -> bool {
        self.bounded
    }

    fn need(&self, n: usize) -> DResult<()> {
        let left = self.remaining();
        if n <= left {
            Ok(())
        } else if self.bounded {
            Err(DecodeError::ShortData { offset: self.pos })
        } else {
            Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n - left,
            })
        }
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, i: usize) -> Option<u8> {
        if self.pos + i < self.end {
            Some(self.buf[self.pos + i])
        } else {
            None
        }
    }

    pub fn read_u8(&mut self) -> DResult<u8> {
        self.need(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> DResult<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u24(&mut self) -> DResult<u32> {
        Ok(BigEndian::read_u24(self.take(3)?))
    }

    pub fn read_u32(&mut self) -> DResult<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn take(&mut self, n: usize) -> DResult<&'a [u8]> {
        self.need(n)?;
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    pub fn skip(&mut self, n: usize) -> DResult<()> {
        self.take(n).map(|_| ())
    }

    /// Consumes everything up to the end.
    pub fn rest(&mut self) -> &'a [u8] {
        let s = &self.buf[self.pos..self.end];
        self.pos = self.end;
        s
    }

    /// Bytes up to the end, without consuming them.
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.buf[self.pos..self.end]
    }

    /// Bounded sub-cursor over the next `len` bytes; `self` moves past them.
    pub fn window(&mut self, len: usize) -> DResult<Cursor<'a>> {
        self.need(len)?;
        let w = Cursor {
            buf: self.buf,
            pos: self.pos,
            end: self.pos + len,
            bounded: true,
        };
        self.pos += len;
        Ok(w)
    }

    /// Moves to `pos`, which must lie between the current position and the end.
    pub fn seek(&mut self, pos: usize) {
        if pos >= self.pos && pos <= self.end {
            self.pos = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads() {
        let data = [0x20, 0x10, 0x00, 0x0d, 0x01, 0x00, 0x00, 0x00, 0x20];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u16(), Ok(0x2010));
        assert_eq!(c.read_u16(), Ok(0x000d));
        assert_eq!(c.read_u8(), Ok(1));
        assert_eq!(c.read_u32(), Ok(0x20));
        assert!(c.is_empty());
        assert_eq!(
            c.read_u8(),
            Err(DecodeError::Truncated {
                offset: 9,
                needed: 1
            })
        );
    }

    #[test]
    fn windows() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut c = Cursor::new(&data);
        c.skip(1).unwrap();
        let mut w = c.window(2).unwrap();
        assert_eq!(c.pos(), 3);
        assert_eq!(w.pos(), 1);
        assert_eq!(w.read_u16(), Ok(0x0203));
        /* overrunning a window is short data, not truncation */
        assert_eq!(w.read_u8(), Err(DecodeError::ShortData { offset: 3 }));
        assert_eq!(c.read_u24().unwrap_err(), DecodeError::Truncated { offset: 3, needed: 1 });
        assert_eq!(c.peek_u8(), Some(0x04));
        assert_eq!(c.rest(), &[0x04, 0x05]);
        assert!(c.window(1).is_err());
    }

    #[test]
    fn nested_windows() {
        let data = [0u8; 8];
        let mut c = Cursor::new(&data);
        let mut outer = c.window(4).unwrap();
        assert!(outer.is_bounded());
        assert_eq!(outer.window(5).unwrap_err(), DecodeError::ShortData { offset: 0 });
        let inner = outer.window(3).unwrap();
        assert_eq!(inner.end(), 3);
        assert_eq!(outer.remaining(), 1);
        assert_eq!(c.remaining(), 4);
    }
}
