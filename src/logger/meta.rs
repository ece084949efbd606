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

pub struct MetaLogger {
    loggers: Vec<Box<dyn Logger>>,
}

impl Default for MetaLogger {
    fn default() -> Self {
        MetaLogger::new()
    }
}

impl MetaLogger {
    pub fn new() -> Self {
        MetaLogger {
            loggers: Vec::new(),
        }
    }
    pub fn add(&mut self, log: Box<dyn Logger>) {
        self.loggers.push(log);
    }
    pub fn len(&self) -> usize {
        self.loggers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
    pub fn init(&self) {
        for l in &self.loggers {
            l.init();
        }
    }
    pub fn frame_decoded(&self, i: &FrameInfo, d: &Dissection) {
        for l in &self.loggers {
            if l.frame_enabled() {
                l.frame_decoded(i, d);
            }
        }
    }
    pub fn frame_failed(&self, i: &FrameInfo, e: &DecodeError) {
        for l in &self.loggers {
            if l.frame_enabled() {
                l.frame_failed(i, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::field::{FieldTree, Value};
    use crate::proto::frame;

    struct Recorder {
        enabled: bool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Logger for Recorder {
        fn init(&self) {}
        fn frame_enabled(&self) -> bool {
            self.enabled
        }
        fn frame_decoded(&self, i: &FrameInfo, d: &Dissection) {
            self.seen.lock().unwrap().push(format!("{} {}", i, d.info));
        }
        fn frame_failed(&self, i: &FrameInfo, e: &DecodeError) {
            self.seen.lock().unwrap().push(format!("{} {}", i, e));
        }
    }

    #[test]
    fn fan_out() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut meta = MetaLogger::new();
        for enabled in [true, false, true].iter() {
            meta.add(Box::new(Recorder {
                enabled: *enabled,
                seen: seen.clone(),
            }));
        }
        assert_eq!(meta.len(), 3);
        let d = frame("P", "hello".to_string(), 0, FieldTree::new());
        assert_eq!(d.tree.value, Value::Tree(Vec::new()));
        meta.frame_decoded(&FrameInfo::new(3), &d);
        meta.frame_failed(&FrameInfo::new(4), &DecodeError::ShortData { offset: 2 });
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "#3 hello",
                "#3 hello",
                "#4 short data at offset 2",
                "#4 short data at offset 2"
            ]
        );
    }
}
