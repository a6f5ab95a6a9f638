//! Trace events emitted on ownership and alternative changes.
//!
//! Runs in its own test binary so it can install a capturing logger.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use handle_mem::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct Capture {
    lines: Mutex<Vec<String>>,
}

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Trace {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

tagged_union! {
    enum Reading: ReadingKind, ReadingVisitor {
        Label(String) => label,
        Value(i64) => value,
    }
}

fn captured() -> Vec<String> {
    std::mem::take(&mut *CAPTURE.lines.lock().unwrap())
}

// =============================================================================
// TRACE PATTERNS
// =============================================================================

mod trace_patterns {
    use super::*;

    /// Single test: the logger is process-global.
    #[test]
    fn release_and_switch_are_traced() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);

        let mut handle = Exclusive::acquire(5u32);
        captured();
        assert_eq!(handle.release(), Ok(5));
        assert!(captured().iter().any(|l| l == "exclusive handle released"));

        // An empty handle has nothing to release.
        assert!(handle.release().is_err());
        assert!(captured().is_empty());

        let mut reading = Reading::from(String::from("offset"));
        reading.assign(12i64);
        let lines = captured();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("union switching") && l.ends_with("-> i64")));
        assert_eq!(reading.active_type(), ReadingKind::Value);

        let mut generic: Union2<i32, String> = Union2::First(1);
        generic.assign(String::from("x")).unwrap();
        assert!(captured().iter().any(|l| l.starts_with("union switching")));
    }
}
