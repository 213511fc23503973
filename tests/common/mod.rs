#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::session::{Failure, Session};

/// In‑memory `print` sink that stays readable after the session takes it.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session plus the buffer its output lands in.
pub fn session() -> (Session, Capture) {
    let capture = Capture::default();
    let session = Session::with_output(Box::new(capture.clone()));
    (session, capture)
}

/// Run `source` as one execution unit in a fresh session.
pub fn run(source: &str) -> (String, Result<(), Failure>) {
    let (mut session, capture) = session();
    let result = session.run(source);
    (capture.text(), result)
}

/// Run `source`, panicking on any failure; returns the printed output.
pub fn run_ok(source: &str) -> String {
    let (out, result) = run(source);
    if let Err(failure) = result {
        panic!("unexpected failure:\n{failure}\noutput so far:\n{out}");
    }
    out
}

/// Run `source` expecting static errors; returns their messages.
pub fn static_errors(source: &str) -> Vec<String> {
    match run(source) {
        (out, Err(Failure::Static(errors))) => {
            assert_eq!(out, "", "nothing may execute after a static error");
            errors.iter().map(|e| e.to_string()).collect()
        }
        (_, other) => panic!("expected static errors, got {other:?}"),
    }
}

/// Run `source` expecting a runtime error; returns (output, message).
pub fn runtime_error(source: &str) -> (String, String) {
    match run(source) {
        (out, Err(Failure::Runtime(e))) => (out, e.to_string()),
        (_, other) => panic!("expected a runtime error, got {other:?}"),
    }
}
