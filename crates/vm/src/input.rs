//! The line-oriented input collaborator consumed by READ.

use std::io::BufRead;

use tracing::{debug, warn};

/// Supplies READ with one line at a time.
///
/// `None` leaves READ without a line to convert: the input has ended, or
/// the source could not produce this line.
pub trait LineSource {
    fn next_line(&mut self) -> Option<String>;
}

impl<I: Iterator<Item = String>> LineSource for I {
    fn next_line(&mut self) -> Option<String> {
        self.next()
    }
}

/// Lines of a buffered reader with the line terminator removed.
///
/// A line that is not valid UTF-8 yields `None` once and reading resumes
/// with the following line. A read error ends the input, as end-of-file
/// does.
pub struct InputLines<R> {
    reader: Option<R>,
}

impl<R: BufRead> InputLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: BufRead> LineSource for InputLines<R> {
    fn next_line(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.reader = None;
                None
            }
            Ok(_) => {
                if line.ends_with(b"\n") {
                    line.pop();
                    if line.ends_with(b"\r") {
                        line.pop();
                    }
                }
                match String::from_utf8(line) {
                    Ok(line) => Some(line),
                    Err(e) => {
                        debug!(error = %e, "input line is not valid UTF-8");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "input stream failed, treating as end of input");
                self.reader = None;
                None
            }
        }
    }
}
