use std::error::Error;
use std::io::BufRead;
use std::str;

use crate::errors::LearnerError;

const RECBUF_LEN: usize = 2048;

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub label: i32,
    pub tokens: Vec<String>,
}

/*
One record per line:
<label> <token_1> <token_2> ... <token_k>
label is 0 or 1, tokens are opaque (by convention <field-id>:<rest>)
*/
pub fn parse_line(line: &str) -> Result<Record, LearnerError> {
    let mut parts = line.split(' ').filter(|s| !s.is_empty());
    let label_str = match parts.next() {
        Some(s) => s,
        None => return Err(LearnerError::MalformedRecord("Empty record".to_string())),
    };
    let label = match label_str.parse::<i32>() {
        Ok(l @ 0) | Ok(l @ 1) => l,
        _ => {
            return Err(LearnerError::MalformedRecord(format!(
                "Label has to be 0 or 1, got \"{}\"",
                label_str
            )))
        }
    };
    Ok(Record {
        label,
        tokens: parts.map(|s| s.to_string()).collect(),
    })
}

pub struct RecordParser {
    tmp_read_buf: Vec<u8>,
    pub line_number: u64,
}

impl RecordParser {
    pub fn new() -> RecordParser {
        RecordParser {
            tmp_read_buf: Vec::with_capacity(RECBUF_LEN),
            line_number: 0,
        }
    }

    /// Next record of the stream, `None` at EOF. Blank lines are skipped.
    pub fn next_record(&mut self, input_bufread: &mut dyn BufRead) -> Result<Option<Record>, Box<dyn Error>> {
        loop {
            self.tmp_read_buf.truncate(0);
            match input_bufread.read_until(0x0a, &mut self.tmp_read_buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {}
                Err(e) => return Err(Box::new(e)),
            };
            self.line_number += 1;

            let line = match str::from_utf8(&self.tmp_read_buf) {
                Ok(s) => s.trim_end_matches(|c: char| c == '\n' || c == '\r'),
                Err(_) => {
                    return Err(Box::new(LearnerError::MalformedRecord(format!(
                        "Line {} is not valid UTF-8",
                        self.line_number
                    ))))
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return match parse_line(line) {
                Ok(record) => Ok(Some(record)),
                Err(LearnerError::MalformedRecord(msg)) => Err(Box::new(
                    LearnerError::MalformedRecord(format!("line {}: {}", self.line_number, msg)),
                )),
                Err(e) => Err(Box::new(e)),
            };
        }
    }
}
