use std::io::{BufRead, BufReader, Lines, Read};

use crate::error::BenchError;

/// One row of the input CSV: the parameters of a single benchmark query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub host: String,
    pub start_time: String,
    pub end_time: String,
}

/// Lazily yields descriptors from a CSV source, skipping its header line.
///
/// Iteration stops after the first error.
pub struct Descriptors<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
    done: bool,
}

pub fn read_descriptors<R: Read>(input: R) -> Descriptors<R> {
    Descriptors { lines: BufReader::new(input).lines(), line_no: 0, done: false }
}

impl<R: Read> Descriptors<R> {
    fn next_line(&mut self) -> Option<Result<String, BenchError>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.map_err(|source| BenchError::ReadInput { line: self.line_no, source }))
    }
}

impl<R: Read> Iterator for Descriptors<R> {
    type Item = Result<QueryDescriptor, BenchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.line_no == 0 {
            // header
            if let Err(err) = self.next_line()? {
                self.done = true;
                return Some(Err(err));
            }
        }
        let result = self.next_line()?.and_then(|line| parse_line(&line, self.line_no));
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Splits a data row into its three fields. Empty fields are skipped, so
/// `a,,b,c` reads as `a`, `b`, `c`.
pub fn parse_line(line: &str, line_no: usize) -> Result<QueryDescriptor, BenchError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(',').filter(|field| !field.is_empty()).collect();

    match fields.as_slice() {
        [host, start_time, end_time] => Ok(QueryDescriptor {
            host: host.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }),
        _ => Err(BenchError::FieldCount { fields: fields.len(), line: line_no }),
    }
}
