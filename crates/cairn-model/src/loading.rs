// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Problem instance loader for the team-orienteering domain.
//!
//! This module turns whitespace-delimited text streams into a validated
//! `Instance`. The expected format is the classic TOP benchmark layout:
//!
//! ```raw
//! n  <numVertices>
//! m  <numVehicles>
//! b  <budget>
//! <x_0> <y_0> <p_0>
//! <x_1> <y_1> <p_1>
//! ...
//! <x_{n-1}> <y_{n-1}> <p_{n-1}>
//! ```
//!
//! Separators are runs of spaces or tabs; lines may carry comments
//! introduced by `#`. Vertex 0 is the source, vertex `n-1` the
//! destination. The directed graph is constructed from the coordinates:
//! for every ordered pair `(i, j)` with `i != j`, `i` not the destination
//! and `j` not the source, an arc with the Euclidean distance as weight is
//! added whenever that distance does not exceed the budget.
//!
//! The parser accepts any `BufRead`, file path, raw reader, or string
//! slice, making it convenient to integrate with tests and tooling.

use crate::index::VertexIndex;
use crate::instance::{Instance, InstanceBuilder};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for the instance loading process.
#[derive(Debug)]
pub enum InstanceLoaderError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input stream ended unexpectedly (e.g., missing tokens).
    UnexpectedEof,
    /// A token could not be parsed into the expected numeric type.
    Parse(ParseTokenError),
    /// A header tag (`n`, `m`, or `b`) was missing or out of order.
    MissingTag(MissingTagError),
    /// The header values are invalid: fewer than two vertices, a fleet of
    /// zero vehicles, or a non-positive budget.
    InvalidHeader,
}

/// Details about a failed token parsing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenError {
    /// The string token that failed to parse.
    pub token: String,
    /// The name of the type we tried to parse into (e.g., "f64").
    pub type_name: &'static str,
}

impl std::fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse token '{}' as type {}",
            self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseTokenError {}

/// Details about a missing or misplaced header tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTagError {
    /// The tag the parser expected at this position.
    pub expected: &'static str,
    /// The token actually found.
    pub found: String,
}

impl std::fmt::Display for MissingTagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected header tag '{}' but found '{}'",
            self.expected, self.found
        )
    }
}

impl std::error::Error for MissingTagError {}

impl std::fmt::Display for InstanceLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "Unexpected end of file while parsing instance"),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::MissingTag(e) => write!(f, "Header error: {}", e),
            Self::InvalidHeader => write!(
                f,
                "Header values must satisfy n >= 2, m >= 1 and b > 0"
            ),
        }
    }
}

impl std::error::Error for InstanceLoaderError {}

impl From<std::io::Error> for InstanceLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseTokenError> for InstanceLoaderError {
    fn from(e: ParseTokenError) -> Self {
        Self::Parse(e)
    }
}

/// A loader for TOP problem instances.
///
/// The loader is stateless; it exists as a type so callers can follow the
/// same `from_path` / `from_str` entry points the rest of the workspace
/// uses for file-backed inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

impl InstanceLoader {
    /// Creates a new `InstanceLoader`.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Loads an instance from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Instance, InstanceLoaderError> {
        let mut sc = Scanner::new(rdr);

        sc.expect_tag("n")?;
        let n: usize = sc.next()?;
        sc.expect_tag("m")?;
        let m: usize = sc.next()?;
        sc.expect_tag("b")?;
        let budget: f64 = sc.next()?;

        if n < 2 || m == 0 || budget <= 0.0 {
            return Err(InstanceLoaderError::InvalidHeader);
        }

        let mut coordinates = Vec::with_capacity(n);
        let mut prizes = Vec::with_capacity(n);
        for _ in 0..n {
            let x: f64 = sc.next()?;
            let y: f64 = sc.next()?;
            let p: f64 = sc.next()?;
            coordinates.push((x, y));
            prizes.push(p);
        }

        let source = VertexIndex::new(0);
        let destination = VertexIndex::new(n - 1);

        let mut builder = InstanceBuilder::new(n, source, destination, m, budget);
        for (i, &prize) in prizes.iter().enumerate() {
            builder.set_prize(VertexIndex::new(i), prize);
        }

        // The builder itself rejects self-loops, arcs into the source,
        // arcs out of the destination, and over-budget arcs; the loops
        // below only skip what would never be offered anyway.
        for i in 0..n {
            if i == destination.get() {
                continue;
            }
            for j in 0..n {
                if j == i || j == source.get() {
                    continue;
                }
                let (xi, yi) = coordinates[i];
                let (xj, yj) = coordinates[j];
                let distance = (xi - xj).hypot(yi - yj);
                if distance <= budget {
                    builder.add_arc(VertexIndex::new(i), VertexIndex::new(j), distance);
                }
            }
        }

        Ok(builder.build())
    }

    /// Loads an instance from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Instance, InstanceLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads an instance from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Instance, InstanceLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads an instance from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Instance, InstanceLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

/// A helper to read whitespace-delimited tokens from a generic reader.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a new `Scanner` wrapping the given reader.
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
        }
    }

    /// Refills the internal line buffer. Returns `Ok(true)` if data was
    /// read, `Ok(false)` on EOF.
    #[inline]
    fn fill_line(&mut self) -> Result<bool, InstanceLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self
            .rdr
            .read_line(&mut self.buf)
            .map_err(InstanceLoaderError::Io)?;
        Ok(n > 0)
    }

    /// Reads the next raw token, skipping whitespace and `#` comments.
    fn next_token(&mut self) -> Result<String, InstanceLoaderError> {
        loop {
            // Refill buffer if empty or consumed
            if self.pos >= self.buf.len() && !self.fill_line()? {
                return Err(InstanceLoaderError::UnexpectedEof);
            }

            // Skip whitespace and comments
            while self.pos < self.buf.len() {
                let remainder = &self.buf[self.pos..];

                if remainder.starts_with('#') {
                    self.pos = self.buf.len();
                    break;
                }

                let c = remainder.chars().next().unwrap();
                if !c.is_whitespace() {
                    break;
                }

                self.pos += c.len_utf8();
            }

            if self.pos >= self.buf.len() {
                continue;
            }

            // Find end of token
            let mut end = self.pos;
            while end < self.buf.len() {
                let remainder = &self.buf[end..];

                if remainder.starts_with('#') {
                    break;
                }

                let c = remainder.chars().next().unwrap();
                if c.is_whitespace() {
                    break;
                }
                end += c.len_utf8();
            }

            let token = self.buf[self.pos..end].to_owned();
            self.pos = end;

            if token.is_empty() {
                continue;
            }

            return Ok(token);
        }
    }

    /// Reads the next token and parses it into `T`.
    fn next<T>(&mut self) -> Result<T, InstanceLoaderError>
    where
        T: FromStr,
    {
        let token = self.next_token()?;
        token.parse::<T>().map_err(|_| {
            InstanceLoaderError::Parse(ParseTokenError {
                token,
                type_name: std::any::type_name::<T>(),
            })
        })
    }

    /// Consumes the next token and checks it equals the expected header
    /// tag (case-insensitive).
    fn expect_tag(&mut self, expected: &'static str) -> Result<(), InstanceLoaderError> {
        let token = self.next_token()?;
        if token.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(InstanceLoaderError::MissingTag(MissingTagError {
                expected,
                found: token,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_INSTANCE: &str = r#"
        n 3            # three vertices on a line
        m 1
        b 10
        0 0 0
        1 0 7
        2 0 0
    "#;

    #[test]
    fn test_loads_and_builds_euclidean_graph() {
        let instance = InstanceLoader::new().from_str(LINE_INSTANCE).expect("load");

        assert_eq!(instance.num_vertices(), 3);
        assert_eq!(instance.fleet_size(), 1);
        assert_eq!(instance.budget(), 10.0);
        assert_eq!(instance.source(), VertexIndex::new(0));
        assert_eq!(instance.destination(), VertexIndex::new(2));
        assert_eq!(instance.prize(VertexIndex::new(1)), 7.0);

        // 0 -> 1, 0 -> 2, 1 -> 2 exist; nothing enters the source or
        // leaves the destination.
        assert_eq!(
            instance.arc_weight(VertexIndex::new(0), VertexIndex::new(1)),
            Some(1.0)
        );
        assert_eq!(
            instance.arc_weight(VertexIndex::new(0), VertexIndex::new(2)),
            Some(2.0)
        );
        assert_eq!(
            instance.arc_weight(VertexIndex::new(1), VertexIndex::new(2)),
            Some(1.0)
        );
        assert!(!instance.has_arc(VertexIndex::new(1), VertexIndex::new(0)));
        assert!(!instance.has_arc(VertexIndex::new(2), VertexIndex::new(1)));
        assert_eq!(instance.num_arcs(), 3);
    }

    #[test]
    fn test_budget_filters_long_arcs() {
        let data = "n 3 m 1 b 1.5  0 0 0  1 0 5  2 0 0";
        let instance = InstanceLoader::new().from_str(data).expect("load");
        // 0 -> 2 has distance 2 > budget and is dropped.
        assert!(instance.has_arc(VertexIndex::new(0), VertexIndex::new(1)));
        assert!(!instance.has_arc(VertexIndex::new(0), VertexIndex::new(2)));
    }

    #[test]
    fn test_missing_tag_is_reported() {
        let data = "x 3 m 1 b 10  0 0 0  1 0 7  2 0 0";
        let res = InstanceLoader::new().from_str(data);
        match res {
            Err(InstanceLoaderError::MissingTag(e)) => {
                assert_eq!(e.expected, "n");
                assert_eq!(e.found, "x");
            }
            _ => panic!("Expected MissingTag error"),
        }
    }

    #[test]
    fn test_parse_error_structure() {
        let data = "n 3 m 1 b 10  0 0 garbage";
        let res = InstanceLoader::new().from_str(data);
        match res {
            Err(InstanceLoaderError::Parse(e)) => {
                assert_eq!(e.token, "garbage");
                assert!(e.type_name.contains("f64"));
            }
            _ => panic!("Expected Parse error with context"),
        }
    }

    #[test]
    fn test_truncated_input() {
        let data = "n 3 m 1 b 10  0 0 0  1 0 7";
        let res = InstanceLoader::new().from_str(data);
        assert!(matches!(res, Err(InstanceLoaderError::UnexpectedEof)));
    }

    #[test]
    fn test_invalid_header_values() {
        for data in [
            "n 1 m 1 b 10  0 0 0",
            "n 3 m 0 b 10  0 0 0  1 0 7  2 0 0",
            "n 3 m 1 b 0  0 0 0  1 0 7  2 0 0",
        ] {
            let res = InstanceLoader::new().from_str(data);
            assert!(
                matches!(res, Err(InstanceLoaderError::InvalidHeader)),
                "input {:?} should be rejected",
                data
            );
        }
    }
}
