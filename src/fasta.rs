//! Amino-acid alignment parser.
//!
//! This module reads the query alignment: FASTA records whose rows may
//! contain `-` gaps and may span several lines.
//!
//! ## Format
//!
//! ```text
//! >query_identifier
//! MK--VLA
//! TT-
//! >another_query
//! M---VLATT--
//! ```
//!
//! The whole header line after '>' is the identifier, since it has to match
//! the query id column of the BLAST records verbatim. Text before the first
//! header is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::model::{QueryRows, Sequence};

/// Errors that can occur while reading the query alignment.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Failed to read query file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Query file contains no sequences")]
    EmptyFile,

    #[error("Empty sequence identifier at line {0}")]
    EmptyIdentifier(usize),
}

/// Result type for query alignment operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Parses the query alignment file.
///
/// # Examples
///
/// ```no_run
/// use backtodna::fasta::parse_query_file;
///
/// let rows = parse_query_file("alignment.faa").unwrap();
/// println!("Loaded {} query rows", rows.len());
/// ```
pub fn parse_query_file<P: AsRef<Path>>(path: P) -> QueryResult<QueryRows> {
    let file = File::open(path)?;
    parse_query_alignment(BufReader::new(file))
}

/// Parses query rows from a reader.
pub fn parse_query_alignment<R: BufRead>(reader: R) -> QueryResult<QueryRows> {
    let mut rows = QueryRows::new();
    let mut current_id: Option<String> = None;
    let mut current_seq = String::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            // Save previous row, even an empty one: the BLAST side may still name it
            if let Some(id) = current_id.take() {
                rows.insert(Sequence::new(id, std::mem::take(&mut current_seq)));
            }

            let id = header.trim();
            if id.is_empty() {
                return Err(QueryError::EmptyIdentifier(idx + 1));
            }
            current_id = Some(id.to_string());
        } else if current_id.is_some() {
            current_seq.push_str(line);
        }
    }

    if let Some(id) = current_id {
        rows.insert(Sequence::new(id, current_seq));
    }

    if rows.is_empty() {
        return Err(QueryError::EmptyFile);
    }

    Ok(rows)
}

/// Parses query rows from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_query_str(content: &str) -> QueryResult<QueryRows> {
    parse_query_alignment(content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_alignment() {
        let rows = parse_query_str(">q1\nMK-V\n>q2\n-KLV\n").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.get("q1").unwrap().data, "MK-V");
        assert_eq!(rows.get("q2").unwrap().data, "-KLV");
    }

    #[test]
    fn test_parse_multiline_row() {
        let rows = parse_query_str(">q1\nMK--\nVL\r\nA-\n").unwrap();
        assert_eq!(rows.get("q1").unwrap().data, "MK--VLA-");
    }

    #[test]
    fn test_full_header_is_identifier() {
        let rows = parse_query_str(">q1 some description\nMK\n").unwrap();
        assert!(rows.get("q1").is_none());
        assert_eq!(rows.get("q1 some description").unwrap().data, "MK");
    }

    #[test]
    fn test_preamble_ignored() {
        let rows = parse_query_str("CLUSTAL junk\n>q1\nMK\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get("q1").unwrap().data, "MK");
    }

    #[test]
    fn test_empty_row_kept() {
        let rows = parse_query_str(">q1\n>q2\nMK\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.get("q1").unwrap().is_empty());
    }

    #[test]
    fn test_file_order_preserved() {
        let rows = parse_query_str(">b\nM\n>a\nK\n>c\nV\n").unwrap();
        let ids: Vec<&str> = rows.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_query_str(""), Err(QueryError::EmptyFile)));
        assert!(matches!(parse_query_str("MKV\n"), Err(QueryError::EmptyFile)));
    }

    #[test]
    fn test_empty_identifier() {
        let result = parse_query_str(">q1\nMK\n>\nVV\n");
        assert!(matches!(result, Err(QueryError::EmptyIdentifier(3))));
    }
}
