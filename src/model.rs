//! Data model for back-translation.
//!
//! This module contains all data structures shared by the pipeline stages:
//! - BLAST hits and the per-locus set of selected hits
//! - Query rows of the amino-acid alignment
//! - Subject nucleotide sequences of a locus database
//! - Back-translated output records
//!
//! Collections that drive iteration keep insertion order so that two runs
//! over the same inputs write the same bytes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};

/// Gap character used in both the amino-acid and the DNA alignment.
pub const GAP: u8 = b'-';

/// Gap placeholder for one amino-acid column in the DNA alignment.
pub const GAP_CODON: [u8; 3] = *b"---";

/// Strand of a BLAST hit on its subject sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// Signed reading frame as reported by BLAST.
///
/// Only the sign matters: frames 1, 2 and 3 all read the forward strand
/// from the hit start, frames -1, -2 and -3 all read the reverse strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame(pub i32);

impl Frame {
    /// Returns the strand for frames in 1..=3 and -3..=-1, `None` otherwise.
    pub fn strand(self) -> Option<Strand> {
        match self.0 {
            1..=3 => Some(Strand::Forward),
            -3..=-1 => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// One parsed BLAST record.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub subject_id: String,
    /// Start of the hit in the ungapped query (1-based)
    pub query_start: usize,
    /// End of the hit in the ungapped query (1-based, inclusive)
    pub query_end: usize,
    /// Start of the hit in the subject (1-based).
    /// Larger than `subject_end` on the reverse strand.
    pub subject_start: usize,
    /// End of the hit in the subject (1-based, inclusive)
    pub subject_end: usize,
    pub frame: Frame,
    pub aligned_query: String,
    pub aligned_subject_translation: String,
    pub query_id: String,
    pub bitscore: f64,
    pub percent_identity: f64,
}

/// The best hit of every query in one locus.
///
/// Holds at most one hit per query id, in the order in which the query ids
/// were first met in the BLAST file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedHitSet {
    hits: Vec<Hit>,
}

impl SelectedHitSet {
    /// Wraps hits that already hold one record per query id.
    pub(crate) fn from_unique(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    /// Returns the number of selected hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if no hit survived selection.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterates the selected hits in query encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Gets the selected hit for a query.
    pub fn get(&self, query_id: &str) -> Option<&Hit> {
        self.hits.iter().find(|hit| hit.query_id == query_id)
    }

    /// Returns the distinct subject ids referenced by the selected hits.
    pub fn subject_ids(&self) -> HashSet<&str> {
        self.hits.iter().map(|hit| hit.subject_id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a SelectedHitSet {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from the FASTA header, without '>')
    pub id: String,
    /// The sequence data (gapped amino acids or nucleotides)
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the index of the first non-gap character.
    pub fn first_residue(&self) -> Option<usize> {
        self.data.bytes().position(|b| b != GAP)
    }
}

/// Rows of the amino-acid alignment, keyed by query id.
#[derive(Debug, Clone, Default)]
pub struct QueryRows {
    rows: Vec<Sequence>,
    index: HashMap<String, usize>,
}

impl QueryRows {
    /// Creates an empty set of rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row. A repeated id keeps its position and takes the new data.
    pub fn insert(&mut self, row: Sequence) {
        match self.index.get(&row.id) {
            Some(&pos) => self.rows[pos] = row,
            None => {
                self.index.insert(row.id.clone(), self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// Gets the row of a query.
    pub fn get(&self, query_id: &str) -> Option<&Sequence> {
        self.index.get(query_id).map(|&pos| &self.rows[pos])
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.rows.iter()
    }
}

impl FromIterator<Sequence> for QueryRows {
    fn from_iter<T: IntoIterator<Item = Sequence>>(iter: T) -> Self {
        let mut rows = QueryRows::new();
        for row in iter {
            rows.insert(row);
        }
        rows
    }
}

/// Nucleotide sequences of one locus database, keyed by subject id.
///
/// Bases are kept as raw bytes: the database is never decoded as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSequences {
    sequences: HashMap<String, Vec<u8>>,
}

impl SubjectSequences {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sequence unless the id is already present.
    ///
    /// Returns true if the sequence was stored.
    pub fn insert_first(&mut self, id: impl Into<String>, data: impl Into<Vec<u8>>) -> bool {
        let id = id.into();
        if self.sequences.contains_key(&id) {
            return false;
        }
        self.sequences.insert(id, data.into());
        true
    }

    /// Gets the sequence of a subject.
    pub fn get(&self, subject_id: &str) -> Option<&[u8]> {
        self.sequences.get(subject_id).map(Vec::as_slice)
    }

    /// Returns true if the subject is present.
    pub fn contains(&self, subject_id: &str) -> bool {
        self.sequences.contains_key(subject_id)
    }

    /// Returns the number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if no sequence was captured.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// One back-translated alignment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRecord {
    pub query_id: String,
    pub subject_id: String,
    /// Gapped DNA, three bytes per amino-acid column
    pub sequence: Vec<u8>,
    /// Codons whose translation disagrees with the residue they were placed under
    pub mismatches: usize,
}

impl AlignedRecord {
    /// Returns the header line without the leading '>'.
    pub fn header(&self) -> String {
        format!("{}|{}", self.query_id, self.subject_id)
    }

    /// Writes the header and sequence lines, bases copied byte for byte.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, ">{}|{}", self.query_id, self.subject_id)?;
        out.write_all(&self.sequence)?;
        out.write_all(b"\n")
    }
}

/// Renders the record as its two output lines, without the final newline.
impl fmt::Display for AlignedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ">{}|{}\n{}",
            self.query_id,
            self.subject_id,
            String::from_utf8_lossy(&self.sequence)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_strand() {
        assert_eq!(Frame(1).strand(), Some(Strand::Forward));
        assert_eq!(Frame(3).strand(), Some(Strand::Forward));
        assert_eq!(Frame(-2).strand(), Some(Strand::Reverse));
        assert_eq!(Frame(0).strand(), None);
        assert_eq!(Frame(4).strand(), None);
        assert_eq!(Frame(-4).strand(), None);
    }

    #[test]
    fn test_first_residue() {
        assert_eq!(Sequence::new("q", "--MK-").first_residue(), Some(2));
        assert_eq!(Sequence::new("q", "MK").first_residue(), Some(0));
        assert_eq!(Sequence::new("q", "---").first_residue(), None);
        assert_eq!(Sequence::new("q", "").first_residue(), None);
    }

    #[test]
    fn test_query_rows_keep_first_position() {
        let rows: QueryRows = vec![
            Sequence::new("a", "MK"),
            Sequence::new("b", "M-"),
            Sequence::new("a", "KK"),
        ]
        .into_iter()
        .collect();

        assert_eq!(rows.len(), 2);
        let ids: Vec<&str> = rows.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(rows.get("a").unwrap().data, "KK");
    }

    #[test]
    fn test_subject_first_occurrence_wins() {
        let mut subjects = SubjectSequences::new();
        assert!(subjects.insert_first("s1", "ACGT"));
        assert!(!subjects.insert_first("s1", "TTTT"));
        assert_eq!(subjects.get("s1"), Some(&b"ACGT"[..]));
        assert!(!subjects.contains("s2"));
    }

    #[test]
    fn test_record_display() {
        let record = AlignedRecord {
            query_id: "q1".to_string(),
            subject_id: "s1".to_string(),
            sequence: b"ATG---".to_vec(),
            mismatches: 0,
        };
        assert_eq!(record.to_string(), ">q1|s1\nATG---");
        assert_eq!(record.header(), "q1|s1");
    }

    #[test]
    fn test_record_write_keeps_raw_bytes() {
        let record = AlignedRecord {
            query_id: "q1".to_string(),
            subject_id: "s1".to_string(),
            sequence: vec![b'A', 0xE9, b'G', b'-', b'-', b'-'],
            mismatches: 0,
        };

        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert_eq!(out, b">q1|s1\nA\xE9G---\n");
    }
}
