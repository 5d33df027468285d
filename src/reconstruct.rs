//! Back-translation of selected hits into gapped DNA rows.
//!
//! Each hit contributes the codons of its subject region. The codons are
//! laid out under the residues of the query row, starting at the query
//! position the hit starts at, with `---` wherever the query row has a gap:
//!
//! ```text
//! query   -  M  -  K  V  -
//! codons     ATG   AAA GTT
//! row     ---ATG---AAAGTT---
//! ```
//!
//! Every row is three bytes per query column. Codons left over
//! once the query row is exhausted are dropped.

use std::collections::{btree_map, BTreeMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::codon::{self, Codon};
use crate::genetic_code::GeneticCode;
use crate::model::{
    AlignedRecord, Hit, QueryRows, SelectedHitSet, SubjectSequences, GAP, GAP_CODON,
};

/// Errors that abort the reconstruction.
#[derive(Error, Debug)]
pub enum ReconstructError {
    #[error("Query '{0}' is not in the query alignment")]
    MissingQuery(String),

    #[error("Missing subject '{subject_id}' for locus '{locus}'")]
    MissingSubject { locus: String, subject_id: String },

    #[error("Query '{0}' has no residues, only gaps")]
    NoResidues(String),
}

/// Result type for reconstruction operations.
pub type ReconstructResult<T> = Result<T, ReconstructError>;

/// Lays codons out along a gapped query row.
///
/// `start` is the index of the query column the first codon belongs to.
pub fn gapped_row(query: &[u8], start: usize, codons: &[Codon]) -> Vec<u8> {
    let mut row = Vec::with_capacity(query.len() * 3);
    let mut cursor = start.min(query.len());
    row.extend_from_slice(&GAP_CODON.repeat(cursor));

    for codon in codons {
        while cursor < query.len() && query[cursor] == GAP {
            row.extend_from_slice(&GAP_CODON);
            cursor += 1;
        }
        if cursor == query.len() {
            break;
        }
        row.extend_from_slice(codon);
        cursor += 1;
    }

    row.extend_from_slice(&GAP_CODON.repeat(query.len() - cursor));
    row
}

/// Counts the codons of `row` that do not encode the residue of their column.
pub fn count_mismatches(query: &[u8], row: &[u8], code: &GeneticCode) -> usize {
    query
        .iter()
        .zip(row.chunks(3))
        .filter(|(_, codon)| *codon != &GAP_CODON[..])
        .filter_map(|(&residue, codon)| code.encodes(codon, residue))
        .filter(|&encodes| !encodes)
        .count()
}

/// Turns hits into alignment rows, one row per query for the whole run.
pub struct Reconstructor<'q> {
    queries: &'q QueryRows,
    code: GeneticCode,
    emitted: HashSet<String>,
}

impl<'q> Reconstructor<'q> {
    /// Creates a reconstructor that checks codons with the standard code.
    pub fn new(queries: &'q QueryRows) -> Self {
        Self {
            queries,
            code: GeneticCode::default(),
            emitted: HashSet::new(),
        }
    }

    /// Sets the genetic code used to check codons against residues.
    pub fn with_genetic_code(mut self, code: GeneticCode) -> Self {
        self.code = code;
        self
    }

    /// Returns the number of rows produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted.len()
    }

    /// Back-translates one hit.
    ///
    /// Returns `Ok(None)` when the query already has a row from an earlier
    /// hit, in this locus or a previous one.
    pub fn back_translate(
        &mut self,
        locus: &str,
        hit: &Hit,
        subjects: &SubjectSequences,
    ) -> ReconstructResult<Option<AlignedRecord>> {
        let query = self
            .queries
            .get(&hit.query_id)
            .ok_or_else(|| ReconstructError::MissingQuery(hit.query_id.clone()))?;

        let subject = subjects
            .get(&hit.subject_id)
            .ok_or_else(|| ReconstructError::MissingSubject {
                locus: locus.to_string(),
                subject_id: hit.subject_id.clone(),
            })?;

        let codons = codon::translate(subject, hit.subject_start, hit.subject_end, hit.frame);

        let first_residue = query
            .first_residue()
            .ok_or_else(|| ReconstructError::NoResidues(hit.query_id.clone()))?;
        let start = first_residue + hit.query_start.saturating_sub(1);

        if !self.emitted.insert(hit.query_id.clone()) {
            return Ok(None);
        }

        let query_bytes = query.data.as_bytes();
        let sequence = gapped_row(query_bytes, start, &codons);
        let mismatches = count_mismatches(query_bytes, &sequence, &self.code);
        if mismatches > 0 {
            debug!(
                "{}|{}: {} codons disagree with the query residues ({} codons, frame {})",
                hit.query_id,
                hit.subject_id,
                mismatches,
                codons.len(),
                hit.frame
            );
        }

        Ok(Some(AlignedRecord {
            query_id: hit.query_id.clone(),
            subject_id: hit.subject_id.clone(),
            sequence,
            mismatches,
        }))
    }

    /// Lazily back-translates the selected hits of one locus.
    pub fn rows<'a>(
        &'a mut self,
        locus: &'a str,
        hits: &'a SelectedHitSet,
        subjects: &'a SubjectSequences,
    ) -> LocusRows<'a, 'q> {
        LocusRows {
            reconstructor: self,
            cursor: HitCursor::new(locus, hits, subjects),
        }
    }
}

/// Position in the hits of one locus. Yields at most one error, then stops.
struct HitCursor<'a> {
    locus: &'a str,
    hits: std::slice::Iter<'a, Hit>,
    subjects: &'a SubjectSequences,
    failed: bool,
}

impl<'a> HitCursor<'a> {
    fn new(locus: &'a str, hits: &'a SelectedHitSet, subjects: &'a SubjectSequences) -> Self {
        Self {
            locus,
            hits: hits.iter(),
            subjects,
            failed: false,
        }
    }

    /// Produces the next row, skipping hits of queries that already have one.
    fn next_row(
        &mut self,
        reconstructor: &mut Reconstructor<'_>,
    ) -> Option<ReconstructResult<AlignedRecord>> {
        if self.failed {
            return None;
        }
        for hit in self.hits.by_ref() {
            match reconstructor.back_translate(self.locus, hit, self.subjects) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Rows of one locus, returned by [`Reconstructor::rows`].
pub struct LocusRows<'a, 'q> {
    reconstructor: &'a mut Reconstructor<'q>,
    cursor: HitCursor<'a>,
}

impl Iterator for LocusRows<'_, '_> {
    type Item = ReconstructResult<AlignedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_row(self.reconstructor)
    }
}

/// Lazily back-translates every locus, in locus name order.
pub fn reconstruct<'a>(
    queries: &'a QueryRows,
    hits_by_locus: &'a BTreeMap<String, SelectedHitSet>,
    subjects_by_locus: &'a BTreeMap<String, SubjectSequences>,
) -> Reconstruction<'a> {
    Reconstruction {
        reconstructor: Reconstructor::new(queries),
        loci: hits_by_locus.iter(),
        subjects_by_locus,
        current: None,
        failed: false,
    }
}

/// Iterator returned by [`reconstruct`]. Stops after the first error.
pub struct Reconstruction<'a> {
    reconstructor: Reconstructor<'a>,
    loci: btree_map::Iter<'a, String, SelectedHitSet>,
    subjects_by_locus: &'a BTreeMap<String, SubjectSequences>,
    current: Option<HitCursor<'a>>,
    failed: bool,
}

impl Iterator for Reconstruction<'_> {
    type Item = ReconstructResult<AlignedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(cursor) = &mut self.current {
                match cursor.next_row(&mut self.reconstructor) {
                    Some(Err(e)) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                    Some(row) => return Some(row),
                    None => {}
                }
            }

            let (locus, hits) = self.loci.next()?;
            match self.subjects_by_locus.get(locus) {
                Some(subjects) => self.current = Some(HitCursor::new(locus, hits, subjects)),
                None => {
                    self.current = None;
                    if let Some(hit) = hits.iter().next() {
                        self.failed = true;
                        return Some(Err(ReconstructError::MissingSubject {
                            locus: locus.clone(),
                            subject_id: hit.subject_id.clone(),
                        }));
                    }
                }
            }
        }
    }
}
