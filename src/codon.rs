//! Extraction of hit regions as codon sequences.
//!
//! Forward frames read `subject[start-1..end]`. Reverse frames read the
//! complement of `subject[end-1..start]` backwards, since BLAST reports
//! reverse-strand hits with `start > end`. The frame magnitude is not used:
//! a hit always starts on its first codon.

use crate::model::{Frame, Strand};

/// Complements a single base. Only upper-case A, C, G and T are paired;
/// everything else passes through unchanged.
pub fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Complements every base of a sequence without reversing it.
pub fn complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().map(|&b| complement_base(b)).collect()
}

/// A codon as three raw bases.
pub type Codon = [u8; 3];

/// Splits a sequence into consecutive codons.
///
/// A trailing partial codon of one or two bases is dropped.
pub fn codons(sequence: &[u8]) -> Vec<Codon> {
    sequence
        .chunks_exact(3)
        .map(|codon| [codon[0], codon[1], codon[2]])
        .collect()
}

/// Returns the codons of the region `start..=end` (1-based) of `subject`.
///
/// Out-of-range coordinates are clamped to the sequence, so a malformed
/// hit yields fewer codons instead of a panic.
pub fn translate(subject: &[u8], start: usize, end: usize, frame: Frame) -> Vec<Codon> {
    match frame.strand() {
        Some(Strand::Forward) => codons(region(subject, start, end)),
        Some(Strand::Reverse) => {
            // Complementing the slice gives the same bases as slicing the complement
            let mut region = complement(region(subject, end, start));
            region.reverse();
            codons(&region)
        }
        None => Vec::new(),
    }
}

/// Slices `bytes[low-1..high]`, clamped to the sequence bounds.
fn region(bytes: &[u8], low: usize, high: usize) -> &[u8] {
    let from = low.saturating_sub(1).min(bytes.len());
    let to = high.min(bytes.len());
    if from >= to {
        return &[];
    }
    &bytes[from..to]
}
