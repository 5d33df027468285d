//! Genetic code tables for checking back-translated codons.
//!
//! The reconstructed DNA row is never altered by this module. It only tells
//! whether a codon encodes the residue it was placed under, which flags
//! hits whose coordinates do not line up with the query row.

use std::collections::HashMap;

/// Amino acids of the standard code (NCBI table 1) in NCBI codon order.
const STANDARD_NCBIEAA: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// A genetic code table for translating codons to amino acids.
#[derive(Debug, Clone)]
pub struct GeneticCode {
    /// NCBI genetic code ID
    pub id: u8,
    /// Name of the genetic code
    pub name: &'static str,
    codon_table: HashMap<[u8; 3], u8>,
}

impl GeneticCode {
    /// Builds a table from the 64-character NCBI `ncbieaa` string
    /// (codon order TTT, TTC, TTA, TTG, TCT, ...).
    fn new(id: u8, name: &'static str, ncbieaa: &str) -> Self {
        const BASES: [u8; 4] = [b'T', b'C', b'A', b'G'];

        let mut codon_table = HashMap::with_capacity(64);
        let mut residues = ncbieaa.bytes();
        for b1 in BASES {
            for b2 in BASES {
                for b3 in BASES {
                    codon_table.insert([b1, b2, b3], residues.next().unwrap_or(b'X'));
                }
            }
        }

        Self {
            id,
            name,
            codon_table,
        }
    }

    /// Translates a codon. Lower case and U are accepted; anything that is
    /// not three unambiguous bases gives `None`.
    pub fn translate_codon(&self, codon: &[u8]) -> Option<char> {
        if codon.len() != 3 {
            return None;
        }

        let mut key = [0u8; 3];
        for (slot, &b) in key.iter_mut().zip(codon) {
            *slot = match b.to_ascii_uppercase() {
                b'U' => b'T',
                other => other,
            };
        }

        self.codon_table.get(&key).map(|&aa| aa as char)
    }

    /// Checks a codon against the residue of its alignment column.
    ///
    /// Returns `None` when the pair cannot be judged: unknown residue `X`,
    /// a gap, or an ambiguous codon. Stops match both `*` and `_`.
    pub fn encodes(&self, codon: &[u8], residue: u8) -> Option<bool> {
        let residue = residue.to_ascii_uppercase();
        if matches!(residue, b'X' | b'-' | b'.') {
            return None;
        }
        let aa = self.translate_codon(codon)? as u8;
        if aa == b'*' {
            return Some(matches!(residue, b'*' | b'_'));
        }
        Some(aa == residue)
    }
}

/// The NCBI genetic codes available for the consistency check.
pub struct GeneticCodes {
    codes: Vec<GeneticCode>,
}

impl GeneticCodes {
    /// Creates the set of supported NCBI genetic codes.
    pub fn new() -> Self {
        let codes = vec![
            GeneticCode::default(),
            GeneticCode::new(
                2,
                "Vertebrate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                3,
                "Yeast Mitochondrial",
                "FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                4,
                "Mold/Protozoan/Coelenterate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                5,
                "Invertebrate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                6,
                "Ciliate/Dasycladacean/Hexamita Nuclear",
                "FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                9,
                "Echinoderm/Flatworm Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG",
            ),
            GeneticCode::new(
                11,
                "Bacterial/Archaeal/Plant Plastid",
                "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
            ),
        ];

        Self { codes }
    }

    /// Gets a genetic code by ID.
    pub fn get(&self, id: u8) -> Option<&GeneticCode> {
        self.codes.iter().find(|c| c.id == id)
    }

    /// Returns the IDs of all supported codes.
    pub fn ids(&self) -> Vec<u8> {
        self.codes.iter().map(|c| c.id).collect()
    }

    /// Removes and returns a code by ID.
    pub fn take(mut self, id: u8) -> Option<GeneticCode> {
        let pos = self.codes.iter().position(|c| c.id == id)?;
        Some(self.codes.swap_remove(pos))
    }
}

impl Default for GeneticCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for GeneticCode {
    /// The standard code (NCBI table 1).
    fn default() -> Self {
        GeneticCode::new(1, "Standard", STANDARD_NCBIEAA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_code_translation() {
        let standard = GeneticCode::default();

        assert_eq!(standard.translate_codon(b"ATG"), Some('M'));
        assert_eq!(standard.translate_codon(b"TAA"), Some('*'));
        assert_eq!(standard.translate_codon(b"TGA"), Some('*'));
        assert_eq!(standard.translate_codon(b"TTT"), Some('F'));
        assert_eq!(standard.translate_codon(b"GGG"), Some('G'));
    }

    #[test]
    fn test_rna_and_case() {
        let standard = GeneticCode::default();

        assert_eq!(standard.translate_codon(b"AUG"), Some('M'));
        assert_eq!(standard.translate_codon(b"atg"), Some('M'));
    }

    #[test]
    fn test_untranslatable_codons() {
        let standard = GeneticCode::default();

        assert_eq!(standard.translate_codon(b"ATN"), None);
        assert_eq!(standard.translate_codon(b"---"), None);
        assert_eq!(standard.translate_codon(b"AT"), None);
    }

    #[test]
    fn test_encodes() {
        let standard = GeneticCode::default();

        assert_eq!(standard.encodes(b"ATG", b'M'), Some(true));
        assert_eq!(standard.encodes(b"ATG", b'm'), Some(true));
        assert_eq!(standard.encodes(b"AAA", b'M'), Some(false));
        assert_eq!(standard.encodes(b"TAG", b'*'), Some(true));
        assert_eq!(standard.encodes(b"TAG", b'_'), Some(true));
        assert_eq!(standard.encodes(b"ATG", b'X'), None);
        assert_eq!(standard.encodes(b"NNN", b'M'), None);
    }

    #[test]
    fn test_different_genetic_codes() {
        let codes = GeneticCodes::new();

        // TGA is a stop in the standard code and Trp in vertebrate mitochondria
        assert_eq!(codes.get(1).unwrap().translate_codon(b"TGA"), Some('*'));
        assert_eq!(codes.get(2).unwrap().translate_codon(b"TGA"), Some('W'));
        assert!(codes.get(7).is_none());
    }

    #[test]
    fn test_take() {
        let code = GeneticCodes::new().take(11).unwrap();
        assert_eq!(code.id, 11);
        assert!(GeneticCodes::new().take(99).is_none());
        assert!(GeneticCodes::new().ids().contains(&5));
    }
}
