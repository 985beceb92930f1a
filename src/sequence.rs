//! Nucleotide sequence transforms.
//!
//! This module provides the stateless string operations:
//! - DNA ↔ RNA transcription (T ↔ U)
//! - Reverse complement
//! - Length and GC content, ignoring gap characters
//!
//! Case is preserved by every transform: lowercase bases map to lowercase
//! bases, uppercase to uppercase. Characters outside the nucleotide alphabet
//! pass through unchanged.

/// Returns true for characters that are not counted as bases
/// (whitespace and the alignment gap `-`).
fn is_gap(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

/// Transcribes DNA to RNA by replacing every `T` with `U`.
///
/// # Examples
///
/// ```
/// use seqpop::sequence::dna_to_rna;
///
/// assert_eq!(dna_to_rna("ATCG"), "AUCG");
/// assert_eq!(dna_to_rna("atcg"), "aucg");
/// ```
pub fn dna_to_rna(seq: &str) -> String {
    seq.chars()
        .map(|c| match c {
            'T' => 'U',
            't' => 'u',
            _ => c,
        })
        .collect()
}

/// Back-transcribes RNA to DNA by replacing every `U` with `T`.
pub fn rna_to_dna(seq: &str) -> String {
    seq.chars()
        .map(|c| match c {
            'U' => 'T',
            'u' => 't',
            _ => c,
        })
        .collect()
}

/// Returns the Watson-Crick complement of a single base.
///
/// # Rules:
/// - A ↔ T, C ↔ G (case preserved)
/// - U (RNA) complements to A
/// - Anything else is returned unchanged
pub fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' | 'U' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' | 'u' => 'a',
        'c' => 'g',
        'g' => 'c',
        _ => base,
    }
}

/// Reverses a sequence and complements each base.
///
/// # Examples
///
/// ```
/// use seqpop::sequence::reverse_complement;
///
/// assert_eq!(reverse_complement("ATCG"), "CGAT");
/// assert_eq!(reverse_complement("ATGN"), "NCAT");
/// ```
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

/// Counts the bases in a sequence, ignoring whitespace and `-`.
pub fn sequence_length(seq: &str) -> usize {
    seq.chars().filter(|&c| !is_gap(c)).count()
}

/// Computes the fraction of G and C bases, case-insensitively.
///
/// Whitespace and `-` are excluded from both numerator and denominator.
/// Works the same for DNA and RNA since only G/C are counted.
/// Returns 0.0 when no bases remain.
pub fn gc_content(seq: &str) -> f64 {
    let mut total = 0usize;
    let mut gc = 0usize;

    for c in seq.chars().filter(|&c| !is_gap(c)) {
        total += 1;
        if matches!(c.to_ascii_uppercase(), 'G' | 'C') {
            gc += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    gc as f64 / total as f64
}

/// Length and GC content of a sequence, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSummary {
    /// Number of bases (gaps and whitespace excluded)
    pub length: usize,
    /// Fraction of G/C bases in [0, 1]
    pub gc_content: f64,
}

impl SequenceSummary {
    /// Summarizes a sequence.
    pub fn of(seq: &str) -> Self {
        Self {
            length: sequence_length(seq),
            gc_content: gc_content(seq),
        }
    }

    /// Renders the summary as display lines.
    pub fn to_lines(&self) -> Vec<String> {
        vec![
            format!("Length: {}", self.length),
            format!("GC content: {:.2}%", self.gc_content * 100.0),
        ]
    }
}
