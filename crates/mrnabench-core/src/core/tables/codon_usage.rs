use crate::core::models::codon::{AminoAcid, Codon};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CodonTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Codon {codon} is assigned to both {first} and {second}")]
    ConflictingCodon {
        codon: Codon,
        first: AminoAcid,
        second: AminoAcid,
    },
    #[error("Codon {0} is not present in the codon table")]
    UnknownCodon(Codon),
    #[error("Amino acid {0} has no codon with a non-zero frequency")]
    ZeroMaxFrequency(AminoAcid),
    #[error("Cannot compute a codon adaptation index for an empty coding sequence")]
    EmptySequence,
}

/// Read-only view of a codon frequency table.
///
/// Only codons actually present in the table are reported; callers must not assume
/// all 64 triplets are known.
pub trait CodonLookup {
    /// Synonymous codons of `amino_acid`; empty when the table has none.
    fn codons_for(&self, amino_acid: AminoAcid) -> BTreeSet<Codon>;

    fn frequency(&self, codon: Codon) -> Option<u64>;

    fn max_frequency(&self, amino_acid: AminoAcid) -> Option<u64>;

    fn amino_acid_of(&self, codon: Codon) -> Option<AminoAcid>;

    /// `frequency(codon) / max_frequency(amino_acid_of(codon))`.
    fn adaptation_weight(&self, codon: Codon) -> Result<f64, CodonTableError> {
        let amino_acid = self
            .amino_acid_of(codon)
            .ok_or(CodonTableError::UnknownCodon(codon))?;
        let frequency = self
            .frequency(codon)
            .ok_or(CodonTableError::UnknownCodon(codon))?;
        match self.max_frequency(amino_acid) {
            Some(max) if max > 0 => Ok(frequency as f64 / max as f64),
            _ => Err(CodonTableError::ZeroMaxFrequency(amino_acid)),
        }
    }

    /// Mean of the natural logarithms of the adaptation weights.
    fn log_codon_adaptation_index(&self, codons: &[Codon]) -> Result<f64, CodonTableError> {
        if codons.is_empty() {
            return Err(CodonTableError::EmptySequence);
        }
        let mut total = 0.0;
        for &codon in codons {
            total += self.adaptation_weight(codon)?.ln();
        }
        Ok(total / codons.len() as f64)
    }

    /// Geometric mean of the adaptation weights, computed in log space.
    fn codon_adaptation_index(&self, codons: &[Codon]) -> Result<f64, CodonTableError> {
        self.log_codon_adaptation_index(codons).map(f64::exp)
    }
}

/// Immutable amino acid to codon frequency mapping.
#[derive(Debug, Clone, Default)]
pub struct CodonUsageTable {
    codon_to_amino_acid: BTreeMap<Codon, AminoAcid>,
    amino_acid_to_codons: BTreeMap<AminoAcid, BTreeSet<Codon>>,
    frequencies: BTreeMap<Codon, u64>,
    max_frequencies: BTreeMap<AminoAcid, u64>,
}

impl CodonUsageTable {
    /// Loads a table in the GCG "CodonFrequency" text layout.
    pub fn load(path: &Path) -> Result<Self, CodonTableError> {
        let file = File::open(path).map_err(|e| CodonTableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::read_from(BufReader::new(file)).map_err(|e| match e {
            CodonTableError::Io { source, .. } => CodonTableError::Io {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parses `AmAcid Codon Number [...]` lines.
    ///
    /// Lines with fewer than three tokens, or whose first token is not a three-letter
    /// amino-acid code, are headers or comments and are skipped. Codons are given in the
    /// DNA alphabet and stored in the RNA alphabet; counts are rounded to integers.
    pub fn read_from(reader: impl BufRead) -> Result<Self, CodonTableError> {
        let mut table = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| CodonTableError::Io {
                path: String::new(),
                source: e,
            })?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 {
                continue;
            }
            let Some(amino_acid) = AminoAcid::from_three_letter(tokens[0]) else {
                debug!(line = line_num, "Skipping non-record line in codon table.");
                continue;
            };
            let codon = Codon::from_dna(tokens[1]).map_err(|e| CodonTableError::Parse {
                line: line_num,
                message: e.to_string(),
            })?;
            let count: f64 = tokens[2].parse().map_err(|_| CodonTableError::Parse {
                line: line_num,
                message: format!("invalid codon count '{}'", tokens[2]),
            })?;
            if !count.is_finite() || count < 0.0 {
                return Err(CodonTableError::Parse {
                    line: line_num,
                    message: format!("codon count must be non-negative, got '{}'", tokens[2]),
                });
            }
            table.insert(amino_acid, codon, count.round() as u64)?;
        }
        Ok(table)
    }

    /// Builds a table from `(amino acid, codon, frequency)` entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (AminoAcid, Codon, u64)>,
    ) -> Result<Self, CodonTableError> {
        let mut table = Self::default();
        for (amino_acid, codon, frequency) in entries {
            table.insert(amino_acid, codon, frequency)?;
        }
        Ok(table)
    }

    fn insert(
        &mut self,
        amino_acid: AminoAcid,
        codon: Codon,
        frequency: u64,
    ) -> Result<(), CodonTableError> {
        if let Some(&existing) = self.codon_to_amino_acid.get(&codon) {
            if existing != amino_acid {
                return Err(CodonTableError::ConflictingCodon {
                    codon,
                    first: existing,
                    second: amino_acid,
                });
            }
        }
        self.codon_to_amino_acid.insert(codon, amino_acid);
        self.amino_acid_to_codons
            .entry(amino_acid)
            .or_default()
            .insert(codon);
        self.frequencies.insert(codon, frequency);
        let max = self.max_frequencies.entry(amino_acid).or_insert(0);
        *max = (*max).max(frequency);
        Ok(())
    }

    /// Size of the largest synonymous codon set.
    pub fn max_codons(&self) -> usize {
        self.amino_acid_to_codons
            .values()
            .map(BTreeSet::len)
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.codon_to_amino_acid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codon_to_amino_acid.is_empty()
    }
}

impl CodonLookup for CodonUsageTable {
    fn codons_for(&self, amino_acid: AminoAcid) -> BTreeSet<Codon> {
        self.amino_acid_to_codons
            .get(&amino_acid)
            .cloned()
            .unwrap_or_default()
    }

    fn frequency(&self, codon: Codon) -> Option<u64> {
        self.frequencies.get(&codon).copied()
    }

    fn max_frequency(&self, amino_acid: AminoAcid) -> Option<u64> {
        self.max_frequencies.get(&amino_acid).copied()
    }

    fn amino_acid_of(&self, codon: Codon) -> Option<AminoAcid> {
        self.codon_to_amino_acid.get(&codon).copied()
    }
}
