use super::codon::{AminoAcid, ModelError};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

/// An amino-acid sequence as handed to the design engines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProteinSequence {
    residues: Vec<AminoAcid>,
}

impl ProteinSequence {
    pub fn new(residues: Vec<AminoAcid>) -> Self {
        Self { residues }
    }

    /// `M`, then `length - 2` uniformly drawn residues, then a stop symbol.
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Result<Self, ModelError> {
        if length < 2 {
            return Err(ModelError::SequenceTooShort {
                min: 2,
                actual: length,
            });
        }
        let mut residues = Vec::with_capacity(length);
        residues.push(AminoAcid::Methionine);
        for _ in 0..length - 2 {
            let aa = AminoAcid::residues()
                .choose(rng)
                .copied()
                .unwrap_or(AminoAcid::Leucine);
            residues.push(aa);
        }
        residues.push(AminoAcid::Stop);
        Ok(Self { residues })
    }

    /// `M` followed by `length - 1` leucines.
    pub fn methionine_leucine(length: usize) -> Result<Self, ModelError> {
        if length < 1 {
            return Err(ModelError::SequenceTooShort {
                min: 1,
                actual: length,
            });
        }
        let mut residues = vec![AminoAcid::Leucine; length];
        residues[0] = AminoAcid::Methionine;
        Ok(Self { residues })
    }

    pub fn residues(&self) -> &[AminoAcid] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Number of nucleotides in any coding sequence for this protein.
    pub fn coding_length(&self) -> usize {
        self.residues.len() * 3
    }
}

impl FromStr for ProteinSequence {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let residues = s
            .trim()
            .chars()
            .map(|c| AminoAcid::from_letter(c).ok_or_else(|| ModelError::UnknownAminoAcid(c.into())))
            .collect::<Result<Vec<_>, _>>()?;
        if residues.is_empty() {
            return Err(ModelError::SequenceTooShort { min: 1, actual: 0 });
        }
        Ok(Self { residues })
    }
}

impl fmt::Display for ProteinSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for aa in &self.residues {
            write!(f, "{}", aa.letter())?;
        }
        Ok(())
    }
}
