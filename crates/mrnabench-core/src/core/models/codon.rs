use phf::{Map, phf_map};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid codon '{0}': expected three nucleotides from {{A, U, C, G}}")]
    InvalidCodon(String),
    #[error("Unknown amino acid symbol '{0}'")]
    UnknownAminoAcid(String),
    #[error("RNA sequence length {0} is not a multiple of three")]
    IncompleteCodon(usize),
    #[error("Protein sequence must contain at least {min} residues (got {actual})")]
    SequenceTooShort { min: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AminoAcid {
    Alanine,       // A (Ala)
    Arginine,      // R (Arg)
    Asparagine,    // N (Asn)
    AsparticAcid,  // D (Asp)
    Cysteine,      // C (Cys)
    Glutamine,     // Q (Gln)
    GlutamicAcid,  // E (Glu)
    Glycine,       // G (Gly)
    Histidine,     // H (His)
    Isoleucine,    // I (Ile)
    Leucine,       // L (Leu)
    Lysine,        // K (Lys)
    Methionine,    // M (Met)
    Phenylalanine, // F (Phe)
    Proline,       // P (Pro)
    Serine,        // S (Ser)
    Threonine,     // T (Thr)
    Tryptophan,    // W (Trp)
    Tyrosine,      // Y (Tyr)
    Valine,        // V (Val)
    Stop,          // * (End)
}

static THREE_LETTER_CODES: Map<&'static str, AminoAcid> = phf_map! {
    "Ala" => AminoAcid::Alanine,
    "Arg" => AminoAcid::Arginine,
    "Asn" => AminoAcid::Asparagine,
    "Asp" => AminoAcid::AsparticAcid,
    "Cys" => AminoAcid::Cysteine,
    "Gln" => AminoAcid::Glutamine,
    "Glu" => AminoAcid::GlutamicAcid,
    "Gly" => AminoAcid::Glycine,
    "His" => AminoAcid::Histidine,
    "Ile" => AminoAcid::Isoleucine,
    "Leu" => AminoAcid::Leucine,
    "Lys" => AminoAcid::Lysine,
    "Met" => AminoAcid::Methionine,
    "Phe" => AminoAcid::Phenylalanine,
    "Pro" => AminoAcid::Proline,
    "Ser" => AminoAcid::Serine,
    "Thr" => AminoAcid::Threonine,
    "Trp" => AminoAcid::Tryptophan,
    "Tyr" => AminoAcid::Tyrosine,
    "Val" => AminoAcid::Valine,
    "End" => AminoAcid::Stop,
};

impl AminoAcid {
    /// Every symbol of the alphabet, stop last.
    pub const ALL: [AminoAcid; 21] = [
        AminoAcid::Alanine,
        AminoAcid::Arginine,
        AminoAcid::Asparagine,
        AminoAcid::AsparticAcid,
        AminoAcid::Cysteine,
        AminoAcid::Glutamine,
        AminoAcid::GlutamicAcid,
        AminoAcid::Glycine,
        AminoAcid::Histidine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Lysine,
        AminoAcid::Methionine,
        AminoAcid::Phenylalanine,
        AminoAcid::Proline,
        AminoAcid::Serine,
        AminoAcid::Threonine,
        AminoAcid::Tryptophan,
        AminoAcid::Tyrosine,
        AminoAcid::Valine,
        AminoAcid::Stop,
    ];

    /// The twenty residues, without the stop symbol.
    pub fn residues() -> &'static [AminoAcid] {
        &Self::ALL[..20]
    }

    pub fn letter(self) -> char {
        match self {
            AminoAcid::Alanine => 'A',
            AminoAcid::Arginine => 'R',
            AminoAcid::Asparagine => 'N',
            AminoAcid::AsparticAcid => 'D',
            AminoAcid::Cysteine => 'C',
            AminoAcid::Glutamine => 'Q',
            AminoAcid::GlutamicAcid => 'E',
            AminoAcid::Glycine => 'G',
            AminoAcid::Histidine => 'H',
            AminoAcid::Isoleucine => 'I',
            AminoAcid::Leucine => 'L',
            AminoAcid::Lysine => 'K',
            AminoAcid::Methionine => 'M',
            AminoAcid::Phenylalanine => 'F',
            AminoAcid::Proline => 'P',
            AminoAcid::Serine => 'S',
            AminoAcid::Threonine => 'T',
            AminoAcid::Tryptophan => 'W',
            AminoAcid::Tyrosine => 'Y',
            AminoAcid::Valine => 'V',
            AminoAcid::Stop => '*',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        Self::ALL.iter().copied().find(|aa| aa.letter() == upper)
    }

    /// Parses the three-letter codes used by GCG codon usage tables (`End` is stop).
    pub fn from_three_letter(code: &str) -> Option<Self> {
        THREE_LETTER_CODES.get(code).copied()
    }

    pub fn is_stop(self) -> bool {
        self == AminoAcid::Stop
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl Serialize for AminoAcid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.letter())
    }
}

/// A ribonucleotide triplet over `{A, U, C, G}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Codon([u8; 3]);

impl Codon {
    /// Parses a DNA-alphabet triplet, mapping `T` to `U`.
    pub fn from_dna(triplet: &str) -> Result<Self, ModelError> {
        let rna: String = triplet
            .chars()
            .map(|c| match c.to_ascii_uppercase() {
                'T' => 'U',
                other => other,
            })
            .collect();
        rna.parse().map_err(|_| ModelError::InvalidCodon(triplet.to_string()))
    }

    /// Splits an RNA sequence into consecutive triplets.
    pub fn segment(rna_sequence: &str) -> Result<Vec<Codon>, ModelError> {
        let bytes = rna_sequence.as_bytes();
        if bytes.len() % 3 != 0 {
            return Err(ModelError::IncompleteCodon(bytes.len()));
        }
        bytes
            .chunks(3)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .map_err(|_| ModelError::InvalidCodon(String::from_utf8_lossy(chunk).into()))?
                    .parse()
            })
            .collect()
    }

    pub fn nucleotides(&self) -> [char; 3] {
        self.0.map(char::from)
    }
}

impl FromStr for Codon {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| matches!(b, b'A' | b'U' | b'C' | b'G')) {
            return Err(ModelError::InvalidCodon(s.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.nucleotides();
        write!(f, "{a}{b}{c}")
    }
}

impl Serialize for Codon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
