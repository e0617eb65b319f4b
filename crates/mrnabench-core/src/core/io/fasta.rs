use super::traits::{ArtifactError, InputArtifact};
use crate::core::models::protein::ProteinSequence;
use std::io::Write;

/// Header label used for every record handed to an engine.
pub const RECORD_HEADER: &str = "seq";

/// A two-line FASTA record: `>seq` followed by the raw protein sequence.
#[derive(Debug, Clone, Copy)]
pub struct FastaRecord<'a> {
    sequence: &'a ProteinSequence,
}

impl<'a> FastaRecord<'a> {
    pub fn new(sequence: &'a ProteinSequence) -> Self {
        Self { sequence }
    }
}

impl InputArtifact for FastaRecord<'_> {
    const PREFIX: &'static str = "mrnabench-fasta-";

    fn write_to(&self, writer: &mut impl Write) -> Result<(), ArtifactError> {
        writeln!(writer, ">{RECORD_HEADER}")?;
        write!(writer, "{}", self.sequence)?;
        Ok(())
    }
}
