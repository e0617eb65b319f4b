use super::parsing::{after_prefix, before, number};
use super::{Engine, EngineKind, ParsedFold, PreparedRun};
use crate::core::io::codon_csv::DenseCodonTable;
use crate::core::io::fasta::FastaRecord;
use crate::core::io::traits::{self, ArtifactError, InputArtifact, TempArtifact};
use crate::core::models::protein::ProteinSequence;
use crate::core::tables::codon_usage::CodonLookup;
use crate::engine::error::ParseError;
use crate::engine::process::ProcessSpec;
use std::path::{Path, PathBuf};

const EXECUTABLE: &str = "build/derna";
const OUTPUT_PREFIX: &str = "mrnabench-derna-out-";

const RNA_MARKER: &str = "zuker cai rna:";
const STRUCTURE_MARKER: &str = "zuker cai bp:";
const CAI_MARKER: &str = "Codon Adaptation Index:";
const MFE_MARKER: &str = "Minimum Free Energy:";

/// Scratch file DERNA leaves in the working directory of every run.
pub(crate) const LITTER_FILE: &str = "dd.txt";

/// DERNA reads a dense codon table and a FASTA file and writes its design to an output
/// file given on the command line.
#[derive(Debug, Clone)]
pub struct Derna {
    root: PathBuf,
    lambda: f64,
}

impl Derna {
    pub fn new(root: PathBuf, lambda: f64) -> Self {
        Self { root, lambda }
    }
}

impl Engine for Derna {
    fn kind(&self) -> EngineKind {
        EngineKind::Derna
    }

    fn prepare(
        &self,
        protein: &ProteinSequence,
        table: &dyn CodonLookup,
    ) -> Result<PreparedRun, ArtifactError> {
        let codons = DenseCodonTable::new(table).materialize()?;
        let fasta = FastaRecord::new(protein).materialize()?;
        let output = TempArtifact::empty(OUTPUT_PREFIX)?;
        let spec = ProcessSpec::new(self.root.join(EXECUTABLE))
            .arg("-c")
            .arg(codons.arg())
            .arg("-i")
            .arg(fasta.arg())
            .arg("-o")
            .arg(output.arg())
            .args(["-m", "1", "-s", "2", "-l"])
            .arg(format!("{:?}", self.lambda));
        Ok(PreparedRun::new(spec)
            .with_input(codons)
            .with_input(fasta)
            .with_output(output))
    }

    fn parse(&self, raw: &str) -> Result<ParsedFold, ParseError> {
        let rna_sequence = before(after_prefix(raw, RNA_MARKER)?, ".size");
        let structure = before(after_prefix(raw, STRUCTURE_MARKER)?, ",size");
        Ok(ParsedFold {
            rna_sequence: rna_sequence.to_string(),
            structure: structure.to_string(),
            mfe: number(MFE_MARKER, after_prefix(raw, MFE_MARKER)?)?,
            cai: Some(number(CAI_MARKER, after_prefix(raw, CAI_MARKER)?)?),
        })
    }

    fn clean_up(&self) {
        traits::remove_litter(Path::new(LITTER_FILE));
    }
}
