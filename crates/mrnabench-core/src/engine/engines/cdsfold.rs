use super::parsing::{before, number};
use super::{Engine, EngineKind, ParsedFold, PreparedRun};
use crate::core::io::fasta::FastaRecord;
use crate::core::io::traits::{ArtifactError, InputArtifact};
use crate::core::models::protein::ProteinSequence;
use crate::core::tables::codon_usage::CodonLookup;
use crate::engine::error::ParseError;
use crate::engine::process::ProcessSpec;
use std::path::PathBuf;

const EXECUTABLE: &str = "src/CDSfold";
const MFE_MARKER: &str = "MFE:";
const ENERGY_UNIT: &str = " kcal/mol";

/// CDSfold reads a FASTA file and prints the design, with the sequence and structure on
/// the two lines right above the `MFE:` line. It does not report a CAI.
#[derive(Debug, Clone)]
pub struct CdsFold {
    root: PathBuf,
}

impl CdsFold {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Engine for CdsFold {
    fn kind(&self) -> EngineKind {
        EngineKind::CdsFold
    }

    fn prepare(
        &self,
        protein: &ProteinSequence,
        _table: &dyn CodonLookup,
    ) -> Result<PreparedRun, ArtifactError> {
        let fasta = FastaRecord::new(protein).materialize()?;
        let spec = ProcessSpec::new(self.root.join(EXECUTABLE)).arg(fasta.arg());
        Ok(PreparedRun::new(spec).with_input(fasta))
    }

    fn parse(&self, raw: &str) -> Result<ParsedFold, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();
        let mfe_index = lines
            .iter()
            .position(|line| line.contains(MFE_MARKER))
            .ok_or(ParseError::MissingMarker(MFE_MARKER))?;
        if mfe_index < 2 {
            return Err(ParseError::Truncated("sequence and structure"));
        }
        let energy = lines[mfe_index]
            .split_once(MFE_MARKER)
            .map_or("", |(_, rest)| rest);
        Ok(ParsedFold {
            rna_sequence: lines[mfe_index - 2].trim().to_string(),
            structure: lines[mfe_index - 1].trim().to_string(),
            mfe: number(MFE_MARKER, before(energy, ENERGY_UNIT))?,
            cai: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_table;

    const OUTPUT: &str = "\
>seq
AUGCUGCUGCUGCUGGUG
(((....)))........
MFE:-3.40 kcal/mol
Running time: 0.00 sec
";

    #[test]
    fn parses_lines_above_mfe_marker() {
        let parsed = CdsFold::new(PathBuf::new()).parse(OUTPUT).unwrap();
        assert_eq!(parsed.rna_sequence, "AUGCUGCUGCUGCUGGUG");
        assert_eq!(parsed.structure, "(((....)))........");
        assert_eq!(parsed.mfe, -3.4);
        assert_eq!(parsed.cai, None);
    }

    #[test]
    fn missing_mfe_line_is_an_error() {
        let result = CdsFold::new(PathBuf::new()).parse(">seq\nAUG\n...\n");
        assert!(matches!(result, Err(ParseError::MissingMarker("MFE:"))));
    }

    #[test]
    fn mfe_on_first_lines_is_truncated_output() {
        let result = CdsFold::new(PathBuf::new()).parse("AUG\nMFE:-1.0 kcal/mol\n");
        assert!(matches!(result, Err(ParseError::Truncated(_))));
    }

    #[test]
    fn prepare_passes_fasta_path_as_only_argument() {
        let engine = CdsFold::new(PathBuf::from("/opt/CDSfold-main"));
        let protein: ProteinSequence = "MLLLLV".parse().unwrap();
        let prepared = engine.prepare(&protein, &fixture_table()).unwrap();
        assert_eq!(
            prepared.spec.program(),
            PathBuf::from("/opt/CDSfold-main/src/CDSfold")
        );
        let args = prepared.spec.arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(std::fs::read_to_string(&args[0]).unwrap(), ">seq\nMLLLLV");
        assert_eq!(prepared.spec.stdin_text(), None);
    }
}
