use super::parsing::{after_marker, number};
use super::{Engine, EngineKind, ParsedFold, PreparedRun};
use crate::core::io::fold_config::FoldConfig;
use crate::core::io::traits::{ArtifactError, InputArtifact};
use crate::core::models::protein::ProteinSequence;
use crate::core::tables::codon_usage::CodonLookup;
use crate::engine::error::ParseError;
use crate::engine::process::ProcessSpec;
use std::path::PathBuf;

const EXECUTABLE: &str = "build/exe/fold_codon_graph";
const CAI_MARKER: &str = "CAI:";
const MFE_MARKER: &str = "MFE:";

/// mRNAfold reads a key/value configuration file. Its output starts with the sequence
/// and structure lines, followed by labelled CAI and MFE lines.
#[derive(Debug, Clone)]
pub struct MrnaFold {
    root: PathBuf,
    lambda: f64,
    parallel: bool,
}

impl MrnaFold {
    pub fn new(root: PathBuf, lambda: f64, parallel: bool) -> Self {
        Self {
            root,
            lambda,
            parallel,
        }
    }
}

impl Engine for MrnaFold {
    fn kind(&self) -> EngineKind {
        EngineKind::MrnaFold
    }

    fn prepare(
        &self,
        protein: &ProteinSequence,
        _table: &dyn CodonLookup,
    ) -> Result<PreparedRun, ArtifactError> {
        let config = FoldConfig {
            sequence: protein,
            parallel: self.parallel,
            lambda: self.lambda,
        }
        .materialize()?;
        let spec = ProcessSpec::new(self.root.join(EXECUTABLE)).arg(config.arg());
        Ok(PreparedRun::new(spec).with_input(config))
    }

    fn parse(&self, raw: &str) -> Result<ParsedFold, ParseError> {
        let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
        let rna_sequence = lines.next().ok_or(ParseError::Truncated("sequence"))?;
        let structure = lines.next().ok_or(ParseError::Truncated("structure"))?;
        Ok(ParsedFold {
            rna_sequence: rna_sequence.to_string(),
            structure: structure.to_string(),
            mfe: number(MFE_MARKER, after_marker(raw, MFE_MARKER)?)?,
            cai: Some(number(CAI_MARKER, after_marker(raw, CAI_MARKER)?)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_table;

    const OUTPUT: &str = "\
AUGCUGCUGCUGCUGGUG
(((....)))........

CAI: 0.8125
MFE: -3.4
";

    #[test]
    fn parses_leading_lines_and_labels() {
        let parsed = MrnaFold::new(PathBuf::new(), 0.0, true).parse(OUTPUT).unwrap();
        assert_eq!(parsed.rna_sequence, "AUGCUGCUGCUGCUGGUG");
        assert_eq!(parsed.structure, "(((....)))........");
        assert_eq!(parsed.cai, Some(0.8125));
        assert_eq!(parsed.mfe, -3.4);
    }

    #[test]
    fn empty_output_is_truncated() {
        let result = MrnaFold::new(PathBuf::new(), 0.0, true).parse("\n\n");
        assert!(matches!(result, Err(ParseError::Truncated("sequence"))));
    }

    #[test]
    fn non_numeric_mfe_is_reported() {
        let output = OUTPUT.replace("MFE: -3.4", "MFE: inf?");
        let result = MrnaFold::new(PathBuf::new(), 0.0, true).parse(&output);
        assert!(matches!(result, Err(ParseError::InvalidNumber { .. })));
    }

    #[test]
    fn prepare_writes_config_with_settings() {
        let engine = MrnaFold::new(PathBuf::from("/opt/mrnafold-main"), 0.0, false);
        let protein: ProteinSequence = "MLLLLV".parse().unwrap();
        let prepared = engine.prepare(&protein, &fixture_table()).unwrap();
        assert_eq!(
            prepared.spec.program(),
            PathBuf::from("/opt/mrnafold-main/build/exe/fold_codon_graph")
        );
        let config = std::fs::read_to_string(&prepared.spec.arguments()[0]).unwrap();
        assert!(config.starts_with("aa_seq MLLLLV\nparallel false\nlambda 0.0\n"));
    }
}
