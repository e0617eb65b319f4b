use super::parsing::{after_prefix, before, number};
use super::{Engine, EngineKind, ParsedFold, PreparedRun};
use crate::core::io::codon_csv::SparseCodonTable;
use crate::core::io::traits::{ArtifactError, InputArtifact};
use crate::core::models::protein::ProteinSequence;
use crate::core::tables::codon_usage::CodonLookup;
use crate::engine::error::ParseError;
use crate::engine::process::ProcessSpec;
use std::path::PathBuf;

/// Relative to the installation directory, which must be the working directory so the
/// engine finds its shared libraries.
const EXECUTABLE: &str = "bin/LinearDesign_2D";

const RNA_MARKER: &str = "mRNA sequence:";
const STRUCTURE_MARKER: &str = "mRNA structure:";
const ENERGY_MARKER: &str = "mRNA folding free energy:";
const CAI_MARKER: &str = "; mRNA CAI:";

#[derive(Debug, Clone)]
pub struct LinearDesign {
    root: PathBuf,
    lambda: f64,
}

impl LinearDesign {
    pub fn new(root: PathBuf, lambda: f64) -> Self {
        Self { root, lambda }
    }
}

impl Engine for LinearDesign {
    fn kind(&self) -> EngineKind {
        EngineKind::LinearDesign
    }

    fn prepare(
        &self,
        protein: &ProteinSequence,
        table: &dyn CodonLookup,
    ) -> Result<PreparedRun, ArtifactError> {
        let codons = SparseCodonTable::new(table).materialize()?;
        let spec = ProcessSpec::new(EXECUTABLE)
            .arg("0")
            .arg(format!("{:?}", self.lambda))
            .arg(codons.arg())
            .stdin(protein.to_string())
            .working_dir(&self.root);
        Ok(PreparedRun::new(spec).with_input(codons))
    }

    fn parse(&self, raw: &str) -> Result<ParsedFold, ParseError> {
        let energy_line = after_prefix(raw, ENERGY_MARKER)?;
        let (energy, cai) = energy_line
            .split_once(CAI_MARKER)
            .ok_or(ParseError::MissingMarker(CAI_MARKER))?;
        Ok(ParsedFold {
            rna_sequence: after_prefix(raw, RNA_MARKER)?.to_string(),
            structure: after_prefix(raw, STRUCTURE_MARKER)?.to_string(),
            mfe: number(ENERGY_MARKER, before(energy, " kcal/mol"))?,
            cai: Some(number(CAI_MARKER, cai)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_table;
    use std::path::Path;

    const OUTPUT: &str = "\
Input protein: MLLLLV
mRNA sequence:  AUGCUGCUGCUGCUGGUG
mRNA structure: (((....)))........
mRNA folding free energy: -3.40 kcal/mol; mRNA CAI: 0.812
";

    #[test]
    fn parses_stdout_markers() {
        let parsed = LinearDesign::new(PathBuf::new(), 0.0).parse(OUTPUT).unwrap();
        assert_eq!(parsed.rna_sequence, "AUGCUGCUGCUGCUGGUG");
        assert_eq!(parsed.structure, "(((....)))........");
        assert_eq!(parsed.mfe, -3.4);
        assert_eq!(parsed.cai, Some(0.812));
    }

    #[test]
    fn energy_line_without_cai_is_an_error() {
        let output = OUTPUT.replace("; mRNA CAI: 0.812", "");
        let result = LinearDesign::new(PathBuf::new(), 0.0).parse(&output);
        assert!(matches!(result, Err(ParseError::MissingMarker("; mRNA CAI:"))));
    }

    #[test]
    fn prepare_pipes_protein_and_runs_from_install_dir() {
        let engine = LinearDesign::new(PathBuf::from("/opt/LinearDesign-main"), 0.0);
        let protein: ProteinSequence = "MLLLLV".parse().unwrap();
        let prepared = engine.prepare(&protein, &fixture_table()).unwrap();
        assert_eq!(prepared.spec.program(), Path::new("bin/LinearDesign_2D"));
        assert_eq!(prepared.spec.dir(), Some(Path::new("/opt/LinearDesign-main")));
        assert_eq!(prepared.spec.stdin_text(), Some("MLLLLV"));
        let args = prepared.spec.arguments();
        assert_eq!(&args[..2], ["0", "0.0"]);
        let table = std::fs::read_to_string(&args[2]).unwrap();
        assert!(table.starts_with("#,,\n"));
        assert!(Path::new(&args[2]).is_absolute());
    }
}
