//! Test fixtures: a one-codon-per-residue usage table, fake engine installations built
//! from POSIX shell scripts, and a constant reference model.
//!
//! The fake engines honour the real argv, stdin and output layouts. Each designs the
//! protein with the single codon the fixture table offers per residue and reports an
//! unstructured fold with zero free energy and a CAI of one.

use crate::core::models::codon::{AminoAcid, Codon};
use crate::core::models::protein::ProteinSequence;
use crate::core::reference::{ReferenceError, ReferenceModel};
use crate::core::tables::codon_usage::CodonUsageTable;
use crate::engine::config::{BenchConfig, BenchConfigBuilder};
use crate::engine::engines::EngineKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// What every fake engine designs for `MLLLLV`.
pub(crate) const MLLLLV_DESIGN: &str = "AUGCUGCUGCUGCUGGUG";

const FIXTURE_CODONS: [(AminoAcid, &str, u64); 21] = [
    (AminoAcid::Alanine, "GCU", 18),
    (AminoAcid::Arginine, "CGU", 5),
    (AminoAcid::Asparagine, "AAU", 17),
    (AminoAcid::AsparticAcid, "GAU", 22),
    (AminoAcid::Cysteine, "UGU", 10),
    (AminoAcid::Glutamine, "CAA", 12),
    (AminoAcid::GlutamicAcid, "GAA", 29),
    (AminoAcid::Glycine, "GGU", 11),
    (AminoAcid::Histidine, "CAU", 11),
    (AminoAcid::Isoleucine, "AUU", 16),
    (AminoAcid::Leucine, "CUG", 40),
    (AminoAcid::Lysine, "AAA", 24),
    (AminoAcid::Methionine, "AUG", 22),
    (AminoAcid::Phenylalanine, "UUU", 17),
    (AminoAcid::Proline, "CCU", 18),
    (AminoAcid::Serine, "UCU", 15),
    (AminoAcid::Threonine, "ACU", 13),
    (AminoAcid::Tryptophan, "UGG", 13),
    (AminoAcid::Tyrosine, "UAU", 12),
    (AminoAcid::Valine, "GUG", 28),
    (AminoAcid::Stop, "UAA", 1),
];

pub(crate) fn fixture_table() -> CodonUsageTable {
    CodonUsageTable::from_entries(FIXTURE_CODONS.iter().map(|&(amino_acid, codon, count)| {
        (amino_acid, codon.parse::<Codon>().unwrap(), count)
    }))
    .unwrap()
}

/// Writes a `/bin/sh` script and marks it executable.
pub(crate) fn write_executable(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Shell functions `design SEQ` and `dots SEQ` shared by every fake engine.
fn shell_functions() -> String {
    let substitutions: String = FIXTURE_CODONS
        .iter()
        .map(|(amino_acid, codon, _)| {
            let pattern = if amino_acid.is_stop() {
                "\\*".to_string()
            } else {
                amino_acid.letter().to_string()
            };
            format!(" -e 's/{pattern}/{}/g'", codon.to_lowercase())
        })
        .collect();
    format!(
        "design() {{\n  printf '%s' \"$1\" | sed{substitutions} | tr 'acgu' 'ACGU'\n}}\n\
         dots() {{\n  printf '%s' \"$1\" | sed 's/./.../g'\n}}\n"
    )
}

fn executable(kind: EngineKind) -> &'static str {
    match kind {
        EngineKind::CdsFold => "src/CDSfold",
        EngineKind::Derna => "build/derna",
        EngineKind::LinearDesign => "bin/LinearDesign_2D",
        EngineKind::MrnaFold => "build/exe/fold_codon_graph",
    }
}

const CDSFOLD_SCRIPT: &str = r#"seq=$(sed -n 2p "$1")
rna=$(design "$seq")
db=$(dots "$seq")
echo ">seq"
echo "$rna"
echo "$db"
echo "MFE:0.00 kcal/mol"
echo "Running time: 0.00 sec"
"#;

const DERNA_SCRIPT: &str = r#"while [ $# -gt 0 ]; do
  case "$1" in
    -i) fasta="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
seq=$(sed -n 2p "$fasta")
rna=$(design "$seq")
db=$(dots "$seq")
echo scratch > dd.txt
{
  echo "zuker cai rna: $rna.size=${#rna}"
  echo "zuker cai bp: $db,size=${#db}"
  echo "Codon Adaptation Index: 1"
  echo "Minimum Free Energy: 0"
} > "$out"
"#;

const LINEARDESIGN_SCRIPT: &str = r#"IFS= read -r seq || true
echo "$seq" >> seen.txt
if [ -f fail_count ]; then
  n=$(cat fail_count)
  if [ "$n" -gt 0 ]; then
    echo $((n - 1)) > fail_count
    echo "LinearDesign_2D: beam_cky.cpp:42: Assertion failed" >&2
    exit 134
  fi
fi
rna=$(design "$seq")
db=$(dots "$seq")
echo "mRNA sequence:  $rna"
echo "mRNA structure: $db"
echo "mRNA folding free energy: 0.00 kcal/mol; mRNA CAI: 1.000"
"#;

const MRNAFOLD_SCRIPT: &str = r#"seq=$(sed -n 's/^aa_seq //p' "$1")
rna=$(design "$seq")
db=$(dots "$seq")
echo "$rna"
echo "$db"
echo
echo "CAI: 1.0"
echo "MFE: 0.0"
"#;

/// A binary root holding all four fake engines in their default directories.
pub(crate) struct FakeInstall {
    _root: TempDir,
    config: BenchConfig,
}

impl FakeInstall {
    pub(crate) fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = BenchConfigBuilder::new()
            .bin_root(root.path().to_path_buf())
            .sample_interval(Duration::from_millis(10))
            .build()
            .unwrap();
        let install = Self { _root: root, config };
        for (kind, script) in [
            (EngineKind::CdsFold, CDSFOLD_SCRIPT),
            (EngineKind::Derna, DERNA_SCRIPT),
            (EngineKind::LinearDesign, LINEARDESIGN_SCRIPT),
            (EngineKind::MrnaFold, MRNAFOLD_SCRIPT),
        ] {
            install.replace_script(kind, script);
        }
        install
    }

    pub(crate) fn config(&self) -> BenchConfig {
        self.config.clone()
    }

    pub(crate) fn engine_dir(&self, kind: EngineKind) -> PathBuf {
        self.config.install_path(kind)
    }

    /// Replaces an engine with a script; the `design` and `dots` helpers stay available.
    pub(crate) fn replace_script(&self, kind: EngineKind, body: &str) {
        let path = self.engine_dir(kind).join(executable(kind));
        write_executable(&path, &format!("{}{body}", shell_functions()));
    }

    /// Makes the next `times` LinearDesign runs abort.
    pub(crate) fn fail_lineardesign(&self, times: u32) {
        let path = self.engine_dir(EngineKind::LinearDesign).join("fail_count");
        fs::write(path, times.to_string()).unwrap();
    }

    /// Every sequence LinearDesign was given, in order.
    pub(crate) fn lineardesign_inputs(&self) -> Vec<ProteinSequence> {
        let path = self.engine_dir(EngineKind::LinearDesign).join("seen.txt");
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| line.parse().unwrap())
            .collect()
    }
}

/// Reference model that scores every structure at `energy` and predicts no pairs.
pub(crate) struct FlatReference {
    pub(crate) energy: f64,
}

impl ReferenceModel for FlatReference {
    fn free_energy(&self, _rna_sequence: &str, _structure: &str) -> Result<f64, ReferenceError> {
        Ok(self.energy)
    }

    fn predict_mfe_structure(&self, rna_sequence: &str) -> Result<String, ReferenceError> {
        Ok(".".repeat(rna_sequence.len()))
    }
}
