use super::process::{ProcessOutput, ProcessRunner, ProcessSpec};
use crate::core::reference::{ReferenceError, ReferenceModel};
use std::path::PathBuf;
use tracing::trace;

const DANGLES: &str = "-d0";

/// Reference model backed by the ViennaRNA `RNAeval` and `RNAfold` programs.
///
/// Both programs are run with dangling-end energies disabled (`-d0`), matching the
/// energy model of the design engines.
#[derive(Debug, Clone)]
pub struct ViennaCli {
    rnaeval: PathBuf,
    rnafold: PathBuf,
    runner: ProcessRunner,
}

impl ViennaCli {
    /// Uses `RNAeval` and `RNAfold` from `bin_dir`, or from `PATH` when `None`.
    pub fn new(bin_dir: Option<PathBuf>, runner: ProcessRunner) -> Self {
        let locate = |name: &str| match &bin_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        Self {
            rnaeval: locate("RNAeval"),
            rnafold: locate("RNAfold"),
            runner,
        }
    }

    fn run(&self, spec: ProcessSpec) -> Result<String, ReferenceError> {
        let output: ProcessOutput = self
            .runner
            .run(&spec)
            .map_err(|e| ReferenceError::Unavailable(e.to_string()))?;
        if !output.success() {
            return Err(ReferenceError::Failed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

impl ReferenceModel for ViennaCli {
    fn free_energy(&self, rna_sequence: &str, structure: &str) -> Result<f64, ReferenceError> {
        let stdout = self.run(
            ProcessSpec::new(&self.rnaeval)
                .arg(DANGLES)
                .stdin(format!("{rna_sequence}\n{structure}\n")),
        )?;
        let (_, energy) = structure_line(&stdout)?;
        trace!(energy, "Reference energy evaluated.");
        Ok(energy)
    }

    fn predict_mfe_structure(&self, rna_sequence: &str) -> Result<String, ReferenceError> {
        let stdout = self.run(
            ProcessSpec::new(&self.rnafold)
                .arg(DANGLES)
                .arg("--noPS")
                .stdin(format!("{rna_sequence}\n")),
        )?;
        let (structure, _) = structure_line(&stdout)?;
        Ok(structure.to_string())
    }
}

/// Splits a `((..)) ( -1.20)` line into the structure and its energy.
fn structure_line(stdout: &str) -> Result<(&str, f64), ReferenceError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(['.', '(', ')']))
        .ok_or_else(|| ReferenceError::MalformedOutput("no structure line".to_string()))?;
    let (structure, energy) = line
        .rsplit_once(" (")
        .ok_or_else(|| ReferenceError::MalformedOutput(format!("no energy on '{line}'")))?;
    let energy = energy.trim_end_matches(')').trim();
    let energy = energy
        .parse()
        .map_err(|_| ReferenceError::MalformedOutput(format!("invalid energy '{energy}'")))?;
    Ok((structure.trim(), energy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_executable;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn structure_line_handles_padded_and_tight_energies() {
        assert_eq!(
            structure_line("AUGC\n((....)) ( -1.20)\n").unwrap(),
            ("((....))", -1.2)
        );
        assert_eq!(
            structure_line("AUGC\n.......... (-12.30)\n").unwrap(),
            ("..........", -12.3)
        );
        assert_eq!(structure_line("AUG\n... (  0.00)\n").unwrap(), ("...", 0.0));
    }

    #[test]
    fn structure_line_rejects_missing_energy() {
        assert!(matches!(
            structure_line("AUGC\n((..))\n"),
            Err(ReferenceError::MalformedOutput(_))
        ));
        assert!(matches!(
            structure_line("AUGC\n"),
            Err(ReferenceError::MalformedOutput(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn drives_both_programs_through_stdin() {
        let dir = tempdir().unwrap();
        write_executable(
            &dir.path().join("RNAeval"),
            "read -r seq\nread -r db\necho \"$seq\"\necho \"$db ( -2.50)\"\n",
        );
        write_executable(
            &dir.path().join("RNAfold"),
            "read -r seq\necho \"$seq\"\necho \"$(printf '%s' \"$seq\" | sed 's/././g') (  0.00)\"\n",
        );
        let vienna = ViennaCli::new(
            Some(dir.path().to_path_buf()),
            ProcessRunner::new(Duration::from_millis(10)),
        );
        assert_eq!(vienna.free_energy("GGGAAACCC", "(((...)))").unwrap(), -2.5);
        assert_eq!(vienna.predict_mfe_structure("GGGAAACCC").unwrap(), ".........");
    }

    #[test]
    fn missing_programs_are_unavailable() {
        let dir = tempdir().unwrap();
        let vienna = ViennaCli::new(
            Some(dir.path().to_path_buf()),
            ProcessRunner::new(Duration::from_millis(10)),
        );
        assert!(matches!(
            vienna.predict_mfe_structure("AUG"),
            Err(ReferenceError::Unavailable(_))
        ));
    }
}
