use super::traits::{ArtifactError, InputArtifact};
use crate::core::models::protein::ProteinSequence;
use std::io::Write;

const NUM_SUBOPT_TRACES: u32 = 1;
const BANNED_MOTIF_TESTS: u32 = 0;

/// Plain `key value` folding configuration, one setting per line.
#[derive(Debug, Clone, Copy)]
pub struct FoldConfig<'a> {
    pub sequence: &'a ProteinSequence,
    pub parallel: bool,
    /// Weight trading MFE against CAI; `0.0` optimizes MFE only.
    pub lambda: f64,
}

impl InputArtifact for FoldConfig<'_> {
    const PREFIX: &'static str = "mrnabench-fold-config-";

    fn write_to(&self, writer: &mut impl Write) -> Result<(), ArtifactError> {
        writeln!(writer, "aa_seq {}", self.sequence)?;
        writeln!(writer, "parallel {}", self.parallel)?;
        // Debug formatting keeps the decimal point on whole numbers ("0.0", not "0").
        writeln!(writer, "lambda {:?}", self.lambda)?;
        writeln!(writer, "num_subopt_traces {NUM_SUBOPT_TRACES}")?;
        writeln!(writer, "banned_motif_tests {BANNED_MOTIF_TESTS}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn render(config: &FoldConfig<'_>) -> String {
        let mut buffer = Vec::new();
        config.write_to(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn read_pairs(text: &str) -> HashMap<String, String> {
        text.lines()
            .filter_map(|line| line.split_once(' '))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn writes_all_five_settings_in_order() {
        let sequence: ProteinSequence = "MLLLLV".parse().unwrap();
        let text = render(&FoldConfig {
            sequence: &sequence,
            parallel: true,
            lambda: 0.0,
        });
        assert_eq!(
            text,
            "aa_seq MLLLLV\nparallel true\nlambda 0.0\nnum_subopt_traces 1\nbanned_motif_tests 0\n"
        );
    }

    #[test]
    fn materialized_config_round_trips_values() {
        let sequence: ProteinSequence = "MKV*".parse().unwrap();
        let config = FoldConfig {
            sequence: &sequence,
            parallel: false,
            lambda: 0.25,
        };
        let artifact = config.materialize().unwrap();
        let pairs = read_pairs(&artifact.read_to_string().unwrap());
        assert_eq!(pairs["aa_seq"].parse::<ProteinSequence>().unwrap(), sequence);
        assert_eq!(pairs["parallel"], "false");
        assert_eq!(pairs["lambda"].parse::<f64>().unwrap(), 0.25);
    }
}
