use mrnabench::workflows::benchmark::{
    DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_STEP, DEFAULT_TIMEOUT,
};

pub struct DefaultsConfig {
    pub bin_root: &'static str,
    pub codon_table: &'static str,
    pub mode: &'static str,
    pub timeout_seconds: u64,
    pub seed: u64,
    pub min_length: usize,
    pub max_length: usize,
    pub step: usize,
    pub validate_length: usize,
    pub validate_iterations: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            bin_root: "extern",
            codon_table: "data/homosapiens.txt",
            mode: "random",
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
            seed: 0,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            step: DEFAULT_STEP,
            validate_length: 30,
            validate_iterations: 1000,
        }
    }
}
