use super::traits::{ArtifactError, InputArtifact};
use crate::core::models::codon::AminoAcid;
use crate::core::tables::codon_usage::CodonLookup;
use std::io::Write;
use tracing::debug;

/// Minimum number of frequency columns in a dense row; six is the largest synonymous set.
const DENSE_FREQUENCY_COLUMNS: usize = 6;

/// Header line that opens a sparse table.
pub const SPARSE_HEADER: [&str; 3] = ["#", "", ""];

/// Two rows per amino acid: a codon header row and a frequency row.
///
/// ```text
/// ,CUG,UUA
/// L,40,10,0,0,0,0,
/// ```
///
/// The stop symbol is omitted, as are amino acids the table has no codons for.
#[derive(Debug, Clone, Copy)]
pub struct DenseCodonTable<'a, T: CodonLookup + ?Sized> {
    table: &'a T,
}

impl<'a, T: CodonLookup + ?Sized> DenseCodonTable<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self { table }
    }
}

impl<T: CodonLookup + ?Sized> InputArtifact for DenseCodonTable<'_, T> {
    const PREFIX: &'static str = "mrnabench-dense-cft-";

    fn write_to(&self, writer: &mut impl Write) -> Result<(), ArtifactError> {
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(writer);
        for &amino_acid in AminoAcid::residues() {
            let codons = self.table.codons_for(amino_acid);
            if codons.is_empty() {
                debug!(%amino_acid, "No codons in table; omitting dense row.");
                continue;
            }

            let mut header = vec![String::new()];
            header.extend(codons.iter().map(ToString::to_string));
            csv.write_record(&header)?;

            let mut frequencies = vec![0u64; DENSE_FREQUENCY_COLUMNS.max(codons.len())];
            for (slot, codon) in frequencies.iter_mut().zip(&codons) {
                *slot = self.table.frequency(*codon).unwrap_or(0);
            }
            let mut row = vec![amino_acid.letter().to_string()];
            row.extend(frequencies.iter().map(ToString::to_string));
            row.push(String::new());
            csv.write_record(&row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// One `codon,amino_acid,frequency` record per codon, after a `#,,` header line.
#[derive(Debug, Clone, Copy)]
pub struct SparseCodonTable<'a, T: CodonLookup + ?Sized> {
    table: &'a T,
}

impl<'a, T: CodonLookup + ?Sized> SparseCodonTable<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self { table }
    }
}

impl<T: CodonLookup + ?Sized> InputArtifact for SparseCodonTable<'_, T> {
    const PREFIX: &'static str = "mrnabench-sparse-cft-";

    fn write_to(&self, writer: &mut impl Write) -> Result<(), ArtifactError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(SPARSE_HEADER)?;
        for amino_acid in AminoAcid::ALL {
            for codon in self.table.codons_for(amino_acid) {
                let frequency = self.table.frequency(codon).unwrap_or(0);
                csv.write_record([
                    codon.to_string(),
                    amino_acid.letter().to_string(),
                    frequency.to_string(),
                ])?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}
