use super::Preprocessor;
use crate::{
    io::command::ToolRunner,
    utils::util::{derive_vcf_path, Result},
    MISSING_REPORT_SUFFIX, MULTIALLELIC_SUFFIX, NORMALIZED_SUFFIX,
};
use std::path::{Path, PathBuf};

impl<R: ToolRunner> Preprocessor<'_, R> {
    /// Left-aligns `input` against `reference` and splits multiallelic records.
    pub fn normalize_vcf(&self, input: &Path, reference: &Path) -> Result<PathBuf> {
        let output = derive_vcf_path(input, NORMALIZED_SUFFIX);
        self.run(
            self.toolkit.norm_split(reference, &output, input),
            "Normalizing VCF",
        )?;
        self.tabix_index_vcf(&output)?;
        Ok(output)
    }

    /// Keeps only records matching the PGx reference panel, fills in absent panel positions
    /// and rejoins them into PharmCAT's multiallelic representation.
    ///
    /// Panel positions missing from `input` are written to
    /// `<output_dir>/<output_prefix>.missing_pgx_var.vcf.gz`.
    pub fn filter_pgx_variants(
        &self,
        input: &Path,
        reference: &Path,
        ref_pgx_vcf: &Path,
        output_dir: &Path,
        output_prefix: &str,
    ) -> Result<PathBuf> {
        let output = derive_vcf_path(input, MULTIALLELIC_SUFFIX);

        let temp_dir = tempfile::Builder::new()
            .prefix("pgxprep_")
            .suffix("temp_extract_variants")
            .tempdir_in(output_dir)?;

        let panel = temp_dir
            .path()
            .join("temp_reference_pgx_variants_sorted_uniallelic.vcf.gz");
        self.run(
            self.toolkit.norm_split(reference, &panel, ref_pgx_vcf),
            "Preparing the reference PGx VCF",
        )?;
        self.tabix_index_vcf(&panel)?;

        let pgx_only = temp_dir.path().join("temp_input_pgx_variants_only.vcf.gz");
        self.run(
            self.toolkit.isec_shared(&panel, input, &pgx_only),
            "Retaining only PGx positions",
        )?;
        self.tabix_index_vcf(&pgx_only)?;

        let merged = temp_dir.path().join("temp_merged.vcf.gz");
        self.run(
            self.toolkit.merge_with_panel(&pgx_only, &panel, &merged),
            "Merging PGx positions with the reference panel",
        )?;
        self.tabix_index_vcf(&merged)?;

        let multiallelic = temp_dir.path().join("temp_multiallelic.vcf.gz");
        self.run(
            self.toolkit.norm_enforce_multiallelic(&multiallelic, &merged),
            "Enforcing the variant representation per PharmCAT",
        )?;
        self.tabix_index_vcf(&multiallelic)?;

        self.run(
            self.toolkit.view_drop_panel_sample(&output, &multiallelic),
            "Removing the reference panel sample",
        )?;
        self.tabix_index_vcf(&output)?;

        let missing_report = output_dir.join(format!("{output_prefix}{MISSING_REPORT_SUFFIX}"));
        self.run(
            self.toolkit.isec_missing(&panel, input, &missing_report),
            "Generating a report of missing PGx allele defining positions",
        )?;
        log::info!(
            "Missing PGx positions reported in {}",
            missing_report.display()
        );

        Ok(output)
    }
}
