use super::{write_temp_lines, Preprocessor};
use crate::{
    core::{
        chromosome::{rename_map, ChromNaming},
        regions::PgxRegions,
    },
    io::{
        command::ToolRunner,
        vcf_reader::{detect_chrom_naming, is_indexed, read_reference_positions},
    },
    utils::util::Result,
    DEFAULT_REGION_FLANKING_BP, EXTRACTED_FILE_PREFIX, EXTRACTED_FILE_SUFFIX,
};
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub fn extracted_path(output_dir: &Path, output_prefix: &str) -> PathBuf {
    output_dir.join(format!(
        "{EXTRACTED_FILE_PREFIX}{output_prefix}{EXTRACTED_FILE_SUFFIX}"
    ))
}

fn pgx_regions(ref_pgx_vcf: &Path) -> Result<PgxRegions> {
    let positions = read_reference_positions(ref_pgx_vcf)?;
    let regions = PgxRegions::from_positions(positions, DEFAULT_REGION_FLANKING_BP);
    let mut count = 0;
    for (chrom, span) in regions.iter() {
        log::trace!("PGx region {}:{}-{}", chrom, span.start, span.end);
        count += 1;
    }
    log::debug!("Extracting {count} PGx regions");
    Ok(regions)
}

impl<R: ToolRunner> Preprocessor<'_, R> {
    /// Keeps `samples` and the PGx regions of `input`, renaming bare contigs to `chr` names.
    pub fn extract_regions_from_single_file(
        &self,
        input: &Path,
        ref_pgx_vcf: &Path,
        output_dir: &Path,
        output_prefix: &str,
        samples: &[String],
    ) -> Result<PathBuf> {
        let output = extracted_path(output_dir, output_prefix);

        if !is_indexed(input) {
            self.tabix_index_vcf(input)?;
        }

        let regions = pgx_regions(ref_pgx_vcf)?;
        let naming = detect_chrom_naming(input)?;
        let region_list = regions.to_region_string(naming);
        let sample_file = write_temp_lines(output_dir, "samples", samples)?;

        match naming {
            ChromNaming::Prefixed => {
                self.run(
                    self.toolkit
                        .view_regions(sample_file.path(), &region_list, &output, input),
                    &format!("Extracting PGx regions for {}", input.display()),
                )?;
            }
            ChromNaming::Bare => {
                let mut rename_file = tempfile::Builder::new()
                    .prefix("pgxprep_rename_chrs_")
                    .suffix(".tsv")
                    .tempfile_in(output_dir)?;
                rename_file.write_all(rename_map().as_bytes())?;
                rename_file.flush()?;
                self.run(
                    self.toolkit.annotate_rename_regions(
                        sample_file.path(),
                        rename_file.path(),
                        &region_list,
                        &output,
                        input,
                    ),
                    &format!(
                        "Extracting PGx regions and modifying chromosome names for {}",
                        input.display()
                    ),
                )?;
            }
        }

        self.tabix_index_vcf(&output)?;
        Ok(output)
    }

    /// Extracts each input into a scratch directory, then concatenates and joins the pieces.
    pub fn extract_regions_from_multiple_files(
        &self,
        inputs: &[PathBuf],
        reference: &Path,
        ref_pgx_vcf: &Path,
        output_dir: &Path,
        output_prefix: &str,
        samples: &[String],
    ) -> Result<PathBuf> {
        if inputs.is_empty() {
            return Err(crate::pgx_error!("No input VCFs to extract from"));
        }
        let output = extracted_path(output_dir, output_prefix);

        let temp_dir = tempfile::Builder::new()
            .prefix("pgxprep_extract_")
            .tempdir_in(output_dir)?;
        let mut extracted = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            let part_prefix = format!("{output_prefix}_{}", i + 1);
            extracted.push(self.extract_regions_from_single_file(
                input,
                ref_pgx_vcf,
                temp_dir.path(),
                &part_prefix,
                samples,
            )?);
        }

        let file_list = write_temp_lines(
            output_dir,
            "concat_list",
            extracted.iter().map(|p| p.display()),
        )?;
        let concatenated = tempfile::Builder::new()
            .prefix("pgxprep_concat_")
            .suffix(".vcf.gz")
            .tempfile_in(output_dir)?;

        self.run(
            self.toolkit.concat(file_list.path(), concatenated.path()),
            "Concatenating chromosome VCFs",
        )?;
        self.run(
            self.toolkit
                .norm_join(reference, &output, concatenated.path()),
            "Normalizing chromosome VCFs",
        )?;

        self.tabix_index_vcf(&output)?;
        Ok(output)
    }
}
