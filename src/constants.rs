pub const DEFAULT_BCFTOOLS: &str = "bcftools";
pub const DEFAULT_TABIX: &str = "tabix";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_PREFIX: &str = "pharmcat_ready_vcf";
pub const DEFAULT_KEEP_INTERMEDIATE_FILES: bool = false;

/// Padding added on both sides of the outermost PGx position of each chromosome.
pub const DEFAULT_REGION_FLANKING_BP: u64 = 100;

/// Name of the artificial sample carried by the PGx reference panel.
pub const REFERENCE_PANEL_SAMPLE: &str = "PharmCAT";

pub const EXTRACTED_FILE_PREFIX: &str = "PharmCAT_preprocess_";
pub const EXTRACTED_FILE_SUFFIX: &str = ".pgx_regions.vcf.gz";
pub const NORMALIZED_SUFFIX: &str = "normalized";
pub const MULTIALLELIC_SUFFIX: &str = "multiallelic";
pub const MISSING_REPORT_SUFFIX: &str = ".missing_pgx_var.vcf.gz";

pub const NCBI_HOST: &str = "https://ftp.ncbi.nlm.nih.gov";
pub const GRCH38_FASTA_DIR: &str =
    "/genomes/all/GCA/000/001/405/GCA_000001405.15_GRCh38/seqs_for_alignment_pipelines.ucsc_ids/";
pub const GRCH38_FASTA_FILE: &str = "GCA_000001405.15_GRCh38_no_alt_analysis_set.fna";

pub fn grch38_fasta_url() -> String {
    format!("{NCBI_HOST}{GRCH38_FASTA_DIR}{GRCH38_FASTA_FILE}.gz")
}

pub fn grch38_fasta_index_url() -> String {
    format!("{NCBI_HOST}{GRCH38_FASTA_DIR}{GRCH38_FASTA_FILE}.fai")
}
