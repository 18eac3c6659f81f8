use crate::{
    error::PgxError,
    utils::util::{append_extension, Result},
};
use flate2::read::MultiGzDecoder;
use rust_htslib::faidx;
use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader, Read as ioRead},
    path::{Path, PathBuf},
};

pub fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path)
        .map_err(|error| crate::pgx_error!("Failed to open file {}: {error}", path.display()))?;
    if is_gzipped(path) {
        Ok(BufReader::new(Box::new(MultiGzDecoder::new(file))))
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Non-empty, non-comment lines, trimmed.
fn read_entries(path: &Path) -> Result<Vec<String>> {
    let reader = open_text_reader(path)?;
    let mut entries = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            crate::pgx_error!(
                "Error reading line {} of {}: {}",
                line_num + 1,
                path.display(),
                e
            )
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        entries.push(trimmed.to_string());
    }
    Ok(entries)
}

/// One sample ID per line. Repeated IDs are dropped.
pub fn read_sample_file(path: &Path) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for sample in read_entries(path)? {
        if seen.insert(sample.clone()) {
            samples.push(sample);
        } else {
            log::warn!("Duplicate sample {} in {} ignored", sample, path.display());
        }
    }
    if samples.is_empty() {
        return Err(crate::pgx_error!(
            "No sample IDs found in {}",
            path.display()
        ));
    }
    Ok(samples)
}

/// One VCF path per line. Paths that do not exist are skipped with a warning.
pub fn read_vcf_list(path: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in read_entries(path)? {
        let vcf = PathBuf::from(&entry);
        if vcf.is_file() {
            paths.push(vcf);
        } else {
            log::warn!("Skip {} because the file does not exist", entry);
        }
    }
    if paths.is_empty() {
        return Err(crate::pgx_error!(
            "No existing VCF paths found in {}",
            path.display()
        ));
    }
    Ok(paths)
}

/// The reference FASTA must carry a `.fai` index for `bcftools norm -f`.
pub fn check_reference_fasta(path: &Path) -> Result<()> {
    let fai_path = append_extension(path, "fai");
    if !fai_path.exists() {
        return Err(PgxError::MissingReferenceIndex {
            fai_path,
            reference_path: path.to_path_buf(),
        });
    }
    let reader = faidx::Reader::from_path(path)?;
    log::debug!(
        "Reference {} indexed with {} sequences",
        path.display(),
        reader.n_seqs()
    );
    Ok(())
}
