use crate::{
    core::chromosome::{ChromNaming, Chromosome},
    error::PgxError,
    utils::util::{append_extension, Result},
};
use rust_htslib::bcf::{self, Read};
use std::{fs::File, io::Read as ReadIo, path::Path};

pub fn is_indexed(file: &Path) -> bool {
    append_extension(file, "csi").exists() || append_extension(file, "tbi").exists()
}

fn has_gzip_magic(path: &Path) -> Result<bool> {
    let mut f = File::open(path)
        .map_err(|e| crate::pgx_error!("Failed to open {}: {e}", path.display()))?;
    let mut m = [0u8; 2];
    let n = ReadIo::read(&mut f, &mut m)
        .map_err(|e| crate::pgx_error!("Failed to read {}: {e}", path.display()))?;
    Ok(n == 2 && m == [0x1f, 0x8b])
}

fn looks_like_vcf(p: &[u8]) -> bool {
    let mut p = p;
    // Strip the UTF-8 BOM if present
    if p.starts_with(&[0xEF, 0xBB, 0xBF]) {
        p = &p[3..];
    }
    p.starts_with(b"##fileformat=VCF")
}

/// Region queries need a BGZF-compressed VCF; plain gzip is rejected with a hint.
pub fn validate_bgzip_vcf(file: &Path) -> Result<()> {
    let is_bgzf = rust_htslib::bgzf::is_bgzip(file).map_err(|e| {
        crate::pgx_error!(
            "Failed to determine whether {} is BGZF-compressed: {e}",
            file.display()
        )
    })?;

    if !is_bgzf {
        if has_gzip_magic(file)? {
            return Err(crate::pgx_error!(
                "File {} is gzip-compressed but not BGZF (bgzip). Recompress with bgzip (or `bcftools view -Oz`) and index with `tabix -p vcf`.",
                file.display()
            ));
        }
        return Err(crate::pgx_error!(
            "File {} is not BGZF (bgzip) compressed",
            file.display()
        ));
    }

    let mut r = rust_htslib::bgzf::Reader::from_path(file)
        .map_err(|e| crate::pgx_error!("Failed to open BGZF reader for {}: {e}", file.display()))?;
    let mut buf = vec![0u8; 512];
    let n = r.read(&mut buf).map_err(|e| {
        crate::pgx_error!("Failed to read BGZF stream from {}: {e}", file.display())
    })?;
    buf.truncate(n);

    if buf.is_empty() {
        return Err(crate::pgx_error!("File {} is empty", file.display()));
    }
    if looks_like_vcf(&buf) {
        Ok(())
    } else {
        Err(crate::pgx_error!(
            "File {} is BGZF-compressed, but the decompressed header does not look like VCF",
            file.display()
        ))
    }
}

fn open_reader(path: &Path) -> Result<bcf::Reader> {
    bcf::Reader::from_path(path)
        .map_err(|e| crate::pgx_error!("Failed to open VCF file {}: {}", path.display(), e))
}

fn record_contig(record: &bcf::Record) -> Result<String> {
    let rid = record
        .rid()
        .ok_or_else(|| crate::pgx_error!("VCF record at position {} has no CHROM", record.pos()))?;
    let name = record.header().rid2name(rid)?;
    Ok(std::str::from_utf8(name)?.to_string())
}

/// Sample names in header order.
pub fn vcf_sample_list(path: &Path) -> Result<Vec<String>> {
    let reader = open_reader(path)?;
    let samples = reader
        .header()
        .samples()
        .into_iter()
        .map(|s| std::str::from_utf8(s).map(str::to_string))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    log::trace!("{:?} samples n = {}", path, samples.len());
    Ok(samples)
}

/// Contig naming of the first record.
pub fn detect_chrom_naming(path: &Path) -> Result<ChromNaming> {
    let mut reader = open_reader(path)?;
    let mut record = reader.empty_record();
    match reader.read(&mut record) {
        Some(Ok(())) => {
            let contig = record_contig(&record)?;
            // Only recognized human chromosome names qualify.
            Chromosome::parse(&contig)?;
            let naming = ChromNaming::of(&contig);
            log::debug!("{} uses {:?} contig names ({contig})", path.display(), naming);
            Ok(naming)
        }
        Some(Err(e)) => Err(crate::pgx_error!(
            "Error reading record from {}: {e}",
            path.display()
        )),
        None => Err(PgxError::EmptyVcf {
            path: path.to_path_buf(),
        }),
    }
}

/// 1-based positions of every record of the PGx reference panel.
pub fn read_reference_positions(path: &Path) -> Result<Vec<(Chromosome, u64)>> {
    let mut reader = open_reader(path)?;
    let mut record = reader.empty_record();
    let mut positions = Vec::new();
    while let Some(result) = reader.read(&mut record) {
        result.map_err(|e| {
            crate::pgx_error!("Error reading record from {}: {e}", path.display())
        })?;
        let contig = record_contig(&record)?;
        let chrom = Chromosome::parse(&contig)?;
        let pos = u64::try_from(record.pos() + 1)
            .map_err(|_| crate::pgx_error!("Negative position in {}", path.display()))?;
        positions.push((chrom, pos));
    }
    if positions.is_empty() {
        return Err(PgxError::EmptyVcf {
            path: path.to_path_buf(),
        });
    }
    log::debug!(
        "Read {} reference PGx positions from {}",
        positions.len(),
        path.display()
    );
    Ok(positions)
}
