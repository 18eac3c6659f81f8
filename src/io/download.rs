use crate::{
    constants::{grch38_fasta_index_url, grch38_fasta_url},
    error::PgxError,
    utils::{
        util::{append_extension, Result},
        util_intern::readable_size,
    },
};
use flate2::read::MultiGzDecoder;
use reqwest::{blocking::Client, Url};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Last non-empty segment of the URL path.
pub fn remote_basename(url: &str) -> Result<String> {
    let invalid = || PgxError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(invalid)
}

fn quit_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(PgxError::FileExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        // The reference FASTA is ~900 MB; only the connection attempt is bounded
        .timeout(None::<Duration>)
        .user_agent(format!("pgxprep/{}", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Downloads `url` into `download_dir` (or to `save_to`).
///
/// The payload is first written inside a temporary directory in `download_dir` and only
/// renamed into place once complete, so a failed transfer leaves nothing behind.
pub fn download_from_url(url: &str, download_dir: &Path, save_to: Option<&Path>) -> Result<PathBuf> {
    let basename = remote_basename(url)?;
    let local_path = match save_to {
        Some(path) => path.to_path_buf(),
        None => download_dir.join(&basename),
    };
    quit_if_exists(&local_path)?;

    let temp_dir = tempfile::Builder::new()
        .prefix("pgxprep_download_")
        .tempdir_in(download_dir)?;
    let temp_path = temp_dir.path().join(format!("temp_{basename}"));

    log::info!(
        "Downloading from \"{}\" to \"{}\"",
        url,
        local_path.display()
    );
    let mut response = http_client()?.get(url).send()?.error_for_status()?;
    let mut out = BufWriter::new(File::create(&temp_path)?);
    let bytes = response.copy_to(&mut out)?;
    out.flush()?;
    drop(out);

    let (size, unit) = readable_size(bytes);
    log::debug!("Downloaded {:.2} {} from {}", size, unit, url);

    fs::rename(&temp_path, &local_path)?;
    Ok(local_path)
}

/// Decompresses `x.gz` into `x` and returns the new path.
pub fn decompress_gz_file(path: &Path) -> Result<PathBuf> {
    let decompressed = path.with_extension("");
    if decompressed == path {
        return Err(crate::pgx_error!(
            "Cannot derive a decompressed file name for {}",
            path.display()
        ));
    }
    log::info!("Decompressing {}", path.display());
    let mut decoder = MultiGzDecoder::new(File::open(path)?);
    let mut out = BufWriter::new(File::create(&decompressed)?);
    io::copy(&mut decoder, &mut out)?;
    out.flush()?;
    Ok(decompressed)
}

/// Fetches the GRCh38 no-alt analysis set FASTA and its `.fai` from NCBI.
///
/// An existing FASTA + `.fai` pair at the destination is reused.
pub fn download_grch38_reference(download_dir: &Path, save_to: Option<&Path>) -> Result<PathBuf> {
    let fasta_url = grch38_fasta_url();
    let index_url = grch38_fasta_index_url();

    let fasta_gz_name = remote_basename(&fasta_url)?;
    let default_fasta = download_dir.join(&fasta_gz_name).with_extension("");
    let target = save_to.map_or_else(|| default_fasta.clone(), Path::to_path_buf);
    if target.exists() && append_extension(&target, "fai").exists() {
        log::info!("Using existing reference genome {}", target.display());
        return Ok(target);
    }

    let fasta_gz = download_from_url(&fasta_url, download_dir, None)?;
    let fasta = decompress_gz_file(&fasta_gz)?;
    fs::remove_file(&fasta_gz)?;
    let fasta_index = download_from_url(&index_url, download_dir, None)?;

    if target != fasta {
        fs::rename(&fasta, &target)?;
        fs::rename(&fasta_index, append_extension(&target, "fai"))?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_remote_basename() {
        assert_eq!(
            remote_basename(&grch38_fasta_url()).unwrap(),
            "GCA_000001405.15_GRCh38_no_alt_analysis_set.fna.gz"
        );
        assert_eq!(
            remote_basename(&grch38_fasta_index_url()).unwrap(),
            "GCA_000001405.15_GRCh38_no_alt_analysis_set.fna.fai"
        );
        assert_eq!(
            remote_basename("https://example.org/data/panel.vcf?raw=1").unwrap(),
            "panel.vcf"
        );
    }

    #[test]
    fn test_remote_basename_invalid() {
        for url in ["https://example.org/", "https://example.org", "not a url"] {
            let err = remote_basename(url).unwrap_err();
            assert!(matches!(err, PgxError::InvalidUrl { .. }), "{url}");
        }
    }

    #[test]
    fn test_download_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("panel.vcf");
        fs::write(&existing, "keep me").unwrap();
        let err = download_from_url("https://example.org/panel.vcf", dir.path(), None).unwrap_err();
        assert!(matches!(err, PgxError::FileExists { .. }));
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
    }

    #[test]
    fn test_failed_download_leaves_no_files() {
        let dir = tempdir().unwrap();
        // Nothing listens on the discard port locally, so the connection is refused
        let result = download_from_url("http://127.0.0.1:9/panel.vcf", dir.path(), None);
        assert!(result.is_err());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_decompress_gz_file() {
        let dir = tempdir().unwrap();
        let gz = dir.path().join("reference.fna.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b">chr1\nACGT\n").unwrap();
        encoder.finish().unwrap();

        let out = decompress_gz_file(&gz).unwrap();
        assert_eq!(out, dir.path().join("reference.fna"));
        let mut contents = String::new();
        File::open(&out)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, ">chr1\nACGT\n");
    }

    #[test]
    fn test_existing_reference_is_reused() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("GCA_000001405.15_GRCh38_no_alt_analysis_set.fna");
        fs::write(&fasta, ">chr1\nA\n").unwrap();
        fs::write(append_extension(&fasta, "fai"), "chr1\t1\t6\t1\t2\n").unwrap();
        assert_eq!(download_grch38_reference(dir.path(), None).unwrap(), fasta);

        let custom = dir.path().join("grch38.fa");
        fs::write(&custom, ">chr1\nA\n").unwrap();
        fs::write(append_extension(&custom, "fai"), "chr1\t1\t6\t1\t2\n").unwrap();
        assert_eq!(
            download_grch38_reference(dir.path(), Some(&custom)).unwrap(),
            custom
        );
    }
}
