use crate::constants::*;
use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
/// * `0.1.0` - built outside a git checkout
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    let git_describe = option_env!("VERGEN_GIT_DESCRIBE").unwrap_or_default();
    if git_describe.is_empty() || git_describe == "VERGEN_IDEMPOTENT_OUTPUT" {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
    }
});

#[derive(Parser, Debug)]
#[command(name="pgxprep",
          version=&**FULL_VERSION,
          about="Prepare VCF files for pharmacogenomic allele calling",
          long_about = None,
          after_help = format!("Copyright (C) 2021-{}
          This program comes with ABSOLUTELY NO WARRANTY; it is intended for
          Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize VCF(s) against the PGx reference panel and write one VCF per sample
    Preprocess(PreprocessArgs),
    /// Download the GRCh38 reference genome and its index
    DownloadReference(DownloadArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Preprocess(_) => "preprocess",
            Command::DownloadReference(_) => "download-reference",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["vcf", "vcf_list"]),
))]
#[command(arg_required_else_help(true))]
pub struct PreprocessArgs {
    /// Input VCF (bgzip-compressed)
    #[arg(
        long = "vcf",
        value_name = "VCF",
        value_parser = check_file_exists
    )]
    pub vcf: Option<PathBuf>,

    /// File containing paths of VCF files to process (one per line), e.g. one VCF per chromosome
    #[arg(
        long = "vcf-list",
        value_name = "VCF_LIST",
        value_parser = check_file_exists
    )]
    pub vcf_list: Option<PathBuf>,

    /// VCF of the pharmacogenomic allele-defining positions
    #[arg(
        long = "ref-pgx-vcf",
        value_name = "VCF",
        value_parser = check_file_exists
    )]
    pub ref_pgx_vcf: PathBuf,

    /// Reference genome FASTA with a .fai index [default: download GRCh38 into the output directory]
    #[arg(
        long = "ref-seq",
        value_name = "FASTA",
        value_parser = check_file_exists
    )]
    pub ref_seq: Option<PathBuf>,

    /// File of sample IDs to keep (one per line) [default: all samples of the input]
    #[arg(
        short = 'S',
        long = "sample-file",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub sample_file: Option<PathBuf>,

    /// Directory for the output files
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    /// Prefix of the output file names
    #[arg(
        long = "output-prefix",
        value_name = "PREFIX",
        default_value = DEFAULT_OUTPUT_PREFIX,
        value_parser = check_output_prefix
    )]
    pub output_prefix: String,

    /// Keep the intermediate VCFs
    #[arg(
        long = "keep-intermediate-files",
        default_value_t = DEFAULT_KEEP_INTERMEDIATE_FILES
    )]
    pub keep_intermediate_files: bool,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ToolArgs {
    /// Path to the bcftools executable
    #[arg(
        help_heading("Advanced"),
        long = "bcftools",
        value_name = "PATH",
        env = "PGXPREP_BCFTOOLS",
        default_value = DEFAULT_BCFTOOLS
    )]
    pub bcftools: PathBuf,

    /// Path to the tabix executable
    #[arg(
        help_heading("Advanced"),
        long = "tabix",
        value_name = "PATH",
        env = "PGXPREP_TABIX",
        default_value = DEFAULT_TABIX
    )]
    pub tabix: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct DownloadArgs {
    /// Directory to download into
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    /// Save the FASTA under this path instead (its index is written next to it)
    #[arg(
        long = "save-as",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub save_as: Option<PathBuf>,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// `-v` enables debug output, `-vv` and above enables trace output.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn check_output_prefix(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        return Err(anyhow!("Output prefix cannot be empty"));
    }
    if s.contains(std::path::MAIN_SEPARATOR) || s.contains('/') {
        return Err(anyhow!(
            "Output prefix `{}` must be a file name prefix, not a path; use --output-dir",
            s
        ));
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse_preprocess(args: &[&str]) -> PreprocessArgs {
        let cli = Cli::try_parse_from(args).expect("CLI parse should succeed");
        match cli.command {
            Command::Preprocess(args) => args,
            other => panic!("unexpected command {}", other.name()),
        }
    }

    #[test]
    fn test_preprocess_defaults() {
        let dir = tempdir().unwrap();
        let vcf = dir.path().join("in.vcf.gz");
        let panel = dir.path().join("panel.vcf");
        fs::write(&vcf, b"").unwrap();
        fs::write(&panel, b"").unwrap();

        let args = parse_preprocess(&[
            "pgxprep",
            "preprocess",
            "--vcf",
            vcf.to_str().unwrap(),
            "--ref-pgx-vcf",
            panel.to_str().unwrap(),
        ]);
        assert_eq!(args.vcf.as_deref(), Some(vcf.as_path()));
        assert_eq!(args.vcf_list, None);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert_eq!(args.output_prefix, DEFAULT_OUTPUT_PREFIX);
        assert!(!args.keep_intermediate_files);
        assert!(args.ref_seq.is_none());
    }

    #[test]
    fn test_preprocess_requires_exactly_one_input() {
        let dir = tempdir().unwrap();
        let vcf = dir.path().join("in.vcf.gz");
        let list = dir.path().join("list.txt");
        fs::write(&vcf, b"").unwrap();
        fs::write(&list, b"").unwrap();
        let vcf = vcf.to_str().unwrap();
        let list = list.to_str().unwrap();

        assert!(Cli::try_parse_from(["pgxprep", "preprocess", "--ref-pgx-vcf", vcf]).is_err());
        assert!(Cli::try_parse_from([
            "pgxprep",
            "preprocess",
            "--vcf",
            vcf,
            "--vcf-list",
            list,
            "--ref-pgx-vcf",
            vcf
        ])
        .is_err());
    }

    #[test]
    fn test_preprocess_rejects_missing_files_and_bad_prefix() {
        let dir = tempdir().unwrap();
        let vcf = dir.path().join("in.vcf.gz");
        fs::write(&vcf, b"").unwrap();
        let vcf = vcf.to_str().unwrap();

        assert!(Cli::try_parse_from([
            "pgxprep",
            "preprocess",
            "--vcf",
            "/no/such/input.vcf.gz",
            "--ref-pgx-vcf",
            vcf
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "pgxprep",
            "preprocess",
            "--vcf",
            vcf,
            "--ref-pgx-vcf",
            vcf,
            "--output-prefix",
            "out/prefix"
        ])
        .is_err());
    }

    #[test]
    fn test_tool_paths_and_verbosity() {
        let dir = tempdir().unwrap();
        let vcf = dir.path().join("in.vcf.gz");
        fs::write(&vcf, b"").unwrap();
        let vcf = vcf.to_str().unwrap();

        let cli = Cli::try_parse_from([
            "pgxprep",
            "-vv",
            "preprocess",
            "--vcf",
            vcf,
            "--ref-pgx-vcf",
            vcf,
            "--bcftools",
            "/opt/bcftools/bin/bcftools",
            "--keep-intermediate-files",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        let Command::Preprocess(args) = cli.command else {
            panic!("expected preprocess");
        };
        assert_eq!(
            args.tools.bcftools,
            PathBuf::from("/opt/bcftools/bin/bcftools")
        );
        assert!(args.keep_intermediate_files);
    }

    #[test]
    fn test_download_reference_args() {
        let cli = Cli::try_parse_from(["pgxprep", "download-reference", "-o", "refs"]).unwrap();
        assert_eq!(cli.command.name(), "download-reference");
        let Command::DownloadReference(args) = cli.command else {
            panic!("expected download-reference");
        };
        assert_eq!(args.output_dir, PathBuf::from("refs"));
        assert!(args.save_as.is_none());
    }
}
