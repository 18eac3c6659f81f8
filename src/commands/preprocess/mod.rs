use crate::{
    cli::PreprocessArgs,
    error::PgxError,
    io::{
        bcftools::Toolkit,
        command::{probe_version, SystemRunner, ToolCommand, ToolRunner},
        download::download_grch38_reference,
        readers::{check_reference_fasta, read_sample_file, read_vcf_list},
        vcf_reader::{validate_bgzip_vcf, vcf_sample_list},
    },
    utils::util::{append_extension, Result},
};
use std::{
    collections::HashSet,
    fmt::Display,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

mod extract;
mod normalize;
mod output;


/// Where the genotypes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Single(PathBuf),
    /// Several VCFs (typically one per chromosome) that are extracted and concatenated.
    Multiple(Vec<PathBuf>),
}

impl InputSource {
    pub fn first(&self) -> Option<&Path> {
        match self {
            InputSource::Single(path) => Some(path),
            InputSource::Multiple(paths) => paths.first().map(PathBuf::as_path),
        }
    }

    pub fn paths(&self) -> Vec<&Path> {
        match self {
            InputSource::Single(path) => vec![path.as_path()],
            InputSource::Multiple(paths) => paths.iter().map(PathBuf::as_path).collect(),
        }
    }
}

/// Fully resolved inputs of one preprocessing run.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    pub input: InputSource,
    pub reference: PathBuf,
    pub ref_pgx_vcf: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub samples: Vec<String>,
    pub keep_intermediate_files: bool,
}

/// Drives the external toolkit through `runner`.
pub struct Preprocessor<'a, R: ToolRunner> {
    pub toolkit: Toolkit,
    runner: &'a R,
}

impl<'a, R: ToolRunner> Preprocessor<'a, R> {
    pub fn new(toolkit: Toolkit, runner: &'a R) -> Self {
        Self { toolkit, runner }
    }

    fn run(&self, command: ToolCommand, message: &str) -> Result<()> {
        self.runner.run(&command, message)
    }

    /// Writes `<vcf>.tbi` next to `vcf`.
    pub fn tabix_index_vcf(&self, vcf: &Path) -> Result<()> {
        self.run(
            self.toolkit.tabix_index(vcf),
            &format!("Indexing {}", vcf.display()),
        )
        .map_err(|e| crate::pgx_error!("Cannot index the file {}: {e}", vcf.display()))
    }

    /// extract -> normalize -> filter -> per-sample output. Returns the per-sample VCFs.
    pub fn run_pipeline(&self, plan: &PipelinePlan) -> Result<Vec<PathBuf>> {
        let extracted = match &plan.input {
            InputSource::Single(vcf) => self.extract_regions_from_single_file(
                vcf,
                &plan.ref_pgx_vcf,
                &plan.output_dir,
                &plan.output_prefix,
                &plan.samples,
            )?,
            InputSource::Multiple(vcfs) => self.extract_regions_from_multiple_files(
                vcfs,
                &plan.reference,
                &plan.ref_pgx_vcf,
                &plan.output_dir,
                &plan.output_prefix,
                &plan.samples,
            )?,
        };
        let normalized = self.normalize_vcf(&extracted, &plan.reference)?;
        let pgx_only = self.filter_pgx_variants(
            &normalized,
            &plan.reference,
            &plan.ref_pgx_vcf,
            &plan.output_dir,
            &plan.output_prefix,
        )?;
        let outputs = self.output_pharmcat_ready_vcf(
            &pgx_only,
            &plan.output_dir,
            &plan.output_prefix,
            &plan.samples,
        )?;

        if !plan.keep_intermediate_files {
            for intermediate in [&extracted, &normalized, &pgx_only] {
                remove_vcf_and_index(intermediate);
            }
        }
        Ok(outputs)
    }
}

/// Deletes a VCF and its `.tbi`. Failures are only logged.
pub fn remove_vcf_and_index(vcf: &Path) {
    for path in [vcf.to_path_buf(), append_extension(vcf, "tbi")] {
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("Removed intermediate file {}", path.display()),
            Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
        }
    }
}

/// Temporary file in `dir` holding one item per line; deleted on drop.
pub(crate) fn write_temp_lines<I, S>(dir: &Path, label: &str, lines: I) -> Result<NamedTempFile>
where
    I: IntoIterator<Item = S>,
    S: Display,
{
    let mut file = tempfile::Builder::new()
        .prefix(&format!("pgxprep_{label}_"))
        .suffix(".txt")
        .tempfile_in(dir)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

/// Samples from `sample_file` (all must be present in `vcf`), or every sample of `vcf`.
pub fn resolve_samples(sample_file: Option<&Path>, vcf: &Path) -> Result<Vec<String>> {
    let available = vcf_sample_list(vcf)?;
    let samples = match sample_file {
        Some(path) => {
            let requested = read_sample_file(path)?;
            let known: HashSet<&String> = available.iter().collect();
            let unknown: Vec<String> = requested
                .iter()
                .filter(|s| !known.contains(s))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(PgxError::UnknownSamples {
                    path: vcf.to_path_buf(),
                    samples: unknown,
                });
            }
            requested
        }
        None => available,
    };
    if samples.is_empty() {
        return Err(crate::pgx_error!(
            "No samples found in {}",
            vcf.display()
        ));
    }
    log::info!("Processing {} sample(s)", samples.len());
    Ok(samples)
}

fn check_tools(toolkit: &Toolkit) -> Result<()> {
    for program in [&toolkit.bcftools, &toolkit.tabix] {
        let version = probe_version(program)?;
        log::debug!("Found {}: {}", program.display(), version);
    }
    Ok(())
}

fn resolve_input(args: &PreprocessArgs) -> Result<InputSource> {
    match (&args.vcf, &args.vcf_list) {
        (Some(vcf), None) => Ok(InputSource::Single(vcf.clone())),
        (None, Some(list)) => Ok(InputSource::Multiple(read_vcf_list(list)?)),
        _ => unreachable!("Either --vcf or --vcf-list is provided, never both"),
    }
}

pub fn preprocess(args: PreprocessArgs) -> Result<()> {
    let toolkit = Toolkit::new(&args.tools.bcftools, &args.tools.tabix);
    check_tools(&toolkit)?;

    fs::create_dir_all(&args.output_dir).map_err(|e| {
        crate::pgx_error!(
            "Cannot create output directory {}: {e}",
            args.output_dir.display()
        )
    })?;

    let input = resolve_input(&args)?;
    for vcf in input.paths() {
        validate_bgzip_vcf(vcf)?;
    }
    let first = input
        .first()
        .ok_or_else(|| crate::pgx_error!("No input VCF provided"))?
        .to_path_buf();

    let reference = match &args.ref_seq {
        Some(path) => path.clone(),
        None => download_grch38_reference(&args.output_dir, None)?,
    };
    check_reference_fasta(&reference)?;

    let samples = resolve_samples(args.sample_file.as_deref(), &first)?;

    let plan = PipelinePlan {
        input,
        reference,
        ref_pgx_vcf: args.ref_pgx_vcf.clone(),
        output_dir: args.output_dir.clone(),
        output_prefix: args.output_prefix.clone(),
        samples,
        keep_intermediate_files: args.keep_intermediate_files,
    };
    log::trace!("Pipeline plan: {:#?}", plan);

    let runner = SystemRunner;
    let outputs = Preprocessor::new(toolkit, &runner).run_pipeline(&plan)?;
    for output in &outputs {
        log::info!("Wrote {}", output.display());
    }
    Ok(())
}
