use super::Preprocessor;
use crate::{io::command::ToolRunner, utils::util::Result};
use std::path::{Path, PathBuf};

pub fn sample_output_path(output_dir: &Path, output_prefix: &str, sample: &str) -> PathBuf {
    output_dir.join(format!("{output_prefix}.{sample}.vcf"))
}

impl<R: ToolRunner> Preprocessor<'_, R> {
    /// One uncompressed PharmCAT-ready VCF per sample, uncalled sites dropped.
    pub fn output_pharmcat_ready_vcf(
        &self,
        input: &Path,
        output_dir: &Path,
        output_prefix: &str,
        samples: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::with_capacity(samples.len());
        for sample in samples {
            let output = sample_output_path(output_dir, output_prefix, sample);
            self.run(
                self.toolkit.view_sample(sample, &output, input),
                &format!("Generating a PharmCAT-ready VCF for {sample}"),
            )?;
            outputs.push(output);
        }
        Ok(outputs)
    }
}
