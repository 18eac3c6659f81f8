//! Construction of every bcftools/tabix invocation used by the pipeline.
//!
//! Common bcftools options:
//! * `-O z|v` output compressed (`z`) or uncompressed (`v`) VCF, `-o` output path.
//! * `--no-version` do not append version and command line to the header.
//! * `-s` / `-S` comma-separated sample list / file of samples, `^` prefix excludes.
//! * `-r chr:beg-end[,...]` restrict to regions (requires an indexed input).
//! * `-c ws` on REF mismatch warn (`w`) and fix (`s`, swaps alleles and updates GT/AC).
//! * `-m+` / `-m-` join biallelic sites into multiallelic records / split them.

use super::command::ToolCommand;
use crate::REFERENCE_PANEL_SAMPLE;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Vcf { is_uncompressed: bool },
}

impl OutputType {
    pub const COMPRESSED_VCF: OutputType = OutputType::Vcf {
        is_uncompressed: false,
    };
    pub const UNCOMPRESSED_VCF: OutputType = OutputType::Vcf {
        is_uncompressed: true,
    };

    fn flag(&self) -> &'static str {
        match self {
            OutputType::Vcf {
                is_uncompressed: false,
            } => "-Oz",
            OutputType::Vcf {
                is_uncompressed: true,
            } => "-Ov",
        }
    }
}

/// Locations of the external executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolkit {
    pub bcftools: PathBuf,
    pub tabix: PathBuf,
}

impl Toolkit {
    pub fn new(bcftools: impl Into<PathBuf>, tabix: impl Into<PathBuf>) -> Self {
        Self {
            bcftools: bcftools.into(),
            tabix: tabix.into(),
        }
    }

    fn bcftools(&self, subcommand: &str) -> ToolCommand {
        ToolCommand::new(&self.bcftools).arg(subcommand)
    }

    fn output(cmd: ToolCommand, output_type: OutputType, output: &Path) -> ToolCommand {
        cmd.arg(output_type.flag()).arg("-o").arg(output)
    }

    /// `tabix -f -p vcf <vcf>`, writes `<vcf>.tbi`.
    pub fn tabix_index(&self, vcf: &Path) -> ToolCommand {
        ToolCommand::new(&self.tabix)
            .args(["-f", "-p", "vcf"])
            .arg(vcf)
    }

    /// Subset samples and PGx regions from a `chr`-named input.
    pub fn view_regions(
        &self,
        samples_file: &Path,
        regions: &str,
        output: &Path,
        input: &Path,
    ) -> ToolCommand {
        let cmd = self
            .bcftools("view")
            .arg("-S")
            .arg(samples_file)
            .args(["-r", regions]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output).arg(input)
    }

    /// Subset samples and PGx regions from a bare-named input, renaming contigs on the way out.
    pub fn annotate_rename_regions(
        &self,
        samples_file: &Path,
        rename_map: &Path,
        regions: &str,
        output: &Path,
        input: &Path,
    ) -> ToolCommand {
        let cmd = self
            .bcftools("annotate")
            .arg("-S")
            .arg(samples_file)
            .arg("--rename-chrs")
            .arg(rename_map)
            .args(["-r", regions]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output).arg(input)
    }

    /// `concat -a` allows overlapping inputs; the file list holds one indexed VCF per line.
    pub fn concat(&self, file_list: &Path, output: &Path) -> ToolCommand {
        let cmd = self.bcftools("concat").arg("-a").arg("-f").arg(file_list);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
    }

    /// Joins biallelic records into multiallelic ones after concatenation.
    pub fn norm_join(&self, reference: &Path, output: &Path, input: &Path) -> ToolCommand {
        let cmd = self.bcftools("norm").args(["-m+", "-c", "ws"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
            .arg("-f")
            .arg(reference)
            .arg(input)
    }

    /// Left-aligns against `reference` and splits multiallelic records.
    pub fn norm_split(&self, reference: &Path, output: &Path, input: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("norm")
            .args(["--no-version", "-m-", "-c", "ws"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
            .arg("-f")
            .arg(reference)
            .arg(input)
    }

    /// Records of `input` that exactly match (CHROM, POS, REF, ALT) a panel record.
    pub fn isec_shared(&self, panel: &Path, input: &Path, output: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("isec")
            .args(["--no-version", "-c", "none", "-n=2", "-w2"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
            .arg(panel)
            .arg(input)
    }

    /// Adds every panel position to `input`, merging records of both types (`-m both`).
    pub fn merge_with_panel(&self, input: &Path, panel: &Path, output: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("merge")
            .args(["--no-version", "-m", "both"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
            .arg(input)
            .arg(panel)
    }

    /// Multiallelic representation without REF checking (`-N`).
    pub fn norm_enforce_multiallelic(&self, output: &Path, input: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("norm")
            .args(["--no-version", "-m+", "-N"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output).arg(input)
    }

    pub fn view_drop_panel_sample(&self, output: &Path, input: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("view")
            .arg("-s")
            .arg(format!("^{REFERENCE_PANEL_SAMPLE}"));
        Self::output(cmd, OutputType::COMPRESSED_VCF, output).arg(input)
    }

    /// Panel records absent from `input` (`-C` complement, `-w1` write the panel side).
    pub fn isec_missing(&self, panel: &Path, input: &Path, output: &Path) -> ToolCommand {
        let cmd = self
            .bcftools("isec")
            .args(["--no-version", "-c", "none", "-w1"]);
        Self::output(cmd, OutputType::COMPRESSED_VCF, output)
            .arg("-C")
            .arg(panel)
            .arg(input)
    }

    /// One sample, uncalled sites (`./.`) excluded with `-U`.
    pub fn view_sample(&self, sample: &str, output: &Path, input: &Path) -> ToolCommand {
        let cmd = self.bcftools("view").args(["--no-version", "-U"]);
        Self::output(cmd, OutputType::UNCOMPRESSED_VCF, output)
            .args(["-s", sample])
            .arg(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> Toolkit {
        Toolkit::new("/opt/bin/bcftools", "/opt/bin/tabix")
    }

    fn p(s: &str) -> &Path {
        Path::new(s)
    }

    #[test]
    fn test_tabix_index() {
        let cmd = toolkit().tabix_index(p("a.vcf.gz"));
        assert_eq!(cmd.program(), p("/opt/bin/tabix"));
        assert_eq!(cmd.argv(), ["-f", "-p", "vcf", "a.vcf.gz"]);
    }

    #[test]
    fn test_region_extraction() {
        let tk = toolkit();
        let view = tk.view_regions(p("s.txt"), "chr1:1-10", p("o.vcf.gz"), p("i.vcf.gz"));
        assert_eq!(view.program(), p("/opt/bin/bcftools"));
        assert_eq!(
            view.argv(),
            ["view", "-S", "s.txt", "-r", "chr1:1-10", "-Oz", "-o", "o.vcf.gz", "i.vcf.gz"]
        );

        let annotate = tk.annotate_rename_regions(
            p("s.txt"),
            p("map.tsv"),
            "1:1-10",
            p("o.vcf.gz"),
            p("i.vcf.gz"),
        );
        assert_eq!(
            annotate.argv(),
            [
                "annotate",
                "-S",
                "s.txt",
                "--rename-chrs",
                "map.tsv",
                "-r",
                "1:1-10",
                "-Oz",
                "-o",
                "o.vcf.gz",
                "i.vcf.gz"
            ]
        );
    }

    #[test]
    fn test_concat_and_join() {
        let tk = toolkit();
        assert_eq!(
            tk.concat(p("list.txt"), p("c.vcf.gz")).argv(),
            ["concat", "-a", "-f", "list.txt", "-Oz", "-o", "c.vcf.gz"]
        );
        assert_eq!(
            tk.norm_join(p("ref.fna"), p("o.vcf.gz"), p("c.vcf.gz")).argv(),
            ["norm", "-m+", "-c", "ws", "-Oz", "-o", "o.vcf.gz", "-f", "ref.fna", "c.vcf.gz"]
        );
    }

    #[test]
    fn test_norm_split() {
        assert_eq!(
            toolkit()
                .norm_split(p("ref.fna"), p("o.vcf.gz"), p("i.vcf.gz"))
                .argv(),
            [
                "norm",
                "--no-version",
                "-m-",
                "-c",
                "ws",
                "-Oz",
                "-o",
                "o.vcf.gz",
                "-f",
                "ref.fna",
                "i.vcf.gz"
            ]
        );
    }

    #[test]
    fn test_panel_reconciliation() {
        let tk = toolkit();
        assert_eq!(
            tk.isec_shared(p("panel.vcf.gz"), p("i.vcf.gz"), p("o.vcf.gz"))
                .argv(),
            [
                "isec",
                "--no-version",
                "-c",
                "none",
                "-n=2",
                "-w2",
                "-Oz",
                "-o",
                "o.vcf.gz",
                "panel.vcf.gz",
                "i.vcf.gz"
            ]
        );
        assert_eq!(
            tk.merge_with_panel(p("i.vcf.gz"), p("panel.vcf.gz"), p("m.vcf.gz"))
                .argv(),
            [
                "merge",
                "--no-version",
                "-m",
                "both",
                "-Oz",
                "-o",
                "m.vcf.gz",
                "i.vcf.gz",
                "panel.vcf.gz"
            ]
        );
        assert_eq!(
            tk.norm_enforce_multiallelic(p("o.vcf.gz"), p("m.vcf.gz"))
                .argv(),
            ["norm", "--no-version", "-m+", "-N", "-Oz", "-o", "o.vcf.gz", "m.vcf.gz"]
        );
        assert_eq!(
            tk.view_drop_panel_sample(p("o.vcf.gz"), p("i.vcf.gz")).argv(),
            ["view", "-s", "^PharmCAT", "-Oz", "-o", "o.vcf.gz", "i.vcf.gz"]
        );
        assert_eq!(
            tk.isec_missing(p("panel.vcf.gz"), p("i.vcf.gz"), p("miss.vcf.gz"))
                .argv(),
            [
                "isec",
                "--no-version",
                "-c",
                "none",
                "-w1",
                "-Oz",
                "-o",
                "miss.vcf.gz",
                "-C",
                "panel.vcf.gz",
                "i.vcf.gz"
            ]
        );
    }

    #[test]
    fn test_view_sample() {
        assert_eq!(
            toolkit()
                .view_sample("NA12878", p("out.NA12878.vcf"), p("i.vcf.gz"))
                .argv(),
            [
                "view",
                "--no-version",
                "-U",
                "-Ov",
                "-o",
                "out.NA12878.vcf",
                "-s",
                "NA12878",
                "i.vcf.gz"
            ]
        );
    }
}
