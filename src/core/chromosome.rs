use crate::error::PgxError;
use std::fmt;

const CHR_PREFIX: &str = "chr";

/// How a VCF spells its contig names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromNaming {
    /// `chr1`, `chrX`, ...
    Prefixed,
    /// `1`, `X`, ...
    Bare,
}

impl ChromNaming {
    pub fn of(contig: &str) -> Self {
        if contig.starts_with(CHR_PREFIX) {
            ChromNaming::Prefixed
        } else {
            ChromNaming::Bare
        }
    }
}

/// Human chromosome, ordered autosomes first (numerically), then X, Y and the mitochondrion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chromosome {
    Autosome(u8),
    X,
    Y,
    M,
}

impl Chromosome {
    pub fn parse(contig: &str) -> Result<Self, PgxError> {
        let unrecognized = || PgxError::UnrecognizedChromosome {
            contig: contig.to_string(),
        };
        let name = contig.strip_prefix(CHR_PREFIX).unwrap_or(contig);
        match name {
            "X" => Ok(Chromosome::X),
            "Y" => Ok(Chromosome::Y),
            "M" | "MT" => Ok(Chromosome::M),
            _ => {
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(unrecognized());
                }
                match name.parse::<u8>() {
                    Ok(n) if (1..=22).contains(&n) => Ok(Chromosome::Autosome(n)),
                    _ => Err(unrecognized()),
                }
            }
        }
    }

    /// Bare spelling: `1`, `X`, `MT`.
    pub fn bare(&self) -> String {
        match self {
            Chromosome::Autosome(n) => n.to_string(),
            Chromosome::X => "X".to_string(),
            Chromosome::Y => "Y".to_string(),
            Chromosome::M => "MT".to_string(),
        }
    }

    /// Prefixed spelling: `chr1`, `chrX`, `chrM`.
    pub fn with_prefix(&self) -> String {
        match self {
            Chromosome::M => format!("{CHR_PREFIX}M"),
            other => format!("{CHR_PREFIX}{}", other.bare()),
        }
    }

    pub fn name(&self, naming: ChromNaming) -> String {
        match naming {
            ChromNaming::Prefixed => self.with_prefix(),
            ChromNaming::Bare => self.bare(),
        }
    }

    pub fn all() -> impl Iterator<Item = Chromosome> {
        (1..=22)
            .map(Chromosome::Autosome)
            .chain([Chromosome::X, Chromosome::Y, Chromosome::M])
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bare())
    }
}

/// Contents of a `bcftools annotate --rename-chrs` map from bare to prefixed names.
///
/// Bare-named inputs spell the mitochondrion either `MT` or `M`; both map to `chrM`.
pub fn rename_map() -> String {
    let mut map: String = Chromosome::all()
        .map(|chrom| format!("{}\t{}\n", chrom.bare(), chrom.with_prefix()))
        .collect();
    map.push_str(&format!("M\t{}\n", Chromosome::M.with_prefix()));
    map
}
