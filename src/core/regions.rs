use super::chromosome::{ChromNaming, Chromosome};
use std::collections::BTreeMap;

/// Inclusive 1-based span on one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

/// Per-chromosome extent of the PGx reference positions, padded by a flank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgxRegions {
    spans: BTreeMap<Chromosome, Span>,
}

impl PgxRegions {
    /// Positions are 1-based. Starts are clamped at 1 after subtracting the flank.
    pub fn from_positions<I>(positions: I, flanking_bp: u64) -> Self
    where
        I: IntoIterator<Item = (Chromosome, u64)>,
    {
        let mut extents: BTreeMap<Chromosome, (u64, u64)> = BTreeMap::new();
        for (chrom, pos) in positions {
            extents
                .entry(chrom)
                .and_modify(|(min, max)| {
                    *min = (*min).min(pos);
                    *max = (*max).max(pos);
                })
                .or_insert((pos, pos));
        }

        let spans = extents
            .into_iter()
            .map(|(chrom, (min, max))| {
                let span = Span {
                    start: min.saturating_sub(flanking_bp).max(1),
                    end: max + flanking_bp,
                };
                (chrom, span)
            })
            .collect();
        PgxRegions { spans }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Chromosome, &Span)> {
        self.spans.iter()
    }

    /// Comma-separated `chrom:start-end` list as accepted by `bcftools -r`.
    pub fn to_region_string(&self, naming: ChromNaming) -> String {
        self.spans
            .iter()
            .map(|(chrom, span)| format!("{}:{}-{}", chrom.name(naming), span.start, span.end))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_REGION_FLANKING_BP;

    fn chr(n: u8) -> Chromosome {
        Chromosome::Autosome(n)
    }

    #[test]
    fn test_min_max_per_chromosome() {
        let regions = PgxRegions::from_positions(
            vec![
                (chr(10), 94_942_290),
                (chr(2), 233_760_233),
                (chr(10), 94_781_859),
                (chr(2), 233_760_498),
                (chr(10), 94_852_738),
            ],
            DEFAULT_REGION_FLANKING_BP,
        );
        let spans: Vec<_> = regions.iter().collect();
        assert_eq!(
            spans,
            vec![
                (
                    &chr(2),
                    &Span {
                        start: 233_760_133,
                        end: 233_760_598
                    }
                ),
                (
                    &chr(10),
                    &Span {
                        start: 94_781_759,
                        end: 94_942_390
                    }
                ),
            ]
        );
        assert_eq!(
            regions.to_region_string(ChromNaming::Bare),
            "2:233760133-233760598,10:94781759-94942390"
        );
        assert_eq!(
            regions.to_region_string(ChromNaming::Prefixed),
            "chr2:233760133-233760598,chr10:94781759-94942390"
        );
    }

    #[test]
    fn test_single_position_and_clamped_start() {
        let regions = PgxRegions::from_positions(vec![(Chromosome::M, 40)], 100);
        assert_eq!(
            regions.iter().next(),
            Some((&Chromosome::M, &Span { start: 1, end: 140 }))
        );
        assert_eq!(regions.to_region_string(ChromNaming::Prefixed), "chrM:1-140");
    }

    #[test]
    fn test_empty_positions() {
        let regions = PgxRegions::from_positions(Vec::new(), 100);
        assert!(regions.iter().next().is_none());
        assert_eq!(regions.to_region_string(ChromNaming::Bare), "");
    }
}
