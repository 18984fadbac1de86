//! Rank banding
//!
//! Maps a signed reputation value onto a reputation's rank list. Positive
//! values consume non-negative ranks from the front; negative values consume
//! non-positive ranks from the back. The remainder inside the landing rank is
//! the gauge numerator and that rank's threshold is the denominator.

use super::definition::ReputationRank;

/// Where a value lands in a rank list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub index: usize,
    pub numerator: i64,
    pub denominator: i64,
}

pub fn band(ranks: &[ReputationRank], value: i64, max_rep: i64) -> Band {
    let (Some(first), Some(last)) = (ranks.first(), ranks.last()) else {
        return Band {
            index: 0,
            numerator: value.max(0),
            denominator: max_rep,
        };
    };

    if value >= 0 {
        let mut remaining = value;
        for (index, rank) in ranks.iter().enumerate() {
            if rank.threshold < 0 {
                continue;
            }
            if rank.threshold > remaining {
                return Band {
                    index,
                    numerator: remaining,
                    denominator: rank.threshold,
                };
            }
            remaining -= rank.threshold;
        }
        return Band {
            index: ranks.len() - 1,
            numerator: last.threshold,
            denominator: last.threshold,
        };
    }

    let mut remaining = value.saturating_abs();
    for (index, rank) in ranks.iter().enumerate().rev() {
        if rank.threshold > 0 {
            continue;
        }
        let size = rank.threshold.saturating_abs();
        if size > remaining {
            return Band {
                index,
                numerator: -remaining,
                denominator: rank.threshold,
            };
        }
        remaining -= size;
    }
    Band {
        index: 0,
        numerator: first.threshold,
        denominator: first.threshold,
    }
}

pub fn rank_index(ranks: &[ReputationRank], value: i64) -> usize {
    band(ranks, value, 0).index
}

/// Id of the rank the value lands in, `None` without ranks
pub fn rank_id(ranks: &[ReputationRank], value: i64) -> Option<&str> {
    ranks.get(rank_index(ranks, value)).map(|r| r.id.as_str())
}

pub fn numerator(ranks: &[ReputationRank], value: i64) -> i64 {
    band(ranks, value, 0).numerator
}

pub fn denominator(ranks: &[ReputationRank], value: i64, max_rep: i64) -> i64 {
    band(ranks, value, max_rep).denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(table: &[(&str, i64)]) -> Vec<ReputationRank> {
        table.iter()
            .map(|(id, threshold)| ReputationRank {
                id: id.to_string(),
                name: id.to_string(),
                threshold: *threshold,
                icon: 0,
                color: 0,
                gauge_colors: (20, 21),
            })
            .collect()
    }

    #[test]
    fn test_boundary_belongs_to_next_rank() {
        let ranks = ranks(&[("bronze", 100), ("silver", 200)]);
        assert_eq!(rank_id(&ranks, 99), Some("bronze"));
        assert_eq!(rank_id(&ranks, 100), Some("silver"));
        assert_eq!(numerator(&ranks, 100), 0);
        assert_eq!(denominator(&ranks, 100, 0), 200);
        assert_eq!(numerator(&ranks, 99), 99);
    }

    #[test]
    fn test_positive_walk_exhausted() {
        let ranks = ranks(&[("bronze", 100), ("silver", 200)]);
        let band = band(&ranks, 5000, 0);
        assert_eq!(band, Band { index: 1, numerator: 200, denominator: 200 });
    }

    #[test]
    fn test_negative_bands_walk_from_the_back() {
        let ranks = ranks(&[("hated", -200), ("disliked", -50), ("neutral", 100), ("liked", 300)]);

        assert_eq!(rank_id(&ranks, 0), Some("neutral"));
        assert_eq!(rank_id(&ranks, 150), Some("liked"));
        assert_eq!(rank_id(&ranks, -10), Some("disliked"));
        assert_eq!(band(&ranks, -10, 0), Band { index: 1, numerator: -10, denominator: -50 });

        assert_eq!(rank_id(&ranks, -50), Some("hated"));
        assert_eq!(band(&ranks, -60, 0), Band { index: 0, numerator: -10, denominator: -200 });

        assert_eq!(band(&ranks, -1000, 0), Band { index: 0, numerator: -200, denominator: -200 });
    }

    #[test]
    fn test_no_ranks_uses_max_rep() {
        assert_eq!(band(&[], 40, 250), Band { index: 0, numerator: 40, denominator: 250 });
        assert_eq!(band(&[], -40, 250), Band { index: 0, numerator: 0, denominator: 250 });
        assert_eq!(rank_id(&[], 40), None);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let ranks = ranks(&[("hated", -200), ("neutral", 100)]);
        assert_eq!(rank_index(&ranks, i64::MIN), 0);
        assert_eq!(rank_index(&ranks, i64::MAX), 1);
    }
}
