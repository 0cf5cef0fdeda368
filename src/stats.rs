//! Length distribution statistics: record count, total length and the
//! N01/N10/N50/N90/N99 thresholds.
//!
//! `Nxx` is the length of the record at which the running sum of lengths, taken
//! from the longest record down, first reaches `xx` percent of the total length.
//! Targets use integer (floor) division, so `N50` of a total of 101 bases is
//! reached at 50 bases.

use crate::errors::ParseError;
use crate::parser::FastxReader;

/// The percentile points reported for every file, in scan order
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Percentile {
    N01,
    N10,
    N50,
    N90,
    N99,
}

impl Percentile {
    pub const ALL: [Percentile; 5] = [
        Percentile::N01,
        Percentile::N10,
        Percentile::N50,
        Percentile::N90,
        Percentile::N99,
    ];

    /// The percentage of the total length this point covers
    pub fn percent(&self) -> u64 {
        match self {
            Self::N01 => 1,
            Self::N10 => 10,
            Self::N50 => 50,
            Self::N90 => 90,
            Self::N99 => 99,
        }
    }

    /// Cumulative length at which this percentile is resolved
    #[inline]
    pub fn target(&self, total: u64) -> u64 {
        total * self.percent() / 100
    }

    /// Column name in the report header
    pub fn column(&self) -> &'static str {
        match self {
            Self::N01 => "n01_length",
            Self::N10 => "n10_length",
            Self::N50 => "n50_length",
            Self::N90 => "n90_length",
            Self::N99 => "n99_length",
        }
    }
}

/// Length thresholds of a file. All zero when the file had no records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub n01: usize,
    pub n10: usize,
    pub n50: usize,
    pub n90: usize,
    pub n99: usize,
}

impl Thresholds {
    pub fn get(&self, percentile: Percentile) -> usize {
        match percentile {
            Percentile::N01 => self.n01,
            Percentile::N10 => self.n10,
            Percentile::N50 => self.n50,
            Percentile::N90 => self.n90,
            Percentile::N99 => self.n99,
        }
    }

    fn set(&mut self, percentile: Percentile, len: usize) {
        match percentile {
            Percentile::N01 => self.n01 = len,
            Percentile::N10 => self.n10 = len,
            Percentile::N50 => self.n50 = len,
            Percentile::N90 => self.n90 = len,
            Percentile::N99 => self.n99 = len,
        }
    }
}

/// Record lengths of one file, in the order they were read, plus their sum
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthStats {
    lengths: Vec<usize>,
    total: u64,
}

impl LengthStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every record of `reader` and keeps its number of bases.
    /// Stops at the first I/O or decompression error.
    pub fn from_reader(reader: &mut dyn FastxReader) -> Result<Self, ParseError> {
        let mut stats = Self::new();
        while let Some(record) = reader.next() {
            stats.push(record?.num_bases());
        }
        Ok(stats)
    }

    #[inline]
    pub fn push(&mut self, len: usize) {
        self.lengths.push(len);
        self.total += len as u64;
    }

    /// Number of records
    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    /// Sum of all record lengths
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Sorts the lengths (longest first) and scans them once to resolve every
    /// percentile.
    pub fn thresholds(mut self) -> Thresholds {
        self.lengths.sort_unstable_by(|a, b| b.cmp(a));

        let targets = Percentile::ALL.map(|p| (p, p.target(self.total)));
        let mut resolved = [false; 5];
        let mut thresholds = Thresholds::default();

        let mut len_so_far = 0u64;
        for &len in &self.lengths {
            len_so_far += len as u64;
            for (i, (percentile, target)) in targets.iter().enumerate() {
                if !resolved[i] && len_so_far >= *target {
                    thresholds.set(*percentile, len);
                    resolved[i] = true;
                }
            }
            if resolved.iter().all(|r| *r) {
                break;
            }
        }
        thresholds
    }
}

impl Extend<usize> for LengthStats {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for len in iter {
            self.push(len);
        }
    }
}

impl FromIterator<usize> for LengthStats {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds_of(lengths: &[usize]) -> Thresholds {
        lengths.iter().copied().collect::<LengthStats>().thresholds()
    }

    #[test]
    fn test_known_distribution() {
        for lengths in [[10usize, 20, 30, 40], [40, 30, 20, 10], [30, 10, 40, 20]] {
            let stats: LengthStats = lengths.iter().copied().collect();
            assert_eq!(stats.count(), 4);
            assert_eq!(stats.total(), 100);
            assert_eq!(
                stats.thresholds(),
                Thresholds {
                    n01: 40,
                    n10: 40,
                    n50: 30,
                    n90: 20,
                    n99: 10,
                }
            );
        }
    }

    #[test]
    fn test_empty() {
        let stats = LengthStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.thresholds(), Thresholds::default());
    }

    #[test]
    fn test_single_record() {
        let t = thresholds_of(&[150]);
        for p in Percentile::ALL {
            assert_eq!(t.get(p), 150);
        }
    }

    #[test]
    fn test_only_empty_records() {
        // every target is 0 and is reached by the first record
        let stats: LengthStats = [0usize, 0, 0].into_iter().collect();
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.thresholds(), Thresholds::default());
    }

    #[test]
    fn test_floor_division_of_targets() {
        assert_eq!(Percentile::N01.target(199), 1);
        assert_eq!(Percentile::N10.target(199), 19);
        assert_eq!(Percentile::N50.target(101), 50);
        assert_eq!(Percentile::N90.target(99), 89);
        assert_eq!(Percentile::N99.target(99), 98);

        // total 101 -> target_50 = 50, reached exactly by the first record
        let t = thresholds_of(&[50, 1, 50]);
        assert_eq!(t.n50, 50);
        // target_99 = 99 is reached by the second record
        assert_eq!(t.n99, 50);
    }

    #[test]
    fn test_several_percentiles_resolve_together() {
        // total 103, target_90 = 92, target_99 = 101
        let t = thresholds_of(&[100, 1, 1, 1]);
        assert_eq!(t.n01, 100);
        assert_eq!(t.n10, 100);
        assert_eq!(t.n50, 100);
        assert_eq!(t.n90, 100);
        assert_eq!(t.n99, 1);
    }

    #[test]
    fn test_thresholds_are_monotonic_members() {
        let lengths: Vec<usize> = (1..=500).map(|i| (i * 7919) % 1013 + 1).collect();
        let t = thresholds_of(&lengths);
        assert!(t.n01 >= t.n10);
        assert!(t.n10 >= t.n50);
        assert!(t.n50 >= t.n90);
        assert!(t.n90 >= t.n99);
        for p in Percentile::ALL {
            assert!(lengths.contains(&t.get(p)));
        }
    }

    #[test]
    fn test_total_does_not_overflow() {
        let big = u32::MAX as usize;
        let stats: LengthStats = std::iter::repeat(big).take(1000).collect();
        assert_eq!(stats.total(), 1000 * u32::MAX as u64);
        assert_eq!(stats.thresholds().n50, big);
    }

    #[test]
    fn test_from_reader() {
        let mut reader =
            crate::parse_fastx_reader(&b">a\nACGT\n>b\nAC\nGT\nA\n>c\n"[..]).unwrap();
        let stats = LengthStats::from_reader(&mut *reader).unwrap();
        assert_eq!(stats.lengths(), &[4, 5, 0]);
        assert_eq!(stats.total(), 9);
    }
}
