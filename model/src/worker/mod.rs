use std::fmt;
use std::fmt::{Display, Formatter};

/// Largest `TotalSegments` value DynamoDB accepts for a parallel scan.
pub const MAX_SCAN_SEGMENTS: i64 = 1_000_000;

/// Compute tier of the export workers.
///
/// Only the two memory-optimized tiers have a dedicated split ratio, every other
/// tier name is carried as-is and uses the default ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerType {
    G2X,
    G1X,
    Other(String),
}

/// Split ratio of a tier: `multiplier * (workers - 1) + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRatio {
    pub multiplier: i64,
    pub offset: i64,
}

/// Lookup table of the tiers with a dedicated ratio.
const SPLIT_RATIOS: [(&str, SplitRatio); 2] = [
    (
        "G.2X",
        SplitRatio {
            multiplier: 16,
            offset: 0,
        },
    ),
    (
        "G.1X",
        SplitRatio {
            multiplier: 8,
            offset: 0,
        },
    ),
];

/// Ratio for any other tier. Each worker but the driver runs two executors, one of
/// them is reserved, and every executor gets four splits:
/// `4 * ((workers - 1) * 2 - 1)`.
pub const DEFAULT_SPLIT_RATIO: SplitRatio = SplitRatio {
    multiplier: 8,
    offset: -4,
};

impl WorkerType {
    pub fn parse(tier: &str) -> Self {
        match tier {
            "G.2X" => WorkerType::G2X,
            "G.1X" => WorkerType::G1X,
            other => WorkerType::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WorkerType::G2X => "G.2X",
            WorkerType::G1X => "G.1X",
            WorkerType::Other(tier) => tier,
        }
    }

    /// Ratio for this tier, `None` when the tier falls back to the default.
    pub fn dedicated_ratio(&self) -> Option<SplitRatio> {
        SPLIT_RATIOS
            .iter()
            .find(|(tier, _)| *tier == self.as_str())
            .map(|(_, ratio)| *ratio)
    }

    pub fn split_ratio(&self) -> SplitRatio {
        self.dedicated_ratio().unwrap_or(DEFAULT_SPLIT_RATIO)
    }

    /// Parallelism hint for the table scan given the number of workers of the job.
    ///
    /// `None` when the worker count is so large (or so negative) that the hint
    /// does not fit in an `i64`.
    pub fn split_hint(&self, workers: i64) -> Option<SplitHint> {
        let ratio = self.split_ratio();
        workers
            .checked_sub(1)?
            .checked_mul(ratio.multiplier)?
            .checked_add(ratio.offset)
            .map(SplitHint)
    }
}

impl Display for WorkerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw split hint. It can be zero or negative for degenerate worker counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitHint(pub i64);

impl SplitHint {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The hint clamped into the segment range a parallel scan accepts.
    pub fn scan_segments(&self) -> i64 {
        self.0.clamp(1, MAX_SCAN_SEGMENTS)
    }
}

impl Display for SplitHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
