use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use crate::error::ExtractError;

pub const DEFAULT_ROW_PROXIMITY: f64 = 5.0;
pub const DEFAULT_NOISE_FLOOR: f64 = 2.0;
pub const DEFAULT_GAP_MULTIPLIER: f64 = 3.0;
pub const DEFAULT_GAP_FLOOR: f64 = 20.0;
pub const DEFAULT_EMPTY_MEDIAN: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// Picks a format from a file extension, if it is one we write.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        extension.parse().ok()
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{other}', expected csv, tsv or json"
            )),
        }
    }
}

/// Tunable constants of the row/cell reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionParams {
    /// Max vertical distance (exclusive) between a fragment and a row.
    pub row_proximity: f64,
    /// Gaps at or below this are kerning, not word or cell breaks.
    pub noise_floor: f64,
    pub gap_multiplier: f64,
    /// Lower bound of the per-page cell threshold.
    pub gap_floor: f64,
    /// Median used when a page has no measurable gaps.
    pub empty_median: f64,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            row_proximity: DEFAULT_ROW_PROXIMITY,
            noise_floor: DEFAULT_NOISE_FLOOR,
            gap_multiplier: DEFAULT_GAP_MULTIPLIER,
            gap_floor: DEFAULT_GAP_FLOOR,
            empty_median: DEFAULT_EMPTY_MEDIAN,
        }
    }
}

impl ReconstructionParams {
    pub fn validate(&self) -> Result<(), ExtractError> {
        let checks = [
            ("row_proximity", self.row_proximity, false),
            ("noise_floor", self.noise_floor, true),
            ("gap_multiplier", self.gap_multiplier, false),
            ("gap_floor", self.gap_floor, true),
            ("empty_median", self.empty_median, true),
        ];

        for (name, value, zero_allowed) in checks {
            if !value.is_finite() {
                return Err(ExtractError::InvalidOption(format!(
                    "{name} must be a finite number"
                )));
            }
            if value < 0.0 || (!zero_allowed && value == 0.0) {
                let bound = if zero_allowed { ">= 0" } else { "> 0" };
                return Err(ExtractError::InvalidOption(format!(
                    "{name} must be {bound}, got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub format: OutputFormat,
    pub delimiter: u8,
    pub header: bool,
    pub include_page: bool,
    pub pad_rows: bool,
    pub params: ReconstructionParams,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            format: OutputFormat::Csv,
            delimiter: b',',
            header: false,
            include_page: false,
            pad_rows: true,
            params: ReconstructionParams::default(),
        }
    }
}
