use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First day of week 0. A Monday.
pub const WEEK_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2026, 2, 23) {
    Some(date) => date,
    None => panic!("invalid week epoch"),
};

/// Month 0 is February 2026 (months are zero-based here).
pub const MONTH_EPOCH_YEAR: i32 = 2026;
pub const MONTH_EPOCH_MONTH0: u32 = 1;

/// Quarter 0 is Q1 2026, which opens in January.
pub const QUARTER_EPOCH_YEAR: i32 = 2026;
pub const QUARTER_EPOCH_QUARTER: u32 = 0;
pub const FIRST_QUARTER_MONTH0: u32 = 0;

const WEEK_VISIBLE: usize = 16;
const MONTH_CYCLE: i64 = 12;
const QUARTER_CYCLE: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Week,
    Month,
    Quarter,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown view mode: {0} (expected week, month or quarter)")]
pub struct UnknownViewMode(pub String);

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Week, ViewMode::Month, ViewMode::Quarter];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Week => "week",
            ViewMode::Month => "month",
            ViewMode::Quarter => "quarter",
        }
    }

    /// Number of grid rows shown for this mode.
    pub fn visible_periods(&self) -> usize {
        match self {
            ViewMode::Week => WEEK_VISIBLE,
            ViewMode::Month => MONTH_CYCLE as usize,
            ViewMode::Quarter => QUARTER_CYCLE as usize,
        }
    }

    /// Wrap length of the index. Week mode never wraps.
    ///
    /// Month indices wrap in both directions, so index 12 is February 2026
    /// again. Quarter indices wrap only in [`date_to_index`]: index 8 from
    /// [`index_to_date`] is Q1 2028, which maps back to 0.
    pub fn cycle_length(&self) -> Option<u32> {
        match self {
            ViewMode::Week => None,
            ViewMode::Month => Some(MONTH_CYCLE as u32),
            ViewMode::Quarter => Some(QUARTER_CYCLE as u32),
        }
    }

    /// First date that maps onto the grid. Anything earlier clamps to index 0.
    pub fn epoch(&self) -> NaiveDate {
        match self {
            ViewMode::Week => WEEK_EPOCH,
            ViewMode::Month => first_of_month(MONTH_EPOCH_YEAR as i64, MONTH_EPOCH_MONTH0 as i64),
            ViewMode::Quarter => first_of_month(
                QUARTER_EPOCH_YEAR as i64,
                (QUARTER_EPOCH_QUARTER * 3 + FIRST_QUARTER_MONTH0) as i64,
            ),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "w" => Ok(ViewMode::Week),
            "month" | "m" => Ok(ViewMode::Month),
            "quarter" | "q" => Ok(ViewMode::Quarter),
            other => Err(UnknownViewMode(other.to_string())),
        }
    }
}

/// Start date of the period at `index`.
///
/// Week indices may be fractional; only the whole-day part of `index * 7` is
/// used (floored, never rounded). Month indices wrap modulo 12 before the
/// date is built. Quarter indices are taken as-is, the wrap lives in
/// [`date_to_index`].
pub fn index_to_date(index: f64, mode: ViewMode) -> NaiveDate {
    match mode {
        ViewMode::Week => {
            let days = (index * 7.0).floor() as i64;
            add_days(WEEK_EPOCH, days)
        }
        ViewMode::Month => {
            let wrapped = (index.floor() as i64).rem_euclid(MONTH_CYCLE);
            let total = MONTH_EPOCH_MONTH0 as i64 + wrapped;
            first_of_month(
                MONTH_EPOCH_YEAR as i64 + total.div_euclid(12),
                total.rem_euclid(12),
            )
        }
        ViewMode::Quarter => {
            let total_quarters = QUARTER_EPOCH_QUARTER as i64 + index.floor() as i64;
            let year = QUARTER_EPOCH_YEAR as i64 + total_quarters.div_euclid(4);
            let quarter_in_year = total_quarters.rem_euclid(4);
            first_of_month(year, quarter_in_year * 3 + FIRST_QUARTER_MONTH0 as i64)
        }
    }
}

/// Grid index of `date`, never negative.
///
/// Week mode keeps the day remainder as the fractional part and does not
/// wrap. Month and quarter modes wrap onto their period table.
pub fn date_to_index(date: NaiveDate, mode: ViewMode) -> f64 {
    if date < mode.epoch() {
        return 0.0;
    }
    match mode {
        ViewMode::Week => {
            let days = (date - WEEK_EPOCH).num_days();
            days as f64 / 7.0
        }
        ViewMode::Month => {
            let months = (date.year() as i64 - MONTH_EPOCH_YEAR as i64) * 12
                + (date.month0() as i64 - MONTH_EPOCH_MONTH0 as i64);
            months.rem_euclid(MONTH_CYCLE) as f64
        }
        ViewMode::Quarter => {
            let quarters = (date.year() as i64 - QUARTER_EPOCH_YEAR as i64) * 4
                + (quarter_of_month0(date.month0()) as i64 - QUARTER_EPOCH_QUARTER as i64);
            quarters.rem_euclid(QUARTER_CYCLE) as f64
        }
    }
}

pub fn quarter_of_month0(month0: u32) -> u32 {
    month0 / 3
}

/// Axis label for a period, e.g. `23 FEB`, `Feb`, `Q1 26`.
pub fn period_label(index: usize, mode: ViewMode) -> String {
    let date = index_to_date(index as f64, mode);
    match mode {
        ViewMode::Week => date.format("%d %b").to_string().to_uppercase(),
        ViewMode::Month => date.format("%b").to_string(),
        ViewMode::Quarter => format!(
            "Q{} {:02}",
            quarter_of_month0(date.month0()) + 1,
            date.year().rem_euclid(100)
        ),
    }
}

pub fn period_labels(mode: ViewMode) -> Vec<String> {
    (0..mode.visible_periods())
        .map(|idx| period_label(idx, mode))
        .collect()
}

// Saturates at chrono's representable range.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

fn first_of_month(year: i64, month0: i64) -> NaiveDate {
    let year = year.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}
