use crate::model::RoadmapItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Todo,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Done,
    Delayed,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status: {0} (expected todo, in-progress, done or delayed)")]
pub struct UnknownStatus(pub String);

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Delayed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
            Status::Delayed => "Delayed",
        }
    }

    /// Todo -> In Progress -> Done -> Delayed -> Todo.
    pub fn next(self) -> Status {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::Delayed,
            Status::Delayed => Status::Todo,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Status::Todo),
            "inprogress" | "doing" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            "delayed" | "late" => Ok(Status::Delayed),
            _ => Err(UnknownStatus(s.trim().to_string())),
        }
    }
}

/// True when `end_date` lies strictly before `today`. Both are whole days.
pub fn is_overdue(end_date: NaiveDate, today: NaiveDate) -> bool {
    end_date < today
}

/// Status to display. Done always wins; otherwise an overdue item shows as
/// Delayed whatever was stored.
pub fn effective_status(stored: Status, end_date: NaiveDate, today: NaiveDate) -> Status {
    if stored == Status::Done {
        return Status::Done;
    }
    if is_overdue(end_date, today) {
        Status::Delayed
    } else {
        stored
    }
}

pub fn item_effective_status(item: &RoadmapItem, today: NaiveDate) -> Status {
    effective_status(item.status, item.end_date, today)
}

/// Next stored status for an explicit cycle action, starting from what the
/// user currently sees rather than the raw stored value.
pub fn cycle_status(stored: Status, end_date: NaiveDate, today: NaiveDate) -> Status {
    effective_status(stored, end_date, today).next()
}

/// Load-time sweep for a single item: the rewritten item when its stored
/// status must become Delayed, `None` when nothing changes.
///
/// Uses the same predicate as [`effective_status`], so after a sweep the
/// displayed status is unchanged.
pub fn swept(item: &RoadmapItem, today: NaiveDate) -> Option<RoadmapItem> {
    if item.status == Status::Done || item.status == Status::Delayed {
        return None;
    }
    if !is_overdue(item.end_date, today) {
        return None;
    }
    Some(RoadmapItem {
        status: Status::Delayed,
        ..item.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn done_is_terminal_even_when_long_overdue() {
        let today = ymd(2030, 1, 1);
        assert_eq!(
            effective_status(Status::Done, ymd(2001, 1, 1), today),
            Status::Done
        );
    }

    #[test]
    fn overdue_items_display_as_delayed() {
        let today = ymd(2026, 3, 10);
        for stored in [Status::Todo, Status::InProgress, Status::Delayed] {
            assert_eq!(
                effective_status(stored, ymd(2026, 3, 9), today),
                Status::Delayed
            );
        }
    }

    #[test]
    fn due_today_is_not_overdue() {
        let today = ymd(2026, 3, 10);
        assert_eq!(
            effective_status(Status::InProgress, today, today),
            Status::InProgress
        );
        assert_eq!(
            effective_status(Status::Todo, ymd(2026, 4, 1), today),
            Status::Todo
        );
    }

    #[test]
    fn cycling_follows_the_fixed_order() {
        assert_eq!(Status::Todo.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Done);
        assert_eq!(Status::Done.next(), Status::Delayed);
        assert_eq!(Status::Delayed.next(), Status::Todo);
    }

    #[test]
    fn cycling_starts_from_the_displayed_status() {
        let today = ymd(2026, 3, 10);
        // stored Todo but displayed Delayed, so the next step is Todo again
        assert_eq!(
            cycle_status(Status::Todo, ymd(2026, 3, 1), today),
            Status::Todo
        );
        assert_eq!(
            cycle_status(Status::Todo, ymd(2026, 3, 20), today),
            Status::InProgress
        );
    }

    #[test]
    fn parses_status_names() {
        assert_eq!("In Progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("in-progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("DONE".parse::<Status>(), Ok(Status::Done));
        assert!("blocked".parse::<Status>().is_err());
    }
}
