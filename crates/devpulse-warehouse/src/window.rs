use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entity kinds stored by the warehouse. Each kind owns four parallel
/// partition tables, one per [`WindowTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Issue,
    Question,
    Answer,
}

impl EntityKind {
    pub const fn base_table(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::Question => "questions",
            Self::Answer => "answers",
        }
    }
}

/// Lookback window selecting both the upstream time filter and the
/// destination partition table.
///
/// The all-time pass and the rolling-window passes walk the same upstream
/// data independently, so the same record may land in several partitions.
/// That duplication is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowTag {
    All,
    TwoDays,
    SevenDays,
    FortyFiveDays,
}

impl WindowTag {
    pub const ALL: [Self; 4] = [Self::All, Self::TwoDays, Self::SevenDays, Self::FortyFiveDays];

    /// Number of days of lookback, or `None` for the all-time pass.
    pub const fn lookback_days(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::TwoDays => Some(2),
            Self::SevenDays => Some(7),
            Self::FortyFiveDays => Some(45),
        }
    }

    /// Label used on metrics and log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::TwoDays => "2_days",
            Self::SevenDays => "7_days",
            Self::FortyFiveDays => "45_days",
        }
    }

    const fn table_prefix(self) -> &'static str {
        match self {
            Self::All => "",
            Self::TwoDays => "twodays_",
            Self::SevenDays => "sevendays_",
            Self::FortyFiveDays => "fortyfivedays_",
        }
    }

    /// Partition table bound to this window for the given entity kind.
    pub const fn table(self, kind: EntityKind) -> &'static str {
        match (self, kind) {
            (Self::All, EntityKind::Issue) => "issues",
            (Self::All, EntityKind::Question) => "questions",
            (Self::All, EntityKind::Answer) => "answers",
            (Self::TwoDays, EntityKind::Issue) => "twodays_issues",
            (Self::TwoDays, EntityKind::Question) => "twodays_questions",
            (Self::TwoDays, EntityKind::Answer) => "twodays_answers",
            (Self::SevenDays, EntityKind::Issue) => "sevendays_issues",
            (Self::SevenDays, EntityKind::Question) => "sevendays_questions",
            (Self::SevenDays, EntityKind::Answer) => "sevendays_answers",
            (Self::FortyFiveDays, EntityKind::Issue) => "fortyfivedays_issues",
            (Self::FortyFiveDays, EntityKind::Question) => "fortyfivedays_questions",
            (Self::FortyFiveDays, EntityKind::Answer) => "fortyfivedays_answers",
        }
    }
}

impl Display for WindowTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindowTag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "2_days" | "2d" => Ok(Self::TwoDays),
            "7_days" | "7d" => Ok(Self::SevenDays),
            "45_days" | "45d" => Ok(Self::FortyFiveDays),
            other => Err(format!("unknown window tag '{other}'")),
        }
    }
}
