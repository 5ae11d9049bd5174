use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical upstream identifiers used in metrics labels and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Github,
    StackExchange,
}

impl SourceId {
    pub const ALL: [Self; 2] = [Self::Github, Self::StackExchange];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::StackExchange => "stackexchange",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "github" => Ok(Self::Github),
            "stackexchange" => Ok(Self::StackExchange),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}
