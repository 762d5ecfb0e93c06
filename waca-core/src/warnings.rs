use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// Compiler warning verbosity passed through as `--warnings <level>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WarningLevel {
    None,
    #[default]
    Default,
    More,
    All,
}

impl WarningLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Default => "default",
            Self::More => "more",
            Self::All => "all",
        }
    }
}

impl FromStr for WarningLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "default" => Ok(Self::Default),
            "more" => Ok(Self::More),
            "all" => Ok(Self::All),
            other => Err(ValidationError::InvalidWarningLevel { value: other.to_owned() }),
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
