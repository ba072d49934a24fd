use thiserror::Error;

/// The option a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionName {
    Platform,
    LaunchDate,
    Mode,
    Ratings,
    SortBy,
    Record,
    Order,
    Limit,
}

impl OptionName {
    /// Command-line spelling, used in error messages.
    pub fn flag(self) -> &'static str {
        match self {
            OptionName::Platform => "-p",
            OptionName::LaunchDate => "-d",
            OptionName::Mode => "-m",
            OptionName::Ratings => "-r",
            OptionName::SortBy => "-s",
            OptionName::Record => "--record",
            OptionName::Order => "-o",
            OptionName::Limit => "-l",
        }
    }
}

/// First invalid option found while validating a raw option set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid arguments for: {} {}", .option.flag(), .value)]
pub struct OptionError {
    pub option: OptionName,
    pub value: String,
}

impl OptionError {
    pub fn new(option: OptionName, value: impl Into<String>) -> Self {
        Self {
            option,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidOption(#[from] OptionError),
    #[error("query execution failed: {0}")]
    Execution(#[from] sqlx::Error),
}
