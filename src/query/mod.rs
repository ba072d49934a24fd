pub mod compose;
pub mod error;
pub mod filters;
pub mod options;
pub mod predicate;
pub mod rows;

pub use compose::{build_report, run_report, Report};
pub use error::{OptionError, OptionName, QueryError};
pub use options::{validate, ChartMode, RawOptions, ReportOptions, SortKey, View};
pub use rows::{CompanyRow, GameRow, MonthlyCount};
