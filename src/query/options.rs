//! Raw report options and their validation into a normalized option set.
//!
//! Validation is a pure function: it never touches the store and never
//! records state between calls, so re-validating the same input always yields
//! the same result.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::normalization::{ContentRating, Platform};

use super::error::{OptionError, OptionName};

/// Entity shape a report is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Games,
    Companies,
}

/// Option values exactly as a front end received them. Numbers stay text
/// until [`validate`] reaches them, so a malformed count never jumps the
/// check order.
#[derive(Debug, Clone, PartialEq, Args, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    /// Platform of games: none|ps4|ps5|switch|xboxone|xbox-series-x
    #[arg(short = 'p', long, default_value = "none")]
    pub platform: String,

    /// Launch date filter (yyyy-mm-dd); one date means "on or after", two an inclusive range
    #[arg(short = 'd', long = "launchdate", num_args = 1..)]
    pub launch_date: Option<Vec<String>>,

    /// Mode of the game: none|online|offline
    #[arg(short = 'm', long, default_value = "none")]
    pub mode: String,

    /// Content ratings to keep, any of E|E10+|T|M
    #[arg(short = 'r', long, num_args = 1..)]
    pub ratings: Option<Vec<String>>,

    /// Minimum number of reviews (games) or of games (companies)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub record: String,

    /// Sort key: meta|user, plus count for companies
    #[arg(short = 's', long = "sortby", default_value = "meta")]
    pub sort_by: String,

    /// top (descending) or bottom (ascending)
    #[arg(short = 'o', long, default_value = "top")]
    pub order: String,

    /// Number of results to show
    #[arg(short = 'l', long, default_value = "10", allow_negative_numbers = true)]
    pub limit: String,

    /// Draw a bar chart of the result
    #[arg(long)]
    pub bar: bool,

    /// Draw a line chart of game counts per month; overrides sort options
    #[arg(long = "linechart")]
    pub line_chart: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            platform: "none".to_string(),
            launch_date: None,
            mode: "none".to_string(),
            ratings: None,
            record: "0".to_string(),
            sort_by: "meta".to_string(),
            order: "top".to_string(),
            limit: "10".to_string(),
            bar: false,
            line_chart: false,
        }
    }
}

/// Launch-date window; dates are zero-padded ISO strings compared lexically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DateRange {
    Since(String),
    Between { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// At least one online player.
    Online,
    /// Exactly zero online players.
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortKey {
    Meta,
    User,
    /// Companies view only.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Order {
    Top,
    Bottom,
}

impl Order {
    pub fn sql(self) -> &'static str {
        match self {
            Order::Top => "DESC",
            Order::Bottom => "ASC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChartMode {
    #[default]
    None,
    Bar,
    Line,
}

/// Fully validated option set handed to the query composers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOptions {
    pub view: View,
    pub platform: Option<Platform>,
    pub launch_date: Option<DateRange>,
    pub mode: Option<Mode>,
    pub ratings: Vec<ContentRating>,
    /// Minimum review count (games) or game count (companies); never negative.
    pub record: i64,
    pub sort_by: SortKey,
    pub order: Order,
    /// Always positive.
    pub limit: i64,
    pub chart: ChartMode,
}

/// Validate every option in a fixed order, stopping at the first failure:
/// platform, date, mode, rating, sort key, review count, order, limit.
pub fn validate(view: View, raw: &RawOptions) -> Result<ReportOptions, OptionError> {
    let platform = parse_platform(&raw.platform)?;
    let launch_date = parse_launch_date(raw.launch_date.as_deref())?;
    let mode = parse_mode(&raw.mode)?;
    let ratings = parse_ratings(raw.ratings.as_deref())?;
    let sort_by = parse_sort_key(view, &raw.sort_by)?;

    let record = parse_count(OptionName::Record, &raw.record, 0)?;

    let order = match raw.order.as_str() {
        "top" => Order::Top,
        "bottom" => Order::Bottom,
        other => return Err(OptionError::new(OptionName::Order, other)),
    };

    let limit = parse_count(OptionName::Limit, &raw.limit, 1)?;

    let chart = if raw.line_chart {
        ChartMode::Line
    } else if raw.bar {
        ChartMode::Bar
    } else {
        ChartMode::None
    };

    Ok(ReportOptions {
        view,
        platform,
        launch_date,
        mode,
        ratings,
        record,
        sort_by,
        order,
        limit,
        chart,
    })
}

fn parse_platform(raw: &str) -> Result<Option<Platform>, OptionError> {
    if raw == "none" {
        return Ok(None);
    }
    Platform::from_code(raw)
        .map(Some)
        .ok_or_else(|| OptionError::new(OptionName::Platform, raw))
}

fn parse_launch_date(raw: Option<&[String]>) -> Result<Option<DateRange>, OptionError> {
    let Some(dates) = raw else {
        return Ok(None);
    };
    let invalid = || OptionError::new(OptionName::LaunchDate, dates.join(" "));
    if !dates.iter().all(|d| is_iso_date(d)) {
        return Err(invalid());
    }
    match dates {
        [since] => Ok(Some(DateRange::Since(since.clone()))),
        [from, to] => Ok(Some(DateRange::Between {
            from: from.clone(),
            to: to.clone(),
        })),
        _ => Err(invalid()),
    }
}

/// Lexical `YYYY-MM-DD` check; no calendar validation.
fn is_iso_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_mode(raw: &str) -> Result<Option<Mode>, OptionError> {
    match raw {
        "none" => Ok(None),
        "online" => Ok(Some(Mode::Online)),
        "offline" => Ok(Some(Mode::Offline)),
        other => Err(OptionError::new(OptionName::Mode, other)),
    }
}

fn parse_ratings(raw: Option<&[String]>) -> Result<Vec<ContentRating>, OptionError> {
    let Some(values) = raw else {
        return Ok(Vec::new());
    };
    let invalid = || OptionError::new(OptionName::Ratings, values.join(" "));
    if values.is_empty() {
        return Err(invalid());
    }
    let mut ratings = Vec::with_capacity(values.len());
    for value in values {
        let rating = ContentRating::parse(value).ok_or_else(invalid)?;
        if !ratings.contains(&rating) {
            ratings.push(rating);
        }
    }
    Ok(ratings)
}

/// Integer no smaller than `min`; the error carries the text as given.
fn parse_count(option: OptionName, raw: &str, min: i64) -> Result<i64, OptionError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= min)
        .ok_or_else(|| OptionError::new(option, raw))
}

fn parse_sort_key(view: View, raw: &str) -> Result<SortKey, OptionError> {
    match (view, raw) {
        (_, "none" | "meta") => Ok(SortKey::Meta),
        (_, "user") => Ok(SortKey::User),
        (View::Companies, "count") => Ok(SortKey::Count),
        (_, other) => Err(OptionError::new(OptionName::SortBy, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawOptions {
        RawOptions::default()
    }

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn defaults_validate_to_unfiltered_top_ten() {
        let opts = validate(View::Games, &raw()).unwrap();
        assert_eq!(opts.platform, None);
        assert_eq!(opts.launch_date, None);
        assert_eq!(opts.mode, None);
        assert!(opts.ratings.is_empty());
        assert_eq!(opts.sort_by, SortKey::Meta);
        assert_eq!(opts.order, Order::Top);
        assert_eq!(opts.limit, 10);
        assert_eq!(opts.chart, ChartMode::None);
    }

    #[test]
    fn platform_codes_map_to_enum() {
        let opts = validate(
            View::Games,
            &RawOptions {
                platform: "xbox-series-x".into(),
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(opts.platform, Some(Platform::XboxSeriesX));
    }

    #[test]
    fn invalid_platform_is_reported_first() {
        let input = RawOptions {
            platform: "dreamcast".into(),
            mode: "lan".into(),
            limit: "0".into(),
            ..raw()
        };
        let err = validate(View::Companies, &input).unwrap_err();
        assert_eq!(err.option, OptionName::Platform);
        assert_eq!(err.value, "dreamcast");
        assert_eq!(err.to_string(), "invalid arguments for: -p dreamcast");
    }

    #[test]
    fn date_counts_other_than_one_or_two_are_rejected() {
        let single = validate(
            View::Games,
            &RawOptions {
                launch_date: strings(&["2020-01-01"]),
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(
            single.launch_date,
            Some(DateRange::Since("2020-01-01".into()))
        );

        let pair = validate(
            View::Games,
            &RawOptions {
                launch_date: strings(&["2020-01-01", "2020-12-31"]),
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(
            pair.launch_date,
            Some(DateRange::Between {
                from: "2020-01-01".into(),
                to: "2020-12-31".into()
            })
        );

        for bad in [
            strings(&[]),
            strings(&["2020-01-01", "2020-06-01", "2020-12-31"]),
            strings(&["2020/01/01"]),
            strings(&["20-01-01"]),
        ] {
            let err = validate(
                View::Games,
                &RawOptions {
                    launch_date: bad,
                    ..raw()
                },
            )
            .unwrap_err();
            assert_eq!(err.option, OptionName::LaunchDate);
        }
    }

    #[test]
    fn mode_accepts_only_known_values() {
        let online = validate(
            View::Games,
            &RawOptions {
                mode: "online".into(),
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(online.mode, Some(Mode::Online));

        let err = validate(
            View::Games,
            &RawOptions {
                mode: "coop".into(),
                ..raw()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid arguments for: -m coop");
    }

    #[test]
    fn ratings_reject_unknown_codes_and_collapse_duplicates() {
        let opts = validate(
            View::Games,
            &RawOptions {
                ratings: strings(&["T", "E10+", "T"]),
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(opts.ratings, vec![ContentRating::T, ContentRating::E10Plus]);

        let err = validate(
            View::Games,
            &RawOptions {
                ratings: strings(&["E", "AO"]),
                ..raw()
            },
        )
        .unwrap_err();
        assert_eq!(err.option, OptionName::Ratings);
        assert_eq!(err.value, "E AO");
    }

    #[test]
    fn count_sort_is_a_companies_only_key() {
        let count = RawOptions {
            sort_by: "count".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Companies, &count).unwrap().sort_by,
            SortKey::Count
        );
        let err = validate(View::Games, &count).unwrap_err();
        assert_eq!(err.option, OptionName::SortBy);

        let none = RawOptions {
            sort_by: "none".into(),
            ..raw()
        };
        assert_eq!(validate(View::Games, &none).unwrap().sort_by, SortKey::Meta);
    }

    #[test]
    fn sort_key_is_checked_before_review_count() {
        let input = RawOptions {
            sort_by: "price".into(),
            record: "-1".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Games, &input).unwrap_err().option,
            OptionName::SortBy
        );
    }

    #[test]
    fn negative_record_and_non_positive_limit_are_rejected() {
        let err = validate(
            View::Games,
            &RawOptions {
                record: "-3".into(),
                ..raw()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid arguments for: --record -3");

        for limit in ["0", "-5", "ten", ""] {
            let err = validate(
                View::Companies,
                &RawOptions {
                    limit: limit.into(),
                    ..raw()
                },
            )
            .unwrap_err();
            assert_eq!(err.option, OptionName::Limit);
            assert_eq!(err.value, limit);
        }

        let err = validate(
            View::Games,
            &RawOptions {
                record: "many".into(),
                ..raw()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid arguments for: --record many");
    }

    #[test]
    fn order_outside_top_bottom_is_rejected_identically_each_time() {
        let input = RawOptions {
            order: "sideways".into(),
            ..raw()
        };
        let first = validate(View::Games, &input).unwrap_err();
        let second = validate(View::Games, &input).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.option, OptionName::Order);
    }

    #[test]
    fn date_is_checked_before_mode() {
        let input = RawOptions {
            launch_date: strings(&["yesterday"]),
            mode: "coop".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Games, &input).unwrap_err().option,
            OptionName::LaunchDate
        );
    }

    #[test]
    fn mode_is_checked_before_ratings() {
        let input = RawOptions {
            mode: "coop".into(),
            ratings: strings(&["AO"]),
            ..raw()
        };
        assert_eq!(
            validate(View::Games, &input).unwrap_err().option,
            OptionName::Mode
        );
    }

    #[test]
    fn ratings_are_checked_before_sort_key() {
        let input = RawOptions {
            ratings: strings(&["AO"]),
            sort_by: "price".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Games, &input).unwrap_err().option,
            OptionName::Ratings
        );
    }

    #[test]
    fn review_count_is_checked_before_order() {
        let input = RawOptions {
            record: "x".into(),
            order: "sideways".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Games, &input).unwrap_err().option,
            OptionName::Record
        );
    }

    #[test]
    fn order_is_checked_before_limit() {
        let input = RawOptions {
            order: "sideways".into(),
            limit: "abc".into(),
            ..raw()
        };
        assert_eq!(
            validate(View::Companies, &input).unwrap_err().option,
            OptionName::Order
        );
    }

    #[test]
    fn line_chart_wins_over_bar() {
        let opts = validate(
            View::Games,
            &RawOptions {
                bar: true,
                line_chart: true,
                ..raw()
            },
        )
        .unwrap();
        assert_eq!(opts.chart, ChartMode::Line);
    }

    #[test]
    fn deserializes_partial_input_with_defaults() {
        let parsed: RawOptions =
            serde_json::from_str(r#"{"platform":"ps5","limit":"3"}"#).unwrap();
        assert_eq!(parsed.platform, "ps5");
        assert_eq!(parsed.limit, "3");
        assert_eq!(parsed.record, "0");
        assert_eq!(parsed.order, "top");
        assert_eq!(parsed.sort_by, "meta");
    }
}
