//! Predicate fragments derived from individual validated options.

use crate::normalization::Platform;

use super::options::{DateRange, Mode, ReportOptions, SortKey};
use super::predicate::{CmpOp, Column, Predicate};

/// Which review total the minimum-review-count threshold is checked against.
///
/// The threshold follows the score being ranked: sorting by user score
/// filters on the user-review total, every other sort key filters on the
/// critic-review total. Both totals exist on every row; only one is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewField {
    Critic,
    User,
}

impl ReviewField {
    pub fn for_sort(sort_by: SortKey) -> Self {
        match sort_by {
            SortKey::User => ReviewField::User,
            SortKey::Meta | SortKey::Count => ReviewField::Critic,
        }
    }

    pub fn column(self) -> Column {
        match self {
            ReviewField::Critic => Column::CriticTotal,
            ReviewField::User => Column::UserTotal,
        }
    }
}

pub fn platform_filter(platform: Option<Platform>) -> Option<Predicate> {
    platform.map(|p| Predicate::equals(Column::Platform, p.label()))
}

pub fn date_filter(range: Option<&DateRange>) -> Option<Predicate> {
    range.map(|r| match r {
        DateRange::Since(since) => {
            Predicate::compare(Column::LaunchDate, CmpOp::Ge, since.as_str())
        }
        DateRange::Between { from, to } => {
            Predicate::range(Column::LaunchDate, from.as_str(), to.as_str())
        }
    })
}

pub fn mode_filter(mode: Option<Mode>) -> Option<Predicate> {
    mode.map(|m| match m {
        Mode::Online => Predicate::compare(Column::NumOfPlayers, CmpOp::Gt, 0_i64),
        Mode::Offline => Predicate::equals(Column::NumOfPlayers, 0_i64),
    })
}

pub fn rating_filter(opts: &ReportOptions) -> Option<Predicate> {
    if opts.ratings.is_empty() {
        return None;
    }
    Some(Predicate::Any(
        opts.ratings
            .iter()
            .map(|r| Predicate::equals(Column::Ratings, r.as_str()))
            .collect(),
    ))
}

pub fn review_filter(opts: &ReportOptions) -> Predicate {
    let column = ReviewField::for_sort(opts.sort_by).column();
    Predicate::compare(column, CmpOp::Ge, opts.record)
}

/// Row-level filters shared by every view: platform, date, mode, rating.
pub fn row_filters(opts: &ReportOptions) -> Vec<Predicate> {
    [
        platform_filter(opts.platform),
        date_filter(opts.launch_date.as_ref()),
        mode_filter(opts.mode),
        rating_filter(opts),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Filter for the games view and the monthly series: row-level filters plus
/// the review-count threshold, which is always present.
pub fn game_predicate(opts: &ReportOptions) -> Predicate {
    let mut parts = row_filters(opts);
    parts.push(review_filter(opts));
    Predicate::All(parts)
}

/// Filter applied before company aggregation; the review-count threshold is
/// applied to the aggregated game count instead.
pub fn company_game_predicate(opts: &ReportOptions) -> Predicate {
    Predicate::All(row_filters(opts))
}
