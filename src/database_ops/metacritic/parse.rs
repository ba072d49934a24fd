//! Field extraction from listing, game and company pages.
//!
//! The site markup is stable enough that a handful of anchored regexes is
//! all that is needed; a field that cannot be found is reported as absent
//! rather than failing the page.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::database_ops::db::ReviewStats;

/// One entry of a platform listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedGame {
    pub name: String,
    /// ISO `YYYY-MM-DD`.
    pub launch_date: String,
    pub platform: String,
    pub meta_score: Option<f64>,
    pub user_score: Option<f64>,
    /// Site-relative link to the game's detail page.
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDetail {
    /// Developer name and site-relative company link, in page order.
    pub developers: Vec<(String, String)>,
    pub genres: Vec<String>,
    pub online_players: Option<i64>,
    pub rating: Option<String>,
    pub critic_reviews: Option<ReviewStats>,
    pub user_reviews: Option<ReviewStats>,
}

pub struct PageParser {
    anchor: Regex,
    href: Regex,
    tag: Regex,
    listing_date: Regex,
    listing_platform: Regex,
    meta_score: Regex,
    user_score: Regex,
    last_page: Regex,
    data_span: Regex,
    review_count: Regex,
    company_total: Regex,
}

const LISTING_ENTRY: &str = r#"<td class="clamp-summary-wrap""#;
const CRITIC_MODULE: &str = r#"class="module reviews_module critic_reviews_module""#;
const USER_MODULE: &str = r#"class="module reviews_module user_reviews_module""#;

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: Regex::new(r#"(?s)<a\s+([^>]*)>(.*?)</a>"#)?,
            href: Regex::new(r#"href="([^"]*)""#)?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            listing_date: Regex::new(r"<span>\s*([A-Za-z]+ \d{1,2}, \d{4})\s*</span>")?,
            listing_platform: Regex::new(
                r#"(?s)class="clamp-details".*?<span class="data">(.*?)</span>"#,
            )?,
            meta_score: Regex::new(r#"<div class="metascore_w large[^"]*">\s*([^<]*?)\s*</div>"#)?,
            user_score: Regex::new(
                r#"<div class="metascore_w user large[^"]*">\s*([^<]*?)\s*</div>"#,
            )?,
            last_page: Regex::new(
                r#"(?s)<li class="page last_page">.*?<a[^>]*>\s*(\d+)\s*</a>"#,
            )?,
            data_span: Regex::new(r#"(?s)<span class="data">(.*?)</span>"#)?,
            review_count: Regex::new(r#"(?s)<span class="count">(.*?)</span>"#)?,
            company_total: Regex::new(
                r#"(?s)<div class="reviews_total">.*?<span class="count">(.*?)</span>"#,
            )?,
        })
    }

    /// Games on one listing page, in page order. Entries without a title or
    /// a readable release date are skipped.
    pub fn parse_listing_page(&self, html: &str) -> Vec<ListedGame> {
        let starts: Vec<usize> = html.match_indices(LISTING_ENTRY).map(|(i, _)| i).collect();
        let mut games = Vec::with_capacity(starts.len());
        for (n, start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(html.len());
            let block = &html[*start..end];
            match self.parse_listing_entry(block) {
                Some(game) => games.push(game),
                None => warn!(entry = n, "skipping unreadable listing entry"),
            }
        }
        games
    }

    fn parse_listing_entry(&self, block: &str) -> Option<ListedGame> {
        let (attrs, title) = self
            .anchors(block)
            .into_iter()
            .find(|(attrs, _)| attrs.contains(r#"class="title""#))?;
        let href = self.href.captures(&attrs)?.get(1)?.as_str().to_string();
        let name = self.clean_text(&title);

        let raw_date = self.listing_date.captures(block)?.get(1)?.as_str();
        let launch_date = iso_date(raw_date)?;

        let platform = self
            .listing_platform
            .captures(block)
            .map(|c| self.clean_text(&c[1]))
            .unwrap_or_default();
        let meta_score = self
            .meta_score
            .captures(block)
            .and_then(|c| c[1].parse::<i64>().ok())
            .map(|s| s as f64);
        let user_score = self
            .user_score
            .captures(block)
            .and_then(|c| c[1].parse::<f64>().ok());

        Some(ListedGame {
            name,
            launch_date,
            platform,
            meta_score,
            user_score,
            href,
        })
    }

    /// Number of listing pages; 1 when the pager is absent.
    pub fn parse_last_page(&self, html: &str) -> u32 {
        self.last_page
            .captures(html)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(1)
    }

    pub fn parse_game_detail(&self, html: &str) -> GameDetail {
        let developers: Vec<(String, String)> = summary_item(html, "developer")
            .map(|section| {
                self.anchors(section)
                    .into_iter()
                    .filter(|(attrs, _)| attrs.contains(r#"class="button""#))
                    .filter_map(|(attrs, text)| {
                        let href = self.href.captures(&attrs)?.get(1)?.as_str().to_string();
                        Some((self.clean_text(&text), href))
                    })
                    .filter(|(name, _)| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let genres: Vec<String> = summary_item(html, "product_genre")
            .map(|section| {
                self.data_span
                    .captures_iter(section)
                    .map(|c| self.clean_text(&c[1]))
                    .filter(|g| !g.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let online_players = self
            .summary_value(html, "product_players")
            .and_then(|players| parse_online_players(&players));
        let rating = self.summary_value(html, "product_rating");

        GameDetail {
            developers,
            genres,
            online_players,
            rating,
            critic_reviews: self.review_stats(html, CRITIC_MODULE),
            user_reviews: self.review_stats(html, USER_MODULE),
        }
    }

    /// Review activity count on a company page, thousands separators removed.
    pub fn parse_company_review_total(&self, html: &str) -> Option<i64> {
        let raw = self.company_total.captures(html)?;
        parse_count(&self.clean_text(&raw[1]))
    }

    fn summary_value(&self, html: &str, class: &str) -> Option<String> {
        let section = summary_item(html, class)?;
        let value = self.clean_text(&self.data_span.captures(section)?[1]);
        (!value.is_empty()).then_some(value)
    }

    /// Total plus positive share from a review module's count spans. Absent
    /// unless every count parses and they sum to a positive total.
    fn review_stats(&self, html: &str, module_marker: &str) -> Option<ReviewStats> {
        let start = html.find(module_marker)?;
        let rest = &html[start + module_marker.len()..];
        let module = match rest.find(r#"class="module "#) {
            Some(end) => &rest[..end],
            None => rest,
        };
        let counts = self
            .review_count
            .captures_iter(module)
            .map(|c| parse_count(&self.clean_text(&c[1])))
            .collect::<Option<Vec<i64>>>()?;
        ReviewStats::from_counts(&counts)
    }

    fn anchors(&self, html: &str) -> Vec<(String, String)> {
        self.anchor
            .captures_iter(html)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect()
    }

    /// Strip tags, decode the common entities and collapse whitespace.
    pub fn clean_text(&self, html: &str) -> String {
        let text = self.tag.replace_all(html, " ");
        let text = text
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&#039;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Inner markup of `<li class="summary_detail {class}">`.
fn summary_item<'a>(html: &'a str, class: &str) -> Option<&'a str> {
    let marker = format!(r#"<li class="summary_detail {class}""#);
    let start = html.find(&marker)? + marker.len();
    let rest = &html[start..];
    let end = rest.find("</li>").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// `Month D, YYYY` to `YYYY-MM-DD`.
pub fn iso_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%B %d, %Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// `No Online Multiplayer` is zero; otherwise the trailing number of
/// phrases like `Up to 4` or `64`.
pub fn parse_online_players(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("No Online Multiplayer") {
        return Some(0);
    }
    raw.split_whitespace().last()?.parse().ok()
}

fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().replace(',', "").parse().ok()
}
