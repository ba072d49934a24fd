use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{info, instrument, warn};

use crate::database_ops::db::{CompanyRecord, Db, GameRecord, WriteSummary};
use crate::normalization::Platform;

use super::cache::PageCache;
use super::parse::{GameDetail, ListedGame, PageParser};
use super::provider::MetacriticClient;

#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub platform: Platform,
    pub pages: u32,
    pub games: usize,
    pub new_companies: usize,
    pub written: WriteSummary,
}

fn to_record(listed: ListedGame, detail: GameDetail) -> GameRecord {
    GameRecord {
        name: listed.name,
        launch_date: listed.launch_date,
        platform: listed.platform,
        meta_score: listed.meta_score,
        user_score: listed.user_score,
        developers: detail.developers.into_iter().map(|(name, _)| name).collect(),
        online_players: detail.online_players,
        rating: detail.rating,
        critic_reviews: detail.critic_reviews,
        user_reviews: detail.user_reviews,
        genres: detail.genres,
    }
}

/// Everything fetched for one platform, ready to write.
struct Crawl {
    pages: u32,
    games: Vec<GameRecord>,
    companies: Vec<CompanyRecord>,
}

/// Crawl every listing page and game page for `platform`, then the page of
/// each developer not yet stored, and write the batch in one transaction.
///
/// The cache is flushed once the crawl ends, whether or not it succeeded,
/// and before anything is written.
#[instrument(skip(db, client, cache))]
pub async fn scrape_platform<C: PageCache + ?Sized>(
    db: &Db,
    client: &MetacriticClient,
    cache: &mut C,
    platform: Platform,
) -> Result<ScrapeSummary> {
    let parser = PageParser::new()?;
    let crawled = crawl(db, client, cache, &parser, platform).await;

    let flushed = cache.flush();
    let Crawl {
        pages,
        games,
        companies,
    } = crawled?;
    flushed?;

    db.create_tables().await?;
    let written = db.write_records(&companies, &games).await?;

    Ok(ScrapeSummary {
        platform,
        pages,
        games: games.len(),
        new_companies: companies.len(),
        written,
    })
}

async fn crawl<C: PageCache + ?Sized>(
    db: &Db,
    client: &MetacriticClient,
    cache: &mut C,
    parser: &PageParser,
    platform: Platform,
) -> Result<Crawl> {
    let listing = client.listing_url(platform)?;

    let first = client.fetch(&listing, cache).await?;
    let pages = parser.parse_last_page(&first);
    info!(pages, "fetching listing pages");

    let mut listed = Vec::new();
    for page in 0..pages {
        let url = format!("{listing}?page={page}");
        let body = client.fetch(&url, cache).await?;
        listed.extend(parser.parse_listing_page(&body));
    }
    info!(games = listed.len(), "fetching game pages");

    let mut developers: IndexMap<String, String> = IndexMap::new();
    let mut games = Vec::with_capacity(listed.len());
    let total = listed.len();
    for (n, game) in listed.into_iter().enumerate() {
        let url = client.absolute(&game.href)?;
        let body = client
            .fetch(&url, cache)
            .await
            .with_context(|| format!("game page for {:?}", game.name))?;
        let detail = parser.parse_game_detail(&body);
        for (name, href) in &detail.developers {
            if !developers.contains_key(name) {
                developers.insert(name.clone(), client.absolute(href)?);
            }
        }
        games.push(to_record(game, detail));
        if (n + 1) % 100 == 0 {
            info!(done = n + 1, total, "game pages");
        }
    }

    let existing = db.existing_companies().await?;
    let new_companies: Vec<(String, String)> = developers
        .into_iter()
        .filter(|(name, _)| !existing.contains_key(name))
        .collect();
    info!(
        known = existing.len(),
        new = new_companies.len(),
        "fetching company pages"
    );

    // A company whose page cannot be fetched is still stored, without a total.
    let mut companies = Vec::with_capacity(new_companies.len());
    for (name, url) in new_companies {
        let review_total = match client.fetch(&url, cache).await {
            Ok(body) => parser.parse_company_review_total(&body),
            Err(e) => {
                warn!(company = %name, url = %url, error = %e, "company page unavailable");
                None
            }
        };
        companies.push(CompanyRecord {
            review_total,
            name,
            url,
        });
    }

    Ok(Crawl {
        pages,
        games,
        companies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::metacritic::cache::{JsonFileCache, MemoryCache};
    use std::time::Duration;

    const BASE: &str = "https://mc.test";
    /// Nothing listens here; any uncached fetch fails straight away.
    const UNREACHABLE: &str = "http://127.0.0.1:1";

    fn listing_entry(slug: &str, name: &str, date: &str, meta: u32) -> String {
        format!(
            r#"<td class="clamp-summary-wrap">
  <a href="/game/switch/{slug}" class="title"><h3>{name}</h3></a>
  <div class="clamp-details"><div class="platform"><span class="data">Switch</span></div><span>{date}</span></div>
  <div class="metascore_w large game positive">{meta}</div>
  <div class="metascore_w user large game positive">8.0</div>
</td>"#
        )
    }

    fn detail(devs: &[&str]) -> String {
        let links: Vec<String> = devs
            .iter()
            .map(|d| format!(r#"<a href="/company/{}" class="button">{d}</a>"#, d.to_lowercase()))
            .collect();
        format!(
            r#"<li class="summary_detail developer"><span class="data">{}</span></li>
<li class="summary_detail product_players"><span class="data">No Online Multiplayer</span></li>
<div class="module reviews_module critic_reviews_module"><span class="count">9</span><span class="count">1</span></div>
<div class="module reviews_module user_reviews_module"><span class="count">3</span><span class="count">1</span></div>"#,
            links.join(", ")
        )
    }

    fn seeded_cache() -> MemoryCache {
        let listing = format!("{BASE}/browse/games/release-date/available/switch/metascore");
        let mut cache = MemoryCache::new();
        let pager = r#"<li class="page last_page"><a href="?page=1">2</a></li>"#;
        cache.put(&listing, pager.to_string());
        cache.put(
            &format!("{listing}?page=0"),
            listing_entry("alpha", "Alpha", "March 1, 2021", 90),
        );
        cache.put(
            &format!("{listing}?page=1"),
            listing_entry("beta", "Beta", "April 2, 2021", 70),
        );
        cache.put(&format!("{BASE}/game/switch/alpha"), detail(&["Acme", "Bolt"]));
        cache.put(&format!("{BASE}/game/switch/beta"), detail(&["Acme"]));
        cache.put(
            &format!("{BASE}/company/bolt"),
            r#"<div class="reviews_total"><span class="count">1,024</span></div>"#.to_string(),
        );
        cache
    }

    #[tokio::test]
    async fn scrape_writes_games_and_only_new_companies() {
        let db = Db::connect_memory().await.unwrap();
        db.create_tables().await.unwrap();
        db.write_records(
            &[CompanyRecord {
                name: "Acme".into(),
                url: format!("{BASE}/company/acme"),
                review_total: Some(5),
            }],
            &[],
        )
        .await
        .unwrap();

        let client = MetacriticClient::new(BASE, Duration::ZERO, None).unwrap();
        let mut cache = seeded_cache();
        let summary = scrape_platform(&db, &client, &mut cache, Platform::Switch)
            .await
            .unwrap();

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.games, 2);
        assert_eq!(summary.new_companies, 1);
        assert_eq!(summary.written.links, 3);

        let companies = db.existing_companies().await.unwrap();
        assert_eq!(companies.len(), 2);
        assert!(companies["Bolt"] > companies["Acme"]);

        let total: Option<i64> =
            sqlx::query_scalar("SELECT TotalGames FROM Companies WHERE CompanyName = 'Bolt'")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(total, Some(1024));

        let (date, players, critic_total, user_positive): (String, i64, i64, f64) = sqlx::query_as(
            "SELECT LaunchDate, NumOfPlayers, CriticTotal, UserPositive FROM Games WHERE GameName = 'Alpha'",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(date, "2021-03-01");
        assert_eq!(players, 0);
        assert_eq!(critic_total, 10);
        assert_eq!(user_positive, 0.75);
    }

    fn seed_listing(cache: &mut impl PageCache, base: &str) {
        let listing = format!("{base}/browse/games/release-date/available/switch/metascore");
        cache.put(&listing, String::new());
        cache.put(
            &format!("{listing}?page=0"),
            format!(
                "{}{}",
                listing_entry("alpha", "Alpha", "March 1, 2021", 90),
                listing_entry("beta", "Beta", "April 2, 2021", 70)
            ),
        );
    }

    #[tokio::test]
    async fn unreachable_company_page_is_stored_without_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache_switch.json");
        let mut cache = JsonFileCache::load(&path);
        seed_listing(&mut cache, UNREACHABLE);
        cache.put(&format!("{UNREACHABLE}/game/switch/alpha"), detail(&["Gone"]));
        cache.put(&format!("{UNREACHABLE}/game/switch/beta"), detail(&["Gone"]));

        let db = Db::connect_memory().await.unwrap();
        let client = MetacriticClient::new(UNREACHABLE, Duration::ZERO, Some(5)).unwrap();
        let summary = scrape_platform(&db, &client, &mut cache, Platform::Switch)
            .await
            .unwrap();

        assert_eq!(summary.games, 2);
        assert_eq!(summary.new_companies, 1);
        assert_eq!(summary.written.links, 2);
        let total: Option<i64> =
            sqlx::query_scalar("SELECT TotalGames FROM Companies WHERE CompanyName = 'Gone'")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(total, None);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn failed_crawl_still_saves_fetched_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache_switch.json");
        let mut cache = JsonFileCache::load(&path);
        seed_listing(&mut cache, UNREACHABLE);
        cache.put(&format!("{UNREACHABLE}/game/switch/alpha"), detail(&["Acme"]));

        let db = Db::connect_memory().await.unwrap();
        let client = MetacriticClient::new(UNREACHABLE, Duration::ZERO, Some(5)).unwrap();
        let err = scrape_platform(&db, &client, &mut cache, Platform::Switch)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("game page for \"Beta\""));

        let reloaded = JsonFileCache::load(&path);
        assert_eq!(reloaded.len(), 3);
        assert!(db.existing_companies().await.unwrap().is_empty());
    }
}
