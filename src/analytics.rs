// 📊 Price Analytics - grouping, statistics and rankings over the catalog
//
// Every aggregate here ignores records without a positive price. Callers are
// still expected to run `filter_priced` first so counts line up with what the
// views list.

use crate::catalog::FruitRecord;
use crate::category::{categorize, BotanicalCategory};
use crate::trend::{Season, SeasonalSample};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Shown when a search or filter leaves nothing to list
pub const NO_RESULTS: &str = "검색 조건에 맞는 과일이 없습니다.";

// ============================================================================
// PRICE STATS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1). `None` for a single price.
    pub std_dev: Option<f64>,
}

impl PriceStats {
    /// `None` for an empty slice
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }

        let count = prices.len();
        let mean = prices.iter().sum::<f64>() / count as f64;
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std_dev = if count > 1 {
            let variance =
                prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };

        Some(PriceStats {
            count,
            mean,
            min,
            max,
            std_dev,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

fn group_stats<K: Ord>(items: impl IntoIterator<Item = (K, f64)>) -> BTreeMap<K, PriceStats> {
    let mut grouped: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, price) in items {
        if price > 0.0 {
            grouped.entry(key).or_default().push(price);
        }
    }

    grouped
        .into_iter()
        .filter_map(|(key, prices)| PriceStats::from_prices(&prices).map(|s| (key, s)))
        .collect()
}

/// Stable ascending sort on price. Equal prices keep their input order.
fn sort_by_price(records: &mut [FruitRecord], descending: bool) {
    records.sort_by(|a, b| {
        let ord = price_of(a).total_cmp(&price_of(b));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn price_of(record: &FruitRecord) -> f64 {
    record.price().unwrap_or(0.0)
}

// ============================================================================
// FILTERING & CATEGORIZATION
// ============================================================================

/// Drop records with a missing or non-positive price. Idempotent.
pub fn filter_priced(records: &[FruitRecord]) -> Vec<FruitRecord> {
    records.iter().filter(|r| r.is_priced()).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedFruit {
    pub record: FruitRecord,
    pub category: BotanicalCategory,
}

pub fn categorize_all(records: &[FruitRecord]) -> Vec<CategorizedFruit> {
    records
        .iter()
        .map(|record| CategorizedFruit {
            category: categorize(&record.name),
            record: record.clone(),
        })
        .collect()
}

/// Categories present in the records, sorted by label
pub fn present_categories(records: &[FruitRecord]) -> Vec<BotanicalCategory> {
    let mut categories: Vec<BotanicalCategory> =
        records.iter().map(|r| categorize(&r.name)).collect();
    categories.sort_by_key(|c| c.label());
    categories.dedup();
    categories
}

// ============================================================================
// AGGREGATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: BotanicalCategory,
    pub stats: PriceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalCategoryStats {
    pub category: BotanicalCategory,
    pub season: Season,
    pub stats: PriceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FruitStats {
    pub name: String,
    pub stats: PriceStats,
}

/// Statistics per category, in category table order
pub fn aggregate_by_category(records: &[FruitRecord]) -> Vec<CategoryStats> {
    group_stats(
        records
            .iter()
            .filter_map(|r| r.price().map(|p| (categorize(&r.name), p))),
    )
    .into_iter()
    .map(|(category, stats)| CategoryStats { category, stats })
    .collect()
}

/// Category statistics ordered by mean price, most expensive first.
/// Equal means keep category table order.
pub fn category_overview(records: &[FruitRecord]) -> Vec<CategoryStats> {
    let mut overview = aggregate_by_category(records);
    overview.sort_by(|a, b| b.stats.mean.total_cmp(&a.stats.mean));
    overview
}

/// Statistics of simulated prices per (category, season)
pub fn aggregate_by_category_season(samples: &[SeasonalSample]) -> Vec<SeasonalCategoryStats> {
    group_stats(
        samples
            .iter()
            .map(|s| ((categorize(&s.name), s.season), s.simulated_price)),
    )
    .into_iter()
    .map(|((category, season), stats)| SeasonalCategoryStats {
        category,
        season,
        stats,
    })
    .collect()
}

/// Statistics per fruit name, most expensive first
pub fn fruit_stats(records: &[FruitRecord]) -> Vec<FruitStats> {
    let mut stats: Vec<FruitStats> = group_stats(
        records
            .iter()
            .filter_map(|r| r.price().map(|p| (r.name.clone(), p))),
    )
    .into_iter()
    .map(|(name, stats)| FruitStats { name, stats })
    .collect();

    stats.sort_by(|a, b| b.stats.mean.total_cmp(&a.stats.mean));
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub total_fruits: usize,
    pub category_count: usize,
    pub mean_price: f64,
    pub price_range: f64,
}

/// Headline numbers of the price view. `None` when nothing is priced.
pub fn market_summary(records: &[FruitRecord]) -> Option<MarketSummary> {
    let priced = filter_priced(records);
    let prices: Vec<f64> = priced.iter().map(price_of).collect();
    let stats = PriceStats::from_prices(&prices)?;

    Some(MarketSummary {
        total_fruits: stats.count,
        category_count: present_categories(&priced).len(),
        mean_price: stats.mean,
        price_range: stats.range(),
    })
}

// ============================================================================
// RANKINGS
// ============================================================================

/// The `k` cheapest priced records. Ties resolve by input order.
pub fn cheapest(records: &[FruitRecord], k: usize) -> Vec<FruitRecord> {
    let mut priced = filter_priced(records);
    sort_by_price(&mut priced, false);
    priced.truncate(k);
    priced
}

/// `k` cheapest per category, categories sorted by label
pub fn cheapest_per_category(
    records: &[FruitRecord],
    k: usize,
) -> Vec<(BotanicalCategory, Vec<FruitRecord>)> {
    let priced = filter_priced(records);
    present_categories(&priced)
        .into_iter()
        .map(|category| {
            let members: Vec<FruitRecord> = priced
                .iter()
                .filter(|r| categorize(&r.name) == category)
                .cloned()
                .collect();
            (category, cheapest(&members, k))
        })
        .collect()
}

/// Competition rank of a price among the priced records:
/// 1 + number of strictly cheaper records.
pub fn overall_rank(records: &[FruitRecord], price: f64) -> usize {
    1 + records
        .iter()
        .filter_map(|r| r.price())
        .filter(|p| *p < price)
        .count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFruit {
    pub rank: usize,
    pub total: usize,
    pub record: FruitRecord,
    pub delta_from_category: f64,
    pub delta_from_overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDetail {
    pub category: BotanicalCategory,
    pub stats: PriceStats,
    /// Cheapest first
    pub entries: Vec<RankedFruit>,
}

/// Drill-down for one category. `None` when it has no priced records.
pub fn category_detail(
    records: &[FruitRecord],
    category: BotanicalCategory,
) -> Option<CategoryDetail> {
    let priced = filter_priced(records);
    let overall = PriceStats::from_prices(&priced.iter().map(price_of).collect::<Vec<_>>())?;

    let mut members: Vec<FruitRecord> = priced
        .into_iter()
        .filter(|r| categorize(&r.name) == category)
        .collect();
    sort_by_price(&mut members, false);

    let stats = PriceStats::from_prices(&members.iter().map(price_of).collect::<Vec<_>>())?;
    let total = members.len();

    let entries = members
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let price = price_of(&record);
            RankedFruit {
                rank: i + 1,
                total,
                delta_from_category: price - stats.mean,
                delta_from_overall: price - overall.mean,
                record,
            }
        })
        .collect();

    Some(CategoryDetail {
        category,
        stats,
        entries,
    })
}

/// Per season, the `top` categories by mean simulated price, highest first
pub fn seasonal_category_ranking(
    samples: &[SeasonalSample],
    top: usize,
) -> Vec<(Season, Vec<(BotanicalCategory, f64)>)> {
    let stats = aggregate_by_category_season(samples);

    Season::ALL
        .iter()
        .map(|season| {
            let mut ranked: Vec<(BotanicalCategory, f64)> = stats
                .iter()
                .filter(|s| s.season == *season)
                .map(|s| (s.category, s.stats.mean))
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked.truncate(top);
            (*season, ranked)
        })
        .collect()
}

// ============================================================================
// SEARCH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    Name,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "최저가순",
            SortOrder::PriceDesc => "최고가순",
            SortOrder::Name => "이름순",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortOrder::PriceAsc => SortOrder::PriceDesc,
            SortOrder::PriceDesc => SortOrder::Name,
            SortOrder::Name => SortOrder::PriceAsc,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [SortOrder::PriceAsc, SortOrder::PriceDesc, SortOrder::Name]
            .into_iter()
            .find(|o| o.label() == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// `None` means every category
    pub category: Option<BotanicalCategory>,
    /// Exact fruit name; `None` means every fruit
    pub name: Option<String>,
    pub order: SortOrder,
}

/// A search hit placed against every priced record, not just the matches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub record: FruitRecord,
    pub category: BotanicalCategory,
    pub delta_from_overall: f64,
    pub rank: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub entries: Vec<SearchEntry>,
    pub stats: Option<PriceStats>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Filter priced records by category and name, then sort.
/// An empty result is a normal outcome, not an error.
pub fn search(records: &[FruitRecord], filter: &SearchFilter) -> SearchResult {
    let priced = filter_priced(records);
    let overall_mean = PriceStats::from_prices(&priced.iter().map(price_of).collect::<Vec<_>>())
        .map_or(0.0, |s| s.mean);

    let mut matched: Vec<FruitRecord> = priced
        .iter()
        .filter(|r| {
            filter
                .category
                .map_or(true, |category| categorize(&r.name) == category)
        })
        .filter(|r| filter.name.as_deref().map_or(true, |name| r.name == name))
        .cloned()
        .collect();

    match filter.order {
        SortOrder::PriceAsc => sort_by_price(&mut matched, false),
        SortOrder::PriceDesc => sort_by_price(&mut matched, true),
        SortOrder::Name => matched.sort_by(|a, b| match a.name.cmp(&b.name) {
            Ordering::Equal => a.kind.cmp(&b.kind),
            other => other,
        }),
    }

    let stats = PriceStats::from_prices(&matched.iter().map(price_of).collect::<Vec<_>>());

    let entries = categorize_all(&matched)
        .into_iter()
        .map(|CategorizedFruit { record, category }| {
            let price = price_of(&record);
            SearchEntry {
                category,
                delta_from_overall: price - overall_mean,
                rank: overall_rank(&priced, price),
                total: priced.len(),
                record,
            }
        })
        .collect();

    SearchResult { entries, stats }
}

// ============================================================================
// TESTS
// ============================================================================
