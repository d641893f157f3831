// Fruit Dashboard - JSON API Server
// Read-only REST API with Axum; every request opens the catalog itself

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use fruit_dashboard::{
    analytics::{self, SearchFilter, SortOrder},
    categorize,
    config::{self, AppConfig},
    recommend::{recommend_by_labels, Profile, EATING_TIPS},
    BotanicalCategory, Catalog, CategoryDetail, CategoryStats, DashboardError, FruitDetail,
    FruitRecord, ImageAsset, ImageResolver, MarketSummary, NutritionInfo, NutritionTable,
    SeasonalCategoryStats, TrendSimulator, NO_RESULTS,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Shared application state. Holds paths and static tables only; no
/// connection is shared between requests.
#[derive(Clone)]
struct AppState {
    catalog: Catalog,
    nutrition: Arc<NutritionTable>,
    images: ImageResolver,
    trend_seed: Option<u64>,
    display_limit: usize,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(message.into()),
        }
    }
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

/// Missing store is 503, anything else 500. The payload is still present,
/// just empty.
fn load_failure<T: Serialize>(context: &str, e: DashboardError, empty: T) -> Response {
    let status = if e.is_empty_state() {
        warn!(error = %e, "{}: catalog unavailable", context);
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        error!(error = %e, "{}", context);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiResponse::err(empty, e.to_string()))).into_response()
}

fn not_found(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::err(Option::<()>::None, message)),
    )
        .into_response()
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Serialize)]
struct FruitResponse {
    name: String,
    kind: String,
    unit_price: Option<f64>,
    price_display: String,
    category: &'static str,
}

impl From<FruitRecord> for FruitResponse {
    fn from(record: FruitRecord) -> Self {
        Self {
            category: categorize(&record.name).label(),
            price_display: record.price_display(),
            unit_price: record.price(),
            name: record.name,
            kind: record.kind,
        }
    }
}

#[derive(Serialize)]
struct FruitDetailResponse {
    category: &'static str,
    image: Option<String>,
    #[serde(flatten)]
    detail: FruitDetail,
}

#[derive(Serialize)]
struct CategoryOverviewResponse {
    summary: Option<MarketSummary>,
    categories: Vec<CategoryResponse>,
}

#[derive(Serialize)]
struct CategoryResponse {
    label: &'static str,
    description: &'static str,
    #[serde(flatten)]
    stats: CategoryStats,
}

#[derive(Serialize)]
struct TrendResponse {
    seed: Option<u64>,
    by_category_season: Vec<SeasonalCategoryStats>,
    top_by_season: Vec<SeasonRanking>,
}

#[derive(Serialize)]
struct SeasonRanking {
    season: &'static str,
    categories: Vec<RankedCategory>,
}

#[derive(Serialize)]
struct RankedCategory {
    label: &'static str,
    mean_price: f64,
}

#[derive(Serialize)]
struct CheapestResponse {
    by_category: Vec<CategoryCheapest>,
    overall: Vec<RankedFruitResponse>,
}

#[derive(Serialize)]
struct CategoryCheapest {
    label: &'static str,
    fruits: Vec<FruitResponse>,
}

#[derive(Serialize)]
struct RankedFruitResponse {
    rank: usize,
    #[serde(flatten)]
    fruit: FruitResponse,
}

#[derive(Serialize)]
struct PriceHitResponse {
    #[serde(flatten)]
    fruit: FruitResponse,
    delta_from_overall: f64,
    rank: usize,
    total: usize,
}

#[derive(Serialize)]
struct PriceSearchResponse {
    message: Option<&'static str>,
    stats: Option<analytics::PriceStats>,
    fruits: Vec<PriceHitResponse>,
}

#[derive(Serialize)]
struct RecommendationResponse {
    goal: &'static str,
    age: &'static str,
    condition: &'static str,
    fruits: Vec<RecommendedFruit>,
    all_fruits: Vec<&'static str>,
    reasons: Vec<ReasonResponse>,
    tips: Vec<&'static str>,
}

#[derive(Serialize)]
struct RecommendedFruit {
    name: &'static str,
    image: ImageAsset,
}

#[derive(Serialize)]
struct ReasonResponse {
    key: &'static str,
    #[serde(flatten)]
    profile: Profile,
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct TrendQuery {
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct PriceQuery {
    category: Option<String>,
    name: Option<String>,
    sort: Option<String>,
}

#[derive(Deserialize)]
struct RecommendQuery {
    #[serde(default)]
    goal: String,
    #[serde(default)]
    age: String,
    #[serde(default)]
    condition: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.catalog.exists() { "OK" } else { "NO_CATALOG" };
    Json(ApiResponse::ok(status))
}

/// GET /api/fruits - Every catalog row
async fn get_fruits(State(state): State<AppState>) -> Response {
    match state.catalog.all_fruits() {
        Ok(fruits) => ok(fruits.into_iter().map(FruitResponse::from).collect::<Vec<_>>()),
        Err(e) => load_failure("listing fruits", e, Vec::<FruitResponse>::new()),
    }
}

/// GET /api/fruits/:name - One fruit with its varieties and nutrition
async fn get_fruit(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let varieties = match state.catalog.fruits_by_name(&name) {
        Ok(varieties) => varieties,
        Err(e) => return load_failure("loading fruit", e, Option::<()>::None),
    };

    match FruitDetail::build(&name, varieties, &state.nutrition) {
        Some(detail) => ok(FruitDetailResponse {
            category: categorize(&name).label(),
            image: state.images.resolve(&name, None).file_name(),
            detail,
        }),
        None => not_found(format!("no fruit named {}", name)),
    }
}

/// GET /api/search?q= - Name substring search
async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    match state.catalog.search(query.q.trim()) {
        Ok(fruits) => ok(fruits.into_iter().map(FruitResponse::from).collect::<Vec<_>>()),
        Err(e) => load_failure("searching fruits", e, Vec::<FruitResponse>::new()),
    }
}

/// GET /api/nutrition/:name - Nutrition facts; unknown names get sentinels
async fn get_nutrition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<ApiResponse<NutritionInfo>> {
    Json(ApiResponse::ok(state.nutrition.lookup(&name)))
}

/// GET /api/categories - Category overview, most expensive first
async fn get_categories(State(state): State<AppState>) -> Response {
    let priced = match state.catalog.priced_fruits() {
        Ok(priced) => priced,
        Err(e) => {
            return load_failure(
                "category overview",
                e,
                CategoryOverviewResponse {
                    summary: None,
                    categories: vec![],
                },
            )
        }
    };

    let categories = analytics::category_overview(&priced)
        .into_iter()
        .map(|stats| CategoryResponse {
            label: stats.category.label(),
            description: stats.category.description(),
            stats,
        })
        .collect();

    ok(CategoryOverviewResponse {
        summary: analytics::market_summary(&priced),
        categories,
    })
}

/// GET /api/fruit-stats - Price statistics per fruit name, most expensive first
async fn get_fruit_stats(State(state): State<AppState>) -> Response {
    match state.catalog.priced_fruits() {
        Ok(priced) => ok(analytics::fruit_stats(&priced)),
        Err(e) => load_failure("fruit stats", e, Vec::<analytics::FruitStats>::new()),
    }
}

/// GET /api/categories/:label - Ranked drill-down of one category
async fn get_category(State(state): State<AppState>, Path(label): Path<String>) -> Response {
    let category = match BotanicalCategory::from_label(&label) {
        Some(category) => category,
        None => return not_found(format!("unknown category {}", label)),
    };

    let priced = match state.catalog.priced_fruits() {
        Ok(priced) => priced,
        Err(e) => return load_failure("category detail", e, Option::<CategoryDetail>::None),
    };

    match analytics::category_detail(&priced, category) {
        Some(detail) => ok(detail),
        None => not_found(NO_RESULTS),
    }
}

/// GET /api/trends?seed= - Simulated seasonal prices by category
async fn get_trends(State(state): State<AppState>, Query(query): Query<TrendQuery>) -> Response {
    let records = match state.catalog.all_fruits() {
        Ok(records) => records,
        Err(e) => {
            return load_failure(
                "trend simulation",
                e,
                TrendResponse {
                    seed: None,
                    by_category_season: vec![],
                    top_by_season: vec![],
                },
            )
        }
    };

    let seed = query.seed.or(state.trend_seed);
    let samples = TrendSimulator::from_config(seed).simulate(&records);

    let top_by_season = analytics::seasonal_category_ranking(&samples, 3)
        .into_iter()
        .map(|(season, ranked)| SeasonRanking {
            season: season.label(),
            categories: ranked
                .into_iter()
                .map(|(category, mean_price)| RankedCategory {
                    label: category.label(),
                    mean_price,
                })
                .collect(),
        })
        .collect();

    ok(TrendResponse {
        seed,
        by_category_season: analytics::aggregate_by_category_season(&samples),
        top_by_season,
    })
}

/// GET /api/cheapest - Top 3 per category and top 5 overall
async fn get_cheapest(State(state): State<AppState>) -> Response {
    let priced = match state.catalog.priced_fruits() {
        Ok(priced) => priced,
        Err(e) => {
            return load_failure(
                "cheapest fruits",
                e,
                CheapestResponse {
                    by_category: vec![],
                    overall: vec![],
                },
            )
        }
    };

    let by_category = analytics::cheapest_per_category(&priced, 3)
        .into_iter()
        .map(|(category, fruits)| CategoryCheapest {
            label: category.label(),
            fruits: fruits.into_iter().map(FruitResponse::from).collect(),
        })
        .collect();

    let overall = analytics::cheapest(&priced, 5)
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedFruitResponse {
            rank: i + 1,
            fruit: record.into(),
        })
        .collect();

    ok(CheapestResponse {
        by_category,
        overall,
    })
}

/// GET /api/prices?category=&name=&sort= - Filtered, sorted price list
async fn search_prices(State(state): State<AppState>, Query(query): Query<PriceQuery>) -> Response {
    let category = match query.category.as_deref().filter(|c| !c.is_empty() && *c != "전체") {
        Some(label) => match BotanicalCategory::from_label(label) {
            Some(category) => Some(category),
            None => return not_found(format!("unknown category {}", label)),
        },
        None => None,
    };

    let filter = SearchFilter {
        category,
        name: query.name.filter(|n| !n.is_empty() && n != "전체"),
        order: query
            .sort
            .as_deref()
            .and_then(SortOrder::from_label)
            .unwrap_or_default(),
    };

    let priced = match state.catalog.priced_fruits() {
        Ok(priced) => priced,
        Err(e) => {
            return load_failure(
                "price search",
                e,
                PriceSearchResponse {
                    message: None,
                    stats: None,
                    fruits: vec![],
                },
            )
        }
    };

    let result = analytics::search(&priced, &filter);
    ok(PriceSearchResponse {
        message: if result.is_empty() { Some(NO_RESULTS) } else { None },
        stats: result.stats,
        fruits: result
            .entries
            .into_iter()
            .map(|entry| PriceHitResponse {
                delta_from_overall: entry.delta_from_overall,
                rank: entry.rank,
                total: entry.total,
                fruit: entry.record.into(),
            })
            .collect(),
    })
}

/// GET /api/recommendations?goal=&age=&condition= - Unknown keys use defaults
async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> Json<ApiResponse<RecommendationResponse>> {
    let rec = recommend_by_labels(&query.goal, &query.age, &query.condition);

    let fruits = rec
        .top(state.display_limit)
        .iter()
        .map(|name| RecommendedFruit {
            name: *name,
            image: state.images.resolve(name, None),
        })
        .collect();

    let reasons = rec
        .reasons()
        .into_iter()
        .map(|(key, profile)| ReasonResponse { key, profile })
        .collect();

    Json(ApiResponse::ok(RecommendationResponse {
        goal: rec.goal.label(),
        age: rec.age.label(),
        condition: rec.condition.label(),
        fruits,
        all_fruits: rec.fruits.clone(),
        reasons,
        tips: EATING_TIPS.to_vec(),
    }))
}

// ============================================================================
// Main Server
// ============================================================================

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let nutrition = NutritionTable::load(&config.nutrition_path)?;
    Ok(AppState {
        catalog: Catalog::new(&config.db_path),
        nutrition: Arc::new(nutrition),
        images: ImageResolver::new(&config.assets_dir),
        trend_seed: config.trend_seed,
        display_limit: config.display_limit,
    })
}

fn router(state: AppState, assets_dir: &std::path::Path) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/fruits", get(get_fruits))
        .route("/fruits/:name", get(get_fruit))
        .route("/search", get(search))
        .route("/nutrition/:name", get(get_nutrition))
        .route("/categories", get(get_categories))
        .route("/fruit-stats", get(get_fruit_stats))
        .route("/categories/:label", get(get_category))
        .route("/trends", get(get_trends))
        .route("/cheapest", get(get_cheapest))
        .route("/prices", get(search_prices))
        .route("/recommendations", get(get_recommendations))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🌐 Fruit Dashboard - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = config::load_config(&config::config_path())?;
    let state = build_state(&config)?;

    if !state.catalog.exists() {
        warn!(path = %config.db_path.display(), "catalog not found, data routes will answer 503");
        eprintln!("   Run: fruit-dashboard import <csv>");
    }

    let app = router(state, &config.assets_dir);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    info!(addr = %config.server_addr, "server listening");

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/fruits", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruit_dashboard::{insert_fruits, setup_database};
    use rusqlite::Connection;
    use std::path::PathBuf;

    fn state_with(db_path: PathBuf) -> AppState {
        AppState {
            catalog: Catalog::new(db_path),
            nutrition: Arc::new(NutritionTable::default()),
            images: ImageResolver::new("/nonexistent/fruit-dashboard/images"),
            trend_seed: Some(7),
            display_limit: 6,
        }
    }

    fn seeded_db(tag: &str) -> PathBuf {
        seeded_db_with(
            tag,
            &[
                FruitRecord::new("사과", "홍로", Some(1200.0)),
                FruitRecord::new("사과", "후지", Some(900.0)),
                FruitRecord::new("배", "신고", Some(1500.0)),
            ],
        )
    }

    fn seeded_db_with(tag: &str, records: &[FruitRecord]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fruit_dashboard_server_{}.sqlite3", tag));
        std::fs::remove_file(&path).ok();
        let conn = Connection::open(&path).unwrap();
        setup_database(&conn).unwrap();
        insert_fruits(&conn, records).unwrap();
        path
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_store_answers_503() {
        let state = state_with(PathBuf::from("/nonexistent/fruit-dashboard/catalog.sqlite3"));
        let response = get_fruits(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = get_categories(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_category_routes() {
        let path = seeded_db("categories");
        let state = state_with(path.clone());

        assert_eq!(get_categories(State(state.clone())).await.status(), StatusCode::OK);
        assert_eq!(
            get_category(State(state.clone()), Path("이과".to_string())).await.status(),
            StatusCode::OK
        );
        assert_eq!(
            get_category(State(state.clone()), Path("채소".to_string())).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_category(State(state), Path("삭과".to_string())).await.status(),
            StatusCode::NOT_FOUND
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_fruit_stats_route() {
        let path = seeded_db("fruit_stats");
        let state = state_with(path.clone());

        let body = body_json(get_fruit_stats(State(state)).await).await;
        let stats = body["data"].as_array().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0]["name"], "배");
        assert_eq!(stats[1]["name"], "사과");
        assert_eq!(stats[1]["stats"]["mean"], 1050.0);

        let missing = state_with(PathBuf::from("/nonexistent/fruit-dashboard/catalog.sqlite3"));
        assert_eq!(
            get_fruit_stats(State(missing)).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_fruit_lookup() {
        let path = seeded_db("fruit");
        let state = state_with(path.clone());

        assert_eq!(
            get_fruit(State(state.clone()), Path("사과".to_string())).await.status(),
            StatusCode::OK
        );
        assert_eq!(
            get_fruit(State(state), Path("두리안".to_string())).await.status(),
            StatusCode::NOT_FOUND
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_price_search_places_hits_among_all_prices() {
        let path = seeded_db("prices");
        let state = state_with(path.clone());

        let response = search_prices(
            State(state),
            Query(PriceQuery {
                category: Some("전체".to_string()),
                name: Some("사과".to_string()),
                sort: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let fruits = body["data"]["fruits"].as_array().unwrap();
        assert_eq!(fruits.len(), 2);
        // overall mean of 1200, 900 and 1500 is 1200
        assert_eq!(fruits[0]["kind"], "후지");
        assert_eq!(fruits[0]["rank"], 1);
        assert_eq!(fruits[0]["total"], 3);
        assert_eq!(fruits[0]["delta_from_overall"], -300.0);
        assert_eq!(fruits[1]["rank"], 2);
        assert_eq!(fruits[1]["delta_from_overall"], 0.0);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_cheapest_overall_numbers_by_position() {
        let path = seeded_db_with(
            "cheapest",
            &[
                FruitRecord::new("사과", "a", Some(100.0)),
                FruitRecord::new("사과", "b", Some(100.0)),
                FruitRecord::new("배", "c", Some(300.0)),
            ],
        );
        let state = state_with(path.clone());

        let body = body_json(get_cheapest(State(state)).await).await;
        let ranks: Vec<u64> = body["data"]["overall"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["rank"].as_u64().unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_recommendations_fall_back_on_unknown_keys() {
        let state = state_with(PathBuf::from("/nonexistent/fruit-dashboard/catalog.sqlite3"));
        let Json(response) = get_recommendations(
            State(state),
            Query(RecommendQuery {
                goal: "?".to_string(),
                age: String::new(),
                condition: "해당없음".to_string(),
            }),
        )
        .await;

        assert!(response.success);
        assert_eq!(response.data.goal, "면역력 증진");
        assert_eq!(response.data.age, "성인 (20-64세)");
        assert_eq!(response.data.fruits.len(), 6);
        assert!(response.data.fruits.iter().all(|f| f.image.is_placeholder()));
    }
}
