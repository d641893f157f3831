// Fruit Dashboard - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod config;
pub mod catalog;    // Catalog Store - read-only SQLite fruit table
pub mod category;   // Botanical categorization rules
pub mod analytics;  // Aggregation, rankings, search
pub mod trend;      // Simulated seasonal prices
pub mod nutrition;  // Static nutrition table
pub mod recommend;  // Health recommendation rule tables
pub mod assets;     // Image asset resolution
pub mod views;      // Page selector + home content

// Re-export commonly used types
pub use error::{DashboardError, Result};
pub use config::{load_config, AppConfig};
pub use catalog::{
    Catalog, FruitRecord, NamePriceStat, NO_DATA,
    load_csv, setup_database, insert_fruits, verify_count,
    get_all_fruits, get_priced_fruits, get_fruits_by_name, get_fruit_varieties,
    get_unique_fruit_names, search_fruits, get_price_statistics,
};
pub use category::{categorize, BotanicalCategory};
pub use analytics::{
    PriceStats, CategoryStats, SeasonalCategoryStats, MarketSummary, CategoryDetail,
    RankedFruit, SearchEntry, SearchFilter, SearchResult, SortOrder, NO_RESULTS,
};
pub use trend::{simulate_seasonal_prices, Season, SeasonalSample, TrendSimulator};
pub use nutrition::{FruitDetail, NutritionInfo, NutritionTable};
pub use recommend::{recommend, AgeGroup, Condition, HealthGoal, Profile, Recommendation};
pub use assets::{ImageAsset, ImageResolver};
pub use views::{HomeSummary, View};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
