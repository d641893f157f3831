// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use fruit_dashboard::{
    analytics, catalog, config, Catalog, NutritionTable, TrendSimulator, NO_DATA,
};
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let config_path = config::config_path();
    let config = config::load_config(&config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = match args.get(2) {
                Some(path) => path,
                None => bail!("usage: fruit-dashboard import <csv>"),
            };
            run_import(Path::new(csv_path), &config.db_path)?;
        }
        Some("report") => run_report(&config)?,
        // UI mode (default)
        _ => run_ui_mode(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("🗄️  Catalog Import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let fruits = catalog::load_csv(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;
    println!("✓ Loaded {} fruit rows from CSV", fruits.len());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    catalog::setup_database(&conn)?;
    println!("✓ Database initialized at {}", db_path.display());

    // 3. Insert rows
    println!("\n💾 Inserting fruits...");
    let inserted = catalog::insert_fruits(&conn, &fruits)?;

    // 4. Verify count
    println!("\n🔍 Verifying database...");
    let count = catalog::verify_count(&conn)?;
    println!("✓ Database contains {} fruits", count);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Inserted: {}", inserted);
    println!("✓ Skipped (already present): {}", fruits.len() - inserted);

    Ok(())
}

fn run_report(config: &config::AppConfig) -> Result<()> {
    let catalog = Catalog::new(&config.db_path);
    let records = match catalog.all_fruits() {
        Ok(records) => records,
        Err(e) if e.is_empty_state() => {
            println!("❌ Catalog not found at {}", config.db_path.display());
            println!("   Run: fruit-dashboard import <csv>");
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to load catalog"),
    };
    let priced = analytics::filter_priced(&records);

    println!("📊 Fruit Price Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match analytics::market_summary(&priced) {
        Some(summary) => {
            println!("Categories:   {}", summary.category_count);
            println!("Fruits:       {}", summary.total_fruits);
            println!("Mean price:   {:.0}원/100g", summary.mean_price);
            println!("Price range:  {:.0}원", summary.price_range);
        }
        None => println!("Prices: {}", NO_DATA),
    }

    println!("\n🏷️  By category (mean price, highest first)");
    for group in analytics::category_overview(&priced) {
        let std_dev = group
            .stats
            .std_dev
            .map(|s| format!("{:.0}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<8} n={:<3} mean={:>6.0} min={:>6.0} max={:>6.0} sd={}",
            group.category.label(),
            group.stats.count,
            group.stats.mean,
            group.stats.min,
            group.stats.max,
            std_dev
        );
    }

    println!("\n💰 Cheapest per category");
    for (category, cheapest) in analytics::cheapest_per_category(&priced, 3) {
        let labels: Vec<String> = cheapest
            .iter()
            .map(|r| format!("{} {}", r.label(), r.price_display()))
            .collect();
        println!("  {:<8} {}", category.label(), labels.join(", "));
    }

    println!("\n🥇 Cheapest overall");
    for (i, record) in analytics::cheapest(&priced, 5).iter().enumerate() {
        println!("  #{} {} {}", i + 1, record.label(), record.price_display());
    }

    let samples = TrendSimulator::from_config(config.trend_seed).simulate(&records);
    println!("\n📈 Seasonal leaders (simulated)");
    for (season, ranked) in analytics::seasonal_category_ranking(&samples, 3) {
        let labels: Vec<String> = ranked
            .iter()
            .map(|(category, mean)| format!("{} {:.0}원", category.label(), mean))
            .collect();
        println!("  {:<4} {}", season.label(), labels.join(" > "));
    }

    println!("\n🍎 By fruit (mean price, highest first)");
    for stat in catalog.price_statistics()? {
        println!(
            "  {:<8} n={:<3} mean={:>6.0} min={:>6.0} max={:>6.0}",
            stat.name, stat.count, stat.avg_price, stat.min_price, stat.max_price
        );
    }

    let nutrition = NutritionTable::load(&config.nutrition_path)?;
    let names = catalog.unique_names()?;
    let covered = names
        .iter()
        .filter(|name| nutrition.lookup(name).calories != NO_DATA)
        .count();
    println!("\n🥗 Nutrition data for {}/{} fruits", covered, names.len());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &config::AppConfig) -> Result<()> {
    use chrono::Datelike;

    println!("🖥️  Loading Fruit Dashboard...\n");

    let month = chrono::Local::now().month();
    let mut app = ui::App::load(config, month);

    if let Some(message) = &app.empty_state {
        eprintln!("⚠️  {}", message);
    } else {
        println!("✓ Loaded {} fruits", app.records.len());
    }
    println!("Starting UI... (Press 'q' to quit)\n");

    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &config::AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the JSON API: cargo run --bin fruit-server --features server");
    std::process::exit(1);
}
