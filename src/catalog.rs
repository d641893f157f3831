use crate::error::{DashboardError, Result};
use rusqlite::{params, Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sentinel shown wherever a price or nutrition value is unknown.
/// Zero is a real value elsewhere, so "unknown" never renders as 0.
pub const NO_DATA: &str = "정보 없음";

/// One row of the `fruit` table.
/// Identity is (name, kind); the row id only exists for the store.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FruitRecord {
    #[serde(default, skip_deserializing)]
    pub id: i64,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Kind")]
    pub kind: String,

    /// Currency per 100g. `None` or non-positive means "no price data".
    #[serde(rename = "unit_price")]
    pub unit_price: Option<f64>,
}

impl FruitRecord {
    pub fn new(name: &str, kind: &str, unit_price: Option<f64>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            kind: kind.to_string(),
            unit_price,
        }
    }

    /// Usable price, if any
    pub fn price(&self) -> Option<f64> {
        self.unit_price.filter(|p| *p > 0.0)
    }

    pub fn is_priced(&self) -> bool {
        self.price().is_some()
    }

    /// "사과 (홍로)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    pub fn price_display(&self) -> String {
        match self.price() {
            Some(p) => format!("{:.0}원/100g", p),
            None => NO_DATA.to_string(),
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(FruitRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            unit_price: row.get(3)?,
        })
    }
}

/// Per-name statistics computed by the store itself
#[derive(Debug, Clone, Serialize)]
pub struct NamePriceStat {
    pub name: String,
    pub count: i64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

// ============================================================================
// CATALOG HANDLE
// ============================================================================

/// Location of the catalog database. Every query opens its own read-only
/// connection and drops it when done; nothing is pooled.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Catalog {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Open a read-only connection. A missing file is reported as
    /// `StoreMissing` instead of letting SQLite create an empty database.
    pub fn open(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(DashboardError::StoreMissing(self.path.clone()));
        }
        debug!(path = %self.path.display(), "opening catalog");
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    pub fn all_fruits(&self) -> Result<Vec<FruitRecord>> {
        get_all_fruits(&self.open()?)
    }

    pub fn priced_fruits(&self) -> Result<Vec<FruitRecord>> {
        let fruits = get_priced_fruits(&self.open()?)?;
        info!(count = fruits.len(), "loaded priced fruits");
        Ok(fruits)
    }

    pub fn fruits_by_name(&self, name: &str) -> Result<Vec<FruitRecord>> {
        get_fruits_by_name(&self.open()?, name)
    }

    pub fn varieties(&self, name: &str, variety: Option<&str>) -> Result<Vec<FruitRecord>> {
        get_fruit_varieties(&self.open()?, name, variety)
    }

    pub fn unique_names(&self) -> Result<Vec<String>> {
        get_unique_fruit_names(&self.open()?)
    }

    pub fn search(&self, term: &str) -> Result<Vec<FruitRecord>> {
        search_fruits(&self.open()?, term)
    }

    pub fn price_statistics(&self) -> Result<Vec<NamePriceStat>> {
        get_price_statistics(&self.open()?)
    }
}

// ============================================================================
// SCHEMA & SEEDING
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS fruit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            Kind TEXT NOT NULL,
            unit_price REAL,
            UNIQUE (Name, Kind)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fruit_name ON fruit(Name)",
        [],
    )?;

    Ok(())
}

/// Read catalog rows from a CSV with headers `Name,Kind,unit_price`.
/// An empty price cell becomes `None`.
pub fn load_csv(csv_path: &Path) -> Result<Vec<FruitRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path)?;

    let mut fruits = Vec::new();
    for result in rdr.deserialize() {
        let fruit: FruitRecord = result?;
        fruits.push(fruit);
    }

    debug!(count = fruits.len(), path = %csv_path.display(), "read catalog csv");
    Ok(fruits)
}

/// Insert records, skipping any (Name, Kind) pair already present.
/// Returns the number of rows actually inserted.
pub fn insert_fruits(conn: &Connection, fruits: &[FruitRecord]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for fruit in fruits {
        let result = conn.execute(
            "INSERT INTO fruit (Name, Kind, unit_price) VALUES (?1, ?2, ?3)",
            params![fruit.name, fruit.kind, fruit.unit_price],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, duplicates, "catalog import finished");
    Ok(inserted)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM fruit", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// QUERIES
// ============================================================================

const FRUIT_COLUMNS: &str = "id, Name, Kind, unit_price";

fn query_fruits<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<FruitRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let fruits = stmt
        .query_map(params, FruitRecord::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fruits)
}

/// Every row in table order
pub fn get_all_fruits(conn: &Connection) -> Result<Vec<FruitRecord>> {
    query_fruits(
        conn,
        &format!("SELECT {} FROM fruit ORDER BY id", FRUIT_COLUMNS),
        [],
    )
}

/// Rows with a positive price, ordered by name then price
pub fn get_priced_fruits(conn: &Connection) -> Result<Vec<FruitRecord>> {
    query_fruits(
        conn,
        &format!(
            "SELECT {} FROM fruit
             WHERE unit_price > 0
             ORDER BY Name, unit_price",
            FRUIT_COLUMNS
        ),
        [],
    )
}

/// Exact-name lookup (all varieties of one fruit)
pub fn get_fruits_by_name(conn: &Connection, name: &str) -> Result<Vec<FruitRecord>> {
    query_fruits(
        conn,
        &format!("SELECT {} FROM fruit WHERE Name = ?1 ORDER BY id", FRUIT_COLUMNS),
        params![name],
    )
}

/// Varieties of one fruit, optionally narrowed by a kind substring
pub fn get_fruit_varieties(
    conn: &Connection,
    name: &str,
    variety: Option<&str>,
) -> Result<Vec<FruitRecord>> {
    match variety {
        Some(v) if !v.is_empty() => query_fruits(
            conn,
            &format!(
                "SELECT {} FROM fruit WHERE Name = ?1 AND Kind LIKE ?2 ORDER BY id",
                FRUIT_COLUMNS
            ),
            params![name, format!("%{}%", v)],
        ),
        _ => get_fruits_by_name(conn, name),
    }
}

/// Distinct names in first-seen order
pub fn get_unique_fruit_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT Name FROM fruit GROUP BY Name ORDER BY MIN(id)")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Name substring search
pub fn search_fruits(conn: &Connection, term: &str) -> Result<Vec<FruitRecord>> {
    query_fruits(
        conn,
        &format!("SELECT {} FROM fruit WHERE Name LIKE ?1 ORDER BY id", FRUIT_COLUMNS),
        params![format!("%{}%", term)],
    )
}

/// Count/avg/min/max of priced rows per fruit name, most expensive first
pub fn get_price_statistics(conn: &Connection) -> Result<Vec<NamePriceStat>> {
    let mut stmt = conn.prepare(
        "SELECT
            Name,
            COUNT(*) as total_count,
            AVG(unit_price) as avg_price,
            MIN(unit_price) as min_price,
            MAX(unit_price) as max_price
         FROM fruit
         WHERE unit_price > 0
         GROUP BY Name
         ORDER BY avg_price DESC",
    )?;

    let stats = stmt
        .query_map([], |row| {
            Ok(NamePriceStat {
                name: row.get(0)?,
                count: row.get(1)?,
                avg_price: row.get(2)?,
                min_price: row.get(3)?,
                max_price: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(stats)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory catalog used by tests across the crate
    pub(crate) fn sample_catalog() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        let fruits = vec![
            FruitRecord::new("사과", "홍로", Some(1200.0)),
            FruitRecord::new("사과", "후지", Some(900.0)),
            FruitRecord::new("배", "신고", Some(1500.0)),
            FruitRecord::new("딸기", "설향", Some(2100.0)),
            FruitRecord::new("수박", "일반", None),
            FruitRecord::new("레몬", "유레카", Some(0.0)),
        ];
        insert_fruits(&conn, &fruits).unwrap();
        conn
    }

    #[test]
    fn test_import_is_idempotent() {
        let conn = sample_catalog();
        let again = vec![
            FruitRecord::new("사과", "홍로", Some(1200.0)),
            FruitRecord::new("배", "신고", Some(1500.0)),
        ];

        let inserted = insert_fruits(&conn, &again).unwrap();

        assert_eq!(inserted, 0, "duplicate (Name, Kind) pairs must be skipped");
        assert_eq!(verify_count(&conn).unwrap(), 6);
    }

    #[test]
    fn test_load_csv_reads_missing_price_as_none() {
        let path = std::env::temp_dir().join("fruit_dashboard_catalog_test.csv");
        std::fs::write(&path, "Name,Kind,unit_price\n사과,홍로,1200\n망고스틴,태국,\n").unwrap();

        let fruits = load_csv(&path).unwrap();
        assert_eq!(fruits.len(), 2);
        assert_eq!(fruits[0].unit_price, Some(1200.0));
        assert_eq!(fruits[1].unit_price, None);
        assert_eq!(fruits[1].label(), "망고스틴 (태국)");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_priced_query_filters_and_orders() {
        let conn = sample_catalog();
        let priced = get_priced_fruits(&conn).unwrap();

        let labels: Vec<String> = priced.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            vec!["딸기 (설향)", "배 (신고)", "사과 (후지)", "사과 (홍로)"]
        );
        assert!(priced.iter().all(|f| f.is_priced()));
    }

    #[test]
    fn test_exact_name_and_variety_lookup() {
        let conn = sample_catalog();

        assert_eq!(get_fruits_by_name(&conn, "사과").unwrap().len(), 2);
        assert!(get_fruits_by_name(&conn, "사").unwrap().is_empty());

        let fuji = get_fruit_varieties(&conn, "사과", Some("후")).unwrap();
        assert_eq!(fuji.len(), 1);
        assert_eq!(fuji[0].kind, "후지");
    }

    #[test]
    fn test_unique_names_keep_first_seen_order() {
        let conn = sample_catalog();
        let names = get_unique_fruit_names(&conn).unwrap();
        assert_eq!(names, vec!["사과", "배", "딸기", "수박", "레몬"]);
    }

    #[test]
    fn test_search_is_substring() {
        let conn = sample_catalog();
        let hits = search_fruits(&conn, "과").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(search_fruits(&conn, "망고").unwrap().is_empty());
    }

    #[test]
    fn test_price_statistics_by_name() {
        let conn = sample_catalog();
        let stats = get_price_statistics(&conn).unwrap();

        assert_eq!(stats[0].name, "딸기");
        let apple = stats.iter().find(|s| s.name == "사과").unwrap();
        assert_eq!(apple.count, 2);
        assert_eq!(apple.avg_price, 1050.0);
        assert_eq!(apple.min_price, 900.0);
        assert_eq!(apple.max_price, 1200.0);
    }

    #[test]
    fn test_missing_store_is_reported() {
        let catalog = Catalog::new("/nonexistent/fruit-dashboard/catalog.sqlite3");
        let err = catalog.all_fruits().unwrap_err();
        assert!(err.is_empty_state());
    }

    #[test]
    fn test_price_display_uses_sentinel() {
        assert_eq!(FruitRecord::new("수박", "일반", None).price_display(), NO_DATA);
        assert_eq!(FruitRecord::new("레몬", "유레카", Some(0.0)).price_display(), NO_DATA);
        assert_eq!(
            FruitRecord::new("사과", "후지", Some(900.0)).price_display(),
            "900원/100g"
        );
    }
}
