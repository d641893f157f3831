// Page selector and home page content

use crate::catalog::FruitRecord;
use crate::trend::Season;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum View {
    #[default]
    Home,
    Nutrition,
    Prices,
    Recommendations,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Home,
        View::Nutrition,
        View::Prices,
        View::Recommendations,
    ];

    pub fn next(&self) -> Self {
        match self {
            View::Home => View::Nutrition,
            View::Nutrition => View::Prices,
            View::Prices => View::Recommendations,
            View::Recommendations => View::Home,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            View::Home => View::Recommendations,
            View::Nutrition => View::Home,
            View::Prices => View::Nutrition,
            View::Recommendations => View::Prices,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "홈",
            View::Nutrition => "영양 성분 분석",
            View::Prices => "가격 정보",
            View::Recommendations => "건강 추천",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Home => 0,
            View::Nutrition => 1,
            View::Prices => 2,
            View::Recommendations => 3,
        }
    }
}

// ============================================================================
// HOME
// ============================================================================

/// How many fruits the home page features
pub const FEATURED_COUNT: usize = 4;

pub const DEFAULT_HIGHLIGHT: &str = "신선하고 영양가 풍부한 과일";

/// (name, kcal/100g, benefits) for well-known fruits
const BASIC_INFO: [(&str, &str, &str); 10] = [
    ("사과", "52", "비타민C, 식이섬유 풍부"),
    ("배", "44", "수분 많음, 소화 도움"),
    ("복숭아", "51", "비타민A, 항산화 성분"),
    ("포도", "69", "항산화 성분, 혈관 건강"),
    ("망고", "60", "비타민A, 베타카로틴"),
    ("키위", "61", "비타민C 매우 풍부"),
    ("바나나", "89", "칼륨, 에너지 공급"),
    ("딸기", "32", "비타민C, 엽산"),
    ("오렌지", "47", "비타민C, 구연산"),
    ("레몬", "17", "비타민C, 해독 작용"),
];

pub const HOME_TIPS: [(&str, &str); 2] = [
    (
        "과일 섭취의 최적 시간",
        "비타민 C가 풍부한 과일은 아침에, 소화를 돕는 과일은 식후에, 수면에 도움이 되는 과일은 취침 전에 섭취하는 것이 좋습니다.",
    ),
    (
        "과일 보관 방법",
        "사과, 배는 냉장 보관, 바나나, 파인애플은 실온 보관이 적합합니다. 딸기, 블루베리는 씻지 않은 상태로 냉장 보관하세요.",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BasicInfo {
    pub calories: &'static str,
    pub benefits: &'static str,
}

pub fn basic_info(name: &str) -> Option<BasicInfo> {
    BASIC_INFO
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, calories, benefits)| BasicInfo { calories, benefits })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedFruit {
    pub record: FruitRecord,
    pub info: Option<BasicInfo>,
}

impl FeaturedFruit {
    pub fn highlight(&self) -> &'static str {
        self.info.map(|i| i.benefits).unwrap_or(DEFAULT_HIGHLIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSummary {
    pub month: u32,
    pub season: Season,
    pub featured: Vec<FeaturedFruit>,
}

impl HomeSummary {
    /// The catalog carries no seasonal availability, so the featured list is
    /// simply the first catalog rows.
    pub fn build(records: &[FruitRecord], month: u32) -> Self {
        let featured = records
            .iter()
            .take(FEATURED_COUNT)
            .map(|record| FeaturedFruit {
                info: basic_info(&record.name),
                record: record.clone(),
            })
            .collect();

        HomeSummary {
            month,
            season: Season::from_month(month),
            featured,
        }
    }

    pub fn headline(&self) -> String {
        format!("{}월 제철 과일 추천", self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_cycles_both_ways() {
        for view in View::ALL {
            assert_eq!(view.next().previous(), view);
            assert_eq!(view.previous().next(), view);
        }
        assert_eq!(View::Recommendations.next(), View::Home);
        assert_eq!(View::Home.previous(), View::Recommendations);
    }

    #[test]
    fn test_titles_and_indices() {
        let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
        assert_eq!(titles, vec!["홈", "영양 성분 분석", "가격 정보", "건강 추천"]);
        for (i, view) in View::ALL.iter().enumerate() {
            assert_eq!(view.index(), i);
        }
        assert_eq!(View::default(), View::Home);
    }

    #[test]
    fn test_home_features_first_rows() {
        let records: Vec<FruitRecord> = ["사과", "두리안", "배", "딸기", "레몬"]
            .iter()
            .map(|name| FruitRecord::new(name, "일반", Some(1000.0)))
            .collect();

        let home = HomeSummary::build(&records, 10);
        assert_eq!(home.featured.len(), FEATURED_COUNT);
        assert_eq!(home.season, Season::Fall);
        assert_eq!(home.headline(), "10월 제철 과일 추천");

        assert_eq!(home.featured[0].info.map(|i| i.calories), Some("52"));
        assert_eq!(home.featured[1].info, None);
        assert_eq!(home.featured[1].highlight(), DEFAULT_HIGHLIGHT);
    }

    #[test]
    fn test_home_with_empty_catalog() {
        let home = HomeSummary::build(&[], 3);
        assert!(home.featured.is_empty());
        assert_eq!(home.season, Season::Spring);
    }
}
