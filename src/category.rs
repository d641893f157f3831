// 🏷️ Botanical Categories - Classification as Data
// Fruit names map to one of ten fruit-structure categories by substring rules

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BotanicalCategory {
    /// 이과 - core in the middle, flesh from the receptacle
    Pome,

    /// 핵과 - single hard stone
    Drupe,

    /// 장과류 - fleshy throughout, several seeds
    Berry,

    /// 감과체 - citrus segments under a thick rind
    Hesperidium,

    /// 박과열매 - gourd family, hard rind
    Pepo,

    /// 취합과 - many ovaries of one flower
    Aggregate,

    /// 다화과 - fruits of many flowers fused
    Multiple,

    /// 석류과 - chambered pomegranate type
    Pomegranate,

    /// 삭과 - capsule split into chambers
    Capsule,

    /// 기타과실 - fallback when no rule matches
    Other,
}

/// Priority-ordered classification table. The first category with a member
/// contained in the fruit name wins, so order matters wherever one member
/// is a substring of a member further down (체리 / 체리모야, 망고 / 망고스틴,
/// 감 / 감귤).
const CATEGORY_TABLE: [(BotanicalCategory, &[&str]); 10] = [
    (BotanicalCategory::Pome, &["사과", "배"]),
    (
        BotanicalCategory::Drupe,
        &[
            "복숭아", "자두", "살구", "체리", "매실", "망고", "람부탄", "리치", "백도", "황도",
            "청도",
        ],
    ),
    (
        BotanicalCategory::Berry,
        &[
            "포도", "블루베리", "감", "구아바", "망고스틴", "바나나", "스타프루트", "아보카도",
            "용과", "적포도", "청포도", "파파야",
        ],
    ),
    (
        BotanicalCategory::Hesperidium,
        &["감귤", "레몬", "오렌지", "자몽", "유자"],
    ),
    (BotanicalCategory::Pepo, &["수박", "멜론", "참외"]),
    (BotanicalCategory::Aggregate, &["딸기", "체리모야"]),
    (BotanicalCategory::Multiple, &["파인애플", "무화과"]),
    (BotanicalCategory::Pomegranate, &["석류"]),
    (BotanicalCategory::Capsule, &["두리안"]),
    (BotanicalCategory::Other, &[]),
];

impl BotanicalCategory {
    /// All categories in table (priority) order
    pub fn all() -> [BotanicalCategory; 10] {
        CATEGORY_TABLE.map(|(category, _)| category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BotanicalCategory::Pome => "이과",
            BotanicalCategory::Drupe => "핵과",
            BotanicalCategory::Berry => "장과류",
            BotanicalCategory::Hesperidium => "감과체",
            BotanicalCategory::Pepo => "박과열매",
            BotanicalCategory::Aggregate => "취합과",
            BotanicalCategory::Multiple => "다화과",
            BotanicalCategory::Pomegranate => "석류과",
            BotanicalCategory::Capsule => "삭과",
            BotanicalCategory::Other => "기타과실",
        }
    }

    /// Reverse of `label`. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.label() == label.trim())
    }

    pub fn members(&self) -> &'static [&'static str] {
        CATEGORY_TABLE
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, members)| *members)
            .unwrap_or(&[])
    }

    /// Position in the classification table. Earlier entries win when a
    /// name contains members of several categories.
    pub fn priority(&self) -> usize {
        CATEGORY_TABLE
            .iter()
            .position(|(category, _)| category == self)
            .unwrap_or(CATEGORY_TABLE.len())
    }

    pub fn description(&self) -> &'static str {
        match self {
            BotanicalCategory::Pome => "씨방 바깥 부분이 과육, 씨는 중심부 (사과, 배)",
            BotanicalCategory::Drupe => "단단한 씨(핵)를 중심으로 과육 (복숭아, 자두, 체리, 망고)",
            BotanicalCategory::Berry => "전체가 과육이며 씨가 여러 개 (포도, 블루베리, 바나나, 감)",
            BotanicalCategory::Hesperidium => {
                "감귤류 특유의 구조, 두꺼운 껍질과 즙낭 (오렌지, 레몬, 자몽)"
            }
            BotanicalCategory::Pepo => "박과 식물의 열매, 두꺼운 껍질 (수박, 멜론, 참외)",
            BotanicalCategory::Aggregate => "여러 씨방이 모여 하나의 열매 (딸기, 체리모야)",
            BotanicalCategory::Multiple => "여러 꽃에서 생긴 열매가 합쳐짐 (파인애플, 무화과)",
            BotanicalCategory::Pomegranate => "석류 특유의 구조, 여러 방에 씨가 들어있음",
            BotanicalCategory::Capsule => "여러 칸으로 나뉜 씨방, 다육질 형태 (두리안)",
            BotanicalCategory::Other => "분류 규칙에 해당하지 않는 과실",
        }
    }
}

impl fmt::Display for BotanicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify a fruit name. Total: names matching no rule are `Other`.
///
/// Matching is containment, so compound names such as "한국 자두" still
/// land in the category of "자두".
pub fn categorize(name: &str) -> BotanicalCategory {
    for (category, members) in CATEGORY_TABLE.iter() {
        if members.iter().any(|member| name.contains(member)) {
            return *category;
        }
    }

    BotanicalCategory::Other
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Members that an earlier category's member already contains
    fn is_shadowed(category: BotanicalCategory, member: &str) -> bool {
        BotanicalCategory::all()
            .iter()
            .take(category.priority())
            .any(|earlier| earlier.members().iter().any(|m| member.contains(m)))
    }

    #[test]
    fn test_every_unshadowed_member_maps_to_its_category() {
        for category in BotanicalCategory::all() {
            for member in category.members() {
                if is_shadowed(category, member) {
                    continue;
                }
                assert_eq!(
                    categorize(member),
                    category,
                    "{} should be {}",
                    member,
                    category
                );
            }
        }
    }

    #[test]
    fn test_first_match_wins_for_overlapping_names() {
        assert_eq!(categorize("체리모야"), BotanicalCategory::Drupe);
        assert_eq!(categorize("망고스틴"), BotanicalCategory::Drupe);
        assert_eq!(categorize("감귤"), BotanicalCategory::Berry);
    }

    #[test]
    fn test_compound_names_match_by_substring() {
        assert_eq!(categorize("한국 자두"), BotanicalCategory::Drupe);
        assert_eq!(categorize("샤인머스캣 청포도"), BotanicalCategory::Berry);
        assert_eq!(categorize("제주 한라봉 오렌지"), BotanicalCategory::Hesperidium);
    }

    #[test]
    fn test_unknown_name_falls_back_to_other() {
        assert_eq!(categorize("키위"), BotanicalCategory::Other);
        assert_eq!(categorize(""), BotanicalCategory::Other);
        assert_eq!(categorize("dragonfruit"), BotanicalCategory::Other);
    }

    #[test]
    fn test_labels_round_trip_and_order() {
        let all = BotanicalCategory::all();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0], BotanicalCategory::Pome);
        assert_eq!(all[9], BotanicalCategory::Other);

        for category in all {
            assert_eq!(BotanicalCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(BotanicalCategory::from_label("채소"), None);
        assert!(BotanicalCategory::Other.members().is_empty());
    }
}
