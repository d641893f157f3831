// 🍎 Health Recommendations - rule tables keyed by goal, age group and condition
//
// Three fixed tables each map a key to a profile. A recommendation is the
// union of the three fruit lists.

use serde::Serialize;
use std::collections::BTreeSet;

/// How many fruits the result grid shows
pub const DEFAULT_DISPLAY_LIMIT: usize = 6;

pub const EATING_TIPS: [&str; 4] = [
    "하루에 2-3가지 다양한 과일을 섭취하세요",
    "가능한 한 신선한 제철 과일을 선택하세요",
    "과일 주스보다는 생과일을 드시는 것이 좋습니다",
    "개인의 알레르기나 질환이 있다면 전문의와 상담 후 섭취하세요",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub fruits: &'static [&'static str],
    pub reason: &'static str,
    pub nutrients: &'static [&'static str],
}

// ============================================================================
// KEYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HealthGoal {
    Diet,
    #[default]
    Immunity,
    Skin,
    Digestion,
    Anemia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AgeGroup {
    Child,
    Teen,
    #[default]
    Adult,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Condition {
    Male,
    Female,
    Pregnant,
    Menopause,
    #[default]
    NotApplicable,
}

impl HealthGoal {
    pub const ALL: [HealthGoal; 5] = [
        HealthGoal::Diet,
        HealthGoal::Immunity,
        HealthGoal::Skin,
        HealthGoal::Digestion,
        HealthGoal::Anemia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HealthGoal::Diet => "다이어트",
            HealthGoal::Immunity => "면역력 증진",
            HealthGoal::Skin => "피부 건강",
            HealthGoal::Digestion => "소화 개선",
            HealthGoal::Anemia => "빈혈 예방",
        }
    }

    /// Unknown labels fall back to 면역력 증진
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|g| g.label() == label.trim())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> Profile {
        match self {
            HealthGoal::Diet => Profile {
                fruits: &["사과", "자두", "딸기", "블루베리", "키위", "자몽"],
                reason: "저칼로리, 높은 식이섬유로 포만감을 주며 신진대사를 촉진합니다.",
                nutrients: &["식이섬유", "비타민C", "칼륨"],
            },
            HealthGoal::Immunity => Profile {
                fruits: &["오렌지", "키위", "딸기", "블루베리", "망고", "파파야"],
                reason: "비타민C와 항산화 물질이 풍부하여 면역체계를 강화합니다.",
                nutrients: &["비타민C", "항산화물질", "비타민A"],
            },
            HealthGoal::Skin => Profile {
                fruits: &["아보카도", "망고", "파파야", "딸기", "석류", "블루베리"],
                reason: "비타민E, 비타민C, 항산화 물질이 피부 재생과 콜라겐 생성을 돕습니다.",
                nutrients: &["비타민E", "비타민C", "베타카로틴"],
            },
            HealthGoal::Digestion => Profile {
                fruits: &["파인애플", "파파야", "바나나", "키위", "사과", "배"],
                reason: "소화효소와 식이섬유가 풍부하여 장 건강을 개선합니다.",
                nutrients: &["식이섬유", "소화효소", "칼륨"],
            },
            HealthGoal::Anemia => Profile {
                fruits: &["석류", "건포도", "살구", "체리", "딸기", "키위"],
                reason: "철분과 비타민C가 풍부하여 혈액 생성과 철분 흡수를 돕습니다.",
                nutrients: &["철분", "비타민C", "엽산"],
            },
        }
    }
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Child,
        AgeGroup::Teen,
        AgeGroup::Adult,
        AgeGroup::Senior,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Child => "어린이 (5-12세)",
            AgeGroup::Teen => "청소년 (13-19세)",
            AgeGroup::Adult => "성인 (20-64세)",
            AgeGroup::Senior => "노인 (65세 이상)",
        }
    }

    /// Unknown labels fall back to 성인 (20-64세)
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|a| a.label() == label.trim())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> Profile {
        match self {
            AgeGroup::Child => Profile {
                fruits: &["바나나", "사과", "딸기", "포도", "오렌지", "복숭아"],
                reason: "성장에 필요한 영양소가 풍부하고 달콤한 맛으로 아이들이 좋아합니다.",
                nutrients: &["칼슘", "비타민C", "자연당"],
            },
            AgeGroup::Teen => Profile {
                fruits: &["바나나", "사과", "키위", "블루베리", "망고", "아보카도"],
                reason: "두뇌 발달과 에너지 공급에 필요한 영양소를 제공합니다.",
                nutrients: &["오메가3", "비타민B", "항산화물질"],
            },
            AgeGroup::Adult => Profile {
                fruits: &["사과", "키위", "아보카도", "블루베리", "자몽", "석류"],
                reason: "만성질환 예방과 건강 유지에 도움이 되는 항산화 물질이 풍부합니다.",
                nutrients: &["항산화물질", "식이섬유", "칼륨"],
            },
            AgeGroup::Senior => Profile {
                fruits: &["바나나", "사과", "배", "오렌지", "키위", "멜론"],
                reason: "소화가 쉽고 혈압 조절과 뼈 건강에 도움이 되는 영양소를 함유합니다.",
                nutrients: &["칼륨", "칼슘", "비타민D"],
            },
        }
    }
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Male,
        Condition::Female,
        Condition::Pregnant,
        Condition::Menopause,
        Condition::NotApplicable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Male => "남성",
            Condition::Female => "여성",
            Condition::Pregnant => "임산부",
            Condition::Menopause => "갱년기 여성",
            Condition::NotApplicable => "해당없음",
        }
    }

    /// Unknown labels fall back to 해당없음
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label.trim())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> Profile {
        match self {
            Condition::Male => Profile {
                fruits: &["토마토", "수박", "아보카도", "바나나", "석류", "블루베리"],
                reason: "남성 건강에 중요한 라이코펜과 아연이 풍부합니다.",
                nutrients: &["라이코펜", "아연", "마그네슘"],
            },
            Condition::Female => Profile {
                fruits: &["석류", "딸기", "아보카도", "키위", "체리", "크랜베리"],
                reason: "여성 호르몬 균형과 철분 보충에 도움이 됩니다.",
                nutrients: &["철분", "엽산", "안토시아닌"],
            },
            Condition::Pregnant => Profile {
                fruits: &["아보카도", "바나나", "오렌지", "망고", "사과", "딸기"],
                reason: "태아 발달에 필요한 엽산과 비타민이 풍부합니다.",
                nutrients: &["엽산", "비타민B6", "칼슘"],
            },
            Condition::Menopause => Profile {
                fruits: &["석류", "체리", "아보카도", "블루베리", "자두", "무화과"],
                reason: "호르몬 변화에 따른 증상 완화와 뼈 건강에 도움이 됩니다.",
                nutrients: &["식물성 에스트로겐", "칼슘", "마그네슘"],
            },
            Condition::NotApplicable => Profile {
                fruits: &["사과", "바나나", "오렌지", "키위", "딸기", "포도"],
                reason: "일반적으로 건강에 도움이 되는 기본적인 과일들입니다.",
                nutrients: &["비타민C", "식이섬유", "칼륨"],
            },
        }
    }
}

// ============================================================================
// RECOMMENDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub goal: HealthGoal,
    pub age: AgeGroup,
    pub condition: Condition,
    pub goal_profile: Profile,
    pub age_profile: Profile,
    pub condition_profile: Profile,
    /// De-duplicated union of the three lists in code point order
    pub fruits: Vec<&'static str>,
}

impl Recommendation {
    /// The first `limit` fruits of the union
    pub fn top(&self, limit: usize) -> &[&'static str] {
        &self.fruits[..limit.min(self.fruits.len())]
    }

    /// (key label, profile) per table, in goal / age / condition order
    pub fn reasons(&self) -> [(&'static str, Profile); 3] {
        [
            (self.goal.label(), self.goal_profile),
            (self.age.label(), self.age_profile),
            (self.condition.label(), self.condition_profile),
        ]
    }
}

pub fn recommend(goal: HealthGoal, age: AgeGroup, condition: Condition) -> Recommendation {
    let goal_profile = goal.profile();
    let age_profile = age.profile();
    let condition_profile = condition.profile();

    let fruits: BTreeSet<&'static str> = goal_profile
        .fruits
        .iter()
        .chain(age_profile.fruits)
        .chain(condition_profile.fruits)
        .copied()
        .collect();

    Recommendation {
        goal,
        age,
        condition,
        goal_profile,
        age_profile,
        condition_profile,
        fruits: fruits.into_iter().collect(),
    }
}

/// Label-based entry point; unknown labels use each table's default key
pub fn recommend_by_labels(goal: &str, age: &str, condition: &str) -> Recommendation {
    recommend(
        HealthGoal::from_label(goal),
        AgeGroup::from_label(age),
        Condition::from_label(condition),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_contains_exactly_the_three_lists() {
        let rec = recommend_by_labels("다이어트", "성인 (20-64세)", "해당없음");

        let mut expected: Vec<&str> = HealthGoal::Diet
            .profile()
            .fruits
            .iter()
            .chain(AgeGroup::Adult.profile().fruits)
            .chain(Condition::NotApplicable.profile().fruits)
            .copied()
            .collect();
        expected.sort();
        expected.dedup();

        assert_eq!(rec.fruits, expected);
        assert_eq!(rec.fruits.len(), 11);
        assert!(rec.fruits.contains(&"자두"));
        assert!(rec.fruits.contains(&"석류"));
        assert!(rec.fruits.contains(&"포도"));
        assert!(!rec.fruits.contains(&"망고"));
    }

    #[test]
    fn test_union_is_sorted_and_deduplicated() {
        let rec = recommend(HealthGoal::Skin, AgeGroup::Teen, Condition::Pregnant);
        let mut sorted = rec.fruits.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(rec.fruits, sorted);
    }

    #[test]
    fn test_top_limits_display() {
        let rec = recommend_by_labels("다이어트", "성인 (20-64세)", "해당없음");
        assert_eq!(rec.top(DEFAULT_DISPLAY_LIMIT).len(), 6);
        assert_eq!(rec.top(DEFAULT_DISPLAY_LIMIT), &rec.fruits[..6]);
        assert_eq!(rec.top(100).len(), rec.fruits.len());
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        assert_eq!(HealthGoal::from_label("근력 강화"), HealthGoal::Immunity);
        assert_eq!(AgeGroup::from_label(""), AgeGroup::Adult);
        assert_eq!(Condition::from_label("unknown"), Condition::NotApplicable);

        let rec = recommend_by_labels("?", "?", "?");
        assert_eq!(rec.goal_profile, HealthGoal::Immunity.profile());
        assert_eq!(rec.age_profile, AgeGroup::Adult.profile());
        assert_eq!(rec.condition_profile, Condition::NotApplicable.profile());
    }

    #[test]
    fn test_labels_round_trip() {
        for goal in HealthGoal::ALL {
            assert_eq!(HealthGoal::from_label(goal.label()), goal);
        }
        for age in AgeGroup::ALL {
            assert_eq!(AgeGroup::from_label(age.label()), age);
        }
        for condition in Condition::ALL {
            assert_eq!(Condition::from_label(condition.label()), condition);
        }
    }

    #[test]
    fn test_every_profile_has_six_fruits() {
        for goal in HealthGoal::ALL {
            assert_eq!(goal.profile().fruits.len(), 6);
        }
        for age in AgeGroup::ALL {
            assert_eq!(age.profile().fruits.len(), 6);
        }
        for condition in Condition::ALL {
            assert_eq!(condition.profile().fruits.len(), 6);
        }
    }
}
