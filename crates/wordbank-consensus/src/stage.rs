//! Curriculum stage lookup by book name.

use wordbank_pos::normalize_book_name;

pub const FALLBACK_STAGE: u8 = 3;
pub const FALLBACK_STAGE_LABEL: &str = "HS_Core";
pub const FALLBACK_BOOK_RANK: u32 = 999;

#[derive(Clone, Debug, PartialEq)]
pub struct StageRule {
    pub stage: u8,
    pub label: String,
    /// Book-name keywords; a keyword's 1-based position is the book rank.
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageAssignment {
    pub stage: u8,
    pub label: String,
    pub book_rank: u32,
}

/// Ordered keyword table; the first rule with a matching keyword wins.
#[derive(Clone, Debug)]
pub struct StageRules {
    rules: Vec<StageRule>,
}

impl StageRules {
    pub fn new(rules: Vec<StageRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[StageRule] {
        &self.rules
    }

    /// Match keywords against the book name after both are passed through
    /// [`normalize_book_name`], so spacing and punctuation variants agree.
    pub fn classify(&self, book: &str) -> StageAssignment {
        let book_key = normalize_book_name(book);
        for rule in &self.rules {
            for (idx, keyword) in rule.keywords.iter().enumerate() {
                let keyword_key = normalize_book_name(keyword);
                if !keyword_key.is_empty() && book_key.contains(&keyword_key) {
                    return StageAssignment {
                        stage: rule.stage,
                        label: rule.label.clone(),
                        book_rank: idx as u32 + 1,
                    };
                }
            }
        }
        StageAssignment {
            stage: FALLBACK_STAGE,
            label: FALLBACK_STAGE_LABEL.to_string(),
            book_rank: FALLBACK_BOOK_RANK,
        }
    }
}

impl Default for StageRules {
    fn default() -> Self {
        let rule = |stage: u8, label: &str, keywords: &[&str]| StageRule {
            stage,
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        Self::new(vec![
            rule(
                1,
                "JHS_Foundation",
                &["英検 5級", "英検 4級", "英検 3級", "速読英単語 中学版", "英単語ターゲット1200", "ユメタン黄"],
            ),
            rule(
                2,
                "HS_Basic",
                &[
                    "英検 準2級",
                    "英検 準2級 プラス",
                    "システム英単語 BASIC",
                    "英単語ターゲット1400",
                    "速読英単語 入門編",
                    "英単語Stock3000",
                    "ユメタン赤",
                    "英熟語ターゲット1000",
                ],
            ),
            rule(
                3,
                "HS_Core",
                &[
                    "英検 2級",
                    "システム英単語 5訂版",
                    "英単語ターゲット1900",
                    "DUO3.0",
                    "必携英単語LEAP",
                    "速読英単語 必修編",
                    "英単語Stock4500",
                    "ユメタン青",
                    "チャンクで英単語 Standard",
                ],
            ),
            rule(
                4,
                "HS_Advanced",
                &[
                    "英検 準1級",
                    "英検準1級単熟語EX",
                    "英検 1級",
                    "TOEFL",
                    "TOEIC",
                    "話題別英単語リンガメタリカ",
                    "速読英単語 上級編",
                    "鉄緑会",
                    "コーパス4500",
                    "ユメジュク",
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_and_rank() {
        let rules = StageRules::default();
        let a = rules.classify("英単語ターゲット1400 4訂版");
        assert_eq!((a.stage, a.label.as_str(), a.book_rank), (2, "HS_Basic", 4));

        let duo = rules.classify("DUO 3.0");
        assert_eq!((duo.stage, duo.book_rank), (3, 4));
    }

    #[test]
    fn grade_names_do_not_bleed_into_each_other() {
        let rules = StageRules::default();
        assert_eq!(rules.classify("英検 準2級 でる順パス単").stage, 2);
        assert_eq!(rules.classify("英検 2級 でる順パス単").stage, 3);
        assert_eq!(rules.classify("英検 準1級 でる順パス単").stage, 4);
    }

    #[test]
    fn unknown_books_fall_back_to_core() {
        let a = StageRules::default().classify("自作リスト");
        assert_eq!(
            a,
            StageAssignment {
                stage: FALLBACK_STAGE,
                label: FALLBACK_STAGE_LABEL.into(),
                book_rank: FALLBACK_BOOK_RANK
            }
        );
    }
}
