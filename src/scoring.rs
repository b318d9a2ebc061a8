// scoring.rs
//
// Additive relevance scoring for buyer candidates. The score is a sum of
// independent signals clamped to [-999, 100]; the -999 email gate is large
// enough to sink any record below a realistic threshold without a separate
// rejection path.

use chrono::NaiveDate;

use crate::models::CanonicalBuyerRecord;

pub const SCORE_MIN: i32 = -999;
pub const SCORE_MAX: i32 = 100;

/// Industry label to lowercase keyword substrings matched against
/// product text and company name.
pub const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "화장품/뷰티",
        &[
            "cosmetics", "beauty", "skincare", "skin care", "makeup", "personal care", "lotion",
            "cream", "serum", "toner", "cleanser", "sunscreen", "mask", "fragrance", "k-beauty",
            "kbeauty",
        ],
    ),
    (
        "전자제품",
        &[
            "electronics", "electronic", "device", "gadget", "semiconductor", "chip", "display",
            "battery", "charger", "adapter", "smart", "iot", "sensor", "led",
        ],
    ),
    (
        "식품",
        &[
            "food", "beverage", "snack", "drink", "coffee", "tea", "sauce", "noodle", "ramen",
            "instant", "frozen", "seafood", "meat", "fruit",
        ],
    ),
    (
        "섬유/의류",
        &[
            "apparel", "clothing", "garment", "textile", "fabric", "fashion", "yarn", "cotton",
            "polyester", "knit", "denim", "outerwear", "sportswear",
        ],
    ),
    (
        "자동차 부품",
        &[
            "auto", "automotive", "car", "vehicle", "spare parts", "parts", "engine", "brake",
            "filter", "tire", "tyre", "transmission", "sensor",
        ],
    ),
    (
        "기계/설비",
        &[
            "machinery", "equipment", "industrial", "manufacturing", "factory", "pump", "valve",
            "compressor", "tool", "robot", "automation", "cnc",
        ],
    ),
    (
        "의료기기",
        &[
            "medical", "healthcare", "diagnostic", "surgical", "hospital", "clinic", "monitor",
            "disposable", "sterile",
        ],
    ),
    ("기타", &["import", "export", "trade", "sourcing", "procurement"]),
];

/// Static reliability/richness bias per source file.
const SOURCE_WEIGHT: &[(&str, i32)] = &[
    ("중진공_해외바이어구매오퍼_20241231", 6),
    ("중진공_해외바이어인콰이어리_20241230", 6),
    ("무보_화장품바이어_20200812", 8),
    ("중진공_고비즈코리아거래처_20250523", 2),
    ("KOTRA_해외바이어현황_20240829", -5),
];

pub fn industry_labels() -> Vec<&'static str> {
    INDUSTRY_KEYWORDS.iter().map(|(label, _)| *label).collect()
}

pub fn industry_keywords(industry: &str) -> &'static [&'static str] {
    INDUSTRY_KEYWORDS
        .iter()
        .find(|(label, _)| *label == industry)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

pub fn source_weight(source: &str) -> i32 {
    SOURCE_WEIGHT
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, w)| *w)
        .unwrap_or(0)
}

/// Score threshold applied by callers before deduplication: stricter when
/// an HS-code filter narrows the search.
pub fn score_threshold(hs_code: &str) -> i32 {
    if hs_code.trim().is_empty() {
        20
    } else {
        35
    }
}

/// Computes the match score for one record. Pure and order-independent
/// across records; `today` is passed in so the recency signal is
/// deterministic under test.
pub fn score_buyer_record(
    record: &CanonicalBuyerRecord,
    industry: &str,
    hs_code: &str,
    countries_selected: &[String],
    require_email: bool,
    today: NaiveDate,
) -> i32 {
    let mut score = 0i32;
    let prod = record.product_text.to_lowercase();
    let comp = record.company_name.to_lowercase();
    let hs: String = record.hs_code.chars().filter(|c| *c != ' ').collect();
    let country = record.country.to_lowercase();

    let keywords = industry_keywords(industry);
    if keywords.iter().any(|kw| prod.contains(kw)) {
        score += 30;
    }
    if keywords.iter().any(|kw| comp.contains(kw)) {
        score += 10;
    }

    let hs_filter: String = hs_code.chars().filter(|c| *c != ' ').collect();
    if !hs_filter.is_empty() && hs.contains(&hs_filter) {
        score += 45;
    }

    if !countries_selected.is_empty() {
        let matched = countries_selected
            .iter()
            .filter(|c| !c.is_empty())
            .any(|c| country.contains(&c.to_lowercase()));
        if matched {
            score += 20;
        } else {
            score -= 15;
        }
    }

    if !record.email.is_empty() {
        score += 20;
    }
    if !record.contact_person.is_empty() {
        score += 8;
    }
    if !record.phone.is_empty() {
        score += 6;
    }
    if !record.website.is_empty() {
        score += 6;
    }

    if require_email && record.email.is_empty() {
        score -= 999;
    }

    if let Some(date) = record.date {
        let days_ago = (today - date).num_days();
        if days_ago <= 90 {
            score += 10;
        } else if days_ago <= 365 {
            score += 5;
        }
    }

    score += source_weight(&record.source);
    score.clamp(SCORE_MIN, SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn base_record() -> CanonicalBuyerRecord {
        CanonicalBuyerRecord {
            company_name: "Acme".to_string(),
            product_text: "K-Beauty Skincare Set".to_string(),
            source: "unknown_source".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn industry_match_on_product_text_only() {
        let score = score_buyer_record(&base_record(), "화장품/뷰티", "", &[], false, today());
        assert_eq!(score, 30);
    }

    #[test]
    fn industry_match_on_product_and_company() {
        let mut rec = base_record();
        rec.company_name = "Acme K-Beauty".to_string();
        let score = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        assert_eq!(score, 40);
    }

    #[test]
    fn require_email_gate_applies_unconditionally() {
        let mut rec = base_record();
        rec.company_name = "Acme K-Beauty".to_string();
        let score = score_buyer_record(&rec, "화장품/뷰티", "", &[], true, today());
        assert_eq!(score, 40 - 999);

        // Gate never fires when the record has an email.
        rec.email = "buyer@x.com".to_string();
        let gated = score_buyer_record(&rec, "화장품/뷰티", "", &[], true, today());
        let ungated = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        assert_eq!(gated, ungated);
    }

    #[test]
    fn empty_country_penalized_when_filter_active() {
        let rec = base_record();
        let without_filter = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        let with_filter = score_buyer_record(
            &rec,
            "화장품/뷰티",
            "",
            &["Germany".to_string()],
            false,
            today(),
        );
        assert_eq!(with_filter, without_filter - 15);
    }

    #[test]
    fn country_match_is_substring_and_case_insensitive() {
        let mut rec = base_record();
        rec.country = "United States of America".to_string();
        let score = score_buyer_record(
            &rec,
            "화장품/뷰티",
            "",
            &["united states".to_string()],
            false,
            today(),
        );
        assert_eq!(score, 30 + 20);
    }

    #[test]
    fn hs_code_match_ignores_internal_whitespace() {
        let mut rec = base_record();
        rec.hs_code = "3304 99".to_string();
        let score = score_buyer_record(&rec, "화장품/뷰티", "33 04", &[], false, today());
        assert_eq!(score, 30 + 45);

        // Non-matching filter adds nothing.
        let score = score_buyer_record(&rec, "화장품/뷰티", "8517", &[], false, today());
        assert_eq!(score, 30);
    }

    #[test]
    fn contact_completeness_bonuses_are_independent() {
        let mut rec = base_record();
        rec.email = "buyer@x.com".to_string();
        rec.contact_person = "Kim".to_string();
        rec.phone = "+82-2-1234".to_string();
        rec.website = "https://acme.example".to_string();
        let score = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        assert_eq!(score, 30 + 20 + 8 + 6 + 6);
    }

    #[test]
    fn recency_bonus_tiers() {
        let mut rec = base_record();
        rec.date = Some(today() - chrono::Duration::days(30));
        assert_eq!(
            score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today()),
            40
        );
        rec.date = Some(today() - chrono::Duration::days(200));
        assert_eq!(
            score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today()),
            35
        );
        rec.date = Some(today() - chrono::Duration::days(400));
        assert_eq!(
            score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today()),
            30
        );
    }

    #[test]
    fn source_weight_applied_with_default_zero() {
        let mut rec = base_record();
        rec.source = "무보_화장품바이어_20200812".to_string();
        assert_eq!(
            score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today()),
            38
        );
        rec.source = "KOTRA_해외바이어현황_20240829".to_string();
        assert_eq!(
            score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today()),
            25
        );
    }

    #[test]
    fn unknown_industry_matches_nothing() {
        let score = score_buyer_record(&base_record(), "없는 산업", "", &[], false, today());
        assert_eq!(score, 0);
    }

    #[test]
    fn score_is_clamped_to_bounds() {
        // Everything negative at once still floors at -999.
        let rec = CanonicalBuyerRecord {
            source: "KOTRA_해외바이어현황_20240829".to_string(),
            ..Default::default()
        };
        let score = score_buyer_record(
            &rec,
            "화장품/뷰티",
            "",
            &["Germany".to_string()],
            true,
            today(),
        );
        assert_eq!(score, SCORE_MIN);

        // A fully loaded record caps at 100.
        let rec = CanonicalBuyerRecord {
            company_name: "K-Beauty Trading".to_string(),
            product_text: "skincare serum".to_string(),
            hs_code: "330499".to_string(),
            country: "Germany".to_string(),
            email: "a@b.com".to_string(),
            contact_person: "Kim".to_string(),
            phone: "1".to_string(),
            website: "w".to_string(),
            date: Some(today()),
            source: "무보_화장품바이어_20200812".to_string(),
            ..Default::default()
        };
        let score = score_buyer_record(
            &rec,
            "화장품/뷰티",
            "3304",
            &["Germany".to_string()],
            false,
            today(),
        );
        assert_eq!(score, SCORE_MAX);
    }

    #[test]
    fn scoring_is_deterministic() {
        let rec = base_record();
        let a = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        let b = score_buyer_record(&rec, "화장품/뷰티", "", &[], false, today());
        assert_eq!(a, b);
    }

    #[test]
    fn threshold_depends_on_hs_filter() {
        assert_eq!(score_threshold(""), 20);
        assert_eq!(score_threshold("   "), 20);
        assert_eq!(score_threshold("3304"), 35);
    }
}
