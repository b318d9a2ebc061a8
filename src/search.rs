// search.rs
//
// Pipeline orchestration: score every record in the unified table, apply
// the threshold, derive presentation contacts (domain, fallback website and
// email, contact sentinel), deduplicate and truncate.

use chrono::NaiveDate;
use log::info;

use crate::dedupe::dedupe_candidates;
use crate::models::{CanonicalBuyerRecord, ScoredCandidate, SearchParams};
use crate::scoring::{score_buyer_record, score_threshold};

/// Sentinel for a contact person the sources did not yield.
pub const CONTACT_NOT_EXTRACTED: &str = "미추출";

/// Derives a bare domain from the website when present, else from the
/// email address. Returns an empty string when neither yields one.
fn derive_domain(website: &str, email: &str) -> String {
    let site = website.trim().to_lowercase();
    if !site.is_empty() {
        let stripped = site
            .strip_prefix("https://")
            .or_else(|| site.strip_prefix("http://"))
            .unwrap_or(&site);
        return stripped.split('/').next().unwrap_or_default().to_string();
    }
    if let Some(at) = email.rfind('@') {
        return email[at + 1..].trim().to_lowercase();
    }
    String::new()
}

fn build_candidate(
    record: &CanonicalBuyerRecord,
    score: i32,
    params: &SearchParams,
) -> ScoredCandidate {
    let domain = derive_domain(&record.website, &record.email);

    let website = if !record.website.is_empty() {
        record.website.clone()
    } else if !domain.is_empty() {
        format!("https://{}", domain)
    } else {
        String::new()
    };
    let email = if !record.email.is_empty() {
        record.email.clone()
    } else if !domain.is_empty() {
        format!("info@{}", domain)
    } else {
        String::new()
    };
    let contact_person = if record.contact_person.is_empty() {
        CONTACT_NOT_EXTRACTED.to_string()
    } else {
        record.contact_person.clone()
    };

    ScoredCandidate {
        company_name: record.company_name.clone(),
        domain,
        website,
        industry: params.industry.clone(),
        country_targets: params.countries.clone(),
        email,
        contact_person,
        match_score: score,
        source: record.source.clone(),
        country: record.country.clone(),
        city: record.city.clone(),
        product_text: record.product_text.clone(),
        hs_code: record.hs_code.clone(),
        phone: record.phone.clone(),
    }
}

/// Runs the full ranking pass over the unified table. `today` anchors the
/// recency signal so results are reproducible for a fixed input.
pub fn run_search(
    records: &[CanonicalBuyerRecord],
    params: &SearchParams,
    today: NaiveDate,
) -> Vec<ScoredCandidate> {
    let hs_code = params.hs_code.trim();
    let threshold = score_threshold(hs_code);

    let mut candidates: Vec<ScoredCandidate> = records
        .iter()
        .filter_map(|record| {
            let score = score_buyer_record(
                record,
                &params.industry,
                hs_code,
                &params.countries,
                params.require_email,
                today,
            );
            (score >= threshold).then(|| build_candidate(record, score, params))
        })
        .collect();
    candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    let scored_count = candidates.len();
    let mut deduped = dedupe_candidates(candidates);
    deduped.truncate(params.max_results);
    info!(
        "Search: {} records scored, {} above threshold {}, {} after dedup/truncation",
        records.len(),
        scored_count,
        threshold,
        deduped.len()
    );
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn params() -> SearchParams {
        SearchParams {
            industry: "화장품/뷰티".to_string(),
            hs_code: String::new(),
            countries: Vec::new(),
            require_email: false,
            max_results: 60,
        }
    }

    fn record(company: &str, product: &str) -> CanonicalBuyerRecord {
        CanonicalBuyerRecord {
            company_name: company.to_string(),
            product_text: product.to_string(),
            source: "src".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn domain_from_website_strips_scheme_and_path() {
        assert_eq!(
            derive_domain("https://Acme.Example.com/shop/list", ""),
            "acme.example.com"
        );
        assert_eq!(derive_domain("http://acme.kr", ""), "acme.kr");
        assert_eq!(derive_domain("acme.kr/about", ""), "acme.kr");
    }

    #[test]
    fn domain_falls_back_to_email() {
        assert_eq!(derive_domain("", "kim@Trade.KR"), "trade.kr");
        assert_eq!(derive_domain("", "no-at-sign"), "");
    }

    #[test]
    fn contact_fallbacks_filled_from_domain() {
        let mut rec = record("Acme", "skincare serum");
        rec.website = "https://acme.kr/home".to_string();
        let out = run_search(&[rec], &params(), today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].domain, "acme.kr");
        assert_eq!(out[0].email, "info@acme.kr");
        assert_eq!(out[0].contact_person, CONTACT_NOT_EXTRACTED);
    }

    #[test]
    fn website_synthesized_from_email_domain() {
        let mut rec = record("Acme", "skincare serum");
        rec.email = "buyer@acme.kr".to_string();
        let out = run_search(&[rec], &params(), today());
        assert_eq!(out[0].website, "https://acme.kr");
        assert_eq!(out[0].email, "buyer@acme.kr");
    }

    #[test]
    fn threshold_filters_weak_matches() {
        // "skincare" scores 30, above the default threshold of 20;
        // an unrelated record scores 0 and is dropped.
        let out = run_search(
            &[record("Acme", "skincare serum"), record("Bolt Co", "steel bolts")],
            &params(),
            today(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company_name, "Acme");
    }

    #[test]
    fn hs_filter_raises_threshold() {
        // With an HS filter the threshold is 35; a keyword-only match (30)
        // no longer qualifies.
        let mut p = params();
        p.hs_code = "3304".to_string();
        let mut strong = record("Acme", "skincare serum");
        strong.hs_code = "330499".to_string();
        let weak = record("Beta", "skincare serum");
        let out = run_search(&[weak, strong], &p, today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company_name, "Acme");
        assert_eq!(out[0].match_score, 75);
    }

    #[test]
    fn results_sorted_and_truncated() {
        let mut p = params();
        p.max_results = 2;
        let mut rich = record("Rich", "skincare serum");
        rich.email = "a@rich.kr".to_string();
        rich.phone = "1".to_string();
        let mut mid = record("Mid", "skincare serum");
        mid.email = "b@mid.kr".to_string();
        let plain = record("Plain", "skincare serum");
        let out = run_search(&[plain, mid, rich], &p, today());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].company_name, "Rich");
        assert_eq!(out[1].company_name, "Mid");
    }

    #[test]
    fn candidates_carry_search_context() {
        let mut p = params();
        p.countries = vec!["Japan".to_string()];
        let mut rec = record("Acme", "skincare serum");
        rec.country = "Japan".to_string();
        let out = run_search(&[rec], &p, today());
        assert_eq!(out[0].industry, "화장품/뷰티");
        assert_eq!(out[0].country_targets, vec!["Japan".to_string()]);
        assert_eq!(out[0].match_score, 50);
    }

    #[test]
    fn empty_table_yields_empty_result() {
        assert!(run_search(&[], &params(), today()).is_empty());
    }
}
