// normalize.rs
//
// Schema normalization for heterogeneous buyer-lead CSVs: keyword-based
// column inference, country recovery from free text, and lenient date
// parsing. Column binding is resolved once per source file into a fixed
// index map, then applied row-wise.

use chrono::format::{parse as chrono_parse, Parsed, StrftimeItems};
use chrono::NaiveDate;
use csv::StringRecord;

use crate::models::CanonicalBuyerRecord;

/// Ordered keyword lists for each canonical field. For every field the
/// first column whose normalized header contains any of the keywords wins.
const COMPANY_KEYWORDS: &[&str] = &[
    "상호명", "회사", "기업", "업체", "buyer", "company", "corporation", "기관명", "조직",
];
const TITLE_KEYWORDS: &[&str] = &["제목", "title"];
const ITEM_KEYWORDS: &[&str] = &[
    "품목명", "품목", "제품", "item", "product", "카테고리", "category", "오퍼", "inquiry",
];
const COUNTRY_KEYWORDS: &[&str] = &["국가명", "국가", "country", "nation", "소재국", "거주국"];
const CITY_KEYWORDS: &[&str] = &["도시", "city", "영문도시", "영문시군구", "시군구", "소재지"];
const HS_KEYWORDS: &[&str] = &["hs", "hscode", "hs코드", "품목코드", "세번"];
const CONTACT_KEYWORDS: &[&str] = &["담당자", "contact", "name", "성명", "대표자"];
const EMAIL_KEYWORDS: &[&str] = &["이메일", "email", "e-mail", "메일"];
const PHONE_KEYWORDS: &[&str] = &["전화", "phone", "tel", "연락처", "mobile", "핸드폰"];
const WEBSITE_KEYWORDS: &[&str] = &["웹", "홈페이지", "website", "url", "domain", "사이트"];
const ADDRESS_KEYWORDS: &[&str] = &["주소", "기본주소", "address"];
const DATE_KEYWORDS: &[&str] = &[
    "상담일", "신청시작일", "신청종료일", "등록", "신청", "일자", "날짜", "date", "created",
    "updated",
];

/// Substring-to-country hints for recovering a country from address,
/// website or email text. Order matters: first match wins.
const COUNTRY_HINTS: &[(&str, &str)] = &[
    ("united states", "United States"),
    ("usa", "United States"),
    ("u.s.", "United States"),
    ("canada", "Canada"),
    ("japan", "Japan"),
    ("korea", "South Korea"),
    ("republic of korea", "South Korea"),
    ("china", "China"),
    ("vietnam", "Vietnam"),
    ("singapore", "Singapore"),
    ("hong kong", "Hong Kong"),
    ("taiwan", "Taiwan"),
    ("uk", "United Kingdom"),
    ("united kingdom", "United Kingdom"),
    ("germany", "Germany"),
    ("france", "France"),
    ("italy", "Italy"),
    ("spain", "Spain"),
    ("australia", "Australia"),
    ("india", "India"),
    ("u.a.e", "United Arab Emirates"),
    ("uae", "United Arab Emirates"),
    ("saudi", "Saudi Arabia"),
];

const DATE_FORMATS_FULL: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"];
const DATE_FORMATS_YEAR_MONTH: &[&str] = &["%Y-%m", "%Y.%m", "%Y/%m"];

/// Fixed column-index binding for one source table, resolved from its
/// headers once and then applied to every row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub company: Option<usize>,
    pub title: Option<usize>,
    pub item: Option<usize>,
    pub country: Option<usize>,
    pub city: Option<usize>,
    pub hs_code: Option<usize>,
    pub contact: Option<usize>,
    pub email: Option<usize>,
    pub phone: Option<usize>,
    pub website: Option<usize>,
    pub address: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnMap {
    /// Infers the binding from raw column headers. Headers are compared
    /// case/whitespace/punctuation-insensitively; the first column in header
    /// order containing a keyword is bound. Unmatched fields stay unbound
    /// and yield empty strings for every row.
    pub fn infer(headers: &[String]) -> Self {
        let normed: Vec<String> = headers.iter().map(|h| norm_header(h)).collect();
        ColumnMap {
            company: infer_col(&normed, COMPANY_KEYWORDS),
            title: infer_col(&normed, TITLE_KEYWORDS),
            item: infer_col(&normed, ITEM_KEYWORDS),
            country: infer_col(&normed, COUNTRY_KEYWORDS),
            city: infer_col(&normed, CITY_KEYWORDS),
            hs_code: infer_col(&normed, HS_KEYWORDS),
            contact: infer_col(&normed, CONTACT_KEYWORDS),
            email: infer_col(&normed, EMAIL_KEYWORDS),
            phone: infer_col(&normed, PHONE_KEYWORDS),
            website: infer_col(&normed, WEBSITE_KEYWORDS),
            address: infer_col(&normed, ADDRESS_KEYWORDS),
            date: infer_col(&normed, DATE_KEYWORDS),
        }
    }
}

/// Lowercases a header and strips whitespace, `-` and `_` so that
/// "HS Code", "hs_code" and "HS-CODE" all compare equal.
fn norm_header(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

fn infer_col(normed_headers: &[String], keywords: &[&str]) -> Option<usize> {
    for (idx, header) in normed_headers.iter().enumerate() {
        for kw in keywords {
            if header.contains(kw) {
                return Some(idx);
            }
        }
    }
    None
}

/// Fetches a bound field from a row, trimmed; unbound or short rows yield
/// an empty string.
fn field(row: &StringRecord, col: Option<usize>) -> String {
    col.and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Parses a date against the fixed format cascade. Month-only formats
/// resolve to the first day of the month. Malformed or empty input yields
/// `None`, never an error.
pub fn parse_date_any(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS_FULL {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    for fmt in DATE_FORMATS_YEAR_MONTH {
        let mut parsed = Parsed::new();
        if chrono_parse(&mut parsed, t, StrftimeItems::new(fmt)).is_ok()
            && parsed.set_day(1).is_ok()
        {
            if let Ok(d) = parsed.to_naive_date() {
                return Some(d);
            }
        }
    }
    None
}

/// Scans free text (address, website, email) for a country hint. Returns
/// an empty string when nothing matches.
pub fn guess_country_from_text(text: &str) -> &'static str {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return "";
    }
    for (hint, country) in COUNTRY_HINTS {
        if t.contains(hint) {
            return country;
        }
    }
    ""
}

/// Produces one canonical record from a raw row using a pre-resolved
/// column binding, tagged with its source identifier.
pub fn normalize_row(map: &ColumnMap, row: &StringRecord, source: &str) -> CanonicalBuyerRecord {
    let title = field(row, map.title);
    let item = field(row, map.item);

    let mut company_name = field(row, map.company);
    if company_name.is_empty() {
        let synth = if !title.is_empty() { &title } else { &item };
        company_name = if synth.is_empty() {
            "Unknown Company".to_string()
        } else {
            format!("Inquiry/Offer: {}", synth)
        };
    }

    let address = field(row, map.address);
    let website = field(row, map.website);
    let email = field(row, map.email);

    // Country inference is strictly a fallback; an explicit value is
    // never overwritten.
    let mut country = field(row, map.country);
    if country.is_empty() {
        for text in [&address, &website, &email] {
            let guessed = guess_country_from_text(text);
            if !guessed.is_empty() {
                country = guessed.to_string();
                break;
            }
        }
    }

    let product_text = [item.as_str(), title.as_str()]
        .iter()
        .filter(|x| !x.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    let date_raw = field(row, map.date);

    CanonicalBuyerRecord {
        company_name,
        country,
        city: field(row, map.city),
        product_text,
        hs_code: field(row, map.hs_code),
        contact_person: field(row, map.contact),
        email,
        phone: field(row, map.phone),
        website,
        address,
        date: parse_date_any(&date_raw),
        date_raw,
        source: source.to_string(),
    }
}
