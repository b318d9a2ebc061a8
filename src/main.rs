use anyhow::Result;
use chrono::Local;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use log::{debug, info, warn};
use std::path::PathBuf;

use buyer_match::env_loader;
use buyer_match::excel_writer;
use buyer_match::loader;
use buyer_match::models::{SearchParams, SourceStatus};
use buyer_match::scoring;
use buyer_match::search;

const COUNTRY_OPTIONS: &[&str] = &[
    "United States",
    "Canada",
    "Mexico",
    "Brazil",
    "Argentina",
    "Chile",
    "United Kingdom",
    "Germany",
    "France",
    "Italy",
    "Spain",
    "Netherlands",
    "Sweden",
    "Norway",
    "Denmark",
    "Poland",
    "Turkey",
    "Russia",
    "United Arab Emirates",
    "Saudi Arabia",
    "Qatar",
    "Kuwait",
    "South Africa",
    "Egypt",
    "Nigeria",
    "China",
    "Japan",
    "South Korea",
    "Taiwan",
    "Hong Kong",
    "Singapore",
    "Malaysia",
    "Thailand",
    "Vietnam",
    "Indonesia",
    "Philippines",
    "India",
    "Australia",
    "New Zealand",
];

#[tokio::main]
async fn main() -> Result<()> {
    env_loader::load_env();
    env_logger::init();

    info!("Starting buyer candidate search.");

    let data_dir = env_loader::data_dir();
    let resolved = loader::resolve_source_paths(data_dir.as_deref());
    for (source, path) in &resolved {
        if path.is_none() {
            warn!("Source '{}' could not be resolved to a local file", source);
        }
    }

    println!("\n📂 Loading buyer CSV sources...");
    let (records, statuses) = loader::load_sources(resolved).await;
    debug!(
        "Load status report: {}",
        serde_json::to_string(&statuses).unwrap_or_default()
    );

    let ok_sources = statuses
        .iter()
        .filter(|s| s.status == SourceStatus::Ok)
        .count();
    println!(
        "✅ {} records loaded from {}/{} sources",
        records.len(),
        ok_sources,
        statuses.len()
    );
    if records.is_empty() {
        warn!("No buyer data loaded; search will return an empty result.");
        println!("⚠️ No CSV data found. Place the source files in the project folder or data/.");
    }

    let params = run_interactive_selection()?;
    info!(
        "Search configuration: industry='{}', hs_code='{}', countries={:?}, require_email={}, max_results={}",
        params.industry, params.hs_code, params.countries, params.require_email, params.max_results
    );

    let today = Local::now().date_naive();
    let candidates = search::run_search(&records, &params, today);

    if candidates.is_empty() {
        println!("\n검색 결과가 없습니다. HS 코드를 입력하거나 산업 분야 / 국가를 바꿔보세요.");
    } else {
        println!("\n🎉 {}개의 바이어 후보를 찾았습니다!\n", candidates.len());
        for (idx, candidate) in candidates.iter().take(10).enumerate() {
            println!(
                "{:>3}. [{}점] {} ({}) — {} / {}",
                idx + 1,
                candidate.match_score,
                candidate.company_name,
                if candidate.country.is_empty() {
                    "국가 미확인"
                } else {
                    &candidate.country
                },
                candidate.email,
                candidate.source
            );
        }
        if candidates.len() > 10 {
            println!("     ... and {} more in the export file", candidates.len() - 10);
        }
    }

    let timestamp_suffix = Local::now().format("%Y%m%d%H%M%S").to_string();
    let export_file_path = PathBuf::from(format!("buyer_candidates_{}.xlsx", timestamp_suffix));
    info!("Writing results to Excel file: {:?}", export_file_path);
    excel_writer::write_excel_file(&export_file_path, &candidates, &statuses).await?;
    println!("\n📄 Export written to {:?}", export_file_path);

    Ok(())
}

/// Runs the interactive selection process for the search parameters.
fn run_interactive_selection() -> Result<SearchParams> {
    let theme = ColorfulTheme::default();

    println!("\n🏭 Select an industry:");
    let industries = scoring::industry_labels();
    let industry_selection = Select::with_theme(&theme)
        .with_prompt("산업 분야")
        .default(0)
        .items(&industries)
        .interact()?;
    let industry = industries[industry_selection].to_string();
    println!("✅ Selected industry: {}", industry);

    let hs_code: String = Input::with_theme(&theme)
        .with_prompt("HS 코드 (선택, 예: 3304, 8517)")
        .allow_empty(true)
        .interact_text()?;

    println!("\n🌍 Select target countries (space to toggle, enter to confirm):");
    let country_defaults: Vec<bool> = COUNTRY_OPTIONS.iter().map(|c| *c == "United States").collect();
    let country_selection = MultiSelect::with_theme(&theme)
        .with_prompt("타겟 국가")
        .items(COUNTRY_OPTIONS)
        .defaults(&country_defaults)
        .interact()?;
    let countries: Vec<String> = country_selection
        .into_iter()
        .map(|i| COUNTRY_OPTIONS[i].to_string())
        .collect();
    println!("✅ Selected countries: {:?}", countries);

    let require_email = Confirm::with_theme(&theme)
        .with_prompt("📧 이메일 있는 후보만")
        .default(false)
        .interact()?;

    let max_results: usize = Input::with_theme(&theme)
        .with_prompt("최대 후보 수")
        .default(60)
        .interact_text()?;

    Ok(SearchParams {
        industry,
        hs_code: hs_code.trim().to_string(),
        countries,
        require_email,
        max_results,
    })
}
