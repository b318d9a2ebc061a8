// dedupe.rs
//
// Collapses near-duplicate candidates after scoring. Records with an email
// are grouped by the lowercased address; records without one are grouped by
// company name + requested country targets. The two passes are disjoint and
// the highest-scoring representative survives in each group, first
// encountered winning ties.

use std::collections::HashSet;

use crate::models::ScoredCandidate;

fn email_key(candidate: &ScoredCandidate) -> String {
    candidate.email.trim().to_lowercase()
}

fn cc_key(candidate: &ScoredCandidate) -> String {
    format!(
        "{}|{}",
        candidate.company_name.trim().to_lowercase(),
        candidate.country_targets.join(",").trim().to_lowercase()
    )
}

/// Stable descending sort by score followed by keep-first per key.
fn keep_best<F>(mut group: Vec<ScoredCandidate>, key: F) -> Vec<ScoredCandidate>
where
    F: Fn(&ScoredCandidate) -> String,
{
    group.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    let mut seen: HashSet<String> = HashSet::new();
    group.retain(|c| seen.insert(key(c)));
    group
}

/// Deduplicates a scored candidate list, returning survivors sorted
/// descending by match score. An empty input is returned unchanged.
pub fn dedupe_candidates(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let (with_email, without_email): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| !email_key(c).is_empty());

    let mut out = keep_best(with_email, email_key);
    out.extend(keep_best(without_email, cc_key));
    out.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    out
}
