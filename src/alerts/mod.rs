//! Saved-search alerts: re-run every active search, record new matches in the
//! notification ledger and mail the owning recruiter.

use serde::Serialize;

use crate::db::Repository;
use crate::errors::AppError;
use crate::matching::{diff_saved_search, RankedCandidate};
use crate::models::{CandidateProfile, SavedSearch, User};
use crate::notify::{EmailMessage, Mailer};

/// Matches listed in one email.
pub const EMAIL_MATCH_LIMIT: usize = 10;
/// Skills listed per match in one email.
pub const EMAIL_SKILL_LIMIT: usize = 5;

/// A candidate matching a saved search, with its skill score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    pub score: Option<usize>,
}

impl From<RankedCandidate<'_>> for CandidateMatch {
    fn from(ranked: RankedCandidate<'_>) -> Self {
        Self {
            profile: ranked.profile.clone(),
            score: ranked.score,
        }
    }
}

/// Current and not-yet-notified matches for one saved search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatches {
    pub current: Vec<CandidateMatch>,
    pub new: Vec<CandidateMatch>,
}

/// Evaluate a saved search against an already-loaded candidate pool.
pub async fn evaluate_search(
    repo: &Repository,
    search: &SavedSearch,
    pool: &[CandidateProfile],
) -> Result<SearchMatches, AppError> {
    let notified = repo.notified_candidate_ids(&search.id).await?;
    let diff = diff_saved_search(search, pool, &notified);
    tracing::debug!(
        search_id = %search.id,
        current = diff.match_count(),
        new = diff.new_match_count(),
        "Evaluated saved search"
    );

    Ok(SearchMatches {
        current: diff.current.into_iter().map(CandidateMatch::from).collect(),
        new: diff.new.into_iter().map(CandidateMatch::from).collect(),
    })
}

/// Every candidate currently matching the search.
pub async fn current_matches(
    repo: &Repository,
    search: &SavedSearch,
) -> Result<Vec<CandidateMatch>, AppError> {
    let pool = repo.list_candidate_pool().await?;
    Ok(evaluate_search(repo, search, &pool).await?.current)
}

/// Current matches with no ledger row yet. Empty for an inactive search.
pub async fn new_matches(
    repo: &Repository,
    search: &SavedSearch,
) -> Result<Vec<CandidateMatch>, AppError> {
    let pool = repo.list_candidate_pool().await?;
    Ok(evaluate_search(repo, search, &pool).await?.new)
}

/// Add a ledger row per match, then stamp the search as checked.
/// Returns how many rows were newly inserted.
pub async fn record_notifications(
    repo: &Repository,
    search: &SavedSearch,
    matches: &[CandidateMatch],
) -> Result<usize, AppError> {
    let mut inserted = 0;
    for candidate in matches {
        if repo
            .record_notification(&search.id, &candidate.profile.user_id)
            .await?
        {
            inserted += 1;
        }
    }
    repo.touch_last_checked(&search.id).await?;
    Ok(inserted)
}

/// Read-only view of one saved search's matches, as printed by
/// `check-matches --search`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub search_id: String,
    pub name: String,
    pub is_active: bool,
    pub last_checked: Option<String>,
    pub current_matches: Vec<CandidateMatch>,
    pub new_matches: Vec<CandidateMatch>,
}

/// Report current and new matches for one saved search without touching the
/// ledger.
pub async fn report_search(repo: &Repository, search_id: &str) -> Result<SearchReport, AppError> {
    let search = repo
        .get_saved_search(search_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Saved search {} not found", search_id)))?;

    let current = current_matches(repo, &search).await?;
    let new = new_matches(repo, &search).await?;

    Ok(SearchReport {
        search_id: search.id,
        name: search.name,
        is_active: search.is_active,
        last_checked: search.last_checked,
        current_matches: current,
        new_matches: new,
    })
}

/// Batch run settings.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub dry_run: bool,
    pub site_url: String,
    pub mail_from: Option<String>,
}

/// Totals reported at the end of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub searches_checked: usize,
    pub total_new_matches: usize,
    pub notifications_recorded: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub searches_failed: usize,
}

/// Build the alert email for a recruiter, or `None` if they have no address.
pub fn compose_match_email(
    recruiter: &User,
    search: &SavedSearch,
    matches: &[CandidateMatch],
    options: &CheckOptions,
) -> Option<EmailMessage> {
    let to = recruiter.email.as_deref().filter(|e| !e.trim().is_empty())?;

    let mut lines = vec![
        format!("Hello {},", recruiter.username),
        String::new(),
        format!(
            "We found {} new candidate(s) matching your saved search \"{}\".",
            matches.len(),
            search.name
        ),
        String::new(),
        "New matches:".to_string(),
    ];

    for (i, candidate) in matches.iter().take(EMAIL_MATCH_LIMIT).enumerate() {
        let profile = &candidate.profile;
        lines.push(format!("{}. {} - {}", i + 1, profile.username, profile.headline));
        if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
            lines.push(format!("   Location: {}", location));
        }
        if !profile.skills.is_empty() {
            let skills: Vec<&str> = profile.skill_names().take(EMAIL_SKILL_LIMIT).collect();
            lines.push(format!("   Skills: {}", skills.join(", ")));
        }
        lines.push(String::new());
    }

    if matches.len() > EMAIL_MATCH_LIMIT {
        lines.push(format!(
            "... and {} more match(es)",
            matches.len() - EMAIL_MATCH_LIMIT
        ));
        lines.push(String::new());
    }

    lines.extend([
        "View all matches:".to_string(),
        format!(
            "{}/saved-searches/{}",
            options.site_url.trim_end_matches('/'),
            search.id
        ),
        String::new(),
        "---".to_string(),
        "JobFinder".to_string(),
    ]);

    Some(EmailMessage {
        from: options.mail_from.clone(),
        to: to.to_string(),
        subject: format!("[JobFinder] New matches for your saved search: {}", search.name),
        body: lines.join("\n"),
    })
}

/// Check every active saved search for new matches.
///
/// Searches are processed independently: a storage or delivery failure for
/// one search is logged and counted, and the loop moves on.
pub async fn check_new_matches(
    repo: &Repository,
    mailer: &dyn Mailer,
    options: &CheckOptions,
) -> Result<CheckSummary, AppError> {
    let searches = repo.list_active_saved_searches().await?;
    let mut summary = CheckSummary::default();

    if searches.is_empty() {
        tracing::warn!("No active saved searches found");
        return Ok(summary);
    }

    let pool = repo.list_candidate_pool().await?;

    for search in &searches {
        summary.searches_checked += 1;
        if let Err(e) = check_one(repo, mailer, options, search, &pool, &mut summary).await {
            summary.searches_failed += 1;
            tracing::error!(search_id = %search.id, error = %e, "Saved search check failed");
        }
    }

    tracing::info!(
        searches = summary.searches_checked,
        new_matches = summary.total_new_matches,
        recorded = summary.notifications_recorded,
        emails_sent = summary.emails_sent,
        emails_failed = summary.emails_failed,
        failed = summary.searches_failed,
        dry_run = options.dry_run,
        "Saved search check complete"
    );

    Ok(summary)
}

async fn check_one(
    repo: &Repository,
    mailer: &dyn Mailer,
    options: &CheckOptions,
    search: &SavedSearch,
    pool: &[CandidateProfile],
    summary: &mut CheckSummary,
) -> Result<(), AppError> {
    let matches = evaluate_search(repo, search, pool).await?;
    let fresh = matches.new;
    summary.total_new_matches += fresh.len();

    tracing::info!(
        search_id = %search.id,
        name = %search.name,
        current = matches.current.len(),
        new = fresh.len(),
        "Checked saved search"
    );

    if options.dry_run {
        if !fresh.is_empty() {
            tracing::info!(search_id = %search.id, "Dry run: would record notifications and send email");
        }
        return Ok(());
    }

    summary.notifications_recorded += record_notifications(repo, search, &fresh).await?;

    if fresh.is_empty() {
        return Ok(());
    }

    let recruiter = repo.get_user(&search.recruiter_id).await?;
    let message = recruiter
        .as_ref()
        .and_then(|r| compose_match_email(r, search, &fresh, options));

    match message {
        Some(message) => match mailer.send(&message).await {
            Ok(()) => {
                summary.emails_sent += 1;
                tracing::info!(search_id = %search.id, to = %message.to, "Notification email sent");
            }
            Err(e) => {
                summary.emails_failed += 1;
                tracing::error!(search_id = %search.id, error = %e, "Failed to send notification email");
            }
        },
        None => {
            tracing::debug!(search_id = %search.id, "Recruiter has no email address");
        }
    }

    Ok(())
}
