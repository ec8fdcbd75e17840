//! Job posting and application models.

use serde::{Deserialize, Serialize};

/// Where the work happens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkArrangement {
    Remote,
    #[default]
    OnSite,
    Hybrid,
}

impl WorkArrangement {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkArrangement::Remote => "remote",
            WorkArrangement::OnSite => "on_site",
            WorkArrangement::Hybrid => "hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "remote" => Some(WorkArrangement::Remote),
            "on_site" => Some(WorkArrangement::OnSite),
            "hybrid" => Some(WorkArrangement::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisaSponsorship {
    Yes,
    #[default]
    No,
}

impl VisaSponsorship {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisaSponsorship::Yes => "yes",
            VisaSponsorship::No => "no",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(VisaSponsorship::Yes),
            "no" => Some(VisaSponsorship::No),
            _ => None,
        }
    }
}

/// A job posting. `skills` is free text, comma separated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub city: String,
    pub state: String,
    pub remote_or_on_site: WorkArrangement,
    pub visa_sponsorship: VisaSponsorship,
    pub posted_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for posting a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    pub skills: String,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub remote_or_on_site: WorkArrangement,
    #[serde(default)]
    pub visa_sponsorship: VisaSponsorship,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Review,
    Interview,
    Offer,
    Closed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Review => "review",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(ApplicationStatus::Applied),
            "review" => Some(ApplicationStatus::Review),
            "interview" => Some(ApplicationStatus::Interview),
            "offer" => Some(ApplicationStatus::Offer),
            "closed" => Some(ApplicationStatus::Closed),
            _ => None,
        }
    }
}

/// A seeker's application to a job. One per (job, applicant).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub applied_at: String,
    pub updated_at: String,
}

/// An application listed together with the job title and applicant name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub company: String,
    pub applicant_username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Request body for moving an application through the hiring workflow.
/// The status is kept as text so an unknown value gets a validation error.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: String,
}
