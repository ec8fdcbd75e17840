//! Database repository for users, profiles, jobs and saved searches.
//!
//! Uses prepared statements and transactions for data integrity.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::{is_unique_violation, AppError};
use crate::geo::ApplicantPoint;
use crate::matching::normalize_skill;
use crate::models::{
    Application, ApplicationStatus, ApplicationSummary, ApplyRequest, CandidateProfile,
    CreateJobRequest, CreateSavedSearchRequest, CreateUserRequest, Education, Job, Project, Role,
    SavedSearch, SearchMatchNotification, Skill, SkillMode, UpsertProfileRequest, User,
    VisaSponsorship, WorkArrangement, WorkExperience,
};

const PROFILE_SELECT: &str = r#"SELECT p.user_id, u.username, u.email, p.headline, p.bio,
                  p.location, p.latitude, p.longitude, p.is_public, p.updated_at
           FROM profiles p JOIN users u ON u.id = p.user_id"#;

const JOB_COLUMNS: &str = r#"id, title, company, description, skills, salary, location,
                  latitude, longitude, city, state, remote_or_on_site, visa_sponsorship,
                  posted_by, created_at, updated_at"#;

const APPLICATION_SUMMARY_SELECT: &str = r#"SELECT a.id, a.job_id, a.applicant_id, a.status,
                  a.cover_letter, a.applied_at, a.updated_at,
                  j.title AS job_title, j.company, u.username AS applicant_username
           FROM applications a
           JOIN jobs j ON j.id = a.job_id
           JOIN users u ON u.id = a.applicant_id"#;

const SAVED_SEARCH_COLUMNS: &str =
    "id, recruiter_id, name, location, keyword, mode, is_active, created_at, last_checked";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Register a user. Usernames are unique.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let username = request.username.trim().to_string();

        sqlx::query(
            "INSERT INTO users (id, username, email, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&username)
        .bind(&request.email)
        .bind(request.role.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Username {} is already taken", username))
            } else {
                e.into()
            }
        })?;

        Ok(User {
            id,
            username,
            email: request.email.clone(),
            role: request.role,
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, username, email, role, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    // ==================== SKILL OPERATIONS ====================

    /// List all skills.
    pub async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM skills ORDER BY name_key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(skill_from_row).collect())
    }

    /// Look up existing skills by their normalized name.
    /// Returns the skills found and the names that do not exist.
    pub async fn find_skills(&self, names: &[String]) -> Result<(Vec<Skill>, Vec<String>), AppError> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        let mut seen = HashSet::new();

        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let key = normalize_skill(name);
            if !seen.insert(key.clone()) {
                continue;
            }
            let row = sqlx::query("SELECT id, name FROM skills WHERE name_key = ?")
                .bind(&key)
                .fetch_optional(&self.pool)
                .await?;
            match row {
                Some(row) => found.push(skill_from_row(&row)),
                None => missing.push(name.to_string()),
            }
        }

        Ok((found, missing))
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Get a profile by owning user ID, with skills and projects.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<CandidateProfile>, AppError> {
        let sql = format!("{} WHERE p.user_id = ?", PROFILE_SELECT);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut profiles = vec![profile_from_row(&row)];
        self.prefetch_relations(&mut profiles, Some(user_id)).await?;
        Ok(profiles.pop())
    }

    /// Every public seeker profile, ordered by username, with skills and
    /// projects prefetched.
    pub async fn list_candidate_pool(&self) -> Result<Vec<CandidateProfile>, AppError> {
        let sql = format!(
            "{} WHERE u.role = 'seeker' AND p.is_public = 1 ORDER BY u.username",
            PROFILE_SELECT
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut profiles: Vec<CandidateProfile> = rows.iter().map(profile_from_row).collect();
        self.prefetch_relations(&mut profiles, None).await?;
        Ok(profiles)
    }

    /// Create or update the caller's profile.
    ///
    /// Skills and the project, education and work experience lists in the
    /// request are the desired final state. Only the differences are written,
    /// all inside one transaction: unknown skill names are created, entries
    /// with an `id` are updated in place, entries without one are inserted,
    /// and stored entries missing from the request are removed.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        request: &UpsertProfileRequest,
    ) -> Result<CandidateProfile, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO profiles (user_id, headline, bio, location, latitude, longitude, is_public, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   headline = excluded.headline,
                   bio = excluded.bio,
                   location = excluded.location,
                   latitude = excluded.latitude,
                   longitude = excluded.longitude,
                   is_public = excluded.is_public,
                   updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(request.headline.trim())
        .bind(&request.bio)
        .bind(&request.location)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.is_public as i32)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        // Skills
        let mut desired_skills = HashSet::new();
        for name in request.skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let skill = get_or_create_skill(&mut tx, name).await?;
            desired_skills.insert(skill.id);
        }

        let current_skills: HashSet<String> =
            sqlx::query("SELECT skill_id FROM profile_skills WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?
                .iter()
                .map(|row| row.get("skill_id"))
                .collect();

        for skill_id in current_skills.difference(&desired_skills) {
            sqlx::query("DELETE FROM profile_skills WHERE user_id = ? AND skill_id = ?")
                .bind(user_id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await?;
        }
        for skill_id in desired_skills.difference(&current_skills) {
            sqlx::query("INSERT INTO profile_skills (user_id, skill_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await?;
        }

        // Projects
        let existing = owned_entry_ids(&mut tx, "projects", user_id).await?;
        let mut kept = HashSet::new();
        for (position, project) in request.projects.iter().enumerate() {
            match &project.id {
                Some(id) => {
                    claim_entry(&existing, id, "Project")?;
                    sqlx::query(
                        "UPDATE projects SET title = ?, url = ?, description = ?, position = ? WHERE id = ?",
                    )
                    .bind(project.title.trim())
                    .bind(&project.url)
                    .bind(&project.description)
                    .bind(position as i64)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                    kept.insert(id.clone());
                }
                None => {
                    sqlx::query(
                        "INSERT INTO projects (id, user_id, title, url, description, position) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(uuid::Uuid::new_v4().to_string())
                    .bind(user_id)
                    .bind(project.title.trim())
                    .bind(&project.url)
                    .bind(&project.description)
                    .bind(position as i64)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
        remove_unkept_entries(&mut tx, "projects", &existing, &kept).await?;

        // Education
        let existing = owned_entry_ids(&mut tx, "education", user_id).await?;
        let mut kept = HashSet::new();
        for (position, education) in request.education.iter().enumerate() {
            match &education.id {
                Some(id) => {
                    claim_entry(&existing, id, "Education entry")?;
                    sqlx::query(
                        r#"UPDATE education SET school = ?, degree = ?, major = ?,
                               graduation_month = ?, graduation_year = ?, position = ?
                           WHERE id = ?"#,
                    )
                    .bind(education.school.trim())
                    .bind(education.degree.trim())
                    .bind(education.major.trim())
                    .bind(education.graduation_month as i64)
                    .bind(education.graduation_year)
                    .bind(position as i64)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                    kept.insert(id.clone());
                }
                None => {
                    sqlx::query(
                        r#"INSERT INTO education
                               (id, user_id, school, degree, major, graduation_month, graduation_year, position)
                           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
                    )
                    .bind(uuid::Uuid::new_v4().to_string())
                    .bind(user_id)
                    .bind(education.school.trim())
                    .bind(education.degree.trim())
                    .bind(education.major.trim())
                    .bind(education.graduation_month as i64)
                    .bind(education.graduation_year)
                    .bind(position as i64)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
        remove_unkept_entries(&mut tx, "education", &existing, &kept).await?;

        // Work experience
        let existing = owned_entry_ids(&mut tx, "work_experience", user_id).await?;
        let mut kept = HashSet::new();
        for (position, work) in request.work_experience.iter().enumerate() {
            match &work.id {
                Some(id) => {
                    claim_entry(&existing, id, "Work experience entry")?;
                    sqlx::query(
                        "UPDATE work_experience SET company = ?, description = ?, position = ? WHERE id = ?",
                    )
                    .bind(work.company.trim())
                    .bind(&work.description)
                    .bind(position as i64)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                    kept.insert(id.clone());
                }
                None => {
                    sqlx::query(
                        "INSERT INTO work_experience (id, user_id, company, description, position) VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(uuid::Uuid::new_v4().to_string())
                    .bind(user_id)
                    .bind(work.company.trim())
                    .bind(&work.description)
                    .bind(position as i64)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
        remove_unkept_entries(&mut tx, "work_experience", &existing, &kept).await?;

        tx.commit().await?;

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile {} vanished after save", user_id)))
    }

    /// Fill in skills and profile entries for already-loaded profiles.
    async fn prefetch_relations(
        &self,
        profiles: &mut [CandidateProfile],
        only_user: Option<&str>,
    ) -> Result<(), AppError> {
        if profiles.is_empty() {
            return Ok(());
        }

        let skill_rows = sqlx::query(
            r#"SELECT ps.user_id AS owner_id, s.id AS skill_id, s.name AS skill_name
               FROM profile_skills ps JOIN skills s ON s.id = ps.skill_id
               WHERE (? IS NULL OR ps.user_id = ?)
               ORDER BY s.name_key"#,
        )
        .bind(only_user)
        .bind(only_user)
        .fetch_all(&self.pool)
        .await?;

        let mut skills: HashMap<String, Vec<Skill>> = HashMap::new();
        for row in &skill_rows {
            skills
                .entry(row.get("owner_id"))
                .or_default()
                .push(Skill {
                    id: row.get("skill_id"),
                    name: row.get("skill_name"),
                });
        }

        let project_rows = sqlx::query(
            r#"SELECT id, user_id, title, url, description FROM projects
               WHERE (? IS NULL OR user_id = ?)
               ORDER BY position, id"#,
        )
        .bind(only_user)
        .bind(only_user)
        .fetch_all(&self.pool)
        .await?;

        let mut projects: HashMap<String, Vec<Project>> = HashMap::new();
        for row in &project_rows {
            projects
                .entry(row.get("user_id"))
                .or_default()
                .push(Project {
                    id: row.get("id"),
                    title: row.get("title"),
                    url: row.get("url"),
                    description: row.get("description"),
                });
        }

        let education_rows = sqlx::query(
            r#"SELECT id, user_id, school, degree, major, graduation_month, graduation_year
               FROM education
               WHERE (? IS NULL OR user_id = ?)
               ORDER BY position, id"#,
        )
        .bind(only_user)
        .bind(only_user)
        .fetch_all(&self.pool)
        .await?;

        let mut education: HashMap<String, Vec<Education>> = HashMap::new();
        for row in &education_rows {
            let month: i64 = row.get("graduation_month");
            education
                .entry(row.get("user_id"))
                .or_default()
                .push(Education {
                    id: row.get("id"),
                    school: row.get("school"),
                    degree: row.get("degree"),
                    major: row.get("major"),
                    graduation_month: month as u32,
                    graduation_year: row.get("graduation_year"),
                });
        }

        let work_rows = sqlx::query(
            r#"SELECT id, user_id, company, description FROM work_experience
               WHERE (? IS NULL OR user_id = ?)
               ORDER BY position, id"#,
        )
        .bind(only_user)
        .bind(only_user)
        .fetch_all(&self.pool)
        .await?;

        let mut work_experience: HashMap<String, Vec<WorkExperience>> = HashMap::new();
        for row in &work_rows {
            work_experience
                .entry(row.get("user_id"))
                .or_default()
                .push(WorkExperience {
                    id: row.get("id"),
                    company: row.get("company"),
                    description: row.get("description"),
                });
        }

        for profile in profiles.iter_mut() {
            profile.skills = skills.remove(&profile.user_id).unwrap_or_default();
            profile.projects = projects.remove(&profile.user_id).unwrap_or_default();
            profile.education = education.remove(&profile.user_id).unwrap_or_default();
            profile.work_experience = work_experience
                .remove(&profile.user_id)
                .unwrap_or_default();
        }

        Ok(())
    }

    // ==================== JOB OPERATIONS ====================

    /// List all jobs, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, AppError> {
        let sql = format!("SELECT {} FROM jobs ORDER BY created_at DESC, id", JOB_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(job_from_row).collect())
    }

    /// Jobs posted by one recruiter, newest first.
    pub async fn list_jobs_by_recruiter(&self, recruiter_id: &str) -> Result<Vec<Job>, AppError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE posted_by = ? ORDER BY created_at DESC, id",
            JOB_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(job_from_row).collect())
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, AppError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(job_from_row))
    }

    pub async fn create_job(
        &self,
        recruiter_id: &str,
        request: &CreateJobRequest,
    ) -> Result<Job, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let sql = format!(
            "INSERT INTO jobs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            JOB_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(request.title.trim())
            .bind(&request.company)
            .bind(&request.description)
            .bind(&request.skills)
            .bind(request.salary)
            .bind(&request.location)
            .bind(request.latitude)
            .bind(request.longitude)
            .bind(&request.city)
            .bind(&request.state)
            .bind(request.remote_or_on_site.as_str())
            .bind(request.visa_sponsorship.as_str())
            .bind(recruiter_id)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(Job {
            id,
            title: request.title.trim().to_string(),
            company: request.company.clone(),
            description: request.description.clone(),
            skills: request.skills.clone(),
            salary: request.salary,
            location: request.location.clone(),
            latitude: request.latitude,
            longitude: request.longitude,
            city: request.city.clone(),
            state: request.state.clone(),
            remote_or_on_site: request.remote_or_on_site,
            visa_sponsorship: request.visa_sponsorship,
            posted_by: recruiter_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Replace a job's editable fields and bump `updated_at`.
    pub async fn update_job(&self, id: &str, request: &CreateJobRequest) -> Result<Job, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"UPDATE jobs SET title = ?, company = ?, description = ?, skills = ?, salary = ?,
                   location = ?, latitude = ?, longitude = ?, city = ?, state = ?,
                   remote_or_on_site = ?, visa_sponsorship = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(request.title.trim())
        .bind(&request.company)
        .bind(&request.description)
        .bind(&request.skills)
        .bind(request.salary)
        .bind(&request.location)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.city)
        .bind(&request.state)
        .bind(request.remote_or_on_site.as_str())
        .bind(request.visa_sponsorship.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }

        self.get_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Delete a job.
    pub async fn delete_job(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }

    // ==================== APPLICATION OPERATIONS ====================

    /// Record an application. A second application to the same job conflicts.
    pub async fn create_application(
        &self,
        job_id: &str,
        applicant_id: &str,
        request: &ApplyRequest,
    ) -> Result<Application, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let status = ApplicationStatus::default();

        sqlx::query(
            "INSERT INTO applications (id, job_id, applicant_id, status, cover_letter, applied_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(job_id)
        .bind(applicant_id)
        .bind(status.as_str())
        .bind(&request.cover_letter)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already applied to this job".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(Application {
            id,
            job_id: job_id.to_string(),
            applicant_id: applicant_id.to_string(),
            status,
            cover_letter: request.cover_letter.clone(),
            applied_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get_application(&self, id: &str) -> Result<Option<ApplicationSummary>, AppError> {
        let sql = format!("{} WHERE a.id = ?", APPLICATION_SUMMARY_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(application_summary_from_row))
    }

    /// The caller's application to one job, if any.
    pub async fn find_application(
        &self,
        job_id: &str,
        applicant_id: &str,
    ) -> Result<Option<ApplicationSummary>, AppError> {
        let sql = format!(
            "{} WHERE a.job_id = ? AND a.applicant_id = ?",
            APPLICATION_SUMMARY_SELECT
        );
        let row = sqlx::query(&sql)
            .bind(job_id)
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(application_summary_from_row))
    }

    /// A seeker's applications, most recent first.
    pub async fn list_applications_by_applicant(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let sql = format!(
            "{} WHERE a.applicant_id = ? ORDER BY a.applied_at DESC, a.id",
            APPLICATION_SUMMARY_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(application_summary_from_row).collect())
    }

    /// Applications to a recruiter's jobs, most recent first.
    pub async fn list_applications_for_recruiter(
        &self,
        recruiter_id: &str,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let sql = format!(
            "{} WHERE j.posted_by = ? ORDER BY a.applied_at DESC, a.id",
            APPLICATION_SUMMARY_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(application_summary_from_row).collect())
    }

    /// Move an application to a new status and bump `updated_at`.
    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationSummary, AppError> {
        let result = sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Application {} not found", id)));
        }

        self.get_application(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))
    }

    /// Applicants to a recruiter's jobs (optionally one job) that have a
    /// usable location, each listed once, in order of first application.
    pub async fn list_applicant_points(
        &self,
        recruiter_id: &str,
        job_id: Option<&str>,
    ) -> Result<Vec<ApplicantPoint>, AppError> {
        let rows = sqlx::query(
            r#"SELECT a.applicant_id, u.username, p.headline, p.location, p.latitude, p.longitude
               FROM applications a
               JOIN jobs j ON j.id = a.job_id
               JOIN users u ON u.id = a.applicant_id
               LEFT JOIN profiles p ON p.user_id = a.applicant_id
               WHERE j.posted_by = ? AND (? IS NULL OR a.job_id = ?)
               ORDER BY a.applied_at, a.id"#,
        )
        .bind(recruiter_id)
        .bind(job_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let mut seen = HashSet::new();
        let points = rows
            .iter()
            .filter_map(|row| {
                let applicant_id: String = row.get("applicant_id");
                if !seen.insert(applicant_id.clone()) {
                    return None;
                }
                let headline: Option<String> = row.get("headline");
                ApplicantPoint::new(
                    applicant_id,
                    row.get::<String, _>("username"),
                    headline.unwrap_or_default(),
                    row.get("location"),
                    row.get("latitude"),
                    row.get("longitude"),
                )
            })
            .collect();

        Ok(points)
    }

    // ==================== SAVED SEARCH OPERATIONS ====================

    /// Save a search. Names are unique per recruiter.
    pub async fn create_saved_search(
        &self,
        recruiter_id: &str,
        request: &CreateSavedSearchRequest,
        skills: &[Skill],
    ) -> Result<SavedSearch, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let name = request.name.trim().to_string();
        let location = blank_to_none(request.location.as_deref());
        let keyword = blank_to_none(request.keyword.as_deref());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO saved_searches (id, recruiter_id, name, location, keyword, mode, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&id)
        .bind(recruiter_id)
        .bind(&name)
        .bind(&location)
        .bind(&keyword)
        .bind(request.mode.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("A saved search named \"{}\" already exists", name))
            } else {
                e.into()
            }
        })?;

        for skill in skills {
            sqlx::query(
                "INSERT OR IGNORE INTO saved_search_skills (saved_search_id, skill_id) VALUES (?, ?)",
            )
            .bind(&id)
            .bind(&skill.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(SavedSearch {
            id,
            recruiter_id: recruiter_id.to_string(),
            name,
            location,
            keyword,
            skills: skills.to_vec(),
            mode: request.mode,
            is_active: true,
            created_at: now,
            last_checked: None,
        })
    }

    pub async fn get_saved_search(&self, id: &str) -> Result<Option<SavedSearch>, AppError> {
        let sql = format!("SELECT {} FROM saved_searches WHERE id = ?", SAVED_SEARCH_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut search = saved_search_from_row(&row);
                search.skills = self.saved_search_skills(&search.id).await?;
                Ok(Some(search))
            }
            None => Ok(None),
        }
    }

    /// A recruiter's saved searches, newest first.
    pub async fn list_saved_searches(&self, recruiter_id: &str) -> Result<Vec<SavedSearch>, AppError> {
        let sql = format!(
            "SELECT {} FROM saved_searches WHERE recruiter_id = ? ORDER BY created_at DESC, id",
            SAVED_SEARCH_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate_saved_searches(&rows).await
    }

    /// Every active saved search, oldest first.
    pub async fn list_active_saved_searches(&self) -> Result<Vec<SavedSearch>, AppError> {
        let sql = format!(
            "SELECT {} FROM saved_searches WHERE is_active = 1 ORDER BY created_at, id",
            SAVED_SEARCH_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        self.hydrate_saved_searches(&rows).await
    }

    pub async fn set_saved_search_active(&self, id: &str, active: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE saved_searches SET is_active = ? WHERE id = ?")
            .bind(active as i32)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Saved search {} not found", id)));
        }
        Ok(())
    }

    /// Delete a saved search along with its ledger rows.
    pub async fn delete_saved_search(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Saved search {} not found", id)));
        }
        Ok(())
    }

    /// Stamp the search as checked now and return the timestamp.
    pub async fn touch_last_checked(&self, id: &str) -> Result<String, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE saved_searches SET last_checked = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(now)
    }

    async fn saved_search_skills(&self, search_id: &str) -> Result<Vec<Skill>, AppError> {
        let rows = sqlx::query(
            r#"SELECT s.id, s.name FROM saved_search_skills ss
               JOIN skills s ON s.id = ss.skill_id
               WHERE ss.saved_search_id = ?
               ORDER BY s.name_key"#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(skill_from_row).collect())
    }

    async fn hydrate_saved_searches(&self, rows: &[SqliteRow]) -> Result<Vec<SavedSearch>, AppError> {
        let mut searches = Vec::with_capacity(rows.len());
        for row in rows {
            let mut search = saved_search_from_row(row);
            search.skills = self.saved_search_skills(&search.id).await?;
            searches.push(search);
        }
        Ok(searches)
    }

    // ==================== NOTIFICATION LEDGER ====================

    /// Ledger rows for one saved search, oldest first.
    pub async fn list_notifications(
        &self,
        search_id: &str,
    ) -> Result<Vec<SearchMatchNotification>, AppError> {
        let rows = sqlx::query(
            r#"SELECT saved_search_id, candidate_id, notified_at
               FROM search_match_notifications
               WHERE saved_search_id = ?
               ORDER BY notified_at, candidate_id"#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SearchMatchNotification {
                saved_search_id: row.get("saved_search_id"),
                candidate_id: row.get("candidate_id"),
                notified_at: row.get("notified_at"),
            })
            .collect())
    }

    /// Candidate IDs already reported for a saved search.
    pub async fn notified_candidate_ids(&self, search_id: &str) -> Result<HashSet<String>, AppError> {
        Ok(self
            .list_notifications(search_id)
            .await?
            .into_iter()
            .map(|n| n.candidate_id)
            .collect())
    }

    /// Add a ledger row. Returns `false` when the pair was already recorded.
    pub async fn record_notification(
        &self,
        search_id: &str,
        candidate_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO search_match_notifications (saved_search_id, candidate_id, notified_at) VALUES (?, ?, ?)",
        )
        .bind(search_id)
        .bind(candidate_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Skills are keyed by their normalized name; the first spelling seen is kept
/// for display.
async fn get_or_create_skill(conn: &mut SqliteConnection, name: &str) -> Result<Skill, sqlx::Error> {
    let key = normalize_skill(name);

    sqlx::query("INSERT OR IGNORE INTO skills (id, name, name_key) VALUES (?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(&key)
        .execute(&mut *conn)
        .await?;

    let row = sqlx::query("SELECT id, name FROM skills WHERE name_key = ?")
        .bind(&key)
        .fetch_one(&mut *conn)
        .await?;

    Ok(skill_from_row(&row))
}

/// IDs of the rows a profile owns in one of its entry tables.
async fn owned_entry_ids(
    conn: &mut SqliteConnection,
    table: &'static str,
    user_id: &str,
) -> Result<HashSet<String>, sqlx::Error> {
    let sql = format!("SELECT id FROM {} WHERE user_id = ?", table);
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.iter().map(|row| row.get("id")).collect())
}

/// An `id` in a profile save must name an entry the profile already owns.
/// Returning the error drops the transaction, which rolls the save back.
fn claim_entry(existing: &HashSet<String>, id: &str, label: &str) -> Result<(), AppError> {
    if existing.contains(id) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} {} does not belong to this profile",
            label, id
        )))
    }
}

async fn remove_unkept_entries(
    conn: &mut SqliteConnection,
    table: &'static str,
    existing: &HashSet<String>,
    kept: &HashSet<String>,
) -> Result<(), sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = ?", table);
    for id in existing.difference(kept) {
        sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    }
    Ok(())
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Helper functions for row conversion

fn user_from_row(row: &SqliteRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        role: Role::parse(&role).unwrap_or(Role::Seeker),
        created_at: row.get("created_at"),
    }
}

fn skill_from_row(row: &SqliteRow) -> Skill {
    Skill {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn profile_from_row(row: &SqliteRow) -> CandidateProfile {
    let is_public: i32 = row.get("is_public");
    CandidateProfile {
        user_id: row.get("user_id"),
        username: row.get("username"),
        email: row.get("email"),
        headline: row.get("headline"),
        bio: row.get("bio"),
        location: row.get("location"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        is_public: is_public != 0,
        skills: Vec::new(),
        projects: Vec::new(),
        education: Vec::new(),
        work_experience: Vec::new(),
        updated_at: row.get("updated_at"),
    }
}

fn job_from_row(row: &SqliteRow) -> Job {
    let remote: String = row.get("remote_or_on_site");
    let visa: String = row.get("visa_sponsorship");
    Job {
        id: row.get("id"),
        title: row.get("title"),
        company: row.get("company"),
        description: row.get("description"),
        skills: row.get("skills"),
        salary: row.get("salary"),
        location: row.get("location"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        city: row.get("city"),
        state: row.get("state"),
        remote_or_on_site: WorkArrangement::parse(&remote).unwrap_or_default(),
        visa_sponsorship: VisaSponsorship::parse(&visa).unwrap_or_default(),
        posted_by: row.get("posted_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn application_summary_from_row(row: &SqliteRow) -> ApplicationSummary {
    let status: String = row.get("status");
    ApplicationSummary {
        application: Application {
            id: row.get("id"),
            job_id: row.get("job_id"),
            applicant_id: row.get("applicant_id"),
            status: ApplicationStatus::parse(&status).unwrap_or_default(),
            cover_letter: row.get("cover_letter"),
            applied_at: row.get("applied_at"),
            updated_at: row.get("updated_at"),
        },
        job_title: row.get("job_title"),
        company: row.get("company"),
        applicant_username: row.get("applicant_username"),
    }
}

fn saved_search_from_row(row: &SqliteRow) -> SavedSearch {
    let mode: String = row.get("mode");
    let is_active: i32 = row.get("is_active");
    SavedSearch {
        id: row.get("id"),
        recruiter_id: row.get("recruiter_id"),
        name: row.get("name"),
        location: row.get("location"),
        keyword: row.get("keyword"),
        skills: Vec::new(),
        mode: SkillMode::parse(&mode).unwrap_or_default(),
        is_active: is_active != 0,
        created_at: row.get("created_at"),
        last_checked: row.get("last_checked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{EducationInput, ProjectInput, WorkExperienceInput};
    use tempfile::TempDir;

    async fn setup() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite")).await.unwrap();
        (Repository::new(pool), temp_dir)
    }

    async fn user(repo: &Repository, username: &str, role: Role) -> User {
        repo.create_user(&CreateUserRequest {
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            role,
        })
        .await
        .unwrap()
    }

    fn profile_request(skills: &[&str], projects: Vec<ProjectInput>) -> UpsertProfileRequest {
        UpsertProfileRequest {
            headline: "Engineer".to_string(),
            bio: None,
            location: Some("Atlanta, GA".to_string()),
            latitude: Some(33.749),
            longitude: Some(-84.388),
            is_public: true,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            projects,
            education: vec![],
            work_experience: vec![],
        }
    }

    fn education(id: Option<&str>, school: &str, year: i32) -> EducationInput {
        EducationInput {
            id: id.map(str::to_string),
            school: school.to_string(),
            degree: "BS".to_string(),
            major: "Computer Science".to_string(),
            graduation_month: 5,
            graduation_year: year,
        }
    }

    fn work(id: Option<&str>, company: &str) -> WorkExperienceInput {
        WorkExperienceInput {
            id: id.map(str::to_string),
            company: company.to_string(),
            description: String::new(),
        }
    }

    fn job_request(title: &str) -> CreateJobRequest {
        CreateJobRequest {
            title: title.to_string(),
            company: String::new(),
            description: String::new(),
            skills: "Rust".to_string(),
            salary: None,
            location: None,
            latitude: None,
            longitude: None,
            city: String::new(),
            state: String::new(),
            remote_or_on_site: WorkArrangement::Remote,
            visa_sponsorship: VisaSponsorship::No,
        }
    }

    fn project(id: Option<&str>, title: &str) -> ProjectInput {
        ProjectInput {
            id: id.map(str::to_string),
            title: title.to_string(),
            url: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (repo, _dir) = setup().await;
        user(&repo, "alice", Role::Seeker).await;

        let err = repo
            .create_user(&CreateUserRequest {
                username: "alice".to_string(),
                email: None,
                role: Role::Recruiter,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_profile_save_diffs_projects() {
        let (repo, _dir) = setup().await;
        let alice = user(&repo, "alice", Role::Seeker).await;

        let first = repo
            .upsert_profile(
                &alice.id,
                &profile_request(&["Python"], vec![project(None, "Compiler"), project(None, "Blog")]),
            )
            .await
            .unwrap();
        assert_eq!(first.projects.len(), 2);
        let compiler_id = first.projects[0].id.clone();

        let second = repo
            .upsert_profile(
                &alice.id,
                &profile_request(
                    &["python", "Rust"],
                    vec![project(Some(&compiler_id), "Compiler v2"), project(None, "Game")],
                ),
            )
            .await
            .unwrap();

        let titles: Vec<&str> = second.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Compiler v2", "Game"]);
        assert_eq!(second.projects[0].id, compiler_id);

        let skills: Vec<&str> = second.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skills, vec!["Python", "Rust"]);
        assert_eq!(repo.list_skills().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_project_id_rolls_back() {
        let (repo, _dir) = setup().await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        repo.upsert_profile(&alice.id, &profile_request(&["Go"], vec![]))
            .await
            .unwrap();

        let err = repo
            .upsert_profile(
                &alice.id,
                &profile_request(&["Haskell"], vec![project(Some("not-mine"), "Stolen")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let profile = repo.get_profile(&alice.id).await.unwrap().unwrap();
        let skills: Vec<&str> = profile.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skills, vec!["Go"]);
    }

    #[tokio::test]
    async fn test_candidate_pool_excludes_private_and_recruiters() {
        let (repo, _dir) = setup().await;
        let bob = user(&repo, "bob", Role::Seeker).await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let hidden = user(&repo, "hidden", Role::Seeker).await;
        let rita = user(&repo, "rita", Role::Recruiter).await;

        for u in [&bob, &alice, &rita] {
            repo.upsert_profile(&u.id, &profile_request(&["SQL"], vec![]))
                .await
                .unwrap();
        }
        let mut private = profile_request(&["SQL"], vec![]);
        private.is_public = false;
        repo.upsert_profile(&hidden.id, &private).await.unwrap();

        let pool = repo.list_candidate_pool().await.unwrap();
        let names: Vec<&str> = pool.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(pool[0].skills[0].name, "SQL");
    }

    #[tokio::test]
    async fn test_find_skills_reports_missing() {
        let (repo, _dir) = setup().await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        repo.upsert_profile(&alice.id, &profile_request(&["Python"], vec![]))
            .await
            .unwrap();

        let (found, missing) = repo
            .find_skills(&["PYTHON".to_string(), "python".to_string(), "Cobol".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Python");
        assert_eq!(missing, vec!["Cobol".to_string()]);
    }

    #[tokio::test]
    async fn test_saved_search_names_unique_per_recruiter() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let sam = user(&repo, "sam", Role::Recruiter).await;
        let request = CreateSavedSearchRequest {
            name: "Backend".to_string(),
            location: None,
            keyword: None,
            skills: vec![],
            mode: SkillMode::Any,
        };

        repo.create_saved_search(&rita.id, &request, &[]).await.unwrap();
        let err = repo
            .create_saved_search(&rita.id, &request, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list_saved_searches(&rita.id).await.unwrap().len(), 1);

        repo.create_saved_search(&sam.id, &request, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_notification_is_idempotent() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let search = repo
            .create_saved_search(
                &rita.id,
                &CreateSavedSearchRequest {
                    name: "All".to_string(),
                    location: None,
                    keyword: None,
                    skills: vec![],
                    mode: SkillMode::Any,
                },
                &[],
            )
            .await
            .unwrap();

        assert!(repo.record_notification(&search.id, &alice.id).await.unwrap());
        assert!(!repo.record_notification(&search.id, &alice.id).await.unwrap());
        assert_eq!(repo.list_notifications(&search.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_applicant_points_are_deduplicated_and_scoped() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let sam = user(&repo, "sam", Role::Recruiter).await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let nomad = user(&repo, "nomad", Role::Seeker).await;
        repo.upsert_profile(&alice.id, &profile_request(&[], vec![]))
            .await
            .unwrap();

        let request = job_request("Engineer");
        let first = repo.create_job(&rita.id, &request).await.unwrap();
        let second = repo.create_job(&rita.id, &request).await.unwrap();
        let other = repo.create_job(&sam.id, &request).await.unwrap();

        let apply = ApplyRequest::default();
        repo.create_application(&first.id, &alice.id, &apply).await.unwrap();
        repo.create_application(&second.id, &alice.id, &apply).await.unwrap();
        repo.create_application(&first.id, &nomad.id, &apply).await.unwrap();
        repo.create_application(&other.id, &alice.id, &apply).await.unwrap();

        let duplicate = repo.create_application(&first.id, &alice.id, &apply).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        // nomad has no profile, so no coordinates
        let points = repo.list_applicant_points(&rita.id, None).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].username, "alice");

        let none_for_sam_job = repo
            .list_applicant_points(&rita.id, Some(&other.id))
            .await
            .unwrap();
        assert!(none_for_sam_job.is_empty());
    }

    #[tokio::test]
    async fn test_profile_save_diffs_education_and_work_experience() {
        let (repo, _dir) = setup().await;
        let alice = user(&repo, "alice", Role::Seeker).await;

        let mut request = profile_request(&[], vec![]);
        request.education = vec![education(None, "Georgia Tech", 2019), education(None, "Emory", 2021)];
        request.work_experience = vec![work(None, "Initech"), work(None, "Globex")];
        let first = repo.upsert_profile(&alice.id, &request).await.unwrap();
        assert_eq!(first.education.len(), 2);
        assert_eq!(first.work_experience.len(), 2);
        let tech_id = first.education[0].id.clone();
        let initech_id = first.work_experience[0].id.clone();

        // Keep one of each, drop the other, add a new one.
        let mut request = profile_request(&[], vec![]);
        request.education = vec![
            education(Some(&tech_id), "Georgia Tech", 2020),
            education(None, "MIT", 2023),
        ];
        request.work_experience = vec![work(None, "Hooli"), work(Some(&initech_id), "Initech")];
        let second = repo.upsert_profile(&alice.id, &request).await.unwrap();

        let schools: Vec<(&str, i32)> = second
            .education
            .iter()
            .map(|e| (e.school.as_str(), e.graduation_year))
            .collect();
        assert_eq!(schools, vec![("Georgia Tech", 2020), ("MIT", 2023)]);
        assert_eq!(second.education[0].id, tech_id);

        let companies: Vec<&str> = second
            .work_experience
            .iter()
            .map(|w| w.company.as_str())
            .collect();
        assert_eq!(companies, vec!["Hooli", "Initech"]);
        assert_eq!(second.work_experience[1].id, initech_id);
    }

    #[tokio::test]
    async fn test_foreign_education_id_rolls_back() {
        let (repo, _dir) = setup().await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let bob = user(&repo, "bob", Role::Seeker).await;

        let mut request = profile_request(&[], vec![]);
        request.education = vec![education(None, "Emory", 2021)];
        let bobs = repo.upsert_profile(&bob.id, &request).await.unwrap();

        let mut request = profile_request(&[], vec![]);
        request.work_experience = vec![work(None, "Initech")];
        repo.upsert_profile(&alice.id, &request).await.unwrap();

        let mut request = profile_request(&[], vec![]);
        request.education = vec![education(Some(&bobs.education[0].id), "Emory", 2022)];
        let err = repo.upsert_profile(&alice.id, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let alice_profile = repo.get_profile(&alice.id).await.unwrap().unwrap();
        assert_eq!(alice_profile.work_experience.len(), 1);
        assert!(alice_profile.education.is_empty());
        let bob_profile = repo.get_profile(&bob.id).await.unwrap().unwrap();
        assert_eq!(bob_profile.education[0].graduation_year, 2021);
    }

    #[tokio::test]
    async fn test_skill_names_unique_across_unicode_case() {
        let (repo, _dir) = setup().await;
        let ana = user(&repo, "ana", Role::Seeker).await;
        let ben = user(&repo, "ben", Role::Seeker).await;

        repo.upsert_profile(&ana.id, &profile_request(&["Élixir"], vec![]))
            .await
            .unwrap();
        let ben_profile = repo
            .upsert_profile(&ben.id, &profile_request(&["élixir"], vec![]))
            .await
            .unwrap();

        let skills = repo.list_skills().await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "Élixir");
        assert_eq!(ben_profile.skills[0].id, skills[0].id);

        let (found, missing) = repo.find_skills(&["ÉLIXIR".to_string()]).await.unwrap();
        assert_eq!(found, skills);
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_saved_search_clears_its_ledger() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let bob = user(&repo, "bob", Role::Seeker).await;
        let request = CreateSavedSearchRequest {
            name: "All".to_string(),
            location: None,
            keyword: None,
            skills: vec![],
            mode: SkillMode::Any,
        };
        let search = repo.create_saved_search(&rita.id, &request, &[]).await.unwrap();
        let kept = repo
            .create_saved_search(
                &rita.id,
                &CreateSavedSearchRequest {
                    name: "Kept".to_string(),
                    ..request
                },
                &[],
            )
            .await
            .unwrap();

        repo.record_notification(&search.id, &alice.id).await.unwrap();
        repo.record_notification(&search.id, &bob.id).await.unwrap();
        repo.record_notification(&kept.id, &alice.id).await.unwrap();

        repo.delete_saved_search(&search.id).await.unwrap();

        assert!(repo.list_notifications(&search.id).await.unwrap().is_empty());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_match_notifications")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(repo.list_notifications(&kept.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_job_bumps_updated_at() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let job = repo.create_job(&rita.id, &job_request("Engineer")).await.unwrap();

        let mut edit = job_request("Senior Engineer");
        edit.salary = Some(150_000.0);
        let updated = repo.update_job(&job.id, &edit).await.unwrap();

        assert_eq!(updated.title, "Senior Engineer");
        assert_eq!(updated.salary, Some(150_000.0));
        assert_eq!(updated.created_at, job.created_at);
        assert!(updated.updated_at >= job.updated_at);

        let missing = repo.update_job("no-such-job", &edit).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_application_status_workflow() {
        let (repo, _dir) = setup().await;
        let rita = user(&repo, "rita", Role::Recruiter).await;
        let sam = user(&repo, "sam", Role::Recruiter).await;
        let alice = user(&repo, "alice", Role::Seeker).await;
        let job = repo.create_job(&rita.id, &job_request("Engineer")).await.unwrap();
        let other = repo.create_job(&sam.id, &job_request("Analyst")).await.unwrap();

        let apply = ApplyRequest::default();
        let application = repo.create_application(&job.id, &alice.id, &apply).await.unwrap();
        repo.create_application(&other.id, &alice.id, &apply).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Applied);

        let mine = repo.list_applications_by_applicant(&alice.id).await.unwrap();
        assert_eq!(mine.len(), 2);

        let managed = repo.list_applications_for_recruiter(&rita.id).await.unwrap();
        assert_eq!(managed.len(), 1);
        assert_eq!(managed[0].job_title, "Engineer");
        assert_eq!(managed[0].applicant_username, "alice");

        let moved = repo
            .update_application_status(&application.id, ApplicationStatus::Interview)
            .await
            .unwrap();
        assert_eq!(moved.application.status, ApplicationStatus::Interview);
        assert!(moved.application.updated_at >= application.updated_at);

        let tracked = repo.find_application(&job.id, &alice.id).await.unwrap().unwrap();
        assert_eq!(tracked.application.status, ApplicationStatus::Interview);

        let missing = repo
            .update_application_status("no-such-application", ApplicationStatus::Offer)
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
