//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for users, profiles, jobs, saved searches
//! and the notification ledger.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT,
            role TEXT NOT NULL CHECK (role IN ('recruiter', 'seeker')),
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            headline TEXT NOT NULL,
            bio TEXT,
            location TEXT,
            latitude REAL,
            longitude REAL,
            is_public INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS profile_skills (
            user_id TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            skill_id TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            url TEXT,
            description TEXT,
            position INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS education (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            school TEXT NOT NULL,
            degree TEXT NOT NULL DEFAULT '',
            major TEXT NOT NULL DEFAULT '',
            graduation_month INTEGER NOT NULL CHECK (graduation_month BETWEEN 1 AND 12),
            graduation_year INTEGER NOT NULL,
            position INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS work_experience (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            company TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            position INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            company TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            skills TEXT NOT NULL,
            salary REAL,
            location TEXT,
            latitude REAL,
            longitude REAL,
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            remote_or_on_site TEXT NOT NULL DEFAULT 'on_site',
            visa_sponsorship TEXT NOT NULL DEFAULT 'no',
            posted_by TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            applicant_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            status TEXT NOT NULL DEFAULT 'applied',
            cover_letter TEXT,
            applied_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (job_id, applicant_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_searches (
            id TEXT PRIMARY KEY,
            recruiter_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            location TEXT,
            keyword TEXT,
            mode TEXT NOT NULL DEFAULT 'any',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            last_checked TEXT,
            UNIQUE (recruiter_id, name)
        );

        CREATE TABLE IF NOT EXISTS saved_search_skills (
            saved_search_id TEXT NOT NULL REFERENCES saved_searches(id) ON DELETE CASCADE,
            skill_id TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
            PRIMARY KEY (saved_search_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS search_match_notifications (
            saved_search_id TEXT NOT NULL REFERENCES saved_searches(id) ON DELETE CASCADE,
            candidate_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            notified_at TEXT NOT NULL,
            UNIQUE (saved_search_id, candidate_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_posted_by ON jobs(posted_by);
        CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
        CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id);
        CREATE INDEX IF NOT EXISTS idx_applications_applicant ON applications(applicant_id);
        CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);
        CREATE INDEX IF NOT EXISTS idx_education_user ON education(user_id);
        CREATE INDEX IF NOT EXISTS idx_work_experience_user ON work_experience(user_id);
        CREATE INDEX IF NOT EXISTS idx_saved_searches_active ON saved_searches(is_active);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
