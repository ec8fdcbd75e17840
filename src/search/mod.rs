//! Tantivy-based job search index.
//!
//! Provides full-text search over job postings with field boosting.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Job;

const BOOST_TITLE: f32 = 10.0;
const BOOST_SKILLS: f32 = 8.0;
const BOOST_COMPANY: f32 = 5.0;
const BOOST_LOCATION: f32 = 4.0;
const BOOST_DESCRIPTION: f32 = 3.0;

/// Search hit with job id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub job_id: String,
    pub score: f32,
}

struct JobFields {
    job_id: Field,
    title: Field,
    company: Field,
    skills: Field,
    location: Field,
    description: Field,
}

/// Tantivy index over job postings.
pub struct JobIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: JobFields,
}

impl JobIndex {
    /// Create or open a job index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let job_id = schema_builder.add_text_field("job_id", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT);
        let company = schema_builder.add_text_field("company", TEXT);
        let skills = schema_builder.add_text_field("skills", TEXT);
        let location = schema_builder.add_text_field("location", TEXT);
        let description = schema_builder.add_text_field("description", TEXT);
        let schema = schema_builder.build();

        let fields = JobFields {
            job_id,
            title,
            company,
            skills,
            location,
            description,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000)
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Replace the whole index with `jobs`.
    pub async fn rebuild(&self, jobs: &[Job]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for job in jobs {
            writer.add_document(self.document(job))?;
        }
        writer.commit()?;
        self.reader.reload()?;

        tracing::info!(jobs = jobs.len(), "Job index rebuilt");
        Ok(())
    }

    /// Index or re-index a single job.
    pub async fn index_job(&self, job: &Job) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.job_id, &job.id));
        writer.add_document(self.document(job))?;
        writer.commit()?;
        self.reader.reload()?;

        Ok(())
    }

    pub async fn remove_job(&self, job_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.job_id, job_id));
        writer.commit()?;
        self.reader.reload()?;

        Ok(())
    }

    /// Search jobs matching the query, best first.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<SearchHit>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let field_boosts = [
            (self.fields.title, BOOST_TITLE),
            (self.fields.skills, BOOST_SKILLS),
            (self.fields.company, BOOST_COMPANY),
            (self.fields.location, BOOST_LOCATION),
            (self.fields.description, BOOST_DESCRIPTION),
        ];

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for (field, boost) in field_boosts {
            let parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(query) = parser.parse_query(query_str) {
                subqueries.push((Occur::Should, Box::new(BoostQuery::new(query, boost))));
            }
        }

        if subqueries.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Invalid search query: {}",
                query_str
            )));
        }
        let query = BooleanQuery::new(subqueries);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(top_docs
            .into_iter()
            .filter_map(|(score, address)| {
                let doc: TantivyDocument = searcher.doc(address).ok()?;
                let job_id = doc.get_first(self.fields.job_id)?.as_str()?.to_string();
                Some(SearchHit { job_id, score })
            })
            .collect())
    }

    fn document(&self, job: &Job) -> TantivyDocument {
        let location = [
            job.location.as_deref().unwrap_or_default(),
            job.city.as_str(),
            job.state.as_str(),
        ]
        .join(" ");

        doc!(
            self.fields.job_id => job.id.clone(),
            self.fields.title => job.title.clone(),
            self.fields.company => job.company.clone(),
            self.fields.skills => job.skills.replace(',', " "),
            self.fields.location => location,
            self.fields.description => job.description.clone()
        )
    }
}
