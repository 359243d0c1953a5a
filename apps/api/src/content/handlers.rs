use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;

use crate::content::blog::{self, BlogPost, BlogSummary};
use crate::content::jobs::{self, JobListing};
use crate::errors::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct JobsQuery {
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub tag: Option<String>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(Query(q): Query<JobsQuery>) -> Json<Vec<&'static JobListing>> {
    Json(jobs::in_department(q.department.as_deref()))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(Path(id): Path<String>) -> Result<Json<&'static JobListing>, AppError> {
    jobs::find(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job '{id}' not found")))
}

/// GET /api/blog
pub async fn handle_list_posts(Query(q): Query<BlogQuery>) -> Json<Vec<BlogSummary>> {
    Json(blog::summaries(q.tag.as_deref()))
}

/// GET /api/blog/:slug
pub async fn handle_get_post(Path(slug): Path<String>) -> Result<Json<&'static BlogPost>, AppError> {
    blog::find(&slug)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Post '{slug}' not found")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get_json, state_with};

    #[tokio::test]
    async fn test_list_jobs() {
        let (status, body) = get_json(state_with(None, None), "/api/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), crate::content::jobs::JOBS.len());
        assert!(body[0]["employmentType"].is_string());
    }

    #[tokio::test]
    async fn test_jobs_filtered_by_department() {
        let (_, body) = get_json(state_with(None, None), "/api/jobs?department=Design").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let (status, body) = get_json(state_with(None, None), "/api/jobs/astronaut").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_blog_list_omits_body() {
        let (status, body) = get_json(state_with(None, None), "/api/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body[0].get("body").is_none());
        assert!(body[0]["readMinutes"].is_number());
    }

    #[tokio::test]
    async fn test_get_post() {
        let (status, body) = get_json(state_with(None, None), "/api/blog/shipping-ai-features").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["body"].as_str().unwrap().contains("contract"));

        let (status, _) = get_json(state_with(None, None), "/api/blog/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
