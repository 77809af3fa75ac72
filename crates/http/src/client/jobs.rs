//! Job listing and management endpoints

use super::{MarketClient, error::ClientError};
use crate::types::{Job, JobDraft, JobFilters, JobPage};
use reqwest::Method;

impl MarketClient {
    /// List jobs, one page at a time
    pub async fn list_jobs(&self, filters: &JobFilters) -> Result<JobPage, ClientError> {
        let request = self.request(Method::GET, "/jobs").query(filters);
        self.execute(request).await
    }

    pub async fn get_job(&self, job_id: i64) -> Result<Job, ClientError> {
        let request = self.request(Method::GET, &format!("/jobs/{job_id}"));
        self.execute(request).await
    }

    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job, ClientError> {
        let request = self.request(Method::POST, "/jobs").json(draft);
        self.execute(request).await
    }

    pub async fn update_job(&self, job_id: i64, draft: &JobDraft) -> Result<Job, ClientError> {
        let request = self
            .request(Method::PUT, &format!("/jobs/{job_id}"))
            .json(draft);
        self.execute(request).await
    }

    pub async fn delete_job(&self, job_id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/jobs/{job_id}"));
        self.execute_empty(request).await
    }
}
