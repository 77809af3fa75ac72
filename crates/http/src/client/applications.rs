//! Job application endpoints

use super::{MarketClient, error::ClientError};
use crate::types::{Application, ApplicationRequest, StatusUpdateRequest};
use reqwest::Method;

impl MarketClient {
    /// Applications submitted by the authenticated freelancer
    pub async fn my_applications(&self) -> Result<Vec<Application>, ClientError> {
        let request = self.request(Method::GET, "/applications");
        self.execute(request).await
    }

    /// Applications received on the authenticated employer's jobs
    pub async fn employer_applications(&self) -> Result<Vec<Application>, ClientError> {
        let request = self.request(Method::GET, "/applications/employer");
        self.execute(request).await
    }

    /// Apply to a job. A second application to the same job yields a conflict.
    pub async fn apply_for_job(
        &self,
        application: &ApplicationRequest,
    ) -> Result<Application, ClientError> {
        let request = self.request(Method::POST, "/applications").json(application);
        self.execute(request).await
    }

    pub async fn update_application_status(
        &self,
        application_id: i64,
        status: &str,
    ) -> Result<Application, ClientError> {
        let request = self
            .request(
                Method::PUT,
                &format!("/applications/{application_id}/status"),
            )
            .json(&StatusUpdateRequest { status });
        self.execute(request).await
    }

    /// Whether the authenticated user already applied to `job_id`
    pub async fn has_applied_for_job(&self, job_id: i64) -> Result<bool, ClientError> {
        let applications = self.my_applications().await?;
        Ok(applications.iter().any(|app| app.job_id == job_id))
    }
}
