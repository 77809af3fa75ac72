//! User profile endpoints

use super::{MarketClient, error::ClientError};
use crate::types::{Job, UserProfile, UserUpdate};
use reqwest::Method;

impl MarketClient {
    /// Profile of the authenticated user
    pub async fn get_profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::GET, "/users/profile");
        self.execute(request).await
    }

    /// Replace the editable profile fields, returning the stored profile
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::PUT, "/users/profile").json(update);
        self.execute(request).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::GET, &format!("/users/{user_id}"));
        self.execute(request).await
    }

    /// Jobs posted by a given user
    pub async fn get_user_jobs(&self, user_id: i64) -> Result<Vec<Job>, ClientError> {
        let request = self.request(Method::GET, &format!("/users/{user_id}/jobs"));
        self.execute(request).await
    }
}
