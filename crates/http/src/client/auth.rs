//! Authentication endpoints

use super::{MarketClient, VALIDATE_PATH, error::ClientError};
use crate::types::{AuthTokenResponse, LoginRequest, RegisterRequest, UserProfile};
use reqwest::Method;

impl MarketClient {
    /// Exchange credentials for a token
    pub async fn login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<AuthTokenResponse, ClientError> {
        let request = self.request(Method::POST, "/auth/login").json(credentials);
        self.execute(request).await
    }

    /// Create an account; the response already carries a usable token
    pub async fn register(
        &self,
        new_user: &RegisterRequest,
    ) -> Result<AuthTokenResponse, ClientError> {
        let request = self.request(Method::POST, "/auth/register").json(new_user);
        self.execute(request).await
    }

    /// Ask the backend whether the current token is still accepted
    pub async fn validate_token(&self) -> Result<bool, ClientError> {
        let request = self.request(Method::GET, VALIDATE_PATH);
        self.execute(request).await
    }

    /// Fetch the profile belonging to `token`, bypassing the token source
    pub async fn get_profile_with_token(&self, token: &str) -> Result<UserProfile, ClientError> {
        let request = self.request_with_token(Method::GET, "/users/profile", token);
        self.execute(request).await
    }
}
