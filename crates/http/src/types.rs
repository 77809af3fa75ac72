//! Wire types exchanged with the marketplace API
//!
//! Field names follow the backend's camelCase JSON. Status and type values for
//! jobs, applications and skills are kept as plain strings: their vocabulary is
//! owned by the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag carried by every user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Employer,
    Freelancer,
    Admin,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Employer => "employer",
            Self::Freelancer => "freelancer",
            Self::Admin => "admin",
        };
        f.write_str(tag)
    }
}

/// Snapshot of the authenticated user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub user_type: UserType,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Editable subset of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl From<&UserProfile> for UserUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            city: profile.city.clone(),
            bio: profile.bio.clone(),
        }
    }
}

/// Login request body
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration request body
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub user_type: UserType,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

/// Token issued by login and registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Minimal user reference embedded in job payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

/// Job as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub date_from: String,
    pub date_to: String,
    pub location: String,
    pub payment_amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub urgent: i32,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub created_by_user: Option<UserRef>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Body for creating or editing a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub date_from: String,
    pub date_to: String,
    pub location: String,
    pub payment_amount: f64,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub payment_type_id: i64,
    pub urgent: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<i64>,
}

/// One page of jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub content: Vec<Job>,
    pub total_elements: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    pub size: u32,
}

/// Query filters for the job listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Job application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: i64,
    pub user_full_name: String,
    pub job_id: i64,
    pub job_title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for applying to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub job_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StatusUpdateRequest<'a> {
    pub status: &'a str,
}

/// Job category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Skill from the global catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: Option<SkillCategory>,
}

/// Category reference embedded in a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: i64,
    pub title: String,
}

/// Skill attached to a user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSkill {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub proficiency_level: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddSkillRequest<'a> {
    pub skill_id: i64,
    pub proficiency_level: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProficiencyRequest<'a> {
    pub proficiency_level: &'a str,
}

/// Payment type offered for jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentType {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_reads_backend_json() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "username": "ana",
            "fullName": "Ana Ilic",
            "email": "ana@example.com",
            "phone": "0601234567",
            "city": "Novi Sad",
            "userType": "freelancer",
            "createdAt": "2024-01-15"
        }))
        .unwrap();

        assert_eq!(profile.user_type, UserType::Freelancer);
        assert_eq!(profile.bio, None);
        assert_eq!(profile.full_name, "Ana Ilic");
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let response: AuthTokenResponse =
            serde_json::from_value(json!({ "accessToken": "abc" })).unwrap();
        assert_eq!(response.token_type, "Bearer");
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let request = LoginRequest {
            username: "ana".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("ana"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn job_filters_skip_empty_fields() {
        let filters = JobFilters {
            page: Some(2),
            job_type: Some("contract".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(value, json!({ "page": 2, "type": "contract" }));
    }
}
