//! Skill catalog and user skill endpoints

use super::{MarketClient, error::ClientError};
use crate::types::{AddSkillRequest, ProficiencyRequest, Skill, UserSkill};
use reqwest::Method;

impl MarketClient {
    pub async fn list_skills(&self) -> Result<Vec<Skill>, ClientError> {
        let request = self.request(Method::GET, "/skills");
        self.execute(request).await
    }

    /// Skills on the authenticated user's profile
    pub async fn my_skills(&self) -> Result<Vec<UserSkill>, ClientError> {
        let request = self.request(Method::GET, "/users/skills");
        self.execute(request).await
    }

    pub async fn add_skill(
        &self,
        skill_id: i64,
        proficiency_level: &str,
    ) -> Result<UserSkill, ClientError> {
        let request = self
            .request(Method::POST, "/users/skills")
            .json(&AddSkillRequest {
                skill_id,
                proficiency_level,
            });
        self.execute(request).await
    }

    pub async fn update_skill(
        &self,
        skill_id: i64,
        proficiency_level: &str,
    ) -> Result<UserSkill, ClientError> {
        let request = self
            .request(Method::PUT, &format!("/users/skills/{skill_id}"))
            .json(&ProficiencyRequest { proficiency_level });
        self.execute(request).await
    }

    pub async fn remove_skill(&self, skill_id: i64) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/users/skills/{skill_id}"));
        self.execute_empty(request).await
    }

    /// Skills of another user, e.g. an employer looking at a freelancer
    pub async fn user_skills(&self, user_id: i64) -> Result<Vec<UserSkill>, ClientError> {
        let request = self.request(Method::GET, &format!("/users/{user_id}/skills"));
        self.execute(request).await
    }
}
