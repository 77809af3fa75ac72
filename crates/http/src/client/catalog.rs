//! Reference data: categories and payment types

use super::{MarketClient, error::ClientError};
use crate::types::{Category, PaymentType};
use reqwest::Method;

impl MarketClient {
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let request = self.request(Method::GET, "/categories/");
        self.execute(request).await
    }

    pub async fn list_payment_types(&self) -> Result<Vec<PaymentType>, ClientError> {
        let request = self.request(Method::GET, "/payment-types/");
        self.execute(request).await
    }
}
