//! Training endpoint surface
//!
//! The training document is an opaque JSON blob edited as a whole; the
//! console reads and replaces it without interpreting its shape.

use crate::api::client::ApiClient;
use crate::error::PanelError;
use serde_json::Value;

impl ApiClient {
    /// Fetch the training data document
    pub async fn training_data(&self) -> Result<Value, PanelError> {
        let value = self.get("/api/training").await?;
        Self::data(value)
    }

    /// Replace the training data document
    pub async fn update_training_data(&self, data: &Value) -> Result<(), PanelError> {
        self.put("/api/training", data.clone()).await?;
        Ok(())
    }
}
