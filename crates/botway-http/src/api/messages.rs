//! Message endpoints

use super::Rest;
use crate::error::RestResult;
use crate::routes::Route;
use crate::transport::ApiResponse;
use botway_core::{validation, Snowflake};
use serde_json::json;

impl Rest {
    /// `POST channels/{channel_id}/messages` - send a message
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        content: &str,
    ) -> RestResult<ApiResponse> {
        validation::validate_message_content(content)?;
        self.request(
            Route::create_message(channel_id),
            Some(json!({ "content": content })),
            None,
        )
        .await
    }

    /// `PATCH channels/{channel_id}/messages/{message_id}` - edit a message
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> RestResult<ApiResponse> {
        validation::validate_message_content(content)?;
        self.request(
            Route::edit_message(channel_id, message_id),
            Some(json!({ "content": content })),
            None,
        )
        .await
    }

    /// `DELETE channels/{channel_id}/messages/{message_id}` - delete a message
    ///
    /// The optional reason lands in the guild's audit log.
    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<ApiResponse> {
        self.request(
            Route::delete_message(channel_id, message_id),
            None,
            reason,
        )
        .await
    }
}
