//! Channel endpoints

use super::Rest;
use crate::error::RestResult;
use crate::routes::Route;
use crate::transport::ApiResponse;
use botway_core::Snowflake;

impl Rest {
    /// `GET channels/{channel_id}` - fetch a channel
    pub async fn get_channel(&self, channel_id: Snowflake) -> RestResult<ApiResponse> {
        self.request(Route::get_channel(channel_id), None, None).await
    }

    /// `POST channels/{channel_id}/typing` - trigger the typing indicator
    pub async fn trigger_typing(&self, channel_id: Snowflake) -> RestResult<ApiResponse> {
        self.request(Route::trigger_typing(channel_id), None, None)
            .await
    }
}
