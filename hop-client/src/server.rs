use hop_core::dto::ServerStatus;

use crate::HopServerClient;
use crate::error::{ClientError, Result};

const SERVER_STATUS: &str = "/hop/status/";

impl HopServerClient {
    /// Get the server summary and the executions it currently holds
    pub async fn server_status(&self) -> Result<ServerStatus> {
        let request = self
            .client
            .get(self.url(SERVER_STATUS))
            .query(&[("xml", "Y")]);
        let element = self.send(request).await?;

        ServerStatus::try_from(&element).map_err(|e| ClientError::ParseError(e.to_string()))
    }
}
