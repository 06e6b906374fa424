//! Listen-key management for the user data stream.
//!
//! All three calls identify the account by API key only; they are not signed.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use serde::Deserialize;

const USER_DATA_STREAM: &str = "/api/v3/userDataStream";

impl Client {
    pub fn start_user_stream(&self) -> StartUserStreamService<'_> {
        StartUserStreamService { client: self }
    }

    pub fn keepalive_user_stream(&self, listen_key: impl Into<String>) -> KeepaliveUserStreamService<'_> {
        KeepaliveUserStreamService {
            client: self,
            listen_key: listen_key.into(),
        }
    }

    pub fn close_user_stream(&self, listen_key: impl Into<String>) -> CloseUserStreamService<'_> {
        CloseUserStreamService {
            client: self,
            listen_key: listen_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListenKey {
    listen_key: String,
}

/// `POST /api/v3/userDataStream`
#[derive(Debug)]
pub struct StartUserStreamService<'a> {
    client: &'a Client,
}

impl StartUserStreamService<'_> {
    /// Returns the listen key
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<String, ExchangeError> {
        let request = Request::post(USER_DATA_STREAM, SecurityType::ApiKey);
        let key: ListenKey = self.client.call_json(ctx, request, opts).await?;
        Ok(key.listen_key)
    }
}

/// `PUT /api/v3/userDataStream`
#[derive(Debug)]
pub struct KeepaliveUserStreamService<'a> {
    client: &'a Client,
    listen_key: String,
}

impl KeepaliveUserStreamService<'_> {
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<(), ExchangeError> {
        let mut request = Request::put(USER_DATA_STREAM, SecurityType::ApiKey);
        request.set_param("listenKey", &self.listen_key);
        self.client.call_api(ctx, request, opts).await?;
        Ok(())
    }
}

/// `DELETE /api/v3/userDataStream`
#[derive(Debug)]
pub struct CloseUserStreamService<'a> {
    client: &'a Client,
    listen_key: String,
}

impl CloseUserStreamService<'_> {
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<(), ExchangeError> {
        let mut request = Request::delete(USER_DATA_STREAM, SecurityType::ApiKey);
        request.set_param("listenKey", &self.listen_key);
        self.client.call_api(ctx, request, opts).await?;
        Ok(())
    }
}
