//! Rocket.Chat REST client
//!
//! Implements `ChatPlatform` against the Rocket.Chat REST API. One HTTP
//! client and one authenticated session are shared by every mapping of a run.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use chansync_connector::config::ConnectorConfig;
use chansync_connector::error::{ConnectorError, ConnectorResult, LookupError};
use chansync_connector::traits::{ChatPlatform, Connector};
use chansync_connector::types::{
    AccountId, AccountRecord, ChannelId, ChannelPattern, ChannelRecord, ChannelRef,
    ConnectorType, MemberRecord, Visibility,
};

use crate::config::{RocketChatAuth, RocketChatConfig};
use crate::models::{
    ChannelsListResponse, GroupsListResponse, LoginResponse, MembersResponse, Paged,
    RoomEntry, RoomMemberRequest, StatusResponse, UsersListResponse,
};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated session headers.
#[derive(Clone)]
struct Session {
    user_id: String,
    auth_token: String,
}

/// Rocket.Chat client for channel membership sync.
pub struct RocketChatClient {
    /// Configuration.
    config: RocketChatConfig,

    /// Display name for this connector instance.
    display_name: String,

    /// HTTP client.
    client: Arc<Client>,

    /// Cached session (logged in lazily in password mode).
    session: Arc<RwLock<Option<Session>>>,

    /// Whether the connector has been disposed.
    disposed: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for RocketChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocketChatClient")
            .field("config", &self.config.redacted())
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// REST collection prefix for a visibility.
fn room_prefix(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "channels",
        Visibility::Private => "groups",
    }
}

/// Best-effort error message from a Rocket.Chat error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

impl RocketChatClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RocketChatConfig) -> ConnectorResult<Self> {
        config.validate()?;
        config.tls.validate_security(&config.base_url);

        let display_name = format!("Rocket.Chat: {}", config.base_url);

        let client = Self::build_client(&config)?;

        let session = match &config.auth {
            RocketChatAuth::Token { user_id, token } => Some(Session {
                user_id: user_id.clone(),
                auth_token: token.clone().unwrap_or_default(),
            }),
            RocketChatAuth::Password { .. } => None,
        };

        Ok(Self {
            config,
            display_name,
            client: Arc::new(client),
            session: Arc::new(RwLock::new(session)),
            disposed: Arc::new(RwLock::new(false)),
        })
    }

    /// Build the reqwest client with configuration.
    fn build_client(config: &RocketChatConfig) -> ConnectorResult<Client> {
        let mut builder = Client::builder()
            .timeout(config.connection.read_timeout())
            .connect_timeout(config.connection.connection_timeout());

        if !config.tls.verify_certificate {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })
    }

    /// Check if disposed.
    async fn check_disposed(&self) -> ConnectorResult<()> {
        if *self.disposed.read().await {
            return Err(ConnectorError::Disposed);
        }
        Ok(())
    }

    /// Get the session, logging in if necessary.
    async fn session(&self) -> ConnectorResult<Session> {
        self.check_disposed().await?;

        {
            let session_guard = self.session.read().await;
            if let Some(ref session) = *session_guard {
                return Ok(session.clone());
            }
        }

        let session = self.login().await?;

        {
            let mut session_guard = self.session.write().await;
            *session_guard = Some(session.clone());
        }

        Ok(session)
    }

    /// Log in with username and password.
    async fn login(&self) -> ConnectorResult<Session> {
        let RocketChatAuth::Password { username, password } = &self.config.auth else {
            return Err(ConnectorError::AuthenticationFailed);
        };

        let url = self.config.api_url("login");
        debug!(url = %url, username = %username, "Logging in to Rocket.Chat");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "user": username,
                "password": password.as_deref().unwrap_or(""),
            }))
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let login: LoginResponse = match self.read_body("login", response).await {
            Ok(login) => login,
            Err(ConnectorError::OperationFailed { .. }) => {
                return Err(ConnectorError::AuthenticationFailed)
            }
            Err(e) => return Err(e),
        };

        if login.status != "success" {
            return Err(ConnectorError::AuthenticationFailed);
        }

        info!(user_id = %login.data.user_id, "Rocket.Chat session established");

        Ok(Session {
            user_id: login.data.user_id,
            auth_token: login.data.auth_token,
        })
    }

    /// Attach session headers to a request.
    fn authorize(builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .header(AUTH_TOKEN_HEADER, &session.auth_token)
            .header(USER_ID_HEADER, &session.user_id)
    }

    /// Map a transport-level failure.
    fn transport_error(&self, url: &str, error: reqwest::Error) -> ConnectorError {
        if error.is_timeout() {
            ConnectorError::ConnectionTimeout {
                timeout_secs: self.config.connection.read_timeout_secs,
            }
        } else if error.is_connect() {
            ConnectorError::connection_failed_with_source(
                format!("Failed to connect to {url}"),
                error,
            )
        } else {
            ConnectorError::network_with_source(format!("Request to {url} failed"), error)
        }
    }

    /// Handle API response errors.
    fn handle_response_error(operation: &str, status: StatusCode, body: &str) -> ConnectorError {
        let message = error_message(body);

        match status {
            StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed,
            StatusCode::FORBIDDEN => ConnectorError::AuthorizationFailed {
                operation: operation.to_string(),
            },
            StatusCode::NOT_FOUND => ConnectorError::ObjectNotFound {
                identifier: operation.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS => ConnectorError::TargetUnavailable {
                message: format!("Rate limited: {message}"),
            },
            StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::BAD_GATEWAY
            | StatusCode::GATEWAY_TIMEOUT => ConnectorError::TargetUnavailable { message },
            _ => ConnectorError::operation_failed(format!("{operation}: HTTP {status}: {message}")),
        }
    }

    /// Check status and decode the body into a typed envelope.
    ///
    /// A 2xx answer that says `success: false` (or `status: error`) is a
    /// failure, never an empty success.
    async fn read_body<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: Response,
    ) -> ConnectorResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ConnectorError::network_with_source(format!("Failed to read {operation} response"), e)
        })?;

        debug!(operation = %operation, status = %status, "Received Rocket.Chat response");

        if !status.is_success() {
            return Err(Self::handle_response_error(operation, status, &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ConnectorError::malformed(operation, e.to_string()))?;

        let rejected = value.get("success").and_then(Value::as_bool) == Some(false)
            || value.get("status").and_then(Value::as_str) == Some("error");
        if rejected {
            return Err(ConnectorError::operation_failed(format!(
                "{operation} rejected: {}",
                error_message(&body)
            )));
        }

        serde_json::from_value(value).map_err(|e| ConnectorError::malformed(operation, e.to_string()))
    }

    /// Authenticated GET.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ConnectorResult<T> {
        let session = self.session().await?;
        let url = self.config.api_url(endpoint);

        debug!(url = %url, "Sending Rocket.Chat request");

        let request = Self::authorize(self.client.get(&url), &session).query(query);
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.read_body(endpoint, response).await
    }

    /// Authenticated POST with a JSON body.
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ConnectorResult<T> {
        let session = self.session().await?;
        let url = self.config.api_url(endpoint);

        debug!(url = %url, "Sending Rocket.Chat request");

        let request = Self::authorize(self.client.post(&url), &session).json(body);
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.read_body(endpoint, response).await
    }

    /// Page through a listing until the reported total is reached.
    ///
    /// An empty page before the total is reached is an error; a short
    /// listing is never returned as if it were complete.
    async fn fetch_all<P: Paged>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ConnectorResult<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut query = params.to_vec();
            query.push(("count", self.config.page_size.to_string()));
            query.push(("offset", offset.to_string()));

            let page: P = self.get(endpoint, &query).await?;
            let total = page.total();
            let page_items = page.into_items();
            let received = page_items.len() as u64;
            items.extend(page_items);

            if items.len() as u64 >= total {
                break;
            }

            if received == 0 {
                return Err(ConnectorError::malformed(
                    endpoint,
                    format!("empty page at offset {offset} before total {total} was reached"),
                ));
            }

            offset += received;
        }

        debug!(endpoint = %endpoint, items = items.len(), "Listing complete");
        Ok(items)
    }

    /// Classify a failure while reading a member list.
    ///
    /// Platform outages stay platform errors; everything else (refused,
    /// malformed or truncated answers) means the membership is unreadable.
    fn membership_error(channel: &ChannelRef, error: ConnectorError) -> LookupError {
        match error {
            ConnectorError::ConnectionFailed { .. }
            | ConnectorError::ConnectionTimeout { .. }
            | ConnectorError::NetworkError { .. }
            | ConnectorError::TargetUnavailable { .. }
            | ConnectorError::AuthenticationFailed
            | ConnectorError::Disposed => LookupError::Platform(error),
            other => LookupError::MembershipUnreadable {
                channel: channel.name.clone(),
                reason: other.to_string(),
            },
        }
    }

    /// Invite or kick one account.
    async fn mutate(
        &self,
        action: &str,
        channel: &ChannelRef,
        account: &AccountId,
    ) -> ConnectorResult<()> {
        let endpoint = format!("{}.{action}", room_prefix(channel.visibility));
        let body = RoomMemberRequest {
            room_id: channel.id.as_str(),
            user_id: account.as_str(),
        };

        let _: StatusResponse = self.post(&endpoint, &body).await?;

        debug!(
            channel = %channel.name,
            account = %account,
            action = %action,
            "Membership updated"
        );
        Ok(())
    }
}

fn room_to_record(room: RoomEntry) -> ChannelRecord {
    ChannelRecord {
        id: ChannelId::new(room.id),
        name: room.name,
    }
}

#[async_trait]
impl Connector for RocketChatClient {
    fn connector_type(&self) -> ConnectorType {
        ConnectorType::RocketChat
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        let _: Value = self.get("me", &[]).await?;

        info!(
            base_url = %self.config.base_url,
            "Rocket.Chat connection test successful"
        );

        Ok(())
    }

    async fn dispose(&self) -> ConnectorResult<()> {
        *self.disposed.write().await = true;

        let session = self.session.write().await.take();

        if let (Some(session), RocketChatAuth::Password { .. }) = (session, &self.config.auth) {
            let url = self.config.api_url("logout");
            match Self::authorize(self.client.post(&url), &session).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Rocket.Chat logout was rejected");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Error during Rocket.Chat logout"),
            }
        }

        debug!("Rocket.Chat client disposed");
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for RocketChatClient {
    #[instrument(skip(self))]
    async fn list_accounts(&self) -> ConnectorResult<Vec<AccountRecord>> {
        let users = self.fetch_all::<UsersListResponse>("users.list", &[]).await?;
        let listed = users.len();

        let accounts: Vec<AccountRecord> = users
            .into_iter()
            .filter_map(|user| {
                user.username.map(|username| AccountRecord {
                    id: AccountId::new(user.id),
                    username,
                })
            })
            .collect();

        if accounts.len() < listed {
            debug!(
                skipped = listed - accounts.len(),
                "Accounts without a username were ignored"
            );
        }

        info!(accounts = accounts.len(), "Listed Rocket.Chat accounts");
        Ok(accounts)
    }

    #[instrument(skip(self), fields(pattern = %pattern, visibility = %visibility))]
    async fn find_channels(
        &self,
        pattern: &ChannelPattern,
        visibility: Visibility,
    ) -> ConnectorResult<Vec<ChannelRecord>> {
        let query = json!({ "name": { "$regex": pattern.to_regex() } }).to_string();
        let params = [("query", query)];

        let rooms = match visibility {
            Visibility::Public => {
                self.fetch_all::<ChannelsListResponse>("channels.list", &params)
                    .await?
            }
            Visibility::Private => {
                self.fetch_all::<GroupsListResponse>("groups.listAll", &params)
                    .await?
            }
        };

        Ok(rooms.into_iter().map(room_to_record).collect())
    }

    #[instrument(skip(self), fields(channel = %channel.name))]
    async fn list_members(&self, channel: &ChannelRef) -> Result<Vec<MemberRecord>, LookupError> {
        let endpoint = format!("{}.members", room_prefix(channel.visibility));
        let params = [("roomId", channel.id.as_str().to_string())];

        let members = self
            .fetch_all::<MembersResponse>(&endpoint, &params)
            .await
            .map_err(|e| Self::membership_error(channel, e))?;

        Ok(members
            .into_iter()
            .filter_map(|member| {
                member.username.map(|username| MemberRecord {
                    id: AccountId::new(member.id),
                    username,
                })
            })
            .collect())
    }

    async fn invite(&self, channel: &ChannelRef, account: &AccountId) -> ConnectorResult<()> {
        self.mutate("invite", channel, account).await
    }

    async fn kick(&self, channel: &ChannelRef, account: &AccountId) -> ConnectorResult<()> {
        self.mutate("kick", channel, account).await
    }
}
