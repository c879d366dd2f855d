//! Typed Rocket.Chat REST response envelopes
//!
//! A missing key is a deserialization error, which the client reports as a
//! malformed response instead of reading it as an empty result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A listing response that carries `total` and one page of items.
pub trait Paged: DeserializeOwned {
    type Item;

    /// Total number of items the platform reports for the whole listing.
    fn total(&self) -> u64;

    /// Consume the envelope, returning this page's items.
    fn into_items(self) -> Vec<Self::Item>;
}

/// `POST /api/v1/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub data: LoginData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Minimal user object returned by `users.list` and `*.members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Minimal room object returned by `channels.list` and `groups.listAll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// `GET /api/v1/users.list`
#[derive(Debug, Clone, Deserialize)]
pub struct UsersListResponse {
    pub users: Vec<UserEntry>,
    pub total: u64,
}

/// `GET /api/v1/channels.list`
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsListResponse {
    pub channels: Vec<RoomEntry>,
    pub total: u64,
}

/// `GET /api/v1/groups.listAll`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupsListResponse {
    pub groups: Vec<RoomEntry>,
    pub total: u64,
}

/// `GET /api/v1/channels.members` and `groups.members`
#[derive(Debug, Clone, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<UserEntry>,
    pub total: u64,
}

/// Body of mutation calls (`invite`, `kick`, `logout`).
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for `{channels|groups}.{invite|kick}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberRequest<'a> {
    pub room_id: &'a str,
    pub user_id: &'a str,
}

impl Paged for UsersListResponse {
    type Item = UserEntry;

    fn total(&self) -> u64 {
        self.total
    }

    fn into_items(self) -> Vec<UserEntry> {
        self.users
    }
}

impl Paged for ChannelsListResponse {
    type Item = RoomEntry;

    fn total(&self) -> u64 {
        self.total
    }

    fn into_items(self) -> Vec<RoomEntry> {
        self.channels
    }
}

impl Paged for GroupsListResponse {
    type Item = RoomEntry;

    fn total(&self) -> u64 {
        self.total
    }

    fn into_items(self) -> Vec<RoomEntry> {
        self.groups
    }
}

impl Paged for MembersResponse {
    type Item = UserEntry;

    fn total(&self) -> u64 {
        self.total
    }

    fn into_items(self) -> Vec<UserEntry> {
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_response_requires_members_key() {
        let body = r#"{"count":0,"offset":0,"total":0,"success":true}"#;
        assert!(serde_json::from_str::<MembersResponse>(body).is_err());
    }

    #[test]
    fn test_users_list_response() {
        let body = r#"{
            "users": [
                {"_id": "u1", "username": "alice", "status": "online"},
                {"_id": "u2"}
            ],
            "count": 2, "offset": 0, "total": 7, "success": true
        }"#;
        let parsed: UsersListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total(), 7);

        let users = parsed.into_items();
        assert_eq!(users[0].username.as_deref(), Some("alice"));
        assert!(users[1].username.is_none());
    }

    #[test]
    fn test_login_response() {
        let body = r#"{"status":"success","data":{"authToken":"tok","userId":"bot","me":{}}}"#;
        let parsed: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.auth_token, "tok");
        assert_eq!(parsed.data.user_id, "bot");
    }

    #[test]
    fn test_room_member_request_is_camel_case() {
        let body = serde_json::to_value(RoomMemberRequest {
            room_id: "r1",
            user_id: "u1",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"roomId": "r1", "userId": "u1"}));
    }
}
