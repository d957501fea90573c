use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Backend role granting full dashboard access
pub const ADMIN_ROLE: &str = "ADMIN";
/// Backend role granting moderation access
pub const EMPLOYEE_ROLE: &str = "EMPLOYEE";

/// Role a user holds inside the dashboard.
///
/// The backend knows more roles than these two; anyone who is neither an
/// admin nor an employee is refused at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardRole {
    Admin,
    Employee,
}

impl DashboardRole {
    /// Pick the dashboard role from a backend role list. `ADMIN` wins over `EMPLOYEE`.
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Option<Self> {
        let has = |wanted: &str| roles.iter().any(|r| r.as_ref().eq_ignore_ascii_case(wanted));

        if has(ADMIN_ROLE) {
            Some(Self::Admin)
        } else if has(EMPLOYEE_ROLE) {
            Some(Self::Employee)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for DashboardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            other => Err(format!("unknown dashboard role: {other}")),
        }
    }
}

/// User as returned by the backend at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl User {
    /// Dashboard role derived from the backend roles, if any
    pub fn dashboard_role(&self) -> Option<DashboardRole> {
        DashboardRole::from_roles(&self.roles)
    }

    /// Name to show for this user
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

/// Access and refresh token, always replaced together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Everything the dashboard knows about the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub tokens: TokenPair,
    pub user: User,
    pub role: DashboardRole,
    /// Time of the last successful login or token refresh
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Moderation state of a news article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewsStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl FromStr for NewsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown news status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub status: NewsStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Workflow state of a user report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
    #[serde(other)]
    Unknown,
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "REVIEWED" => Ok(Self::Reviewed),
            "RESOLVED" => Ok(Self::Resolved),
            "DISMISSED" => Ok(Self::Dismissed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub news_id: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Push notification to broadcast to app users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// A freshly created key; the secret is only ever returned once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub api_key: ApiKey,
    pub key: String,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Signed(n) => n.to_string(),
            StringOrNumber::Unsigned(n) => n.to_string(),
        }
    }
}

/// Backend identifiers show up both as strings and as integers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|id| id.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_wins_over_employee() {
        let roles = vec!["EMPLOYEE".to_string(), "ADMIN".to_string()];
        assert_eq!(DashboardRole::from_roles(&roles), Some(DashboardRole::Admin));
    }

    #[test]
    fn employee_role_maps_to_employee() {
        assert_eq!(
            DashboardRole::from_roles(&["EMPLOYEE"]),
            Some(DashboardRole::Employee)
        );
    }

    #[test]
    fn plain_users_have_no_dashboard_role() {
        assert_eq!(DashboardRole::from_roles(&["USER"]), None);
        assert_eq!(DashboardRole::from_roles::<&str>(&[]), None);
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        let role: DashboardRole = "employee".parse().unwrap();
        assert_eq!(role, DashboardRole::Employee);
        assert_eq!(DashboardRole::Admin.to_string(), "admin");
        assert!("moderator".parse::<DashboardRole>().is_err());
    }

    #[test]
    fn user_accepts_numeric_ids() {
        let user: User = serde_json::from_value(json!({
            "id": 42,
            "email": "admin@example.com",
            "roles": ["ADMIN"]
        }))
        .unwrap();

        assert_eq!(user.id, "42");
        assert_eq!(user.display_name(), "admin@example.com");
        assert_eq!(user.dashboard_role(), Some(DashboardRole::Admin));
    }

    #[test]
    fn unknown_news_status_does_not_fail_parsing() {
        let article: NewsArticle = serde_json::from_value(json!({
            "id": "n1",
            "title": "Headline",
            "status": "ARCHIVED"
        }))
        .unwrap();

        assert_eq!(article.status, NewsStatus::Unknown);
    }

    #[test]
    fn created_api_key_flattens_key_fields() {
        let created: CreatedApiKey = serde_json::from_value(json!({
            "id": 7,
            "name": "mobile-app",
            "key": "nd_live_secret"
        }))
        .unwrap();

        assert_eq!(created.api_key.id, "7");
        assert!(created.api_key.active);
        assert_eq!(created.key, "nd_live_secret");
    }
}
