//! CLI commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use newsdesk_core::{ApiResponse, NewsStatus, Notification, ReportStatus};
use newsdesk_http::DashboardClient;
use newsdesk_http::client::{RefreshOutcome, RefreshTrigger};
use newsdesk_http::types::{ListQuery, NewsUpdate};
use serde::Serialize;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a dashboard account
    Login {
        email: String,

        #[arg(long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed in user
    Whoami,

    /// Exchange the refresh token for a new access token
    Refresh {
        /// Refresh even if the access token is not about to expire
        #[arg(long)]
        force: bool,
    },

    /// List users
    Users(ListArgs),

    /// Moderate news articles
    News {
        #[command(subcommand)]
        command: NewsCommands,
    },

    /// Work through user reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Broadcast a push notification
    Notify {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },

    /// Manage backend API keys
    ApiKeys {
        #[command(subcommand)]
        command: ApiKeyCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    search: Option<String>,
}

impl From<ListArgs> for ListQuery {
    fn from(args: ListArgs) -> Self {
        ListQuery {
            page: args.page,
            limit: args.limit,
            status: args.status,
            search: args.search,
        }
    }
}

#[derive(Subcommand)]
pub enum NewsCommands {
    List(ListArgs),

    Get { id: String },

    /// Edit an article's content
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },

    Approve { id: String },

    Reject {
        id: String,

        /// Shown to the author
        #[arg(long)]
        reason: Option<String>,
    },

    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    List(ListArgs),

    Get { id: String },

    /// Move a report to a new status (pending, reviewed, resolved, dismissed)
    SetStatus {
        id: String,

        status: ReportStatus,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    List,

    /// Create a key; the secret is printed once
    Create { name: String },

    Revoke { id: String },
}

impl Commands {
    pub async fn execute(self, client: &DashboardClient) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let session = into_data(client.login(&email, &password).await)?;
                info!(role = session.role.as_str(), "Logged in");
                println!(
                    "Logged in as {} ({})",
                    session.user.display_name(),
                    session.role.as_str()
                );
                Ok(())
            }
            Commands::Logout => {
                client.logout();
                println!("Logged out");
                Ok(())
            }
            Commands::Whoami => match client.current_session() {
                Some(session) => print_json(&session.user),
                None => bail!("Not logged in"),
            },
            Commands::Refresh { force } => {
                let outcome = if force {
                    client.refresh_session(RefreshTrigger::AuthFailure).await?
                } else {
                    client.ensure_fresh_token().await?
                };
                match outcome {
                    RefreshOutcome::Refreshed => println!("Session refreshed"),
                    RefreshOutcome::Skipped => println!("Session still fresh"),
                }
                Ok(())
            }
            Commands::Users(args) => print_response(client.list_users(&args.into()).await),
            Commands::News { command } => command.execute(client).await,
            Commands::Reports { command } => command.execute(client).await,
            Commands::Notify {
                title,
                body,
                topic,
                image_url,
            } => {
                let notification = Notification {
                    title,
                    body,
                    topic,
                    image_url,
                    data: None,
                };
                print_response(client.send_notification(&notification).await)
            }
            Commands::ApiKeys { command } => command.execute(client).await,
        }
    }
}

impl NewsCommands {
    async fn execute(self, client: &DashboardClient) -> Result<()> {
        match self {
            NewsCommands::List(args) => print_response(client.list_news(&args.into()).await),
            NewsCommands::Get { id } => print_response(client.get_news(&id).await),
            NewsCommands::Edit {
                id,
                title,
                content,
                category,
                image_url,
            } => {
                let update = NewsUpdate {
                    title,
                    content,
                    category,
                    image_url,
                };
                print_response(client.update_news(&id, &update).await)
            }
            NewsCommands::Approve { id } => print_response(
                client
                    .set_news_status(&id, NewsStatus::Approved, None)
                    .await,
            ),
            NewsCommands::Reject { id, reason } => print_response(
                client
                    .set_news_status(&id, NewsStatus::Rejected, reason.as_deref())
                    .await,
            ),
            NewsCommands::Delete { id } => print_response(client.delete_news(&id).await),
        }
    }
}

impl ReportCommands {
    async fn execute(self, client: &DashboardClient) -> Result<()> {
        match self {
            ReportCommands::List(args) => print_response(client.list_reports(&args.into()).await),
            ReportCommands::Get { id } => print_response(client.get_report(&id).await),
            ReportCommands::SetStatus { id, status, note } => print_response(
                client
                    .update_report_status(&id, status, note.as_deref())
                    .await,
            ),
        }
    }
}

impl ApiKeyCommands {
    async fn execute(self, client: &DashboardClient) -> Result<()> {
        match self {
            ApiKeyCommands::List => print_response(client.list_api_keys().await),
            ApiKeyCommands::Create { name } => {
                let created = into_data(client.create_api_key(&name).await)?;
                println!("{}", created.key);
                eprintln!("Store this key now, it will not be shown again");
                Ok(())
            }
            ApiKeyCommands::Revoke { id } => print_response(client.revoke_api_key(&id).await),
        }
    }
}

/// Unwrap a response, turning failures into errors carrying the backend message
fn into_data<T>(response: ApiResponse<T>) -> Result<T> {
    match response {
        ApiResponse::Success { data, .. } => Ok(data),
        ApiResponse::Failure { status, message } => bail!("{message} (status {status})"),
    }
}

fn print_response<T: Serialize>(response: ApiResponse<T>) -> Result<()> {
    let data = into_data(response)?;
    print_json(&data)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_args_become_query() {
        let query: ListQuery = ListArgs {
            page: Some(2),
            status: Some("PENDING".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.status.as_deref(), Some("PENDING"));
        assert!(query.limit.is_none());
    }

    #[test]
    fn failures_carry_backend_message() {
        let response: ApiResponse<u32> = ApiResponse::failure(403, "Access denied");
        let err = into_data(response).unwrap_err();
        assert_eq!(err.to_string(), "Access denied (status 403)");
    }
}
