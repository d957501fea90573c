//! Single-flight token refresh
//!
//! At most one `POST /auth/refresh` is in flight per client. The first caller
//! to need a refresh parks a [`Shared`] future in the slot; everyone arriving
//! while it runs clones and awaits the same future, then replays their own
//! request once with whatever token it produced. The slot mutex is only held
//! to inspect or swap the future, never across an await.
//!
//! Replays happen in the order callers joined: each joiner takes a
//! [`ReplayTicket`] chained to the one before it and only sends its replay
//! once the previous replay has finished.
//!
//! A failed refresh purges the session and fires the logout hook. Speculative
//! refreshes are additionally throttled by a cooldown measured from the last
//! successful login or refresh, as persisted in the session.

use super::{ClientInner, LogoutReason, RequestOptions};
use crate::types::{RefreshData, RefreshRequest};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};
use newsdesk_core::TokenPair;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub(crate) const REFRESH_ENDPOINT: &str = "/auth/refresh";

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// What asked for the refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Proactive refresh; skipped inside the cooldown window
    Speculative,
    /// The backend rejected the current token; always refreshes
    AuthFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    /// A speculative refresh inside the cooldown window
    Skipped,
}

/// Refresh failures. Every one of these has already cleared the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    #[error("failed to store refreshed tokens: {0}")]
    Storage(String),
}

impl RefreshError {
    fn logout_reason(&self) -> LogoutReason {
        match self {
            Self::MissingRefreshToken => LogoutReason::MissingRefreshToken,
            _ => LogoutReason::RefreshFailed,
        }
    }
}

/// Per-client refresh bookkeeping
#[derive(Default)]
pub(crate) struct RefreshState {
    in_flight: Mutex<Option<InFlight>>,
}

struct InFlight {
    refresh: SharedRefresh,
    /// Released when the most recent joiner has finished its replay
    last_replay: Option<oneshot::Receiver<()>>,
}

impl InFlight {
    fn new(refresh: SharedRefresh) -> Self {
        Self {
            refresh,
            last_replay: None,
        }
    }

    /// Queue behind every earlier joiner
    fn take_ticket(&mut self) -> ReplayTicket {
        let (done, next) = oneshot::channel();
        ReplayTicket {
            previous: self.last_replay.replace(next),
            _done: done,
        }
    }
}

/// A caller's place in the replay order of one refresh.
///
/// Dropping the ticket lets the next caller replay, so it must be held until
/// the replay has completed.
#[derive(Debug)]
pub(crate) struct ReplayTicket {
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl ReplayTicket {
    async fn wait_turn(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            // cancellation means the previous caller is done or gone
            let _ = previous.await;
            self.previous = None;
        }
    }
}

impl ClientInner {
    pub(crate) async fn refresh(
        self: &Arc<Self>,
        trigger: RefreshTrigger,
    ) -> Result<RefreshOutcome, RefreshError> {
        match trigger {
            RefreshTrigger::Speculative => self.refresh_speculative().await,
            RefreshTrigger::AuthFailure => {
                let current = self.session.access_token();
                self.refresh_after_rejection(current)
                    .await
                    .map(|_| RefreshOutcome::Refreshed)
            }
        }
    }

    /// Token to replay a request with after `rejected` was refused.
    ///
    /// Joins the in-flight refresh if there is one. If the stored token has
    /// already moved on from `rejected`, another request refreshed in the
    /// meantime and the stored token is returned without a network call. If
    /// the session has already been purged since `rejected` was sent, the
    /// logout has been announced and this fails quietly.
    ///
    /// The returned ticket orders replays among callers of the same refresh.
    pub(crate) async fn refresh_after_rejection(
        self: &Arc<Self>,
        rejected: Option<String>,
    ) -> Result<(String, Option<ReplayTicket>), RefreshError> {
        let (refresh, mut ticket) = {
            let mut slot = self
                .refresh
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match slot.as_mut() {
                Some(in_flight) => {
                    debug!("Joining in-flight refresh");
                    (in_flight.refresh.clone(), in_flight.take_ticket())
                }
                None => {
                    match self.session.access_token() {
                        Some(current) if rejected.as_deref() != Some(current.as_str()) => {
                            debug!("Token already rotated, replaying without refresh");
                            return Ok((current, None));
                        }
                        None if rejected.is_some() && self.session.refresh_token().is_none() => {
                            debug!("Session already ended, dropping request");
                            return Err(RefreshError::MissingRefreshToken);
                        }
                        _ => {}
                    }
                    let mut in_flight = InFlight::new(self.clone().start_refresh());
                    let ticket = in_flight.take_ticket();
                    let refresh = in_flight.refresh.clone();
                    *slot = Some(in_flight);
                    (refresh, ticket)
                }
            }
        };

        let token = refresh.await?;
        ticket.wait_turn().await;
        Ok((token, Some(ticket)))
    }

    async fn refresh_speculative(self: &Arc<Self>) -> Result<RefreshOutcome, RefreshError> {
        let refresh = {
            let mut slot = self
                .refresh
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match slot.as_ref() {
                Some(in_flight) => in_flight.refresh.clone(),
                None => {
                    if self.session.refreshed_within(self.refresh_cooldown) {
                        debug!("Refreshed recently, skipping speculative refresh");
                        return Ok(RefreshOutcome::Skipped);
                    }
                    let refresh = self.clone().start_refresh();
                    *slot = Some(InFlight::new(refresh.clone()));
                    refresh
                }
            }
        };

        refresh.await.map(|_| RefreshOutcome::Refreshed)
    }

    fn start_refresh(self: Arc<Self>) -> SharedRefresh {
        self.perform_refresh().boxed().shared()
    }

    async fn perform_refresh(self: Arc<Self>) -> Result<String, RefreshError> {
        let result = self.exchange_refresh_token().await;

        match &result {
            Ok(_) => info!("Session refreshed"),
            Err(e) => {
                warn!(error = %e, "Session refresh failed, logging out");
                self.session.clear();
            }
        }

        self.refresh
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Err(e) = &result {
            self.notify_logout(e.logout_reason());
        }
        result
    }

    async fn exchange_refresh_token(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        let options = RequestOptions::json(
            reqwest::Method::POST,
            &RefreshRequest {
                refresh_token: refresh_token.clone(),
            },
        )
        .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        let envelope = self.send(REFRESH_ENDPOINT, &options, None).await;
        if !envelope.success {
            return Err(RefreshError::Rejected {
                status: envelope.status,
                message: envelope.message,
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| RefreshError::MalformedResponse("missing data".into()))?;
        let data: RefreshData = serde_json::from_value(data)
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        let tokens = TokenPair {
            access_token: data.jwt,
            refresh_token: data.refresh_token.unwrap_or(refresh_token),
        };
        self.session
            .store_tokens(&tokens)
            .map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_refresh() -> InFlight {
        InFlight::new(futures::future::ready(Ok("a2".to_string())).boxed().shared())
    }

    #[tokio::test]
    async fn tickets_release_in_join_order() {
        let mut in_flight = ready_refresh();
        let mut first = in_flight.take_ticket();
        let mut second = in_flight.take_ticket();
        let mut third = in_flight.take_ticket();

        first.wait_turn().await;
        // second may not start while first holds its ticket
        assert!(second.wait_turn().now_or_never().is_none());
        assert!(third.wait_turn().now_or_never().is_none());

        drop(first);
        second.wait_turn().await;
        drop(second);
        third.wait_turn().await;
    }

    #[tokio::test]
    async fn abandoned_ticket_does_not_block_the_queue() {
        let mut in_flight = ready_refresh();
        let first = in_flight.take_ticket();
        let mut second = in_flight.take_ticket();

        drop(first);
        second.wait_turn().await;
    }

    #[test]
    fn missing_refresh_token_has_its_own_logout_reason() {
        assert_eq!(
            RefreshError::MissingRefreshToken.logout_reason(),
            LogoutReason::MissingRefreshToken
        );
        let rejected = RefreshError::Rejected {
            status: 401,
            message: "expired".into(),
        };
        assert_eq!(rejected.logout_reason(), LogoutReason::RefreshFailed);
    }
}
