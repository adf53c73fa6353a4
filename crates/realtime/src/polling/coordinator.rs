//! Chat polling coordinator
//!
//! Drives paginated thread fetches against the REST endpoint and keeps
//! the resulting view state in memory. Elevated roles get a repeating
//! silent refresh on a fixed interval; everyone else fetches only on
//! demand. Failed silent fetches leave the stale page displayed and
//! never surface an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use campusline_shared::{ChatThread, Pagination, SessionToken, UserRole};

use crate::config::RealtimeConfig;
use crate::error::{FetchError, FetchResult};

use super::filters::{FilterPatch, ThreadFilters};

/// Tunables for the polling coordinator
#[derive(Debug, Clone, Copy)]
pub struct PollerOptions {
    /// Interval between silent background refreshes
    pub poll_interval: Duration,
    /// Page size applied to every fetch
    pub page_size: u32,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            page_size: 20,
        }
    }
}

impl PollerOptions {
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            page_size: config.page_size,
        }
    }
}

/// Snapshot of the thread list as last fetched
#[derive(Debug, Clone, Default)]
pub struct ThreadView {
    pub threads: Vec<ChatThread>,
    pub pagination: Option<Pagination>,
    /// True while a non-silent fetch is in flight
    pub loading: bool,
    /// User-visible message from the last non-silent failure
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadListResponse {
    threads: Vec<ChatThread>,
    pagination: Pagination,
}

#[derive(Clone)]
struct Session {
    role: UserRole,
    token: SessionToken,
}

/// Fetches and caches one page of chat threads at a time.
///
/// Cloning hands out another handle to the same coordinator.
#[derive(Clone)]
pub struct ChatPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    http: reqwest::Client,
    base_url: String,
    options: PollerOptions,
    session: RwLock<Option<Session>>,
    filters: RwLock<ThreadFilters>,
    view: RwLock<ThreadView>,
    timer: Mutex<Option<JoinHandle<()>>>,
    cancelled: AtomicBool,
}

impl ChatPoller {
    pub fn new(base_url: impl Into<String>, options: PollerOptions) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                http: reqwest::Client::new(),
                base_url: base_url.into(),
                session: RwLock::new(None),
                filters: RwLock::new(ThreadFilters::new(options.page_size)),
                view: RwLock::new(ThreadView::default()),
                timer: Mutex::new(None),
                cancelled: AtomicBool::new(false),
                options,
            }),
        }
    }

    /// Install the active session and re-evaluate background polling.
    ///
    /// The refresh timer runs only while the role can view all threads;
    /// a role change that loses that visibility tears the timer down.
    pub async fn update_session(&self, role: UserRole, token: SessionToken) {
        *self.inner.session.write().await = Some(Session { role, token });
        PollerInner::refresh_timer(&self.inner).await;
    }

    /// Drop the session, stopping any background polling
    pub async fn clear_session(&self) {
        *self.inner.session.write().await = None;
        PollerInner::refresh_timer(&self.inner).await;
    }

    /// Fetch the current page with the active filters.
    ///
    /// On success the cached view is replaced wholesale. On failure the
    /// stale view stays displayed; a non-silent failure additionally
    /// sets the view's error message.
    pub async fn fetch_chats(&self, silent: bool) -> FetchResult<()> {
        PollerInner::fetch(&self.inner, silent).await
    }

    /// Merge a partial filter change, reset to page 1, and fetch
    pub async fn update_filters(&self, patch: FilterPatch) -> FetchResult<()> {
        self.inner.filters.write().await.apply(patch);
        PollerInner::fetch(&self.inner, false).await
    }

    /// Advance one page and fetch, only if the last response reported a
    /// next page; otherwise does nothing.
    pub async fn load_more(&self) -> FetchResult<()> {
        let has_next = self
            .inner
            .view
            .read()
            .await
            .pagination
            .map(|p| p.has_next)
            .unwrap_or(false);
        if !has_next {
            tracing::debug!("load_more with no next page; ignoring");
            return Ok(());
        }

        self.inner.filters.write().await.page += 1;
        PollerInner::fetch(&self.inner, false).await
    }

    /// Stop the coordinator for good: tears down the timer and raises
    /// the cancelled flag so in-flight results are discarded.
    pub async fn shutdown(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = self.inner.timer.lock().await.take() {
            task.abort();
        }
        self.inner.view.write().await.loading = false;
        tracing::debug!("chat poller shut down");
    }

    /// Snapshot of the current view state
    pub async fn view(&self) -> ThreadView {
        self.inner.view.read().await.clone()
    }

    /// Snapshot of the active filter set
    pub async fn filters(&self) -> ThreadFilters {
        self.inner.filters.read().await.clone()
    }

    /// True while the background refresh timer is running
    pub async fn is_polling(&self) -> bool {
        self.inner.timer.lock().await.is_some()
    }
}

impl PollerInner {
    async fn eligible(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.role.can_view_all_threads())
            .unwrap_or(false)
    }

    /// Start or stop the background timer to match session eligibility
    async fn refresh_timer(inner: &Arc<PollerInner>) {
        let eligible = inner.eligible().await && !inner.cancelled.load(Ordering::SeqCst);
        let mut timer = inner.timer.lock().await;

        if eligible && timer.is_none() {
            let task_inner = Arc::clone(inner);
            *timer = Some(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(task_inner.options.poll_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // the first tick completes immediately; skip it so the
                // initial fetch stays under the caller's control
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if task_inner.cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    let _ = PollerInner::fetch(&task_inner, true).await;
                }
            }));
            tracing::debug!(
                interval_ms = inner.options.poll_interval.as_millis() as u64,
                "background thread polling started"
            );
        } else if !eligible {
            if let Some(task) = timer.take() {
                task.abort();
                tracing::debug!("background thread polling stopped");
            }
        }
    }

    async fn fetch(inner: &Arc<PollerInner>, silent: bool) -> FetchResult<()> {
        if inner.cancelled.load(Ordering::SeqCst) {
            tracing::debug!("skipping chat fetch after shutdown");
            return Ok(());
        }

        let token = inner.session.read().await.as_ref().map(|s| s.token.clone());
        let Some(token) = token else {
            tracing::debug!("skipping chat fetch without a session token");
            return Ok(());
        };
        let filters = inner.filters.read().await.clone();

        if !silent {
            let mut view = inner.view.write().await;
            view.loading = true;
            view.error = None;
        }

        let result = inner.request(&token, &filters).await;

        // results that land after shutdown must not touch the view
        if inner.cancelled.load(Ordering::SeqCst) {
            tracing::debug!("discarding chat fetch result after shutdown");
            return Ok(());
        }

        match result {
            Ok(body) => {
                let mut view = inner.view.write().await;
                view.threads = body.threads;
                view.pagination = Some(body.pagination);
                view.loading = false;
                view.error = None;
                Ok(())
            }
            Err(err) => {
                let mut view = inner.view.write().await;
                view.loading = false;
                if silent {
                    tracing::warn!(error = %err, "silent chat refresh failed");
                } else {
                    view.error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    async fn request(
        &self,
        token: &SessionToken,
        filters: &ThreadFilters,
    ) -> FetchResult<ThreadListResponse> {
        let url = format!("{}/chats", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .query(&filters.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| String::new());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<ThreadListResponse>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn poller() -> ChatPoller {
        ChatPoller::new("http://127.0.0.1:9", PollerOptions::default())
    }

    #[tokio::test]
    async fn test_timer_requires_elevated_role() {
        let poller = poller();
        poller
            .update_session(UserRole::Teacher, SessionToken::new("teacher-token"))
            .await;
        assert!(!poller.is_polling().await);

        poller
            .update_session(UserRole::Admin, SessionToken::new("admin-token"))
            .await;
        assert!(poller.is_polling().await);

        poller.shutdown().await;
    }

    #[tokio::test]
    async fn test_timer_stops_when_role_downgrades() {
        let poller = poller();
        poller
            .update_session(UserRole::Principal, SessionToken::new("principal-token"))
            .await;
        assert!(poller.is_polling().await);

        poller
            .update_session(UserRole::Teacher, SessionToken::new("principal-token"))
            .await;
        assert!(!poller.is_polling().await);
    }

    #[tokio::test]
    async fn test_timer_stops_when_session_clears() {
        let poller = poller();
        poller
            .update_session(UserRole::Admin, SessionToken::new("admin-token"))
            .await;
        poller.clear_session().await;
        assert!(!poller.is_polling().await);
    }

    #[tokio::test]
    async fn test_fetch_without_session_is_noop() {
        let poller = poller();
        let result = poller.fetch_chats(false).await;
        assert!(result.is_ok());

        let view = poller.view().await;
        assert!(view.threads.is_empty());
        assert!(!view.loading);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_load_more_without_pagination_is_noop() {
        let poller = poller();
        let result = poller.load_more().await;
        assert!(result.is_ok());
        assert_eq!(poller.filters().await.page, 1);
    }
}
