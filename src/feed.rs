//! Cursor-driven pagination of the post feed.
//!
//! `FeedState` holds the ordered summaries and the opaque cursor. At most one
//! page request is outstanding at a time, so pages are applied in the order
//! they were requested and repeated "near end" signals cannot double-fetch.
//! `FeedController` runs the requests and mounts one `PostView` per summary.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{ApiError, Cursor, FeedClient, FeedPage, PostSummary};
use crate::app::{AsyncResult, Resolution};
use crate::lifecycle::{Lifecycle, LifecycleId};
use crate::post::{PostEvent, PostView};
use crate::time::Clock;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Replaces the (empty) initial sequence.
    Initial,
    /// Appends to the sequence.
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFetch {
    pub request_id: RequestId,
    pub kind: PageKind,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    pub feed_url: String,
    pub results: Vec<PostSummary>,
    pub cursor: Cursor,
    /// Set once the first page has been applied.
    pub loaded: bool,
    pub error: Option<String>,
    in_flight: Option<(RequestId, PageKind)>,
    next_request_id: RequestId,
}

impl FeedState {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            ..Self::default()
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_fetching_more(&self) -> bool {
        matches!(self.in_flight, Some((_, PageKind::Next)))
    }

    pub fn has_more(&self) -> bool {
        !self.cursor.is_exhausted()
    }

    /// The feed loaded and the cursor ran out: show the terminal marker.
    pub fn is_caught_up(&self) -> bool {
        self.loaded && self.cursor.is_exhausted()
    }

    pub fn is_awaiting(&self, request_id: RequestId) -> bool {
        matches!(self.in_flight, Some((id, _)) if id == request_id)
    }

    pub fn request_initial(self) -> (Self, Option<PageFetch>) {
        let target = self.feed_url.clone();
        self.begin(PageKind::Initial, target)
    }

    pub fn request_next(self) -> (Self, Option<PageFetch>) {
        let Some(target) = self.cursor.target().map(str::to_owned) else {
            return (self, None);
        };
        self.begin(PageKind::Next, target)
    }

    fn begin(mut self, kind: PageKind, target: String) -> (Self, Option<PageFetch>) {
        if let Some((request_id, pending)) = self.in_flight {
            tracing::debug!(request_id, ?pending, ?kind, "page request in flight, ignoring");
            return (self, None);
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some((request_id, kind));
        let fetch = PageFetch {
            request_id,
            kind,
            target,
        };
        (self, Some(fetch))
    }

    pub fn apply(mut self, request_id: RequestId, result: Result<FeedPage, ApiError>) -> Self {
        let Some((pending, kind)) = self.in_flight else {
            return self;
        };
        if pending != request_id {
            tracing::debug!(request_id, pending, "page result for another request, discarding");
            return self;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                tracing::info!(
                    ?kind,
                    received = page.results.len(),
                    exhausted = page.cursor.is_exhausted(),
                    "feed page applied"
                );
                match kind {
                    PageKind::Initial => self.results = page.results,
                    PageKind::Next => self.results.extend(page.results),
                }
                self.cursor = page.cursor;
                self.loaded = true;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(?kind, error = %err, "feed page failed");
                self.error = Some(err.user_message());
            }
        }
        self
    }
}

/// Owns the feed state and one mounted `PostView` per summary.
pub struct FeedController {
    state: FeedState,
    posts: Vec<PostView>,
    lifecycle: Lifecycle,
    client: FeedClient,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<AsyncResult>,
}

impl FeedController {
    pub fn new(
        feed_url: impl Into<String>,
        client: FeedClient,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<AsyncResult>,
    ) -> Self {
        Self {
            state: FeedState::new(feed_url),
            posts: Vec::new(),
            lifecycle: Lifecycle::new(),
            client,
            clock,
            tx,
        }
    }

    /// Create the controller and fetch the first page.
    pub fn mount(
        feed_url: impl Into<String>,
        client: FeedClient,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<AsyncResult>,
    ) -> Self {
        let mut controller = Self::new(feed_url, client, clock, tx);
        controller.load_initial();
        controller
    }

    /// A controller over already-fetched posts, for exercising the UI.
    #[cfg(test)]
    pub fn preloaded(
        feed_url: impl Into<String>,
        client: FeedClient,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<AsyncResult>,
        posts: Vec<crate::post::PostState>,
        cursor: Cursor,
    ) -> Self {
        let mut controller = Self::new(feed_url, client, clock, tx);
        controller.state.results = posts
            .iter()
            .map(|p| PostSummary {
                post_id: p.post_id,
                detail_url: p.detail_url.clone(),
            })
            .collect();
        controller.state.cursor = cursor;
        controller.state.loaded = true;
        controller.posts = posts
            .into_iter()
            .map(|state| {
                PostView::with_state(
                    state,
                    controller.client.clone(),
                    Arc::clone(&controller.clock),
                    controller.tx.clone(),
                )
            })
            .collect();
        controller
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut FeedState {
        &mut self.state
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn posts(&self) -> &[PostView] {
        &self.posts
    }

    pub fn post_mut(&mut self, index: usize) -> Option<&mut PostView> {
        self.posts.get_mut(index)
    }

    /// Outstanding requests across the feed and its posts.
    pub fn in_flight(&self) -> usize {
        usize::from(self.state.is_fetching())
            + self
                .posts
                .iter()
                .map(|p| {
                    let s = p.state();
                    usize::from(s.like_pending.is_some())
                        + usize::from(s.comment_pending)
                        + s.deleting.len()
                        + usize::from(!s.loaded && s.error.is_none())
                })
                .sum::<usize>()
    }

    /// Returns true when a request was issued.
    pub fn load_initial(&mut self) -> bool {
        let (state, fetch) = std::mem::take(&mut self.state).request_initial();
        self.state = state;
        self.issue(fetch)
    }

    /// The "approaching end of list" signal. Returns true when a request was issued.
    pub fn load_next(&mut self) -> bool {
        let (state, fetch) = std::mem::take(&mut self.state).request_next();
        self.state = state;
        self.issue(fetch)
    }

    pub fn handle_page(
        &mut self,
        owner: LifecycleId,
        request_id: RequestId,
        result: Result<FeedPage, ApiError>,
    ) -> Resolution {
        if !self.lifecycle.owns(owner) || !self.state.is_awaiting(request_id) {
            return Resolution::Discarded;
        }
        let initial = matches!(self.state.in_flight, Some((_, PageKind::Initial)));
        let failure = result.as_ref().err().map(ApiError::user_message);
        self.state = std::mem::take(&mut self.state).apply(request_id, result);

        match failure {
            Some(message) => Resolution::Failed(message),
            None => {
                self.mount_posts(initial);
                Resolution::Applied
            }
        }
    }

    pub fn handle_post(&mut self, owner: LifecycleId, event: PostEvent) -> Resolution {
        match self.posts.iter_mut().find(|p| p.owner() == owner) {
            Some(post) => post.handle(owner, event),
            None => Resolution::Discarded,
        }
    }

    fn mount_posts(&mut self, replace: bool) {
        if replace {
            self.posts.clear();
        }
        let mounted = self.posts.len();
        for summary in self.state.results.iter().skip(mounted) {
            self.posts.push(PostView::mount(
                summary.clone(),
                self.client.clone(),
                Arc::clone(&self.clock),
                self.tx.clone(),
            ));
        }
    }

    fn issue(&self, fetch: Option<PageFetch>) -> bool {
        let Some(fetch) = fetch else {
            return false;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        let liveness = self.lifecycle.liveness();
        tracing::debug!(request_id = fetch.request_id, kind = ?fetch.kind, target = %fetch.target, "fetching page");

        tokio::spawn(async move {
            let Some(result) = liveness
                .guard(client.fetch_feed_page(&fetch.target))
                .await
            else {
                tracing::debug!(request_id = fetch.request_id, "feed torn down, dropping page");
                return;
            };
            let _ = tx
                .send(AsyncResult::Page {
                    owner: liveness.owner(),
                    request_id: fetch.request_id,
                    result,
                })
                .await;
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{DetailBuilder, TEST_NOW, mock_client, page_json};
    use crate::time::fixed_clock;
    use wiremock::matchers::{method, path, path_regex, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = "/api/v1/posts/";
    const PAGE_TWO: &str = "/api/v1/posts/?size=2&page=1&postid_lte=3";

    fn page(ids: &[i64], next: &str) -> FeedPage {
        serde_json::from_value(page_json(ids, next)).unwrap()
    }

    /// Drain results until the next feed page, applying post results on the way.
    async fn next_page(
        feed: &mut FeedController,
        rx: &mut mpsc::Receiver<AsyncResult>,
    ) -> Resolution {
        loop {
            match rx.recv().await {
                Some(AsyncResult::Page {
                    owner,
                    request_id,
                    result,
                }) => return feed.handle_page(owner, request_id, result),
                Some(AsyncResult::Post { owner, event }) => {
                    feed.handle_post(owner, event);
                }
                None => panic!("channel closed"),
            }
        }
    }

    async fn mock_details(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v1/posts/\d+/$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(DetailBuilder::new().json()))
            .mount(server)
            .await;
    }

    fn ids(feed: &FeedController) -> Vec<i64> {
        feed.state().results.iter().map(|s| s.post_id).collect()
    }

    // Pure transitions

    #[test]
    fn initial_page_replaces_and_next_appends() {
        let (state, fetch) = FeedState::new(FEED).request_initial();
        let fetch = fetch.unwrap();
        assert_eq!(fetch.target, FEED);
        assert_eq!(fetch.kind, PageKind::Initial);
        let state = state.apply(fetch.request_id, Ok(page(&[3, 2], PAGE_TWO)));

        let (state, fetch) = state.request_next();
        let fetch = fetch.unwrap();
        assert_eq!(fetch.target, PAGE_TWO);
        let state = state.apply(fetch.request_id, Ok(page(&[1], "")));

        let ids: Vec<_> = state.results.iter().map(|s| s.post_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(state.is_caught_up());
        assert!(!state.is_fetching());
    }

    #[test]
    fn second_trigger_while_in_flight_is_ignored() {
        let (state, _) = FeedState::new(FEED).request_initial();
        let (state, again) = state.request_initial();
        assert_eq!(again, None);
        assert!(state.is_fetching());
    }

    #[test]
    fn next_is_a_no_op_without_cursor() {
        let (state, fetch) = FeedState::new(FEED).request_next();
        assert_eq!(fetch, None);
        assert!(!state.is_fetching());
    }

    #[test]
    fn failure_leaves_results_and_cursor() {
        let (state, fetch) = FeedState::new(FEED).request_initial();
        let state = state.apply(fetch.unwrap().request_id, Ok(page(&[3, 2], PAGE_TWO)));
        let before = (state.results.clone(), state.cursor.clone());

        let (state, fetch) = state.request_next();
        let state = state.apply(
            fetch.unwrap().request_id,
            Err(ApiError::Transport("connection failed".into())),
        );

        assert_eq!((state.results.clone(), state.cursor.clone()), before);
        assert!(state.error.is_some());
        assert!(!state.is_fetching());
        // The UI can signal again.
        assert!(state.request_next().1.is_some());
    }

    #[test]
    fn unknown_request_results_are_ignored() {
        let (state, _) = FeedState::new(FEED).request_initial();
        let state = state.apply(99, Ok(page(&[1], "")));
        assert!(state.results.is_empty());
        assert!(state.is_fetching());
    }

    // Against a mock server

    #[tokio::test]
    async fn paginates_in_order_until_caught_up() {
        let server = MockServer::start().await;
        mock_details(&server).await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3, 2], PAGE_TWO)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], "")))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(32);
        let mut feed = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        assert_eq!(next_page(&mut feed, &mut rx).await, Resolution::Applied);
        assert_eq!(ids(&feed), vec![3, 2]);
        assert!(!feed.state().is_caught_up());

        assert!(feed.load_next());
        assert_eq!(next_page(&mut feed, &mut rx).await, Resolution::Applied);
        assert_eq!(ids(&feed), vec![3, 2, 1]);
        assert!(feed.state().cursor.is_exhausted());
        assert!(feed.state().is_caught_up());

        assert!(!feed.load_next());
        assert!(!feed.load_next());

        let mounted: Vec<_> = feed.posts().iter().map(PostView::post_id).collect();
        assert_eq!(mounted, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn rapid_near_end_signals_fetch_once() {
        let server = MockServer::start().await;
        mock_details(&server).await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3, 2], PAGE_TWO)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], "")))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(32);
        let mut feed = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        next_page(&mut feed, &mut rx).await;

        assert!(feed.load_next());
        assert!(!feed.load_next());
        assert!(!feed.load_next());
        assert!(feed.state().is_fetching_more());

        next_page(&mut feed, &mut rx).await;
        assert_eq!(ids(&feed), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn failed_initial_load_shows_empty_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(8);
        let mut feed = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        let resolution = next_page(&mut feed, &mut rx).await;

        assert!(matches!(resolution, Resolution::Failed(_)));
        assert!(feed.state().results.is_empty());
        assert!(!feed.state().loaded);
        assert!(!feed.state().is_caught_up());
        assert!(feed.posts().is_empty());
    }

    #[tokio::test]
    async fn failed_next_page_can_be_retriggered() {
        let server = MockServer::start().await;
        mock_details(&server).await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3, 2], PAGE_TWO)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], "")))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(32);
        let mut feed = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        next_page(&mut feed, &mut rx).await;

        feed.load_next();
        let resolution = next_page(&mut feed, &mut rx).await;
        assert!(matches!(resolution, Resolution::Failed(_)));
        assert_eq!(ids(&feed), vec![3, 2]);
        assert_eq!(feed.state().cursor.target(), Some(PAGE_TWO));

        assert!(feed.load_next());
        assert_eq!(next_page(&mut feed, &mut rx).await, Resolution::Applied);
        assert_eq!(ids(&feed), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn pages_for_a_torn_down_feed_are_discarded() {
        let server = MockServer::start().await;
        mock_details(&server).await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3], "")))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(32);
        let old = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx.clone());
        let stale = rx.recv().await;
        drop(old);

        let mut feed = FeedController::new(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        let Some(AsyncResult::Page {
            owner,
            request_id,
            result,
        }) = stale
        else {
            panic!("expected a page result");
        };
        assert_eq!(feed.handle_page(owner, request_id, result), Resolution::Discarded);
        assert!(feed.state().results.is_empty());
    }

    #[tokio::test]
    async fn post_results_route_to_their_view() {
        let server = MockServer::start().await;
        mock_details(&server).await;
        Mock::given(method("GET"))
            .and(path(FEED))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3, 2], "")))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(32);
        let mut feed = FeedController::mount(FEED, mock_client(&server), fixed_clock(TEST_NOW), tx);
        next_page(&mut feed, &mut rx).await;

        for _ in 0..2 {
            match rx.recv().await {
                Some(AsyncResult::Post { owner, event }) => {
                    assert_eq!(feed.handle_post(owner, event), Resolution::Applied);
                }
                _ => panic!("expected a post result"),
            }
        }
        assert!(feed.posts().iter().all(|p| p.state().loaded));
        assert_eq!(feed.in_flight(), 0);
    }
}
