use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::api::{ApiError, FeedClient, FeedPage};
use crate::feed::{FeedController, RequestId};
use crate::lifecycle::LifecycleId;
use crate::post::{PostEvent, PostIntent, PostView};
use crate::theme::ResolvedTheme;
use crate::time::Clock;
use crate::views::comment_row::CommentRow;
use crate::views::feed::{CardFocus, card_lines};
use crate::views::like_control::LikeControl;

/// Select within this many posts of the end and the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// Two media activations on the same post within this window count as a double.
pub const DOUBLE_ACTIVATION_WINDOW: Duration = Duration::from_millis(400);

/// Completed network work, tagged with the component that asked for it.
pub enum AsyncResult {
    Page {
        owner: LifecycleId,
        request_id: RequestId,
        result: Result<FeedPage, ApiError>,
    },
    Post {
        owner: LifecycleId,
        event: PostEvent,
    },
}

/// What a component did with an `AsyncResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The request failed; state is unchanged. Carries the user-facing message.
    Failed(String),
    /// The owner was torn down or is waiting on a different request.
    Discarded,
}

#[derive(Debug)]
pub struct LogEntry {
    pub message: String,
}

/// Debug panel state: recent request outcomes.
#[derive(Debug, Default)]
pub struct DebugState {
    pub visible: bool,
    pub log: VecDeque<LogEntry>,
}

impl DebugState {
    const MAX_LOG_ENTRIES: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.log.push_back(LogEntry {
            message: msg.into(),
        });
        if self.log.len() > Self::MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    /// Typing a comment for the selected post.
    Compose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Post,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,
    NextComment,
    PrevComment,
    ToggleLike,
    ActivateMedia,
    DeleteComment,
    StartCompose,
    ComposeInput(char),
    ComposeBackspace,
    SubmitComment,
    CancelCompose,
    OpenPost,
    OpenOwner,
    Refresh,
    ToggleHelp,
    ToggleDebug,
    Quit,
    UpdateViewportHeight(u16),
}

pub struct App {
    pub feed: FeedController,
    pub feed_url: String,
    pub selected_index: usize,
    /// Selected comment within the selected post.
    pub comment_index: Option<usize>,
    pub mode: Mode,
    pub should_quit: bool,
    pub show_help: bool,
    /// Last failure, cleared on the next key press.
    pub banner: Option<String>,
    pub client: FeedClient,
    pub theme: ResolvedTheme,
    pub clock: Arc<dyn Clock>,
    // Async task management
    pub result_tx: mpsc::Sender<AsyncResult>,
    pub result_rx: mpsc::Receiver<AsyncResult>,
    // Debug pane
    pub debug: DebugState,
    // Viewport tracking for filling the screen with cards
    pub viewport_height: Option<u16>,
    pub loading_start: Option<Instant>,
    last_activation: Option<(i64, Instant)>,
}

impl App {
    pub fn new(
        theme: ResolvedTheme,
        client: FeedClient,
        feed_url: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(64);
        let feed_url = feed_url.into();
        let feed = FeedController::new(
            feed_url.clone(),
            client.clone(),
            Arc::clone(&clock),
            result_tx.clone(),
        );
        Self {
            feed,
            feed_url,
            selected_index: 0,
            comment_index: None,
            mode: Mode::Browse,
            should_quit: false,
            show_help: false,
            banner: None,
            client,
            theme,
            clock,
            result_tx,
            result_rx,
            debug: DebugState::new(),
            viewport_height: None,
            loading_start: None,
            last_activation: None,
        }
    }

    /// Mount a fresh feed and request its first page. Any previous feed is
    /// dropped, which cancels its requests and those of its posts.
    pub fn load_feed(&mut self) {
        self.feed = FeedController::mount(
            self.feed_url.clone(),
            self.client.clone(),
            Arc::clone(&self.clock),
            self.result_tx.clone(),
        );
        self.selected_index = 0;
        self.comment_index = None;
        self.mode = Mode::Browse;
        self.last_activation = None;
        if self.feed.state().is_fetching() {
            self.loading_start = Some(Instant::now());
            self.debug.log(format!("Load feed {}", self.feed_url));
        }
    }

    pub fn handle_async_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Page {
                owner,
                request_id,
                result,
            } => {
                let resolution = self.feed.handle_page(owner, request_id, result);
                self.record("Feed page", &resolution);
                if resolution == Resolution::Applied {
                    self.clamp_selection();
                    if self.should_fill_viewport() {
                        self.load_more();
                    }
                }
            }
            AsyncResult::Post { owner, event } => {
                let label = event.label();
                let resolution = self.feed.handle_post(owner, event);
                self.record(label, &resolution);
                self.clamp_comment();
            }
        }
    }

    fn record(&mut self, what: &str, resolution: &Resolution) {
        match resolution {
            Resolution::Applied => self.debug.log(format!("{what} applied")),
            Resolution::Discarded => self.debug.log(format!("{what} discarded (stale)")),
            Resolution::Failed(message) => {
                self.debug.log(format!("{what} failed: {message}"));
                self.banner = Some(message.clone());
            }
        }
    }

    pub fn update(&mut self, msg: Message) {
        if !matches!(msg, Message::UpdateViewportHeight(_)) {
            self.banner = None;
        }

        match msg {
            Message::SelectNext => {
                self.select(self.selected_index + 1);
                if self.should_load_more() {
                    self.load_more();
                }
            }
            Message::SelectPrev => self.select(self.selected_index.saturating_sub(1)),
            Message::SelectFirst => self.select(0),
            Message::SelectLast => {
                self.select(usize::MAX);
                if self.should_load_more() {
                    self.load_more();
                }
            }
            Message::PageDown => {
                self.select(self.selected_index + 5);
                if self.should_load_more() {
                    self.load_more();
                }
            }
            Message::PageUp => self.select(self.selected_index.saturating_sub(5)),
            Message::NextComment => self.next_comment(),
            Message::PrevComment => self.prev_comment(),
            Message::ToggleLike => self.toggle_like(),
            Message::ActivateMedia => self.activate_media(Instant::now()),
            Message::DeleteComment => self.delete_comment(),
            Message::StartCompose => {
                if self.selected_post().is_some() {
                    self.mode = Mode::Compose;
                }
            }
            Message::ComposeInput(c) => self.edit_draft(|draft| draft.push(c)),
            Message::ComposeBackspace => self.edit_draft(|draft| {
                draft.pop();
            }),
            Message::SubmitComment => self.dispatch(Some(PostIntent::CommentSubmitted)),
            Message::CancelCompose => self.mode = Mode::Browse,
            Message::OpenPost => self.open_link(Link::Post),
            Message::OpenOwner => self.open_link(Link::Owner),
            Message::Refresh => {
                self.debug.log("Refresh");
                self.load_feed();
            }
            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::ToggleDebug => self.debug.toggle(),
            Message::Quit => self.should_quit = true,
            Message::UpdateViewportHeight(height) => {
                let old_height = self.viewport_height;
                self.viewport_height = Some(height);
                if old_height.is_none_or(|h| height > h) && self.should_fill_viewport() {
                    self.load_more();
                }
            }
        }
    }

    pub fn selected_post(&self) -> Option<&PostView> {
        self.feed.posts().get(self.selected_index)
    }

    pub fn focus_for(&self, index: usize) -> CardFocus {
        if index == self.selected_index {
            CardFocus {
                comment: self.comment_index,
                composing: self.mode == Mode::Compose,
            }
        } else {
            CardFocus::default()
        }
    }

    fn select(&mut self, index: usize) {
        let count = self.feed.posts().len();
        let index = index.min(count.saturating_sub(1));
        if index != self.selected_index {
            self.comment_index = None;
        }
        self.selected_index = index;
    }

    fn clamp_selection(&mut self) {
        self.select(self.selected_index);
    }

    fn selected_comment_count(&self) -> usize {
        self.selected_post()
            .map_or(0, |p| p.state().detail.comments.len())
    }

    fn clamp_comment(&mut self) {
        let count = self.selected_comment_count();
        self.comment_index = match self.comment_index {
            Some(_) if count == 0 => None,
            Some(i) => Some(i.min(count - 1)),
            None => None,
        };
    }

    fn next_comment(&mut self) {
        let count = self.selected_comment_count();
        self.comment_index = match self.comment_index {
            None if count > 0 => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            other => other,
        };
    }

    fn prev_comment(&mut self) {
        self.comment_index = match self.comment_index {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    fn toggle_like(&mut self) {
        let intent = self.selected_post().and_then(|post| {
            let state = post.state();
            LikeControl::new(&state.detail.like, state.like_phase(), &self.theme).intent()
        });
        self.dispatch(intent);
    }

    fn activate_media(&mut self, at: Instant) {
        let Some(post_id) = self.selected_post().map(PostView::post_id) else {
            return;
        };
        match self.last_activation.take() {
            Some((previous, first))
                if previous == post_id
                    && at.saturating_duration_since(first) <= DOUBLE_ACTIVATION_WINDOW =>
            {
                self.dispatch(Some(PostIntent::MediaDoubleActivated));
            }
            _ => self.last_activation = Some((post_id, at)),
        }
    }

    fn delete_comment(&mut self) {
        let intent = self.selected_post().and_then(|post| {
            let state = post.state();
            let comment = state.detail.comments.get(self.comment_index?)?;
            CommentRow::new(comment, &self.theme)
                .deleting(state.deleting.contains(&comment.comment_id))
                .intent()
        });
        self.dispatch(intent);
    }

    fn edit_draft(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(mut draft) = self.selected_post().map(|p| p.state().draft.clone()) else {
            return;
        };
        edit(&mut draft);
        self.dispatch(Some(PostIntent::DraftEdited(draft)));
    }

    fn dispatch(&mut self, intent: Option<PostIntent>) {
        let Some(intent) = intent else {
            return;
        };
        let label = intent.label();
        let Some(post) = self.feed.post_mut(self.selected_index) else {
            return;
        };
        let post_id = post.post_id();
        if post.dispatch(intent) {
            self.debug.log(format!("Post {post_id}: {label}"));
        }
    }

    fn open_link(&mut self, link: Link) {
        let Some(target) = self.selected_post().map(|p| {
            let detail = &p.state().detail;
            match link {
                Link::Post => detail.post_profile_url.clone(),
                Link::Owner => detail.owner_profile_url.clone(),
            }
        }) else {
            return;
        };
        if target.is_empty() {
            self.banner = Some("Post has not loaded yet".to_string());
            return;
        }
        match self.client.resolve(&target) {
            Ok(url) => {
                tracing::debug!(%url, "opening in browser");
                if let Err(e) = open::that(url.as_str()) {
                    self.banner = Some(format!("Could not open browser: {e}"));
                }
            }
            Err(e) => self.banner = Some(e.user_message()),
        }
    }

    fn should_load_more(&self) -> bool {
        let state = self.feed.state();
        let count = self.feed.posts().len();
        state.loaded
            && state.has_more()
            && !state.is_fetching()
            && count > 0
            && self.selected_index + LOAD_MORE_THRESHOLD >= count
    }

    /// Rows available for cards: the terminal minus borders and the status bar.
    pub fn card_area_height(&self) -> usize {
        const LAYOUT_OVERHEAD: u16 = 3;
        self.viewport_height
            .map_or(0, |h| h.saturating_sub(LAYOUT_OVERHEAD) as usize)
    }

    /// Rows the loaded cards take when nothing wraps.
    fn content_height(&self) -> usize {
        self.feed
            .posts()
            .iter()
            .enumerate()
            .map(|(i, p)| card_lines(p.state(), self.focus_for(i), &self.theme, u16::MAX).len())
            .sum()
    }

    fn should_fill_viewport(&self) -> bool {
        let state = self.feed.state();
        state.loaded
            && state.has_more()
            && !state.is_fetching()
            && !self.feed.posts().is_empty()
            && self.content_height() < self.card_area_height()
    }

    fn load_more(&mut self) {
        if self.feed.load_next() {
            self.loading_start = Some(Instant::now());
            self.debug.log("Load next page");
        }
    }
}
