//! Per-post mutation and reconciliation.
//!
//! `PostState` is a plain value. User intents go through [`PostState::intent`],
//! which may produce a single [`PostCommand`] for the network; the command's
//! outcome comes back as a [`PostEvent`] and is folded in with
//! [`PostState::apply`]. Local state only changes once the server confirms.
//!
//! `PostView` owns one `PostState`, runs its commands on the runtime and
//! discards results that arrive after it was torn down.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{ApiError, Comment, FeedClient, PostDetail, PostSummary};
use crate::app::{AsyncResult, Resolution};
use crate::lifecycle::{Lifecycle, LifecycleId};
use crate::time::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikePhase {
    Unliked,
    Liked,
    /// A like request is outstanding; the control is disabled.
    Pending(LikeAction),
}

/// What the viewer asked for. Emitted by the controls and the key map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostIntent {
    LikeToggled,
    /// Double activation on the media: like only, never unlike.
    MediaDoubleActivated,
    DraftEdited(String),
    CommentSubmitted,
    CommentDeleteRequested { comment_id: i64 },
}

impl PostIntent {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LikeToggled => "toggle like",
            Self::MediaDoubleActivated => "double-tap like",
            Self::DraftEdited(_) => "edit draft",
            Self::CommentSubmitted => "submit comment",
            Self::CommentDeleteRequested { .. } => "delete comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommand {
    FetchDetail { post_id: i64, target: String },
    CreateLike { post_id: i64 },
    DeleteLike { target: String },
    CreateComment { post_id: i64, text: String },
    DeleteComment { comment_id: i64 },
}

impl PostCommand {
    pub fn describe(&self) -> String {
        match self {
            Self::FetchDetail { post_id, .. } => format!("Load post {post_id}"),
            Self::CreateLike { post_id } => format!("Like post {post_id}"),
            Self::DeleteLike { target } => format!("Unlike {target}"),
            Self::CreateComment { post_id, .. } => format!("Comment on post {post_id}"),
            Self::DeleteComment { comment_id } => format!("Delete comment {comment_id}"),
        }
    }
}

/// Confirmed outcome of a `PostCommand`.
#[derive(Debug)]
pub enum PostEvent {
    DetailLoaded(Result<PostDetail, ApiError>),
    /// Carries the delete resource URL for the new like.
    LikeCreated(Result<String, ApiError>),
    LikeDeleted(Result<(), ApiError>),
    CommentCreated(Result<Comment, ApiError>),
    CommentDeleted {
        comment_id: i64,
        result: Result<(), ApiError>,
    },
}

impl PostEvent {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DetailLoaded(_) => "Post detail",
            Self::LikeCreated(_) => "Like",
            Self::LikeDeleted(_) => "Unlike",
            Self::CommentCreated(_) => "Comment",
            Self::CommentDeleted { .. } => "Delete comment",
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::DetailLoaded(r) => r.as_ref().err(),
            Self::LikeCreated(r) => r.as_ref().err(),
            Self::LikeDeleted(r) => r.as_ref().err(),
            Self::CommentCreated(r) => r.as_ref().err(),
            Self::CommentDeleted { result, .. } => result.as_ref().err(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostState {
    pub post_id: i64,
    pub detail_url: String,
    pub detail: PostDetail,
    pub loaded: bool,
    pub like_pending: Option<LikeAction>,
    pub draft: String,
    pub comment_pending: bool,
    /// Comment ids with a delete request outstanding.
    pub deleting: Vec<i64>,
    /// User-facing message for the most recent failed request, if it failed.
    pub error: Option<String>,
}

impl PostState {
    pub fn new(summary: PostSummary) -> Self {
        Self {
            post_id: summary.post_id,
            detail_url: summary.detail_url,
            detail: PostDetail {
                post_id: summary.post_id,
                ..PostDetail::default()
            },
            ..Self::default()
        }
    }

    pub fn like_phase(&self) -> LikePhase {
        match self.like_pending {
            Some(action) => LikePhase::Pending(action),
            None if self.detail.like.liked_by_viewer => LikePhase::Liked,
            None => LikePhase::Unliked,
        }
    }

    pub fn mount(self) -> (Self, Option<PostCommand>) {
        let command = PostCommand::FetchDetail {
            post_id: self.post_id,
            target: self.detail_url.clone(),
        };
        (self, Some(command))
    }

    pub fn intent(mut self, intent: PostIntent) -> (Self, Option<PostCommand>) {
        if let PostIntent::DraftEdited(text) = intent {
            self.draft = text;
            return (self, None);
        }
        if !self.loaded {
            tracing::debug!(post_id = self.post_id, ?intent, "post not loaded, ignoring");
            return (self, None);
        }

        let command = match intent {
            PostIntent::LikeToggled => self.begin_like_toggle(),
            PostIntent::MediaDoubleActivated => match self.like_phase() {
                LikePhase::Unliked => self.begin_like_toggle(),
                LikePhase::Liked | LikePhase::Pending(_) => None,
            },
            PostIntent::CommentSubmitted => self.begin_comment(),
            PostIntent::CommentDeleteRequested { comment_id } => self.begin_delete(comment_id),
            PostIntent::DraftEdited(_) => None,
        };
        (self, command)
    }

    fn begin_like_toggle(&mut self) -> Option<PostCommand> {
        match self.like_phase() {
            LikePhase::Pending(action) => {
                tracing::debug!(post_id = self.post_id, ?action, "like request pending");
                None
            }
            LikePhase::Unliked => {
                self.like_pending = Some(LikeAction::Create);
                Some(PostCommand::CreateLike {
                    post_id: self.post_id,
                })
            }
            LikePhase::Liked => {
                let Some(target) = self.detail.like.unlike_url.clone() else {
                    tracing::warn!(post_id = self.post_id, "liked post has no like resource");
                    return None;
                };
                self.like_pending = Some(LikeAction::Delete);
                Some(PostCommand::DeleteLike { target })
            }
        }
    }

    fn begin_comment(&mut self) -> Option<PostCommand> {
        if self.comment_pending || self.draft.trim().is_empty() {
            return None;
        }
        self.comment_pending = true;
        Some(PostCommand::CreateComment {
            post_id: self.post_id,
            text: self.draft.clone(),
        })
    }

    fn begin_delete(&mut self, comment_id: i64) -> Option<PostCommand> {
        let owned = self
            .detail
            .comments
            .iter()
            .any(|c| c.comment_id == comment_id && c.owned_by_viewer);
        if !owned || self.deleting.contains(&comment_id) {
            return None;
        }
        self.deleting.push(comment_id);
        Some(PostCommand::DeleteComment { comment_id })
    }

    pub fn apply(mut self, event: PostEvent) -> Self {
        self.error = event.error().map(|err| {
            tracing::warn!(post_id = self.post_id, error = %err, "post request failed");
            err.user_message()
        });

        match event {
            PostEvent::DetailLoaded(Ok(detail)) => {
                self.detail = detail;
                self.loaded = true;
            }
            PostEvent::DetailLoaded(Err(_)) => {}
            PostEvent::LikeCreated(result) => {
                self.like_pending = None;
                if let Ok(unlike_url) = result {
                    let like = &mut self.detail.like;
                    if !like.liked_by_viewer {
                        like.liked_by_viewer = true;
                        like.count += 1;
                    }
                    like.unlike_url = Some(unlike_url);
                }
            }
            PostEvent::LikeDeleted(result) => {
                self.like_pending = None;
                if result.is_ok() {
                    let like = &mut self.detail.like;
                    if like.liked_by_viewer {
                        like.liked_by_viewer = false;
                        like.count = like.count.saturating_sub(1);
                    }
                    like.unlike_url = None;
                }
            }
            PostEvent::CommentCreated(result) => {
                self.comment_pending = false;
                if let Ok(comment) = result {
                    self.detail.comments.push(comment);
                    self.draft.clear();
                }
            }
            PostEvent::CommentDeleted { comment_id, result } => {
                self.deleting.retain(|id| *id != comment_id);
                if result.is_ok() {
                    self.detail.comments.retain(|c| c.comment_id != comment_id);
                }
            }
        }
        self
    }
}

/// Run one command against the server.
pub async fn execute(client: &FeedClient, clock: &dyn Clock, command: PostCommand) -> PostEvent {
    match command {
        PostCommand::FetchDetail { post_id, target } => PostEvent::DetailLoaded(
            client
                .fetch_post_detail(&target)
                .await
                .map(|body| PostDetail::from_body(post_id, body, clock.now())),
        ),
        PostCommand::CreateLike { post_id } => {
            PostEvent::LikeCreated(client.create_like(post_id).await)
        }
        PostCommand::DeleteLike { target } => {
            PostEvent::LikeDeleted(client.delete_like(&target).await)
        }
        PostCommand::CreateComment { post_id, text } => PostEvent::CommentCreated(
            client
                .create_comment(post_id, &text)
                .await
                .map(Comment::from),
        ),
        PostCommand::DeleteComment { comment_id } => PostEvent::CommentDeleted {
            comment_id,
            result: client.delete_comment(comment_id).await,
        },
    }
}

/// One mounted post. Dropping it cancels its outstanding requests.
pub struct PostView {
    state: PostState,
    lifecycle: Lifecycle,
    client: FeedClient,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<AsyncResult>,
}

impl PostView {
    /// Mount the view and issue its detail fetch.
    pub fn mount(
        summary: PostSummary,
        client: FeedClient,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<AsyncResult>,
    ) -> Self {
        let (state, command) = PostState::new(summary).mount();
        let view = Self {
            state,
            lifecycle: Lifecycle::new(),
            client,
            clock,
            tx,
        };
        if let Some(command) = command {
            view.spawn(command);
        }
        view
    }

    /// A view over existing state that issues no requests until dispatched to.
    #[cfg(test)]
    pub fn with_state(
        state: PostState,
        client: FeedClient,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<AsyncResult>,
    ) -> Self {
        Self {
            state,
            lifecycle: Lifecycle::new(),
            client,
            clock,
            tx,
        }
    }

    pub fn state(&self) -> &PostState {
        &self.state
    }

    pub fn post_id(&self) -> i64 {
        self.state.post_id
    }

    pub fn owner(&self) -> LifecycleId {
        self.lifecycle.id()
    }

    /// Returns true when the intent issued a request.
    pub fn dispatch(&mut self, intent: PostIntent) -> bool {
        let (state, command) = std::mem::take(&mut self.state).intent(intent);
        self.state = state;
        match command {
            Some(command) => {
                self.spawn(command);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, owner: LifecycleId, event: PostEvent) -> Resolution {
        if !self.lifecycle.owns(owner) {
            return Resolution::Discarded;
        }
        let failure = event.error().map(ApiError::user_message);
        self.state = std::mem::take(&mut self.state).apply(event);
        match failure {
            Some(message) => Resolution::Failed(message),
            None => Resolution::Applied,
        }
    }

    fn spawn(&self, command: PostCommand) {
        let client = self.client.clone();
        let clock = Arc::clone(&self.clock);
        let tx = self.tx.clone();
        let liveness = self.lifecycle.liveness();
        tracing::debug!(task = %command.describe(), "spawning");

        tokio::spawn(async move {
            let Some(event) = liveness
                .guard(execute(&client, clock.as_ref(), command))
                .await
            else {
                tracing::debug!("post torn down, dropping request");
                return;
            };
            let _ = tx
                .send(AsyncResult::Post {
                    owner: liveness.owner(),
                    event,
                })
                .await;
        });
    }
}
