//! Test data builders for state and view testing.

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::MockServer;

use crate::api::{
    ClientConfig, Comment, Cursor, FeedClient, LikeState, PostDetail, PostSummary, RetryPolicy,
};
use crate::app::{App, Mode};
use crate::feed::FeedController;
use crate::post::PostState;
use crate::theme::{ResolvedTheme, ThemeVariant, default_for_variant};
use crate::time::{Clock, fixed_clock};

/// Fixed timestamp for deterministic tests: 2023-11-16 00:00:00 UTC.
/// Sample posts are created three days earlier.
pub const TEST_NOW: i64 = 1700092800;

const SAMPLE_CREATED: &str = "2023-11-13 00:00:00";

pub fn summary(post_id: i64) -> PostSummary {
    PostSummary {
        post_id,
        detail_url: format!("/api/v1/posts/{post_id}/"),
    }
}

/// A client for `server` with a session cookie and no retries.
pub fn mock_client(server: &MockServer) -> FeedClient {
    let config = ClientConfig {
        cookie: Some("session=test".into()),
        retry: RetryPolicy::none(),
        ..ClientConfig::new(server.uri())
    };
    FeedClient::new(&config).unwrap()
}

/// A feed page body. An empty `next` marks the last page.
pub fn page_json(ids: &[i64], next: &str) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({"postid": id, "url": format!("/api/v1/posts/{id}/")}))
        .collect();
    json!({"next": next, "results": results, "url": "/api/v1/posts/"})
}

pub struct CommentBuilder {
    id: i64,
    author: String,
    text: String,
    owned: bool,
}

impl Default for CommentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentBuilder {
    pub fn new() -> Self {
        Self {
            id: 1,
            author: "jflinn".to_string(),
            text: "Test comment".to_string(),
            owned: false,
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    pub fn build(self) -> Comment {
        Comment {
            comment_id: self.id,
            owner_profile_url: format!("/users/{}/", self.author),
            owner: self.author,
            text: self.text,
            owned_by_viewer: self.owned,
        }
    }
}

/// Server-side body for `GET /api/v1/posts/3/`.
pub struct DetailBuilder {
    liked: bool,
    likes: u64,
    comments: Vec<Comment>,
}

impl Default for DetailBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailBuilder {
    pub fn new() -> Self {
        Self {
            liked: false,
            likes: 0,
            comments: Vec::new(),
        }
    }

    pub fn likes(mut self, liked: bool, count: u64) -> Self {
        self.liked = liked;
        self.likes = count;
        self
    }

    pub fn comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    pub fn json(&self) -> Value {
        let comments: Vec<Value> = self
            .comments
            .iter()
            .map(|c| {
                json!({
                    "commentid": c.comment_id,
                    "lognameOwnsThis": c.owned_by_viewer,
                    "owner": c.owner,
                    "ownerShowUrl": c.owner_profile_url,
                    "text": c.text,
                    "url": format!("/api/v1/comments/{}/", c.comment_id),
                })
            })
            .collect();
        let like_url = self.liked.then_some("/api/v1/likes/6/");
        json!({
            "comments": comments,
            "created": SAMPLE_CREATED,
            "imgUrl": "/uploads/3.jpg",
            "likes": {
                "lognameLikesThis": self.liked,
                "numLikes": self.likes,
                "url": like_url,
            },
            "owner": "awdeorio",
            "ownerImgUrl": "/uploads/awdeorio.jpg",
            "ownerShowUrl": "/users/awdeorio/",
            "postShowUrl": "/posts/3/",
            "postid": 3,
            "url": "/api/v1/posts/3/",
        })
    }
}

/// Client-side `PostState` as it looks after mounting.
pub struct PostBuilder {
    id: i64,
    liked: bool,
    likes: u64,
    comments: Vec<Comment>,
    loaded: bool,
    draft: String,
}

impl PostBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            liked: false,
            likes: 0,
            comments: Vec::new(),
            loaded: true,
            draft: String::new(),
        }
    }

    pub fn likes(mut self, liked: bool, count: u64) -> Self {
        self.liked = liked;
        self.likes = count;
        self
    }

    pub fn comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    pub fn unloaded(mut self) -> Self {
        self.loaded = false;
        self
    }

    pub fn draft(mut self, draft: &str) -> Self {
        self.draft = draft.to_string();
        self
    }

    pub fn build(self) -> PostState {
        let mut state = PostState::new(summary(self.id));
        state.draft = self.draft;
        if !self.loaded {
            return state;
        }
        let id = self.id;
        state.loaded = true;
        state.detail = PostDetail {
            post_id: id,
            image_url: format!("/uploads/{id}.jpg"),
            owner: "awdeorio".to_string(),
            owner_image_url: "/uploads/awdeorio.jpg".to_string(),
            owner_profile_url: "/users/awdeorio/".to_string(),
            post_profile_url: format!("/posts/{id}/"),
            created_at: crate::time::parse_created(SAMPLE_CREATED),
            created_label: "3 days ago".to_string(),
            like: LikeState {
                liked_by_viewer: self.liked,
                count: self.likes,
                unlike_url: self.liked.then(|| format!("/api/v1/likes/{id}/")),
            },
            comments: self.comments,
        };
        state
    }
}

/// Loaded post 3 with the given like state and comments.
pub fn loaded_state(liked: bool, count: u64, comments: Vec<Comment>) -> PostState {
    PostBuilder::new(3)
        .likes(liked, count)
        .comments(comments)
        .build()
}

pub struct TestAppBuilder {
    posts: Vec<PostState>,
    cursor: Cursor,
    selected_index: usize,
    comment_index: Option<usize>,
    mode: Mode,
    viewport_height: Option<u16>,
    loaded: bool,
    feed_error: Option<String>,
    theme: ResolvedTheme,
    clock: Arc<dyn Clock>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            cursor: Cursor::exhausted(),
            selected_index: 0,
            comment_index: None,
            mode: Mode::Browse,
            viewport_height: None,
            loaded: true,
            feed_error: None,
            theme: default_for_variant(ThemeVariant::Dark),
            clock: fixed_clock(TEST_NOW),
        }
    }

    pub fn posts(mut self, posts: Vec<PostState>) -> Self {
        self.posts = posts;
        self
    }

    /// Where the next page comes from. Without this the feed is caught up.
    pub fn cursor(mut self, target: &str) -> Self {
        self.cursor = Cursor::new(target);
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn comment(mut self, index: usize) -> Self {
        self.comment_index = Some(index);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn viewport_height(mut self, height: u16) -> Self {
        self.viewport_height = Some(height);
        self
    }

    /// The first page has not arrived.
    pub fn unloaded(mut self) -> Self {
        self.loaded = false;
        self
    }

    pub fn feed_error(mut self, msg: &str) -> Self {
        self.feed_error = Some(msg.to_string());
        self
    }

    pub fn theme(mut self, theme: ResolvedTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn build(self) -> App {
        // Nothing listens here; requests issued by a test fail fast.
        let client = FeedClient::new(&ClientConfig {
            retry: RetryPolicy::none(),
            ..ClientConfig::new("http://127.0.0.1:9")
        })
        .unwrap();
        let mut app = App::new(self.theme, client, "/api/v1/posts/", self.clock);
        app.feed = FeedController::preloaded(
            app.feed_url.clone(),
            app.client.clone(),
            Arc::clone(&app.clock),
            app.result_tx.clone(),
            self.posts,
            self.cursor,
        );
        let state = app.feed.state_mut();
        state.loaded = self.loaded;
        state.error = self.feed_error;

        app.selected_index = self.selected_index;
        app.comment_index = self.comment_index;
        app.mode = self.mode;
        app.viewport_height = self.viewport_height;
        app
    }
}
