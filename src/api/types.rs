use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{format_relative, parse_created};

/// Opaque pagination token. The empty string means the feed is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn exhausted() -> Self {
        Self::default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.0.is_empty()
    }

    /// The URL to fetch next, or `None` once the feed is exhausted.
    pub fn target(&self) -> Option<&str> {
        if self.is_exhausted() {
            None
        } else {
            Some(&self.0)
        }
    }
}

/// `GET /api/v1/posts/` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub results: Vec<PostSummary>,
    #[serde(rename = "next", default)]
    pub cursor: Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "postid")]
    pub post_id: i64,
    #[serde(rename = "url")]
    pub detail_url: String,
}

/// `GET /api/v1/posts/<postid>/` response body, as sent by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailBody {
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub owner_img_url: String,
    #[serde(default)]
    pub owner_show_url: String,
    #[serde(default)]
    pub post_show_url: String,
    #[serde(default)]
    pub created: String,
    pub likes: LikesBody,
    #[serde(default)]
    pub comments: Vec<CommentBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesBody {
    pub logname_likes_this: bool,
    pub num_likes: u64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    #[serde(rename = "commentid")]
    pub comment_id: i64,
    pub owner: String,
    pub owner_show_url: String,
    pub text: String,
    pub logname_owns_this: bool,
}

/// `POST /api/v1/comments/?postid=<id>` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentBody {
    #[serde(rename = "commentid")]
    pub comment_id: i64,
    pub owner: String,
    pub owner_show_url: String,
    pub text: String,
}

/// `POST /api/v1/likes/?postid=<id>` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeCreatedBody {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CommentDraftBody<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeState {
    pub liked_by_viewer: bool,
    pub count: u64,
    /// Delete resource for the viewer's like; only set while `liked_by_viewer`.
    pub unlike_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: i64,
    pub owner: String,
    pub owner_profile_url: String,
    pub text: String,
    pub owned_by_viewer: bool,
}

impl From<CommentBody> for Comment {
    fn from(body: CommentBody) -> Self {
        Self {
            comment_id: body.comment_id,
            owner: body.owner,
            owner_profile_url: body.owner_show_url,
            text: body.text,
            owned_by_viewer: body.logname_owns_this,
        }
    }
}

impl From<NewCommentBody> for Comment {
    fn from(body: NewCommentBody) -> Self {
        Self {
            comment_id: body.comment_id,
            owner: body.owner,
            owner_profile_url: body.owner_show_url,
            text: body.text,
            owned_by_viewer: true,
        }
    }
}

/// Full detail of one post. `Default` is the degraded state shown before (or
/// instead of) a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetail {
    pub post_id: i64,
    pub image_url: String,
    pub owner: String,
    pub owner_image_url: String,
    pub owner_profile_url: String,
    pub post_profile_url: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Relative label computed once at load time; never refreshed.
    pub created_label: String,
    pub like: LikeState,
    pub comments: Vec<Comment>,
}

impl PostDetail {
    pub fn from_body(post_id: i64, body: PostDetailBody, now: DateTime<Utc>) -> Self {
        let created_at = parse_created(&body.created);
        let created_label = match created_at {
            Some(at) => format_relative(at, now),
            None => body.created.clone(),
        };
        let like = LikeState {
            liked_by_viewer: body.likes.logname_likes_this,
            count: body.likes.num_likes,
            unlike_url: body
                .likes
                .url
                .filter(|_| body.likes.logname_likes_this),
        };
        Self {
            post_id,
            image_url: body.img_url,
            owner: body.owner,
            owner_image_url: body.owner_img_url,
            owner_profile_url: body.owner_show_url,
            post_profile_url: body.post_show_url,
            created_at,
            created_label,
            like,
            comments: body.comments.into_iter().map(Comment::from).collect(),
        }
    }
}
