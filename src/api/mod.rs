mod client;
mod error;
mod retry;
mod types;

pub use client::{ClientConfig, FeedClient};
pub use error::ApiError;
pub use retry::RetryPolicy;
pub use types::{Comment, Cursor, FeedPage, LikeState, PostDetail, PostSummary};
