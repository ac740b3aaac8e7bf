pub mod comment_row;
pub mod common;
pub mod debug;
pub mod feed;
pub mod like_control;
pub mod spinner;
pub mod status_bar;
