mod post;
mod session;
mod user;

pub use post::{FeedImage, Post, PostView, MAX_CAPTION_LEN};
pub use session::{Claims, LoginResponse, Session};
pub use user::{CreateUser, User, UserSummary};
