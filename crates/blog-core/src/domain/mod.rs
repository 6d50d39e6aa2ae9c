//! Domain entities - the core business objects.

mod comment;
mod item;
mod like;
mod meta;
mod post;

pub use comment::{AUTHOR_MAX_LENGTH, Comment, CommentChanges, NewComment};
pub use item::{Item, NewItem};
pub use like::{Like, LikeChanges, NewLike};
pub use meta::{FieldKind, FieldMeta, ModelMeta};
pub use post::{NewPost, Post, PostChanges, PostDetail, TITLE_MAX_LENGTH};

/// Every persisted entity type, in registration order.
pub const MODELS: &[ModelMeta] = &[Item::META, Post::META, Like::META, Comment::META];
