use async_trait::async_trait;

use crate::domain::{
    Comment, CommentChanges, Item, Like, LikeChanges, NewComment, NewItem, NewLike, NewPost, Post,
    PostChanges, PostDetail,
};
use crate::error::RepoError;

/// Generic repository trait shared by every entity store.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` when absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Item repository.
#[async_trait]
pub trait ItemRepository: BaseRepository<Item, i64> {
    /// All items, highest id first.
    async fn list(&self) -> Result<Vec<Item>, RepoError>;

    async fn create(&self, item: NewItem) -> Result<Item, RepoError>;
}

/// Post repository.
///
/// Deleting a post removes its likes and comments as well.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// All posts with their likes and comments, newest first.
    async fn list_detailed(&self) -> Result<Vec<PostDetail>, RepoError>;

    async fn find_detailed(&self, id: i64) -> Result<Option<PostDetail>, RepoError>;

    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    /// All comments, newest first.
    async fn list(&self) -> Result<Vec<Comment>, RepoError>;

    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    async fn update(&self, id: i64, changes: CommentChanges) -> Result<Comment, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, i64> {
    /// All likes, newest first.
    async fn list(&self) -> Result<Vec<Like>, RepoError>;

    async fn create(&self, like: NewLike) -> Result<Like, RepoError>;

    async fn update(&self, id: i64, changes: LikeChanges) -> Result<Like, RepoError>;
}
