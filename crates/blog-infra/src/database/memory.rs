//! In-memory store - used as fallback when no database is configured.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blog_core::domain::{
    Comment, CommentChanges, Item, Like, LikeChanges, NewComment, NewItem, NewLike, NewPost, Post,
    PostChanges, PostDetail,
};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CommentRepository, ItemRepository, LikeRepository, PostRepository,
};

/// One table: rows by id plus the last id handed out.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    items: Table<Item>,
    posts: Table<Post>,
    likes: Table<Like>,
    comments: Table<Comment>,
}

impl Tables {
    fn require_post(&self, post_id: i64) -> Result<(), RepoError> {
        if self.posts.rows.contains_key(&post_id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!(
                "post {post_id} does not exist"
            )))
        }
    }

    fn detail(&self, post: &Post) -> PostDetail {
        let likes = self
            .likes
            .rows
            .values()
            .filter(|l| l.post_id == post.id)
            .cloned()
            .collect();
        let comments = self
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post.id)
            .cloned()
            .collect();
        PostDetail::new(post.clone(), likes, comments)
    }
}

/// In-memory implementation of every repository port.
///
/// Ids are assigned per table starting at 1 and never reused. Deleting a
/// post removes its likes and comments, like the SQL foreign keys do.
/// Note: Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; equal timestamps fall back to the higher id.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl BaseRepository<Item, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, RepoError> {
        Ok(self.tables.read().await.items.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .items
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Item>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.items.rows.values().rev().cloned().collect())
    }

    async fn create(&self, new: NewItem) -> Result<Item, RepoError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let item = Item {
            id: tables.items.next_id(),
            title: new.title,
            created_at: now,
            updated_at: now,
        };
        tables.items.rows.insert(item.id, item.clone());
        Ok(item)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.rows.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.likes.rows.retain(|_, l| l.post_id != id);
        tables.comments.rows.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.rows.values().cloned().collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(posts)
    }

    async fn list_detailed(&self) -> Result<Vec<PostDetail>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.posts.rows.values().collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(posts.into_iter().map(|p| tables.detail(p)).collect())
    }

    async fn find_detailed(&self, id: i64) -> Result<Option<PostDetail>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.rows.get(&id).map(|p| tables.detail(p)))
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let post = Post {
            id: tables.posts.next_id(),
            title: new.title,
            content: new.content,
            created_at: Utc::now(),
        };
        tables.posts.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        changes.apply(post);
        Ok(post.clone())
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables.comments.rows.values().cloned().collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_post(new.post_id)?;
        let comment = Comment {
            id: tables.comments.next_id(),
            post_id: new.post_id,
            author: new.author,
            content: new.content,
            created_at: Utc::now(),
        };
        tables.comments.rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: i64, changes: CommentChanges) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(post_id) = changes.post_id {
            tables.require_post(post_id)?;
        }
        let comment = tables
            .comments
            .rows
            .get_mut(&id)
            .ok_or(RepoError::NotFound)?;
        changes.apply(comment);
        Ok(comment.clone())
    }
}

#[async_trait]
impl BaseRepository<Like, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Like>, RepoError> {
        Ok(self.tables.read().await.likes.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .likes
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Like>, RepoError> {
        let tables = self.tables.read().await;
        let mut likes: Vec<Like> = tables.likes.rows.values().cloned().collect();
        newest_first(&mut likes, |l| (l.created_at, l.id));
        Ok(likes)
    }

    async fn create(&self, new: NewLike) -> Result<Like, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_post(new.post_id)?;
        let like = Like {
            id: tables.likes.next_id(),
            post_id: new.post_id,
            created_at: Utc::now(),
        };
        tables.likes.rows.insert(like.id, like.clone());
        Ok(like)
    }

    async fn update(&self, id: i64, changes: LikeChanges) -> Result<Like, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(post_id) = changes.post_id {
            tables.require_post(post_id)?;
        }
        let like = tables.likes.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        changes.apply(like);
        Ok(like.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "content".to_string(),
        }
    }

    #[tokio::test]
    async fn items_are_listed_highest_id_first() {
        let store = InMemoryStore::new();
        let repo: &dyn ItemRepository = &store;
        for title in ["a", "b", "c"] {
            repo.create(NewItem {
                title: title.to_string(),
            })
            .await
            .unwrap();
        }

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_children() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let likes: &dyn LikeRepository = &store;
        let comments: &dyn CommentRepository = &store;

        let doomed = posts.create(new_post("doomed")).await.unwrap();
        let kept = posts.create(new_post("kept")).await.unwrap();
        let like = likes.create(NewLike { post_id: doomed.id }).await.unwrap();
        let kept_like = likes.create(NewLike { post_id: kept.id }).await.unwrap();
        let comment = comments
            .create(NewComment {
                post_id: doomed.id,
                author: "a".into(),
                content: "hi".into(),
            })
            .await
            .unwrap();

        posts.delete(doomed.id).await.unwrap();

        assert!(likes.find_by_id(like.id).await.unwrap().is_none());
        assert!(comments.find_by_id(comment.id).await.unwrap().is_none());
        assert!(likes.find_by_id(kept_like.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn detail_contains_only_own_children() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let likes: &dyn LikeRepository = &store;

        let first = posts.create(new_post("first")).await.unwrap();
        let second = posts.create(new_post("second")).await.unwrap();
        likes.create(NewLike { post_id: first.id }).await.unwrap();
        likes.create(NewLike { post_id: second.id }).await.unwrap();
        likes.create(NewLike { post_id: first.id }).await.unwrap();

        let detail = posts.find_detailed(first.id).await.unwrap().unwrap();
        assert_eq!(detail.likes.len(), 2);
        assert!(detail.likes.iter().all(|l| l.post_id == first.id));
        assert!(detail.comments.is_empty());
    }

    #[tokio::test]
    async fn children_require_an_existing_post() {
        let store = InMemoryStore::new();
        let likes: &dyn LikeRepository = &store;

        let err = likes.create(NewLike { post_id: 42 }).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_rows_fail_with_not_found() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;

        let err = posts.update(7, PostChanges::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
        assert!(matches!(
            posts.delete(7).await.unwrap_err(),
            RepoError::NotFound
        ));
    }
}
