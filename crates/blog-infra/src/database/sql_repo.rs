//! SQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, EntityTrait, IntoActiveModel, LoaderTrait, ModelTrait, QueryOrder, Set,
};

use blog_core::domain::{
    Comment, CommentChanges, Item, Like, LikeChanges, NewComment, NewItem, NewLike, NewPost, Post,
    PostChanges, PostDetail,
};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, ItemRepository, LikeRepository, PostRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::item::{self, Entity as ItemEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::sql_base::{SqlBaseRepository, find_existing, query_error, write_error};

/// SQL item repository.
pub type SqlItemRepository = SqlBaseRepository<ItemEntity>;

/// SQL post repository. Child rows go away through `ON DELETE CASCADE`.
pub type SqlPostRepository = SqlBaseRepository<PostEntity>;

/// SQL comment repository.
pub type SqlCommentRepository = SqlBaseRepository<CommentEntity>;

/// SQL like repository.
pub type SqlLikeRepository = SqlBaseRepository<LikeEntity>;

fn into_domain<M, T: From<M>>(rows: Vec<M>) -> Vec<T> {
    rows.into_iter().map(Into::into).collect()
}

#[async_trait]
impl ItemRepository for SqlItemRepository {
    async fn list(&self) -> Result<Vec<Item>, RepoError> {
        let rows = ItemEntity::find()
            .order_by_desc(item::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(into_domain(rows))
    }

    async fn create(&self, new: NewItem) -> Result<Item, RepoError> {
        let model = item::ActiveModel::from(new)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(item_id = model.id, "Inserted item");
        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(into_domain(rows))
    }

    async fn list_detailed(&self) -> Result<Vec<PostDetail>, RepoError> {
        let posts = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        // One query per relation, not per post.
        let likes = posts
            .load_many(LikeEntity, &self.db)
            .await
            .map_err(query_error)?;
        let comments = posts
            .load_many(CommentEntity, &self.db)
            .await
            .map_err(query_error)?;

        Ok(posts
            .into_iter()
            .zip(likes)
            .zip(comments)
            .map(|((post, likes), comments)| {
                PostDetail::new(post.into(), into_domain(likes), into_domain(comments))
            })
            .collect())
    }

    async fn find_detailed(&self, id: i64) -> Result<Option<PostDetail>, RepoError> {
        let Some(post) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let likes = post
            .find_related(LikeEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;
        let comments = post
            .find_related(CommentEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(Some(PostDetail::new(
            post.into(),
            into_domain(likes),
            into_domain(comments),
        )))
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(post_id = model.id, "Inserted post");
        Ok(model.into())
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, RepoError> {
        let model = find_existing::<PostEntity>(&self.db, id).await?;
        if changes.is_empty() {
            return Ok(model.into());
        }

        let mut active = model.into_active_model();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn list(&self) -> Result<Vec<Comment>, RepoError> {
        let rows = CommentEntity::find()
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(into_domain(rows))
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(new)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(comment_id = model.id, post_id = model.post_id, "Inserted comment");
        Ok(model.into())
    }

    async fn update(&self, id: i64, changes: CommentChanges) -> Result<Comment, RepoError> {
        let model = find_existing::<CommentEntity>(&self.db, id).await?;
        if changes.is_empty() {
            return Ok(model.into());
        }

        let mut active = model.into_active_model();
        if let Some(post_id) = changes.post_id {
            active.post_id = Set(post_id);
        }
        if let Some(author) = changes.author {
            active.author = Set(author);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }
}

#[async_trait]
impl LikeRepository for SqlLikeRepository {
    async fn list(&self) -> Result<Vec<Like>, RepoError> {
        let rows = LikeEntity::find()
            .order_by_desc(like::Column::CreatedAt)
            .order_by_desc(like::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(into_domain(rows))
    }

    async fn create(&self, new: NewLike) -> Result<Like, RepoError> {
        let model = like::ActiveModel::from(new)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::debug!(like_id = model.id, post_id = model.post_id, "Inserted like");
        Ok(model.into())
    }

    async fn update(&self, id: i64, changes: LikeChanges) -> Result<Like, RepoError> {
        let model = find_existing::<LikeEntity>(&self.db, id).await?;
        let Some(post_id) = changes.post_id else {
            return Ok(model.into());
        };

        let mut active = model.into_active_model();
        active.post_id = Set(post_id);

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }
}
