//! Domain records to response DTOs.

use blog_core::domain::{Comment, Item, Like, PostDetail};
use blog_shared::dto::{CommentResponse, ItemResponse, LikeResponse, PostResponse};

/// Conversion of a domain record into its JSON representation.
pub trait IntoDto {
    type Dto;

    fn into_dto(self) -> Self::Dto;
}

impl IntoDto for Item {
    type Dto = ItemResponse;

    fn into_dto(self) -> ItemResponse {
        ItemResponse {
            id: self.id,
            title: self.title,
        }
    }
}

impl IntoDto for Comment {
    type Dto = CommentResponse;

    fn into_dto(self) -> CommentResponse {
        CommentResponse {
            id: self.id,
            post: self.post_id,
            author: self.author,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

impl IntoDto for Like {
    type Dto = LikeResponse;

    fn into_dto(self) -> LikeResponse {
        LikeResponse {
            id: self.id,
            post: self.post_id,
            created_at: self.created_at,
        }
    }
}

impl IntoDto for PostDetail {
    type Dto = PostResponse;

    fn into_dto(self) -> PostResponse {
        PostResponse {
            id: self.post.id,
            title: self.post.title,
            content: self.post.content,
            created_at: self.post.created_at,
            likes: self.likes.into_iter().map(IntoDto::into_dto).collect(),
            comments: self.comments.into_iter().map(IntoDto::into_dto).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use blog_core::domain::Post;
    use chrono::Utc;

    use super::*;

    #[test]
    fn post_embeds_children_with_post_ids() {
        let now = Utc::now();
        let detail = PostDetail::new(
            Post {
                id: 1,
                title: "t".into(),
                content: "c".into(),
                created_at: now,
            },
            vec![Like {
                id: 4,
                post_id: 1,
                created_at: now,
            }],
            vec![Comment {
                id: 2,
                post_id: 1,
                author: "a".into(),
                content: "hi".into(),
                created_at: now,
            }],
        );

        let json = serde_json::to_value(detail.into_dto()).unwrap();
        assert_eq!(json["likes"][0]["post"], 1);
        assert_eq!(json["comments"][0]["author"], "a");
        assert_eq!(json["comments"][0]["post"], 1);
        assert!(json["comments"][0].get("post_id").is_none());
    }
}
