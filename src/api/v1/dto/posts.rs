/*
 * Responsibility
 * - posts / comments の request / response DTO
 * - レスポンスの id は公開 ID (encode 済み)。内部 ID は出さない
 * - タイトル長は文字数で数える (ハングルなどのマルチバイト文字対策)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err("title must be <= 200 chars");
        }
        if self.content.trim().is_empty() {
            return Err("content is required");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("title cannot be empty");
            }
            if title.chars().count() > MAX_TITLE_CHARS {
                return Err("title must be <= 200 chars");
            }
        }
        if let Some(content) = &self.content
            && content.trim().is_empty()
        {
            return Err("content cannot be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String, // encoded
    pub title: String,
    pub content: String,
    pub author_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
    /// Whether the current caller may update/delete this post (false for anonymous).
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String, // encoded
    pub post_id: String, // encoded
    pub content: String,
    pub author_email: String,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_allows_partial_but_not_blank_fields() {
        let ok = UpdatePostRequest {
            title: None,
            content: Some("new".into()),
        };
        assert!(ok.validate().is_ok());

        let blank = UpdatePostRequest {
            title: Some("   ".into()),
            content: None,
        };
        assert_eq!(blank.validate(), Err("title cannot be empty"));
    }

    #[test]
    fn create_requires_title_and_content() {
        let req = CreatePostRequest {
            title: "t".into(),
            content: "".into(),
        };
        assert_eq!(req.validate(), Err("content is required"));
    }

    #[test]
    fn title_limit_counts_characters_not_bytes() {
        let create = |title: String| CreatePostRequest {
            title,
            content: "본문".into(),
        };
        assert!(create("가".repeat(200)).validate().is_ok());
        assert_eq!(
            create("가".repeat(201)).validate(),
            Err("title must be <= 200 chars")
        );

        let update = UpdatePostRequest {
            title: Some("가".repeat(100)),
            content: None,
        };
        assert!(update.validate().is_ok());
    }
}
