//! Shared progress posts.
//!
//! Likes are tracked as a set of user ids per post, so a like count is
//! always the size of that set and one user can only like a post once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{CoreError, EntityKind, Result, ValidationError};
use crate::identity::Identity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Achievement,
    #[default]
    GardenShowcase,
    Milestone,
}

impl FromStr for PostKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "achievement" => Ok(PostKind::Achievement),
            "garden_showcase" | "showcase" => Ok(PostKind::GardenShowcase),
            "milestone" => Ok(PostKind::Milestone),
            other => Err(ValidationError::invalid(
                "kind",
                format!("'{other}' is not one of achievement, garden_showcase, milestone"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub kind: PostKind,
    pub content: String,
    #[serde(default)]
    pub achievement_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.contains(user_id)
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty(field));
    }
    Ok(trimmed.to_string())
}

/// Newest-first list of posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub posts: Vec<Post>,
}

impl Feed {
    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    fn get_mut(&mut self, post_id: &str) -> Result<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Post, post_id))
    }

    pub fn create_post(
        &mut self,
        id: String,
        author: &Identity,
        kind: PostKind,
        content: &str,
        achievement_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&Post> {
        let content = non_empty("content", content)?;
        self.posts.insert(
            0,
            Post {
                id,
                author_id: author.user_id.clone(),
                author_name: author.display_name.clone(),
                kind,
                content,
                achievement_id,
                created_at: now,
                updated_at: now,
                liked_by: BTreeSet::new(),
                comments: Vec::new(),
            },
        );
        Ok(&self.posts[0])
    }

    /// Flip `user_id`'s like. Returns whether the post is now liked.
    pub fn toggle_like(&mut self, post_id: &str, user_id: &str) -> Result<bool> {
        let post = self.get_mut(post_id)?;
        let liked = if post.liked_by.remove(user_id) {
            false
        } else {
            post.liked_by.insert(user_id.to_string());
            true
        };
        Ok(liked)
    }

    pub fn add_comment(
        &mut self,
        post_id: &str,
        id: String,
        author: &Identity,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let content = non_empty("content", content)?;
        let post = self.get_mut(post_id)?;
        let comment = Comment {
            id,
            author_id: author.user_id.clone(),
            author_name: author.display_name.clone(),
            content,
            created_at: now,
        };
        post.comments.push(comment.clone());
        post.updated_at = now;
        Ok(comment)
    }

    /// Only the author may delete a post.
    pub fn delete_post(&mut self, post_id: &str, requester: &str) -> Result<Post> {
        let idx = self
            .posts
            .iter()
            .position(|p| p.id == post_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Post, post_id))?;
        if self.posts[idx].author_id != requester {
            return Err(ValidationError::invalid("post", "only the author can delete a post").into());
        }
        Ok(self.posts.remove(idx))
    }

    /// Posts, comments and likes made by `user_id`.
    pub fn interactions_by(&self, user_id: &str) -> usize {
        self.posts
            .iter()
            .map(|p| {
                usize::from(p.author_id == user_id)
                    + usize::from(p.is_liked_by(user_id))
                    + p.comments.iter().filter(|c| c.author_id == user_id).count()
            })
            .sum()
    }
}
