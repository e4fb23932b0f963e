//! Community feed repository

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DbPool;
use crate::{Error, Result};

/// Tag used when a post has none
pub const DEFAULT_TAG: &str = "Questions";

/// A community post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: String,
    pub content: String,
    pub tag: String,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of toggling a like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

/// Community post repository
#[derive(Debug, Clone)]
pub struct CommunityRepo {
    pool: DbPool,
}

impl CommunityRepo {
    /// Create a new community repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<super::DbConn> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }

    /// Publish a post; blank content publishes nothing
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn create_post(&self, author: &str, content: &str, tag: Option<&str>) -> Result<Option<Post>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let post = Post {
            id: Uuid::new_v4().to_string(),
            author: author.to_string(),
            content: content.to_string(),
            tag: tag
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TAG)
                .to_string(),
            likes: 0,
            comments: 0,
            shares: 0,
            created_at: Utc::now(),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO community_posts (id, author, content, tag, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                post.id,
                post.author,
                post.content,
                post.tag,
                post.created_at.to_rfc3339()
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Some(post))
    }

    /// Like a post, or remove the like if the user already liked it
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown posts, or a database error
    pub fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<LikeState> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM community_posts WHERE id = ?1",
                [post_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        if exists.is_none() {
            return Err(Error::NotFound("Post not found".to_string()));
        }

        let removed = tx
            .execute(
                "DELETE FROM community_likes WHERE post_id = ?1 AND user_id = ?2",
                [post_id, user_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let (liked, delta) = if removed > 0 {
            (false, -1)
        } else {
            tx.execute(
                "INSERT INTO community_likes (post_id, user_id) VALUES (?1, ?2)",
                [post_id, user_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            (true, 1)
        };

        let likes: i64 = tx
            .query_row(
                "UPDATE community_posts SET likes = MAX(likes + ?1, 0) WHERE id = ?2 \
                 RETURNING likes",
                params![delta, post_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(LikeState { liked, likes })
    }

    /// Count a share; returns the new share total
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown posts, or a database error
    pub fn share(&self, post_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.query_row(
            "UPDATE community_posts SET shares = shares + 1 WHERE id = ?1 RETURNING shares",
            [post_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or_else(|| Error::NotFound("Post not found".to_string()))
    }

    /// Newest posts first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self, limit: usize) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, author, content, tag, likes, comments, shares, created_at \
                 FROM community_posts ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let posts = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    author: row.get(1)?,
                    content: row.get(2)?,
                    tag: row.get(3)?,
                    likes: row.get(4)?,
                    comments: row.get(5)?,
                    shares: row.get(6)?,
                    created_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(posts)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn setup() -> CommunityRepo {
        CommunityRepo::new(init_memory().unwrap())
    }

    #[test]
    fn test_blank_post_is_not_published() {
        let repo = setup();
        assert!(repo.create_post("You", "   ", None).unwrap().is_none());
        assert!(repo.list(10).unwrap().is_empty());
    }

    #[test]
    fn test_default_tag_and_counters() {
        let repo = setup();
        let post = repo
            .create_post("You", "  Spots on my wheat leaves?  ", None)
            .unwrap()
            .unwrap();

        assert_eq!(post.content, "Spots on my wheat leaves?");
        assert_eq!(post.tag, DEFAULT_TAG);
        assert_eq!((post.likes, post.comments, post.shares), (0, 0, 0));
    }

    #[test]
    fn test_list_newest_first() {
        let repo = setup();
        repo.create_post("A", "first", Some("Tips")).unwrap();
        repo.create_post("B", "second", Some("Market")).unwrap();

        let posts = repo.list(10).unwrap();
        assert_eq!(posts[0].content, "second");
        assert_eq!(posts[1].tag, "Tips");
        assert_eq!(repo.list(1).unwrap().len(), 1);
    }

    #[test]
    fn test_toggle_like() {
        let repo = setup();
        let post = repo.create_post("A", "hello", None).unwrap().unwrap();

        assert_eq!(
            repo.toggle_like(&post.id, "u1").unwrap(),
            LikeState { liked: true, likes: 1 }
        );
        assert_eq!(repo.toggle_like(&post.id, "u2").unwrap().likes, 2);
        assert_eq!(
            repo.toggle_like(&post.id, "u1").unwrap(),
            LikeState { liked: false, likes: 1 }
        );
        assert!(matches!(
            repo.toggle_like("missing", "u1"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_share_increments() {
        let repo = setup();
        let post = repo.create_post("A", "hello", None).unwrap().unwrap();

        assert_eq!(repo.share(&post.id).unwrap(), 1);
        assert_eq!(repo.share(&post.id).unwrap(), 2);
        assert!(matches!(repo.share("missing"), Err(Error::NotFound(_))));
    }
}
