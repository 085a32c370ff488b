use crate::local::LocalStore;
use aushang_common::model::{
    Id,
    post::{NewPost, Post, PostMarker},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key under which the serialized post list is kept.
pub const POSTS_KEY: &str = "bulletin-posts";

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Serializing the post list failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("No post id is left after {0}")]
    IdsExhausted(Id<PostMarker>),
}

/// The board's post collection on top of a [`LocalStore`].
///
/// Every mutation rewrites the whole list. The write lock keeps concurrent
/// mutations in this process from losing each other's updates.
#[derive(Debug)]
pub struct BoardStore {
    store: LocalStore,
    write_lock: Mutex<()>,
}

impl BoardStore {
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Post>> {
        let Some(stored) = self.store.get(POSTS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&stored) {
            Ok(posts) => Ok(posts),
            Err(error) => {
                warn!(%error, "Stored post list is unreadable, treating the board as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, posts: &[Post]) -> Result<()> {
        let serialized = serde_json::to_string(posts)?;
        self.store.set(POSTS_KEY, &serialized).await?;

        Ok(())
    }

    /// All posts, newest first.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.load().await?;
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let post = self
            .load()
            .await?
            .into_iter()
            .find(|post| post.id == post_id);

        Ok(post)
    }

    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        let _guard = self.write_lock.lock().await;

        let mut posts = self.load().await?;
        let post_id = match posts.iter().map(|post| post.id).max() {
            Some(highest) => highest
                .checked_next()
                .ok_or(DbError::IdsExhausted(highest))?,
            None => Id::new(1),
        };

        let post = Post::from_new(post_id, post);
        posts.push(post.clone());
        self.save(&posts).await?;

        debug!(%post_id, "Created post");
        Ok(post)
    }

    /// Returns whether a post with `post_id` existed.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut posts = self.load().await?;
        let count_before = posts.len();
        posts.retain(|post| post.id != post_id);
        if posts.len() == count_before {
            return Ok(false);
        }

        self.save(&posts).await?;

        debug!(%post_id, "Deleted post");
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        self.store.remove(POSTS_KEY).await?;
        Ok(())
    }
}
