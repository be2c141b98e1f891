//! Post registry: the in-memory arena of live posts.
//!
//! The registry is owned by value by the engine; every other component
//! reads and writes through it on the single logical thread of control, so
//! no operation ever interleaves mid-mutation and no locks exist. Posts are
//! keyed by their opaque client id and listed in creation order via an
//! insertion sequence assigned on insert.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use crate::post::{PartialPost, Post, PostId};

/// In-memory store of canvas posts.
pub struct PostStore {
    posts: HashMap<PostId, Post>,
    next_seq: u64,
}

impl PostStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { posts: HashMap::new(), next_seq: 1 }
    }

    /// Insert a post, assigning it the next creation sequence. If a post
    /// with the same id already exists it is overwritten in place.
    pub fn insert(&mut self, mut post: Post) {
        post.seq = self.next_seq;
        self.next_seq += 1;
        self.posts.insert(post.id, post);
    }

    /// Remove a post by id, returning it if it was present.
    pub fn remove(&mut self, id: &PostId) -> Option<Post> {
        self.posts.remove(id)
    }

    /// Return a reference to a post by id.
    #[must_use]
    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.get(id)
    }

    /// Return a mutable reference to a post by id.
    pub fn get_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.get_mut(id)
    }

    /// Apply a partial update to an existing post, returning the updated
    /// post. `None` if the post doesn't exist — callers racing on post
    /// lifetime (tick, drag, sync completions) treat that as a no-op, not
    /// an error.
    pub fn apply_partial(&mut self, id: &PostId, partial: &PartialPost) -> Option<&Post> {
        let post = self.posts.get_mut(id)?;
        if let Some(ref title) = partial.title {
            post.title = title.clone();
        }
        if let Some(ref content) = partial.content {
            post.content = content.clone();
        }
        if let Some(x) = partial.x {
            post.x = x;
        }
        if let Some(y) = partial.y {
            post.y = y;
        }
        if let Some(editing) = partial.editing {
            post.editing = editing;
        }
        if let Some(pinned) = partial.pinned {
            post.pinned = pinned;
        }
        Some(post)
    }

    /// Replace all posts, reassigning creation sequences in the given order.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        self.posts.clear();
        self.next_seq = 1;
        for post in posts {
            self.insert(post);
        }
    }

    /// All posts in creation order.
    #[must_use]
    pub fn ordered_posts(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.values().collect();
        posts.sort_by(|a, b| a.seq.cmp(&b.seq).then_with(|| a.id.cmp(&b.id)));
        posts
    }

    /// Mutable iteration over all posts, in arbitrary order.
    pub fn posts_mut(&mut self) -> impl Iterator<Item = &mut Post> {
        self.posts.values_mut()
    }

    /// Whether a post with this id exists.
    #[must_use]
    pub fn contains(&self, id: &PostId) -> bool {
        self.posts.contains_key(id)
    }

    /// Number of posts currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Returns `true` if the store contains no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}
