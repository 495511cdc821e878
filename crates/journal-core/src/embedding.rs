//! Text embedding capability used by the search engine.
//!
//! The engine only depends on [`Embedder`]. [`HashEmbedder`] is a local,
//! deterministic backend so the journal works without a model download;
//! [`CachingEmbedder`] memoizes any backend by input text, up to a fixed
//! number of texts.

use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use thiserror::Error;

use crate::constants::{DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_EMBEDDING_DIMENSIONS};
use crate::tokenizer::{char_trigrams, tokenize};

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend failed: {0}")]
    Backend(String),
}

/// Turns text into a dense vector. Vectors from one embedder must all have
/// the same length.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn dimensions(&self) -> usize;
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }
}

/// Weight of a whole-word feature relative to a character trigram.
const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder over words and character trigrams.
///
/// Every token contributes a word feature plus one feature per trigram of the
/// `^word$`-padded token, hashed with FNV-1a into a fixed number of buckets.
/// Weights are non-negative, so cosine similarity lands in `[0, 1]`. Output is
/// L2-normalized; text without tokens embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, namespace: u8, feature: &str) -> usize {
        (fnv1a(namespace, feature.as_bytes()) % self.dimensions as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            vector[self.bucket(b'w', &token)] += WORD_WEIGHT;
            for trigram in char_trigrams(&token) {
                vector[self.bucket(b't', &trigram)] += TRIGRAM_WEIGHT;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn fnv1a(namespace: u8, bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    std::iter::once(namespace)
        .chain(bytes.iter().copied())
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Memoizes embeddings by exact input text. Results are identical to the
/// wrapped embedder; failures are not cached.
///
/// At most `capacity` texts are kept. Inserting past that evicts the oldest
/// insertion, so a long-running server holding many distinct queries stays
/// bounded.
pub struct CachingEmbedder<E> {
    inner: E,
    capacity: usize,
    cache: Mutex<IndexMap<String, Vec<f32>>>,
}

impl<E: Embedder> CachingEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, DEFAULT_EMBEDDING_CACHE_CAPACITY)
    }

    /// A capacity of zero disables memoization.
    pub fn with_capacity(inner: E, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            cache: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of distinct texts currently cached.
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Embedder> Embedder for CachingEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
        {
            return Ok(hit.clone());
        }
        // Lock is not held across the backend call.
        let vector = self.inner.embed(text)?;
        if self.capacity == 0 {
            return Ok(vector);
        }
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        while cache.len() >= self.capacity {
            cache.shift_remove_index(0);
        }
        cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
