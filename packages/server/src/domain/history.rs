//! Bucketed message history.
//!
//! History is an arena of fixed-capacity buckets indexed by id (0 = oldest).
//! Only the tail bucket accepts appends. When an append fills it, the tail is
//! sealed and an empty bucket with the next id takes its place. A sealed bucket
//! never changes again, so its serialization is computed at most once.
//!
//! Sealing happens on the filling append, so after exactly a multiple of the
//! bucket capacity the newest page is an empty tail whose `nextPage` points at
//! the full bucket just sealed. Clients paging backwards see one empty page
//! before older messages.

use std::mem;

use serde::Serialize;

use super::{error::HistoryError, message::ChatMessage, registry::Payload};

/// Messages per bucket
pub const BUCKET_CAPACITY: usize = 100;

/// Page number requesting the tail bucket
pub const NEWEST_PAGE: i64 = -1;

/// `nextPage` value returned with bucket 0
pub const NO_MORE_PAGES: i64 = -2;

/// Wire shape of one history page
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView<'a> {
    page: u64,
    messages: &'a [ChatMessage],
    next_page: i64,
}

/// A serialized bucket ready to be returned to a client
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub page: u64,
    pub next_page: i64,
    pub payload: Payload,
}

#[derive(Debug)]
pub struct MessageBucket {
    id: u64,
    capacity: usize,
    messages: Vec<ChatMessage>,
    cached: Option<Payload>,
    stale: bool,
}

impl MessageBucket {
    fn new(id: u64, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            messages: Vec::with_capacity(capacity),
            cached: None,
            stale: true,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    /// Page a client should ask for next when walking backwards
    pub fn next_page(&self) -> i64 {
        match self.id {
            0 => NO_MORE_PAGES,
            id => id as i64 - 1,
        }
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.stale = true;
    }

    /// Serialized form of this bucket, reusing the cache unless a message was
    /// appended since it was computed.
    fn serialized(&mut self) -> Result<Payload, HistoryError> {
        if !self.stale
            && let Some(cached) = &self.cached
        {
            return Ok(Payload::clone(cached));
        }

        let view = PageView {
            page: self.id,
            messages: &self.messages,
            next_page: self.next_page(),
        };
        let payload = serde_json::to_string(&view)
            .map(Payload::from)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        self.cached = Some(Payload::clone(&payload));
        self.stale = false;
        Ok(payload)
    }

    #[cfg(test)]
    fn is_stale(&self) -> bool {
        self.stale
    }
}

/// Ordered buckets, oldest first. Exclusively owned by the message actor.
#[derive(Debug)]
pub struct History {
    sealed: Vec<MessageBucket>,
    tail: MessageBucket,
    bucket_capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_bucket_capacity(BUCKET_CAPACITY)
    }

    /// Capacity is clamped to at least one message per bucket
    pub fn with_bucket_capacity(bucket_capacity: usize) -> Self {
        let bucket_capacity = bucket_capacity.max(1);
        Self {
            sealed: Vec::new(),
            tail: MessageBucket::new(0, bucket_capacity),
            bucket_capacity,
        }
    }

    /// Append to the tail bucket, sealing it and opening the next one once full
    pub fn append(&mut self, message: ChatMessage) {
        self.tail.push(message);
        if self.tail.is_full() {
            let next = MessageBucket::new(self.tail.id + 1, self.bucket_capacity);
            let sealed = mem::replace(&mut self.tail, next);
            tracing::debug!(bucket = sealed.id, "History bucket sealed");
            self.sealed.push(sealed);
        }
    }

    pub fn tail_id(&self) -> u64 {
        self.tail.id
    }

    pub fn tail(&self) -> &MessageBucket {
        &self.tail
    }

    pub fn sealed_count(&self) -> usize {
        self.sealed.len()
    }

    pub fn total_messages(&self) -> usize {
        self.sealed.len() * self.bucket_capacity + self.tail.len()
    }

    pub fn bucket(&self, id: u64) -> Option<&MessageBucket> {
        if id == self.tail.id {
            return Some(&self.tail);
        }
        usize::try_from(id).ok().and_then(|index| self.sealed.get(index))
    }

    fn bucket_mut(&mut self, id: u64) -> Option<&mut MessageBucket> {
        if id == self.tail.id {
            return Some(&mut self.tail);
        }
        usize::try_from(id)
            .ok()
            .and_then(|index| self.sealed.get_mut(index))
    }

    /// Map a requested page (`-1` = newest) to a bucket id, rejecting anything
    /// outside `-1..=tail`.
    pub fn resolve_page(&self, page: i64) -> Result<u64, HistoryError> {
        let tail = self.tail.id;
        let out_of_range = || HistoryError::BadRequest { page, tail };
        match page {
            NEWEST_PAGE => Ok(tail),
            p if p < NEWEST_PAGE => Err(out_of_range()),
            p => match u64::try_from(p) {
                Ok(id) if id <= tail => Ok(id),
                _ => Err(out_of_range()),
            },
        }
    }

    /// Serialized page for `page`, served from the bucket cache when possible
    pub fn page(&mut self, page: i64) -> Result<HistoryPage, HistoryError> {
        let id = self.resolve_page(page)?;
        let tail = self.tail.id;
        let bucket = self
            .bucket_mut(id)
            .ok_or(HistoryError::BadRequest { page, tail })?;
        let payload = bucket.serialized()?;
        Ok(HistoryPage {
            page: bucket.id,
            next_page: bucket.next_page(),
            payload,
        })
    }
}
