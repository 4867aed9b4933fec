use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::types::{EntityId, Tick};

/// Bounded FIFO buffer; pushing past capacity evicts the oldest entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, item: T) {
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// The `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialEventKind {
    Conversation,
    Fight,
    Theft,
    Marriage,
    Birth,
    Death,
    Arrest,
    Gift,
}

/// Something this agent saw or took part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialEvent {
    pub tick: Tick,
    pub kind: SocialEventKind,
    pub other: EntityId,
    pub note: String,
}

impl SocialEvent {
    pub fn new(tick: Tick, kind: SocialEventKind, other: EntityId, note: impl Into<String>) -> Self {
        Self { tick, kind, other, note: note.into() }
    }
}
