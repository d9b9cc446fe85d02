//! Capacity-bounded LIFO of byte strings used as the interpreter's main and alt stacks

use crate::constants::MAX_STACK_SIZE;
use crate::error::{ConsensusError, Result};
use crate::types::ByteString;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    items: Vec<ByteString>,
    capacity: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Stack::new()
    }
}

impl Stack {
    /// Empty stack holding at most 1000 items
    pub fn new() -> Self {
        Self::with_capacity_limit(MAX_STACK_SIZE)
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Stack { items: Vec::new(), capacity }
    }

    /// Build a stack from items listed bottom to top
    pub fn from_items<I: IntoIterator<Item = ByteString>>(items: I) -> Result<Self> {
        let mut stack = Stack::new();
        for item in items {
            stack.push(item)?;
        }
        Ok(stack)
    }

    pub fn push(&mut self, item: ByteString) -> Result<()> {
        if self.items.len() >= self.capacity {
            return Err(ConsensusError::StackOverflow { capacity: self.capacity });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn push_byte(&mut self, b: u8) -> Result<()> {
        self.push(vec![b])
    }

    pub fn push_bool(&mut self, value: bool) -> Result<()> {
        self.push_byte(value as u8)
    }

    pub fn pop(&mut self) -> Result<ByteString> {
        self.items.pop().ok_or(ConsensusError::StackUnderflow)
    }

    pub fn top(&self) -> Result<&ByteString> {
        self.items.last().ok_or(ConsensusError::StackUnderflow)
    }

    /// Item `depth` positions below the top (0 is the top)
    pub fn peek(&self, depth: usize) -> Result<&ByteString> {
        let index = self.index_of(depth)?;
        Ok(&self.items[index])
    }

    /// Remove and return the item `depth` positions below the top
    pub fn remove(&mut self, depth: usize) -> Result<ByteString> {
        let index = self.index_of(depth)?;
        Ok(self.items.remove(index))
    }

    /// Fail with underflow unless at least `n` items are present
    pub fn require(&self, n: usize) -> Result<()> {
        if self.items.len() < n {
            return Err(ConsensusError::StackUnderflow);
        }
        Ok(())
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

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items from bottom to top
    pub fn items(&self) -> &[ByteString] {
        &self.items
    }

    fn index_of(&self, depth: usize) -> Result<usize> {
        if depth >= self.items.len() {
            return Err(ConsensusError::StackUnderflow);
        }
        Ok(self.items.len() - 1 - depth)
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "{:3}) {}", i, hex::encode(item))?;
        }
        Ok(())
    }
}
