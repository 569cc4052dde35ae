use crate::error::ResourceError;

/// Upper bound for any accumulation buffer declared at registration.
pub const MAX_ACCUMULATION_CAPACITY: usize = 64 * 1024;

/// Fixed-capacity byte store that collects one request body across
/// deliveries.
///
/// `cursor + incoming <= capacity` holds after every call. An append that
/// would break it copies nothing.
#[derive(Debug)]
pub struct AccumulationBuffer {
    storage: Box<[u8]>,
    cursor: usize,
}

impl AccumulationBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Bytes accumulated so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.cursor]
    }

    pub fn try_append(&mut self, data: &[u8]) -> Result<(), ResourceError> {
        let end = match self.cursor.checked_add(data.len()) {
            Some(end) if end <= self.storage.len() => end,
            _ => {
                return Err(ResourceError::PayloadTooLarge {
                    capacity: self.storage.len(),
                    attempted: self.cursor.saturating_add(data.len()),
                });
            }
        };

        self.storage[self.cursor..end].copy_from_slice(data);
        self.cursor = end;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
