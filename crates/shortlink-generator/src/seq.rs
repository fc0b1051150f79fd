use crate::Generator;
use shortlink_core::{ShortCode, SHORT_CODE_LENGTH};
use std::sync::atomic::{AtomicU64, Ordering};

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A deterministic short code generator using a sequential counter.
///
/// The counter is rendered in base 36 and zero-padded, producing "000000",
/// "000001", ... "00000Z", "000010". The counter wraps at 36^6, so codes
/// keep the generated shape forever.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SeqGenerator {
    /// Creates a generator starting at "000000".
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific counter value.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }

    fn render(mut value: u64) -> String {
        let mut buf = [b'0'; SHORT_CODE_LENGTH];
        for slot in buf.iter_mut().rev() {
            *slot = ALPHABET[(value % 36) as usize];
            value /= 36;
        }
        buf.iter().map(|&b| b as char).collect()
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(Self::render(count))
    }
}
