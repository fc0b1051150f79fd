use crate::Generator;
use rand::distributions::Alphanumeric;
use rand::Rng;
use shortlink_core::{ShortCode, SHORT_CODE_LENGTH};

/// Draws short codes from the thread-local CSPRNG.
///
/// Each code is [`SHORT_CODE_LENGTH`] alphanumeric characters, upper-cased,
/// so the result always matches `^[A-Z0-9]{6}$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LENGTH)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        ShortCode::new_unchecked(code)
    }
}
