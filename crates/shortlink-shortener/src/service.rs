use async_trait::async_trait;
use shortlink_core::{
    Mapping, MappingRepository, ShortCode, Shortener, ShortenerError, MAPPING_TTL,
    MAX_GENERATION_ATTEMPTS,
};
use shortlink_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

/// The mapping store: URL to code translation, duplicate suppression and
/// access accounting on top of a [`MappingRepository`].
///
/// A new mapping is committed by a set-if-absent write on the URL slot, so
/// concurrent encodes of the same URL converge on one mapping. The code slot
/// is then claimed with a second set-if-absent write. If another URL got the
/// code first, or the write fails, the URL slot is released again.
///
/// A URL slot whose code slot is missing is repaired on the next encode of
/// that URL. If the code meanwhile belongs to another URL, the stale URL slot
/// is released and a fresh code is drawn, so no two live mappings share a
/// code.
///
/// Decode bumps `access_count` on the code slot only, with a plain
/// read-modify-write. Concurrent decodes of one code may lose increments.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            max_attempts: self.max_attempts,
        }
    }
}

impl<R: MappingRepository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` over a repository and a code generator.
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }

    /// Overrides the number of code draws allowed per encode.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Checks that the code slot of a mapping found under its URL resolves
    /// back to that URL, restoring a missing code slot for the rest of the
    /// mapping's lifetime.
    ///
    /// Returns `false` after releasing a URL slot whose code now belongs to
    /// another URL, or whose lifetime is spent.
    async fn ensure_code_slot(&self, existing: &Mapping) -> Result<bool> {
        let mut current = self.repository.find_by_code(&existing.short_code).await?;
        if current.is_none() {
            if let Some(ttl) = existing.remaining_ttl() {
                if self.repository.insert_code_if_absent(existing, ttl).await? {
                    info!(url = %existing.original_url, code = %existing.short_code, "Restored missing code key");
                    return Ok(true);
                }
                current = self.repository.find_by_code(&existing.short_code).await?;
            }
        }
        if current.is_some_and(|current| current.original_url == existing.original_url) {
            return Ok(true);
        }

        warn!(url = %existing.original_url, code = %existing.short_code, "Releasing stale url key");
        self.repository.release_url(existing).await?;
        Ok(false)
    }

    /// Draws candidates until one is free in the code slot, charging each draw
    /// against `attempts`.
    async fn draw_free_code(&self, attempts: &mut usize) -> Result<ShortCode> {
        while *attempts < self.max_attempts {
            *attempts += 1;
            let candidate: ShortCode = self.generator.generate().into();
            if !self.repository.code_exists(&candidate).await? {
                return Ok(candidate);
            }
            warn!(code = %candidate, attempt = *attempts, "Short code collision");
        }

        Err(ShortenerError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[async_trait]
impl<R: MappingRepository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn encode(&self, url: &str) -> Result<Mapping> {
        let mut attempts = 0;

        for _ in 0..self.max_attempts {
            if let Some(existing) = self.repository.find_by_url(url).await? {
                if self.ensure_code_slot(&existing).await? {
                    debug!(url, code = %existing.short_code, "Url already shortened");
                    return Ok(existing);
                }
                continue;
            }

            let code = self.draw_free_code(&mut attempts).await?;
            let mapping = Mapping::new(url, code);

            if !self
                .repository
                .insert_url_if_absent(&mapping, MAPPING_TTL)
                .await?
            {
                // Another request committed this URL first; adopt its mapping.
                warn!(url, code = %mapping.short_code, "Lost url commit, re-fetching");
                continue;
            }

            match self
                .repository
                .insert_code_if_absent(&mapping, MAPPING_TTL)
                .await
            {
                Ok(true) => {
                    info!(url, code = %mapping.short_code, "Created mapping");
                    return Ok(mapping);
                }
                Ok(false) => {
                    let holder = self.repository.find_by_code(&mapping.short_code).await?;
                    if holder.is_some_and(|holder| holder.original_url == url) {
                        // A concurrent encode of this URL restored the code key first.
                        return Ok(mapping);
                    }
                    warn!(url, code = %mapping.short_code, "Short code claimed concurrently, redrawing");
                    self.repository.release_url(&mapping).await?;
                }
                Err(e) => {
                    warn!(url, code = %mapping.short_code, error = %e, "Code key write failed after url commit");
                    if let Err(release) = self.repository.release_url(&mapping).await {
                        warn!(url, error = %release, "Failed to release url key");
                    }
                    return Err(e.into());
                }
            }
        }

        Err(ShortenerError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn decode(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        trace!(code = %code, "Decoding short code");

        let Some(mapping) = self.repository.find_by_code(code).await? else {
            trace!(code = %code, "Short code not found");
            return Ok(None);
        };

        let updated = mapping.accessed();
        self.repository.update_code(&updated).await?;

        debug!(code = %code, access_count = updated.access_count, "Resolved short code");
        Ok(Some(updated))
    }

    async fn ping(&self) -> Result<()> {
        self.repository.ping().await.map_err(ShortenerError::from)
    }
}
