//! Name resolution: one stable, unique generated class name per canonical key.

use std::collections::HashMap;

use classfold_common::short_hash;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::canonical::CanonicalKey;
use crate::naming::{NamingError, NamingStrategy};

/// Maximum number of strategy attempts for one key when the suggested name
/// sanitizes to nothing.
pub const MAX_NAME_ATTEMPTS: usize = 3;

/// Assigns generated names to canonical keys for the duration of a run.
///
/// Names are memoized per key, so every occurrence of a class combination
/// gets the same name and the naming strategy is consulted only while a key
/// is unresolved. Strategy calls share one budget across the run; once it is
/// spent, and whenever the strategy fails, a hash-derived name is used.
pub struct NameResolver {
    prefix: String,
    max_invocations: usize,
    strategy: Option<Box<dyn NamingStrategy>>,
    invocations: usize,
    by_key: HashMap<CanonicalKey, String>,
    owners: HashMap<String, CanonicalKey>,
    rng: StdRng,
}

impl NameResolver {
    /// Creates a resolver. With no `strategy` every name comes from the hash fallback.
    pub fn new(
        prefix: impl Into<String>,
        max_invocations: usize,
        strategy: Option<Box<dyn NamingStrategy>>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            max_invocations,
            strategy,
            invocations: 0,
            by_key: HashMap::new(),
            owners: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the random source with a seeded one, making fallback names reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the name for `key`, resolving it on first request.
    ///
    /// `sample` is the class string of the occurrence that first introduced
    /// the key and `tag` the element it sits on; both feed the naming
    /// strategy and the hash fallback.
    pub fn assign(&mut self, key: &CanonicalKey, tag: Option<&str>, sample: &str) -> String {
        if let Some(name) = self.by_key.get(key) {
            return name.clone();
        }

        let body = self.resolve_body(tag, sample);
        let name = self.disambiguate(format!("{}{}", self.prefix, body), key, sample);

        debug!(key = %key, name = %name, "assigned class name");
        self.owners.insert(name.clone(), key.clone());
        self.by_key.insert(key.clone(), name.clone());
        name
    }

    /// Returns the name already assigned to `key`, if any.
    pub fn name_for(&self, key: &CanonicalKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Returns every assignment made so far.
    pub fn assignments(&self) -> &HashMap<CanonicalKey, String> {
        &self.by_key
    }

    /// Returns how many times the naming strategy has been called.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    fn resolve_body(&mut self, tag: Option<&str>, sample: &str) -> String {
        let trimmed = sample.trim();
        if !trimmed.contains(char::is_whitespace) {
            let body = sanitize(trimmed);
            if !body.is_empty() {
                return body;
            }
        }

        match self.request_name(tag, sample) {
            Ok(Some(body)) => return body,
            Ok(None) => {}
            Err(NamingError::EmptyName { attempts }) => {
                debug!(class = sample, attempts, "naming strategy gave no usable name")
            }
            Err(err) => warn!(class = sample, "naming strategy failed: {err}"),
        }
        self.fallback_body(sample)
    }

    /// Asks the strategy for a name body. `Ok(None)` means the strategy is
    /// disabled or the budget is already spent.
    fn request_name(
        &mut self,
        tag: Option<&str>,
        sample: &str,
    ) -> Result<Option<String>, NamingError> {
        let Some(strategy) = self.strategy.as_mut() else {
            return Ok(None);
        };

        let mut attempts = 0;
        while attempts < MAX_NAME_ATTEMPTS {
            if self.invocations >= self.max_invocations {
                break;
            }
            self.invocations += 1;
            attempts += 1;

            let body = sanitize(&strategy.suggest(tag, sample)?);
            if !body.is_empty() {
                return Ok(Some(body));
            }
        }

        if attempts == 0 {
            Ok(None)
        } else {
            Err(NamingError::EmptyName { attempts })
        }
    }

    fn fallback_body(&mut self, sample: &str) -> String {
        format!("{}{}", short_hash(sample), self.rng.gen_range(0..1000))
    }

    fn disambiguate(&self, candidate: String, key: &CanonicalKey, sample: &str) -> String {
        if self.is_free(&candidate, key) {
            return candidate;
        }
        let hashed = format!("{candidate}-{}", short_hash(sample));
        if self.is_free(&hashed, key) {
            return hashed;
        }
        let mut counter = 2;
        loop {
            let numbered = format!("{hashed}-{counter}");
            if self.is_free(&numbered, key) {
                return numbered;
            }
            counter += 1;
        }
    }

    fn is_free(&self, name: &str, key: &CanonicalKey) -> bool {
        self.owners.get(name).map_or(true, |owner| owner == key)
    }
}

/// Strips `<result>` wrappers and every character outside `[A-Za-z0-9_-]`.
pub fn sanitize(raw: &str) -> String {
    raw.replace("<result>", "")
        .replace("</result>", "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
