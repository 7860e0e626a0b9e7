use std::collections::HashMap;

/// Lower-cases a label and strips surrounding whitespace.
///
/// This is the only normalization applied when matching LLM output against a vocabulary.
/// It is idempotent: `canonicalize(canonicalize(s)) == canonicalize(s)`.
pub fn canonicalize<T: AsRef<str>>(target: T) -> String {
    target.as_ref().to_lowercase().trim().to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalError {
    #[error(
        "the canonical target string \"{canonical}\" is the resulting string for the targets \"{second}\" and \"{first}\"; such duplicates are not allowed"
    )]
    DuplicateCanonicalTarget {
        canonical: String,
        /// The spelling that was already in the map.
        first: String,
        /// The spelling that collided with it.
        second: String,
    },
}

/// Maps the canonical form of every target to the original spelling it came from.
///
/// The map is injective. Building it from a vocabulary where two targets share a canonical
/// form fails instead of silently merging them. Iteration follows vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTargetMap {
    originals: HashMap<String, String>,
    order: Vec<String>,
}

impl CanonicalTargetMap {
    pub fn build<I, T>(targets: I) -> Result<Self, CanonicalError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut map = Self::default();
        for target in targets {
            let target = target.as_ref();
            let canonical = canonicalize(target);
            if let Some(first) = map.originals.get(&canonical) {
                return Err(CanonicalError::DuplicateCanonicalTarget {
                    canonical,
                    first: first.clone(),
                    second: target.to_owned(),
                });
            }
            map.order.push(canonical.clone());
            map.originals.insert(canonical, target.to_owned());
        }
        Ok(map)
    }

    /// Builds a map from explicit `(key, original)` pairs, e.g. abbreviations standing in for
    /// full labels. Keys are canonicalized and must stay unique.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CanonicalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::default();
        for (key, original) in pairs {
            let canonical = canonicalize(key);
            let original = original.into();
            if let Some(first) = map.originals.get(&canonical) {
                return Err(CanonicalError::DuplicateCanonicalTarget {
                    canonical,
                    first: first.clone(),
                    second: original,
                });
            }
            map.order.push(canonical.clone());
            map.originals.insert(canonical, original);
        }
        Ok(map)
    }

    /// Looks up an already canonical key.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.originals.get(canonical).map(String::as_str)
    }

    /// Canonicalizes `raw` and returns the original spelling it matches, if any.
    pub fn resolve<T: AsRef<str>>(&self, raw: T) -> Option<&str> {
        self.get(&canonicalize(raw))
    }

    pub fn contains<T: AsRef<str>>(&self, raw: T) -> bool {
        self.resolve(raw).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(canonical, original)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|canonical| (canonical.as_str(), self.originals[canonical].as_str()))
    }

    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(_, original)| original)
    }
}
