use std::sync::{Arc, Mutex, MutexGuard};

use crate::classes::{ClassGenerator, ClassMapping};
use crate::themes::Theme;

/// How many theme pairs are kept around by default
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug)]
struct CacheEntry {
    light: Arc<Theme>,
    dark: Arc<Theme>,
    mapping: Arc<ClassMapping>,
}

#[derive(Debug, Default)]
struct CacheState {
    // Least recently used first. A Vec is plenty fast for such a small bound.
    entries: Vec<CacheEntry>,
    computed: usize,
}

/// A bounded LRU of class mappings keyed on the identity of a (light, dark) theme pair.
///
/// The mapping of a missing pair is computed while holding the lock: concurrent misses on the
/// same pair are serialized and only the first one computes it.
#[derive(Debug)]
pub struct ClassCache {
    generator: ClassGenerator,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ClassCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(generator: ClassGenerator, capacity: usize) -> Self {
        Self {
            generator,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn generator(&self) -> &ClassGenerator {
        &self.generator
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many mappings were computed so far, ie how many misses happened
    pub fn computed(&self) -> usize {
        self.lock().computed
    }

    /// Whether that exact pair of themes is currently cached. Does not touch the recency order.
    pub fn contains(&self, light: &Arc<Theme>, dark: Option<&Arc<Theme>>) -> bool {
        let dark = dark.unwrap_or(light);
        self.lock()
            .entries
            .iter()
            .any(|e| Arc::ptr_eq(&e.light, light) && Arc::ptr_eq(&e.dark, dark))
    }

    /// Returns the class mapping for that pair of themes, computing it if needed.
    ///
    /// Without a dark theme, the light one is used for both.
    pub fn get(&self, light: &Arc<Theme>, dark: Option<&Arc<Theme>>) -> Arc<ClassMapping> {
        let dark = dark.unwrap_or(light);
        let mut state = self.lock();

        let found = state
            .entries
            .iter()
            .rposition(|e| Arc::ptr_eq(&e.light, light) && Arc::ptr_eq(&e.dark, dark));

        if let Some(idx) = found {
            #[cfg(feature = "debug")]
            log::debug!(
                "class cache hit for ({}, {}) at position {idx}",
                light.name,
                dark.name
            );
            let last = state.entries.len() - 1;
            if idx != last {
                let entry = state.entries.remove(idx);
                state.entries.push(entry);
            }
            return Arc::clone(&state.entries[last].mapping);
        }

        #[cfg(feature = "debug")]
        log::debug!("class cache miss for ({}, {})", light.name, dark.name);
        let mapping = Arc::new(self.generator.mapping(light, dark));
        state.computed += 1;

        if state.entries.len() >= self.capacity {
            let _evicted = state.entries.remove(0);
            #[cfg(feature = "debug")]
            log::debug!(
                "class cache evicted ({}, {})",
                _evicted.light.name,
                _evicted.dark.name
            );
        }
        state.entries.push(CacheEntry {
            light: Arc::clone(light),
            dark: Arc::clone(dark),
            mapping: Arc::clone(&mapping),
        });
        mapping
    }

    /// Drops every cached mapping.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Nothing can panic while the state is half-updated, a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ClassCache {
    fn default() -> Self {
        Self::new(ClassGenerator::default(), DEFAULT_CAPACITY)
    }
}
