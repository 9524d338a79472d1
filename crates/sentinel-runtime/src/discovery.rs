//! Competitor discovery behind a TTL cache.
//!
//! Discovery is slow and external, so a cycle never waits on it: a cache
//! miss schedules a refresh on a blocking task and the brand's competitive
//! evaluation is skipped until the next cycle.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use moka::sync::Cache;

use sentinel_core::config::CompetitiveConfig;
use sentinel_core::errors::CollaboratorError;
use sentinel_core::traits::CompetitorDiscovery;
use sentinel_core::types::Competitor;

const MAX_CACHED_BRANDS: u64 = 10_000;

/// Cached competitor lists keyed by lowercased brand name.
#[derive(Clone)]
pub struct CompetitorCache {
    discovery: Arc<dyn CompetitorDiscovery>,
    cache: Cache<String, Arc<Vec<Competitor>>>,
    refreshing: Arc<DashSet<String>>,
    max_competitors: usize,
    min_confidence: f64,
}

impl CompetitorCache {
    pub fn new(discovery: Arc<dyn CompetitorDiscovery>, config: &CompetitiveConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_BRANDS)
            .time_to_live(Duration::from_secs(config.effective_discovery_ttl_secs()))
            .build();
        Self {
            discovery,
            cache,
            refreshing: Arc::new(DashSet::new()),
            max_competitors: config.effective_max_competitors(),
            min_confidence: config.effective_min_confidence(),
        }
    }

    /// Cached competitors for `brand`, or `None` after scheduling a refresh.
    pub fn get_or_refresh(&self, brand: &str) -> Option<Arc<Vec<Competitor>>> {
        let key = brand.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit);
        }
        if !self.refreshing.insert(key.clone()) {
            return None;
        }
        tracing::debug!(brand, "competitor cache miss, scheduling discovery");
        let this = self.clone();
        let brand = brand.to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    let _ = this.refresh(&brand);
                    this.refreshing.remove(&key);
                });
            }
            Err(_) => {
                let _ = this.refresh(&brand);
                self.refreshing.remove(&key);
            }
        }
        None
    }

    /// Run discovery now and replace the cached list.
    pub fn refresh(&self, brand: &str) -> Result<Arc<Vec<Competitor>>, CollaboratorError> {
        match self.discovery.discover(brand) {
            Ok(found) => {
                let competitors = Arc::new(self.select(brand, found));
                tracing::info!(brand, competitors = competitors.len(), "competitors discovered");
                self.cache.insert(brand.to_lowercase(), Arc::clone(&competitors));
                Ok(competitors)
            }
            Err(e) => {
                tracing::warn!(brand, error = %e, "competitor discovery failed");
                Err(e)
            }
        }
    }

    pub fn invalidate(&self, brand: &str) {
        self.cache.invalidate(&brand.to_lowercase());
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Confident competitors other than the brand itself, best first.
    fn select(&self, brand: &str, mut found: Vec<Competitor>) -> Vec<Competitor> {
        let brand = brand.to_lowercase();
        found.retain(|c| {
            c.confidence >= self.min_confidence && !c.name.trim().is_empty() && c.name.to_lowercase() != brand
        });
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        found.dedup_by(|a, b| a.name.eq_ignore_ascii_case(&b.name));
        found.truncate(self.max_competitors);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Competitor>);

    impl CompetitorDiscovery for Fixed {
        fn discover(&self, _brand: &str) -> Result<Vec<Competitor>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    fn competitor(name: &str, confidence: f64) -> Competitor {
        Competitor {
            name: name.into(),
            confidence,
        }
    }

    #[test]
    fn selection_filters_and_orders() {
        let config = CompetitiveConfig {
            max_competitors: Some(2),
            ..Default::default()
        };
        let cache = CompetitorCache::new(
            Arc::new(Fixed(vec![
                competitor("Initech", 0.5),
                competitor("acme", 0.99),
                competitor("Globex", 0.9),
                competitor("Hooli", 0.1),
                competitor("Umbrella", 0.6),
            ])),
            &config,
        );
        let picked = cache.refresh("Acme").unwrap();
        let names: Vec<&str> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Umbrella"]);
    }

    #[test]
    fn miss_outside_runtime_refreshes_inline() {
        let cache = CompetitorCache::new(
            Arc::new(Fixed(vec![competitor("Globex", 0.9)])),
            &CompetitiveConfig::default(),
        );
        assert!(cache.get_or_refresh("Acme").is_none());
        assert_eq!(cache.get_or_refresh("ACME").unwrap().len(), 1);
    }
}
