//! The streaming processor: owns the cache lifecycle and enriches samples.
//!
//! The host constructs the processor at startup, starts it once a runtime
//! is available, calls [`TagProcessor::apply`] for every sample, and stops
//! it at shutdown. Enrichment is strictly best-effort: a cold or unavailable
//! cache degrades to "no enrichment", never to a processing failure.

use crate::config::ProcessorConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use vtags_cache::TagCache;
use vtags_core::{Metric, VtagsResult};
use vtags_vsphere::{RestSessionFactory, SessionFactory};

pub struct TagProcessor {
    moid_tag: String,
    cache_interval: Duration,
    cache: Arc<TagCache>,
    shutdown_tx: Option<watch::Sender<bool>>,
    worker: Option<JoinHandle<()>>,
}

impl TagProcessor {
    /// Validate the configuration and build the cache against the real
    /// endpoint. Configuration problems surface here, before any sample
    /// flows.
    pub fn new(config: &ProcessorConfig) -> VtagsResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        let factory = RestSessionFactory::new(endpoint)?;
        Ok(Self::with_factory(config, Arc::new(factory)))
    }

    /// Build the processor over an explicit session factory. Used by tests
    /// and by hosts that bring their own transport.
    pub fn with_factory(config: &ProcessorConfig, factory: Arc<dyn SessionFactory>) -> Self {
        let mut cache = TagCache::new(factory, config.timeout());
        cache.set_category_filter(config.vsphere_categories.clone());
        Self {
            moid_tag: config.metric_moid_tag.clone(),
            cache_interval: config.cache_interval(),
            cache: Arc::new(cache),
            shutdown_tx: None,
            worker: None,
        }
    }

    /// Spawn the cache refresh loop. Must be called from within a tokio
    /// runtime. Starting an already-started processor is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(&self.cache);
        let interval = self.cache_interval;
        self.worker = Some(tokio::spawn(async move {
            cache.run(shutdown_rx, interval).await;
        }));
        self.shutdown_tx = Some(shutdown_tx);
        tracing::info!(
            interval_secs = interval.as_secs(),
            "vSphere tag processor started"
        );
    }

    /// Signal the refresh loop to stop and wait for it to unwind. Stopping
    /// a never-started processor is a no-op.
    pub async fn stop(&mut self) {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return;
        };
        let _ = shutdown_tx.send(true);
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                tracing::warn!(error = %err, "tag cache worker did not shut down cleanly");
            }
        }
        tracing::info!("vSphere tag processor stopped");
    }

    /// Enrich one sample in place.
    ///
    /// On a cache hit every `(category, label)` pair becomes a tag on the
    /// sample; on a miss the sample passes through unmodified. Never errors
    /// and never blocks on remote I/O.
    pub fn apply(&self, metric: &mut Metric) {
        let Some(moid) = metric.tag(&self.moid_tag).map(str::to_string) else {
            tracing::debug!(
                metric = %metric.name,
                moid_tag = %self.moid_tag,
                "sample carries no object id tag"
            );
            return;
        };
        match self.cache.get(&moid) {
            Some(labels) => {
                for (category, label) in labels {
                    metric.add_tag(category, label);
                }
                tracing::debug!(moid = %moid, "sample enriched with vSphere tags");
            }
            None => {
                tracing::trace!(moid = %moid, "no cached tags for object");
            }
        }
    }

    /// The underlying cache, for host-side introspection.
    pub fn cache(&self) -> &TagCache {
        &self.cache
    }
}

impl std::fmt::Debug for TagProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagProcessor")
            .field("moid_tag", &self.moid_tag)
            .field("cache_interval", &self.cache_interval)
            .field("running", &self.worker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vtags_core::{AttachedLabel, AttachedLabelSet, Category};
    use vtags_vsphere::mock::MockSessionFactory;

    fn mock_factory() -> MockSessionFactory {
        let factory = MockSessionFactory::new();
        factory.set_categories(vec![Category::new("c1", "Env")]);
        factory.set_virtual_machines(vec!["vm-100"]);
        factory.set_attached_labels(vec![AttachedLabelSet::new(
            "vm-100",
            vec![AttachedLabel::new("c1", "prod")],
        )]);
        factory
    }

    fn test_config() -> ProcessorConfig {
        ProcessorConfig::from_toml(
            r#"
            vcenter = "https://vc.example.org"
            username = "user"
            password = "secret"
            cache_interval_secs = 600
            "#,
        )
        .unwrap()
    }

    async fn wait_until_populated(processor: &TagProcessor) {
        for _ in 0..200 {
            if !processor.cache().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("cache never populated");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ProcessorConfig::default();
        assert!(TagProcessor::new(&config).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_apply_enriches_on_hit() {
        let factory = mock_factory();
        let mut processor = TagProcessor::with_factory(&test_config(), Arc::new(factory));
        processor.start();
        wait_until_populated(&processor).await;

        let mut metric = Metric::new("vm_cpu").with_tag("moid", "vm-100");
        processor.apply(&mut metric);
        assert_eq!(metric.tag("Env"), Some("prod"));
        assert_eq!(metric.tag("moid"), Some("vm-100"));

        processor.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_apply_passes_through_on_miss() {
        let factory = mock_factory();
        let mut processor = TagProcessor::with_factory(&test_config(), Arc::new(factory));
        processor.start();
        wait_until_populated(&processor).await;

        let mut unknown = Metric::new("vm_cpu").with_tag("moid", "vm-404");
        processor.apply(&mut unknown);
        assert_eq!(unknown.tags().len(), 1);

        let mut untagged = Metric::new("host_cpu").with_tag("host", "esx-1");
        processor.apply(&mut untagged);
        assert_eq!(untagged.tags().len(), 1);

        processor.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_clears_enrichment_state() {
        let factory = mock_factory();
        let mut processor = TagProcessor::with_factory(&test_config(), Arc::new(factory));
        processor.start();
        wait_until_populated(&processor).await;
        processor.stop().await;

        let mut metric = Metric::new("vm_cpu").with_tag("moid", "vm-100");
        processor.apply(&mut metric);
        assert_eq!(metric.tag("Env"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_twice_and_stop_twice_are_noops() {
        let factory = mock_factory();
        let mut processor = TagProcessor::with_factory(&test_config(), Arc::new(factory));
        processor.start();
        processor.start();
        processor.stop().await;
        processor.stop().await;
    }

    #[tokio::test]
    async fn test_apply_without_start_is_a_miss() {
        let factory = mock_factory();
        let processor = TagProcessor::with_factory(&test_config(), Arc::new(factory));

        let mut metric = Metric::new("vm_cpu").with_tag("moid", "vm-100");
        processor.apply(&mut metric);
        assert_eq!(metric.tag("Env"), None);
    }
}
