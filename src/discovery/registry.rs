// crates.io
use async_lock::Mutex as AsyncMutex;
use parking_lot::{Mutex, RwLock};
use time::{Duration, OffsetDateTime};
// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	discovery::{DiscoveryClient, ProviderMetadata},
	obs::{self, Stage},
	provider::ProviderDescriptor,
};

#[derive(Clone, Debug)]
struct CachedMetadata {
	fetched_at: OffsetDateTime,
	metadata: Arc<ProviderMetadata>,
}

/// Per-provider cache of metadata documents.
///
/// Entries expire after the configured TTL. Concurrent lookups for the same provider share one
/// download; lookups for different providers never block each other.
#[derive(Debug)]
pub struct MetadataRegistry {
	ttl: Duration,
	cache: RwLock<HashMap<ProviderName, CachedMetadata>>,
	fetch_guards: Mutex<HashMap<ProviderName, Arc<AsyncMutex<()>>>>,
}
impl MetadataRegistry {
	/// Default time a document stays fresh.
	pub const DEFAULT_TTL: Duration = Duration::HOUR;

	/// Creates an empty registry using [`Self::DEFAULT_TTL`].
	pub fn new() -> Self {
		Self::with_ttl(Self::DEFAULT_TTL)
	}

	/// Creates an empty registry with a custom TTL; negative values are clamped to zero.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			ttl: if ttl.is_negative() { Duration::ZERO } else { ttl },
			cache: Default::default(),
			fetch_guards: Default::default(),
		}
	}

	/// Configured TTL.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Returns the cached document when it is still fresh.
	pub fn cached(&self, provider: &str) -> Option<Arc<ProviderMetadata>> {
		self.fresh(provider, OffsetDateTime::now_utc())
	}

	/// Drops the cached document so the next lookup downloads it again.
	pub fn invalidate(&self, provider: &str) -> bool {
		self.cache.write().remove(provider).is_some()
	}

	/// Returns the fresh cached document or downloads it.
	///
	/// Endpoint drift found by [`ProviderMetadata::reconcile`] is logged, not rejected.
	pub async fn get_or_fetch(
		&self,
		descriptor: &ProviderDescriptor,
	) -> Result<Arc<ProviderMetadata>> {
		if let Some(metadata) = self.cached(&descriptor.name) {
			return Ok(metadata);
		}

		let guard = self.fetch_guard(&descriptor.name);
		let _singleflight = guard.lock().await;

		// Another task may have refreshed the entry while this one waited.
		if let Some(metadata) = self.cached(&descriptor.name) {
			return Ok(metadata);
		}

		let client = DiscoveryClient::for_descriptor(descriptor)?;
		let metadata = Arc::new(client.fetch(descriptor).await?);

		for mismatch in metadata.reconcile(descriptor) {
			obs::warn(
				Stage::Discovery,
				&descriptor.name,
				&format!("Metadata disagrees with settings: {mismatch}."),
			);
		}

		self.cache.write().insert(
			descriptor.name.clone(),
			CachedMetadata { fetched_at: OffsetDateTime::now_utc(), metadata: metadata.clone() },
		);

		Ok(metadata)
	}

	fn fresh(&self, provider: &str, now: OffsetDateTime) -> Option<Arc<ProviderMetadata>> {
		let cache = self.cache.read();
		let entry = cache.get(provider)?;

		(now - entry.fetched_at < self.ttl).then(|| entry.metadata.clone())
	}

	fn fetch_guard(&self, provider: &ProviderName) -> Arc<AsyncMutex<()>> {
		let mut guards = self.fetch_guards.lock();

		guards.entry(provider.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Default for MetadataRegistry {
	fn default() -> Self {
		Self::new()
	}
}
