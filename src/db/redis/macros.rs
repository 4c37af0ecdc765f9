/// Read-through caching for catalog calls.
///
/// Returns the cached value for `$key` when present. A failed cache read is
/// logged and treated as a miss. Otherwise awaits `$block`,
/// hands the value to the background writer with `$ttl` seconds to live, and
/// returns it.
///
/// The cache must expose `get_from_cache` and `set_in_background`; the block
/// must resolve to `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// let page = cached!(self.cache, key, ttl, async move {
///     let raw: TmdbPage<TmdbListItem> = self.get_json(&path, &[]).await?;
///     Ok::<_, AppError>(raw.map(convert))
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, falling through");
                None
            }
        };
        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
