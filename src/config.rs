//! Tunable constants for the reactor fleet and accept loop, exposed as
//! named, overridable fields (100 ms poll timeout, 10 ms accept
//! backoff, 128 backlog, 4 KiB read chunk) instead of literals buried
//! in the implementation, the way a library rather than an application
//! should expose them.

/// Server-wide tuning knobs.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// `poll(timeout_ms)` budget per Reactor loop iteration: bounds how
    /// quickly the `running` flag is noticed.
    pub poll_timeout_ms: i32,
    /// How long the accept thread sleeps between non-blocking `accept`
    /// attempts that found nothing pending.
    pub accept_backoff_ms: u64,
    /// Size of the scratch buffer `Connection::read_once` reads into;
    /// at least 4 KiB.
    pub read_chunk_size: usize,
    /// Listen backlog passed to `listen(2)`.
    pub backlog: i32,
}

impl ServerConfig {
    pub fn new() -> ServerConfig {
        ServerConfig::default()
    }

    pub fn poll_timeout_ms(mut self, ms: i32) -> ServerConfig {
        self.poll_timeout_ms = ms;
        self
    }

    pub fn accept_backoff_ms(mut self, ms: u64) -> ServerConfig {
        self.accept_backoff_ms = ms;
        self
    }

    pub fn read_chunk_size(mut self, bytes: usize) -> ServerConfig {
        self.read_chunk_size = bytes.max(4096);
        self
    }

    pub fn backlog(mut self, backlog: i32) -> ServerConfig {
        self.backlog = backlog;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig { poll_timeout_ms: 100, accept_backoff_ms: 10, read_chunk_size: 4096, backlog: 128 }
    }
}

#[cfg(test)]
mod test {
    use super::ServerConfig;

    #[test]
    fn defaults_match_documented_constants() {
        let config = ServerConfig::default();
        assert_eq!(config.poll_timeout_ms, 100);
        assert_eq!(config.accept_backoff_ms, 10);
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.backlog, 128);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = ServerConfig::new().poll_timeout_ms(50).backlog(16);
        assert_eq!(config.poll_timeout_ms, 50);
        assert_eq!(config.backlog, 16);
    }

    #[test]
    fn read_chunk_size_floor_is_4kib() {
        let config = ServerConfig::new().read_chunk_size(100);
        assert_eq!(config.read_chunk_size, 4096);
    }
}
