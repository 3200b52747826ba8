//! Configuration merging functionality
//!
//! Layers configuration sources on top of each other.

use crate::config::ProxyConfig;

/// Trait for merging configurations
pub trait ConfigMerger {
    /// Merge another configuration into this one
    ///
    /// Values from `other` override values in `self` when they differ from the
    /// defaults. A value in `other` that equals its default never overrides
    /// `self`; environment variables are layered with
    /// [`ConfigLoader::apply_env`](crate::config::ConfigLoader::apply_env)
    /// instead, where presence is what counts.
    fn merge(&self, other: impl AsRef<Self>) -> Self where Self: Sized;
}

impl AsRef<ProxyConfig> for ProxyConfig {
    fn as_ref(&self) -> &ProxyConfig {
        self
    }
}

impl ConfigMerger for ProxyConfig {
    fn merge(&self, other: impl AsRef<Self>) -> Self {
        let other = other.as_ref();
        let default = Self::default();

        fn merge_field<T: Clone + PartialEq>(self_val: &T, other_val: &T, default_val: &T) -> T {
            if other_val != default_val {
                other_val.clone()
            } else {
                self_val.clone()
            }
        }

        fn merge_option<T: Clone>(self_val: &Option<T>, other_val: &Option<T>) -> Option<T> {
            if other_val.is_some() {
                other_val.clone()
            } else {
                self_val.clone()
            }
        }

        Self {
            host: merge_field(&self.host, &other.host, &default.host),
            port: merge_field(&self.port, &other.port, &default.port),
            backend_port: merge_field(&self.backend_port, &other.backend_port, &default.backend_port),
            cert_path: merge_field(&self.cert_path, &other.cert_path, &default.cert_path),
            key_path: merge_field(&self.key_path, &other.key_path, &default.key_path),
            max_connections: merge_field(
                &self.max_connections,
                &other.max_connections,
                &default.max_connections,
            ),
            connect_timeout: merge_option(&self.connect_timeout, &other.connect_timeout),
            handshake_timeout: merge_option(&self.handshake_timeout, &other.handshake_timeout),
            log_level: merge_field(&self.log_level, &other.log_level, &default.log_level),
        }
    }
}
