//! Upstream sources
//!
//! Everything that talks to the network lives here: the proxy listing, the
//! catalog page behind a proxy, and the batched programming endpoint. Pure
//! decoding helpers ([`blob`], [`channels`]) sit alongside them.

pub mod blob;
pub mod catalog;
pub mod channels;
pub mod epg;
pub mod proxy_pool;
pub mod traits;

pub use catalog::CatalogFetcher;
pub use channels::ChannelExtractor;
pub use epg::EpgBatchFetcher;
pub use proxy_pool::ProxyPool;
pub use traits::{CatalogSource, ProxyProvider, ScheduleSource};
