mod channel;
mod clock;
mod opt_out;
mod storage;
mod transport;

pub use channel::IChannel;
pub use clock::{IClock, SystemClock};
pub use opt_out::{IOptOut, NeverOptedOut};
pub use storage::{IKeyValueStore, StorageChange};
pub use transport::ITransport;
