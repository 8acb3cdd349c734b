//! In-memory directories shared by the listeners and the trade controller

pub mod market;
pub mod pool;
pub mod snipe_list;

pub use market::{MarketCache, MarketDirectory, MarketRecord};
pub use pool::{PoolCache, PoolDirectory, PoolRecord};
pub use snipe_list::{SnipeAllowList, SnipeListCache};
