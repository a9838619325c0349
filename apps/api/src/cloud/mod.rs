// Live word clouds: answer tally, stats fan-out, settle-delay relayout.

pub mod handlers;
pub mod live;
pub mod store;
pub mod tally;

pub use store::CloudStore;
