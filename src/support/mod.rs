pub mod counters;
pub mod custom_data;
pub mod errors;
pub mod retry;
pub mod shutdown;
pub mod telemetry;

pub use counters::{CounterSnapshot, Counters};
pub use custom_data::{CustomData, CustomValue, FromCustomValue};
pub use errors::*;
pub use retry::{retry_with_backoff, RetryConfig};
pub use shutdown::ShutdownSignal;
pub use telemetry::init_tracing;
