mod client;
mod retry;

pub use client::RateLimitedClient;
pub use retry::RetryPolicy;
