mod client;
mod prober;
mod provider;
mod scanner;
mod types;

pub use provider::BitbucketProvider;
