pub mod config;
pub mod contracts;
pub mod engine;
pub mod history;
pub mod types;
pub mod sources {
    pub mod remote;
    pub mod static_quotes;
}

pub use sources::remote::RemoteQuoteSource;
pub use sources::static_quotes::StaticQuoteSource;
pub use types::*;
