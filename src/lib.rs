// Core modules
pub mod abbreviations;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod event;
pub mod event_matcher;
pub mod pick_store;
pub mod preview;
pub mod server;
pub mod side_resolver;
pub mod signer;
pub mod tier_verifier;
pub mod tiers;

// Re-exports
pub use catalog::{CatalogConfig, CatalogFetch, LeagueExclusionFilter, MarketCatalog};
pub use clients::{ExchangeClient, KalshiClient};
pub use config::Settings;
pub use error::{ExchangeError, PreviewError, ServerError, SigningError};
pub use event::{Market, Pick, Side, Sport};
pub use event_matcher::{MatchStrategy, TeamMatch, TeamMatcher};
pub use pick_store::{FilePickStore, PickStore};
pub use preview::{PreviewPick, PreviewResponse, PreviewService, PreviewSettings};
pub use server::{build_router, AppContext, AppState};
pub use side_resolver::SideResolver;
pub use signer::RequestSigner;
pub use tier_verifier::{StaticTierVerifier, TierVerifier};
pub use tiers::{Tier, TierAccess, TierAllocator, TieredPicks};
