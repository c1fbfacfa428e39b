//! Concrete source adapters.
//!
//! | Adapter | Implements | Backing |
//! |---------|------------|---------|
//! | [`KrxReferenceSource`] | `ReferenceSource` | KRX CSV over HTTP or local file |
//! | [`RestEtfSource`] | `MarketDataSource`, `ReturnsSource` | JSON REST API |
//! | [`FixtureReferenceSource`] | `ReferenceSource` | in-memory catalog |
//! | [`FixtureEtfSource`] | `MarketDataSource`, `ReturnsSource` | in-memory maps |

pub mod fixture;
pub mod krx;
pub mod rest_api;

pub use fixture::{FixtureEtfSource, FixtureReferenceSource};
pub use krx::{parse_reference_csv, KrxReferenceSource, ReferenceLocation};
pub use rest_api::RestEtfSource;
