//! Market snapshot sources and the exchange clock.

pub mod circuit_breaker;
pub mod csv_file;
pub mod grid;
pub mod http;
pub mod provider;
pub mod session;

pub use circuit_breaker::CircuitBreaker;
pub use csv_file::CsvProvider;
pub use grid::reduce_to_grid;
pub use http::{parse_payload, HttpProvider, HttpSourceConfig};
pub use provider::{DataError, FetchRequest, FetchTarget, ObservationProvider};
pub use session::{previous_business_day, SessionWindow, MARKET_TZ};
