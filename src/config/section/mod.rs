//! Configuration section definitions.
//!
//! Each module corresponds to a section in `threadcast.toml`:
//!
//! | Module    | TOML Section | Purpose                                   |
//! |-----------|--------------|-------------------------------------------|
//! | `feed`    | `[feed]`     | Tick period, bump limit, snapshot shape   |
//! | `clients` | `[clients]`  | Per-IP connection limit                   |

mod clients;
mod feed;

pub use clients::ClientsConfig;
pub use feed::FeedConfig;
