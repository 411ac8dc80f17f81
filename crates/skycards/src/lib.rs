//! # Skycards
//!
//! TCP game server for a two-player card battle: players log in, build a
//! four-card deck, meet through a public queue or a private room code, and
//! play three rounds scored on aircraft attributes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skycards::prelude::*;
//!
//! # async fn start() -> Result<(), SkycardsError> {
//! let server = SkycardsServer::builder()
//!     .bind("127.0.0.1:8080")
//!     .room_config(RoomConfig::default())
//!     .build(AccountBook::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::SkycardsError;
pub use server::{ServerConfig, SkycardsServer, SkycardsServerBuilder};

/// Everything needed to embed or test a server.
pub mod prelude {
    pub use crate::{ServerConfig, SkycardsError, SkycardsServer, SkycardsServerBuilder};
    pub use skycards_protocol::{
        Attribute, Card, ClientMessage, Codec, DECK_SIZE, Deck, JsonCodec, PlayerId,
        RoomCode, ServerMessage,
    };
    pub use skycards_room::{Matchmaker, RewardPolicy, RoomConfig, RoomError};
    pub use skycards_session::{AccountBook, Authenticator, Player, SessionError};
    pub use skycards_transport::{DEFAULT_MAX_LINE_LEN, TransportError};
}
