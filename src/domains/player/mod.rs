pub mod repository;
pub mod service;
pub mod types;

pub use repository::{PlayerRepository, SqlitePlayerRepository};
pub use service::{PlayerService, PlayerServiceImpl};
pub use types::{NewPlayer, Player, PlayerResponse, PlayerSummary, UpdatePlayer};
