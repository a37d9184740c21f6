pub mod chess_client;
pub mod fetcher;
pub mod models;

pub use chess_client::ChessComClient;
pub use fetcher::RemoteFetcher;
pub use models::{BoardDetail, BoardGame, GameSide, MatchDetail, TeamDetail, TeamPlayer};
