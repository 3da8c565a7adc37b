pub mod leaderboard;
pub mod lifecycle;
pub mod normalize;
