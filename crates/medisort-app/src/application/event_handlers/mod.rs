mod streak_snapshot_handler;

pub use streak_snapshot_handler::StreakSnapshotHandler;
