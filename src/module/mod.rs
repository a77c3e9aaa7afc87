pub mod rate_snapshot;
