pub mod catalog;
pub mod rank;
pub mod runs;
pub mod schema;
pub mod scores;
pub mod store;
pub mod unit_of_work;

pub use store::Store;

/// UTC timestamp with fixed precision so stored values sort lexicographically.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
