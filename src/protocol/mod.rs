pub mod flood;
pub mod lsa;

pub use flood::{FloodController, FloodOutcome, FloodStats, RejectReason};
pub use lsa::{LSA_SIZE, Lsa, LsaBuffer};
