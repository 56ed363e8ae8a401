pub mod histogram;
pub mod running;

pub use histogram::RankHistogram;
pub use running::CountEngine;
