pub mod board;
pub mod members;
pub mod proposals;
pub mod tally;
pub mod types;
pub mod votes;
