pub mod cache;
pub mod problem;
pub mod range;

#[cfg(test)]
mod tests_cache;

pub use cache::SelfClearingCache;
pub use problem::{Problem, ProblemKind};
pub use range::Range;
