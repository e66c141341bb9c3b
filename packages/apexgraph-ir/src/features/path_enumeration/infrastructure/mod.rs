mod cache;
mod enumerator;

pub use cache::MethodPathCache;
pub use enumerator::PathEnumerator;
