pub mod driver;
pub mod lookup;
pub mod pool;
pub mod reduction;
pub mod similarity;

pub use driver::Resolver;
pub use lookup::{ElementLookup, LookupStats};
pub use pool::WorkerPool;
pub use reduction::{ClaimSet, Reduction};
