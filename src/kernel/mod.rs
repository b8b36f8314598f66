mod executor;

pub use executor::{Fired, Kernel};
