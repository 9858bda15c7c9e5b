mod fixture;
mod mock;

pub use {fixture::*, mock::*};
