mod chain;
mod deploy;
mod proxy;

pub use {chain::*, deploy::*, proxy::*};
