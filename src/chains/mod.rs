mod profile;

pub use profile::{ChainProfile, ExplorerApi, KnownAddresses, ReferenceCurrency, ARBITRUM, BSC, MAINNET};
