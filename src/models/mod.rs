mod block;
mod pair;
mod screener;
mod swap;
mod token;
mod token_info;
mod transfer;

pub use block::{BlockEvent, BlockRef, BlockSlot, BlockState};
pub use pair::{PairRef, PairToken};
pub use screener::{ScreenerLiquidity, ScreenerPair, ScreenerToken, ScreenerTokensResponse, ScreenerWindows, TxnCounts};
pub use swap::{
    RawLiquidityEvent, RawSwap, SwapEvent, SwapPair, TokenLeg, TransactionRef, TransactionsResult,
};
pub use token::{TokenQueryResult, TokenRecord, TokenSnapshot};
pub use token_info::{PriceInfo, TokenInfo};
pub use transfer::{scale_raw, ExplorerResponse, TokenTransfer, TransferDirection};
