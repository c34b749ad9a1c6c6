//! Subgraph query documents.
//!
//! Addresses and block numbers are interpolated only after validation
//! (hex address / integer); everything else goes through variables.

use crate::chains::ReferenceCurrency;

/// Token fields selected on each deployment. PancakeSwap reports prices in
/// BNB (with a USD fallback) and has no `txCount`.
fn token_fields(reference: ReferenceCurrency) -> &'static str {
    match reference {
        ReferenceCurrency::Eth => {
            "id name symbol decimals derivedETH tradeVolume tradeVolumeUSD untrackedVolumeUSD totalLiquidity txCount"
        },
        ReferenceCurrency::Bnb => {
            "id name symbol decimals derivedBNB derivedUSD tradeVolume tradeVolumeUSD untrackedVolumeUSD totalLiquidity"
        },
    }
}

fn block_argument(block: Option<u64>) -> String {
    block
        .map(|number| format!("block: {{number: {}}}, ", number))
        .unwrap_or_default()
}

const PAIR_SELECTION: &str = "id token0 { id symbol name } token1 { id symbol name }";

/// Token record at `block` (latest when `None`) plus its top 20 pairs on
/// each side, ordered by reserve.
pub fn token_query(reference: ReferenceCurrency, address: &str, block: Option<u64>) -> String {
    format!(
        r#"query tokens {{
  tokens({block}where: {{id: "{address}"}}) {{ {fields} }}
  pairs0: pairs(where: {{token0: "{address}"}}, first: 20, orderBy: reserveUSD, orderDirection: desc) {{ {pair} }}
  pairs1: pairs(where: {{token1: "{address}"}}, first: 20, orderBy: reserveUSD, orderDirection: desc) {{ {pair} }}
}}"#,
        block = block_argument(block),
        address = address,
        fields = token_fields(reference),
        pair = PAIR_SELECTION,
    )
}

/// USD price of the reference currency from the `Bundle` singleton.
pub fn bundle_query(reference: ReferenceCurrency, block: Option<u64>) -> String {
    format!(
        "query bundles {{ bundles({}where: {{id: 1}}) {{ id {} }} }}",
        block_argument(block),
        reference.bundle_price_field()
    )
}

/// First block with a timestamp strictly inside `(timestampFrom, timestampTo)`.
pub const BLOCK_QUERY: &str = r#"query blocks($timestampFrom: Int!, $timestampTo: Int!) {
  blocks(first: 1, orderBy: timestamp, orderDirection: asc, where: {timestamp_gt: $timestampFrom, timestamp_lt: $timestampTo}) {
    id
    number
    timestamp
  }
}"#;

const SWAP_SELECTION: &str = r#"id
    transaction { id timestamp }
    pair { id token0 { id symbol name decimals } token1 { id symbol name decimals } }
    amount0In
    amount0Out
    amount1In
    amount1Out
    amountUSD
    to
    from
    sender
    timestamp"#;

const LIQUIDITY_SELECTION: &str = r#"id
    transaction { id timestamp }
    pair { id token0 { id symbol name } token1 { id symbol name } }
    to
    sender
    liquidity
    amount0
    amount1
    amountUSD"#;

/// Latest mints, burns and swaps across a set of pairs.
pub fn pair_transactions_query() -> String {
    format!(
        r#"query filteredTransactions($allPairs: [Bytes]!) {{
  mints(first: 5, where: {{pair_in: $allPairs}}, orderBy: timestamp, orderDirection: desc) {{
    {liquidity}
  }}
  burns(first: 5, where: {{pair_in: $allPairs}}, orderBy: timestamp, orderDirection: desc) {{
    {liquidity}
  }}
  swaps(first: 350, where: {{pair_in: $allPairs}}, orderBy: timestamp, orderDirection: desc) {{
    {swap}
  }}
}}"#,
        liquidity = LIQUIDITY_SELECTION,
        swap = SWAP_SELECTION,
    )
}

/// Mints, burns and direct swaps of one account.
pub fn account_transactions_query(reference: ReferenceCurrency) -> String {
    let user_type = match reference {
        ReferenceCurrency::Eth => "Bytes!",
        ReferenceCurrency::Bnb => "String!",
    };
    format!(
        r#"query transactions($user: {user_type}) {{
  mints(orderBy: timestamp, orderDirection: desc, where: {{to: $user}}) {{
    {liquidity}
  }}
  burns(orderBy: timestamp, orderDirection: desc, where: {{sender: $user}}) {{
    {liquidity}
  }}
  swaps(orderBy: timestamp, orderDirection: desc, where: {{to: $user, from: $user}}) {{
    {swap}
  }}
}}"#,
        user_type = user_type,
        liquidity = LIQUIDITY_SELECTION,
        swap = SWAP_SELECTION,
    )
}

/// Swaps an account sent through the given routers.
pub fn account_sells_query(routers: &[&str]) -> String {
    let routers = routers
        .iter()
        .map(|router| format!("\"{}\"", router))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"query sellTransactions($user: Bytes!) {{
  swaps(orderBy: timestamp, orderDirection: desc, where: {{to_in: [{routers}], from: $user}}) {{
    {swap}
  }}
}}"#,
        routers = routers,
        swap = SWAP_SELECTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_query_pins_block() {
        let latest = token_query(ReferenceCurrency::Eth, "0xabc", None);
        assert!(!latest.contains("block:"));
        assert!(latest.contains("derivedETH"));
        assert!(latest.contains(r#"tokens(where: {id: "0xabc"})"#));

        let pinned = token_query(ReferenceCurrency::Bnb, "0xabc", Some(123));
        assert!(pinned.contains("tokens(block: {number: 123}, where"));
        assert!(pinned.contains("derivedBNB derivedUSD"));
        assert!(!pinned.contains("txCount"));
    }

    #[test]
    fn test_bundle_and_sells_queries() {
        assert_eq!(
            bundle_query(ReferenceCurrency::Bnb, Some(7)),
            "query bundles { bundles(block: {number: 7}, where: {id: 1}) { id bnbPrice } }"
        );
        let sells = account_sells_query(&["0x1", "0x2"]);
        assert!(sells.contains(r#"to_in: ["0x1", "0x2"]"#));
    }
}
