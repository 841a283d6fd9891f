use rig::{
    completion::ToolDefinition,
    tool::{Tool, ToolError},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::envelope::ToolReply;

/// Static fact sheet for a supported blockchain network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChainRecord {
    pub name: &'static str,
    pub symbol: &'static str,
    pub consensus: &'static str,
    pub avg_block_time: &'static str,
    pub smart_contracts: bool,
    pub launched: &'static str,
    pub founder: &'static str,
    pub website: &'static str,
    pub description: &'static str,
}

// Ordered so the NotFound suggestion list is stable.
const CHAINS: &[(&str, ChainRecord)] = &[
    (
        "ethereum",
        ChainRecord {
            name: "Ethereum",
            symbol: "ETH",
            consensus: "Proof of Stake (PoS)",
            avg_block_time: "~12 seconds",
            smart_contracts: true,
            launched: "2015",
            founder: "Vitalik Buterin",
            website: "https://ethereum.org",
            description: "A decentralized platform for building dApps and smart contracts.",
        },
    ),
    (
        "bitcoin",
        ChainRecord {
            name: "Bitcoin",
            symbol: "BTC",
            consensus: "Proof of Work (PoW)",
            avg_block_time: "~10 minutes",
            smart_contracts: false,
            launched: "2009",
            founder: "Satoshi Nakamoto",
            website: "https://bitcoin.org",
            description: "The first and most well-known cryptocurrency.",
        },
    ),
    (
        "solana",
        ChainRecord {
            name: "Solana",
            symbol: "SOL",
            consensus: "Proof of History (PoH) + Proof of Stake",
            avg_block_time: "~400 milliseconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Anatoly Yakovenko",
            website: "https://solana.com",
            description: "A high-performance blockchain with fast transactions and low fees.",
        },
    ),
    (
        "polygon",
        ChainRecord {
            name: "Polygon",
            symbol: "MATIC",
            consensus: "Proof of Stake (PoS)",
            avg_block_time: "~2 seconds",
            smart_contracts: true,
            launched: "2017",
            founder: "Jaynti Kanani, Sandeep Nailwal, Anurag Arjun",
            website: "https://polygon.technology",
            description: "An Ethereum Layer 2 scaling solution.",
        },
    ),
    (
        "binance",
        ChainRecord {
            name: "BNB Chain (Binance Smart Chain)",
            symbol: "BNB",
            consensus: "Proof of Staked Authority (PoSA)",
            avg_block_time: "~3 seconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Changpeng Zhao (CZ)",
            website: "https://www.bnbchain.org",
            description: "A blockchain focusing on fast and low-cost transactions, EVM compatible.",
        },
    ),
    (
        "avalanche",
        ChainRecord {
            name: "Avalanche",
            symbol: "AVAX",
            consensus: "Avalanche Consensus (PoS variant)",
            avg_block_time: "~2 seconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Emin Gün Sirer",
            website: "https://www.avax.network",
            description: "A highly scalable blockchain platform for dApps.",
        },
    ),
    (
        "cardano",
        ChainRecord {
            name: "Cardano",
            symbol: "ADA",
            consensus: "Ouroboros Proof of Stake",
            avg_block_time: "~20 seconds",
            smart_contracts: true,
            launched: "2017",
            founder: "Charles Hoskinson",
            website: "https://cardano.org",
            description: "A research-driven blockchain focused on security.",
        },
    ),
];

/// Success payload for [`get_blockchain_info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainInfo {
    pub data: ChainRecord,
}

/// All chain keys, in table order.
pub fn chain_keys() -> Vec<String> {
    CHAINS.iter().map(|(key, _)| key.to_string()).collect()
}

/// Look up the fact sheet for a blockchain by name.
///
/// Matching is case-insensitive and ignores surrounding whitespace; any
/// string is acceptable input.
pub fn get_blockchain_info(chain_name: &str) -> ToolReply<ChainInfo> {
    let key = chain_name.trim().to_lowercase();
    match CHAINS.iter().find(|(candidate, _)| *candidate == key) {
        Some((_, record)) => ToolReply::success(ChainInfo { data: *record }),
        None => {
            debug!(target: "buddy_tools::chains", chain = %chain_name, "unknown chain requested");
            ToolReply::not_found(
                format!("Blockchain '{chain_name}' not found."),
                chain_keys(),
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockchainInfoParameters {
    pub chain_name: String,
}

/// Tool exposing the blockchain fact table to the agent.
#[derive(Debug, Clone)]
pub struct GetBlockchainInfo;

impl Tool for GetBlockchainInfo {
    const NAME: &'static str = "get_blockchain_info";
    type Args = GetBlockchainInfoParameters;
    type Output = ToolReply<ChainInfo>;
    type Error = ToolError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get basic information about a specific blockchain network".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "chain_name": {
                        "type": "string",
                        "description": "The name of the blockchain (e.g. 'ethereum', 'bitcoin', 'solana')"
                    }
                },
                "required": ["chain_name"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(get_blockchain_info(&args.chain_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_chains_return_expected_symbols() {
        for (chain, symbol) in [("ethereum", "ETH"), ("bitcoin", "BTC"), ("solana", "SOL")] {
            let reply = get_blockchain_info(chain);
            let info = reply.payload().expect("known chain should succeed");
            assert_eq!(info.data.symbol, symbol);
        }
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        assert_eq!(get_blockchain_info(" ETHEREUM "), get_blockchain_info("ethereum"));
        assert!(get_blockchain_info("\tBitCoin\n").is_success());
    }

    #[test]
    fn unknown_chain_lists_available_keys() {
        match get_blockchain_info("dogecoin") {
            ToolReply::NotFound { message, available } => {
                assert!(message.contains("dogecoin"));
                assert!(!available.is_empty());
                for expected in ["ethereum", "bitcoin", "solana"] {
                    assert!(available.iter().any(|key| key == expected));
                }
            }
            other => panic!("expected not_found, got {other:?}"),
        }
    }

    #[test]
    fn success_serializes_record_under_data() {
        let encoded = serde_json::to_value(get_blockchain_info("ethereum")).unwrap();
        assert_eq!(encoded["status"], "success");
        assert_eq!(encoded["data"]["symbol"], "ETH");
        assert_eq!(encoded["data"]["smart_contracts"], true);
    }

    #[tokio::test]
    async fn tool_call_and_definition_expose_the_table() {
        let reply = GetBlockchainInfo
            .call(GetBlockchainInfoParameters {
                chain_name: "solana".to_string(),
            })
            .await
            .unwrap();
        assert!(reply.is_success());

        let definition = GetBlockchainInfo.definition(String::new()).await;
        assert_eq!(definition.name, "get_blockchain_info");
        assert_eq!(definition.parameters["required"][0], "chain_name");
    }
}
