use rig::{
    completion::ToolDefinition,
    tool::{Tool, ToolError},
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::json;

use crate::envelope::ToolReply;

/// How transaction fees work on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasProfile {
    pub fee_name: &'static str,
    pub unit: &'static str,
    pub components: &'static [&'static str],
    pub explanation: &'static str,
    #[serde(serialize_with = "costs_as_map")]
    pub typical_costs: &'static [(&'static str, &'static str)],
}

// Keeps the declaration order of the cost table in the JSON object.
fn costs_as_map<S: Serializer>(
    costs: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(costs.len()))?;
    for (label, cost) in *costs {
        map.serialize_entry(label, cost)?;
    }
    map.end()
}

const GAS_PROFILES: &[(&str, GasProfile)] = &[
    (
        "ethereum",
        GasProfile {
            fee_name: "Gas",
            unit: "Gwei (1 Gwei = 0.000000001 ETH)",
            components: &["Base Fee", "Priority Fee (Tip)"],
            explanation: "Ethereum gas fees consist of:\n\
                1. **Base Fee**: Automatically determined by network demand. This is burned (destroyed).\n\
                2. **Priority Fee (Tip)**: Optional fee to incentivize validators to include your transaction faster.\n\
                \n\
                **Formula**: Total Fee = Gas Units x (Base Fee + Priority Fee)\n\
                \n\
                **Tips to save on gas**:\n\
                - Transact during low-activity periods (weekends, late nights)\n\
                - Use Layer 2 solutions like Polygon, Arbitrum, or Optimism\n\
                - Set a max fee limit to avoid overpaying",
            typical_costs: &[
                ("simple_transfer", "21,000 gas units"),
                ("token_transfer", "~65,000 gas units"),
                ("swap", "~150,000 gas units"),
            ],
        },
    ),
    (
        "solana",
        GasProfile {
            fee_name: "Transaction Fee",
            unit: "Lamports (1 SOL = 1,000,000,000 Lamports)",
            components: &["Base Fee", "Priority Fee"],
            explanation: "Solana has extremely low transaction fees:\n\
                1. **Base Fee**: Fixed at 5,000 lamports (0.000005 SOL) per signature\n\
                2. **Priority Fee**: Optional additional fee for faster processing\n\
                \n\
                Solana's fees are among the lowest in the industry, typically costing a fraction of a cent.",
            typical_costs: &[
                ("simple_transfer", "~0.000005 SOL"),
                ("token_transfer", "~0.00001 SOL"),
            ],
        },
    ),
    (
        "polygon",
        GasProfile {
            fee_name: "Gas (MATIC)",
            unit: "Gwei (paid in MATIC)",
            components: &["Base Fee", "Priority Fee"],
            explanation: "Polygon uses a similar gas model to Ethereum but with much lower costs:\n\
                - Uses MATIC token for gas payments\n\
                - Significantly cheaper than Ethereum mainnet\n\
                - Fast transaction finality (~2 seconds)\n\
                \n\
                Typical transaction costs are pennies compared to Ethereum's dollars.",
            typical_costs: &[
                ("simple_transfer", "~$0.001-0.01"),
                ("swap", "~$0.05-0.20"),
            ],
        },
    ),
];

/// Success payload for [`explain_gas_fees`]. Echoes the caller's chain
/// argument as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasFees {
    pub chain: String,
    pub gas_info: GasProfile,
}

/// Chains with a gas profile, in table order.
pub fn gas_chain_keys() -> Vec<String> {
    GAS_PROFILES.iter().map(|(key, _)| key.to_string()).collect()
}

/// Explain how transaction fees work on the given chain.
pub fn explain_gas_fees(chain: &str) -> ToolReply<GasFees> {
    let key = chain.trim().to_lowercase();
    match GAS_PROFILES.iter().find(|(candidate, _)| *candidate == key) {
        Some((_, profile)) => ToolReply::success(GasFees {
            chain: chain.to_string(),
            gas_info: *profile,
        }),
        None => ToolReply::not_found(
            format!("Gas fee information not available for {chain}"),
            gas_chain_keys(),
        ),
    }
}

fn default_chain() -> String {
    "ethereum".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainGasFeesParameters {
    #[serde(default = "default_chain")]
    pub chain: String,
}

/// Tool exposing the gas-fee table to the agent.
#[derive(Debug, Clone)]
pub struct ExplainGasFees;

impl Tool for ExplainGasFees {
    const NAME: &'static str = "explain_gas_fees";
    type Args = ExplainGasFeesParameters;
    type Output = ToolReply<GasFees>;
    type Error = ToolError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Explain how gas fees work on a specific blockchain".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "chain": {
                        "type": "string",
                        "description": "The blockchain network to explain fees for (default 'ethereum')"
                    }
                },
                "required": []
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(explain_gas_fees(&args.chain))
    }
}
