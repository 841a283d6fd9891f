use std::sync::LazyLock;

use regex::Regex;
use rig::{
    completion::ToolDefinition,
    tool::{Tool, ToolError},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::envelope::ToolReply;

// Format checks only: none of these verify checksums, length-to-prefix
// consistency, or on-chain existence.
const VALIDATIONS: &[(&str, &str, &str)] = &[
    (
        "ethereum",
        r"^0x[a-fA-F0-9]{40}$",
        "Ethereum addresses start with '0x' followed by 40 hex characters",
    ),
    (
        "bitcoin",
        r"^(1|3|bc1)[a-zA-HJ-NP-Z0-9]{25,62}$",
        "Bitcoin addresses start with '1', '3', or 'bc1'",
    ),
    (
        "solana",
        r"^[1-9A-HJ-NP-Za-km-z]{32,44}$",
        "Solana addresses are base58 encoded, 32-44 characters",
    ),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex, &'static str)>> = LazyLock::new(|| {
    VALIDATIONS
        .iter()
        .map(|(chain, pattern, description)| {
            (*chain, Regex::new(pattern).expect("valid pattern"), *description)
        })
        .collect()
});

/// Success payload for [`validate_wallet_address`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressValidation {
    pub address: String,
    pub chain: String,
    pub is_valid: bool,
    pub format_description: &'static str,
    pub message: &'static str,
}

/// Chains with a validation pattern, in table order.
pub fn validated_chain_keys() -> Vec<String> {
    VALIDATIONS.iter().map(|(key, _, _)| key.to_string()).collect()
}

/// Check whether an address matches the given chain's format.
///
/// The whole string must conform; substring matches do not count.
pub fn validate_wallet_address(address: &str, chain: &str) -> ToolReply<AddressValidation> {
    let key = chain.trim().to_lowercase();
    let Some((_, pattern, description)) =
        COMPILED.iter().find(|(candidate, _, _)| *candidate == key)
    else {
        return ToolReply::error_with_options(
            format!("Validation not supported for chain: {chain}"),
            validated_chain_keys(),
        );
    };

    let is_valid = pattern.is_match(address);
    debug!(
        target: "buddy_tools::address",
        chain = %key,
        is_valid,
        "validated address format"
    );

    ToolReply::success(AddressValidation {
        address: address.to_string(),
        chain: chain.to_string(),
        is_valid,
        format_description: *description,
        message: if is_valid {
            "Address format is valid!"
        } else {
            "Invalid address format."
        },
    })
}

fn default_chain() -> String {
    "ethereum".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateWalletAddressParameters {
    pub address: String,
    #[serde(default = "default_chain")]
    pub chain: String,
}

/// Tool exposing address-format validation to the agent.
#[derive(Debug, Clone)]
pub struct ValidateWalletAddress;

impl Tool for ValidateWalletAddress {
    const NAME: &'static str = "validate_wallet_address";
    type Args = ValidateWalletAddressParameters;
    type Output = ToolReply<AddressValidation>;
    type Error = ToolError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Validate a wallet address format for a given blockchain".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "string",
                        "description": "The wallet address to validate"
                    },
                    "chain": {
                        "type": "string",
                        "description": "The blockchain network (default 'ethereum')"
                    }
                },
                "required": ["address"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(validate_wallet_address(&args.address, &args.chain))
    }
}
