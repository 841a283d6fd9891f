use rig::{
    completion::ToolDefinition,
    tool::{Tool, ToolError},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::envelope::ToolReply;

/// Grouping of denomination units that share a common base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Ethereum,
    Bitcoin,
    Solana,
}

impl ChainFamily {
    pub fn canonical_name(self) -> &'static str {
        match self {
            ChainFamily::Ethereum => "ethereum",
            ChainFamily::Bitcoin => "bitcoin",
            ChainFamily::Solana => "solana",
        }
    }
}

// Factor is relative to the family base unit (Wei, Satoshi, Lamport).
const UNITS: &[(&str, ChainFamily, f64)] = &[
    ("wei", ChainFamily::Ethereum, 1.0),
    ("gwei", ChainFamily::Ethereum, 1e9),
    ("eth", ChainFamily::Ethereum, 1e18),
    ("ether", ChainFamily::Ethereum, 1e18),
    ("satoshi", ChainFamily::Bitcoin, 1.0),
    ("sat", ChainFamily::Bitcoin, 1.0),
    ("btc", ChainFamily::Bitcoin, 1e8),
    ("bitcoin", ChainFamily::Bitcoin, 1e8),
    ("lamport", ChainFamily::Solana, 1.0),
    ("lamports", ChainFamily::Solana, 1.0),
    ("sol", ChainFamily::Solana, 1e9),
    ("solana", ChainFamily::Solana, 1e9),
];

fn lookup_unit(unit: &str) -> Option<(ChainFamily, f64)> {
    UNITS
        .iter()
        .find(|(candidate, _, _)| *candidate == unit)
        .map(|(_, family, factor)| (*family, *factor))
}

/// All unit keys, in table order.
pub fn unit_keys() -> Vec<String> {
    UNITS.iter().map(|(key, _, _)| key.to_string()).collect()
}

/// One side of a conversion: an amount in a named unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitAmount {
    pub amount: f64,
    pub unit: String,
}

/// Success payload for [`convert_crypto_units`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub input: UnitAmount,
    pub output: UnitAmount,
    pub blockchain: &'static str,
}

/// Convert an amount between two denominations of the same chain family.
///
/// Both units must be known and belong to the same family; the result is
/// `amount * factor(from) / factor(to)` in f64, no rounding applied.
pub fn convert_crypto_units(amount: f64, from_unit: &str, to_unit: &str) -> ToolReply<Conversion> {
    let from_key = from_unit.trim().to_lowercase();
    let to_key = to_unit.trim().to_lowercase();

    let (Some((from_family, from_factor)), Some((to_family, to_factor))) =
        (lookup_unit(&from_key), lookup_unit(&to_key))
    else {
        return ToolReply::error_with_options("Invalid unit specified", unit_keys());
    };

    if from_family != to_family {
        return ToolReply::error(format!(
            "Cannot convert between different blockchains ({} to {})",
            from_family.canonical_name(),
            to_family.canonical_name()
        ));
    }

    let result = amount * from_factor / to_factor;
    info!(
        target: "buddy_tools::units",
        amount,
        from = %from_key,
        to = %to_key,
        result,
        "converted units"
    );

    ToolReply::success(Conversion {
        input: UnitAmount {
            amount,
            unit: from_unit.to_string(),
        },
        output: UnitAmount {
            amount: result,
            unit: to_unit.to_string(),
        },
        blockchain: from_family.canonical_name(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertCryptoUnitsParameters {
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
}

/// Tool exposing unit conversion to the agent.
#[derive(Debug, Clone)]
pub struct ConvertCryptoUnits;

impl Tool for ConvertCryptoUnits {
    const NAME: &'static str = "convert_crypto_units";
    type Args = ConvertCryptoUnitsParameters;
    type Output = ToolReply<Conversion>;
    type Error = ToolError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Convert between different cryptocurrency unit denominations".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "amount": {
                        "type": "number",
                        "description": "The amount to convert"
                    },
                    "from_unit": {
                        "type": "string",
                        "description": "The source unit (e.g. 'eth', 'gwei', 'wei', 'btc', 'satoshi')"
                    },
                    "to_unit": {
                        "type": "string",
                        "description": "The target unit"
                    }
                },
                "required": ["amount", "from_unit", "to_unit"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(convert_crypto_units(
            args.amount,
            &args.from_unit,
            &args.to_unit,
        ))
    }
}
