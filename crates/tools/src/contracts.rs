use rig::{
    completion::ToolDefinition,
    tool::{Tool, ToolError},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::envelope::ToolReply;

/// A starter smart-contract source with a short description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContractTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<&'static str>,
}

const ERC20_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract MyToken is ERC20, Ownable {
    constructor(string memory name, string memory symbol, uint256 initialSupply)
        ERC20(name, symbol) Ownable(msg.sender) {
        _mint(msg.sender, initialSupply * 10 ** decimals());
    }

    function mint(address to, uint256 amount) public onlyOwner {
        _mint(to, amount);
    }
}"#;

const ERC721_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

import "@openzeppelin/contracts/token/ERC721/ERC721.sol";
import "@openzeppelin/contracts/token/ERC721/extensions/ERC721URIStorage.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract MyNFT is ERC721, ERC721URIStorage, Ownable {
    uint256 private _tokenIdCounter;

    constructor() ERC721("MyNFT", "MNFT") Ownable(msg.sender) {}

    function safeMint(address to, string memory uri) public onlyOwner {
        uint256 tokenId = _tokenIdCounter++;
        _safeMint(to, tokenId);
        _setTokenURI(tokenId, uri);
    }

    function tokenURI(uint256 tokenId) public view override(ERC721, ERC721URIStorage)
        returns (string memory) { return super.tokenURI(tokenId); }

    function supportsInterface(bytes4 interfaceId) public view override(ERC721, ERC721URIStorage)
        returns (bool) { return super.supportsInterface(interfaceId); }
}"#;

const SIMPLE_STORAGE_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract SimpleStorage {
    uint256 private storedValue;
    event ValueChanged(uint256 newValue, address changedBy);

    function set(uint256 value) public {
        storedValue = value;
        emit ValueChanged(value, msg.sender);
    }

    function get() public view returns (uint256) { return storedValue; }
}"#;

const TEMPLATES: &[(&str, ContractTemplate)] = &[
    (
        "erc20",
        ContractTemplate {
            name: "ERC-20 Token",
            description: "Standard fungible token contract",
            code: ERC20_CODE,
            explanation: Some(
                "This creates a basic ERC-20 token with minting capability. Uses OpenZeppelin for security.",
            ),
        },
    ),
    (
        "erc721",
        ContractTemplate {
            name: "ERC-721 NFT",
            description: "Standard NFT contract",
            code: ERC721_CODE,
            explanation: Some(
                "A basic NFT contract with metadata URI storage. Each token is unique and can have its own metadata.",
            ),
        },
    ),
    (
        "simple_storage",
        ContractTemplate {
            name: "Simple Storage",
            description: "Basic learning contract",
            code: SIMPLE_STORAGE_CODE,
            explanation: Some(
                "A beginner-friendly contract that stores a single number. Great for learning Solidity basics.",
            ),
        },
    ),
];

/// Success payload for [`get_contract_template`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateInfo {
    pub template: ContractTemplate,
}

/// All template keys, in table order.
pub fn template_keys() -> Vec<String> {
    TEMPLATES.iter().map(|(key, _)| key.to_string()).collect()
}

/// Fetch a starter contract template by type key.
pub fn get_contract_template(contract_type: &str) -> ToolReply<TemplateInfo> {
    let key = contract_type.trim().to_lowercase();
    match TEMPLATES.iter().find(|(candidate, _)| *candidate == key) {
        Some((_, template)) => ToolReply::success(TemplateInfo {
            template: *template,
        }),
        None => ToolReply::not_found(
            format!("Template '{contract_type}' not found."),
            template_keys(),
        ),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSmartContractTemplateParameters {
    pub contract_type: String,
}

/// Tool exposing the contract-template table to the agent.
#[derive(Debug, Clone)]
pub struct GetSmartContractTemplate;

impl Tool for GetSmartContractTemplate {
    const NAME: &'static str = "get_smart_contract_template";
    type Args = GetSmartContractTemplateParameters;
    type Output = ToolReply<TemplateInfo>;
    type Error = ToolError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get a basic smart contract template for common use cases".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "contract_type": {
                        "type": "string",
                        "description": "The type of contract ('erc20', 'erc721', 'simple_storage')"
                    }
                },
                "required": ["contract_type"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(get_contract_template(&args.contract_type))
    }
}
