// Internal modules
mod address;
mod chains;
mod contracts;
mod envelope;
mod gas;
mod units;

// Public re-exports
pub use address::{
    validate_wallet_address, validated_chain_keys, AddressValidation, ValidateWalletAddress,
    ValidateWalletAddressParameters,
};
pub use chains::{
    chain_keys, get_blockchain_info, ChainInfo, ChainRecord, GetBlockchainInfo,
    GetBlockchainInfoParameters,
};
pub use contracts::{
    get_contract_template, template_keys, ContractTemplate, GetSmartContractTemplate,
    GetSmartContractTemplateParameters, TemplateInfo,
};
pub use envelope::ToolReply;
pub use gas::{
    explain_gas_fees, gas_chain_keys, ExplainGasFees, ExplainGasFeesParameters, GasFees,
    GasProfile,
};
pub use units::{
    convert_crypto_units, unit_keys, ChainFamily, Conversion, ConvertCryptoUnits,
    ConvertCryptoUnitsParameters, UnitAmount,
};
