//! Contract artifacts: the interface description and the network-to-address
//! deployment table.
//!
//! Artifacts use the Truffle build format:
//!
//! ```json
//! { "contractName": "SupplyChain",
//!   "abi": [ { "type": "function", "name": "medicineCount", "inputs": [],
//!              "outputs": [{ "name": "", "type": "uint256" }],
//!              "stateMutability": "view" } ],
//!   "networks": { "5777": { "address": "0x..." } } }
//! ```
//!
//! A network entry without an address, or with the zero address, is not a
//! deployment. Lookups for such networks miss.
//!
//! The `abi` array is parsed with `alloy-json-abi`. For every method this
//! client calls, the artifact's declared outputs (names included) become
//! the shape its return data is decoded with.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use alloy_json_abi::{Function, JsonAbi};
use pharma_core::{AccountAddress, ChainId};
use serde::Deserialize;

use crate::abi::{AbiError, Outputs};
use crate::config::ConfigError;
use crate::contract::{ContractKind, MethodSpec};

/// A compiled contract's interface description and deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub abi: JsonAbi,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkDeployment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDeployment {
    #[serde(default)]
    pub address: Option<String>,
}

impl ContractArtifact {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Artifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Artifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Deployed address on `chain_id`, if any.
    pub fn address_for(&self, chain_id: ChainId) -> Option<AccountAddress> {
        self.networks
            .get(&chain_id.to_string())
            .and_then(|n| n.address.as_deref())
            .and_then(|a| AccountAddress::parse(a).ok())
            .filter(|a| !a.is_zero())
    }

    /// Canonical signatures of the functions declared in the ABI.
    pub fn function_signatures(&self) -> Vec<String> {
        self.abi.functions().map(Function::signature).collect()
    }

    /// The declared function matching `method`'s name and input types.
    pub fn function(&self, method: &MethodSpec) -> Option<&Function> {
        let signature = method.signature();
        self.abi
            .function(method.name)
            .and_then(|overloads| overloads.iter().find(|f| f.signature() == signature))
    }

    /// Methods this front end calls that the artifact does not declare.
    pub fn missing_methods(&self, kind: ContractKind) -> Vec<String> {
        kind.methods()
            .iter()
            .filter(|m| self.function(m).is_none())
            .map(|m| m.signature())
            .collect()
    }

    /// Declared methods whose return shape differs from the built-in one,
    /// as `signature -> (types)`.
    pub fn changed_returns(&self, kind: ContractKind) -> Vec<String> {
        kind.methods()
            .iter()
            .filter_map(|m| {
                let declared = Outputs::from_params(&self.function(m)?.outputs).ok()?;
                let built_in = m.default_outputs().ok()?;
                (declared.canonical() != built_in.canonical())
                    .then(|| format!("{} -> {}", m.signature(), declared.canonical()))
            })
            .collect()
    }
}

/// Network-to-address table and declared return shapes for every contract.
#[derive(Debug, Clone, Default)]
pub struct Deployments {
    entries: HashMap<(ContractKind, ChainId), AccountAddress>,
    returns: HashMap<(ContractKind, String), Outputs>,
}

impl Deployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both artifacts. Interface drift is logged, not fatal: a call to a
    /// missing method fails at call time.
    pub fn load(register: &Path, supply_chain: &Path) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for (kind, path) in [
            (ContractKind::Register, register),
            (ContractKind::SupplyChain, supply_chain),
        ] {
            let artifact = ContractArtifact::from_file(path)?;
            let missing = artifact.missing_methods(kind);
            if !missing.is_empty() {
                tracing::warn!(
                    contract = %kind,
                    path = %path.display(),
                    ?missing,
                    "artifact does not declare methods this client calls"
                );
            }
            let changed = artifact.changed_returns(kind);
            if !changed.is_empty() {
                tracing::info!(
                    contract = %kind,
                    path = %path.display(),
                    ?changed,
                    "decoding with the artifact's declared return types"
                );
            }
            table.insert_artifact(kind, &artifact);
        }
        Ok(table)
    }

    /// Add every usable network entry and every declared return shape of
    /// `artifact`.
    pub fn insert_artifact(&mut self, kind: ContractKind, artifact: &ContractArtifact) {
        for network in artifact.networks.keys() {
            let Ok(chain_id) = ChainId::parse(network) else {
                continue;
            };
            if let Some(address) = artifact.address_for(chain_id) {
                self.entries.insert((kind, chain_id), address);
            }
        }
        for method in kind.methods() {
            let Some(function) = artifact.function(method) else {
                continue;
            };
            match Outputs::from_params(&function.outputs) {
                Ok(outputs) => {
                    self.returns.insert((kind, method.signature()), outputs);
                }
                Err(e) => {
                    tracing::warn!(method = method.name, error = %e, "ignoring undecodable artifact outputs");
                }
            }
        }
    }

    pub fn with(mut self, kind: ContractKind, chain_id: ChainId, address: AccountAddress) -> Self {
        self.entries.insert((kind, chain_id), address);
        self
    }

    pub fn address(&self, kind: ContractKind, chain_id: ChainId) -> Option<&AccountAddress> {
        self.entries.get(&(kind, chain_id))
    }

    /// Return shape for `method`: the artifact's if it declared one, else
    /// the built-in shape.
    pub fn outputs(&self, method: &MethodSpec) -> Result<Outputs, AbiError> {
        match self.returns.get(&(method.contract, method.signature())) {
            Some(outputs) => Ok(outputs.clone()),
            None => method.default_outputs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{self, DynSolValue, U256};
    use crate::contract::{MEDICINES, MEDICINE_COUNT};

    const ARTIFACT: &str = r#"{
        "contractName": "SupplyChain",
        "abi": [
            {"type": "function", "name": "medicineCount", "inputs": [],
             "outputs": [{"name": "", "type": "uint256", "internalType": "uint256"}],
             "stateMutability": "view"},
            {"type": "function", "name": "shipMedicineToHospital",
             "inputs": [{"name": "_id", "type": "uint256", "internalType": "uint256"}],
             "outputs": [], "stateMutability": "nonpayable"},
            {"type": "function", "name": "medicines",
             "inputs": [{"name": "", "type": "uint256", "internalType": "uint256"}],
             "outputs": [
                {"name": "id", "type": "uint256", "internalType": "uint256"},
                {"name": "name", "type": "string", "internalType": "string"}
             ],
             "stateMutability": "view"},
            {"type": "event", "name": "MedicineCreated", "anonymous": false, "inputs": []}
        ],
        "networks": {
            "5777": {"address": "0x00000000000000000000000000000000000000aa"},
            "1337": {},
            "3": {"address": "0x0000000000000000000000000000000000000000"}
        }
    }"#;

    fn artifact() -> ContractArtifact {
        serde_json::from_str(ARTIFACT).unwrap()
    }

    #[test]
    fn known_network_resolves() {
        let a = artifact();
        assert_eq!(
            a.address_for(ChainId(5777)).unwrap().as_str(),
            "0x00000000000000000000000000000000000000aa"
        );
    }

    #[test]
    fn missing_address_and_zero_address_do_not_resolve() {
        let a = artifact();
        assert!(a.address_for(ChainId(1337)).is_none());
        assert!(a.address_for(ChainId(3)).is_none());
        assert!(a.address_for(ChainId(1)).is_none());
    }

    #[test]
    fn function_signatures_skip_events() {
        let mut sigs = artifact().function_signatures();
        sigs.sort();
        assert_eq!(
            sigs,
            vec!["medicineCount()", "medicines(uint256)", "shipMedicineToHospital(uint256)"]
        );
    }

    #[test]
    fn missing_methods_are_reported() {
        let missing = artifact().missing_methods(ContractKind::SupplyChain);
        assert!(missing.contains(&"buyMedicine(uint256)".to_string()));
        assert!(!missing.contains(&"medicineCount()".to_string()));
    }

    #[test]
    fn changed_return_shapes_are_reported() {
        let changed = artifact().changed_returns(ContractKind::SupplyChain);
        assert_eq!(changed, vec!["medicines(uint256) -> (uint256,string)"]);
    }

    #[test]
    fn declared_outputs_replace_built_in_shape() {
        let mut table = Deployments::new();
        table.insert_artifact(ContractKind::SupplyChain, &artifact());

        let outputs = table.outputs(&MEDICINES).unwrap();
        assert_eq!(outputs.len(), 2);
        let data = abi::encode_params(&[abi::uint(U256::from(7u64)), abi::string("X")]);
        let returned = outputs.decode(&data).unwrap();
        assert_eq!(returned.get("name", 5), Some(&DynSolValue::String("X".into())));

        assert_eq!(table.outputs(&MEDICINE_COUNT).unwrap().canonical(), "(uint256)");
        let empty = Deployments::new();
        assert_eq!(empty.outputs(&MEDICINES).unwrap().len(), MEDICINES.outputs.len());
    }

    #[test]
    fn table_only_holds_real_deployments() {
        let mut table = Deployments::new();
        table.insert_artifact(ContractKind::SupplyChain, &artifact());
        assert!(table.address(ContractKind::SupplyChain, ChainId(5777)).is_some());
        assert!(table.address(ContractKind::SupplyChain, ChainId(3)).is_none());
        assert!(table.address(ContractKind::Register, ChainId(5777)).is_none());
    }

    #[test]
    fn load_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let reg = dir.path().join("Register.json");
        let sc = dir.path().join("SupplyChain.json");
        std::fs::write(&reg, r#"{"contractName":"Register","networks":{"5777":{"address":"0x00000000000000000000000000000000000000bb"}}}"#).unwrap();
        std::fs::write(&sc, ARTIFACT).unwrap();
        let table = Deployments::load(&reg, &sc).unwrap();
        assert!(table.address(ContractKind::Register, ChainId(5777)).is_some());
        assert_eq!(table.outputs(&MEDICINES).unwrap().len(), 2);
    }

    #[test]
    fn unreadable_artifact_is_config_error() {
        let err = ContractArtifact::from_file(Path::new("/nonexistent/SupplyChain.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Artifact { .. }));
    }
}
