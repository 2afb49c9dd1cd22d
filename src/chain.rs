use std::fmt;
use std::sync::RwLock;

/// Address version bytes, address string prefixes and bech32 HRP for one
/// network variant, plus the extended-key headers and default peer port
/// consumed by out-of-scope collaborators.
pub struct NetworkParams {
    pub p2pkh_version: u8,
    /// Valid leading characters of a base58 P2PKH address string.
    pub p2pkh_prefixes: &'static str,
    pub p2sh_version: u8,
    pub p2sh_prefix: &'static str,
    pub bech32_hrp: &'static str,
    pub xprv_header: u32,
    pub xpub_header: u32,
    pub default_port: u16,
}

pub const MAINNET_PARAMS: NetworkParams = NetworkParams {
    p2pkh_version: 36,
    p2pkh_prefixes: "F",
    p2sh_version: 5,
    p2sh_prefix: "3",
    bech32_hrp: "grs",
    xprv_header: 0x0488_ade4,
    xpub_header: 0x0488_b21e,
    default_port: 1331,
};

pub const TESTNET_PARAMS: NetworkParams = NetworkParams {
    p2pkh_version: 111,
    p2pkh_prefixes: "mn",
    p2sh_version: 196,
    p2sh_prefix: "2",
    bech32_hrp: "tgrs",
    xprv_header: 0x0435_8394,
    xpub_header: 0x0435_87cf,
    default_port: 17777,
};

pub const REGTEST_PARAMS: NetworkParams = NetworkParams {
    p2pkh_version: 111,
    p2pkh_prefixes: "mn",
    p2sh_version: 239,
    p2sh_prefix: "2",
    bech32_hrp: "grsrt",
    xprv_header: 0x0435_8394,
    xpub_header: 0x0435_87cf,
    default_port: 18888,
};

#[derive(Debug, Copy, Clone, PartialEq, Hash, Serialize, Ord, PartialOrd, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

lazy_static! {
    static ref CURRENT_NETWORK: RwLock<Option<Network>> = RwLock::new(None);
}

impl Network {
    /// All known network variants, in resolution order.
    pub const VARIANTS: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Regtest];

    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    pub fn names() -> Vec<String> {
        Network::VARIANTS.iter().map(|n| n.name().to_string()).collect()
    }

    pub fn is_regtest(self) -> bool {
        match self {
            Network::Regtest => true,
            _ => false,
        }
    }

    pub fn params(self) -> &'static NetworkParams {
        match self {
            Network::Mainnet => &MAINNET_PARAMS,
            Network::Testnet => &TESTNET_PARAMS,
            Network::Regtest => &REGTEST_PARAMS,
        }
    }

    /// Whether `address` starts with one of this network's base58 P2PKH
    /// leading characters. A cheap pre-filter, not a validity check.
    pub fn has_p2pkh_prefix(self, address: &str) -> bool {
        self.params()
            .p2pkh_prefixes
            .chars()
            .any(|prefix| address.starts_with(prefix))
    }

    pub fn has_p2sh_prefix(self, address: &str) -> bool {
        address.starts_with(self.params().p2sh_prefix)
    }

    /// Returns the currently configured network, defaulting to mainnet.
    ///
    /// The first call fixes the default, so a later `set` to a different
    /// network is rejected just as if `set` had been called first.
    pub fn get() -> Network {
        if let Some(network) = *CURRENT_NETWORK.read().expect("network lock poisoned") {
            return network;
        }
        let mut current = CURRENT_NETWORK.write().expect("network lock poisoned");
        *current.get_or_insert(Network::Mainnet)
    }

    /// Fixes the process-wide network. The first assignment wins; assigning a
    /// different network afterwards is a configuration bug and panics.
    /// Test builds may reassign freely so independent cases can cover
    /// multiple networks.
    pub fn set(network: Network) {
        let mut current = CURRENT_NETWORK.write().expect("network lock poisoned");
        if let Some(existing) = *current {
            if existing != network && !cfg!(test) {
                panic!("network already set to {}", existing);
            }
        }
        *current = Some(network);
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Network {
    fn from(network_name: &str) -> Self {
        match network_name {
            "mainnet" => Network::Mainnet,
            "testnet" => Network::Testnet,
            "regtest" => Network::Regtest,
            _ => panic!("unsupported network: {:?}", network_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_params() {
        assert_eq!(Network::Mainnet.params().p2pkh_version, 36);
        assert_eq!(Network::Mainnet.params().p2sh_version, 5);
        assert_eq!(Network::Mainnet.params().bech32_hrp, "grs");
        assert_eq!(Network::Mainnet.params().default_port, 1331);
        assert_eq!(Network::Testnet.params().p2sh_version, 196);
        assert_eq!(Network::Regtest.params().p2sh_version, 239);
        // testnet and regtest share the p2pkh version byte
        assert_eq!(
            Network::Testnet.params().p2pkh_version,
            Network::Regtest.params().p2pkh_version
        );
        assert_eq!(Network::Mainnet.params().xpub_header, 0x0488_b21e);
    }

    #[test]
    fn p2pkh_prefix_matches_any_configured_character() {
        assert!(Network::Mainnet.has_p2pkh_prefix("FVAiSujNZVgYSc27t6zUTWoKfAGxc8CEW5"));
        assert!(!Network::Mainnet.has_p2pkh_prefix("mfcHP2WMCVLsVZA8yrovmhMgxNFW9r98xw"));
        assert!(Network::Testnet.has_p2pkh_prefix("mfcHP2WMCVLsVZA8yrovmhMgxNFW9r98xw"));
        assert!(Network::Testnet.has_p2pkh_prefix("n3GNqMveyvaPvUbH469vcRa6Bfdc7q4gpn"));
        assert!(Network::Testnet.has_p2sh_prefix("2MsLZ5FqqYpjM1Q1W4X81zMVZTF9gdbhVwd"));
    }

    #[test]
    fn network_names_round_trip() {
        for network in Network::VARIANTS.iter() {
            assert_eq!(Network::from(network.name()), *network);
        }
        assert_eq!(Network::names(), vec!["mainnet", "testnet", "regtest"]);
    }

    #[test]
    #[should_panic(expected = "unsupported network")]
    fn unknown_network_name_panics() {
        let _ = Network::from("signet");
    }

    #[test]
    fn current_network_defaults_to_mainnet() {
        assert_eq!(Network::get(), Network::Mainnet);
        // re-setting to the same value is always allowed
        Network::set(Network::Mainnet);
        assert_eq!(Network::get(), Network::Mainnet);
    }
}
