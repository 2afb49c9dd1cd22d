//! Address variants, rendering and the string-resolution algorithm.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::{error, result};

use crate::blockdata::script::{opcodes, Script, ScriptType};
use crate::chain::Network;
use crate::encoding::{base58, bech32};
use crate::errors::{Error, ErrorKind, Result};

/// An address, identified by its script template and the fixed-length hash
/// or witness program it carries.
///
/// Instances come from decoding a trusted-checksum string or from explicit
/// construction with a known-valid hash; there is no constructor taking an
/// unvalidated string other than the resolver.
#[derive(Debug, Clone, Copy)]
pub enum Address {
    P2PKH([u8; 20]),
    P2SH([u8; 20]),
    P2WPKH([u8; 20]),
    P2WSH([u8; 32]),
}

/// Decode failures from either encoding path, retained as the cause of the
/// resolver's "invalid address" error.
#[derive(Debug)]
enum DecodeFailure {
    Base58(base58::Error),
    Bech32(bech32::Error),
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeFailure::Base58(ref e) => write!(f, "{}", e),
            DecodeFailure::Bech32(ref e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            DecodeFailure::Base58(ref e) => Some(e),
            DecodeFailure::Bech32(ref e) => Some(e),
        }
    }
}

impl Address {
    pub fn script_type(&self) -> ScriptType {
        match *self {
            Address::P2PKH(_) => ScriptType::P2PKH,
            Address::P2SH(_) => ScriptType::P2SH,
            Address::P2WPKH(_) => ScriptType::P2WPKH,
            Address::P2WSH(_) => ScriptType::P2WSH,
        }
    }

    /// The hash or witness program carried by this address.
    pub fn hash(&self) -> &[u8] {
        match *self {
            Address::P2PKH(ref hash) | Address::P2SH(ref hash) | Address::P2WPKH(ref hash) => {
                hash
            }
            Address::P2WSH(ref program) => program,
        }
    }

    /// The base58 version byte for legacy variants, or the witness version
    /// (always 0 here) for segwit variants.
    pub fn version(&self, network: Network) -> u8 {
        match *self {
            Address::P2PKH(_) => network.params().p2pkh_version,
            Address::P2SH(_) => network.params().p2sh_version,
            Address::P2WPKH(_) | Address::P2WSH(_) => 0,
        }
    }

    /// Renders this address for the given network.
    pub fn to_string_with(&self, network: Network) -> String {
        match *self {
            Address::P2PKH(_) | Address::P2SH(_) => {
                base58::encode_check(self.version(network), self.hash())
            }
            Address::P2WPKH(_) | Address::P2WSH(_) => {
                let mut data = vec![0u8]; // witness version group
                data.extend(
                    bech32::convert_bits(self.hash(), 8, 5, true)
                        .expect("8-bit input groups are always in range"),
                );
                bech32::encode(network.params().bech32_hrp, &data)
                    .expect("fixed program lengths stay within the length cap")
            }
        }
    }

    /// The locking script paying to this address.
    pub fn output_script(&self) -> Script {
        let mut script = Vec::with_capacity(self.hash().len() + 5);
        match *self {
            Address::P2PKH(ref hash) => {
                script.extend_from_slice(&[opcodes::OP_DUP, opcodes::OP_HASH160, 20]);
                script.extend_from_slice(hash);
                script.extend_from_slice(&[opcodes::OP_EQUALVERIFY, opcodes::OP_CHECKSIG]);
            }
            Address::P2SH(ref hash) => {
                script.extend_from_slice(&[opcodes::OP_HASH160, 20]);
                script.extend_from_slice(hash);
                script.push(opcodes::OP_EQUAL);
            }
            Address::P2WPKH(ref program) => {
                script.extend_from_slice(&[opcodes::OP_0, 20]);
                script.extend_from_slice(program);
            }
            Address::P2WSH(ref program) => {
                script.extend_from_slice(&[opcodes::OP_0, 32]);
                script.extend_from_slice(program);
            }
        }
        Script::from_bytes(script)
    }

    /// The raw data pushed by the output script, for script builders.
    pub fn output_script_data(&self) -> &[u8] {
        self.hash()
    }

    pub fn output_script_data_type(&self) -> &'static str {
        match *self {
            Address::P2PKH(_) => "Public Key Hash",
            Address::P2SH(_) => "Script Hash",
            Address::P2WPKH(_) => "Witness Public Key Hash",
            Address::P2WSH(_) => "Witness Script Hash",
        }
    }

    /// Recognizes the four supported output script shapes.
    pub fn from_output_script(script: &Script) -> Option<Address> {
        if let Some(hash) = script.p2pkh_hash() {
            return Some(Address::P2PKH(hash));
        }
        if let Some(hash) = script.p2sh_hash() {
            return Some(Address::P2SH(hash));
        }
        if let Some(program) = script.witness_program() {
            if program.len() == 20 {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(program);
                return Some(Address::P2WPKH(hash));
            }
            if program.len() == 32 {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(program);
                return Some(Address::P2WSH(hash));
            }
        }
        None
    }

    /// Resolves an address string against one network.
    ///
    /// Both encoding paths are gated by a cheap prefix/HRP check before any
    /// checksum work. A string that decodes but does not correspond to a
    /// known variant on this network (wrong version byte, wrong HRP, wrong
    /// program length, witness version above 0) simply fails to match; only
    /// a codec-level failure is kept as the cause of the final error.
    pub fn from_string(network: Network, address: &str) -> Result<Address> {
        let params = network.params();
        let mut nested: Option<DecodeFailure> = None;

        if network.has_p2pkh_prefix(address) || network.has_p2sh_prefix(address) {
            match base58::decode_check(address) {
                Ok(decoded) => {
                    if decoded.len() == 21 {
                        let version = decoded[0];
                        let mut hash = [0u8; 20];
                        hash.copy_from_slice(&decoded[1..21]);
                        if version == params.p2pkh_version {
                            return Ok(Address::P2PKH(hash));
                        }
                        if version == params.p2sh_version {
                            return Ok(Address::P2SH(hash));
                        }
                    }
                }
                Err(e) => nested = Some(DecodeFailure::Base58(e)),
            }
        }

        if address.to_lowercase().starts_with(params.bech32_hrp) {
            match bech32::decode(address) {
                Ok(decoded) => {
                    if decoded.hrp == params.bech32_hrp {
                        if let Some((&witness_version, program)) = decoded.data.split_first() {
                            if witness_version == 0 {
                                match bech32::convert_bits(program, 5, 8, false) {
                                    Ok(program) => {
                                        if program.len() == 20 {
                                            let mut hash = [0u8; 20];
                                            hash.copy_from_slice(&program);
                                            return Ok(Address::P2WPKH(hash));
                                        }
                                        if program.len() == 32 {
                                            let mut hash = [0u8; 32];
                                            hash.copy_from_slice(&program);
                                            return Ok(Address::P2WSH(hash));
                                        }
                                    }
                                    Err(e) => nested = Some(DecodeFailure::Bech32(e)),
                                }
                            }
                        }
                    }
                }
                Err(e) => nested = Some(DecodeFailure::Bech32(e)),
            }
        }

        match nested {
            Some(cause) => Err(Error::with_chain(
                cause,
                ErrorKind::InvalidAddress(address.to_string()),
            )),
            None => Err(ErrorKind::InvalidAddress(address.to_string()).into()),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Resolves against the configured network first; if that fails, scans
    /// the other known networks and reports the first one that accepts the
    /// string as a distinguished cross-network error. Otherwise the original
    /// failure is returned.
    fn from_str(address: &str) -> Result<Address> {
        let configured = Network::get();
        match Address::from_string(configured, address) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                for &network in Network::VARIANTS.iter() {
                    if network == configured {
                        continue;
                    }
                    if Address::from_string(network, address).is_ok() {
                        debug!(
                            "address {} belongs to {}, configured network is {}",
                            address, network, configured
                        );
                        return Err(ErrorKind::WrongNetworkAddress(
                            address.to_string(),
                            network,
                            configured,
                        )
                        .into());
                    }
                }
                Err(e)
            }
        }
    }
}

/// Renders on the currently configured network.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_string_with(Network::get()))
    }
}

/// Equality follows the rendered string on the currently configured network,
/// so two addresses are equal exactly when a user would see the same string.
/// Hold the network fixed while comparing.
impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state)
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> result::Result<Address, D::Error> {
        use serde::de::Error as _;
        use serde::Deserialize as _;
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
