#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod address;
pub mod blockdata;
pub mod chain;
pub mod consensus;
pub mod encoding;
pub mod errors;

pub use crate::address::Address;
pub use crate::blockdata::script::{Script, ScriptChunk, ScriptType};
pub use crate::blockdata::witness::TransactionWitness;
pub use crate::chain::Network;
pub use crate::consensus::encode::{
    deserialize, deserialize_partial, serialize, serialize_hex, Decodable, Encodable, VarInt,
};
