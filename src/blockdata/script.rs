//! Output scripts and script-chunk tokens.

use std::fmt;

/// Opcodes needed by the supported output script shapes and push rendering.
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    /// Highest opcode that is itself a push of that many bytes.
    pub const OP_PUSHBYTES_75: u8 = 0x4b;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
}

use self::opcodes::*;

/// The script template an address pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    P2PKH,
    P2SH,
    P2WPKH,
    P2WSH,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ScriptType::P2PKH => "P2PKH",
            ScriptType::P2SH => "P2SH",
            ScriptType::P2WPKH => "P2WPKH",
            ScriptType::P2WSH => "P2WSH",
        })
    }
}

/// Raw locking-script bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == 20
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23 && self.0[0] == OP_HASH160 && self.0[1] == 20 && self.0[22] == OP_EQUAL
    }

    /// `OP_0 <20 bytes>`
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == 20
    }

    /// `OP_0 <32 bytes>`
    pub fn is_p2wsh(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_0 && self.0[1] == 32
    }

    /// Extract the public key hash if this is a P2PKH script.
    pub fn p2pkh_hash(&self) -> Option<[u8; 20]> {
        if self.is_p2pkh() {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&self.0[3..23]);
            Some(hash)
        } else {
            None
        }
    }

    /// Extract the script hash if this is a P2SH script.
    pub fn p2sh_hash(&self) -> Option<[u8; 20]> {
        if self.is_p2sh() {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&self.0[2..22]);
            Some(hash)
        } else {
            None
        }
    }

    /// Extract the witness program if this is a version-0 witness script.
    pub fn witness_program(&self) -> Option<&[u8]> {
        if self.is_p2wpkh() || self.is_p2wsh() {
            Some(&self.0[2..])
        } else {
            None
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// A single parsed script token: an opcode and the bytes it pushes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptChunk {
    pub opcode: u8,
    pub data: Vec<u8>,
}

impl ScriptChunk {
    pub fn new(opcode: u8, data: Vec<u8>) -> Self {
        ScriptChunk { opcode, data }
    }

    /// The minimal push opcode for a push of `length` bytes.
    pub fn opcode_for_length(length: usize) -> u8 {
        if length == 0 {
            OP_0
        } else if length <= usize::from(OP_PUSHBYTES_75) {
            length as u8
        } else if length <= 0xFF {
            OP_PUSHDATA1
        } else if length <= 0xFFFF {
            OP_PUSHDATA2
        } else {
            OP_PUSHDATA4
        }
    }

    pub fn is_push(&self) -> bool {
        self.opcode <= OP_PUSHDATA4
    }
}

impl fmt::Display for ScriptChunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "OP_{:02x}", self.opcode)
        } else {
            f.write_str(&hex::encode(&self.data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_shape_predicates() {
        let mut p2pkh = vec![OP_DUP, OP_HASH160, 20];
        p2pkh.extend_from_slice(&[7u8; 20]);
        p2pkh.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        let script = Script::from_bytes(p2pkh);
        assert!(script.is_p2pkh());
        assert!(!script.is_p2sh());
        assert_eq!(script.p2pkh_hash(), Some([7u8; 20]));
        assert_eq!(script.p2sh_hash(), None);

        let mut p2wsh = vec![OP_0, 32];
        p2wsh.extend_from_slice(&[9u8; 32]);
        let script = Script::from_bytes(p2wsh);
        assert!(script.is_p2wsh());
        assert!(!script.is_p2wpkh());
        assert_eq!(script.witness_program(), Some(&[9u8; 32][..]));
    }

    #[test]
    fn minimal_push_opcodes() {
        assert_eq!(ScriptChunk::opcode_for_length(0), OP_0);
        assert_eq!(ScriptChunk::opcode_for_length(1), 1);
        assert_eq!(ScriptChunk::opcode_for_length(75), OP_PUSHBYTES_75);
        assert_eq!(ScriptChunk::opcode_for_length(76), OP_PUSHDATA1);
        assert_eq!(ScriptChunk::opcode_for_length(255), OP_PUSHDATA1);
        assert_eq!(ScriptChunk::opcode_for_length(256), OP_PUSHDATA2);
        assert_eq!(ScriptChunk::opcode_for_length(65535), OP_PUSHDATA2);
        assert_eq!(ScriptChunk::opcode_for_length(65536), OP_PUSHDATA4);
    }

    #[test]
    fn push_chunks_are_distinguished_from_operators() {
        let push = ScriptChunk::new(ScriptChunk::opcode_for_length(20), vec![3u8; 20]);
        assert!(push.is_push());
        assert!(ScriptChunk::new(OP_0, Vec::new()).is_push());
        assert!(ScriptChunk::new(OP_PUSHDATA4, vec![1u8; 70000]).is_push());
        assert!(!ScriptChunk::new(OP_DUP, Vec::new()).is_push());
        assert!(!ScriptChunk::new(OP_CHECKSIG, Vec::new()).is_push());
    }
}
