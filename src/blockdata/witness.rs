//! Segregated-witness stack data and its canonical serialization.

use std::cmp;
use std::fmt;
use std::io;

use crate::blockdata::script::ScriptChunk;
use crate::consensus::encode::{Decodable, Encodable, Error, VarInt};

/// Cap on the capacity pre-allocated from a caller-supplied (possibly
/// attacker-controlled) push count.
const MAX_INITIAL_PUSHES: usize = 20;

/// An ordered stack of witness pushes.
///
/// Every index up to the highest one ever assigned holds a byte string,
/// possibly empty; assigning past the end fills the gap with empty pushes.
/// The serialized form is `VarInt(count)` followed by each push as
/// `VarInt(len) || bytes`, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TransactionWitness {
    pushes: Vec<Vec<u8>>,
}

impl TransactionWitness {
    /// Creates an empty witness sized for `push_count` pushes. The hint only
    /// affects pre-allocation and is capped.
    pub fn new(push_count: usize) -> Self {
        TransactionWitness {
            pushes: Vec::with_capacity(cmp::min(push_count, MAX_INITIAL_PUSHES)),
        }
    }

    /// Read-only view of the pushes in index order.
    pub fn get_pushes(&self) -> &[Vec<u8>] {
        &self.pushes
    }

    pub fn push_count(&self) -> usize {
        self.pushes.len()
    }

    /// Appends a push at the end of the stack.
    pub fn push(&mut self, value: Vec<u8>) {
        self.pushes.push(value);
    }

    /// Grows the stack with empty pushes until it holds at least `count`
    /// elements. Never shrinks.
    pub fn ensure_push_count(&mut self, count: usize) {
        while self.pushes.len() < count {
            self.pushes.push(Vec::new());
        }
    }

    /// Assigns the push at `index`, creating intervening empty pushes if the
    /// stack is currently shorter.
    pub fn set_push(&mut self, index: usize, value: Vec<u8>) {
        self.ensure_push_count(index + 1);
        self.pushes[index] = value;
    }

    /// The exact serialized byte length, without encoding.
    pub fn serialized_length(&self) -> usize {
        let mut length = VarInt(self.pushes.len() as u64).len();
        for push in &self.pushes {
            length += VarInt(push.len() as u64).len() + push.len();
        }
        length
    }

    /// Projects each push into a script-chunk token carrying the minimal push
    /// opcode for its length, for rendering a witness as if it were a script.
    /// Not suitable for execution.
    pub fn as_script_chunks(&self) -> Vec<ScriptChunk> {
        self.pushes
            .iter()
            .map(|push| ScriptChunk::new(ScriptChunk::opcode_for_length(push.len()), push.clone()))
            .collect()
    }
}

impl fmt::Display for TransactionWitness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, push) in self.pushes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if push.is_empty() {
                f.write_str("EMPTY")?;
            } else {
                f.write_str(&hex::encode(push))?;
            }
        }
        Ok(())
    }
}

impl Encodable for TransactionWitness {
    fn consensus_encode<W: io::Write>(&self, mut writer: W) -> Result<usize, io::Error> {
        let mut len = VarInt(self.pushes.len() as u64).consensus_encode(&mut writer)?;
        for push in &self.pushes {
            len += push.consensus_encode(&mut writer)?;
        }
        Ok(len)
    }
}

impl Decodable for TransactionWitness {
    fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, Error> {
        let count = VarInt::consensus_decode(&mut reader)?.0 as usize;
        let mut witness = TransactionWitness::new(count);
        for _ in 0..count {
            witness.push(Vec::<u8>::consensus_decode(&mut reader)?);
        }
        Ok(witness)
    }
}
