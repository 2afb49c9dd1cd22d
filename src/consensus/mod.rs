pub mod encode;

pub use self::encode::{deserialize, deserialize_partial, serialize, serialize_hex};
pub use self::encode::{Decodable, Encodable};
