pub mod cipher;
pub mod errors;

pub use cipher::CipherKeys;
pub use cipher::TokenCodec;
pub use errors::CodecError;
