pub mod error;
pub mod traits;
pub mod types;

pub use error::{AttemptResult, DecodeError, ExtractError};
pub use traits::{ByteStream, FrameDecoder, RangeResponse, RemoteSource};
pub use types::{
    DecodedFrame, FetchWindow, ImageFormat, Payload, RemoteAsset, WindowPair, MIB,
};
