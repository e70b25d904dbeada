pub mod decoder;
pub mod mime_detect;
pub mod payload;

pub use decoder::{decode_first_frame, FfmpegDecoder};
pub use mime_detect::{detect_mime_type, sniff_image_format};
pub use payload::{decode_data_uri, encode_payload};
