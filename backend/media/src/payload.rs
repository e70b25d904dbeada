//! Payload Encoder: decoded frame to `data:<mime>;base64,<...>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use framegrab_core::{DecodedFrame, Payload};

/// Encode a frame as a MIME-tagged base64 data URI.
pub fn encode_payload(frame: &DecodedFrame) -> Payload {
    let encoded = STANDARD.encode(&frame.data);
    Payload {
        format: frame.format,
        data_uri: format!("data:{};base64,{encoded}", frame.format.mime()),
    }
}

/// Split a base64 data URI back into its MIME type and raw bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(data).ok()?;
    Some((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrab_core::ImageFormat;

    #[test]
    fn jpeg_payload_round_trips() {
        let raw: Vec<u8> = (0..=255u8).chain([0xFF, 0xD9]).collect();
        let payload = encode_payload(&DecodedFrame::new(ImageFormat::Jpeg, raw.clone()));
        assert!(payload.as_str().starts_with("data:image/jpeg;base64,"));

        let (mime, bytes) = decode_data_uri(payload.as_str()).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, raw);
    }

    #[test]
    fn png_uses_png_mime() {
        let payload = encode_payload(&DecodedFrame::new(ImageFormat::Png, vec![1, 2, 3]));
        assert_eq!(payload.as_str(), "data:image/png;base64,AQID");
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(decode_data_uri("https://example.com/a.jpg").is_none());
        assert!(decode_data_uri("data:image/jpeg;base64,***").is_none());
    }
}
