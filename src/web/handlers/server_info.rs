//! `GET /server-info` (spec.md SS4.F, SS6).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use plist::{Dictionary, Value};

use crate::web::responses::xml_plist_response;
use crate::web::AppState;

/// Feature bits (LSB first): 0 video, 1 photo, 2 FairPlay, 3 volume, 4 HLS,
/// 5 slideshow, 6 reserved, 9 audio. `0x7F | 0x200 == 0x27F`.
const FEATURES: u64 = 0x27F;

pub async fn server_info(State(state): State<AppState>) -> Response {
    let device = &state.config.device;

    let mut dict = Dictionary::new();
    dict.insert("features".to_string(), Value::Integer(FEATURES.into()));
    dict.insert(
        "macAddress".to_string(),
        Value::String(device.mac_address.clone()),
    );
    dict.insert("model".to_string(), Value::String(device.model.clone()));
    dict.insert(
        "osBuildVersion".to_string(),
        Value::String("12B435".to_string()),
    );
    dict.insert("protovers".to_string(), Value::String("1.0".to_string()));
    dict.insert(
        "srcvers".to_string(),
        Value::String(device.source_version.clone()),
    );
    dict.insert("vv".to_string(), Value::String(device.vv.clone()));
    dict.insert(
        "deviceid".to_string(),
        Value::String(device.mac_address.clone()),
    );

    xml_plist_response(StatusCode::OK, Value::Dictionary(dict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_bits_match_spec() {
        assert_eq!(FEATURES, 0x27F);
        assert_eq!(FEATURES & 0b0111_1111, 0b0111_1111); // bits 0-6
        assert_eq!(FEATURES & (1 << 9), 1 << 9); // bit 9
    }
}
