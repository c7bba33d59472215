//! Bluetooth profile inference from sample rate and channel count.
//!
//! A2DP (high quality) runs 2 channels at 44.1 or 48 kHz and is reported as AAC.
//! HFP/SCO (call mode) runs 1 channel at 8 or 16 kHz.

use crate::models::device::DeviceSnapshot;
use crate::models::quality::{CodecInfo, QualityState};

/// Highest sample rate still treated as a voice link.
pub const CALL_MODE_MAX_SAMPLE_RATE: f64 = 16_000.0;

/// Result of classifying a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub state: QualityState,
    /// Present only for Bluetooth devices.
    pub codec: Option<CodecInfo>,
}

/// Classify the default output device.
///
/// Non-Bluetooth devices are `Disconnected` with no codec info. Pure: the
/// same snapshot always yields the same result.
pub fn classify(device: &DeviceSnapshot) -> Classification {
    if !device.is_bluetooth() {
        return Classification {
            state: QualityState::Disconnected,
            codec: None,
        };
    }

    let rate = device.nominal_sample_rate.unwrap_or(0.0);
    let channels = device.output_channels;
    let known_rate = rate > 0.0;

    let (state, profile, codec) = if channels <= 1 || rate <= CALL_MODE_MAX_SAMPLE_RATE {
        (QualityState::CallMode, "HFP", if known_rate { "SCO" } else { "Unknown" })
    } else {
        (QualityState::HighQuality, "A2DP", if known_rate { "AAC" } else { "Unknown" })
    };

    let sample_rate_display = match device.nominal_sample_rate {
        Some(rate) => format!("{:.1} kHz", rate / 1000.0),
        None => "— kHz".to_string(),
    };
    let channel_display = if channels >= 2 { "Stereo" } else { "Mono" };

    let summary = format!("{} · {} · {}", codec, sample_rate_display, channel_display);

    Classification {
        state,
        codec: Some(CodecInfo {
            codec_name: codec.to_string(),
            profile_name: profile.to_string(),
            sample_rate_display,
            channel_display: channel_display.to_string(),
            is_high_quality: state == QualityState::HighQuality,
            summary,
        }),
    }
}
