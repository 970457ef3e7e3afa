//! Custom transcoding presets registered for MP4, HLS and DASH outputs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Ts,
    Fmp4,
}

impl Container {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Ts => "ts",
            Self::Fmp4 => "fmp4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoRendition {
    pub width: u32,
    pub height: u32,
    pub bit_rate_kbps: u32,
    pub profile: &'static str,
    pub level: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub container: Container,
    pub video: Option<VideoRendition>,
    pub audio_bit_rate_kbps: u32,
}

const fn video(
    width: u32,
    height: u32,
    bit_rate_kbps: u32,
    profile: &'static str,
    level: &'static str,
) -> Option<VideoRendition> {
    Some(VideoRendition {
        width,
        height,
        bit_rate_kbps,
        profile,
        level,
    })
}

/// H.264 levels Elastic Transcoder accepts in `CodecOptions.Level`.
pub const H264_LEVELS: [&str; 13] = [
    "1", "1b", "1.1", "1.2", "1.3", "2", "2.1", "2.2", "3", "3.1", "3.2", "4", "4.1",
];

pub const PRESET_CATALOG: [PresetDefinition; 13] = [
    PresetDefinition {
        name: "Mp4_1080p",
        description: "MP4 1920x1080 progressive download",
        container: Container::Mp4,
        video: video(1920, 1080, 8500, "high", "4.1"),
        audio_bit_rate_kbps: 160,
    },
    PresetDefinition {
        name: "Mp4_720p",
        description: "MP4 1280x720 progressive download",
        container: Container::Mp4,
        video: video(1280, 720, 5000, "main", "3.1"),
        audio_bit_rate_kbps: 160,
    },
    PresetDefinition {
        name: "Hls_1080p",
        description: "HLS 1920x1080 rendition",
        container: Container::Ts,
        video: video(1920, 1080, 6500, "high", "4.1"),
        audio_bit_rate_kbps: 128,
    },
    PresetDefinition {
        name: "Hls_720p",
        description: "HLS 1280x720 rendition",
        container: Container::Ts,
        video: video(1280, 720, 4500, "main", "3.1"),
        audio_bit_rate_kbps: 128,
    },
    PresetDefinition {
        name: "Hls_540p",
        description: "HLS 960x540 rendition",
        container: Container::Ts,
        video: video(960, 540, 2500, "main", "3.1"),
        audio_bit_rate_kbps: 96,
    },
    PresetDefinition {
        name: "Hls_360p",
        description: "HLS 640x360 rendition",
        container: Container::Ts,
        video: video(640, 360, 1200, "main", "3"),
        audio_bit_rate_kbps: 96,
    },
    PresetDefinition {
        name: "Hls_270p",
        description: "HLS 480x270 rendition",
        container: Container::Ts,
        video: video(480, 270, 600, "baseline", "3"),
        audio_bit_rate_kbps: 64,
    },
    PresetDefinition {
        name: "Dash_1080p",
        description: "DASH 1920x1080 video track",
        container: Container::Fmp4,
        video: video(1920, 1080, 6500, "high", "4.1"),
        audio_bit_rate_kbps: 0,
    },
    PresetDefinition {
        name: "Dash_720p",
        description: "DASH 1280x720 video track",
        container: Container::Fmp4,
        video: video(1280, 720, 4500, "main", "3.1"),
        audio_bit_rate_kbps: 0,
    },
    PresetDefinition {
        name: "Dash_540p",
        description: "DASH 960x540 video track",
        container: Container::Fmp4,
        video: video(960, 540, 2500, "main", "3.1"),
        audio_bit_rate_kbps: 0,
    },
    PresetDefinition {
        name: "Dash_360p",
        description: "DASH 640x360 video track",
        container: Container::Fmp4,
        video: video(640, 360, 1200, "main", "3"),
        audio_bit_rate_kbps: 0,
    },
    PresetDefinition {
        name: "Dash_270p",
        description: "DASH 480x270 video track",
        container: Container::Fmp4,
        video: video(480, 270, 600, "baseline", "3"),
        audio_bit_rate_kbps: 0,
    },
    PresetDefinition {
        name: "Dash_Audio",
        description: "DASH 128k AAC audio track",
        container: Container::Fmp4,
        video: None,
        audio_bit_rate_kbps: 128,
    },
];

impl PresetDefinition {
    /// DASH video tracks carry no audio; the audio-only entry carries no video.
    pub fn has_audio(&self) -> bool {
        self.audio_bit_rate_kbps > 0
    }
}

pub fn is_catalog_preset(name: &str) -> bool {
    PRESET_CATALOG.iter().any(|preset| preset.name == name)
}
