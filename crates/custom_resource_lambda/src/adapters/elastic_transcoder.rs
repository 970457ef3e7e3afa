//! Elastic Transcoder pipelines and the custom preset catalog.

use async_trait::async_trait;
use aws_sdk_elastictranscoder::types::{
    AudioCodecOptions, AudioParameters, Notifications, Preset, Thumbnails, VideoParameters,
};
use custom_resource_core::capability::{
    CapabilityError, PipelineCreated, PresetIds, TranscodingPipelines, TranscodingPresets,
};
use custom_resource_core::operation::PipelineSpec;
use custom_resource_core::presets::{
    is_catalog_preset, PresetDefinition, VideoRendition, PRESET_CATALOG,
};
use tracing::info;

use super::service_error;

const CUSTOM_PRESET_TYPE: &str = "Custom";
const KEYFRAME_INTERVAL_FRAMES: &str = "90";

pub struct EtsPipelines {
    client: aws_sdk_elastictranscoder::Client,
}

impl EtsPipelines {
    pub fn new(client: aws_sdk_elastictranscoder::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscodingPipelines for EtsPipelines {
    async fn create(&self, spec: &PipelineSpec) -> Result<PipelineCreated, CapabilityError> {
        let output = self
            .client
            .create_pipeline()
            .name(&spec.name)
            .role(&spec.role)
            .input_bucket(&spec.input_bucket)
            .output_bucket(&spec.output_bucket)
            .set_notifications(spec.sns_topic.as_deref().map(pipeline_notifications))
            .send()
            .await
            .map_err(|error| service_error("failed to create pipeline", error))?;

        let id = output
            .pipeline()
            .and_then(|pipeline| pipeline.id())
            .ok_or_else(|| CapabilityError::new("Elastic Transcoder returned no pipeline id"))?;

        Ok(PipelineCreated { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<(), CapabilityError> {
        self.client
            .delete_pipeline()
            .id(id)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| service_error("failed to delete pipeline", error))
    }
}

fn pipeline_notifications(topic: &str) -> Notifications {
    Notifications::builder()
        .progressing(topic)
        .completed(topic)
        .warning(topic)
        .error(topic)
        .build()
}

pub struct EtsPresets {
    client: aws_sdk_elastictranscoder::Client,
}

impl EtsPresets {
    pub fn new(client: aws_sdk_elastictranscoder::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscodingPresets for EtsPresets {
    async fn create(&self, scope: &str) -> Result<PresetIds, CapabilityError> {
        let mut ids = PresetIds::new();

        for definition in PRESET_CATALOG.iter() {
            let output = self
                .client
                .create_preset()
                .name(definition.name)
                .description(scoped_description(definition, scope))
                .container(definition.container.as_str())
                .set_video(definition.video.as_ref().map(video_parameters))
                .set_thumbnails(definition.video.as_ref().map(|_| thumbnails()))
                .set_audio(audio_parameters(definition))
                .send()
                .await
                .map_err(|error| {
                    service_error(&format!("failed to create preset {}", definition.name), error)
                })?;

            let id = output
                .preset()
                .and_then(|preset| preset.id())
                .ok_or_else(|| {
                    CapabilityError::new(format!("no id returned for preset {}", definition.name))
                })?;
            ids.insert(definition.name.to_string(), id.to_string());
        }

        info!(
            component = "ets_presets",
            event = "presets_created",
            scope,
            count = ids.len()
        );
        Ok(ids)
    }

    async fn delete(&self, scope: &str) -> Result<(), CapabilityError> {
        let mut doomed = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_presets()
                .set_page_token(page_token.take())
                .send()
                .await
                .map_err(|error| service_error("failed to list presets", error))?;

            doomed.extend(catalog_preset_ids(output.presets(), scope));

            match output.next_page_token() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        for id in &doomed {
            self.client
                .delete_preset()
                .id(id)
                .send()
                .await
                .map_err(|error| service_error(&format!("failed to delete preset {id}"), error))?;
        }

        info!(
            component = "ets_presets",
            event = "presets_deleted",
            scope,
            count = doomed.len()
        );
        Ok(())
    }
}

fn scope_marker(scope: &str) -> String {
    format!("[stack {scope}]")
}

fn scoped_description(definition: &PresetDefinition, scope: &str) -> String {
    format!("{} {}", definition.description, scope_marker(scope))
}

/// Ids of the custom catalog presets created under `scope`. System presets and
/// presets belonging to other stacks are never touched.
pub fn catalog_preset_ids(presets: &[Preset], scope: &str) -> Vec<String> {
    let marker = scope_marker(scope);
    presets
        .iter()
        .filter(|preset| preset.r#type() == Some(CUSTOM_PRESET_TYPE))
        .filter(|preset| preset.name().is_some_and(is_catalog_preset))
        .filter(|preset| {
            preset
                .description()
                .is_some_and(|description| description.ends_with(&marker))
        })
        .filter_map(|preset| preset.id().map(str::to_string))
        .collect()
}

fn video_parameters(rendition: &VideoRendition) -> VideoParameters {
    VideoParameters::builder()
        .codec("H.264")
        .codec_options("Profile", rendition.profile)
        .codec_options("Level", rendition.level)
        .codec_options("MaxReferenceFrames", "3")
        .codec_options("InterlacedMode", "Progressive")
        .codec_options("ColorSpaceConversionMode", "None")
        .keyframes_max_dist(KEYFRAME_INTERVAL_FRAMES)
        .fixed_gop("true")
        .bit_rate(rendition.bit_rate_kbps.to_string())
        .frame_rate("auto")
        .max_width(rendition.width.to_string())
        .max_height(rendition.height.to_string())
        .display_aspect_ratio("auto")
        .sizing_policy("ShrinkToFit")
        .padding_policy("NoPad")
        .build()
}

fn audio_parameters(definition: &PresetDefinition) -> Option<AudioParameters> {
    if !definition.has_audio() {
        return None;
    }

    Some(
        AudioParameters::builder()
            .codec("AAC")
            .codec_options(AudioCodecOptions::builder().profile("AAC-LC").build())
            .sample_rate("44100")
            .bit_rate(definition.audio_bit_rate_kbps.to_string())
            .channels("2")
            .build(),
    )
}

fn thumbnails() -> Thumbnails {
    Thumbnails::builder()
        .format("png")
        .interval("60")
        .max_width("192")
        .max_height("108")
        .sizing_policy("ShrinkToFit")
        .padding_policy("NoPad")
        .build()
}
