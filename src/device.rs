//! Audio output device adapter
//!
//! Thin boundary around cpal: pick an output device, open an interleaved
//! stereo s16 stream, and hand each callback straight to the engine's
//! render path. The callback owns the output ring's consumer half;
//! everything else stateful lives in the engine, and the adapter only
//! keeps the stream alive.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use serde::{Deserialize, Serialize};

use crate::config::AudioConfig;
use crate::engine::EngineShared;
use crate::ring::RingConsumer;

/// Lifecycle of the output device, readable from telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DeviceState {
    Uninit = 0,
    Stopped = 1,
    Started = 2,
    Starting = 3,
    Stopping = 4,
}

impl DeviceState {
    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            1 => DeviceState::Stopped,
            2 => DeviceState::Started,
            3 => DeviceState::Starting,
            4 => DeviceState::Stopping,
            _ => DeviceState::Uninit,
        }
    }
}

/// An open, playing output stream feeding from the engine.
pub struct OutputDevice {
    _stream: cpal::Stream,
    device_name: String,
}

impl OutputDevice {
    /// Select an output device (by name, or the host default), open the
    /// stream and start pulling frames from the engine.
    ///
    /// The callback stays allocation- and lock-free: it only drains
    /// `output_reader` through [`EngineShared::render_frames`].
    pub(crate) fn open(
        shared: Arc<EngineShared>,
        config: &AudioConfig,
        device_name: Option<&str>,
        mut output_reader: RingConsumer,
    ) -> Result<Self, String> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| format!("output device enumeration failed: {}", e))?
                .find(|candidate| candidate.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| format!("output device '{}' is not present", wanted))?,
            None => host
                .default_output_device()
                .ok_or_else(|| "host has no default output device".to_string())?,
        };
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate as u32),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        log::info!(
            "Opening output stream on '{}': {} Hz, {} channels, {} frames",
            name,
            config.sample_rate,
            config.channels,
            config.buffer_size
        );

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    shared.render_frames(&mut output_reader, data);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| format!("output stream setup failed: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("output stream start failed: {}", e))?;

        Ok(Self {
            _stream: stream,
            device_name: name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for OutputDevice {
    fn drop(&mut self) {
        log::info!("Output stream closed: {}", self.device_name);
    }
}
