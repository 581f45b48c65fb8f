use crate::synth::SynthState;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use cubesynth_core::{db_to_gain, AudioEngine, AudioError, Note};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// [`AudioEngine`] over the default cpal output device.
///
/// The stream is opened on the first `resume`; until then every trigger
/// reports `Unavailable`.
#[derive(Default)]
pub struct CpalEngine {
    synth: Option<Arc<Mutex<SynthState>>>,
    stream: Option<cpal::Stream>,
    master_gain: Option<f32>,
}

impl CpalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn synth(&self) -> Result<MutexGuard<'_, SynthState>, AudioError> {
        let synth = self.synth.as_ref().ok_or(AudioError::Unavailable)?;
        synth
            .lock()
            .map_err(|_| AudioError::Backend("synth state poisoned".into()))
    }

    fn open(&mut self) -> Result<(), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Backend("no output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Backend(e.to_string()))?;
        let channels = config.channels() as usize;
        let mut state = SynthState::new(config.sample_rate().0 as f32);
        if let Some(gain) = self.master_gain {
            state.set_master(gain);
        }
        let synth = Arc::new(Mutex::new(state));

        let stream_config: cpal::StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, channels, synth.clone())
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, channels, synth.clone())
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, channels, synth.clone())
            }
            other => {
                return Err(AudioError::Backend(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }
        .map_err(|e| AudioError::Backend(e.to_string()))?;
        log::info!(
            "[audio] output {} Hz, {} channel(s), {:?}",
            stream_config.sample_rate.0,
            channels,
            config.sample_format()
        );
        self.synth = Some(synth);
        self.stream = Some(stream);
        Ok(())
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    synth: Arc<Mutex<SynthState>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    let err_fn = |err| log::error!("[audio] stream error: {err}");
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut synth) = synth.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let v = T::from_sample(synth.next_sample());
                frame.fill(v);
            }
        },
        err_fn,
        None,
    )
}

impl AudioEngine for CpalEngine {
    fn resume(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            self.open()?;
        }
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| AudioError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), AudioError> {
        if let Ok(mut synth) = self.synth() {
            synth.clear();
        }
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
        self.synth = None;
        Ok(())
    }

    fn set_volume(&mut self, volume_db: f32) -> Result<(), AudioError> {
        let gain = db_to_gain(volume_db);
        self.master_gain = Some(gain);
        match self.synth() {
            Ok(mut synth) => {
                synth.set_master(gain);
                Ok(())
            }
            Err(AudioError::Unavailable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn attack(&mut self, notes: &[Note], volume_db: f32) -> Result<(), AudioError> {
        let freqs: Vec<f32> = notes.iter().map(|n| n.frequency_hz()).collect();
        self.synth()?.attack(&freqs, db_to_gain(volume_db));
        Ok(())
    }

    fn attack_release(
        &mut self,
        note: Note,
        duration: Duration,
        volume_db: f32,
    ) -> Result<(), AudioError> {
        self.synth()?
            .attack_release(note.frequency_hz(), duration, db_to_gain(volume_db));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), AudioError> {
        self.synth()?.release_all();
        Ok(())
    }
}
