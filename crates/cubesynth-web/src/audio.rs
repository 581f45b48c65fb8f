use cubesynth_core::{db_to_gain, start_voices, AudioEngine, AudioError, Note};
use std::time::Duration;
use web_sys as web;

const ATTACK_SEC: f64 = 0.005;
const RELEASE_SEC: f64 = 0.3;
const VOLUME_GLIDE_SEC: f64 = 0.02;

struct Voice {
    osc: web::OscillatorNode,
    gain: web::GainNode,
}

struct Graph {
    ctx: web::AudioContext,
    master: web::GainNode,
}

/// Polyphonic triangle synth on WebAudio: one oscillator + gain per note,
/// all summed into a master gain.
///
/// The context is created lazily on the first `resume`, which the caller
/// makes from inside a user gesture.
#[derive(Default)]
pub struct WebAudioEngine {
    graph: Option<Graph>,
    held: Vec<Voice>,
    master_db: Option<f32>,
}

fn js_err(e: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Backend(format!("{e:?}"))
}

fn running(graph: &Option<Graph>) -> Result<&Graph, AudioError> {
    let graph = graph.as_ref().ok_or(AudioError::Unavailable)?;
    if graph.ctx.state() != web::AudioContextState::Running {
        return Err(AudioError::Unavailable);
    }
    Ok(graph)
}

impl WebAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn voice(graph: &Graph, note: Note, peak: f32, start: f64) -> Result<Voice, AudioError> {
        let osc = web::OscillatorNode::new(&graph.ctx).map_err(js_err)?;
        osc.set_type(web::OscillatorType::Triangle);
        osc.frequency().set_value(note.frequency_hz());
        let gain = web::GainNode::new(&graph.ctx).map_err(js_err)?;
        gain.gain().set_value(0.0);
        gain.gain()
            .linear_ramp_to_value_at_time(peak, start + ATTACK_SEC)
            .map_err(js_err)?;
        osc.connect_with_audio_node(&gain).map_err(js_err)?;
        gain.connect_with_audio_node(&graph.master).map_err(js_err)?;
        osc.start_with_when(start).map_err(js_err)?;
        Ok(Voice { osc, gain })
    }

    fn release(voice: &Voice, now: f64) {
        let g = voice.gain.gain();
        let _ = g.cancel_scheduled_values(now);
        let _ = g.set_value_at_time(g.value(), now);
        let _ = g.linear_ramp_to_value_at_time(0.0, now + RELEASE_SEC);
        let _ = voice.osc.stop_with_when(now + RELEASE_SEC + 0.05);
    }
}

impl AudioEngine for WebAudioEngine {
    fn resume(&mut self) -> Result<(), AudioError> {
        if self.graph.is_none() {
            let ctx = web::AudioContext::new().map_err(js_err)?;
            let master = web::GainNode::new(&ctx).map_err(js_err)?;
            master.gain().set_value(db_to_gain(self.master_db.unwrap_or(0.0)));
            master
                .connect_with_audio_node(&ctx.destination())
                .map_err(js_err)?;
            log::info!("[audio] AudioContext created ({} Hz)", ctx.sample_rate());
            self.graph = Some(Graph { ctx, master });
        }
        if let Some(graph) = &self.graph {
            // resolves asynchronously; triggers report Unavailable until then
            let _ = graph.ctx.resume().map_err(js_err)?;
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), AudioError> {
        let _ = self.release_all();
        if let Some(graph) = self.graph.take() {
            let _ = graph.master.disconnect();
            let _ = graph.ctx.close().map_err(js_err)?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume_db: f32) -> Result<(), AudioError> {
        self.master_db = Some(volume_db);
        let Some(graph) = &self.graph else {
            return Ok(());
        };
        let now = graph.ctx.current_time();
        graph
            .master
            .gain()
            .set_target_at_time(db_to_gain(volume_db), now, VOLUME_GLIDE_SEC)
            .map_err(js_err)?;
        Ok(())
    }

    fn attack(&mut self, notes: &[Note], volume_db: f32) -> Result<(), AudioError> {
        let graph = running(&self.graph)?;
        let now = graph.ctx.current_time();
        let peak = db_to_gain(volume_db);
        start_voices(notes, &mut self.held, |note| {
            Self::voice(graph, note, peak, now)
        })
    }

    fn attack_release(
        &mut self,
        note: Note,
        duration: Duration,
        volume_db: f32,
    ) -> Result<(), AudioError> {
        let graph = running(&self.graph)?;
        let now = graph.ctx.current_time();
        let voice = Self::voice(graph, note, db_to_gain(volume_db), now)?;
        let end = now + ATTACK_SEC + duration.as_secs_f64();
        voice
            .gain
            .gain()
            .linear_ramp_to_value_at_time(0.0, end)
            .map_err(js_err)?;
        voice.osc.stop_with_when(end + 0.05).map_err(js_err)?;
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), AudioError> {
        let now = match &self.graph {
            Some(graph) => graph.ctx.current_time(),
            None => {
                self.held.clear();
                return Ok(());
            }
        };
        for voice in self.held.drain(..) {
            Self::release(&voice, now);
        }
        Ok(())
    }
}
