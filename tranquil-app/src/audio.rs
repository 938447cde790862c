//! Audio playback sessions.
//!
//! Each session owns one output channel (the ringing alarm loop, the joke
//! one-shot). Playback failures (blocked autoplay, decode errors) are
//! swallowed: the alarm's modal state never depends on sound actually
//! coming out.

use anyhow::Result;
use tracing::debug;

pub trait AudioSink {
    fn play(&mut self, src: &str, looping: bool) -> Result<()>;
    /// Stop and reset the play position.
    fn stop(&mut self);
}

/// Sink for headless hosts: accepts everything, plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _src: &str, _looping: bool) -> Result<()> {
        Ok(())
    }
    fn stop(&mut self) {}
}

#[derive(Debug)]
pub struct AudioSession<S> {
    sink: S,
    playing: bool,
}

impl<S: AudioSink> AudioSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self, src: &str, looping: bool) {
        match self.sink.play(src, looping) {
            Ok(()) => self.playing = true,
            Err(e) => {
                debug!("audio playback failed (ignored): {e:#}");
                self.playing = false;
            }
        }
    }

    pub fn stop(&mut self) {
        if self.playing {
            self.sink.stop();
            self.playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct FlakySink {
        fail: bool,
        stops: usize,
    }

    impl AudioSink for FlakySink {
        fn play(&mut self, _src: &str, _looping: bool) -> Result<()> {
            if self.fail {
                bail!("autoplay blocked");
            }
            Ok(())
        }
        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn playback_failure_is_swallowed() {
        let mut session = AudioSession::new(FlakySink { fail: true, stops: 0 });
        session.play("data:audio/wav;base64,AAAA", true);
        assert!(!session.is_playing());
    }

    #[test]
    fn stop_only_touches_an_active_sink() {
        let mut session = AudioSession::new(FlakySink { fail: false, stops: 0 });
        session.stop();
        assert_eq!(session.sink.stops, 0);

        session.play("x", false);
        assert!(session.is_playing());
        session.stop();
        assert!(!session.is_playing());
        assert_eq!(session.sink.stops, 1);
    }
}
