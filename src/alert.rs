//! Audible cue played at each phase transition.
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::error::AlertError;

/// Something that can be played from the start, paused, and rewound.
pub trait Alert {
    /// Plays from the current position, which is zero after a rewind.
    fn play(&mut self) -> Result<(), AlertError>;
    fn pause(&mut self) -> Result<(), AlertError>;
    fn rewind(&mut self) -> Result<(), AlertError>;
}

impl<A: Alert + ?Sized> Alert for Box<A> {
    fn play(&mut self) -> Result<(), AlertError> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<(), AlertError> {
        (**self).pause()
    }

    fn rewind(&mut self) -> Result<(), AlertError> {
        (**self).rewind()
    }
}

/// Used with `--no-sound`.
#[derive(Debug, Default)]
pub struct Silent;

impl Alert for Silent {
    fn play(&mut self) -> Result<(), AlertError> {
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AlertError> {
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), AlertError> {
        Ok(())
    }
}

/// ASCII bell written to the terminal.
pub struct Bell<W: Write> {
    out: W,
}

impl Bell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Bell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Alert for Bell<W> {
    fn play(&mut self) -> Result<(), AlertError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }

    // A bell has no duration to stop or rewind.
    fn pause(&mut self) -> Result<(), AlertError> {
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), AlertError> {
        Ok(())
    }
}

const MACOS_SOUNDS: [&str; 4] = [
    "/System/Library/Sounds/Glass.aiff",
    "/System/Library/Sounds/Ping.aiff",
    "/System/Library/Sounds/Pop.aiff",
    "/System/Library/Sounds/Purr.aiff",
];

const LINUX_SOUNDS: [&str; 3] = [
    "/usr/share/sounds/alsa/Front_Left.wav",
    "/usr/share/sounds/sound-icons/bell.wav",
    "/usr/share/sounds/gnome/default/alerts/glass.ogg",
];

fn first_existing<'a>(paths: &[&'a str]) -> Option<&'a str> {
    paths.iter().copied().find(|path| Path::new(path).exists())
}

/// An external player process. The process is the playback position: killing
/// it stops the sound, and the next `play` starts a fresh one from zero.
#[derive(Debug)]
pub struct SoundCommand {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl SoundCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Wraps a user command run through `sh -c`. Empty or `#`-prefixed
    /// commands count as not configured.
    pub fn shell(command: &str) -> Option<Self> {
        let command = command.trim();
        if command.is_empty() {
            debug!("Alert command is empty");
            return None;
        }
        if command.starts_with('#') {
            debug!("Alert command is commented out: {}", command);
            return None;
        }
        Some(Self::new("sh", vec!["-c".to_string(), command.to_string()]))
    }

    /// Platform players in the order they should be tried: `afplay` then
    /// `say` on macOS, `paplay` then `aplay` on Linux.
    pub fn detect() -> Vec<Self> {
        let mut players = Vec::new();
        if cfg!(target_os = "macos") {
            if let Some(sound) = first_existing(&MACOS_SOUNDS) {
                players.push(Self::new("afplay", vec![sound.to_string()]));
            }
            players.push(Self::new("say", vec!["Time up".to_string()]));
        } else if cfg!(target_os = "linux") {
            if let Some(sound) = first_existing(&LINUX_SOUNDS) {
                players.push(Self::new("paplay", vec![sound.to_string()]));
                players.push(Self::new("aplay", vec![sound.to_string()]));
            }
        }
        for player in &players {
            info!("Alert candidate: {} {:?}", player.program, player.args);
        }
        players
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_playing(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn stop(&mut self) -> Result<(), AlertError> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                child.kill()?;
                child.wait()?;
            }
        }
        Ok(())
    }
}

impl Alert for SoundCommand {
    fn play(&mut self) -> Result<(), AlertError> {
        self.stop()?;
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AlertError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!("Started {} (pid {})", self.program, child.id());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AlertError> {
        self.stop()
    }

    fn rewind(&mut self) -> Result<(), AlertError> {
        self.stop()
    }
}

impl Drop for SoundCommand {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Tries the primary alert and rings the fallback when it fails.
pub struct FallbackAlert<P: Alert, F: Alert> {
    primary: P,
    fallback: F,
}

impl<P: Alert, F: Alert> FallbackAlert<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Alert, F: Alert> Alert for FallbackAlert<P, F> {
    fn play(&mut self) -> Result<(), AlertError> {
        match self.primary.play() {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Primary alert failed ({}), using fallback", e);
                self.fallback.play()
            }
        }
    }

    fn pause(&mut self) -> Result<(), AlertError> {
        self.fallback.pause()?;
        self.primary.pause()
    }

    fn rewind(&mut self) -> Result<(), AlertError> {
        self.fallback.rewind()?;
        self.primary.rewind()
    }
}

/// Chains alerts so each one falls back to the next; an empty list is silent.
pub fn chain(mut alerts: Vec<Box<dyn Alert>>) -> Box<dyn Alert> {
    let mut chained: Box<dyn Alert> = match alerts.pop() {
        Some(last) => last,
        None => Box::new(Silent),
    };
    while let Some(alert) = alerts.pop() {
        chained = Box::new(FallbackAlert::new(alert, chained));
    }
    chained
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingAlert {
        pub plays: usize,
        pub pauses: usize,
        pub rewinds: usize,
        pub fail: bool,
    }

    impl RecordingAlert {
        fn record(&mut self, count: fn(&mut Self) -> &mut usize) -> Result<(), AlertError> {
            if self.fail {
                return Err(AlertError::NoPlayer);
            }
            *count(self) += 1;
            Ok(())
        }
    }

    impl Alert for RecordingAlert {
        fn play(&mut self) -> Result<(), AlertError> {
            self.record(|a| &mut a.plays)
        }

        fn pause(&mut self) -> Result<(), AlertError> {
            self.record(|a| &mut a.pauses)
        }

        fn rewind(&mut self) -> Result<(), AlertError> {
            self.record(|a| &mut a.rewinds)
        }
    }

    #[test]
    fn bell_writes_bel_character() {
        let mut bell = Bell::new(Vec::new());
        bell.play().unwrap();
        bell.pause().unwrap();
        bell.rewind().unwrap();
        bell.play().unwrap();
        assert_eq!(bell.into_inner(), b"\x07\x07");
    }

    #[test]
    fn shell_command_skips_commented_and_empty() {
        assert!(SoundCommand::shell("# afplay ~/music/beep.mp3").is_none());
        assert!(SoundCommand::shell("   ").is_none());

        let alert = SoundCommand::shell("  paplay beep.ogg ").unwrap();
        assert_eq!(alert.program(), "sh");
        assert_eq!(alert.args(), ["-c", "paplay beep.ogg"]);
    }

    #[test]
    fn missing_player_reports_spawn_error() {
        let mut alert = SoundCommand::new("pomo-clock-no-such-player", vec![]);
        let err = alert.play().unwrap_err();
        assert!(matches!(err, AlertError::Spawn { .. }));
        assert!(!alert.is_playing());
    }

    #[test]
    fn fallback_rings_when_primary_fails() {
        let primary = SoundCommand::new("pomo-clock-no-such-player", vec![]);
        let mut alert = FallbackAlert::new(primary, RecordingAlert::default());
        alert.play().unwrap();
        alert.rewind().unwrap();
        assert_eq!(alert.fallback.plays, 1);
        assert_eq!(alert.fallback.rewinds, 1);
    }

    #[cfg(unix)]
    #[test]
    fn pause_stops_running_player() {
        let mut alert = SoundCommand::new("sleep", vec!["30".to_string()]);
        alert.play().unwrap();
        assert!(alert.is_playing());
        alert.pause().unwrap();
        assert!(!alert.is_playing());
    }

    struct SharedCount(Rc<Cell<usize>>);

    impl Alert for SharedCount {
        fn play(&mut self) -> Result<(), AlertError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), AlertError> {
            Ok(())
        }

        fn rewind(&mut self) -> Result<(), AlertError> {
            Ok(())
        }
    }

    #[test]
    fn chain_reaches_later_player_when_earlier_ones_fail() {
        let played = Rc::new(Cell::new(0));
        let mut alert = chain(vec![
            Box::new(SoundCommand::new("pomo-clock-missing-paplay", vec![])) as Box<dyn Alert>,
            Box::new(SoundCommand::new("pomo-clock-missing-aplay", vec![])),
            Box::new(SharedCount(Rc::clone(&played))),
        ]);
        alert.play().unwrap();
        alert.rewind().unwrap();
        alert.play().unwrap();
        assert_eq!(played.get(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn second_player_runs_when_first_is_missing() {
        let first = SoundCommand::new("pomo-clock-missing-paplay", vec![]);
        let second = SoundCommand::new("sleep", vec!["30".to_string()]);
        let mut alert = FallbackAlert::new(first, second);
        alert.play().unwrap();
        assert!(alert.fallback.is_playing());
        alert.pause().unwrap();
        assert!(!alert.fallback.is_playing());
    }

    #[test]
    fn empty_chain_is_silent() {
        assert!(chain(Vec::new()).play().is_ok());
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn macos_always_offers_say() {
        let players = SoundCommand::detect();
        assert_eq!(players.last().map(|p| p.program()), Some("say"));
    }

    #[test]
    fn silent_never_fails() {
        let mut alert: Box<dyn Alert> = Box::new(Silent);
        assert!(alert.play().is_ok());
        assert!(alert.pause().is_ok());
        assert!(alert.rewind().is_ok());
    }
}
