//! Operator display.
//!
//! [`WindowDisplay`] shows the annotated video (mirrored frame, hand overlay,
//! caption) in a window titled "Tello Camera Feed" and reads `q`/Esc from
//! it. Without a window the operator gets one status line per frame instead:
//! [`TerminalDisplay`] draws it in a raw-mode terminal and reports keys;
//! [`LogDisplay`] is the fallback when stdout is not a TTY and only logs
//! captions.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, SetTitle};
use crossterm::{execute, queue};
use gesture_pilot_core::{FlightState, Gesture};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::info;

use crate::error::{PilotError, Result};
use crate::vision::Frame;

/// Title of the video window and the operator's terminal.
pub const WINDOW_TITLE: &str = "Tello Camera Feed";

/// A processed frame ready for display.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    /// Mirrored camera frame with the landmark overlay and caption drawn.
    pub frame: Frame,
    /// 1-based frame number.
    pub index: u64,
    /// Classification of this frame.
    pub gesture: Option<Gesture>,
    /// Run length of `gesture` after this frame.
    pub count: u32,
    pub threshold: u32,
    pub flight: FlightState,
    /// One-line status caption, set on frames that dispatched something.
    pub caption: Option<String>,
}

/// Key the operator pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit key (`q` or Esc).
    Quit,
    /// Ctrl-C typed into the raw-mode terminal.
    Interrupt,
}

/// Display and keyboard collaborator.
pub trait Display {
    fn show(&mut self, frame: &AnnotatedFrame) -> Result<()>;

    /// Wait up to `timeout` for a recognized key.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyAction>>;
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn show(&mut self, frame: &AnnotatedFrame) -> Result<()> {
        (**self).show(frame)
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyAction>> {
        (**self).poll_key(timeout)
    }
}

/// Render the status line for a frame.
pub fn status_line(frame: &AnnotatedFrame, battery: Option<u8>) -> String {
    let battery = battery.map_or_else(|| "--".to_string(), |b| format!("{b}%"));
    let gesture = match frame.gesture {
        Some(g) => format!("{g} {}/{}", frame.count, frame.threshold),
        None => "none".to_string(),
    };
    let mut line = format!(
        "[{}] frame {} | battery {} | {} | {}",
        WINDOW_TITLE, frame.index, battery, frame.flight, gesture
    );
    if let Some(caption) = &frame.caption {
        line.push_str(" | ");
        line.push_str(caption);
    }
    line
}

/// Map a crossterm key event to an action.
fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Interrupt)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Pack RGB pixels into the 0RGB words a window buffer expects.
fn pack_frame(frame: &Frame, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(frame.pixels().map(|p| {
        let [r, g, b] = p.0;
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }));
}

fn window_key_action(key: Key, ctrl: bool) -> Option<KeyAction> {
    match key {
        Key::C if ctrl => Some(KeyAction::Interrupt),
        Key::Q | Key::Escape => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Video window showing each annotated frame.
pub struct WindowDisplay {
    window: Window,
    buffer: Vec<u32>,
    battery: Option<u8>,
}

impl WindowDisplay {
    /// Open the window sized for `width`x`height` frames.
    pub fn open(width: u32, height: u32) -> Result<Self> {
        let options = WindowOptions {
            resize: true,
            ..WindowOptions::default()
        };
        let window = Window::new(WINDOW_TITLE, width as usize, height as usize, options)
            .map_err(|e| PilotError::Window(e.to_string()))?;
        Ok(Self {
            window,
            buffer: Vec::with_capacity(width as usize * height as usize),
            battery: None,
        })
    }

    pub fn set_battery(&mut self, percent: u8) {
        self.battery = Some(percent);
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, frame: &AnnotatedFrame) -> Result<()> {
        pack_frame(&frame.frame, &mut self.buffer);
        let (width, height) = frame.frame.dimensions();
        self.window
            .update_with_buffer(&self.buffer, width as usize, height as usize)
            .map_err(|e| PilotError::Window(e.to_string()))?;
        if frame.caption.is_some() {
            info!("{}", status_line(frame, self.battery));
        }
        Ok(())
    }

    /// Keys were collected by the last `show`; closing the window quits.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyAction>> {
        std::thread::sleep(timeout);
        if !self.window.is_open() {
            return Ok(Some(KeyAction::Quit));
        }
        let ctrl =
            self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl);
        Ok(self
            .window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(|key| window_key_action(key, ctrl)))
    }
}

/// Status line in a raw-mode terminal.
pub struct TerminalDisplay {
    out: Stdout,
    battery: Option<u8>,
}

impl TerminalDisplay {
    /// Switch the terminal to raw mode. Restored on drop.
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, SetTitle(WINDOW_TITLE), Hide)?;
        Ok(Self { out, battery: None })
    }

    pub fn set_battery(&mut self, percent: u8) {
        self.battery = Some(percent);
    }
}

impl Display for TerminalDisplay {
    fn show(&mut self, frame: &AnnotatedFrame) -> Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(status_line(frame, self.battery))
        )?;
        if frame.caption.is_some() {
            // Keep dispatch lines on screen; the next status overwrites only
            // its own line.
            queue!(self.out, Print("\r\n"))?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyAction>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(key_action(key.code, key.modifiers))
            }
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.out, Print("\r\n"), Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Display for non-interactive runs: captions go to the log, no keys.
#[derive(Debug, Default)]
pub struct LogDisplay {
    battery: Option<u8>,
}

impl LogDisplay {
    pub fn new(battery: Option<u8>) -> Self {
        Self { battery }
    }
}

impl Display for LogDisplay {
    fn show(&mut self, frame: &AnnotatedFrame) -> Result<()> {
        if frame.caption.is_some() {
            info!("{}", status_line(frame, self.battery));
        }
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyAction>> {
        std::thread::sleep(timeout);
        Ok(None)
    }
}
