//! Colored status lines
//!
//! cyan = section/info, green = success echo, red = failure. Colors are
//! dropped when the target stream is not a terminal or `NO_COLOR` is set.
//!
//! In machine mode (`--json`) every status line goes to stderr so stdout
//! carries nothing but the JSON document.

use anstyle::{AnsiColor, Style};
use std::io::IsTerminal;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

static MACHINE_MODE: AtomicBool = AtomicBool::new(false);

/// Route status output to stderr (true) or stdout (false)
pub fn set_machine_mode(enabled: bool) {
  MACHINE_MODE.store(enabled, Ordering::Relaxed);
}

fn machine_mode() -> bool {
  MACHINE_MODE.load(Ordering::Relaxed)
}

fn color_enabled() -> bool {
  static STDOUT: OnceLock<bool> = OnceLock::new();
  static STDERR: OnceLock<bool> = OnceLock::new();
  let no_color = || std::env::var_os("NO_COLOR").is_some();
  if machine_mode() {
    *STDERR.get_or_init(|| !no_color() && std::io::stderr().is_terminal())
  } else {
    *STDOUT.get_or_init(|| !no_color() && std::io::stdout().is_terminal())
  }
}

fn paint(color: AnsiColor, text: &str) -> String {
  paint_with(color_enabled(), color, text)
}

fn paint_with(enabled: bool, color: AnsiColor, text: &str) -> String {
  if !enabled {
    return text.to_string();
  }
  let style = Style::new().fg_color(Some(color.into()));
  format!("{}{}{}", style.render(), text, style.render_reset())
}

fn emit(line: &str) {
  if machine_mode() {
    eprintln!("{}", line);
  } else {
    println!("{}", line);
  }
}

/// Section header / info line
pub fn info(text: &str) {
  emit(&paint(AnsiColor::BrightCyan, text));
}

/// Success line (usually echoes captured stdout)
pub fn success(text: &str) {
  emit(&paint(AnsiColor::BrightGreen, text));
}

/// Failure line
pub fn failure(text: &str) {
  emit(&paint(AnsiColor::BrightRed, text));
}

/// Plain step announcement (`> Rendering configuration templates`)
pub fn step(text: &str) {
  emit(&format!("> {}", text));
}

/// Uncolored line
pub fn plain(text: &str) {
  emit(text);
}
