//! Shell side of the dashboard: command line options, key bindings and the
//! crossterm renderer.

pub mod term;

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use getopts::Options;
use tiptop::Command;

pub use term::TermRenderer;

/// Environment variable naming a log file when `-l` is not given.
pub const LOG_ENV: &str = "TIPTOP_LOG";

pub fn tiptop_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("c", "config", "dashboard configuration (YAML)", "path");
    opts.optopt(
        "l",
        "log",
        &format!("write log messages to this file (default ${})", LOG_ENV),
        "path",
    );
    opts.optflag("v", "verbose", "log debug messages");
    opts.optflag("", "dump-config", "print the effective configuration and exit");
    opts.optflag("h", "help", "show help");
    opts
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub verbose: bool,
    pub dump_config: bool,
    pub help: bool,
}

/// Parses `args`, program name included.
pub fn tiptop_parseopts(opts: &Options, args: &[String]) -> Result<Cli, getopts::Fail> {
    let matches = opts.parse(args.iter().skip(1))?;
    if let Some(extra) = matches.free.first() {
        return Err(getopts::Fail::UnrecognizedOption(extra.clone()));
    }
    Ok(Cli {
        config: matches.opt_str("c").map(PathBuf::from),
        log: matches
            .opt_str("l")
            .or_else(|| std::env::var(LOG_ENV).ok().filter(|s| !s.is_empty()))
            .map(PathBuf::from),
        verbose: matches.opt_present("v"),
        dump_config: matches.opt_present("dump-config"),
        help: matches.opt_present("h"),
    })
}

/// Whether a panic on the current thread is caught before it can end the
/// dashboard: widget ticks are caught by the scheduler, and panics off the
/// main thread stay on their own thread.
pub fn panic_is_contained() -> bool {
    tiptop::schedule::in_widget_tick() || std::thread::current().name() != Some("main")
}

/// Region toggled by a plain key press.
pub fn region_for_key(c: char) -> Option<&'static str> {
    match c {
        'i' => Some("info"),
        'c' => Some("cpu"),
        'm' => Some("mem"),
        'n' => Some("net"),
        'p' => Some("proc"),
        _ => None,
    }
}

pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    // Some terminals also report releases and repeats.
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(c) => region_for_key(c).map(|name| Command::Toggle(name.to_string())),
        _ => None,
    }
}

pub fn command_for_event(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) => command_for_key(key),
        Event::Resize(..) => Some(Command::Redraw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_options() {
        let opts = tiptop_opts();
        let cli = tiptop_parseopts(
            &opts,
            &args(&["tiptop", "-c", "dash.yaml", "-l", "/tmp/tiptop.log", "-v"]),
        )
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("dash.yaml")));
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/tiptop.log")));
        assert!(cli.verbose);
        assert!(!cli.dump_config);

        let cli = tiptop_parseopts(&opts, &args(&["tiptop", "--dump-config"])).unwrap();
        assert!(cli.dump_config);
        assert_eq!(cli.config, None);

        assert!(tiptop_parseopts(&opts, &args(&["tiptop", "--bogus"])).is_err());
        assert!(tiptop_parseopts(&opts, &args(&["tiptop", "stray"])).is_err());
    }

    #[test]
    fn worker_thread_panics_are_contained() {
        let contained = std::thread::Builder::new()
            .name("tiptop-procs".to_string())
            .spawn(panic_is_contained)
            .unwrap()
            .join()
            .unwrap();
        assert!(contained);
    }

    #[test]
    fn keys_map_to_commands() {
        let press = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(
            command_for_event(&press(KeyCode::Char('p'))),
            Some(Command::Toggle("proc".to_string()))
        );
        assert_eq!(
            command_for_event(&press(KeyCode::Char('c'))),
            Some(Command::Toggle("cpu".to_string()))
        );
        assert_eq!(command_for_event(&press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for_event(&press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(command_for_event(&press(KeyCode::Char('x'))), None);
        assert_eq!(command_for_event(&Event::Resize(80, 24)), Some(Command::Redraw));

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(command_for_event(&ctrl_c), Some(Command::Quit));

        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(command_for_event(&release), None);
    }
}
