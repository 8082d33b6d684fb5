// tiptop
//
// Live CPU, temperature, memory and process dashboard.
//
// Toggle panels: i c m n p
// Quit:          q / Esc / Ctrl-C

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use crossterm::event::EventStream;
use crossterm::{cursor, terminal, ExecutableCommand};
use futures::StreamExt;
use tiptop::metrics::{SystemProcesses, SystemProvider};
use tiptop::{DashboardConfig, Monitor};
use tiptop_tools::{
    command_for_event, panic_is_contained, tiptop_opts, tiptop_parseopts, Cli, TermRenderer,
};
use tracing::{error, info, Level};

struct Tui {
    stdout: io::Stdout,
}

impl Tui {
    fn setup() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(terminal::EnterAlternateScreen)?;
        stdout.execute(cursor::Hide)?;
        Ok(Self { stdout })
    }

    fn teardown(&mut self) {
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn print_help(opts: &getopts::Options, program: &str) {
    let brief = format!(
        "Usage: {program} [options]\n\n\
         Terminal dashboard of CPU, temperature, memory and process activity."
    );
    eprintln!("{}", opts.usage(&brief));
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    // stdout belongs to the dashboard, so logs only go to a file
    let Some(path) = &cli.log else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, tiptop::config::ConfigError> {
    match &cli.config {
        Some(path) => DashboardConfig::load(path),
        None => Ok(DashboardConfig::default()),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "tiptop".into());
    let opts = tiptop_opts();
    let cli = match tiptop_parseopts(&opts, &args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            print_help(&opts, &program);
            return ExitCode::from(2);
        }
    };
    if cli.help {
        print_help(&opts, &program);
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_logging(&cli) {
        eprintln!("cannot open log file: {}", e);
        return ExitCode::FAILURE;
    }
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.dump_config {
        return match config.to_yaml() {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut monitor = match Monitor::from_config(
        &config,
        SystemProvider::new(),
        Box::new(SystemProcesses::new()),
        TermRenderer::stdout(),
        Instant::now(),
    ) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let tui = match Tui::setup() {
        Ok(tui) => tui,
        Err(e) => {
            eprintln!("terminal setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if panic_is_contained() {
            // the dashboard keeps running; leave the terminal alone
            error!("{}", panic_info);
            return;
        }
        let mut t = Tui {
            stdout: io::stdout(),
        };
        t.teardown();
        error!("{}", panic_info);
        original_hook(panic_info);
    }));

    info!("starting dashboard");
    let commands = EventStream::new().filter_map(|event| async move {
        match event {
            Ok(event) => command_for_event(&event),
            Err(e) => {
                error!("terminal input failed: {}", e);
                Some(tiptop::Command::Quit)
            }
        }
    });
    let result = async_std::task::block_on(monitor.run(Box::pin(commands)));
    drop(tui);

    match result {
        Ok(()) => {
            info!("dashboard closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
