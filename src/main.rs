use anyhow::{Context, Result};
use lineshell::Interpreter;
use lineshell::config::{ShellArgs, ShellConfig};
use lineshell::console::StdConsole;
use lineshell::env::Environment;
use lineshell::error::ShellError;
use lineshell::fs::{OpenMode, RootFs};
use lineshell::logging::initialize_log;
use log::{error, info, warn};
use std::io::{IsTerminal, Write};

fn main() -> Result<()> {
    let args: ShellArgs = argh::from_env();
    let current_dir = std::env::current_dir().context("cannot determine current directory")?;
    let config = ShellConfig::from_cli(args, current_dir);
    initialize_log(config.log_level).context("cannot install logger")?;

    let fs = RootFs::new(&config.root);
    if !config.root.is_dir() {
        anyhow::bail!("root {} is not a directory", config.root.display());
    }
    info!("shell root is {}", config.root.display());

    if config.seed {
        let mut file = fs
            .open("/file.txt", OpenMode::Write)
            .context("cannot create file.txt")?;
        write!(file, "Hello World").context("cannot write file.txt")?;
    }

    let env = Environment::new(fs, config.wd_capacity)?;
    let mut shell = Interpreter::with_builtins(env);
    shell.configure(&config);

    println!("Starting bash");
    shell.startup(&config.startup);

    let stdin = std::io::stdin();
    let echo = config.echo.unwrap_or_else(|| !stdin.is_terminal());
    let mut console = StdConsole::new(stdin.lock(), std::io::stdout(), echo);
    let mut stdout = std::io::stdout();

    let Err(err) = shell.repl(&mut console, &mut stdout);
    match err {
        ShellError::ConsoleClosed => {
            warn!("console closed, exiting");
            writeln!(stdout)?;
            Ok(())
        }
        err => {
            error!("shell terminated: {}", err);
            Err(err.into())
        }
    }
}
