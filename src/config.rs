use crate::env::DEFAULT_WD_CAPACITY;
use crate::line_editor::DEFAULT_LINE_CAPACITY;
use crate::tokenizer::DEFAULT_ARG_CAPACITY;
use argh::FromArgs;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// an interactive line-oriented command shell.
pub struct ShellArgs {
    #[argh(option)]
    /// host directory mounted as the shell's root; defaults to the current directory.
    pub root: Option<PathBuf>,

    #[argh(option, default = "ShellConfig::DEFAULT_PROMPT.to_string()")]
    /// prompt printed before each line.
    pub prompt: String,

    #[argh(option)]
    /// echo typed characters (true or false); by default only when stdin is not a terminal.
    pub echo: Option<bool>,

    #[argh(option)]
    /// program to spawn at startup, may be repeated; defaults to hello and byebye.
    pub spawn: Vec<String>,

    #[argh(switch)]
    /// do not spawn any program at startup.
    pub no_startup: bool,

    #[argh(switch)]
    /// create file.txt containing "Hello World" in the root at startup.
    pub seed: bool,

    #[argh(option, default = "LevelFilter::Warn")]
    /// log level written to stderr: off, error, warn, info, debug or trace.
    pub log_level: LevelFilter,
}

/// Settings the shell runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub root: PathBuf,
    pub prompt: String,
    /// `None` lets the console decide.
    pub echo: Option<bool>,
    pub startup: Vec<String>,
    pub seed: bool,
    pub log_level: LevelFilter,
    pub line_capacity: usize,
    pub arg_capacity: usize,
    pub wd_capacity: usize,
}

impl ShellConfig {
    pub const DEFAULT_PROMPT: &'static str = "$bash> ";
    pub const DEFAULT_STARTUP: [&'static str; 2] = ["hello", "byebye"];

    /// Build the configuration from parsed command-line options.
    ///
    /// `current_dir` is the root used when `--root` is absent.
    pub fn from_cli(args: ShellArgs, current_dir: PathBuf) -> Self {
        let startup = if args.no_startup {
            Vec::new()
        } else if args.spawn.is_empty() {
            Self::DEFAULT_STARTUP.iter().map(|s| s.to_string()).collect()
        } else {
            args.spawn
        };
        Self {
            root: args.root.unwrap_or(current_dir),
            prompt: args.prompt,
            echo: args.echo,
            startup,
            seed: args.seed,
            log_level: args.log_level,
            ..Self::default()
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            prompt: Self::DEFAULT_PROMPT.to_string(),
            echo: None,
            startup: Self::DEFAULT_STARTUP.iter().map(|s| s.to_string()).collect(),
            seed: false,
            log_level: LevelFilter::Warn,
            line_capacity: DEFAULT_LINE_CAPACITY,
            arg_capacity: DEFAULT_ARG_CAPACITY,
            wd_capacity: DEFAULT_WD_CAPACITY,
        }
    }
}
