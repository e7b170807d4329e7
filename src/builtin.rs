use crate::command::{CommandFactory, CommandInfo, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::fs::OpenMode;
use crate::interpreter::Factory;
use crate::led::LedStatus;
use crate::matcher;
use anyhow::{Context, Result, anyhow, bail};
use argh::{EarlyExit, FromArgs};
use std::io::{BufRead, BufReader, Read, Write};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// One line shown by `help`.
    fn summary() -> &'static str;

    /// Arguments handed to `argh`. Commands whose operands may start with `-`
    /// rewrite them here so they are not taken for options.
    fn parse_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
        args.to_vec()
    }

    /// Executes the command using the provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{:#}", e)?;
                Ok(1)
            }
        }
    }
}

/// Usage or argument error produced by `argh`.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        if !self.output.ends_with('\n') {
            writeln!(stdout)?;
        }
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn info(&self) -> CommandInfo {
        CommandInfo {
            name: T::name(),
            summary: T::summary(),
        }
    }

    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        Some(match T::from_args(&[name], &T::parse_args(args)) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn summary() -> &'static str {
        "print the arguments"
    }

    /// Only a leading `-n` or `--help` is an option; everything else is printed.
    fn parse_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
        let (mut parsed, operands) = match args {
            ["--help", ..] => return args.to_vec(),
            ["-n", rest @ ..] => (vec!["-n", "--"], rest),
            _ => (vec!["--"], args),
        };
        parsed.extend_from_slice(operands);
        parsed
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// list running processes.
pub struct Ps {}

impl BuiltinCommand for Ps {
    fn name() -> &'static str {
        "ps"
    }

    fn summary() -> &'static str {
        "list process ids and names"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "Pids    Process Name")?;
        writeln!(stdout, "====================")?;
        for pid in env.processes.pids() {
            let name = env.processes.name_of(pid).unwrap_or_default();
            writeln!(stdout, "{:<8}{}", pid, name)?;
        }
        Ok(0)
    }
}

/// Upper bound on `threads <n>`.
pub const MAX_THREADS: usize = 1024;

#[derive(FromArgs)]
/// start threads running an empty task and wait for all of them.
pub struct Threads {
    #[argh(positional)]
    /// number of threads to start.
    pub count: usize,
}

impl BuiltinCommand for Threads {
    fn name() -> &'static str {
        "threads"
    }

    fn summary() -> &'static str {
        "start and join <n> threads"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        if self.count > MAX_THREADS {
            bail!("threads: {} is more than {} threads", self.count, MAX_THREADS);
        }
        let mut handles = Vec::new();
        handles
            .try_reserve_exact(self.count)
            .map_err(|_| anyhow!("threads: cannot track {} threads", self.count))?;
        for i in 0..self.count {
            let handle = std::thread::Builder::new()
                .name(format!("threads-{}", i))
                .spawn(|| {})
                .with_context(|| format!("threads: cannot start thread {}", i))?;
            handles.push(handle);
        }
        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("threads: a thread panicked"))?;
        }
        writeln!(stdout, "threads: joined {} threads", self.count)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// allocate a memory region and fill every byte of it.
pub struct Memtest {
    #[argh(positional)]
    /// size of the region in bytes.
    pub bytes: usize,
}

impl BuiltinCommand for Memtest {
    fn name() -> &'static str {
        "memtest"
    }

    fn summary() -> &'static str {
        "allocate and fill <bytes> bytes"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let mut region: Vec<u8> = Vec::new();
        region
            .try_reserve_exact(self.bytes)
            .map_err(|_| anyhow!("memtest: cannot allocate {} bytes", self.bytes))?;
        region.resize(self.bytes, b'J');
        if let Some(offset) = region.iter().position(|&b| b != b'J') {
            bail!("memtest: byte {} does not hold the written value", offset);
        }
        writeln!(stdout, "Result of memtest")?;
        writeln!(stdout, "{} bytes filled with 'J'", region.len())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// switch the LED on or off.
pub struct Led {
    #[argh(positional)]
    /// either on or off.
    pub state: String,
}

impl BuiltinCommand for Led {
    fn name() -> &'static str {
        "led"
    }

    fn summary() -> &'static str {
        "switch the LED: led on|off"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let status = LedStatus::parse(&self.state);
        env.led.set(status);
        if status == LedStatus::Invalid {
            bail!("led: invalid state '{}' (expected on|off)", self.state);
        }
        writeln!(stdout, "led: {}", if env.led.is_on() { "on" } else { "off" })?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn summary() -> &'static str {
        "print the working directory"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.cwd.path())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// list directory entries.
pub struct Ls {
    #[argh(positional)]
    /// directory to list; defaults to the working directory.
    pub path: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn summary() -> &'static str {
        "list the working directory"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = self.path.as_deref().unwrap_or(".");
        let path = env.resolve(target);
        let mut dir = env
            .fs
            .open_dir(&path)
            .with_context(|| format!("ls: {}", target))?;
        let mut names = Vec::new();
        while let Some(name) = dir.read_entry().with_context(|| format!("ls: {}", target))? {
            names.push(name);
        }
        names.sort();
        for name in names {
            writeln!(stdout, "{}", name)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// create a directory.
pub struct Mkdir {
    #[argh(positional)]
    /// directory to create.
    pub path: String,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn summary() -> &'static str {
        "create a directory"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let path = env.resolve(&self.path);
        env.fs
            .make_dir(&path)
            .with_context(|| format!("mkdir: {}", self.path))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// change the current working directory.
/// without a target, changes to the root directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "change the working directory"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = self.target.as_deref().unwrap_or("/");
        let path = env.resolve(target);
        if !env.fs.is_dir(&path) {
            bail!("cd: {}: no such directory", target);
        }
        env.cwd.change_to(&path)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// print file(s) to stdout.
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to print.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn summary() -> &'static str {
        "print files"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        if self.files.is_empty() {
            bail!("cat: missing file operand");
        }
        for fname in &self.files {
            let mut f = env
                .fs
                .open(&env.resolve(fname), OpenMode::Read)
                .with_context(|| format!("cat: {}", fname))?;
            let mut content = Vec::new();
            f.read_to_end(&mut content)
                .with_context(|| format!("cat: {}", fname))?;
            stdout.write_all(&content)?;
            if !content.ends_with(b"\n") {
                writeln!(stdout)?;
            }
        }
        Ok(0)
    }
}

/// Line, word and byte totals reported by `wc`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub lines: usize,
    pub words: usize,
    pub bytes: usize,
}

impl Counts {
    /// Count `reader` to the end.
    ///
    /// Spaces, tabs, `\n` and `\r` separate words; `\n` and `\r` end lines. A
    /// final line without a terminator still counts.
    pub fn of(reader: impl Read) -> std::io::Result<Self> {
        let mut counts = Counts::default();
        let mut in_space = true;
        let mut last = b'\n';
        for byte in BufReader::new(reader).bytes() {
            let c = byte?;
            last = c;
            counts.bytes += 1;
            match c {
                b'\n' | b'\r' => {
                    in_space = true;
                    counts.lines += 1;
                }
                b' ' | b'\t' => in_space = true,
                _ => {
                    if in_space {
                        counts.words += 1;
                    }
                    in_space = false;
                }
            }
        }
        if last != b'\n' && last != b'\r' {
            counts.lines += 1;
        }
        Ok(counts)
    }
}

#[derive(FromArgs)]
/// count lines, words and characters of a file.
pub struct Wc {
    #[argh(positional)]
    /// file to count.
    pub path: String,
}

impl BuiltinCommand for Wc {
    fn name() -> &'static str {
        "wc"
    }

    fn summary() -> &'static str {
        "count lines, words and characters"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let f = env
            .fs
            .open(&env.resolve(&self.path), OpenMode::Read)
            .with_context(|| format!("wc: {}", self.path))?;
        let counts = Counts::of(f).with_context(|| format!("wc: {}", self.path))?;
        writeln!(stdout, "Lines, Words, Characters")?;
        writeln!(
            stdout,
            " {:3} {:3} {:3}",
            counts.lines, counts.words, counts.bytes
        )?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// print lines matching a pattern.
/// the pattern supports literal characters, '.', 'c*', a leading '^' and a trailing '$'.
pub struct Grep {
    #[argh(positional)]
    /// the pattern to search for.
    pub pattern: String,

    #[argh(positional, greedy)]
    /// files to search.
    pub files: Vec<String>,
}

impl Grep {
    /// Print every line of `reader` matching the pattern, prefixed by `label`
    /// when given. Returns the number of matching lines.
    fn search(
        &self,
        reader: impl Read,
        stdout: &mut dyn Write,
        label: Option<&str>,
    ) -> Result<usize> {
        let mut matches = 0;
        for line in BufReader::new(reader).split(b'\n') {
            let line = line?;
            if matcher::is_match(&self.pattern, &String::from_utf8_lossy(&line)) {
                matches += 1;
                if let Some(label) = label {
                    write!(stdout, "{}:", label)?;
                }
                stdout.write_all(&line)?;
                writeln!(stdout)?;
            }
        }
        Ok(matches)
    }
}

impl BuiltinCommand for Grep {
    fn name() -> &'static str {
        "grep"
    }

    fn summary() -> &'static str {
        "print lines of files matching a pattern"
    }

    /// The pattern may start with `-`, so only a lone `--help` is an option.
    fn parse_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
        if args == ["--help"] {
            return args.to_vec();
        }
        let mut parsed = vec!["--"];
        parsed.extend_from_slice(args);
        parsed
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        if self.files.is_empty() {
            bail!("grep: missing file operand");
        }
        let labelled = self.files.len() > 1;
        let mut final_exit_code = 0;
        for file_name in &self.files {
            let label = labelled.then_some(file_name.as_str());
            let result = env
                .fs
                .open(&env.resolve(file_name), OpenMode::Read)
                .map_err(anyhow::Error::from)
                .and_then(|f| self.search(f, stdout, label));
            if let Err(e) = result {
                writeln!(stdout, "grep: {}: {}", file_name, e)?;
                final_exit_code = 1;
            }
        }
        Ok(final_exit_code)
    }
}

#[derive(FromArgs)]
/// run a program on another core.
pub struct Oncore {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Oncore {
    fn name() -> &'static str {
        "oncore"
    }

    fn summary() -> &'static str {
        "run a program on another core (not supported)"
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        bail!("oncore: not supported on this host")
    }
}

#[derive(FromArgs)]
/// list the available commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "list the available commands"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        for info in &env.commands {
            writeln!(stdout, "{:<8} {}", info.name, info.summary)?;
        }
        Ok(0)
    }
}
