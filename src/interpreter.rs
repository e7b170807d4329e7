use crate::command::{CommandFactory, ExitCode};
use crate::config::ShellConfig;
use crate::console::Console;
use crate::env::Environment;
use crate::error::ShellError;
use crate::line_editor::{DEFAULT_LINE_CAPACITY, LineEditor};
use crate::tokenizer::{ArgumentVector, DEFAULT_ARG_CAPACITY, tokenize_with_capacity};
use log::{debug, info, warn};
use std::convert::Infallible;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate (see `BuiltinCommand`).
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The command shell: reads lines from a console, splits them into arguments
/// and runs the matching command from a fixed table.
///
/// The interpreter owns the [`Environment`] commands run in and the list of
/// [`CommandFactory`] entries that make up the command table. Names are matched
/// exactly; the first entry that accepts a name handles it.
///
/// Example
/// ```
/// use lineshell::Interpreter;
/// use lineshell::env::Environment;
/// use lineshell::fs::RootFs;
///
/// let env = Environment::new(RootFs::new("."), 20).unwrap();
/// let mut sh = Interpreter::with_builtins(env);
/// let mut out = Vec::new();
/// let code = sh.execute_line("echo hello   world", &mut out).unwrap();
/// assert_eq!(code, Some(0));
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    prompt: String,
    line_capacity: usize,
    arg_capacity: usize,
}

impl Interpreter {
    /// Create a new interpreter with a custom command table.
    pub fn new(mut env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        env.commands = commands.iter().map(|factory| factory.info()).collect();
        Self {
            env,
            commands,
            prompt: ShellConfig::DEFAULT_PROMPT.to_string(),
            line_capacity: DEFAULT_LINE_CAPACITY,
            arg_capacity: DEFAULT_ARG_CAPACITY,
        }
    }

    /// Create an interpreter with every builtin command.
    pub fn with_builtins(env: Environment) -> Self {
        use crate::builtin::*;
        Self::new(
            env,
            vec![
                Box::new(Factory::<Echo>::default()),
                Box::new(Factory::<Led>::default()),
                Box::new(Factory::<Threads>::default()),
                Box::new(Factory::<Memtest>::default()),
                Box::new(Factory::<Oncore>::default()),
                Box::new(Factory::<Ps>::default()),
                Box::new(Factory::<Help>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Ls>::default()),
                Box::new(Factory::<Cat>::default()),
                Box::new(Factory::<Wc>::default()),
                Box::new(Factory::<Grep>::default()),
                Box::new(Factory::<Mkdir>::default()),
            ],
        )
    }

    /// Apply prompt and buffer sizes from `config`.
    pub fn configure(&mut self, config: &ShellConfig) {
        self.prompt = config.prompt.clone();
        self.line_capacity = config.line_capacity;
        self.arg_capacity = config.arg_capacity;
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Spawn each program in `programs`. Failures are logged and skipped.
    pub fn startup(&mut self, programs: &[String]) {
        for name in programs {
            match self.env.processes.spawn(name) {
                Ok(pid) => info!("startup program {} running as {}", name, pid),
                Err(e) => warn!("startup program {} not started: {:#}", name, e),
            }
        }
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns `None` when no command in the table has this name; nothing is
    /// printed in that case.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> Result<Option<ExitCode>, ShellError> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                debug!("running {} with {} argument(s)", name, args.len());
                let code = cmd.execute(stdout, &mut self.env)?;
                return Ok(Some(code));
            }
        }
        debug!("unknown command: {}", name);
        Ok(None)
    }

    /// Route an argument vector to its command. An empty vector does nothing.
    pub fn dispatch(
        &mut self,
        argv: &ArgumentVector,
        stdout: &mut dyn Write,
    ) -> Result<Option<ExitCode>, ShellError> {
        let Some(name) = argv.command() else {
            return Ok(None);
        };
        let args: Vec<&str> = argv.operands().iter().map(String::as_str).collect();
        self.run(name, &args, stdout)
    }

    /// Tokenize and dispatch one finished line.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
    ) -> Result<Option<ExitCode>, ShellError> {
        let argv = tokenize_with_capacity(line, self.arg_capacity)?;
        self.dispatch(&argv, stdout)
    }

    /// Prompt, read, dispatch, forever.
    ///
    /// Only returns when the console or the output fails; the error says why.
    pub fn repl(
        &mut self,
        console: &mut dyn Console,
        stdout: &mut dyn Write,
    ) -> Result<Infallible, ShellError> {
        loop {
            write!(stdout, "{}", self.prompt)?;
            stdout.flush()?;

            let mut editor = LineEditor::with_capacity(self.line_capacity)?;
            let line = editor.read_line(console)?;
            console.put_char(b'\n')?;

            self.execute_line(&line, stdout)?;
            stdout.flush()?;
            self.env.processes.reap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::Echo;
    use crate::console::StdConsole;
    use crate::console::tests::BrokenInput;
    use crate::env::DEFAULT_WD_CAPACITY;
    use crate::fs::RootFs;
    use crate::io_adapters::{MemConsole, MemWriter};
    use crate::led::SimulatedLed;
    use crate::process::FakeProcesses;
    use crate::tokenizer::tokenize;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_env(root: &Path) -> Environment {
        Environment::with_services(
            RootFs::new(root),
            Box::new(FakeProcesses::default()),
            Box::new(SimulatedLed::default()),
            DEFAULT_WD_CAPACITY,
        )
        .unwrap()
    }

    /// Feed `input` to a fresh shell and return the transcript.
    fn session(root: &Path, input: &str) -> (String, ShellError) {
        let transcript = MemWriter::new();
        let mut console = MemConsole::with_output(input, transcript.clone());
        let mut out = transcript.clone();
        let mut sh = Interpreter::with_builtins(test_env(root));
        let Err(err) = sh.repl(&mut console, &mut out);
        (transcript.contents(), err)
    }

    #[test]
    fn test_unknown_command_is_silent() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        let mut out = Vec::new();

        assert_eq!(sh.execute_line("frobnicate now", &mut out).unwrap(), None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_names_match_exactly() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        let mut out = Vec::new();

        assert_eq!(sh.execute_line("echoes x", &mut out).unwrap(), None);
        assert_eq!(sh.execute_line("ECHO x", &mut out).unwrap(), None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_argv_is_noop() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        let mut out = Vec::new();

        let argv = tokenize(" \t ").unwrap();
        assert_eq!(sh.dispatch(&argv, &mut out).unwrap(), None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::new(
            test_env(dir.path()),
            vec![
                Box::new(Factory::<Echo>::default()),
                Box::new(Factory::<Echo>::default()),
            ],
        );
        let mut out = Vec::new();
        assert_eq!(sh.run("echo", &["once"], &mut out).unwrap(), Some(0));
        assert_eq!(out, b"once\n");
        assert_eq!(sh.env().commands.len(), 2);
    }

    #[test]
    fn test_every_table_entry_is_reachable() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        let names: Vec<&str> = sh.env().commands.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "echo", "led", "threads", "memtest", "oncore", "ps", "help", "pwd", "cd", "ls",
                "cat", "wc", "grep", "mkdir"
            ]
        );
        for name in names {
            let mut out = Vec::new();
            assert_eq!(sh.run(name, &["--help"], &mut out).unwrap(), Some(0));
        }
    }

    #[test]
    fn test_startup_spawns_programs() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        sh.startup(&["hello".to_string(), String::new(), "byebye".to_string()]);

        let mut out = Vec::new();
        sh.execute_line("ps", &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("1       hello\n"));
        assert!(s.contains("2       byebye\n"));
    }

    #[test]
    fn test_grep_end_to_end() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file.txt"), "abc\nxab\nxyz\n").unwrap();

        let (transcript, err) = session(dir.path(), "grep ab file.txt\r");
        assert!(matches!(err, ShellError::ConsoleClosed));
        assert_eq!(transcript, "$bash> grep ab file.txt\nabc\nxab\n$bash> ");
    }

    #[test]
    fn test_session_with_editing_and_state() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/readme"), "Hello World").unwrap();

        let input = "\r  \rcd docs\rpwd\rcat readmx\x7fe\rnope\r";
        let (transcript, _) = session(dir.path(), input);
        assert_eq!(
            transcript,
            "$bash> \n\
             $bash>   \n\
             $bash> cd docs\n\
             $bash> pwd\n/docs/\n\
             $bash> cat readmx\x08 \x08e\nHello World\n\
             $bash> nope\n\
             $bash> "
        );
    }

    #[test]
    fn test_long_line_crosses_growth_boundary() {
        let dir = tempdir().unwrap();
        let words: Vec<String> = (0..20).map(|i| format!("word{}", i)).collect();
        let line = format!("echo {}", words.join(" "));

        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        sh.configure(&ShellConfig {
            line_capacity: 2,
            arg_capacity: 1,
            ..ShellConfig::default()
        });
        let transcript = MemWriter::new();
        let mut console = MemConsole::with_output(format!("{}\r", line), transcript.clone());
        let mut out = transcript.clone();
        let Err(err) = sh.repl(&mut console, &mut out);
        assert!(matches!(err, ShellError::ConsoleClosed));
        assert!(transcript.contents().contains(&format!("\n{}\n", words.join(" "))));
    }

    #[test]
    fn test_console_read_failure_ends_loop() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        let mut console = StdConsole::new(BrokenInput { interrupted: true }, Vec::new(), true);
        let mut out = Vec::new();
        let Err(err) = sh.repl(&mut console, &mut out);
        assert!(matches!(err, ShellError::ConsoleRead(_)));
        assert_eq!(out, b"$bash> ");
    }

    #[test]
    fn test_children_reaped_after_each_line() {
        let dir = tempdir().unwrap();
        let processes = FakeProcesses::default();
        let reaped = processes.reaped.clone();
        let env = Environment::with_services(
            RootFs::new(dir.path()),
            Box::new(processes),
            Box::new(SimulatedLed::default()),
            DEFAULT_WD_CAPACITY,
        )
        .unwrap();
        let mut sh = Interpreter::with_builtins(env);
        let mut console = MemConsole::new("pwd\r\rnope\r");
        let mut out = Vec::new();
        let Err(err) = sh.repl(&mut console, &mut out);
        assert!(matches!(err, ShellError::ConsoleClosed));
        assert_eq!(reaped.get(), 3);
    }

    #[test]
    fn test_custom_prompt() {
        let dir = tempdir().unwrap();
        let mut sh = Interpreter::with_builtins(test_env(dir.path()));
        sh.configure(&ShellConfig {
            prompt: "> ".to_string(),
            ..ShellConfig::default()
        });
        let mut console = MemConsole::new("");
        let mut out = Vec::new();
        let Err(err) = sh.repl(&mut console, &mut out);
        assert!(matches!(err, ShellError::ConsoleClosed));
        assert_eq!(out, b"> ");
    }
}
