// ---------------------------------------------------------------------------
// Line-oriented command shell over a FileSystem
// ---------------------------------------------------------------------------
//
// One command per line, tokens split on whitespace. Blank lines are skipped,
// malformed lines get a fixed reply, and operation failures print the error
// and leave the tree untouched. End of input behaves like `exit`.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::error::VfsError;
use crate::namespace::FileSystem;
use crate::path::CURRENT_DIR;

pub const PROMPT: &str = "Enter command (or 'exit' to quit): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid command. Try again.")]
pub struct InvalidCommand;

#[derive(Debug, Error)]
enum ShellError {
	#[error(transparent)]
	Vfs(#[from] VfsError),
	#[error(transparent)]
	Io(#[from] io::Error),
}

// ── Commands ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
	Ls(&'a str),
	Mkdir(&'a str),
	Cd(&'a str),
	Grep { pattern: &'a str, file: &'a str },
	Cat(&'a str),
	Touch(&'a str),
	/// Words between the verb and the last token, joined by single spaces.
	Echo { content: String, file: &'a str },
	Mv { src: &'a str, dst: &'a str },
	Cp { src: &'a str, dst: &'a str },
	Rm(&'a str),
	Pwd,
	Tree(&'a str),
	Exit,
}

impl<'a> Command<'a> {
	/// Parse one input line. `Ok(None)` means the line was blank.
	pub fn parse(line: &'a str) -> Result<Option<Self>, InvalidCommand> {
		let tokens: Vec<&str> = line.split_whitespace().collect();
		let Some((&verb, args)) = tokens.split_first() else {
			return Ok(None);
		};

		let command = match (verb, args) {
			("ls", &[]) => Self::Ls(CURRENT_DIR),
			("ls", &[path]) => Self::Ls(path),
			("tree", &[]) => Self::Tree(CURRENT_DIR),
			("tree", &[path]) => Self::Tree(path),
			("mkdir", &[name]) => Self::Mkdir(name),
			("touch", &[name]) => Self::Touch(name),
			("cd", &[path]) => Self::Cd(path),
			("cat", &[file]) => Self::Cat(file),
			("rm", &[path]) => Self::Rm(path),
			("grep", &[pattern, file]) => Self::Grep { pattern, file },
			("mv", &[src, dst]) => Self::Mv { src, dst },
			("cp", &[src, dst]) => Self::Cp { src, dst },
			("echo", &[ref words @ .., file]) => Self::Echo {
				content: words.join(" "),
				file,
			},
			("pwd", &[]) => Self::Pwd,
			("exit", &[]) => Self::Exit,
			_ => return Err(InvalidCommand),
		};
		Ok(Some(command))
	}
}

// ── Shell ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Exit,
}

pub struct Shell<W: Write> {
	fs: FileSystem,
	out: W,
	prompt: bool,
}

impl<W: Write> Shell<W> {
	pub fn new(fs: FileSystem, out: W) -> Self {
		Self {
			fs,
			out,
			prompt: false,
		}
	}

	/// Print [`PROMPT`] before every read. Meant for interactive terminals.
	pub fn with_prompt(mut self, prompt: bool) -> Self {
		self.prompt = prompt;
		self
	}

	pub fn filesystem(&self) -> &FileSystem {
		&self.fs
	}

	pub fn into_inner(self) -> (FileSystem, W) {
		(self.fs, self.out)
	}

	/// Read and execute commands until `exit` or end of input.
	///
	/// Only failures of the underlying reader or writer are returned;
	/// command errors are reported on the output and the loop goes on.
	/// A line that is not valid UTF-8 is answered like any other
	/// malformed command.
	pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
		let mut buf = Vec::new();
		loop {
			if self.prompt {
				write!(self.out, "{}", PROMPT)?;
				self.out.flush()?;
			}
			buf.clear();
			if input.read_until(b'\n', &mut buf)? == 0 {
				tracing::debug!("end of input");
				break;
			}
			let flow = match std::str::from_utf8(&buf) {
				Ok(line) => self.execute(line)?,
				Err(e) => {
					tracing::debug!(error = %e, "input line is not utf-8");
					writeln!(self.out, "{}", InvalidCommand)?;
					Flow::Continue
				}
			};
			if flow == Flow::Exit {
				break;
			}
		}
		self.out.flush()
	}

	pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
		let command = match Command::parse(line) {
			Ok(Some(command)) => command,
			Ok(None) => return Ok(Flow::Continue),
			Err(e) => {
				tracing::debug!(line = %line.trim(), "rejected command");
				writeln!(self.out, "{}", e)?;
				return Ok(Flow::Continue);
			}
		};
		if command == Command::Exit {
			return Ok(Flow::Exit);
		}

		match self.apply(command) {
			Ok(()) => Ok(Flow::Continue),
			Err(ShellError::Vfs(e)) => {
				tracing::debug!(code = e.code(), error = %e, "command failed");
				writeln!(self.out, "{}", e)?;
				Ok(Flow::Continue)
			}
			Err(ShellError::Io(e)) => Err(e),
		}
	}

	fn apply(&mut self, command: Command<'_>) -> Result<(), ShellError> {
		match command {
			Command::Ls(path) => {
				let names = self.fs.ls(path)?;
				writeln!(self.out, "{}", names.join(" "))?;
			}
			Command::Tree(path) => {
				let outline = self.fs.tree_view(path)?;
				writeln!(self.out, "{}", outline)?;
			}
			Command::Mkdir(name) => self.fs.mkdir(name)?,
			Command::Touch(name) => self.fs.touch(name)?,
			Command::Cd(path) => self.fs.cd(path)?,
			Command::Cat(file) => {
				let content = self.fs.cat(file)?;
				writeln!(self.out, "{}", content)?;
			}
			Command::Echo { content, file } => self.fs.echo(&content, file)?,
			Command::Grep { pattern, file } => {
				for line in self.fs.grep(pattern, file)? {
					writeln!(self.out, "{}", line)?;
				}
			}
			Command::Rm(path) => self.fs.rm(path)?,
			Command::Cp { src, dst } => self.fs.cp(src, dst)?,
			Command::Mv { src, dst } => self.fs.mv(src, dst)?,
			Command::Pwd => writeln!(self.out, "{}", self.fs.pwd())?,
			Command::Exit => {}
		}
		Ok(())
	}
}

/// Ask a single question and return the trimmed answer. End of input
/// yields an empty answer; invalid UTF-8 is replaced rather than rejected.
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
	write!(out, "{}", question)?;
	out.flush()?;
	let mut answer = Vec::new();
	input.read_until(b'\n', &mut answer)?;
	Ok(String::from_utf8_lossy(&answer).trim().to_string())
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	fn run_script(script: &str) -> (FileSystem, String) {
		let mut shell = Shell::new(FileSystem::new(), Vec::new());
		shell.run(Cursor::new(script)).unwrap();
		let (fs, out) = shell.into_inner();
		(fs, String::from_utf8(out).unwrap())
	}

	// ── Parsing ──────────────────────────────────────────────────────────

	#[test]
	fn blank_lines_parse_to_nothing() {
		assert_eq!(Command::parse(""), Ok(None));
		assert_eq!(Command::parse("   \t "), Ok(None));
	}

	#[test]
	fn parses_each_verb() {
		assert_eq!(Command::parse("ls"), Ok(Some(Command::Ls("."))));
		assert_eq!(Command::parse("ls docs"), Ok(Some(Command::Ls("docs"))));
		assert_eq!(Command::parse("tree"), Ok(Some(Command::Tree("."))));
		assert_eq!(Command::parse("mkdir a"), Ok(Some(Command::Mkdir("a"))));
		assert_eq!(Command::parse("touch f"), Ok(Some(Command::Touch("f"))));
		assert_eq!(Command::parse("cd .."), Ok(Some(Command::Cd(".."))));
		assert_eq!(Command::parse("cat f"), Ok(Some(Command::Cat("f"))));
		assert_eq!(Command::parse("rm f"), Ok(Some(Command::Rm("f"))));
		assert_eq!(
			Command::parse("grep foo f"),
			Ok(Some(Command::Grep {
				pattern: "foo",
				file: "f"
			}))
		);
		assert_eq!(
			Command::parse("mv a b"),
			Ok(Some(Command::Mv { src: "a", dst: "b" }))
		);
		assert_eq!(
			Command::parse("cp a b"),
			Ok(Some(Command::Cp { src: "a", dst: "b" }))
		);
		assert_eq!(Command::parse("pwd"), Ok(Some(Command::Pwd)));
		assert_eq!(Command::parse("exit"), Ok(Some(Command::Exit)));
	}

	#[test]
	fn echo_joins_words_before_the_file() {
		assert_eq!(
			Command::parse("echo  hello   big world f.txt"),
			Ok(Some(Command::Echo {
				content: "hello big world".to_string(),
				file: "f.txt"
			}))
		);
		assert_eq!(
			Command::parse("echo f.txt"),
			Ok(Some(Command::Echo {
				content: String::new(),
				file: "f.txt"
			}))
		);
	}

	#[test]
	fn wrong_arity_and_unknown_verbs_are_invalid() {
		for line in [
			"mkdir",
			"mkdir a b",
			"cd",
			"grep foo",
			"mv a",
			"cp a b c",
			"echo",
			"pwd now",
			"exit 1",
			"ls a b",
			"format c:",
		] {
			assert_eq!(Command::parse(line), Err(InvalidCommand), "{line}");
		}
	}

	// ── Execution ────────────────────────────────────────────────────────

	#[test]
	fn session_transcript() {
		let (fs, out) = run_script(
			"mkdir a\n\
			 cd a\n\
			 touch f.txt\n\
			 echo hello world f.txt\n\
			 cat f.txt\n\
			 cd ..\n\
			 mv a b\n\
			 mkdir b\n\
			 mv a b\n\
			 ls\n\
			 ls b\n\
			 exit\n\
			 mkdir never\n",
		);
		assert_eq!(out, "hello world\nNot found: b\nb\na\n");
		assert!(fs.ls("b/a").unwrap_err().is_not_found());
		assert!(fs.ls("never").unwrap_err().is_not_found());
	}

	#[test]
	fn invalid_lines_get_fixed_reply() {
		let (_, out) = run_script("bogus\n\nmkdir\n");
		assert_eq!(out, "Invalid command. Try again.\nInvalid command. Try again.\n");
	}

	#[test]
	fn errors_are_printed_and_loop_continues() {
		let (fs, out) = run_script("cat missing\nmkdir a\nmkdir a\ncd a\npwd\n");
		assert_eq!(
			out,
			"Not found: missing\nName collision: a already exists in /\n/a\n"
		);
		assert_eq!(fs.pwd(), "/a");
	}

	#[test]
	fn grep_prints_each_matching_line() {
		let mut fs = FileSystem::new();
		fs.touch("notes").unwrap();
		fs.echo("foo\nfoobar\nbaz", "notes").unwrap();
		let mut shell = Shell::new(fs, Vec::new());
		shell.execute("grep foo notes").unwrap();
		shell.execute("grep zzz notes").unwrap();
		let (_, out) = shell.into_inner();
		assert_eq!(String::from_utf8(out).unwrap(), "foo\nfoobar\n");
	}

	#[test]
	fn exit_stops_execution() {
		let mut shell = Shell::new(FileSystem::new(), Vec::new());
		assert_eq!(shell.execute("exit").unwrap(), Flow::Exit);
		assert_eq!(shell.execute("  ").unwrap(), Flow::Continue);
		assert_eq!(shell.execute("mkdir a").unwrap(), Flow::Continue);
	}

	#[test]
	fn end_of_input_ends_the_loop() {
		let (fs, out) = run_script("mkdir a\nmkdir b");
		assert_eq!(out, "");
		assert_eq!(fs.ls(".").unwrap(), vec!["a", "b"]);
	}

	#[test]
	fn prompt_is_written_per_read() {
		let mut shell = Shell::new(FileSystem::new(), Vec::new()).with_prompt(true);
		shell.run(Cursor::new("pwd\n")).unwrap();
		let (_, out) = shell.into_inner();
		assert_eq!(out, format!("{PROMPT}/\n{PROMPT}").into_bytes());
	}

	#[test]
	fn tree_prints_outline() {
		let (_, out) = run_script("mkdir a\ncd a\ntouch f\ncd ..\ntree\n");
		assert_eq!(out, "/\n\u{2514}\u{2500}\u{2500} a/\n    \u{2514}\u{2500}\u{2500} f (0 bytes)\n");
	}

	#[test]
	fn non_utf8_line_is_rejected_and_loop_continues() {
		let mut shell = Shell::new(FileSystem::new(), Vec::new());
		let script: &[u8] = b"mkdir keep\necho \xff\xfe x\nls\nexit\n";
		shell.run(Cursor::new(script)).unwrap();
		let (fs, out) = shell.into_inner();
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"Invalid command. Try again.\nkeep\n"
		);
		assert_eq!(fs.ls(".").unwrap(), vec!["keep"]);
	}

	#[test]
	fn ask_replaces_invalid_utf8() {
		let mut out = Vec::new();
		let mut input = Cursor::new(b"st\xffate\n".to_vec());
		assert_eq!(ask(&mut input, &mut out, "? ").unwrap(), "st\u{FFFD}ate");
	}

	#[test]
	fn ask_trims_and_handles_eof() {
		let mut out = Vec::new();
		let mut input = Cursor::new("  state.txt \nsecond\n");
		assert_eq!(ask(&mut input, &mut out, "Path? ").unwrap(), "state.txt");
		assert_eq!(ask(&mut input, &mut out, "Path? ").unwrap(), "second");
		assert_eq!(ask(&mut input, &mut out, "Path? ").unwrap(), "");
		assert_eq!(out, b"Path? Path? Path? ".to_vec());
	}
}
