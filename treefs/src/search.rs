use std::str::SplitTerminator;

/// Lazy filter over the lines of a file's content.
///
/// Lines are split on `\n`; a trailing newline does not produce an extra
/// empty line. Matching is a literal substring test, no pattern syntax.
#[derive(Debug, Clone)]
pub struct LineMatches<'a> {
	lines: SplitTerminator<'a, char>,
	pattern: &'a str,
}

impl<'a> LineMatches<'a> {
	pub fn new(text: &'a str, pattern: &'a str) -> Self {
		Self {
			lines: text.split_terminator('\n'),
			pattern,
		}
	}
}

impl<'a> Iterator for LineMatches<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		let pattern = self.pattern;
		self.lines.find(|line| line.contains(pattern))
	}
}
