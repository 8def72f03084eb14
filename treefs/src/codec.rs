// ---------------------------------------------------------------------------
// Text persistence format
// ---------------------------------------------------------------------------
//
// One record per node, pre-order (a directory precedes its children,
// children appear in insertion order):
//
//   Directory: <name> <parent-path|null>
//   File: <name> <parent-path>
//   <escaped content>
//
// `null` marks the root, which is always `Directory: / null` on the first
// line. Parents are referenced by full path, so the decoder can re-link every
// node into the right directory even when names repeat across the tree.
// Content is kept on a single line: `\` becomes `\\`, LF `\n`, CR `\r`.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use thiserror::Error;

use crate::node::{Node, NodeId, NodeKind};
use crate::path::{join_path, validate_name, NameLimits, ROOT_NAME, SEPARATOR};
use crate::tree::Tree;

const DIRECTORY_TAG: &str = "Directory:";
const FILE_TAG: &str = "File:";
const NULL_PARENT: &str = "null";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("state is empty")]
	Empty,
	#[error("line {line}: unrecognised record: {text}")]
	UnknownRecord { line: usize, text: String },
	#[error("line {line}: expected the root record `Directory: / null`")]
	MissingRoot { line: usize },
	#[error("line {line}: duplicate root record")]
	DuplicateRoot { line: usize },
	#[error("line {line}: parent directory {parent} was not declared earlier")]
	UnknownParent { line: usize, parent: String },
	#[error("line {line}: file record has no content line")]
	MissingContent { line: usize },
	#[error("line {line}: {reason}")]
	Malformed { line: usize, reason: String },
}

// ---------------------------------------------------------------------------
// Content escaping
// ---------------------------------------------------------------------------

pub fn escape_content(content: &str) -> String {
	let mut out = String::with_capacity(content.len());
	for c in content.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			other => out.push(other),
		}
	}
	out
}

/// Reverse of [`escape_content`]. Returns the offending sequence on error.
pub fn unescape_content(line: &str) -> Result<String, String> {
	let mut out = String::with_capacity(line.len());
	let mut chars = line.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('\\') => out.push('\\'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some(other) => return Err(format!("unknown escape \\{}", other)),
			None => return Err("dangling escape at end of content".to_string()),
		}
	}
	Ok(out)
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Serialize the whole tree, root first.
pub fn encode(tree: &Tree) -> String {
	let mut out = String::new();
	let mut dir_paths: HashMap<NodeId, String> = HashMap::new();

	for id in tree.preorder(tree.root()) {
		let Some(node) = tree.get(id) else {
			continue;
		};
		let parent_path = node.parent().and_then(|p| dir_paths.get(&p)).cloned();

		match (node.kind(), parent_path) {
			(NodeKind::Directory { .. }, None) => {
				out.push_str(&format!("{} {} {}\n", DIRECTORY_TAG, ROOT_NAME, NULL_PARENT));
				dir_paths.insert(id, ROOT_NAME.to_string());
			}
			(NodeKind::Directory { .. }, Some(parent)) => {
				out.push_str(&format!("{} {} {}\n", DIRECTORY_TAG, node.name(), parent));
				dir_paths.insert(id, child_path(&parent, node.name()));
			}
			(NodeKind::File { content }, parent) => {
				let parent = parent.unwrap_or_else(|| ROOT_NAME.to_string());
				out.push_str(&format!("{} {} {}\n", FILE_TAG, node.name(), parent));
				out.push_str(&escape_content(content));
				out.push('\n');
			}
		}
	}
	out
}

fn child_path(parent: &str, name: &str) -> String {
	if parent == ROOT_NAME {
		join_path(&[name])
	} else {
		format!("{}{}{}", parent, SEPARATOR, name)
	}
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

enum Record<'a> {
	Directory { name: &'a str, parent: Option<&'a str> },
	File { name: &'a str, parent: &'a str },
}

fn parse_record(line_no: usize, line: &str) -> Result<Record<'_>, CodecError> {
	let unknown = || CodecError::UnknownRecord {
		line: line_no,
		text: line.to_string(),
	};
	let tokens: Vec<&str> = line.split_whitespace().collect();
	let [tag, name, parent] = tokens[..] else {
		return Err(unknown());
	};
	match tag {
		DIRECTORY_TAG => Ok(Record::Directory {
			name,
			parent: (parent != NULL_PARENT).then_some(parent),
		}),
		FILE_TAG if parent == NULL_PARENT => Err(CodecError::Malformed {
			line: line_no,
			reason: format!("file {} cannot be the root", name),
		}),
		FILE_TAG => Ok(Record::File { name, parent }),
		_ => Err(unknown()),
	}
}

/// Rebuild a tree from [`encode`] output, checking names against the
/// default [`NameLimits`].
pub fn decode(text: &str) -> Result<Tree, CodecError> {
	decode_with_limits(text, &NameLimits::default())
}

/// Rebuild a tree from [`encode`] output.
///
/// Each decoded node is attached into its parent's children, so the result
/// is fully navigable. Any inconsistency aborts the whole decode.
pub fn decode_with_limits(text: &str, limits: &NameLimits) -> Result<Tree, CodecError> {
	let mut tree: Option<Tree> = None;
	let mut dirs: HashMap<String, NodeId> = HashMap::new();
	let mut lines = text.lines().enumerate().map(|(idx, line)| (idx + 1, line));

	while let Some((line_no, line)) = lines.next() {
		if line.trim().is_empty() {
			continue;
		}
		let record = parse_record(line_no, line)?;

		let (name, parent, node) = match record {
			Record::Directory { name, parent: None } => {
				if tree.is_some() {
					return Err(CodecError::DuplicateRoot { line: line_no });
				}
				if name != ROOT_NAME {
					return Err(CodecError::MissingRoot { line: line_no });
				}
				let fresh = Tree::new();
				dirs.insert(ROOT_NAME.to_string(), fresh.root());
				tree = Some(fresh);
				continue;
			}
			Record::Directory {
				name,
				parent: Some(parent),
			} => (name, parent, Node::directory(name)),
			Record::File { name, parent } => {
				let (_, content_line) = lines
					.next()
					.ok_or(CodecError::MissingContent { line: line_no })?;
				let content = unescape_content(content_line).map_err(|reason| {
					CodecError::Malformed {
						line: line_no + 1,
						reason,
					}
				})?;
				(name, parent, Node::file(name, content))
			}
		};

		let tree = tree
			.as_mut()
			.ok_or(CodecError::MissingRoot { line: line_no })?;
		if let Some(reason) = validate_name(name, limits) {
			return Err(CodecError::Malformed {
				line: line_no,
				reason,
			});
		}
		let parent_id = *dirs.get(parent).ok_or_else(|| CodecError::UnknownParent {
			line: line_no,
			parent: parent.to_string(),
		})?;

		let is_directory = node.is_directory();
		let id = tree.alloc(node);
		tree.attach(parent_id, id)
			.map_err(|e| CodecError::Malformed {
				line: line_no,
				reason: e.to_string(),
			})?;
		if is_directory {
			dirs.insert(child_path(parent, name), id);
		}
	}

	let tree = tree.ok_or(CodecError::Empty)?;
	tracing::debug!(nodes = tree.len(), "decoded state");
	Ok(tree)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
