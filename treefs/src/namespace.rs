// ---------------------------------------------------------------------------
// FileSystem: root tree plus a current-directory cursor
// ---------------------------------------------------------------------------
//
// Every path argument is a single token resolved against the cursor. Each
// operation validates fully before it mutates, so a returned error always
// means the tree is unchanged.
// ---------------------------------------------------------------------------

use std::path::Path;

use crate::codec::{decode_with_limits, encode};
use crate::error::VfsError;
use crate::node::{Node, NodeId, NodeKind};
use crate::path::{validate_name, NameLimits};
use crate::search::LineMatches;
use crate::tree::Tree;

/// Freed arena slots tolerated before `rm` compacts the tree.
const COMPACT_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
pub struct FileSystem {
	tree: Tree,
	current: NodeId,
	limits: NameLimits,
}

impl Default for FileSystem {
	fn default() -> Self {
		Self::new()
	}
}

impl FileSystem {
	// -- Constructors -----------------------------------------------------

	pub fn new() -> Self {
		Self::with_limits(NameLimits::default())
	}

	pub fn with_limits(limits: NameLimits) -> Self {
		let tree = Tree::new();
		let current = tree.root();
		Self {
			tree,
			current,
			limits,
		}
	}

	/// Wrap an existing tree, cursor at its root.
	pub fn from_tree(tree: Tree, limits: NameLimits) -> Self {
		let current = tree.root();
		Self {
			tree,
			current,
			limits,
		}
	}

	// -- Accessors --------------------------------------------------------

	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	pub fn current(&self) -> NodeId {
		self.current
	}

	pub fn node_count(&self) -> usize {
		self.tree.len()
	}

	pub fn limits(&self) -> &NameLimits {
		&self.limits
	}

	/// Swap in a whole new tree; the cursor returns to its root.
	pub fn replace_tree(&mut self, tree: Tree) {
		self.current = tree.root();
		self.tree = tree;
	}

	// -- Helpers (private) ------------------------------------------------

	fn resolve(&self, path: &str) -> Result<NodeId, VfsError> {
		self.tree
			.resolve(self.current, path)
			.ok_or_else(|| VfsError::NotFound(path.to_string()))
	}

	fn resolve_node(&self, path: &str) -> Result<(NodeId, &Node), VfsError> {
		let id = self.resolve(path)?;
		let node = self
			.tree
			.get(id)
			.ok_or_else(|| VfsError::NotFound(path.to_string()))?;
		Ok((id, node))
	}

	fn resolve_directory(&self, path: &str) -> Result<NodeId, VfsError> {
		let (id, node) = self.resolve_node(path)?;
		if !node.is_directory() {
			return Err(VfsError::NotADirectory(path.to_string()));
		}
		Ok(id)
	}

	fn resolve_file(&self, path: &str) -> Result<(NodeId, &Node), VfsError> {
		let (id, node) = self.resolve_node(path)?;
		if !node.is_file() {
			return Err(VfsError::NotAFile(path.to_string()));
		}
		Ok((id, node))
	}

	/// Resolve `path` and require it to be a direct child of the cursor.
	fn resolve_child(&self, path: &str, verb: &str) -> Result<NodeId, VfsError> {
		let (id, node) = self.resolve_node(path)?;
		if node.parent() != Some(self.current) {
			return Err(VfsError::InvalidOperation(format!(
				"cannot {} '{}': not an entry of {}",
				verb,
				path,
				self.pwd()
			)));
		}
		Ok(id)
	}

	fn assert_free_name(&self, dir: NodeId, name: &str) -> Result<(), VfsError> {
		if self.tree.child_by_name(dir, name).is_some() {
			return Err(VfsError::NameCollision(format!(
				"{} already exists in {}",
				name,
				self.tree.full_path(dir)
			)));
		}
		Ok(())
	}

	fn create(&mut self, node: Node) -> Result<NodeId, VfsError> {
		if let Some(err) = validate_name(node.name(), &self.limits) {
			return Err(VfsError::InvalidName(err));
		}
		self.assert_free_name(self.current, node.name())?;

		let id = self.tree.alloc(node);
		if let Err(e) = self.tree.attach(self.current, id) {
			self.tree.remove(id)?;
			return Err(e);
		}
		Ok(id)
	}

	// -- Creation ---------------------------------------------------------

	pub fn mkdir(&mut self, name: &str) -> Result<(), VfsError> {
		let id = self.create(Node::directory(name))?;
		tracing::debug!(path = %self.tree.full_path(id), "mkdir");
		Ok(())
	}

	pub fn touch(&mut self, name: &str) -> Result<(), VfsError> {
		let id = self.create(Node::file(name, ""))?;
		tracing::debug!(path = %self.tree.full_path(id), "touch");
		Ok(())
	}

	// -- Navigation -------------------------------------------------------

	pub fn cd(&mut self, path: &str) -> Result<(), VfsError> {
		self.current = self.resolve_directory(path)?;
		Ok(())
	}

	pub fn pwd(&self) -> String {
		self.tree.full_path(self.current)
	}

	/// Child names of a directory, or the file's own name for a file.
	pub fn ls(&self, path: &str) -> Result<Vec<String>, VfsError> {
		let (_, node) = self.resolve_node(path)?;
		match node.kind() {
			NodeKind::Directory { children } => Ok(children
				.iter()
				.filter_map(|child| self.tree.get(*child))
				.map(|child| child.name().to_string())
				.collect()),
			NodeKind::File { .. } => Ok(vec![node.name().to_string()]),
		}
	}

	pub fn tree_view(&self, path: &str) -> Result<String, VfsError> {
		let id = self.resolve_directory(path)?;
		Ok(self.tree.render(id))
	}

	// -- Content ----------------------------------------------------------

	pub fn cat(&self, path: &str) -> Result<&str, VfsError> {
		let (_, node) = self.resolve_file(path)?;
		Ok(node.content().unwrap_or_default())
	}

	/// Overwrite a file's content. The file must already exist.
	pub fn echo(&mut self, content: &str, path: &str) -> Result<(), VfsError> {
		let (id, _) = self.resolve_file(path)?;
		if let Some(Node {
			kind: NodeKind::File { content: existing },
			..
		}) = self.tree.get_mut(id)
		{
			existing.clear();
			existing.push_str(content);
		}
		tracing::debug!(path = %self.tree.full_path(id), size = content.len(), "echo");
		Ok(())
	}

	pub fn grep<'a>(&'a self, pattern: &'a str, path: &str) -> Result<LineMatches<'a>, VfsError> {
		let (_, node) = self.resolve_file(path)?;
		Ok(LineMatches::new(node.content().unwrap_or_default(), pattern))
	}

	// -- Removal, copy, move ----------------------------------------------

	/// Remove an entry of the current directory, recursively.
	pub fn rm(&mut self, path: &str) -> Result<(), VfsError> {
		let id = self.resolve_child(path, "remove")?;
		let full = self.tree.full_path(id);
		let freed = self.tree.remove(id)?;
		tracing::debug!(path = %full, freed, "rm");
		self.reclaim()
	}

	/// Compact the arena once freed slots outnumber live nodes and the
	/// threshold. The cursor is carried over to its new id.
	fn reclaim(&mut self) -> Result<(), VfsError> {
		let dead = self.tree.dead_slots();
		if dead > COMPACT_THRESHOLD && dead > self.tree.len() {
			self.current = self.tree.compact(self.current)?;
		}
		Ok(())
	}

	/// Deep-copy `src` into the directory `dst`.
	pub fn cp(&mut self, src: &str, dst: &str) -> Result<(), VfsError> {
		let (src_id, src_node) = self.resolve_node(src)?;
		let name = src_node.name().to_string();
		let dst_id = self.resolve_directory(dst)?;
		if src_id == self.tree.root() {
			return Err(VfsError::InvalidOperation(
				"cannot copy the root directory".to_string(),
			));
		}
		self.assert_free_name(dst_id, &name)?;

		let copy = self.tree.deep_copy(src_id)?;
		if let Err(e) = self.tree.attach(dst_id, copy) {
			self.tree.remove(copy)?;
			return Err(e);
		}
		tracing::debug!(
			src = %self.tree.full_path(src_id),
			dst = %self.tree.full_path(copy),
			"cp"
		);
		Ok(())
	}

	/// Move an entry of the current directory into the directory `dst`.
	///
	/// This is a relink, not copy-then-delete: node identities survive and a
	/// failure never leaves a duplicate behind.
	pub fn mv(&mut self, src: &str, dst: &str) -> Result<(), VfsError> {
		let src_id = self.resolve_child(src, "move")?;
		let dst_id = self.resolve_directory(dst)?;
		if dst_id == src_id || self.tree.is_ancestor(src_id, dst_id) {
			return Err(VfsError::InvalidOperation(format!(
				"cannot move '{}' into itself",
				src
			)));
		}
		let name = self
			.tree
			.get(src_id)
			.map(|node| node.name().to_string())
			.unwrap_or_default();
		self.assert_free_name(dst_id, &name)?;

		let from = self.tree.full_path(src_id);
		self.tree.detach(src_id)?;
		if let Err(e) = self.tree.attach(dst_id, src_id) {
			self.tree.attach(self.current, src_id)?;
			return Err(e);
		}
		tracing::debug!(src = %from, dst = %self.tree.full_path(src_id), "mv");
		Ok(())
	}

	// -- Persistence ------------------------------------------------------

	pub fn encode(&self) -> String {
		encode(&self.tree)
	}

	pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), VfsError> {
		let path = path.as_ref();
		std::fs::write(path, self.encode())?;
		tracing::info!(path = %path.display(), nodes = self.tree.len(), "state saved");
		Ok(())
	}

	/// Replace the tree with the one stored at `path`. On any error the
	/// current tree is kept.
	pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), VfsError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)?;
		let tree = decode_with_limits(&text, &self.limits)?;
		tracing::info!(path = %path.display(), nodes = tree.len(), "state loaded");
		self.replace_tree(tree);
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
