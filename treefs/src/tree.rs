// ---------------------------------------------------------------------------
// Arena-backed directory tree
// ---------------------------------------------------------------------------
//
// Every node lives in a slot of `slots`. A directory owns its children through
// its `children` list of ids; `parent` is only a back-reference. Freeing a slot
// takes the node out, so any id still pointing at it resolves to `None`
// until `compact` rebuilds the arena and renumbers what is left.
// Copy, removal and walks use explicit work lists instead of recursion.
// ---------------------------------------------------------------------------

use std::collections::{HashMap, VecDeque};

use crate::error::VfsError;
use crate::node::{Node, NodeId, NodeKind};
use crate::path::{join_path, PathToken, ROOT_NAME};

#[derive(Debug, Clone)]
pub struct Tree {
	slots: Vec<Option<Node>>,
	root: NodeId,
	live: usize,
}

impl Default for Tree {
	fn default() -> Self {
		Self::new()
	}
}

impl Tree {
	/// A tree holding only the root directory `/`.
	pub fn new() -> Self {
		Self {
			slots: vec![Some(Node::directory(ROOT_NAME))],
			root: NodeId(0),
			live: 1,
		}
	}

	#[inline]
	pub fn root(&self) -> NodeId {
		self.root
	}

	/// Number of live nodes, root included.
	#[inline]
	pub fn len(&self) -> usize {
		self.live
	}

	/// Always false: the root is never freed.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.live == 0
	}

	/// Slots left behind by removed nodes and not yet reclaimed.
	#[inline]
	pub fn dead_slots(&self) -> usize {
		self.slots.len() - self.live
	}

	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.slots.get(id.0).and_then(Option::as_ref)
	}

	pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.slots.get_mut(id.0).and_then(Option::as_mut)
	}

	fn node(&self, id: NodeId) -> Result<&Node, VfsError> {
		self.get(id).ok_or_else(|| {
			VfsError::InvalidOperation(format!("stale node handle #{}", id.index()))
		})
	}

	/// Store a detached node and return its handle.
	pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.slots.len());
		self.slots.push(Some(node));
		self.live += 1;
		id
	}

	// -- Lookup -----------------------------------------------------------

	pub fn child_by_name(&self, dir: NodeId, name: &str) -> Option<NodeId> {
		self.get(dir)?
			.children()
			.iter()
			.copied()
			.find(|child| self.get(*child).is_some_and(|n| n.name == name))
	}

	/// Resolve a single path token against `start`.
	///
	/// `..` at the root yields the root itself.
	pub fn resolve(&self, start: NodeId, token: &str) -> Option<NodeId> {
		let node = self.get(start)?;
		match PathToken::parse(token) {
			PathToken::Current => Some(start),
			PathToken::Parent => Some(node.parent.unwrap_or(self.root)),
			PathToken::Root => Some(self.root),
			PathToken::Name(name) => self.child_by_name(start, name),
		}
	}

	pub fn full_path(&self, id: NodeId) -> String {
		let mut names: Vec<&str> = Vec::new();
		let mut cursor = Some(id);
		while let Some(current) = cursor {
			let Some(node) = self.get(current) else {
				break;
			};
			if current == self.root {
				break;
			}
			names.push(&node.name);
			cursor = node.parent;
		}
		names.reverse();
		join_path(&names)
	}

	/// True when `ancestor` lies on the parent chain of `id`.
	pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
		let mut cursor = self.get(id).and_then(Node::parent);
		while let Some(current) = cursor {
			if current == ancestor {
				return true;
			}
			cursor = self.get(current).and_then(Node::parent);
		}
		false
	}

	/// Ids of `from` and all its descendants, directory before children,
	/// children in insertion order.
	pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
		let mut order = Vec::new();
		let mut stack = vec![from];
		while let Some(id) = stack.pop() {
			let Some(node) = self.get(id) else {
				continue;
			};
			order.push(id);
			stack.extend(node.children().iter().rev().copied());
		}
		order
	}

	// -- Ownership --------------------------------------------------------

	fn link(&mut self, dir: NodeId, child: NodeId) {
		if let Some(Node {
			kind: NodeKind::Directory { children },
			..
		}) = self.get_mut(dir)
		{
			children.push(child);
		}
		if let Some(node) = self.get_mut(child) {
			node.parent = Some(dir);
		}
	}

	/// Insert a detached node into `dir`, setting its back-reference.
	pub fn attach(&mut self, dir: NodeId, child: NodeId) -> Result<(), VfsError> {
		let child_node = self.node(child)?;
		if child_node.parent.is_some() || child == self.root {
			return Err(VfsError::InvalidOperation(format!(
				"{} is already attached",
				self.full_path(child)
			)));
		}
		let name = child_node.name.clone();
		let has_children = !child_node.children().is_empty();

		if !self.node(dir)?.is_directory() {
			return Err(VfsError::NotADirectory(self.full_path(dir)));
		}
		if child == dir || (has_children && self.is_ancestor(child, dir)) {
			return Err(VfsError::InvalidOperation(format!(
				"cannot place {} inside itself",
				name
			)));
		}
		if self.child_by_name(dir, &name).is_some() {
			return Err(VfsError::NameCollision(format!(
				"{} already exists in {}",
				name,
				self.full_path(dir)
			)));
		}

		self.link(dir, child);
		Ok(())
	}

	/// Take a node out of its parent's children. The subtree stays allocated.
	pub fn detach(&mut self, child: NodeId) -> Result<(), VfsError> {
		let parent = self.node(child)?.parent.ok_or_else(|| {
			VfsError::InvalidOperation(format!(
				"{} has no parent to detach from",
				self.full_path(child)
			))
		})?;
		if let Some(Node {
			kind: NodeKind::Directory { children },
			..
		}) = self.get_mut(parent)
		{
			children.retain(|c| *c != child);
		}
		if let Some(node) = self.get_mut(child) {
			node.parent = None;
		}
		Ok(())
	}

	/// Detach `id` and free it together with every descendant.
	///
	/// Returns the number of nodes freed.
	pub fn remove(&mut self, id: NodeId) -> Result<usize, VfsError> {
		if id == self.root {
			return Err(VfsError::InvalidOperation(
				"cannot remove the root directory".to_string(),
			));
		}
		if self.node(id)?.parent.is_some() {
			self.detach(id)?;
		}

		let mut freed = 0;
		let mut stack = vec![id];
		while let Some(next) = stack.pop() {
			let Some(node) = self.slots.get_mut(next.0).and_then(Option::take) else {
				continue;
			};
			if let NodeKind::Directory { children } = node.kind {
				stack.extend(children);
			}
			freed += 1;
		}
		self.live -= freed;
		Ok(freed)
	}

	/// Rebuild the arena in pre-order without freed slots and return the new
	/// id of `keep`.
	///
	/// Every other id handed out before the call is invalidated, and nodes not
	/// reachable from the root are dropped.
	pub fn compact(&mut self, keep: NodeId) -> Result<NodeId, VfsError> {
		let order = self.preorder(self.root);
		let remap: HashMap<NodeId, NodeId> = order
			.iter()
			.enumerate()
			.map(|(index, id)| (*id, NodeId(index)))
			.collect();
		let kept = remap.get(&keep).copied().ok_or_else(|| {
			VfsError::InvalidOperation(format!(
				"node #{} is not reachable from the root",
				keep.index()
			))
		})?;

		let mut slots = Vec::with_capacity(order.len());
		for id in &order {
			let node = self.slots.get_mut(id.0).and_then(Option::take).map(|mut node| {
				node.parent = node.parent.and_then(|p| remap.get(&p).copied());
				if let NodeKind::Directory { children } = &mut node.kind {
					children.retain_mut(|child| match remap.get(child) {
						Some(moved) => {
							*child = *moved;
							true
						}
						None => false,
					});
				}
				node
			});
			slots.push(node);
		}

		let reclaimed = self.slots.len() - slots.len();
		self.slots = slots;
		self.root = NodeId(0);
		self.live = order.len();
		tracing::debug!(reclaimed, live = self.live, "arena compacted");
		Ok(kept)
	}

	fn shallow_clone(node: &Node) -> Node {
		match &node.kind {
			NodeKind::Directory { .. } => Node::directory(node.name.clone()),
			NodeKind::File { content } => Node::file(node.name.clone(), content.clone()),
		}
	}

	/// Clone the subtree at `src` into freshly allocated, detached nodes.
	///
	/// Children are copied breadth-first so each copied directory receives
	/// its children in the source order.
	pub fn deep_copy(&mut self, src: NodeId) -> Result<NodeId, VfsError> {
		let top = Self::shallow_clone(self.node(src)?);
		let copy_root = self.alloc(top);

		let mut queue = VecDeque::from([(src, copy_root)]);
		while let Some((from, to)) = queue.pop_front() {
			let children = self.node(from)?.children().to_vec();
			for child in children {
				let cloned = Self::shallow_clone(self.node(child)?);
				let cloned_id = self.alloc(cloned);
				self.link(to, cloned_id);
				queue.push_back((child, cloned_id));
			}
		}
		Ok(copy_root)
	}

	// -- Rendering --------------------------------------------------------

	/// Box-drawing outline of the subtree at `from`.
	pub fn render(&self, from: NodeId) -> String {
		let Some(top) = self.get(from) else {
			return String::new();
		};
		let mut lines = vec![if from == self.root {
			ROOT_NAME.to_string()
		} else {
			top.name.clone()
		}];

		let mut stack: Vec<(NodeId, String, bool)> = Vec::new();
		let push_children = |stack: &mut Vec<(NodeId, String, bool)>, node: &Node, prefix: &str| {
			let children = node.children();
			for (i, child) in children.iter().enumerate().rev() {
				stack.push((*child, prefix.to_string(), i == children.len() - 1));
			}
		};
		push_children(&mut stack, top, "");

		while let Some((id, prefix, is_last)) = stack.pop() {
			let Some(node) = self.get(id) else {
				continue;
			};
			let connector = if is_last {
				"\u{2514}\u{2500}\u{2500} "
			} else {
				"\u{251C}\u{2500}\u{2500} "
			};
			match &node.kind {
				NodeKind::Directory { .. } => {
					lines.push(format!("{}{}{}/", prefix, connector, node.name));
				}
				NodeKind::File { content } => {
					lines.push(format!(
						"{}{}{} ({} bytes)",
						prefix,
						connector,
						node.name,
						content.len()
					));
				}
			}
			let child_prefix = if is_last {
				format!("{}    ", prefix)
			} else {
				format!("{}\u{2502}   ", prefix)
			};
			push_children(&mut stack, node, &child_prefix);
		}

		lines.join("\n")
	}
}

/// Structural equality: same names, kinds, contents and child order,
/// regardless of the ids the nodes happen to occupy.
impl PartialEq for Tree {
	fn eq(&self, other: &Self) -> bool {
		let ours = self.preorder(self.root);
		let theirs = other.preorder(other.root);
		if ours.len() != theirs.len() {
			return false;
		}
		ours.iter().zip(theirs.iter()).all(|(a, b)| {
			match (self.get(*a), other.get(*b)) {
				(Some(x), Some(y)) => {
					x.name == y.name
						&& x.children().len() == y.children().len()
						&& x.content() == y.content()
						&& x.is_directory() == y.is_directory()
				}
				_ => false,
			}
		})
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
