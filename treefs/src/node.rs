// ---------------------------------------------------------------------------
// Node model: closed {Directory, File} variant set stored in the tree arena
// ---------------------------------------------------------------------------

/// Handle to a node slot in the tree arena.
///
/// Allocation never reuses an id, so a handle to a freed node resolves to
/// nothing instead of aliasing a newer node. `Tree::compact` renumbers every
/// live node and invalidates older handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	#[inline]
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Directory { children: Vec<NodeId> },
	File { content: String },
}

impl NodeKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Directory { .. } => "directory",
			Self::File { .. } => "file",
		}
	}
}

/// A node in the tree.
///
/// `parent` is a back-reference only: ownership flows from a directory's
/// `children` list, never through `parent`.
#[derive(Debug, Clone)]
pub struct Node {
	pub(crate) name: String,
	pub(crate) parent: Option<NodeId>,
	pub(crate) kind: NodeKind,
}

impl Node {
	pub(crate) fn directory(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			kind: NodeKind::Directory {
				children: Vec::new(),
			},
		}
	}

	pub(crate) fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			kind: NodeKind::File {
				content: content.into(),
			},
		}
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	#[inline]
	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	#[inline]
	pub fn is_directory(&self) -> bool {
		matches!(self.kind, NodeKind::Directory { .. })
	}

	#[inline]
	pub fn is_file(&self) -> bool {
		matches!(self.kind, NodeKind::File { .. })
	}

	/// Children in insertion order; empty for files.
	pub fn children(&self) -> &[NodeId] {
		match &self.kind {
			NodeKind::Directory { children } => children,
			NodeKind::File { .. } => &[],
		}
	}

	/// File content, or `None` for directories.
	pub fn content(&self) -> Option<&str> {
		match &self.kind {
			NodeKind::File { content } => Some(content),
			NodeKind::Directory { .. } => None,
		}
	}
}
