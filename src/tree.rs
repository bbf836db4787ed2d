/*!
The in-memory directory tree built from a WAD's descriptor list.

A [`Tree`] owns a forest of [`Node`]s rooted at `/` plus a path index. Parsing
(`Tree::from_descriptors`) is the only way to build one from scratch; the
mutation operations in [`crate::Wad`] grow it incrementally afterwards.
*/

use std::collections::HashMap;
use std::fmt;

use crate::codec::{Descriptor, HEADER_LEN};
use crate::dir;
use crate::error::WadError;

/// A sequence of child indices from the root to a node. Appending a new
/// child never invalidates an existing `NodePath`, which is why the tree only
/// ever appends children and never reorders or removes them.
pub(crate) type NodePath = Vec<usize>;

/// A single node in the tree: a namespace directory, a map-marker directory,
/// or a plain file.
#[derive(Debug, Clone)]
pub struct Node {
	/// Canonical full path: `/`-terminated for directories, bare for files.
	pub name: String,
	/// Lump data location; `0, 0` for directories.
	pub offset: u32,
	pub length: u32,
	/// Set for directories synthesized from a map-marker descriptor. Such
	/// directories may not receive further subdirectories or files.
	pub is_map_marker: bool,
	pub children: Vec<Node>,
}

impl Node {
	fn new_dir(name: String) -> Node {
		Node { name, offset: 0, length: 0, is_map_marker: false, children: Vec::new() }
	}

	fn new_file(name: String) -> Node {
		Node { name, offset: 0, length: 0, is_map_marker: false, children: Vec::new() }
	}

	pub fn is_dir(&self) -> bool {
		self.name.ends_with('/')
	}

	pub fn is_file(&self) -> bool {
		!self.is_dir()
	}
}

fn node_at<'a>(root: &'a Node, path: &[usize]) -> &'a Node {
	path.iter().fold(root, |n, &i| &n.children[i])
}

fn node_at_mut<'a>(root: &'a mut Node, path: &[usize]) -> &'a mut Node {
	path.iter().fold(root, |n, &i| &mut n.children[i])
}

/// The parsed directory tree plus its path index.
pub struct Tree {
	pub(crate) root: Node,
	pub(crate) index: HashMap<String, NodePath>,
}

impl Tree {
	/// Runs the namespace parser (see the crate's module docs) over a flat
	/// descriptor list and builds the tree.
	pub(crate) fn from_descriptors(descriptors: &[Descriptor]) -> Result<Tree, WadError> {
		let (root, index) = parse(descriptors)?;
		Ok(Tree { root, index })
	}

	pub fn is_directory(&self, path: &str) -> bool {
		if path.is_empty() || !path.starts_with('/') {
			return false;
		}
		let p = canonical_dir(path);
		self.index.get(&p).map_or(false, |idx| node_at(&self.root, idx).is_dir())
	}

	pub fn is_content(&self, path: &str) -> bool {
		if path.is_empty() || !path.starts_with('/') || path.ends_with('/') {
			return false;
		}
		self.index.get(path).map_or(false, |idx| node_at(&self.root, idx).is_file())
	}

	pub fn get_size(&self, path: &str) -> i64 {
		if !self.is_content(path) {
			return -1;
		}
		node_at(&self.root, &self.index[path]).length as i64
	}

	pub fn get_directory(&self, path: &str) -> Option<Vec<String>> {
		if !self.is_directory(path) {
			return None;
		}
		let p = canonical_dir(path);
		let node = node_at(&self.root, &self.index[&p]);
		Some(node.children.iter().map(|c| dir::last_segment(&c.name)).collect())
	}

	pub(crate) fn node_named(&self, path: &str) -> Option<&Node> {
		self.index.get(path).map(|idx| node_at(&self.root, idx))
	}

	pub(crate) fn insert_directory(&mut self, parent_path: &str, full_path: &str, is_map_marker: bool) {
		let parent_idx = self.index[parent_path].clone();
		let parent = node_at_mut(&mut self.root, &parent_idx);
		let mut node = Node::new_dir(full_path.to_string());
		node.is_map_marker = is_map_marker;
		parent.children.push(node);
		let mut idx = parent_idx;
		idx.push(parent.children.len() - 1);
		self.index.insert(full_path.to_string(), idx);
	}

	pub(crate) fn insert_file(&mut self, parent_path: &str, full_path: &str) {
		let parent_idx = self.index[parent_path].clone();
		let parent = node_at_mut(&mut self.root, &parent_idx);
		parent.children.push(Node::new_file(full_path.to_string()));
		let mut idx = parent_idx;
		idx.push(parent.children.len() - 1);
		self.index.insert(full_path.to_string(), idx);
	}

	pub(crate) fn set_file_location(&mut self, path: &str, offset: u32, length: u32) {
		let idx = self.index[path].clone();
		let node = node_at_mut(&mut self.root, &idx);
		node.offset = offset;
		node.length = length;
	}

	/// Walks the tree and the path index together and reports any violation
	/// of the on-disk invariants that can be detected without re-reading the
	/// file. `descriptor_offset` bounds where lump data may legally end.
	pub fn fsck(&self, descriptor_offset: u32) -> Vec<String> {
		let mut errors = Vec::new();
		fsck_rec(&self.root, descriptor_offset, &mut errors);
		for (path, idx) in &self.index {
			let node = node_at(&self.root, idx);
			if &node.name != path {
				errors.push(format!("index entry {:?} points at node named {:?}", path, node.name));
			}
		}
		errors
	}
}

fn fsck_rec(node: &Node, descriptor_offset: u32, errors: &mut Vec<String>) {
	if node.is_map_marker && node.children.len() != 10 {
		errors.push(format!("{}: map marker directory has {} children, expected 10", node.name, node.children.len()));
	}
	for child in &node.children {
		if node.is_map_marker && child.is_dir() {
			errors.push(format!("{}: directory nested inside a map marker", child.name));
		}
		if child.is_file() && child.length > 0 {
			let end = child.offset as u64 + child.length as u64;
			if child.offset < HEADER_LEN || end > descriptor_offset as u64 {
				errors.push(format!("{}: lump range [{}, {}) is outside the lump-data region", child.name, child.offset, end));
			}
		}
		fsck_rec(child, descriptor_offset, errors);
	}
}

impl fmt::Display for Tree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "/")?;
		fmt_children(f, &self.root, 1)
	}
}

fn fmt_children(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
	for child in &node.children {
		for _ in 0..depth {
			write!(f, "  ")?;
		}
		if child.is_dir() {
			writeln!(f, "{}/", dir::last_segment(&child.name))?;
			fmt_children(f, child, depth + 1)?;
		} else {
			writeln!(f, "{}", dir::last_segment(&child.name))?;
		}
	}
	Ok(())
}

fn canonical_dir(path: &str) -> String {
	if path.ends_with('/') {
		path.to_string()
	} else {
		format!("{}/", path)
	}
}

/// The namespace parser: a single forward pass over `descriptors` with an
/// explicit stack of open directories, initially just the root.
fn parse(descriptors: &[Descriptor]) -> Result<(Node, HashMap<String, NodePath>), WadError> {
	let mut root = Node::new_dir("/".to_string());
	let mut index: HashMap<String, NodePath> = HashMap::new();
	index.insert("/".to_string(), vec![]);
	let mut stack: Vec<NodePath> = vec![vec![]];

	let n = descriptors.len();
	let mut i = 0usize;
	while i < n {
		let desc = &descriptors[i];
		let name = desc.trimmed_name();

		if dir::is_start(&name) {
			let prefix = dir::start_prefix(&name).to_string();
			let parent_path = stack.last().unwrap().clone();
			let parent_name = node_at(&root, &parent_path).name.clone();
			let full_path = format!("{}{}/", parent_name, prefix);

			let mut new_node = Node::new_dir(full_path.clone());
			new_node.offset = desc.offset;
			new_node.length = desc.length;

			let parent = node_at_mut(&mut root, &parent_path);
			parent.children.push(new_node);
			let mut new_idx = parent_path;
			new_idx.push(parent.children.len() - 1);

			index.insert(full_path, new_idx.clone());
			stack.push(new_idx);
			i += 1;
		} else if dir::is_end(&name) {
			if stack.len() <= 1 {
				return Err(WadError::Format(format!("unmatched {} at descriptor {}", name, i)));
			}
			stack.pop();
			i += 1;
		} else if dir::is_map_marker(&name) {
			if i + 10 >= n {
				return Err(WadError::Format(format!("map marker {} has fewer than 10 following descriptors", name)));
			}

			let parent_path = stack.last().unwrap().clone();
			let parent_name = node_at(&root, &parent_path).name.clone();
			let full_path = format!("{}{}/", parent_name, name);

			let mut map_node = Node::new_dir(full_path.clone());
			map_node.offset = desc.offset;
			map_node.length = desc.length;
			map_node.is_map_marker = true;

			let parent = node_at_mut(&mut root, &parent_path);
			parent.children.push(map_node);
			let mut map_idx = parent_path;
			map_idx.push(parent.children.len() - 1);
			index.insert(full_path.clone(), map_idx.clone());

			for j in 0..10 {
				let child_desc = &descriptors[i + 1 + j];
				let child_name = child_desc.trimmed_name();
				let child_path = format!("{}{}", full_path, child_name);

				let mut file_node = Node::new_file(child_path.clone());
				file_node.offset = child_desc.offset;
				file_node.length = child_desc.length;

				let map_node = node_at_mut(&mut root, &map_idx);
				map_node.children.push(file_node);
				let mut child_idx = map_idx.clone();
				child_idx.push(map_node.children.len() - 1);
				index.insert(child_path, child_idx);
			}

			i += 11;
		} else {
			let parent_path = stack.last().unwrap().clone();
			let parent_name = node_at(&root, &parent_path).name.clone();
			let full_path = format!("{}{}", parent_name, name);

			let mut file_node = Node::new_file(full_path.clone());
			file_node.offset = desc.offset;
			file_node.length = desc.length;

			let parent = node_at_mut(&mut root, &parent_path);
			parent.children.push(file_node);
			let mut new_idx = parent_path;
			new_idx.push(parent.children.len() - 1);
			index.insert(full_path, new_idx);
			i += 1;
		}
	}

	if stack.len() != 1 {
		return Err(WadError::Format("unclosed namespace directory at end of descriptor list".to_string()));
	}

	Ok((root, index))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::Name;

	fn desc(name: &str, offset: u32, length: u32) -> Descriptor {
		Descriptor { offset, length, name: Name::from(name) }
	}

	#[test]
	fn empty_wad_has_empty_root() {
		let tree = Tree::from_descriptors(&[]).unwrap();
		assert!(tree.is_directory("/"));
		assert_eq!(tree.get_directory("/"), Some(vec![]));
	}

	#[test]
	fn plain_lumps_at_root() {
		let descs = vec![desc("F1", 0, 0), desc("F2", 0, 0)];
		let tree = Tree::from_descriptors(&descs).unwrap();
		assert_eq!(tree.get_directory("/"), Some(vec!["F1".to_string(), "F2".to_string()]));
		assert!(tree.is_content("/F1"));
		assert_eq!(tree.get_size("/F1"), 0);
	}

	#[test]
	fn namespace_bracket() {
		let descs = vec![desc("SP_START", 0, 0), desc("A", 0, 0), desc("B", 0, 0), desc("SP_END", 0, 0)];
		let tree = Tree::from_descriptors(&descs).unwrap();
		assert!(tree.is_directory("/SP/"));
		assert!(tree.is_directory("/SP"));
		assert!(!tree.is_content("/SP"));
		assert_eq!(tree.get_directory("/SP/"), Some(vec!["A".to_string(), "B".to_string()]));
	}

	#[test]
	fn map_marker_groups_ten_lumps() {
		let mut descs = vec![desc("E1M1", 0, 0)];
		for i in 0..10 {
			descs.push(desc(&format!("L{}", i), 0, 0));
		}
		let tree = Tree::from_descriptors(&descs).unwrap();
		let children = tree.get_directory("/E1M1/").unwrap();
		assert_eq!(children.len(), 10);
		assert_eq!(children[0], "L0");
		assert!(tree.node_named("/E1M1/").unwrap().is_map_marker);
	}

	#[test]
	fn unmatched_end_is_format_error() {
		let descs = vec![desc("SP_END", 0, 0)];
		assert!(matches!(Tree::from_descriptors(&descs), Err(WadError::Format(_))));
	}

	#[test]
	fn unclosed_start_is_format_error() {
		let descs = vec![desc("SP_START", 0, 0)];
		assert!(matches!(Tree::from_descriptors(&descs), Err(WadError::Format(_))));
	}

	#[test]
	fn short_map_marker_is_format_error() {
		let descs = vec![desc("E1M1", 0, 0), desc("L0", 0, 0)];
		assert!(matches!(Tree::from_descriptors(&descs), Err(WadError::Format(_))));
	}

	#[test]
	fn fsck_accepts_well_formed_tree() {
		let descs = vec![desc("SP_START", 0, 0), desc("A", 12, 4), desc("SP_END", 0, 0)];
		let tree = Tree::from_descriptors(&descs).unwrap();
		assert!(tree.fsck(1000).is_empty());
	}
}
