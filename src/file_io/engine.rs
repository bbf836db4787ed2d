use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::{self, Descriptor, Header, Name, DESCRIPTOR_LEN};
use crate::dir;
use crate::error::WadError;
use crate::file_io::shift_forward;
use crate::tree::Tree;

/// An open WAD archive: the backing file, its header, and the parsed tree.
///
/// `Wad` owns both the file handle and the node arena; dropping a `Wad`
/// releases both. There is no `finish()`/commit step — every mutating method
/// writes through to disk before returning (see the crate's module docs).
pub struct Wad {
	file: fs::File,
	header: Header,
	tree: Tree,
}

impl Wad {
	/// Opens an existing WAD file, parses its descriptor list, and builds
	/// the in-memory tree.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Wad, WadError> {
		let mut file = fs::OpenOptions::new().read(true).write(true).open(path)?;
		let header = codec::read_header(&mut file)?;
		let descriptors = codec::read_descriptors(&mut file, &header)?;
		let tree = Tree::from_descriptors(&descriptors)?;
		Ok(Wad { file, header, tree })
	}

	/// Creates a brand-new, empty WAD file on disk (zero descriptors) and
	/// opens it. Used by the `new` CLI subcommand and by tests.
	pub fn create_empty<P: AsRef<Path>>(path: P, magic: &[u8; 4]) -> Result<Wad, WadError> {
		let mut file = fs::OpenOptions::new().create(true).write(true).read(true).truncate(true).open(path)?;
		let header = Header::new_empty(magic);
		codec::write_header(&mut file, &header)?;
		let tree = Tree::from_descriptors(&[])?;
		Ok(Wad { file, header, tree })
	}

	pub fn get_magic(&self) -> String {
		self.header.magic_str()
	}

	pub fn is_content(&self, path: &str) -> bool {
		self.tree.is_content(path)
	}

	pub fn is_directory(&self, path: &str) -> bool {
		self.tree.is_directory(path)
	}

	pub fn get_size(&self, path: &str) -> i64 {
		self.tree.get_size(path)
	}

	pub fn get_directory(&self, path: &str) -> Option<Vec<String>> {
		self.tree.get_directory(path)
	}

	/// Human-readable recursive listing, directories suffixed `/`.
	pub fn tree(&self) -> String {
		self.tree.to_string()
	}

	/// Runs the consistency checker against the current in-memory tree.
	pub fn fsck(&self) -> Vec<String> {
		self.tree.fsck(self.header.descriptor_offset)
	}

	/// Reads up to `buf.len()` bytes of `path`'s content starting at `offset`.
	///
	/// Returns -1 if `path` is not content, 0 if `offset` is past the end of
	/// the lump, otherwise the number of bytes actually read.
	pub fn get_contents(&mut self, path: &str, buf: &mut [u8], offset: usize) -> i64 {
		if !self.tree.is_content(path) {
			return -1;
		}
		let node = self.tree.node_named(path).unwrap();
		let length = node.length as usize;
		if offset >= length {
			return 0;
		}
		let read_len = usize::min(buf.len(), length - offset);
		let file_offset = node.offset as u64 + offset as u64;

		if self.file.seek(SeekFrom::Start(file_offset)).is_err() {
			return -1;
		}
		if self.file.read_exact(&mut buf[..read_len]).is_err() {
			return -1;
		}
		read_len as i64
	}

	/// Creates a new namespace directory. Silently does nothing if any
	/// precondition in the module docs isn't met.
	pub fn create_directory(&mut self, path: &str) {
		let _ = self.try_create_directory(path);
	}

	/// Creates a new empty lump. Silently does nothing on precondition failure.
	pub fn create_file(&mut self, path: &str) {
		let _ = self.try_create_file(path);
	}

	/// Writes the initial content of an empty lump. Returns -1 if `path` is
	/// not content, 0 if the lump is already populated (write-once), or the
	/// number of bytes written. `offset` is accepted but ignored, matching
	/// the reference semantics: only initial population is supported.
	pub fn write_to_file(&mut self, path: &str, buf: &[u8], offset: usize) -> i64 {
		let _ = offset;
		match self.try_write_to_file(path, buf) {
			Ok(n) => n,
			Err(_) => -1,
		}
	}

	fn try_create_directory(&mut self, path: &str) -> Result<bool, WadError> {
		let (parent_path, basename) = match dir::split_parent(path) {
			Some(x) => x,
			None => return Ok(false),
		};
		if basename.len() > 2 {
			return Ok(false);
		}
		let full_dir_path = format!("{}{}/", parent_path, basename);
		if self.tree.is_directory(&full_dir_path) {
			return Ok(false);
		}
		if !self.tree.is_directory(&parent_path) {
			return Ok(false);
		}
		if self.tree.node_named(&parent_path).unwrap().is_map_marker {
			return Ok(false);
		}

		let insert_pos = match self.find_insertion_point(&parent_path)? {
			Some(pos) => pos,
			None => return Ok(false),
		};

		shift_forward(&mut self.file, insert_pos, DESCRIPTOR_LEN as u64 * 2)?;

		let mut start_desc = Descriptor::default();
		start_desc.name = Name::from(format!("{}_START", basename).as_str());
		let mut end_desc = Descriptor::default();
		end_desc.name = Name::from(format!("{}_END", basename).as_str());

		codec::write_descriptor_at(&mut self.file, insert_pos, &start_desc)?;
		codec::write_descriptor_at(&mut self.file, insert_pos + DESCRIPTOR_LEN as u64, &end_desc)?;

		self.header.num_descriptors += 2;
		codec::write_header(&mut self.file, &self.header)?;

		self.tree.insert_directory(&parent_path, &full_dir_path, false);
		Ok(true)
	}

	fn try_create_file(&mut self, path: &str) -> Result<bool, WadError> {
		let (parent_path, basename) = match dir::split_parent(path) {
			Some(x) => x,
			None => return Ok(false),
		};
		if basename.len() > 8 || dir::is_map_marker(&basename) || dir::is_start(&basename) || dir::is_end(&basename) {
			return Ok(false);
		}
		if self.tree.is_content(path) {
			return Ok(false);
		}
		if !self.tree.is_directory(&parent_path) {
			return Ok(false);
		}
		if self.tree.node_named(&parent_path).unwrap().is_map_marker {
			return Ok(false);
		}

		let insert_pos = match self.find_insertion_point(&parent_path)? {
			Some(pos) => pos,
			None => return Ok(false),
		};

		shift_forward(&mut self.file, insert_pos, DESCRIPTOR_LEN as u64)?;

		let mut desc = Descriptor::default();
		desc.name = Name::from(basename.as_str());
		codec::write_descriptor_at(&mut self.file, insert_pos, &desc)?;

		self.header.num_descriptors += 1;
		codec::write_header(&mut self.file, &self.header)?;

		self.tree.insert_file(&parent_path, path);
		Ok(true)
	}

	fn try_write_to_file(&mut self, path: &str, buf: &[u8]) -> Result<i64, WadError> {
		if !self.tree.is_content(path) {
			return Ok(-1);
		}
		if self.tree.node_named(path).unwrap().length != 0 {
			return Ok(0);
		}

		let n = buf.len() as u32;
		let lump_offset = self.header.descriptor_offset;

		shift_forward(&mut self.file, lump_offset as u64, n as u64)?;
		self.header.descriptor_offset += n;
		codec::write_header(&mut self.file, &self.header)?;

		self.file.seek(SeekFrom::Start(lump_offset as u64))?;
		self.file.write_all(buf)?;

		self.tree.set_file_location(path, lump_offset, n);

		let descriptor_index = self.find_descriptor_index(path)?;
		let desc_pos = self.header.descriptor_offset as u64 + descriptor_index as u64 * DESCRIPTOR_LEN as u64;
		let mut existing = codec::read_descriptor_at(&mut self.file, desc_pos)?;
		existing.offset = lump_offset;
		existing.length = n;
		codec::write_descriptor_at(&mut self.file, desc_pos, &existing)?;

		Ok(n as i64)
	}

	/// Locates where a new descriptor should be inserted to land immediately
	/// before `parent_path`'s `_END` record (or, for the root, at the tail of
	/// the descriptor list). Reparses the descriptor list rather than
	/// trusting the tree, since `_END` records have no back-pointer into it.
	///
	/// Returns `None` only if the descriptor list turns out not to contain a
	/// matching `_END` for a non-root parent, which should not happen for a
	/// parent the tree already reports as a directory.
	fn find_insertion_point(&mut self, parent_path: &str) -> Result<Option<u64>, WadError> {
		if parent_path == "/" {
			let tail = self.header.descriptor_offset as u64 + self.header.num_descriptors as u64 * DESCRIPTOR_LEN as u64;
			return Ok(Some(tail));
		}

		self.file.seek(SeekFrom::Start(self.header.descriptor_offset as u64))?;
		let mut stack: Vec<String> = vec!["/".to_string()];
		let mut pos = self.header.descriptor_offset as u64;
		let mut i = 0u32;

		while i < self.header.num_descriptors {
			let this_desc_pos = pos;
			let desc = codec::read_descriptor(&mut self.file)?;
			let name = desc.trimmed_name();
			pos += DESCRIPTOR_LEN as u64;
			i += 1;

			if dir::is_start(&name) {
				let prefix = dir::start_prefix(&name);
				let mut child = stack.last().unwrap().clone();
				child.push_str(prefix);
				child.push('/');
				stack.push(child);
			} else if dir::is_end(&name) {
				if stack.len() > 1 {
					let closing = stack.pop().unwrap();
					if closing == parent_path {
						return Ok(Some(this_desc_pos));
					}
				}
			} else if dir::is_map_marker(&name) {
				for _ in 0..10 {
					codec::read_descriptor(&mut self.file)?;
				}
				pos += DESCRIPTOR_LEN as u64 * 10;
				i += 10;
			}
		}

		Ok(None)
	}

	/// Reparses the descriptor list, counting records in order, to find the
	/// index of the descriptor naming `path`.
	fn find_descriptor_index(&mut self, path: &str) -> Result<u32, WadError> {
		self.file.seek(SeekFrom::Start(self.header.descriptor_offset as u64))?;
		let mut stack: Vec<String> = vec!["/".to_string()];
		let mut i = 0u32;

		while i < self.header.num_descriptors {
			let desc = codec::read_descriptor(&mut self.file)?;
			let name = desc.trimmed_name();

			if dir::is_start(&name) {
				let prefix = dir::start_prefix(&name);
				let mut child = stack.last().unwrap().clone();
				child.push_str(prefix);
				child.push('/');
				stack.push(child);
				i += 1;
			} else if dir::is_end(&name) {
				if stack.len() > 1 {
					stack.pop();
				}
				i += 1;
			} else if dir::is_map_marker(&name) {
				let marker_path = format!("{}{}/", stack.last().unwrap(), name);
				let marker_index = i;
				for j in 0..10u32 {
					let child = codec::read_descriptor(&mut self.file)?;
					let child_path = format!("{}{}", marker_path, child.trimmed_name());
					if child_path == path {
						return Ok(marker_index + 1 + j);
					}
				}
				i += 11;
			} else {
				let full_path = format!("{}{}", stack.last().unwrap(), name);
				if full_path == path {
					return Ok(i);
				}
				i += 1;
			}
		}

		Err(WadError::Format(format!("descriptor for {:?} not found during reparse", path)))
	}
}
