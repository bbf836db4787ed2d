/*!
Plain-old-data shapes of the on-disk header and descriptor records, and the
byte-exact encode/decode between them and a file.

Little-endian throughout, matching the original format. The `Header` and
`Descriptor` structs rely on the host being little-endian to round-trip
correctly through [`dataview::Pod`] casts, the same assumption the original
source's in-memory struct layout made; this crate does not run on big-endian
hosts.
*/

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem;

use dataview::Pod;

/// Size in bytes of the on-disk header.
pub const HEADER_LEN: u32 = 12;
/// Size in bytes of a single descriptor record.
pub const DESCRIPTOR_LEN: u32 = 16;

const NAME_LEN: usize = 8;

/// An 8-byte, NUL/space-padded descriptor name.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
#[repr(C)]
pub struct Name {
	buffer: [u8; NAME_LEN],
}

unsafe impl Pod for Name {}

impl Name {
	/// Overwrites the buffer with `s`, truncating to 8 bytes and right-padding
	/// with NUL.
	pub fn set(&mut self, s: &str) {
		self.buffer = [0u8; NAME_LEN];
		let bytes = s.as_bytes();
		let len = usize::min(bytes.len(), NAME_LEN);
		self.buffer[..len].copy_from_slice(&bytes[..len]);
	}

	/// The name with leading/trailing spaces and NULs trimmed, decoded lossily.
	pub fn trimmed(&self) -> String {
		let s = &self.buffer[..];
		let start = s.iter().position(|&b| b != b' ' && b != 0).unwrap_or(s.len());
		let end = s.iter().rposition(|&b| b != b' ' && b != 0).map_or(start, |i| i + 1);
		String::from_utf8_lossy(&s[start..end]).into_owned()
	}
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.trimmed().fmt(f)
	}
}

impl<'a> From<&'a str> for Name {
	fn from(s: &'a str) -> Name {
		let mut name = Name::default();
		name.set(s);
		name
	}
}

/// A single 16-byte descriptor: `offset`, `length`, and an 8-byte `name`.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
#[repr(C)]
pub struct Descriptor {
	pub offset: u32,
	pub length: u32,
	pub name: Name,
}

unsafe impl Pod for Descriptor {}

impl Descriptor {
	pub fn trimmed_name(&self) -> String {
		self.name.trimmed()
	}
}

const _: [(); 16] = [(); mem::size_of::<Descriptor>()];

/// The 12-byte on-disk header.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
#[repr(C)]
pub struct Header {
	pub magic: [u8; 4],
	pub num_descriptors: u32,
	pub descriptor_offset: u32,
}

unsafe impl Pod for Header {}

impl Header {
	/// A fresh, empty WAD header: zero descriptors, descriptor list starting
	/// right after the header.
	pub fn new_empty(magic: &[u8; 4]) -> Header {
		Header { magic: *magic, num_descriptors: 0, descriptor_offset: HEADER_LEN }
	}

	/// The magic as text. Built from the 4 raw bytes via a lossy UTF-8
	/// decode, which is always well-formed regardless of what's in them.
	pub fn magic_str(&self) -> String {
		String::from_utf8_lossy(&self.magic).into_owned()
	}
}

const _: [(); 12] = [(); mem::size_of::<Header>()];

pub(crate) fn read_header<R: Read>(r: &mut R) -> io::Result<Header> {
	let mut header = Header::default();
	r.read_exact(header.as_bytes_mut())?;
	Ok(header)
}

pub(crate) fn write_header<W: Write + Seek>(w: &mut W, header: &Header) -> io::Result<()> {
	w.seek(SeekFrom::Start(0))?;
	w.write_all(header.as_bytes())
}

pub(crate) fn read_descriptor<R: Read>(r: &mut R) -> io::Result<Descriptor> {
	let mut desc = Descriptor::default();
	r.read_exact(desc.as_bytes_mut())?;
	Ok(desc)
}

pub(crate) fn read_descriptor_at<F: Read + Seek>(f: &mut F, pos: u64) -> io::Result<Descriptor> {
	f.seek(SeekFrom::Start(pos))?;
	read_descriptor(f)
}

pub(crate) fn write_descriptor_at<F: Write + Seek>(f: &mut F, pos: u64, desc: &Descriptor) -> io::Result<()> {
	f.seek(SeekFrom::Start(pos))?;
	f.write_all(desc.as_bytes())
}

/// Reads all `header.num_descriptors` records starting at `header.descriptor_offset`.
pub(crate) fn read_descriptors<F: Read + Seek>(f: &mut F, header: &Header) -> io::Result<Vec<Descriptor>> {
	f.seek(SeekFrom::Start(header.descriptor_offset as u64))?;
	let mut out = vec![Descriptor::default(); header.num_descriptors as usize];
	if !out.is_empty() {
		f.read_exact(out.as_bytes_mut())?;
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn name_trims_padding() {
		let mut name = Name::default();
		name.set("F1");
		assert_eq!(name.trimmed(), "F1");
		assert_eq!(name.buffer, *b"F1\0\0\0\0\0\0");
	}

	#[test]
	fn name_truncates_long_input() {
		let name = Name::from("TOOLONGNAME");
		assert_eq!(name.trimmed(), "TOOLONGN");
	}

	#[test]
	fn header_round_trip() {
		let header = Header::new_empty(b"PWAD");
		let mut buf = Vec::new();
		buf.extend_from_slice(header.as_bytes());
		let mut cursor = io::Cursor::new(buf);
		let decoded = read_header(&mut cursor).unwrap();
		assert_eq!(decoded, header);
	}
}
