use crate::*;

/// Defer a closure on drop.
pub struct Defer<F: FnMut()>(pub F);
impl<F: FnMut()> Drop for Defer<F> {
	fn drop(&mut self) {
		(self.0)()
	}
}
macro_rules! defer {
	($($body:tt)*) => {
		let __deferred = Defer(|| { $($body)* });
	};
}
macro_rules! temp_file {
	($file_name:expr) => {
		defer! {
			let _ = std::fs::remove_file($file_name);
		}
	};
}

/// Appends a raw 16-byte descriptor record to a byte buffer, for building
/// literal WAD images in tests.
fn push_descriptor(buf: &mut Vec<u8>, offset: u32, length: u32, name: &[u8]) {
	buf.extend_from_slice(&offset.to_le_bytes());
	buf.extend_from_slice(&length.to_le_bytes());
	let mut padded = [0u8; 8];
	let n = usize::min(name.len(), 8);
	padded[..n].copy_from_slice(&name[..n]);
	buf.extend_from_slice(&padded);
}

fn write_wad(path: &str, magic: &[u8; 4], descriptors: &[(u32, u32, &[u8])]) {
	let mut buf = Vec::new();
	buf.extend_from_slice(magic);
	buf.extend_from_slice(&(descriptors.len() as u32).to_le_bytes());
	buf.extend_from_slice(&12u32.to_le_bytes());
	for (offset, length, name) in descriptors {
		push_descriptor(&mut buf, *offset, *length, name);
	}
	std::fs::write(path, buf).unwrap();
}

#[test]
fn s1_magic_and_empty_directory() {
	temp_file!("test_s1.wad");
	write_wad("test_s1.wad", b"IWAD", &[]);

	let wad = Wad::load("test_s1.wad").unwrap();
	assert_eq!(wad.get_magic(), "IWAD");
	assert!(wad.is_directory("/"));
	assert_eq!(wad.get_directory("/"), Some(vec![]));
}

#[test]
fn s2_plain_lumps() {
	temp_file!("test_s2.wad");
	write_wad("test_s2.wad", b"PWAD", &[(0, 0, b"F1"), (0, 0, b"F2")]);

	let wad = Wad::load("test_s2.wad").unwrap();
	assert_eq!(wad.get_directory("/"), Some(vec!["F1".to_string(), "F2".to_string()]));
	assert!(wad.is_content("/F1"));
	assert_eq!(wad.get_size("/F1"), 0);
}

#[test]
fn s3_namespace() {
	temp_file!("test_s3.wad");
	write_wad("test_s3.wad", b"PWAD", &[(0, 0, b"SP_START"), (0, 0, b"A"), (0, 0, b"B"), (0, 0, b"SP_END")]);

	let wad = Wad::load("test_s3.wad").unwrap();
	assert_eq!(wad.get_directory("/SP/"), Some(vec!["A".to_string(), "B".to_string()]));
	assert!(wad.is_directory("/SP/"));
	assert!(wad.is_directory("/SP"));
	assert!(!wad.is_content("/SP"));
}

#[test]
fn s4_map_marker() {
	temp_file!("test_s4.wad");
	let lumps: Vec<(u32, u32, &[u8])> =
		vec![(0, 0, b"E1M1" as &[u8]), (0, 0, b"L1"), (0, 0, b"L2"), (0, 0, b"L3"), (0, 0, b"L4"), (0, 0, b"L5"), (0, 0, b"L6"), (0, 0, b"L7"), (0, 0, b"L8"), (0, 0, b"L9"), (0, 0, b"L10")];
	write_wad("test_s4.wad", b"PWAD", &lumps);

	let wad = Wad::load("test_s4.wad").unwrap();
	let children = wad.get_directory("/E1M1/").unwrap();
	assert_eq!(children, vec!["L1", "L2", "L3", "L4", "L5", "L6", "L7", "L8", "L9", "L10"]);
}

#[test]
fn s5_mkdir() {
	temp_file!("test_s5.wad");
	write_wad("test_s5.wad", b"IWAD", &[]);

	{
		let mut wad = Wad::load("test_s5.wad").unwrap();
		wad.create_directory("/AB");
		assert!(wad.is_directory("/AB"));
	}

	let wad = Wad::load("test_s5.wad").unwrap();
	assert!(wad.is_directory("/AB"));
	assert_eq!(wad.get_directory("/"), Some(vec!["AB".to_string()]));
	assert!(wad.fsck().is_empty());
}

#[test]
fn s5_mkdir_rejects_oversized_basename() {
	temp_file!("test_s5b.wad");
	write_wad("test_s5b.wad", b"IWAD", &[]);

	let mut wad = Wad::load("test_s5b.wad").unwrap();
	wad.create_directory("/TOOLONG");
	assert!(!wad.is_directory("/TOOLONG"));
	assert_eq!(wad.get_directory("/"), Some(vec![]));
}

#[test]
fn s6_write_once() {
	temp_file!("test_s6.wad");
	write_wad("test_s6.wad", b"IWAD", &[(0, 0, b"F")]);

	let mut wad = Wad::load("test_s6.wad").unwrap();
	let n = wad.write_to_file("/F", b"hello", 0);
	assert_eq!(n, 5);
	assert_eq!(wad.get_size("/F"), 5);

	let mut buf = [0u8; 5];
	let read = wad.get_contents("/F", &mut buf, 0);
	assert_eq!(read, 5);
	assert_eq!(&buf, b"hello");

	let n2 = wad.write_to_file("/F", b"world", 0);
	assert_eq!(n2, 0);

	let mut buf2 = [0u8; 5];
	wad.get_contents("/F", &mut buf2, 0);
	assert_eq!(&buf2, b"hello");
}

#[test]
fn mkdir_into_nested_namespace() {
	temp_file!("test_nested.wad");
	write_wad("test_nested.wad", b"IWAD", &[(0, 0, b"SP_START"), (0, 0, b"SP_END")]);

	let mut wad = Wad::load("test_nested.wad").unwrap();
	wad.create_directory("/SP/NS");
	assert!(wad.is_directory("/SP/NS"));
	assert_eq!(wad.get_directory("/SP/"), Some(vec!["NS".to_string()]));
	assert!(wad.fsck().is_empty());

	drop(wad);
	let reloaded = Wad::load("test_nested.wad").unwrap();
	assert!(reloaded.is_directory("/SP/NS"));
}

#[test]
fn create_file_then_write_round_trips_through_reload() {
	temp_file!("test_roundtrip.wad");
	write_wad("test_roundtrip.wad", b"IWAD", &[]);

	{
		let mut wad = Wad::load("test_roundtrip.wad").unwrap();
		wad.create_file("/GRAPHIC");
		let n = wad.write_to_file("/GRAPHIC", b"01234567", 0);
		assert_eq!(n, 8);
		assert!(wad.fsck().is_empty());
	}

	let mut wad = Wad::load("test_roundtrip.wad").unwrap();
	assert!(wad.is_content("/GRAPHIC"));
	assert_eq!(wad.get_size("/GRAPHIC"), 8);
	let mut buf = [0u8; 8];
	wad.get_contents("/GRAPHIC", &mut buf, 0);
	assert_eq!(&buf, b"01234567");
}

#[test]
fn create_file_rejects_reserved_names() {
	temp_file!("test_reserved.wad");
	write_wad("test_reserved.wad", b"IWAD", &[]);

	let mut wad = Wad::load("test_reserved.wad").unwrap();
	wad.create_file("/E1M1");
	assert!(!wad.is_content("/E1M1"));
	wad.create_file("/FOO_START");
	assert!(!wad.is_content("/FOO_START"));
}

#[test]
fn create_file_rejects_inside_map_marker() {
	temp_file!("test_map_locked.wad");
	let lumps: Vec<(u32, u32, &[u8])> =
		vec![(0, 0, b"E1M1" as &[u8]), (0, 0, b"L1"), (0, 0, b"L2"), (0, 0, b"L3"), (0, 0, b"L4"), (0, 0, b"L5"), (0, 0, b"L6"), (0, 0, b"L7"), (0, 0, b"L8"), (0, 0, b"L9"), (0, 0, b"L10")];
	write_wad("test_map_locked.wad", b"IWAD", &lumps);

	let mut wad = Wad::load("test_map_locked.wad").unwrap();
	wad.create_file("/E1M1/EXTRA");
	assert!(!wad.is_content("/E1M1/EXTRA"));
	wad.create_directory("/E1M1/SUB");
	assert!(!wad.is_directory("/E1M1/SUB"));
}

#[test]
fn shift_forward_preserves_prefix_and_suffix() {
	temp_file!("test_shift.wad");
	std::fs::write("test_shift.wad", b"0123456789").unwrap();

	{
		let mut file = std::fs::OpenOptions::new().read(true).write(true).open("test_shift.wad").unwrap();
		super::shift_forward(&mut file, 4, 3).unwrap();
	}

	let contents = std::fs::read("test_shift.wad").unwrap();
	assert_eq!(contents.len(), 13);
	assert_eq!(&contents[..4], b"0123");
	assert_eq!(&contents[4..7], b"\0\0\0");
	assert_eq!(&contents[7..], b"456789");
}

#[test]
fn shift_forward_zero_is_noop() {
	temp_file!("test_shift_zero.wad");
	std::fs::write("test_shift_zero.wad", b"abcdef").unwrap();

	{
		let mut file = std::fs::OpenOptions::new().read(true).write(true).open("test_shift_zero.wad").unwrap();
		super::shift_forward(&mut file, 2, 0).unwrap();
	}

	assert_eq!(std::fs::read("test_shift_zero.wad").unwrap(), b"abcdef");
}

#[test]
fn get_contents_bounds() {
	temp_file!("test_bounds.wad");
	write_wad("test_bounds.wad", b"IWAD", &[(0, 0, b"F")]);

	let mut wad = Wad::load("test_bounds.wad").unwrap();
	wad.write_to_file("/F", b"0123456789", 0);

	let mut buf = [0u8; 100];
	assert_eq!(wad.get_contents("/F", &mut buf, 5), 5);
	assert_eq!(&buf[..5], b"56789");
	assert_eq!(wad.get_contents("/F", &mut buf, 10), 0);
	assert_eq!(wad.get_contents("/F", &mut buf, 20), 0);
	assert_eq!(wad.get_contents("/nonexistent", &mut buf, 0), -1);
}
