/*!
WAD archive engine
==================

A WAD (`Where's All the Data`) file is the flat binary archive format
introduced with id Software's Doom: a 12-byte header, a blob of lump data,
and a list of 16-byte descriptors naming and locating each lump. This crate
parses that descriptor list into an in-memory directory tree and exposes it
through a small filesystem-shaped API — [`Wad::is_directory`],
[`Wad::get_contents`], [`Wad::create_file`], and so on — suitable for driving
a FUSE adapter or any other front end that wants to treat a WAD as a
read/write filesystem.

The hard part is that the WAD format has no free-space tracking: every
mutation that grows the descriptor list or a lump's data must physically
relocate the bytes that follow it. [`Wad::create_directory`],
[`Wad::create_file`] and [`Wad::write_to_file`] all do this by way of a
`shift-forward` primitive (see the `file_io` module) that inserts zero bytes
at an offset and slides everything after it down the file.

File format
-----------

```text
+--------+------------+------------------+
| header | lump data  | descriptor list  |
| 12 B   |            | 16 B * N         |
+--------+------------+------------------+
```

The header is `4 B magic ‖ u32 numDescriptors ‖ u32 descriptorOffset`, all
little-endian. Each descriptor is `u32 offset ‖ u32 length ‖ 8 B name`. A
descriptor's name classifies it:

- `XXXX_START` / `XXXX_END` bracket a namespace directory `XXXX/`.
- A name matching `E[0-9]M[0-9]` is a map marker: it opens a directory that
  implicitly contains the next 10 descriptors and closes itself.
- Anything else is a plain lump (file) in the current namespace.

This crate assumes a little-endian host: the [`codec::Header`] and
[`codec::Descriptor`] structs are cast directly to and from their on-disk
byte representation via [`dataview::Pod`].

Scope
-----

This crate is the archive engine only. It does not implement a FUSE adapter,
command-line argument parsing beyond the bundled `wadtool` binary, or POSIX
semantics such as permissions, timestamps, hard links, rename, unlink or
truncate. It does not compress lumps, coordinate multiple concurrent
writers, or recover from a WAD left in a torn state by a crashed mutation.
*/

mod codec;
#[doc(hidden)]
pub mod dir;
mod error;
mod file_io;
mod tree;

pub use crate::codec::{Descriptor, Header, Name, DESCRIPTOR_LEN, HEADER_LEN};
pub use crate::error::WadError;
pub use crate::file_io::Wad;
pub use crate::tree::{Node, Tree};
