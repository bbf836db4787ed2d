use std::fmt;
use std::io;

/// Failure modes that a caller needs to distinguish from a plain I/O error.
///
/// Only [`Wad::load`](crate::Wad::load) and a few internal helpers return this type. The
/// query and mutation operations keep their own silent-no-op / sentinel-value
/// conventions and never surface a `WadError` (see the crate's module docs).
#[derive(Debug)]
pub enum WadError {
	/// The backing file could not be opened, read, or written.
	Io(io::Error),
	/// The descriptor list or header did not describe a well-formed WAD.
	Format(String),
}

impl fmt::Display for WadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WadError::Io(err) => write!(f, "I/O error: {}", err),
			WadError::Format(msg) => write!(f, "malformed WAD: {}", msg),
		}
	}
}

impl std::error::Error for WadError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			WadError::Io(err) => Some(err),
			WadError::Format(_) => None,
		}
	}
}

impl From<io::Error> for WadError {
	fn from(err: io::Error) -> WadError {
		WadError::Io(err)
	}
}
