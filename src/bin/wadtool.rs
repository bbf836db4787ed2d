/*!
Implements wadtool's command-line interface.
*/

use std::{env, io, io::prelude::*};

fn main() {
	let args: Vec<_> = env::args().collect();
	let args: Vec<_> = args.iter().map(|s| &**s).collect();

	match &args[1..] {
		&[] => print!("{}", HELP_GENERAL),
		&["help"] => print!("{}", HELP_GENERAL),
		&[_] => eprintln!("Error invalid syntax, see `wadtool help`."),
		&["help", cmd] => help(&[cmd]),
		&[wad, "new", ref args @ ..] => new(wad, args),
		&[wad, "tree", ref args @ ..] => tree(wad, args),
		&[wad, "ls", ref args @ ..] => ls(wad, args),
		&[wad, "mkdir", ref args @ ..] => mkdir(wad, args),
		&[wad, "add", ref args @ ..] => add(wad, args),
		&[wad, "cat", ref args @ ..] => cat(wad, args),
		&[wad, "fsck", ref args @ ..] => fsck(wad, args),
		&[_wad, cmd, ..] => eprintln!("Error unknown subcommand: {}", cmd),
	}
}

//----------------------------------------------------------------

const HELP_GENERAL: &str = "\
wadtool - a command-line front end for the WAD archive engine

USAGE
    wadtool help <COMMAND>
    wadtool <WADFILE> <COMMAND> [..]

ARGUMENTS
    WADFILE  Path to a WAD archive to create or edit.
    COMMAND  The subcommand to invoke.

Commands are:
    new      Creates a new empty WAD archive.
    tree     Displays the directory tree of the WAD archive.
    ls       Lists one directory's immediate children.
    mkdir    Creates a namespace directory.
    add      Adds a lump to the WAD archive, reading its data from stdin.
    cat      Reads a lump from the WAD archive and writes it to stdout.
    fsck     Runs the consistency checker.

    See `wadtool help <COMMAND>` for more information on a specific command.

EXAMPLES
    wadtool example.wad new
    wadtool example.wad mkdir /SP
    wadtool example.wad add /SP/GRAPHIC < graphic.lmp
    wadtool example.wad tree
    wadtool example.wad cat /SP/GRAPHIC
";

fn help(args: &[&str]) {
	let text = match args.first().cloned() {
		None => HELP_GENERAL,
		Some("new") => HELP_NEW,
		Some("tree") => HELP_TREE,
		Some("ls") => HELP_LS,
		Some("mkdir") => HELP_MKDIR,
		Some("add") => HELP_ADD,
		Some("cat") => HELP_CAT,
		Some("fsck") => HELP_FSCK,
		Some(cmd) => return eprintln!("Error unknown subcommand: {}", cmd),
	};
	print!("{}", text);
}

//----------------------------------------------------------------

const HELP_NEW: &str = "\
wadtool new

NAME
    wadtool-new - Creates a new empty WAD archive.

SYNOPSIS
    wadtool <WADFILE> new [MAGIC]

DESCRIPTION
    Creates a new empty WAD archive with the given file name. If a file with
    this name already exists it is overwritten. MAGIC defaults to `PWAD`.
";

fn new(file: &str, args: &[&str]) {
	let magic_str = args.first().cloned().unwrap_or("PWAD");
	let magic_bytes = magic_str.as_bytes();
	if magic_bytes.len() != 4 {
		return eprintln!("Error magic must be exactly 4 bytes: {}", magic_str);
	}
	let mut magic = [0u8; 4];
	magic.copy_from_slice(magic_bytes);

	if let Err(err) = wadfs::Wad::create_empty(file, &magic) {
		eprintln!("Error writing {}: {}", file, err);
	}
}

//----------------------------------------------------------------

const HELP_TREE: &str = "\
wadtool tree

NAME
    wadtool-tree - Displays the directory tree of the WAD archive.

SYNOPSIS
    wadtool <WADFILE> tree
";

fn tree(file: &str, _args: &[&str]) {
	let wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};
	print!("{}", wad.tree());
}

//----------------------------------------------------------------

const HELP_LS: &str = "\
wadtool ls

NAME
    wadtool-ls - Lists one directory's immediate children.

SYNOPSIS
    wadtool <WADFILE> ls [DIR]

DESCRIPTION
    Lists the immediate children of DIR, or the root if omitted.
";

fn ls(file: &str, args: &[&str]) {
	let dir = args.first().cloned().unwrap_or("/");

	let wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};

	match wad.get_directory(dir) {
		Some(children) => {
			for child in children {
				println!("{}", child);
			}
		},
		None => eprintln!("Error not a directory: {}", dir),
	}
}

//----------------------------------------------------------------

const HELP_MKDIR: &str = "\
wadtool mkdir

NAME
    wadtool-mkdir - Creates a namespace directory.

SYNOPSIS
    wadtool <WADFILE> mkdir <LUMPPATH>

DESCRIPTION
    Creates a namespace directory at LUMPPATH. Silently does nothing if
    LUMPPATH already exists, its parent is missing or is itself inside a map
    marker, or its basename is longer than 2 characters.
";

fn mkdir(file: &str, args: &[&str]) {
	let path = match args {
		&[path] => path,
		_ => return eprintln!("Error invalid syntax, see `wadtool help mkdir`."),
	};

	let mut wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};

	wad.create_directory(path);
	if !wad.is_directory(path) {
		eprintln!("Error could not create directory: {}", path);
	}
}

//----------------------------------------------------------------

const HELP_ADD: &str = "\
wadtool add

NAME
    wadtool-add - Adds a lump to the WAD archive.

SYNOPSIS
    wadtool <WADFILE> add <LUMPPATH> < <CONTENT>

DESCRIPTION
    Creates a new lump at LUMPPATH and writes it once with the bytes read
    from stdin.
";

fn add(file: &str, args: &[&str]) {
	let path = match args {
		&[path] => path,
		_ => return eprintln!("Error invalid syntax, see `wadtool help add`."),
	};

	let mut wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};

	let mut data = Vec::new();
	if let Err(err) = io::stdin().read_to_end(&mut data) {
		return eprintln!("Error reading stdin: {}", err);
	}

	wad.create_file(path);
	let n = wad.write_to_file(path, &data, 0);
	if n < 0 {
		eprintln!("Error could not create lump: {}", path);
	} else if n as usize != data.len() {
		eprintln!("Error lump already populated, wrote 0 of {} bytes: {}", data.len(), path);
	}
}

//----------------------------------------------------------------

const HELP_CAT: &str = "\
wadtool cat

NAME
    wadtool-cat - Reads a lump from the WAD archive and writes it to stdout.

SYNOPSIS
    wadtool <WADFILE> cat <LUMPPATH>
";

fn cat(file: &str, args: &[&str]) {
	let path = match args {
		&[path] => path,
		_ => return eprintln!("Error invalid syntax, see `wadtool help cat`."),
	};

	let mut wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};

	let size = wad.get_size(path);
	if size < 0 {
		return eprintln!("Error not content: {}", path);
	}

	let mut buf = vec![0u8; size as usize];
	let n = wad.get_contents(path, &mut buf, 0);
	if n < 0 {
		return eprintln!("Error reading lump: {}", path);
	}
	let _ = io::stdout().write_all(&buf[..n as usize]);
}

//----------------------------------------------------------------

const HELP_FSCK: &str = "\
wadtool fsck

NAME
    wadtool-fsck - Runs the consistency checker.

SYNOPSIS
    wadtool <WADFILE> fsck
";

fn fsck(file: &str, _args: &[&str]) {
	let wad = match wadfs::Wad::load(file) {
		Ok(wad) => wad,
		Err(err) => return eprintln!("Error opening {}: {}", file, err),
	};

	let errors = wad.fsck();
	if errors.is_empty() {
		println!("ok");
	} else {
		for error in &errors {
			println!("{}", error);
		}
		std::process::exit(1);
	}
}
