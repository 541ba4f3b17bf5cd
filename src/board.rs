//! Board variant selection.
//!
//! The firmware reads its target board from a `#define BOARD` directive in a
//! shared config header. The build engine consumes that header, so the
//! rewrite must complete before any engine invocation starts.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Board;

/// Prefix of the directive line rewritten by [`select_board`].
const BOARD_DIRECTIVE_PREFIX: &str = "#define BOARD";

/// Rewrite the board directive in the shared config header.
///
/// The single line starting with `#define BOARD` is replaced with the
/// directive for `board`; every other line passes through unmodified in its
/// original position. When no directive line exists the new one is appended
/// at end-of-file, so the operation is an idempotent upsert rather than a
/// strict replace.
pub fn select_board(config_header: &Path, board: Board) -> Result<()> {
    let content = fs::read_to_string(config_header)
        .with_context(|| format!("reading board config header '{}'", config_header.display()))?;

    let directive = format!("{} {}", BOARD_DIRECTIVE_PREFIX, board.definition());
    let mut rewritten = String::with_capacity(content.len() + directive.len() + 1);
    let mut directive_found = false;

    for line in content.lines() {
        if line.starts_with(BOARD_DIRECTIVE_PREFIX) {
            rewritten.push_str(&directive);
            directive_found = true;
        } else {
            rewritten.push_str(line);
        }
        rewritten.push('\n');
    }

    if !directive_found {
        rewritten.push_str(&directive);
        rewritten.push('\n');
    }

    fs::write(config_header, rewritten)
        .with_context(|| format!("writing board config header '{}'", config_header.display()))?;
    info!("board config header updated: {}", directive);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_header(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("config.h");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn replaces_existing_directive() {
        let temp = TempDir::new().unwrap();
        let header = write_header(&temp, "#define FOO 1\n#define BOARD PCBA\n#define BAR 2\n");

        select_board(&header, Board::Devkit).unwrap();

        let content = fs::read_to_string(&header).unwrap();
        assert_eq!(content, "#define FOO 1\n#define BOARD DEV_KIT\n#define BAR 2\n");
    }

    #[test]
    fn appends_directive_when_absent() {
        let temp = TempDir::new().unwrap();
        let header = write_header(&temp, "#define FOO 1\n");

        select_board(&header, Board::Pcba).unwrap();

        let content = fs::read_to_string(&header).unwrap();
        assert_eq!(content, "#define FOO 1\n#define BOARD PCBA\n");
    }

    #[test]
    fn is_idempotent() {
        let temp = TempDir::new().unwrap();
        let header = write_header(&temp, "// header\n#define BOARD PCBA\n");

        select_board(&header, Board::Devkit).unwrap();
        let once = fs::read_to_string(&header).unwrap();

        select_board(&header, Board::Devkit).unwrap();
        let twice = fs::read_to_string(&header).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.matches("#define BOARD").count(), 1);
    }

    #[test]
    fn preserves_unrelated_lines_and_order() {
        let temp = TempDir::new().unwrap();
        let original = "// config\n#define A 1\n\n#define BOARD DEV_KIT\n#define Z 26\n";
        let header = write_header(&temp, original);

        select_board(&header, Board::Pcba).unwrap();

        let content = fs::read_to_string(&header).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec!["// config", "#define A 1", "", "#define BOARD PCBA", "#define Z 26"]
        );
    }

    #[test]
    fn missing_header_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = select_board(&temp.path().join("nope.h"), Board::Devkit);
        assert!(result.is_err());
    }
}
