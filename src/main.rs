//! Main entry point for the ziplist CLI application.
//!
//! This binary provides a command-line interface for listing and extracting
//! ZIP archives from the local filesystem.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ziplist::{Cli, ZipExtractor, ZipFileEntry};

/// Application entry point.
///
/// Parses command-line arguments, opens the archive, and dispatches to the
/// listing or extraction flow.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = File::open(&cli.file).with_context(|| format!("couldn't open {:?}", cli.file))?;
    let mut extractor = ZipExtractor::new(file);

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_files(&mut extractor, cli.verbose);
    }

    // Extract mode: get all entries from the archive
    let entries = extractor.list_files()?;

    // Apply filters to determine which files to extract:
    // 1. Skip directories (they are created automatically during extraction)
    // 2. If specific files are requested, only include matching entries
    // 3. Exclude files matching the exclusion patterns
    let files_to_extract: Vec<_> = entries
        .iter()
        .filter(|e| {
            // Skip directory entries
            if e.is_directory {
                return false;
            }

            // If specific files are requested via positional arguments,
            // only include entries that match
            if !cli.files.is_empty() {
                let matches = cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        // Pattern contains wildcards: use glob matching
                        glob_match(f, &e.file_name)
                    } else {
                        // No wildcards: exact match on filename or full path
                        let basename = Path::new(&e.file_name)
                            .file_name()
                            .map(|s| s.to_string_lossy())
                            .unwrap_or_default();
                        e.file_name == *f || basename == *f
                    }
                });
                if !matches {
                    return false;
                }
            }

            // Exclude files matching the -x patterns
            if cli
                .exclude
                .iter()
                .any(|x| e.file_name.contains(x) || glob_match(x, &e.file_name))
            {
                return false;
            }

            true
        })
        .collect();

    // Extract each matching file. A bad entry is reported and skipped; it
    // does not abort the rest of the archive.
    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        if let Err(err) = extract_file(&mut extractor, entry, &cli, multiple_files) {
            if !cli.is_very_quiet() {
                eprintln!("Skipping: {} ({})", entry.file_name, err);
            }
        }
    }

    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, method, compression
///   ratio, and timestamps
fn list_files(extractor: &mut ZipExtractor<File>, verbose: bool) -> Result<()> {
    let entries = extractor.list_files()?;

    if verbose {
        // Print table header for verbose output
        println!(
            "{:>10}  {:<10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Method", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(76));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        if verbose {
            let header = &entry.header;

            // Parse DOS timestamp into human-readable format
            let (year, month, day) = header.mod_date();
            let (hour, minute, _second) = header.mod_time();

            // Calculate compression ratio as percentage saved
            let ratio = if header.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100u64.saturating_sub(
                        header.compressed_size as u64 * 100 / header.uncompressed_size as u64
                    )
                )
            } else {
                "  0%".to_string()
            };

            // Print detailed entry information
            println!(
                "{:>10}  {:<10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                header.uncompressed_size,
                header.method.name(),
                header.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.file_name
            );

            // Accumulate totals (excluding directories)
            if !entry.is_directory {
                total_uncompressed += header.uncompressed_size as u64;
                total_compressed += header.compressed_size as u64;
                file_count += 1;
            }
        } else {
            // Simple format: just the file name
            println!("{}", entry.file_name);
        }
    }

    // Print summary line in verbose mode
    if verbose {
        println!("{}", "-".repeat(76));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100u64.saturating_sub(total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {:>10}  {}  {:>17}  {} files",
            total_uncompressed, "", total_compressed, total_ratio, "", file_count
        );
    }

    Ok(())
}

/// Extract a single file from the archive.
///
/// Handles the extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
fn extract_file(
    extractor: &mut ZipExtractor<File>,
    entry: &ZipFileEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Pipe mode: write file contents directly to stdout
    if cli.pipe {
        if show_filename {
            let mut stdout = std::io::stdout();
            stdout.write_all(format!("--- {} ---\n", entry.file_name).as_bytes())?;
        }
        extractor.extract_to_stdout(entry)?;
        return Ok(());
    }

    // Determine the output path based on CLI options
    let file_name = if cli.junk_paths {
        // Junk paths: use only the base filename, ignore directory structure
        Path::new(&entry.file_name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.file_name.clone())
    } else {
        // Preserve directory structure from archive
        entry.file_name.clone()
    };
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite {
            // -n flag: never overwrite, skip silently (unless quiet)
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.file_name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            // Default behavior: skip with suggestion to use -o
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.file_name);
            }
            return Ok(());
        }
        // -o flag: overwrite without prompting (fall through to extraction)
    }

    // Display extraction progress
    if !cli.is_quiet() {
        println!("  extracting: {}", entry.file_name);
    }

    // Perform the actual extraction
    extractor.extract_to_file(entry, &output_path)?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    /// Recursive helper using simple backtracking for `*` wildcards.
    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            // Both exhausted: match successful
            (None, None) => true,
            // Star matches zero or more characters
            (Some('*'), _) => {
                // Try matching zero characters (skip the star)
                // OR matching one character (keep the star for more)
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            // Question mark matches exactly one character
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            // Literal character match
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            // No match
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matching() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(glob_match("docs/*", "docs/a/b.md"));
        assert!(!glob_match("*.txt", "readme.md"));
        assert!(!glob_match("file?.dat", "file12.dat"));
    }

    #[test]
    fn glob_char_detection() {
        assert!(has_glob_chars("*.rs"));
        assert!(has_glob_chars("a?c"));
        assert!(!has_glob_chars("plain.txt"));
    }
}
