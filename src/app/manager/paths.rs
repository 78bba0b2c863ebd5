//! Destination path generation
//!
//! Output file names are derived from identifiers alone, so every run
//! targets the same path for the same item.

use std::path::{Path, PathBuf};

use crate::constants::files;

/// Path generation utility for downloaded assets
pub struct PathGenerator;

impl PathGenerator {
    /// Destination for `identifier` under `output_dir`
    ///
    /// Distinct identifiers map to distinct names: an identifier that had to
    /// be sanitized carries a digest of its raw form, and a configured
    /// `default_extension` is always appended.
    pub fn destination_for(
        output_dir: &Path,
        identifier: &str,
        default_extension: Option<&str>,
    ) -> PathBuf {
        output_dir.join(Self::file_name_for(identifier, default_extension))
    }

    /// File name for `identifier`
    pub fn file_name_for(identifier: &str, default_extension: Option<&str>) -> String {
        let mut name = Self::sanitize(identifier);
        if name != identifier {
            name.push('-');
            name.push_str(&Self::short_digest(identifier));
        }

        if let Some(extension) = default_extension.map(|ext| ext.trim_start_matches('.')) {
            if !extension.is_empty() {
                name.push('.');
                name.push_str(extension);
            }
        }

        name
    }

    /// Replace characters that are unsafe in file names
    pub fn sanitize(identifier: &str) -> String {
        let sanitized: String = identifier
            .trim()
            .chars()
            .map(|c| {
                if files::UNSAFE_FILENAME_CHARS.contains(&c) || c.is_control() {
                    files::FILENAME_REPLACEMENT
                } else {
                    c
                }
            })
            .collect();

        // "." and ".." would escape or alias the output directory
        match sanitized.as_str() {
            "" | "." | ".." => sanitized.replace('.', "-") + "_",
            _ => sanitized,
        }
    }

    fn short_digest(identifier: &str) -> String {
        let digest = format!("{:x}", md5::compute(identifier.as_bytes()));
        digest[..files::NAME_DIGEST_LEN].to_string()
    }
}
