// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;

use super::WriteDurability;
use crate::store::BackendError;

/// Turns an id into a file name that is safe on every platform.
///
/// Plain ids pass through unchanged. Anything that could be a reserved name, a relative path
/// segment or an illegal character is hex encoded behind a `~` prefix.
pub(super) fn encode_file_segment(segment: &str) -> String {
    if !needs_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(char::from(HEX[usize::from(b >> 4)]));
        out.push(char::from(HEX[usize::from(b & 0x0f)]));
    }
    out
}

fn needs_encoding(segment: &str) -> bool {
    if segment.starts_with('~') || segment.starts_with('.') {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let base = segment.split('.').next().unwrap_or(segment);
    if is_reserved_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_reserved_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    if matches!(base.as_str(), "CON" | "PRN" | "AUX" | "NUL") {
        return true;
    }
    let digit = base.strip_prefix("COM").or_else(|| base.strip_prefix("LPT"));
    matches!(digit, Some("1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9"))
}

/// Reads and decodes a JSON file. A missing file is `Ok(None)`.
pub(super) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, BackendError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BackendError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| BackendError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Creates every directory between `root` and `relative`, refusing to walk through symlinks.
fn create_dir_all_safe(root: &Path, relative: &Path) -> Result<(), BackendError> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(BackendError::SymlinkRefused { path: current });
            }
            Ok(md) if !md.is_dir() => {
                return Err(BackendError::Io {
                    path: current,
                    source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| BackendError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => return Err(BackendError::Io { path: current, source }),
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Replaces `path` (which must live under `root`) with `contents` in one rename.
pub(super) fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), BackendError> {
    fs::create_dir_all(root).map_err(|source| BackendError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let Ok(relative) = path.strip_prefix(root) else {
        return Err(BackendError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path is outside the store root"),
        });
    };
    if let Some(parent_rel) = relative.parent() {
        create_dir_all_safe(root, parent_rel)?;
    }

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(BackendError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(BackendError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(BackendError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent or file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(".kanflow.tmp.{}.{nanos}", file_name.to_string_lossy()));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| BackendError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = file.write_all(contents).and_then(|()| {
        if durability == WriteDurability::Durable {
            file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(BackendError::Io { path: tmp_path, source });
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(BackendError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| BackendError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| BackendError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::encode_file_segment;

    #[test]
    fn plain_segments_pass_through() {
        assert_eq!(encode_file_segment("wf-kanban_1"), "wf-kanban_1");
    }

    #[test]
    fn risky_segments_are_hex_encoded() {
        assert_eq!(encode_file_segment(".."), "~2e2e");
        assert_eq!(encode_file_segment("con"), "~636f6e");
        assert_eq!(encode_file_segment("a:b"), "~613a62");
        assert_eq!(encode_file_segment("~x"), "~7e78");
    }
}
