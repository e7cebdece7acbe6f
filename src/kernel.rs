/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The kernel registry: `furnsh`/`unload`/`kclear`/`ktotal`/`kdata`, kind
//! inference from file extension, and the meta-kernel sandbox helpers the
//! case runner uses to stage kernels without handing the backend arbitrary
//! host paths.

use crate::errors::{IoSnafu, NotFoundSnafu, PathEscapesSandboxSnafu, RegistryError};
use log::{trace, warn};
use snafu::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelKind {
    Spk,
    Ck,
    Pck,
    Dsk,
    Text,
    Lsk,
    Fk,
    Ik,
    Sclk,
    Ek,
    Meta,
    Unknown,
    /// Matches every kind; used only as a filter argument to `ktotal`/`kdata`.
    All,
}

impl KernelKind {
    /// `Text` subsumes `Lsk/Fk/Ik/Sclk` for filtering purposes, and `All`
    /// matches anything.
    fn matches(self, actual: KernelKind) -> bool {
        match self {
            KernelKind::All => true,
            KernelKind::Text => matches!(
                actual,
                KernelKind::Text | KernelKind::Lsk | KernelKind::Fk | KernelKind::Ik | KernelKind::Sclk
            ),
            other => other == actual,
        }
    }
}

pub fn infer_kind(path: &Path) -> KernelKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "bsp" => KernelKind::Spk,
        "bc" => KernelKind::Ck,
        "bpc" => KernelKind::Pck,
        "bds" | "dsk" => KernelKind::Dsk,
        "tpc" | "pck" => KernelKind::Text,
        "tls" | "lsk" => KernelKind::Lsk,
        "tf" | "fk" => KernelKind::Fk,
        "ti" | "ik" => KernelKind::Ik,
        "tsc" | "sclk" => KernelKind::Sclk,
        "ek" => KernelKind::Ek,
        "tm" | "meta" => KernelKind::Meta,
        _ => KernelKind::Unknown,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum KernelSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KernelRecord {
    pub path: PathBuf,
    pub source: KernelSource,
    pub filtyp: String,
    pub handle: i32,
    pub kind: KernelKind,
}

#[derive(Default, Debug)]
pub struct KernelRegistry {
    records: Vec<KernelRecord>,
    next_handle: i32,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> i32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn insert(&mut self, path: PathBuf, source: KernelSource, kind: KernelKind) -> i32 {
        let handle = self.next_handle();
        trace!("kern.furnsh {path:?} -> handle {handle} ({kind:?})");
        self.records.push(KernelRecord {
            path,
            source,
            filtyp: format!("{kind:?}").to_ascii_uppercase(),
            handle,
            kind,
        });
        handle
    }

    /// Loads a kernel from a filesystem path; the record stores the path
    /// itself, bytes are only read where a consumer (e.g. meta-kernel
    /// expansion) actually needs the content.
    pub fn furnsh_path(&mut self, path: &Path) -> Result<i32, RegistryError> {
        ensure!(path.exists(), NotFoundSnafu { path: path.to_path_buf() });
        let kind = infer_kind(path);
        Ok(self.insert(path.to_path_buf(), KernelSource::Path(path.to_path_buf()), kind))
    }

    pub fn furnsh_bytes(&mut self, path: &Path, bytes: Vec<u8>) -> i32 {
        let kind = infer_kind(path);
        self.insert(path.to_path_buf(), KernelSource::Bytes(bytes), kind)
    }

    pub fn unload(&mut self, path: &Path) {
        if let Some(idx) = self.records.iter().position(|r| r.path == path) {
            trace!("kern.unload {path:?}");
            self.records.remove(idx);
        } else {
            warn!("kern.unload: no loaded kernel matches {path:?}");
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn ktotal(&self, kind: KernelKind) -> usize {
        self.records.iter().filter(|r| kind.matches(r.kind)).count()
    }

    pub fn kdata(&self, index: usize, kind: KernelKind) -> Option<&KernelRecord> {
        self.records
            .iter()
            .filter(|r| kind.matches(r.kind))
            .nth(index)
    }

    pub fn records(&self) -> &[KernelRecord] {
        &self.records
    }
}

/// Reads a meta-kernel's `KERNELS_TO_LOAD` assignment and returns the
/// entries verbatim (relative paths, not yet resolved against any sandbox
/// root). A minimal parser: it is not a general TPC/text-kernel reader,
/// only enough to find one `\begintext`-preceding assignment block.
pub fn parse_kernels_to_load(meta_text: &str) -> Vec<String> {
    let Some(start) = meta_text.find("KERNELS_TO_LOAD") else {
        return Vec::new();
    };
    let Some(open) = meta_text[start..].find('(') else {
        return Vec::new();
    };
    let Some(close) = meta_text[start + open..].find(')') else {
        return Vec::new();
    };
    let body = &meta_text[start + open + 1..start + open + close];
    body.split(|c| c == ',' || c == '\n')
        .map(|s| s.trim().trim_matches('\'').trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves a meta-kernel entry against `restrict_to_dir`, rejecting any
/// path that escapes it after canonicalization.
pub fn resolve_in_sandbox(entry: &str, restrict_to_dir: &Path) -> Result<PathBuf, RegistryError> {
    let candidate = restrict_to_dir.join(entry);
    let canonical_root = restrict_to_dir
        .canonicalize()
        .map_err(|e| RegistryError::Io {
            path: restrict_to_dir.to_path_buf(),
            reason: e.to_string(),
        })?;
    let canonical_candidate = candidate.canonicalize().ok().unwrap_or(candidate.clone());

    if !canonical_candidate.starts_with(&canonical_root) {
        return PathEscapesSandboxSnafu {
            entry: PathBuf::from(entry),
            root: restrict_to_dir.to_path_buf(),
        }
        .fail();
    }
    Ok(canonical_candidate)
}

pub fn read_kernel_bytes(path: &Path) -> Result<Vec<u8>, RegistryError> {
    std::fs::read(path).map_err(|e| {
        IoSnafu {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .build()
    })
}
