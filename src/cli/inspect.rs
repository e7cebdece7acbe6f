/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Display, Error as FmtError, Formatter};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::backend::{FakeBackend, Found, SpiceBackend};
use crate::errors::SpiceError;
use crate::kernel::{infer_kind, KernelKind};

/// A single-kernel report, built by loading `kernel` into a throwaway
/// [`FakeBackend`] and reading back its registry record.
pub struct KernelReport {
    pub path: String,
    pub kind: KernelKind,
    pub filtyp: String,
    pub handle: i32,
}

#[derive(Tabled)]
struct Row<'a> {
    field: &'a str,
    value: String,
}

fn kind_label(kind: KernelKind) -> &'static str {
    match kind {
        KernelKind::Spk => "SPK",
        KernelKind::Ck => "CK",
        KernelKind::Pck => "PCK",
        KernelKind::Dsk => "DSK",
        KernelKind::Text => "TEXT",
        KernelKind::Lsk => "LSK",
        KernelKind::Fk => "FK",
        KernelKind::Ik => "IK",
        KernelKind::Sclk => "SCLK",
        KernelKind::Ek => "EK",
        KernelKind::Meta => "META",
        KernelKind::Unknown | KernelKind::All => "ALL",
    }
}

impl KernelReport {
    pub fn load(kernel: &Path) -> Result<Self, SpiceError> {
        let mut backend = FakeBackend::new();
        let path_str = kernel.to_string_lossy().into_owned();
        backend.furnsh(&path_str)?;
        let kind = infer_kind(kernel);
        match backend.kdata(0, kind_label(kind)) {
            Found::Yes(record) => Ok(Self {
                path: path_str,
                kind,
                filtyp: record.filtyp,
                handle: record.handle,
            }),
            Found::No => Ok(Self {
                path: path_str,
                kind,
                filtyp: "UNKNOWN".to_string(),
                handle: -1,
            }),
        }
    }
}

impl Display for KernelReport {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        writeln!(f, "Kernel: {}", self.path)?;
        let rows = vec![
            Row {
                field: "kind",
                value: kind_label(self.kind).to_string(),
            },
            Row {
                field: "filtyp",
                value: self.filtyp.clone(),
            },
            Row {
                field: "handle",
                value: self.handle.to_string(),
            },
        ];
        let tbl = Table::new(rows).with(Style::rounded());
        write!(f, "{}", tbl)
    }
}
