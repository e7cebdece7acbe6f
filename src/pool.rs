/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The kernel pool: a typed variable store (`put*`/`get*`) with wildcard
//! name matching and per-agent change watches, mirroring CSPICE's
//! `pool_c` family (`pdpool_c`/`pipool_c`/`pcpool_c`, `dtpool_c`, `swpool_c`).

use crate::errors::{EmptyNameSnafu, IntOutOfRangeSnafu, InvalidRangeSnafu, PoolError};
use log::trace;
use snafu::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub enum PoolEntry {
    Numeric(Vec<f64>),
    Character(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoolEntryDescriptor {
    pub name: String,
    pub len: usize,
    pub is_numeric: bool,
}

#[derive(Default, Debug)]
struct Watch {
    names: Vec<String>,
    dirty: bool,
}

#[derive(Default, Debug)]
pub struct KernelPool {
    vars: HashMap<String, PoolEntry>,
    watches: HashMap<String, Watch>,
    /// variable name -> agents watching it
    reverse_index: HashMap<String, HashSet<String>>,
}

fn require_name(name: &str) -> Result<String, PoolError> {
    let trimmed = name.trim();
    ensure!(!trimmed.is_empty(), EmptyNameSnafu);
    Ok(trimmed.to_string())
}

impl KernelPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
        self.watches.clear();
        self.reverse_index.clear();
    }

    fn mark_dirty(&mut self, name: &str) {
        if let Some(agents) = self.reverse_index.get(name) {
            for agent in agents {
                if let Some(w) = self.watches.get_mut(agent) {
                    w.dirty = true;
                }
            }
        }
    }

    pub fn put_double(&mut self, name: &str, values: Vec<f64>) -> Result<(), PoolError> {
        let name = require_name(name)?;
        trace!("pool.put_double {name} <- {} value(s)", values.len());
        self.vars.insert(name.clone(), PoolEntry::Numeric(values));
        self.mark_dirty(&name);
        Ok(())
    }

    pub fn put_int(&mut self, name: &str, values: Vec<i64>) -> Result<(), PoolError> {
        let name = require_name(name)?;
        for &v in &values {
            ensure!(
                v >= i32::MIN as i64 && v <= i32::MAX as i64,
                IntOutOfRangeSnafu {
                    name: name.clone(),
                    value: v,
                }
            );
        }
        trace!("pool.put_int {name} <- {} value(s)", values.len());
        let as_f64 = values.into_iter().map(|v| v as f64).collect();
        self.vars.insert(name.clone(), PoolEntry::Numeric(as_f64));
        self.mark_dirty(&name);
        Ok(())
    }

    pub fn put_char(&mut self, name: &str, values: Vec<String>) -> Result<(), PoolError> {
        let name = require_name(name)?;
        trace!("pool.put_char {name} <- {} value(s)", values.len());
        self.vars.insert(name.clone(), PoolEntry::Character(values));
        self.mark_dirty(&name);
        Ok(())
    }

    fn window(values: &[f64], start: i32, room: i32) -> Result<Vec<f64>, PoolError> {
        ensure!(start >= 0 && room > 0, InvalidRangeSnafu { start, room });
        let start = start as usize;
        if start >= values.len() {
            return Ok(Vec::new());
        }
        let end = (start + room as usize).min(values.len());
        Ok(values[start..end].to_vec())
    }

    fn window_str(values: &[String], start: i32, room: i32) -> Result<Vec<String>, PoolError> {
        ensure!(start >= 0 && room > 0, InvalidRangeSnafu { start, room });
        let start = start as usize;
        if start >= values.len() {
            return Ok(Vec::new());
        }
        let end = (start + room as usize).min(values.len());
        Ok(values[start..end].to_vec())
    }

    pub fn get_double(&self, name: &str, start: i32, room: i32) -> Result<Vec<f64>, PoolError> {
        match self.vars.get(name.trim()) {
            Some(PoolEntry::Numeric(values)) => Self::window(values, start, room),
            _ => Self::window(&[], start, room),
        }
    }

    pub fn get_int(&self, name: &str, start: i32, room: i32) -> Result<Vec<i64>, PoolError> {
        Ok(self
            .get_double(name, start, room)?
            .into_iter()
            .map(|v| v as i64)
            .collect())
    }

    pub fn get_char(&self, name: &str, start: i32, room: i32) -> Result<Vec<String>, PoolError> {
        match self.vars.get(name.trim()) {
            Some(PoolEntry::Character(values)) => Self::window_str(values, start, room),
            _ => Self::window_str(&[], start, room),
        }
    }

    fn matches_template(name: &str, template: &str) -> bool {
        fn inner(name: &[char], pat: &[char]) -> bool {
            match pat.first() {
                None => name.is_empty(),
                Some('*') => {
                    inner(name, &pat[1..]) || (!name.is_empty() && inner(&name[1..], pat))
                }
                Some('%') => !name.is_empty() && inner(&name[1..], &pat[1..]),
                Some('\\') if pat.len() > 1 => {
                    !name.is_empty() && name[0] == pat[1] && inner(&name[1..], &pat[2..])
                }
                Some(c) => !name.is_empty() && name[0] == *c && inner(&name[1..], &pat[1..]),
            }
        }
        let name_chars: Vec<char> = name.chars().collect();
        let pat_chars: Vec<char> = template.chars().collect();
        inner(&name_chars, &pat_chars)
    }

    pub fn get_names_matching(
        &self,
        template: &str,
        start: i32,
        room: i32,
    ) -> Result<Vec<String>, PoolError> {
        let mut names: Vec<String> = self
            .vars
            .keys()
            .filter(|n| Self::matches_template(n, template))
            .cloned()
            .collect();
        names.sort();
        let sliced = Self::window_str(
            &names.into_iter().collect::<Vec<_>>(),
            start,
            room,
        )?;
        Ok(sliced)
    }

    pub fn describe(&self, name: &str) -> Option<PoolEntryDescriptor> {
        self.vars.get(name.trim()).map(|entry| match entry {
            PoolEntry::Numeric(v) => PoolEntryDescriptor {
                name: name.trim().to_string(),
                len: v.len(),
                is_numeric: true,
            },
            PoolEntry::Character(v) => PoolEntryDescriptor {
                name: name.trim().to_string(),
                len: v.len(),
                is_numeric: false,
            },
        })
    }

    /// CSPICE's `expool_c`: existence is only true for numeric variables.
    pub fn exists(&self, name: &str) -> bool {
        matches!(self.vars.get(name.trim()), Some(PoolEntry::Numeric(_)))
    }

    pub fn watch(&mut self, agent: &str, names: Vec<String>) {
        for n in &names {
            self.reverse_index
                .entry(n.clone())
                .or_default()
                .insert(agent.to_string());
        }
        self.watches.insert(
            agent.to_string(),
            Watch {
                names,
                dirty: true,
            },
        );
    }

    pub fn check_update(&mut self, agent: &str) -> bool {
        match self.watches.get_mut(agent) {
            Some(w) if w.dirty => {
                w.dirty = false;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod ut_pool {
    use super::*;

    #[test]
    fn put_then_get_double_round_trips() {
        let mut pool = KernelPool::new();
        pool.put_double("GM", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(pool.get_double("GM", 0, 10).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(pool.get_double("GM", 1, 1).unwrap(), vec![2.0]);
    }

    #[test]
    fn put_int_rejects_out_of_range() {
        let mut pool = KernelPool::new();
        assert!(pool.put_int("BIG", vec![i64::MAX]).is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut pool = KernelPool::new();
        assert!(pool.put_double("   ", vec![1.0]).is_err());
    }

    #[test]
    fn invalid_range_is_rejected() {
        let pool = KernelPool::new();
        assert!(pool.get_double("X", -1, 1).is_err());
        assert!(pool.get_double("X", 0, 0).is_err());
    }

    #[test]
    fn exists_is_true_only_for_numeric() {
        let mut pool = KernelPool::new();
        pool.put_char("NAME", vec!["a".into()]).unwrap();
        pool.put_double("VAL", vec![1.0]).unwrap();
        assert!(!pool.exists("NAME"));
        assert!(pool.exists("VAL"));
        assert!(!pool.exists("MISSING"));
    }

    #[test]
    fn wildcard_matching_supports_star_and_percent() {
        let mut pool = KernelPool::new();
        pool.put_double("BODY399_GM", vec![1.0]).unwrap();
        pool.put_double("BODY301_GM", vec![1.0]).unwrap();
        pool.put_double("FRAME_IAU_EARTH", vec![1.0]).unwrap();

        let matches = pool.get_names_matching("BODY*_GM", 0, 10).unwrap();
        assert_eq!(matches, vec!["BODY301_GM", "BODY399_GM"]);

        let matches = pool.get_names_matching("BODY%%%_GM", 0, 10).unwrap();
        assert_eq!(matches, vec!["BODY301_GM", "BODY399_GM"]);
    }

    #[test]
    fn watch_marks_dirty_only_on_mutation_of_watched_name() {
        let mut pool = KernelPool::new();
        pool.watch("agent1", vec!["X".to_string()]);
        assert!(pool.check_update("agent1"));
        assert!(!pool.check_update("agent1"));

        pool.put_double("Y", vec![1.0]).unwrap();
        assert!(!pool.check_update("agent1"));

        pool.put_double("X", vec![1.0]).unwrap();
        assert!(pool.check_update("agent1"));
    }

    #[test]
    fn clear_removes_vars_and_watches() {
        let mut pool = KernelPool::new();
        pool.put_double("X", vec![1.0]).unwrap();
        pool.watch("agent1", vec!["X".to_string()]);
        pool.clear();
        assert!(!pool.exists("X"));
        assert!(!pool.check_update("agent1"));
    }
}
