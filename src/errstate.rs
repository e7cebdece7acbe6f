/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The SPICE error state machine: `failed/reset/setmsg/sigerr/chkin/chkout/getmsg`.

use serde::{Deserialize, Serialize};

/// Snapshot of the `failed/short/long/trace` quartet that every SPICE binding
/// exposes. One instance lives on each backend; it is never a global.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiceErrorState {
    pub failed: bool,
    pub short: String,
    pub long: String,
    pub trace: Vec<String>,
}

/// The three fields `getmsg` can be asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsgKind {
    Short,
    Long,
    Explain,
}

impl SpiceErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Sets the long message. Does not flip `failed` -- a matching `sigerr`
    /// must follow for the state to be considered a failure.
    pub fn setmsg(&mut self, msg: impl Into<String>) {
        self.long = msg.into();
    }

    /// Flips `failed` and records the short message. Leaves `long` untouched
    /// since it was populated by the preceding `setmsg`.
    pub fn sigerr(&mut self, short: impl Into<String>) {
        self.failed = true;
        self.short = short.into();
    }

    pub fn reset(&mut self) {
        self.failed = false;
        self.short.clear();
        self.long.clear();
        self.trace.clear();
    }

    pub fn chkin(&mut self, name: impl Into<String>) {
        self.trace.push(name.into());
    }

    /// Removes the last occurrence of `name`, tolerant to mismatched nesting
    /// (an unbalanced `chkout` is a no-op rather than a panic).
    pub fn chkout(&mut self, name: &str) {
        if let Some(idx) = self.trace.iter().rposition(|n| n == name) {
            self.trace.remove(idx);
        }
    }

    pub fn getmsg(&self, kind: MsgKind) -> String {
        match kind {
            MsgKind::Short => self.short.clone(),
            MsgKind::Long => self.long.clone(),
            MsgKind::Explain => {
                if self.long.is_empty() && self.trace.is_empty() {
                    String::new()
                } else if self.trace.is_empty() {
                    self.long.clone()
                } else {
                    format!("{} (trace: {})", self.long, self.trace.join(" -> "))
                }
            }
        }
    }
}

#[cfg(test)]
mod ut_errstate {
    use super::*;

    #[test]
    fn setmsg_then_sigerr_preserves_long() {
        let mut st = SpiceErrorState::new();
        st.setmsg("division by zero in spkezr");
        assert!(!st.failed());
        st.sigerr("SPICE(DIVIDEBYZERO)");
        assert!(st.failed());
        assert_eq!(st.getmsg(MsgKind::Long), "division by zero in spkezr");
        assert_eq!(st.getmsg(MsgKind::Short), "SPICE(DIVIDEBYZERO)");
    }

    #[test]
    fn reset_clears_everything() {
        let mut st = SpiceErrorState::new();
        st.setmsg("oops");
        st.sigerr("SPICE(OOPS)");
        st.chkin("subpnt_c");
        st.reset();
        assert_eq!(st, SpiceErrorState::default());
    }

    #[test]
    fn chkin_chkout_tolerant_to_mismatch() {
        let mut st = SpiceErrorState::new();
        st.chkin("a");
        st.chkin("b");
        st.chkout("z"); // no such entry, tolerated
        assert_eq!(st.trace, vec!["a", "b"]);
        st.chkout("a");
        assert_eq!(st.trace, vec!["b"]);
    }

    #[test]
    fn explain_empty_when_both_empty() {
        let st = SpiceErrorState::new();
        assert_eq!(st.getmsg(MsgKind::Explain), "");
    }
}
