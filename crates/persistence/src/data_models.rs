// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! JSON shapes of the audit event columns.

use serde::{Deserialize, Serialize};

/// Stored form of the `action_json` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAction {
    /// Mutation code, e.g. `"AFMELDEN_INDIV"`.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Stored form of the before and after snapshot columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub samenvatting: String,
}
