//! Output layout options

use serde::{Deserialize, Serialize};

/// Controls the layout of encoded JSON and XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Indented, one member/element per line
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set
    pub indent: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

impl EncodeOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub(crate) fn indent_bytes(&self) -> Vec<u8> {
        vec![b' '; self.indent]
    }
}
