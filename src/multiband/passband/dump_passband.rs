use crate::multiband::PassbandTrait;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A passband for the cases where we don't care about the actual passband, e.g. single-band
/// light curves
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct DumpPassband {}

impl PassbandTrait for DumpPassband {
    fn name(&self) -> &str {
        ""
    }
}
