use serde::Serialize;
use std::fmt::Debug;

/// Label of an observational filter
///
/// Passbands are ordered, the order defines the order of per-passband periodograms
pub trait PassbandTrait: Debug + Clone + Send + Sync + Ord + Serialize {
    fn name(&self) -> &str;
}

impl PassbandTrait for String {
    fn name(&self) -> &str {
        self
    }
}

impl PassbandTrait for &str {
    fn name(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_passband_names() {
        assert_eq!(PassbandTrait::name(&String::from("ztf_g")), "ztf_g");
        assert_eq!(PassbandTrait::name(&"ztf_r"), "ztf_r");
    }
}
