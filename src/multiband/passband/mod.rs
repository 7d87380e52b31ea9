mod dump_passband;
pub use dump_passband::DumpPassband;

mod passband_trait;
pub use passband_trait::PassbandTrait;
