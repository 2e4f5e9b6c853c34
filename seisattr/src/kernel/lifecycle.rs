use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
///
/// Every kernel is built from a plain config struct and validated once;
/// a constructed kernel only fails at run time on bad input buffers.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}
