//! Binding configuration.

/// How a call picks among several overloads that all accept the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub enum OverloadPolicy {
    /// The first overload in declaration order wins.
    #[default]
    FirstMatch,
    /// More than one accepting overload is a `TypeError`.
    RejectAmbiguous,
}

/// Configuration applied to every module built by the registry.
#[derive(Clone, Debug)]
pub struct BindingConfig {
    /// Overload tie-break rule.
    pub overload_policy: OverloadPolicy,
    /// Allow integer arguments where a float is declared.
    pub implicit_conversions: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            overload_policy: OverloadPolicy::FirstMatch,
            implicit_conversions: true,
        }
    }
}

impl BindingConfig {
    pub fn strict() -> Self {
        Self {
            overload_policy: OverloadPolicy::RejectAmbiguous,
            implicit_conversions: false,
        }
    }
}
