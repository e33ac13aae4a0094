//! Verdict literals for each gate.
//!
//! The string form of every verdict is part of the wire contract with the
//! YAML branch tables of workflow definitions and must match byte for byte.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

macro_rules! verdict_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $literal:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every verdict this gate can declare, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire literal for this verdict.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $literal,)+
                }
            }

            /// Parse a wire literal.
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($literal => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let literal = String::deserialize(deserializer)?;
                $name::from_str(&literal).ok_or_else(|| {
                    de::Error::custom(format!(
                        "unknown {} verdict '{}'",
                        stringify!($name),
                        literal
                    ))
                })
            }
        }
    };
}

verdict_enum! {
    /// Outcome of `deployment_ready`.
    DeploymentVerdict {
        Ready => "ready",
        Blocked => "blocked",
        Failed => "failed",
    }
}

verdict_enum! {
    /// Outcome of `health_check_status`.
    HealthVerdict {
        Healthy => "healthy",
        Degraded => "degraded",
        Unhealthy => "unhealthy",
    }
}

verdict_enum! {
    /// Outcome of `rollback_needed`.
    RollbackVerdict {
        Rollback => "rollback",
        Monitor => "monitor",
        Stable => "stable",
    }
}

verdict_enum! {
    /// Outcome of `container_build_status`.
    BuildVerdict {
        Success => "success",
        Warning => "warning",
        Failed => "failed",
    }
}

verdict_enum! {
    /// Outcome of `infrastructure_drift`.
    DriftVerdict {
        NoDrift => "no_drift",
        MinorDrift => "minor_drift",
        MajorDrift => "major_drift",
        Destructive => "destructive",
    }
}

verdict_enum! {
    /// Outcome of `security_scan_verdict`.
    ScanVerdict {
        Pass => "pass",
        Warn => "warn",
        Fail => "fail",
    }
}

verdict_enum! {
    /// Outcome of `pipeline_stage_gate`.
    StageVerdict {
        Proceed => "proceed",
        /// Declared in branch tables but never produced by the current rules.
        Retry => "retry",
        Abort => "abort",
    }
}

/// Ordered severity scale used by the security scan gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity threshold; unknown strings resolve to `High`.
    pub fn parse_threshold(s: &str) -> Self {
        match s {
            "info" => Severity::Info,
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::High,
        }
    }

    /// Position in the `[info, low, medium, high, critical]` scale.
    pub fn index(self) -> usize {
        self as usize
    }
}
