use super::{Channel, NetworkChannel, StorageChannel};
use std::fmt;

/// Unit of a metric: either one fixed unit string for every channel, or
/// the storage-style per-channel mapping (bytes, IOs, latency,
/// transactions each carry their own unit).
#[derive(Debug, Clone, PartialEq)]
pub enum UnitSpec {
    Fixed(String),
    PerChannel,
}

impl UnitSpec {
    pub fn fixed(name: impl Into<String>) -> Self {
        UnitSpec::Fixed(name.into())
    }

    pub fn for_channel(&self, channel: &Channel) -> &str {
        match self {
            UnitSpec::Fixed(unit) => unit,
            UnitSpec::PerChannel => match channel {
                Channel::Network(
                    NetworkChannel::In | NetworkChannel::Out | NetworkChannel::InNeg,
                ) => "B/s",
                Channel::Network(_) => "p/s",
                Channel::Storage(
                    StorageChannel::ReadBytes | StorageChannel::WriteBytes,
                ) => "B/s",
                Channel::Storage(StorageChannel::ReadIo | StorageChannel::WriteIo) => "io/s",
                Channel::Storage(
                    StorageChannel::ReadLatency | StorageChannel::WriteLatency,
                ) => "ms",
                Channel::Storage(
                    StorageChannel::ReadTransactions | StorageChannel::WriteTransactions,
                ) => "tr/s",
            },
        }
    }
}

impl fmt::Display for UnitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSpec::Fixed(unit) => write!(f, "{}", unit),
            UnitSpec::PerChannel => write!(f, "per-channel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_channel_units() {
        let unit = UnitSpec::PerChannel;
        assert_eq!(
            unit.for_channel(&Channel::Storage(StorageChannel::ReadBytes)),
            "B/s"
        );
        assert_eq!(
            unit.for_channel(&Channel::Storage(StorageChannel::WriteLatency)),
            "ms"
        );
        assert_eq!(
            unit.for_channel(&Channel::Storage(StorageChannel::ReadTransactions)),
            "tr/s"
        );
    }

    #[test]
    fn test_fixed_unit_applies_everywhere() {
        let unit = UnitSpec::fixed("°C");
        assert_eq!(unit.for_channel(&Channel::Network(NetworkChannel::In)), "°C");
    }
}
