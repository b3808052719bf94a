use std::fmt;

/// One sub-metric of a network interface. The single-letter codes are the
/// ones used by the interface log files and their query strings: lowercase
/// for byte rates, uppercase for packet rates, `j`/`J` for the negated
/// inbound twins plotted below the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetworkChannel {
    In,
    Out,
    InNeg,
    InPackets,
    OutPackets,
    InPacketsNeg,
}

impl NetworkChannel {
    pub const ALL: [NetworkChannel; 6] = [
        NetworkChannel::In,
        NetworkChannel::Out,
        NetworkChannel::InNeg,
        NetworkChannel::InPackets,
        NetworkChannel::OutPackets,
        NetworkChannel::InPacketsNeg,
    ];

    pub fn as_letter(&self) -> char {
        match self {
            NetworkChannel::In => 'i',
            NetworkChannel::Out => 'o',
            NetworkChannel::InNeg => 'j',
            NetworkChannel::InPackets => 'I',
            NetworkChannel::OutPackets => 'O',
            NetworkChannel::InPacketsNeg => 'J',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'i' => Some(NetworkChannel::In),
            'o' => Some(NetworkChannel::Out),
            'j' => Some(NetworkChannel::InNeg),
            'I' => Some(NetworkChannel::InPackets),
            'O' => Some(NetworkChannel::OutPackets),
            'J' => Some(NetworkChannel::InPacketsNeg),
            _ => None,
        }
    }

    /// Packet channels downsample with the bucket maximum instead of the
    /// mean, so the largest deflection survives on dense windows.
    pub fn uses_max(&self) -> bool {
        matches!(
            self,
            NetworkChannel::InPackets
                | NetworkChannel::OutPackets
                | NetworkChannel::InPacketsNeg
        )
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, NetworkChannel::InNeg | NetworkChannel::InPacketsNeg)
    }
}

/// One sub-metric of a storage entity (mdisk, vdisk, RAID group):
/// read/write bytes, IOs, latency and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageChannel {
    ReadBytes,
    WriteBytes,
    ReadIo,
    WriteIo,
    ReadLatency,
    WriteLatency,
    ReadTransactions,
    WriteTransactions,
}

impl StorageChannel {
    pub const ALL: [StorageChannel; 8] = [
        StorageChannel::ReadBytes,
        StorageChannel::WriteBytes,
        StorageChannel::ReadIo,
        StorageChannel::WriteIo,
        StorageChannel::ReadLatency,
        StorageChannel::WriteLatency,
        StorageChannel::ReadTransactions,
        StorageChannel::WriteTransactions,
    ];

    pub fn as_code(&self) -> &'static str {
        match self {
            StorageChannel::ReadBytes => "rb",
            StorageChannel::WriteBytes => "wb",
            StorageChannel::ReadIo => "ro",
            StorageChannel::WriteIo => "wo",
            StorageChannel::ReadLatency => "rl",
            StorageChannel::WriteLatency => "wl",
            StorageChannel::ReadTransactions => "rt",
            StorageChannel::WriteTransactions => "wt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "rb" => Some(StorageChannel::ReadBytes),
            "wb" => Some(StorageChannel::WriteBytes),
            "ro" => Some(StorageChannel::ReadIo),
            "wo" => Some(StorageChannel::WriteIo),
            "rl" => Some(StorageChannel::ReadLatency),
            "wl" => Some(StorageChannel::WriteLatency),
            "rt" => Some(StorageChannel::ReadTransactions),
            "wt" => Some(StorageChannel::WriteTransactions),
            _ => None,
        }
    }

    /// Attribute name in the Storwize stats XML. Transactions are counted
    /// in the `ctr`/`ctw` attributes, every other channel matches its code.
    pub fn xml_attribute(&self) -> &'static str {
        match self {
            StorageChannel::ReadTransactions => "ctr",
            StorageChannel::WriteTransactions => "ctw",
            other => other.as_code(),
        }
    }

    /// Byte channels are reported in blocks and must be multiplied by the
    /// collection's `sizeUnits` attribute.
    pub fn scales_with_size_unit(&self) -> bool {
        matches!(self, StorageChannel::ReadBytes | StorageChannel::WriteBytes)
    }
}

/// A channel key usable across both metric domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Network(NetworkChannel),
    Storage(StorageChannel),
}

impl Channel {
    /// Whether dense windows of this channel downsample with the bucket
    /// maximum. Only the packet channels do; storage channels average.
    pub fn uses_max(&self) -> bool {
        match self {
            Channel::Network(channel) => channel.uses_max(),
            Channel::Storage(_) => false,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Network(channel) => write!(f, "{}", channel.as_letter()),
            Channel::Storage(channel) => write!(f, "{}", channel.as_code()),
        }
    }
}
