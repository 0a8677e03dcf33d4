/// Severity of a log message.
///
/// Levels are totally ordered and numerically valued: lower numbers are
/// *more* severe. "At or below a threshold" means numerically `<=` that
/// threshold, so filtering is plain integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Information = 6,
    Debug = 7,
    Verbose = 8,
    /// Sentinel above `Verbose`, used only to disable a receiver entirely.
    None = 9,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "Emergency",
            Self::Alert => "Alert",
            Self::Critical => "Critical",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Notice => "Notice",
            Self::Information => "Information",
            Self::Debug => "Debug",
            Self::Verbose => "Verbose",
            Self::None => "None",
        }
    }

    /// Single-character initial used by the `ShortColored` formatter preset.
    pub const fn initial(self) -> char {
        match self {
            Self::Emergency => 'M',
            Self::Alert => 'A',
            Self::Critical => 'C',
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Notice => 'N',
            Self::Information => 'I',
            Self::Debug => 'D',
            Self::Verbose => 'V',
            Self::None => '-',
        }
    }

    /// Ordinal position used for the severity-bridge mapping (§6); `None` is
    /// excluded since it never appears on an emitted message.
    pub(crate) const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of the `#[repr(u8)]` discriminant, used to decode the
    /// dispatcher's `global_min_level` fast-path cache.
    pub(crate) const fn from_ordinal(raw: u8) -> Option<LogLevel> {
        match raw {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Information),
            7 => Some(Self::Debug),
            8 => Some(Self::Verbose),
            9 => Some(Self::None),
            _ => Option::None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
