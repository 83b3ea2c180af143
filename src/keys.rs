use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! remote_keys {
    ($($variant:ident => $wire:literal,)*) => {
        /// Buttons of the physical remote, as understood by `remoteKeyControl`.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum RemoteKey {
            $($variant,)*
        }

        impl RemoteKey {
            pub const ALL: &'static [RemoteKey] = &[$(RemoteKey::$variant,)*];

            /// Code sent on the wire for this key.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(RemoteKey::$variant => $wire,)*
                }
            }
        }
    };
}

remote_keys! {
    Power => "POWER",
    PowerOn => "POWER_ON",
    PowerOff => "POWER_OFF",
    Menu => "MENU",
    Home => "HOME",
    Source => "SOURCE",
    Tools => "TOOLS",
    Info => "INFO",
    Guide => "GUIDE",
    CursorUp => "CURSOR_UP",
    CursorDn => "CURSOR_DN",
    CursorLeft => "CURSOR_LEFT",
    CursorRight => "CURSOR_RIGHT",
    Enter => "ENTER",
    Return => "RETURN",
    Exit => "EXIT",
    VolUp => "VOL_UP",
    VolDn => "VOL_DN",
    Mute => "MUTE",
    ChUp => "CH_UP",
    ChDn => "CH_DN",
    PreCh => "PRE_CH",
    Num0 => "NUM_0",
    Num1 => "NUM_1",
    Num2 => "NUM_2",
    Num3 => "NUM_3",
    Num4 => "NUM_4",
    Num5 => "NUM_5",
    Num6 => "NUM_6",
    Num7 => "NUM_7",
    Num8 => "NUM_8",
    Num9 => "NUM_9",
    Red => "RED",
    Green => "GREEN",
    Yellow => "YELLOW",
    Blue => "BLUE",
    Play => "PLAY",
    Pause => "PAUSE",
    Stop => "STOP",
    Rewind => "REWIND",
    FastForward => "FF",
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unknown remote key {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for RemoteKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RemoteKey::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl Serialize for RemoteKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
