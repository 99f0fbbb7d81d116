/// Code the remote sends while a button is held down.
///
/// It is logged like any other button but never replays the previous action.
pub const REPEAT_CODE: u32 = 0xFFFF_FFFF;

/// What a button does to the outputs, beyond being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinEffect {
    /// Momentary press on the host's power button.
    PulsePower,
    /// Flip the lights output.
    ToggleLights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Action {
    pub code: u32,
    /// Line written to the serial console. The host companion matches on it.
    pub label: &'static str,
    pub effect: Option<PinEffect>,
}

impl Action {
    const fn log_only(code: u32, label: &'static str) -> Self {
        Action {
            code,
            label,
            effect: None,
        }
    }
}

/// Buttons of the 21-key NEC remote, keyed by the full 32-bit frame.
pub static ACTIONS: &[Action] = &[
    Action {
        code: 0xFFA25D,
        label: "POWER",
        effect: Some(PinEffect::PulsePower),
    },
    Action {
        code: 0xFFE21D,
        label: "FUNC/STOP",
        effect: Some(PinEffect::ToggleLights),
    },
    Action::log_only(0xFF629D, "VOL+"),
    Action::log_only(0xFF22DD, "FAST BACK"),
    Action::log_only(0xFF02FD, "PAUSE"),
    Action::log_only(0xFFC23D, "FAST FORWARD"),
    Action::log_only(0xFFE01F, "DOWN"),
    Action::log_only(0xFFA857, "VOL-"),
    Action::log_only(0xFF906F, "UP"),
    Action::log_only(0xFF9867, "EQ"),
    Action::log_only(0xFFB04F, "ST/REPT"),
    Action::log_only(0xFF6897, "0"),
    Action::log_only(0xFF30CF, "1"),
    Action::log_only(0xFF18E7, "2"),
    Action::log_only(0xFF7A85, "3"),
    Action::log_only(0xFF10EF, "4"),
    Action::log_only(0xFF38C7, "5"),
    Action::log_only(0xFF5AA5, "6"),
    Action::log_only(0xFF42BD, "7"),
    Action::log_only(0xFF4AB5, "8"),
    Action::log_only(0xFF52AD, "9"),
    Action::log_only(REPEAT_CODE, "REPEAT LAST"),
];

pub fn lookup(code: u32) -> Option<&'static Action> {
    ACTIONS.iter().find(|action| action.code == code)
}

#[cfg(test)]
mod tests {
    use crate::actions::{lookup, PinEffect, ACTIONS, REPEAT_CODE};

    #[test]
    fn test_lookup_labels() {
        for (code, label) in [
            (0xFFA25D, "POWER"),
            (0xFFE21D, "FUNC/STOP"),
            (0xFF629D, "VOL+"),
            (0xFFA857, "VOL-"),
            (0xFFB04F, "ST/REPT"),
            (0xFF6897, "0"),
            (0xFF52AD, "9"),
            (REPEAT_CODE, "REPEAT LAST"),
        ] {
            assert_eq!(lookup(code).map(|a| a.label), Some(label), "{code:#X}");
        }
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(lookup(0x12345678), None);
        assert_eq!(lookup(0), None);
        // Bare command byte without the address prefix is not a match.
        assert_eq!(lookup(0xA25D), None);
    }

    #[test]
    fn test_only_power_and_func_stop_drive_pins() {
        let with_effect: Vec<_> = ACTIONS
            .iter()
            .filter_map(|a| a.effect.map(|e| (a.label, e)))
            .collect();
        assert_eq!(
            with_effect,
            [
                ("POWER", PinEffect::PulsePower),
                ("FUNC/STOP", PinEffect::ToggleLights)
            ]
        );
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in ACTIONS.iter().enumerate() {
            assert!(
                ACTIONS[i + 1..].iter().all(|b| b.code != a.code),
                "duplicate code {:#X}",
                a.code
            );
        }
    }
}
