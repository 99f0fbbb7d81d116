use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::actions::{self, Action, PinEffect};
use crate::config::{POWER_PULSE_MS, SETTLE_MS};
use crate::receiver::Receiver;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightsState {
    #[default]
    Off,
    On,
}

impl LightsState {
    pub fn toggled(self) -> Self {
        match self {
            LightsState::Off => LightsState::On,
            LightsState::On => LightsState::Off,
        }
    }
}

impl From<LightsState> for PinState {
    fn from(state: LightsState) -> Self {
        match state {
            LightsState::Off => PinState::Low,
            LightsState::On => PinState::High,
        }
    }
}

/// Result of handling one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatch {
    pub code: u32,
    /// `None` when the code is not in the table.
    pub action: Option<&'static Action>,
}

/// Turns received codes into pin activity.
///
/// Owns the power-button output, the lights output, the delay used for both
/// the press pulse and the post-frame settle time, and the lights state.
pub struct Dispatcher<P, L, D> {
    power: P,
    lights: L,
    delay: D,
    lights_state: LightsState,
}

impl<P, L, D> Dispatcher<P, L, D>
where
    P: OutputPin,
    L: OutputPin,
    D: DelayNs,
{
    /// Drives both outputs low to match the initial lights state.
    pub fn new(mut power: P, mut lights: L, delay: D) -> Result<Self> {
        power.set_low().map_err(|_| Error::PowerPin)?;
        lights.set_low().map_err(|_| Error::LightsPin)?;
        Ok(Dispatcher {
            power,
            lights,
            delay,
            lights_state: LightsState::Off,
        })
    }

    pub fn lights(&self) -> LightsState {
        self.lights_state
    }

    /// One iteration of the receive loop.
    ///
    /// Returns `Ok(None)` straight away when the receiver has nothing. Otherwise
    /// the frame is dispatched, then the receiver is re-armed after
    /// [`SETTLE_MS`], even if dispatching failed.
    pub fn poll<R, W>(&mut self, receiver: &mut R, log: &mut W) -> Result<Option<Dispatch>>
    where
        R: Receiver,
        W: Write,
    {
        let Some(code) = receiver.try_decode() else {
            return Ok(None);
        };

        let dispatched = self.dispatch(code, log);
        self.delay.delay_ms(SETTLE_MS);
        receiver.resume();

        let action = dispatched?;
        Ok(Some(Dispatch { code, action }))
    }

    /// Logs the label for `code` and runs its pin effect.
    ///
    /// Unknown codes are ignored without logging. A failed log write does not
    /// stop the pin effect; it is reported afterwards.
    pub fn dispatch<W>(&mut self, code: u32, log: &mut W) -> Result<Option<&'static Action>>
    where
        W: Write,
    {
        let Some(action) = actions::lookup(code) else {
            return Ok(None);
        };

        let logged = write!(log, "{}\r\n", action.label);

        match action.effect {
            Some(PinEffect::PulsePower) => self.pulse_power()?,
            Some(PinEffect::ToggleLights) => self.toggle_lights()?,
            None => {}
        }

        logged.map_err(|_| Error::Log)?;
        Ok(Some(action))
    }

    fn pulse_power(&mut self) -> Result<()> {
        self.power.set_high().map_err(|_| Error::PowerPin)?;
        self.delay.delay_ms(POWER_PULSE_MS);
        self.power.set_low().map_err(|_| Error::PowerPin)
    }

    fn toggle_lights(&mut self) -> Result<()> {
        let next = self.lights_state.toggled();
        self.lights
            .set_state(next.into())
            .map_err(|_| Error::LightsPin)?;
        self.lights_state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use core::convert::Infallible;
    use core::fmt;
    use std::rc::Rc;

    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

    use crate::dispatcher::{Dispatcher, LightsState};
    use crate::{Error, Receiver, ACTIONS, REPEAT_CODE};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Power(bool),
        Lights(bool),
        DelayMs(u32),
        Resume,
    }

    type Events = Rc<RefCell<Vec<Event>>>;

    struct FakePin {
        events: Events,
        event: fn(bool) -> Event,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.events.borrow_mut().push((self.event)(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.events.borrow_mut().push((self.event)(true));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Stuck;

    impl embedded_hal::digital::Error for Stuck {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Accepts the initial drive low, refuses everything after.
    struct StuckPin {
        writes: usize,
    }

    impl ErrorType for StuckPin {
        type Error = Stuck;
    }

    impl OutputPin for StuckPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.writes += 1;
            if self.writes == 1 {
                Ok(())
            } else {
                Err(Stuck)
            }
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.writes += 1;
            Err(Stuck)
        }
    }

    struct FakeDelay {
        events: Events,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, _ns: u32) {
            panic!("only millisecond delays are expected");
        }

        fn delay_ms(&mut self, ms: u32) {
            self.events.borrow_mut().push(Event::DelayMs(ms));
        }
    }

    struct FakeReceiver {
        events: Events,
        frame: Option<u32>,
    }

    impl Receiver for FakeReceiver {
        fn try_decode(&mut self) -> Option<u32> {
            self.frame
        }

        fn resume(&mut self) {
            self.frame = None;
            self.events.borrow_mut().push(Event::Resume);
        }
    }

    struct BrokenLog;

    impl fmt::Write for BrokenLog {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn setup() -> (Dispatcher<FakePin, FakePin, FakeDelay>, Events) {
        let events = Events::default();
        let dispatcher = Dispatcher::new(
            FakePin {
                events: events.clone(),
                event: Event::Power,
            },
            FakePin {
                events: events.clone(),
                event: Event::Lights,
            },
            FakeDelay {
                events: events.clone(),
            },
        )
        .unwrap();
        assert_eq!(
            events.take(),
            [Event::Power(false), Event::Lights(false)],
            "outputs start low"
        );
        (dispatcher, events)
    }

    fn receiver(events: &Events, code: u32) -> FakeReceiver {
        FakeReceiver {
            events: events.clone(),
            frame: Some(code),
        }
    }

    #[test]
    fn test_every_action_logs_its_label() {
        let (mut dispatcher, _) = setup();
        for action in ACTIONS {
            let mut log = String::new();
            let dispatched = dispatcher.dispatch(action.code, &mut log).unwrap();
            assert_eq!(dispatched, Some(action));
            assert_eq!(log, format!("{}\r\n", action.label));
        }
    }

    #[test]
    fn test_power_pulses_pin() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();
        let mut rx = receiver(&events, 0xFFA25D);

        let dispatch = dispatcher.poll(&mut rx, &mut log).unwrap().unwrap();
        assert_eq!(dispatch.code, 0xFFA25D);
        assert_eq!(dispatch.action.map(|a| a.label), Some("POWER"));
        assert_eq!(log, "POWER\r\n");
        assert_eq!(
            events.take(),
            [
                Event::Power(true),
                Event::DelayMs(100),
                Event::Power(false),
                Event::DelayMs(500),
                Event::Resume,
            ]
        );
        assert_eq!(dispatcher.lights(), LightsState::Off);
    }

    #[test]
    fn test_power_pulse_is_stateless() {
        let (mut dispatcher, events) = setup();
        for _ in 0..3 {
            dispatcher.dispatch(0xFFA25D, &mut String::new()).unwrap();
            assert_eq!(
                events.take(),
                [Event::Power(true), Event::DelayMs(100), Event::Power(false)]
            );
        }
    }

    #[test]
    fn test_func_stop_twice_restores_lights() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();

        dispatcher.poll(&mut receiver(&events, 0xFFE21D), &mut log).unwrap();
        assert_eq!(dispatcher.lights(), LightsState::On);
        dispatcher.poll(&mut receiver(&events, 0xFFE21D), &mut log).unwrap();
        assert_eq!(dispatcher.lights(), LightsState::Off);

        assert_eq!(log, "FUNC/STOP\r\nFUNC/STOP\r\n");
        assert_eq!(
            events.take(),
            [
                Event::Lights(true),
                Event::DelayMs(500),
                Event::Resume,
                Event::Lights(false),
                Event::DelayMs(500),
                Event::Resume,
            ]
        );
    }

    #[test]
    fn test_func_stop_parity() {
        for presses in 1..=6 {
            let (mut dispatcher, events) = setup();
            for _ in 0..presses {
                dispatcher.dispatch(0xFFE21D, &mut String::new()).unwrap();
            }
            let expected = if presses % 2 == 1 {
                LightsState::On
            } else {
                LightsState::Off
            };
            assert_eq!(dispatcher.lights(), expected);
            let last_pin = events.borrow().last().copied();
            assert_eq!(last_pin, Some(Event::Lights(expected == LightsState::On)));
        }
    }

    #[test]
    fn test_log_only_action() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();
        dispatcher.poll(&mut receiver(&events, 0xFF629D), &mut log).unwrap();
        assert_eq!(log, "VOL+\r\n");
        assert_eq!(events.take(), [Event::DelayMs(500), Event::Resume]);
    }

    #[test]
    fn test_repeat_does_not_replay() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();
        dispatcher.poll(&mut receiver(&events, 0xFFE21D), &mut log).unwrap();
        events.take();

        dispatcher.poll(&mut receiver(&events, REPEAT_CODE), &mut log).unwrap();
        assert_eq!(log, "FUNC/STOP\r\nREPEAT LAST\r\n");
        assert_eq!(events.take(), [Event::DelayMs(500), Event::Resume]);
        assert_eq!(dispatcher.lights(), LightsState::On);
    }

    #[test]
    fn test_unknown_code_is_silent() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();
        let dispatch = dispatcher
            .poll(&mut receiver(&events, 0x12345678), &mut log)
            .unwrap()
            .unwrap();
        assert_eq!(dispatch.code, 0x12345678);
        assert_eq!(dispatch.action, None);
        assert!(log.is_empty());
        // Still settles and re-arms.
        assert_eq!(events.take(), [Event::DelayMs(500), Event::Resume]);
    }

    #[test]
    fn test_no_frame_returns_immediately() {
        let (mut dispatcher, events) = setup();
        let mut log = String::new();
        let mut rx = FakeReceiver {
            events: events.clone(),
            frame: None,
        };
        assert_eq!(dispatcher.poll(&mut rx, &mut log), Ok(None));
        assert!(log.is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_log_failure_still_acts() {
        let (mut dispatcher, events) = setup();
        let result = dispatcher.poll(&mut receiver(&events, 0xFFE21D), &mut BrokenLog);
        assert_eq!(result, Err(Error::Log));
        assert_eq!(dispatcher.lights(), LightsState::On);
        assert_eq!(
            events.take(),
            [Event::Lights(true), Event::DelayMs(500), Event::Resume]
        );
    }

    #[test]
    fn test_pin_failure_still_resumes() {
        let events = Events::default();
        let mut dispatcher = Dispatcher::new(
            FakePin {
                events: events.clone(),
                event: Event::Power,
            },
            StuckPin { writes: 0 },
            FakeDelay {
                events: events.clone(),
            },
        )
        .unwrap();
        events.take();

        let mut log = String::new();
        let result = dispatcher.poll(&mut receiver(&events, 0xFFE21D), &mut log);
        assert_eq!(result, Err(Error::LightsPin));
        assert_eq!(dispatcher.lights(), LightsState::Off, "state follows the pin");
        assert_eq!(log, "FUNC/STOP\r\n");
        assert_eq!(events.take(), [Event::DelayMs(500), Event::Resume]);

        let result = dispatcher.poll(&mut receiver(&events, 0xFFA25D), &mut log);
        assert_eq!(result.map(|d| d.map(|d| d.code)), Ok(Some(0xFFA25D)));
    }
}
