#![no_std]
#![no_main]

use rp_pico as bsp;

use bsp::entry;
use defmt::{debug, info, warn};
use defmt_rtt as _;
use panic_probe as _;

use bsp::hal::{
    clocks::init_clocks_and_plls,
    gpio::{bank0, FunctionSio, Interrupt, Pin, PullDown, PullUp, SioInput, SioOutput},
    pac::{self, interrupt},
    sio::Sio,
    timer::Timer,
    usb::UsbBus,
    watchdog::Watchdog,
};

use core::cell::RefCell;
use core::fmt;

use cortex_m::interrupt::Mutex;

use usb_device::{class_prelude::*, prelude::*};
use usbd_serial::SerialPort;

use infrared::{protocol::Nec, Receiver as InfraredReceiver};

use irctl::{Dispatcher, LineFramer, NecReceiver, Receiver, Sink, SinkError};

// --- Configuration ---
const XOSC_CRYSTAL_FREQ: u32 = 12_000_000; // 12 MHz

// USB VID/PID (pid.codes test pair, CDC-ACM)
const USB_VENDOR_ID: u16 = 0x16c0;
const USB_PRODUCT_ID: u16 = 0x27dd;

// Longest label plus CRLF fits with room to spare
const LOG_LINE_LEN: usize = 64;

// GPIO Pins
type IrRxPin = Pin<bank0::Gpio16, FunctionSio<SioInput>, PullUp>; // Active-low demodulating receiver
type PowerPin = Pin<bank0::Gpio17, FunctionSio<SioOutput>, PullDown>; // Host power button
type LightsPin = Pin<bank0::Gpio18, FunctionSio<SioOutput>, PullDown>; // Lights relay

struct Console {
    device: UsbDevice<'static, UsbBus>,
    serial: SerialPort<'static, UsbBus>,
    framer: LineFramer,
}

impl Console {
    fn write_line(&mut self, line: &[u8]) -> fmt::Result {
        let mut port = Port(&mut self.serial);
        // Whatever does not fit is dropped; the framer keeps labels on separate lines.
        self.framer
            .write_line(&mut port, line)
            .map_err(|_| fmt::Error)
    }
}

struct Port<'a>(&'a mut SerialPort<'static, UsbBus>);

impl Sink for Port<'_> {
    fn try_write(&mut self, data: &[u8]) -> Result<usize, SinkError> {
        match self.0.write(data) {
            Ok(count) => Ok(count),
            Err(UsbError::WouldBlock) => Err(SinkError::Full),
            Err(_) => Err(SinkError::Failed),
        }
    }
}

/// IR decoder state, owned by `IO_IRQ_BANK0`.
struct IrCapture {
    decoder: InfraredReceiver<Nec, IrRxPin>,
    timer: Timer,
    receiver: NecReceiver,
}

impl IrCapture {
    fn on_edge(&mut self) {
        if let Ok(Some(command)) = self.decoder.event_instant(self.timer.get_counter_low()) {
            self.receiver.on_command(&command);
        }

        let pin = self.decoder.pin_mut();
        pin.clear_interrupt(Interrupt::EdgeLow);
        pin.clear_interrupt(Interrupt::EdgeHigh);
    }
}

static CONSOLE: Mutex<RefCell<Option<Console>>> = Mutex::new(RefCell::new(None));
static IR: Mutex<RefCell<Option<IrCapture>>> = Mutex::new(RefCell::new(None));

/// Main-loop handle on the interrupt-owned receiver.
struct SharedReceiver;

impl Receiver for SharedReceiver {
    fn try_decode(&mut self) -> Option<u32> {
        cortex_m::interrupt::free(|cs| {
            IR.borrow(cs)
                .borrow_mut()
                .as_mut()
                .and_then(|ir| ir.receiver.try_decode())
        })
    }

    fn resume(&mut self) {
        cortex_m::interrupt::free(|cs| {
            if let Some(ir) = IR.borrow(cs).borrow_mut().as_mut() {
                ir.receiver.resume();
            }
        });
    }
}

/// Writes whole lines to the USB console so labels never interleave.
struct UsbLog {
    line: heapless::String<LOG_LINE_LEN>,
}

impl UsbLog {
    const fn new() -> Self {
        UsbLog {
            line: heapless::String::new(),
        }
    }

    fn flush(&mut self) -> fmt::Result {
        let result = cortex_m::interrupt::free(|cs| {
            match CONSOLE.borrow(cs).borrow_mut().as_mut() {
                Some(console) => console.write_line(self.line.as_bytes()),
                None => Ok(()),
            }
        });
        self.line.clear();
        result
    }
}

impl fmt::Write for UsbLog {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.line.push(c).is_err() {
                self.flush()?;
                self.line.push(c).map_err(|_| fmt::Error)?;
            }
            if c == '\n' {
                self.flush()?;
            }
        }
        Ok(())
    }
}

#[entry]
fn main() -> ! {
    info!("ir-power-lights starting");

    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .expect("Clock setup failed");

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let pins = bsp::hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Configure GPIOs
    let ir_rx_pin: IrRxPin = pins.gpio16.into_pull_up_input();
    let power_pin: PowerPin = pins.gpio17.into_push_pull_output();
    let lights_pin: LightsPin = pins.gpio18.into_push_pull_output();

    // --- USB Setup ---
    let usb_bus: &'static UsbBusAllocator<UsbBus> = cortex_m::singleton!(
        : UsbBusAllocator<UsbBus> = UsbBusAllocator::new(UsbBus::new(
            pac.USBCTRL_REGS,
            pac.USBCTRL_DPRAM,
            clocks.usb_clock,
            true, // Force VBUS detection
            &mut pac.RESETS,
        ))
    )
    .unwrap();

    let decoder = InfraredReceiver::builder()
        .nec()
        .frequency(1_000_000)
        .pin(ir_rx_pin)
        .build();

    let serial = SerialPort::new(usb_bus);

    let device = UsbDeviceBuilder::new(usb_bus, UsbVidPid(USB_VENDOR_ID, USB_PRODUCT_ID))
        .device_class(usbd_serial::USB_CLASS_CDC)
        .strings(&[StringDescriptors::new(LangID::EN_US)
            .manufacturer("ir-power-lights")
            .product("IR remote power/lights controller")
            .serial_number("0000001")])
        .unwrap()
        .build();

    cortex_m::interrupt::free(|cs| {
        CONSOLE.borrow(cs).replace(Some(Console {
            device,
            serial,
            framer: LineFramer::new(),
        }));
        IR.borrow(cs).replace(Some(IrCapture {
            decoder,
            timer,
            receiver: NecReceiver::new(),
        }));

        if let Some(ir) = IR.borrow(cs).borrow_mut().as_mut() {
            let pin = ir.decoder.pin_mut();
            pin.set_interrupt_enabled(Interrupt::EdgeLow, true);
            pin.set_interrupt_enabled(Interrupt::EdgeHigh, true);
        }
    });

    // Safe because the shared state above is only touched inside critical sections
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    let mut dispatcher =
        Dispatcher::new(power_pin, lights_pin, timer).expect("Output pin setup failed");
    let mut receiver = SharedReceiver;
    let mut log = UsbLog::new();

    info!("listening on GPIO16, power GPIO17, lights GPIO18");

    loop {
        match dispatcher.poll(&mut receiver, &mut log) {
            Ok(Some(dispatch)) => match dispatch.action {
                Some(action) => debug!("{=u32:#x} {=str}", dispatch.code, action.label),
                None => debug!("unmapped code {=u32:#x}", dispatch.code),
            },
            Ok(None) => {}
            Err(e) => warn!("dispatch failed: {}", e),
        }
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn USBCTRL_IRQ() {
    cortex_m::interrupt::free(|cs| {
        if let Some(console) = CONSOLE.borrow(cs).borrow_mut().as_mut() {
            if console.device.poll(&mut [&mut console.serial]) {
                // Host input carries no commands; drain it so the endpoint stays open.
                let mut buf = [0u8; 64];
                let _ = console.serial.read(&mut buf);
            }
        }
    });
}

#[allow(non_snake_case)]
#[interrupt]
fn IO_IRQ_BANK0() {
    cortex_m::interrupt::free(|cs| {
        if let Some(ir) = IR.borrow(cs).borrow_mut().as_mut() {
            ir.on_edge();
        }
    });
}
