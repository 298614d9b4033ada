//! # Thermostat chambers
//!
//! Firmware for a six chamber thermoelectric temperature controller.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
use panic_probe as _; // global panic handler

use thermostat_chambers::settings::Settings;

#[cfg(not(target_os = "none"))]
fn main() {
    let s = Settings::default();
    let json: heapless::String<512> = serde_json_core::to_string(&s).unwrap();
    println!("{json}");
}

#[cfg(target_os = "none")]
#[rtic::app(device = thermostat_chambers::hardware::hal::stm32, peripherals = true)]
mod app {
    use super::*;
    use rtic_monotonics::Monotonic;
    use rtic_sync::{channel::*, make_channel};
    use thermostat_chambers::bank::ChamberBank;
    use thermostat_chambers::command::{Line, LineBuffer};
    use thermostat_chambers::hardware::{
        adc_internal::AdcInternal, hal::prelude::*, setup::setup, Outputs, SerialRx, SerialTx,
        Systick,
    };

    /// Command lines received but not yet executed.
    const PENDING_LINES: usize = 4;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        bank: ChamberBank,
        adc: AdcInternal,
        outputs: Outputs,
        serial_tx: SerialTx,
        serial_rx: SerialRx,
        line_buffer: LineBuffer,
        pending: Sender<'static, Line, PENDING_LINES>,
        commands: Receiver<'static, Line, PENDING_LINES>,
    }

    #[init]
    fn init(c: init::Context) -> (Shared, Local) {
        let settings = Settings::default();

        // setup hardware
        let mut devices = setup(c.core, c.device, &settings);

        let mut bank = ChamberBank::new(&settings, Systick::now());
        bank.apply_all(&mut devices.outputs);

        let (pending, commands) = make_channel!(Line, PENDING_LINES);

        let local = Local {
            bank,
            adc: devices.adc,
            outputs: devices.outputs,
            serial_tx: devices.serial_tx,
            serial_rx: devices.serial_rx,
            line_buffer: LineBuffer::new(),
            pending,
            commands,
        };

        (Shared {}, local)
    }

    /// Single writer of chamber state: commands first, then the cycle gate.
    #[idle(local=[bank, adc, outputs, serial_tx, commands])]
    fn idle(c: idle::Context) -> ! {
        loop {
            while let Ok(line) = c.local.commands.try_recv() {
                c.local.bank.handle_line(&line, c.local.outputs);
            }
            if let Err(e) = c.local.bank.poll(
                Systick::now(),
                c.local.adc,
                c.local.outputs,
                c.local.serial_tx,
            ) {
                log::warn!("Telemetry error: {e:?}");
            }
        }
    }

    #[task(binds = USART1, priority = 1, local=[serial_rx, line_buffer, pending])]
    fn serial_rx(c: serial_rx::Context) {
        while let Ok(byte) = c.local.serial_rx.read() {
            if let Some(line) = c.local.line_buffer.push(byte) {
                if let Err(e) = c.local.pending.try_send(line) {
                    log::warn!("Command queue overflow: {e:?}");
                }
            }
        }
    }
}
