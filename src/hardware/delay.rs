//! Busy-wait delay for peripheral bring-up. SysTick is owned by the monotonic.
use embedded_hal::blocking::delay::DelayUs;

pub struct AsmDelay {
    cycles_per_us: u32,
}

impl AsmDelay {
    /// `core_clock` is the CPU clock in Hz.
    pub fn new(core_clock: u32) -> Self {
        Self {
            // cortex_m::asm::delay runs two cycles short per iteration on the M7.
            // See https://github.com/rust-embedded/cortex-m/issues/430
            cycles_per_us: (core_clock / 1_000_000) * 2,
        }
    }
}

impl<U: Into<u32>> DelayUs<U> for AsmDelay {
    fn delay_us(&mut self, us: U) {
        cortex_m::asm::delay(self.cycles_per_us.saturating_mul(us.into()))
    }
}
