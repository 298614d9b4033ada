//! Board bring-up.
use log::info;
use rtt_logger::RTTLogger;

use super::hal::{self, prelude::*, rcc::rec::AdcClkSel, serial};
use super::{
    adc_internal::{AdcInternal, AdcPins},
    delay::AsmDelay,
    gpio::{Gpio, GpioPins},
    pwm::{Pwm, PwmPins},
    Outputs, SerialRx, SerialTx, Systick,
};
use crate::settings::Settings;

pub struct ChamberDevices {
    pub adc: AdcInternal,
    pub outputs: Outputs,
    pub serial_tx: SerialTx,
    pub serial_rx: SerialRx,
}

/// Configure clocks, logging, the monotonic and all peripherals.
///
/// Actuator outputs are off on return. The host serial receive interrupt is enabled.
pub fn setup(
    core: rtic::export::Peripherals,
    device: hal::stm32::Peripherals,
    settings: &Settings,
) -> ChamberDevices {
    static LOGGER: RTTLogger = RTTLogger::new(log::LevelFilter::Info);
    rtt_target::rtt_init_print!();
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(log::LevelFilter::Info))
        .unwrap();
    info!("---Starting hardware setup");

    let pwr = device.PWR.constrain();
    let pwrcfg = pwr.freeze();
    let rcc = device.RCC.constrain();
    let mut ccdr = rcc
        .sys_ck(200.MHz())
        .hclk(200.MHz())
        .per_ck(64.MHz())
        .freeze(pwrcfg, &device.SYSCFG);
    ccdr.peripheral.kernel_adc_clk_mux(AdcClkSel::Per);

    Systick::start(core.SYST, ccdr.clocks.sysclk().to_Hz());
    let mut delay = AsmDelay::new(ccdr.clocks.c_ck().to_Hz());

    let gpioa = device.GPIOA.split(ccdr.peripheral.GPIOA);
    let gpiob = device.GPIOB.split(ccdr.peripheral.GPIOB);
    let gpioc = device.GPIOC.split(ccdr.peripheral.GPIOC);
    let gpiod = device.GPIOD.split(ccdr.peripheral.GPIOD);
    let gpioe = device.GPIOE.split(ccdr.peripheral.GPIOE);

    let gpio = Gpio::new(GpioPins {
        direction: [
            gpiod.pd0.into_push_pull_output().erase(),
            gpiod.pd1.into_push_pull_output().erase(),
            gpiod.pd3.into_push_pull_output().erase(),
            gpiod.pd4.into_push_pull_output().erase(),
            gpiod.pd5.into_push_pull_output().erase(),
            gpiod.pd6.into_push_pull_output().erase(),
        ],
    });

    let pwm = Pwm::new(
        &ccdr.clocks,
        (ccdr.peripheral.TIM1, ccdr.peripheral.TIM4),
        (device.TIM1, device.TIM4),
        PwmPins {
            magnitude0: gpioe.pe9.into_alternate(),
            magnitude1: gpioe.pe11.into_alternate(),
            magnitude2: gpioe.pe13.into_alternate(),
            magnitude3: gpioe.pe14.into_alternate(),
            magnitude4: gpiod.pd12.into_alternate(),
            magnitude5: gpiod.pd13.into_alternate(),
        },
        settings.pwm_divisor,
    );

    let adc = AdcInternal::new(
        &mut delay,
        &ccdr.clocks,
        ccdr.peripheral.ADC12,
        device.ADC1,
        AdcPins {
            thermistor: (
                gpioa.pa3.into_analog(),
                gpioa.pa6.into_analog(),
                gpiob.pb0.into_analog(),
                gpiob.pb1.into_analog(),
                gpioc.pc0.into_analog(),
                gpioc.pc4.into_analog(),
            ),
        },
    );

    let mut serial = device
        .USART1
        .serial(
            (gpioa.pa9.into_alternate(), gpioa.pa10.into_alternate()),
            settings.baud_rate.bps(),
            ccdr.peripheral.USART1,
            &ccdr.clocks,
        )
        .unwrap();
    serial.listen(serial::Event::Rxne);
    let (serial_tx, serial_rx) = serial.split();

    info!("---Hardware setup done");

    ChamberDevices {
        adc,
        outputs: Outputs { gpio, pwm },
        serial_tx,
        serial_rx,
    }
}
