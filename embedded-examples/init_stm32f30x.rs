//! Full example code for bringing up a 128x64 SSD1322 module and pushing a grayscale test
//! pattern. This runs on an STM32F303RE with the panel on SPI1, PA8 for D/C and PA9 for /RESET.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate alloc;
extern crate cortex_m;
extern crate embedded_alloc;
extern crate embedded_hal as hal_api;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate panic_abort;
extern crate ssd1322_fb;

use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use hal::prelude::*;
use hal::spi;
use embedded_alloc::LlffHeap as Heap;
use ssd1322_fb as oled;

// The driver allocates its transmit buffer, and the demo its framebuffer.
#[global_allocator]
static HEAP: Heap = Heap::empty();

// 8 KiB scratch + 4 KiB framebuffer, with room to spare.
const HEAP_SIZE: usize = 16 * 1024;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

#[allow(unsafe_code)]
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

fn main() -> ! {
    init_heap();

    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let mut delay = hal::delay::Delay::new(cp.SYST, clocks);

    let mut gpioa = dp.GPIOA.split(&mut rcc.ahb);

    // SPI1 is Alternate Function 5 for PA5,6,7.
    let disp_sck = gpioa.pa5.into_af5(&mut gpioa.moder, &mut gpioa.afrl);
    let disp_miso = gpioa.pa6.into_af5(&mut gpioa.moder, &mut gpioa.afrl);
    let disp_mosi = gpioa.pa7.into_af5(&mut gpioa.moder, &mut gpioa.afrl);

    let disp_spi = spi::Spi::spi1(
        dp.SPI1,
        (disp_sck, disp_miso, disp_mosi),
        hal_api::spi::Mode {
            polarity: hal_api::spi::Polarity::IdleLow,
            phase: hal_api::spi::Phase::CaptureOnFirstTransition,
        },
        8.mhz(),
        clocks,
        &mut rcc.apb2,
    );

    let disp_dc = gpioa
        .pa8
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    let mut disp_rst = gpioa
        .pa9
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);

    // The driver does not own /RESET; pulse it before init.
    oled::reset_panel(&mut disp_rst, &mut delay).unwrap();

    let mut disp = oled::Display::new(
        oled::SpiInterface::new(disp_spi, disp_dc),
        oled::SSD1322_128X64_GRAY4,
    );
    disp.init(oled::Config::new(oled::Rotation::Rotate0).contrast_current(159))
        .unwrap();

    // Horizontal ramp: column x shows level x / 8.
    let panel = *disp.panel();
    let mut fb = alloc::vec![0u8; panel.framebuffer_len()];
    for (i, byte) in fb.iter_mut().enumerate() {
        let x = (i % panel.line_length()) as u8 * 2;
        *byte = (x / 8) | ((x + 1) / 8) << 4;
    }
    let view = oled::FramebufferView::for_panel(&fb, &panel);
    disp.update(&view).unwrap();

    loop {
        asm::wfi();
    }
}
