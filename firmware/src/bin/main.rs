#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::{Duration, Ticker};
use skyroaster_bridge::{
    now_us, BridgeError, DecodeStats, DecoderConfig, EdgeCapture, FrameReceiver, TelemetryBridge,
    TemperatureUnit, UartCommandReader, UartReadingSink, UnitSetting,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// How often the bridge looks for a completed frame.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Decode statistics are logged every this many polls (10 s).
const STATS_EVERY: u32 = 200;

#[cfg(not(feature = "fahrenheit"))]
const DEFAULT_UNIT: TemperatureUnit = TemperatureUnit::Celsius;
#[cfg(feature = "fahrenheit")]
const DEFAULT_UNIT: TemperatureUnit = TemperatureUnit::Fahrenheit;

/// Decoder and frame slot shared by the capture and bridge tasks.
static RECEIVER: FrameReceiver<DecodeStats> =
    FrameReceiver::with_observer(DecoderConfig::DEFAULT, DecodeStats::new());

/// Output unit, read for every reading and changed by UART commands.
static UNIT: UnitSetting = UnitSetting::new(DEFAULT_UNIT);

/// Edge capture runs here so it preempts the bridge like a GPIO handler would.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

type Capture = EdgeCapture<'static, Input<'static>, fn() -> u32, DecodeStats>;
type Bridge = TelemetryBridge<'static, UartReadingSink<'static>, DecodeStats>;

#[entry]
fn main() -> ! {
    info!("Skyroaster bridge starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    RECEIVER.set_debug(cfg!(feature = "decoder-trace"));

    // --- Sensor line ---
    // Idles high; the pull-up keeps it there when the roaster is off.
    let line = Input::new(p.PIN_2, Pull::Up);
    let capture: Capture = EdgeCapture::new(line, now_us as fn() -> u32, &RECEIVER);

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();
    let bridge: Bridge = TelemetryBridge::new(&RECEIVER, &UNIT, UartReadingSink::new(tx));
    let commands = UartCommandReader::new(rx);

    // On-board LED toggles on every rejected frame
    let led = Output::new(p.PIN_25, Level::Low);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.spawn(capture_task(capture).unwrap());

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(bridge_task(bridge, led).unwrap());
        spawner.spawn(command_task(commands).unwrap());
        info!("Skyroaster bridge initialized, waiting for frames...");
    })
}

/// Capture task - timestamps every edge on the sensor line and decodes it.
#[embassy_executor::task]
async fn capture_task(mut capture: Capture) {
    capture.run().await
}

/// Command task - applies unit changes sent by the companion app.
#[embassy_executor::task]
async fn command_task(mut commands: UartCommandReader<'static>) {
    loop {
        match commands.read_line().await {
            Ok(line) => match UNIT.apply_command(line) {
                Some(unit) => info!("Unit set to {}", unit.as_char()),
                None => warn!("Unknown command ({} bytes)", line.len()),
            },
            Err(e) => {
                error!("Command error: {:?}", e);
            }
        }
    }
}

/// Bridge task - forwards completed frames to the UART.
#[embassy_executor::task]
async fn bridge_task(mut bridge: Bridge, mut led: Output<'static>) {
    let mut ticker = Ticker::every(POLL_INTERVAL);
    let mut polls: u32 = 0;

    loop {
        ticker.next().await;

        match bridge.poll_once().await {
            Ok(Some(reading)) => {
                info!("Reading: {} {}", reading.value, reading.unit.as_char());
            }
            Ok(None) => {}
            Err(BridgeError::Frame(e)) => {
                warn!("Bad frame: {:?}", e);
                // Toggle LED to indicate error
                led.toggle();
            }
            Err(e) => {
                error!("Output error: {:?}", e);
            }
        }

        polls = polls.wrapping_add(1);
        if polls % STATS_EVERY == 0 {
            let stats = RECEIVER.with_observer_ref(|s| *s);
            info!(
                "Decode stats: {} (forwarded {}, rejected {})",
                stats,
                bridge.forwarded(),
                bridge.rejected_frames()
            );
        }
    }
}
