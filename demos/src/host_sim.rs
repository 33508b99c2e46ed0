//! Desktop simulation of the full controller.
//!
//! A background thread plays the sampling interrupt, pushing a synthetic
//! ADC signal into the real lock-free ring while the sampling timer is
//! running. The main thread is the cooperative context: it dispatches the
//! processing task, polls the UDP override socket and fires the watchdog
//! every 100 ms. Station-mode DHCP is simulated with a fixed delay.
//!
//! ```text
//!   [adc thread] ──► SampleRing ──► TaskScheduler ──► LogEngine ──► LogStrip
//!                                        ▲                             ▲
//!   WatchdogTimer (100 ms) ──────────────┘        UDP :7777 ──────────┘
//! ```
//!
//! Run with `RUST_LOG=debug` to see gate transitions and frame pushes.

use std::convert::Infallible;
use std::f32::consts::TAU;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use colorchord_embedded::prelude::*;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[derive(Parser, Debug)]
#[command(name = "host_sim", about = "Run the ColorChord control core against simulated hardware")]
struct Args {
    /// UDP port for the raw LED override server
    #[arg(long, default_value_t = OVERRIDE_UDP_PORT)]
    port: u16,
    /// Input amplitude scale
    #[arg(long, default_value_t = 80)]
    gain: i32,
    /// Number of LEDs on the simulated strip
    #[arg(long, default_value_t = 16)]
    leds: usize,
    /// Output driver: 0 = linear, 1 = all same
    #[arg(long, default_value_t = 0)]
    driver: u8,
    /// Start with the visualization pipeline inactive
    #[arg(long)]
    inactive: bool,
    /// Simulated time until the station acquires an address
    #[arg(long, default_value_t = 1500)]
    dhcp_delay_ms: u64,
    /// Boot as a soft access point instead of a station
    #[arg(long)]
    softap: bool,
    /// Hold the boot button from this point on
    #[arg(long)]
    press_button_ms: Option<u64>,
    /// Stop after this many seconds
    #[arg(long, default_value_t = 5)]
    run_secs: u64,
    /// Simulated ADC sample rate in Hz
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,
}

// ── Simulated platform ─────────────────────────────────────────────────────

/// Sampling timer: gates the ADC thread through a shared flag.
struct HostTimer<'a> {
    enabled: &'a AtomicBool,
}

impl SamplingTimer for HostTimer<'_> {
    fn start(&mut self) {
        log::info!("sampling timer started");
        self.enabled.store(true, Ordering::Release);
    }

    fn pause(&mut self) {
        self.enabled.store(false, Ordering::Release);
    }

    fn resume(&mut self) {
        self.enabled.store(true, Ordering::Release);
    }
}

/// Mean-level "analysis": a moving bar for linear mode, a pulse for all-same.
struct LogEngine {
    acc: u64,
    count: u32,
    level: u8,
    leds: Vec<u8>,
}

impl LogEngine {
    fn new(led_count: usize) -> Self {
        LogEngine {
            acc: 0,
            count: 0,
            level: 0,
            leds: vec![0; led_count * 3],
        }
    }
}

impl SampleSink for LogEngine {
    fn push_sample(&mut self, sample: i32) {
        self.acc += sample.unsigned_abs() as u64;
        self.count += 1;
    }
}

impl AnalysisEngine for LogEngine {
    fn handle_frame_info(&mut self) {
        let mean = self.acc / u64::from(self.count.max(1));
        self.level = (mean >> 6).min(255) as u8;
        self.acc = 0;
        self.count = 0;
    }

    fn update_linear_leds(&mut self) {
        let lit = self.leds.len() / 3 * usize::from(self.level) / 255;
        for (i, px) in self.leds.chunks_exact_mut(3).enumerate() {
            let on = if i < lit { self.level } else { 0 };
            px.copy_from_slice(&[on, 0, on / 2]);
        }
    }

    fn update_all_same_leds(&mut self) {
        for px in self.leds.chunks_exact_mut(3) {
            px.copy_from_slice(&[self.level / 2, self.level, 0]);
        }
    }

    fn led_output(&self) -> &[u8] {
        &self.leds
    }
}

/// LED strip that only reports what it was sent.
#[derive(Default)]
struct LogStrip {
    pushes: u64,
}

impl LedDriver for LogStrip {
    fn push(&mut self, pixels: &[u8], mode: LedDriverMode) {
        self.pushes += 1;
        log::debug!(
            "strip push #{} ({} bytes, mode {}): {:02x?}",
            self.pushes,
            pixels.len(),
            mode.0,
            &pixels[..pixels.len().min(9)]
        );
    }
}

struct HostServices {
    booted: Instant,
    dhcp_delay: Duration,
    softap: bool,
    idle_ticks: u64,
    timed_ticks: u64,
}

impl CommonServices for HostServices {
    fn tick(&mut self, kind: TickKind) {
        match kind {
            TickKind::Idle => self.idle_ticks += 1,
            TickKind::Timed => self.timed_ticks += 1,
        }
    }

    fn has_ip(&self) -> bool {
        self.softap || self.booted.elapsed() >= self.dhcp_delay
    }
}

/// Records the power request; the main loop ends the run on the next pass.
struct HostPower {
    requested: Option<PowerAction>,
}

impl PowerControl for HostPower {
    fn reset_cause(&self) -> ResetCause {
        ResetCause::PowerOn
    }

    fn deep_sleep(&mut self, ms: u32, radio: WakeRadio) {
        self.requested = Some(PowerAction::DeepSleep { ms, radio });
    }

    fn restart(&mut self) {
        self.requested = Some(PowerAction::Restart);
    }
}

/// Boot button that reads pressed after a fixed time.
struct TimedButton {
    booted: Instant,
    press_at: Option<Duration>,
}

impl ErrorType for TimedButton {
    type Error = Infallible;
}

impl InputPin for TimedButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.press_at.is_some_and(|at| self.booted.elapsed() >= at))
    }
}

struct AudioPowerPin;

impl ErrorType for AudioPowerPin {
    type Error = Infallible;
}

impl OutputPin for AudioPowerPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        log::info!("audio circuit power off");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        log::info!("audio circuit power on");
        Ok(())
    }
}

/// Host flash accepts whichever map is offered first.
struct HostFlash;

impl PartitionRegistrar for HostFlash {
    fn register(&mut self, _map: &PartitionMap) -> bool {
        true
    }
}

/// Nonblocking UDP socket on the requested port.
struct HostUdp {
    port: u16,
    socket: Option<UdpSocket>,
}

impl OverrideServer for HostUdp {
    type Error = std::io::Error;

    fn bind(&mut self, port: u16) -> Result<(), std::io::Error> {
        if port != self.port {
            log::info!("override server moved from UDP {} to {}", port, self.port);
        }
        let socket = UdpSocket::bind(("0.0.0.0", self.port))?;
        socket.set_nonblocking(true)?;
        self.socket = Some(socket);
        Ok(())
    }
}

// ── Sampling "interrupt" ───────────────────────────────────────────────────

/// Push a 220 Hz tone riding on a mid-scale bias, in 1 ms bursts.
fn adc_thread(mut tx: Producer<'_, RawSample, SAMPLE_RING_SLOTS>, rate: u32, enabled: &AtomicBool, running: &AtomicBool) {
    let per_ms = (rate / 1000).max(1);
    let mut phase = 0.0f32;
    let step = TAU * 220.0 / rate as f32;

    while running.load(Ordering::Acquire) {
        if enabled.load(Ordering::Acquire) {
            for _ in 0..per_ms {
                let v = 512.0 + 300.0 * phase.sin();
                // Full ring: the sample is dropped and counted.
                let _ = tx.push(v as RawSample);
                phase = (phase + step) % TAU;
            }
        }
        thread::sleep(Duration::from_millis(1));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = Settings {
        initial_amp: args.gain,
        output_driver: OutputDriver::from_raw(args.driver),
        led_driver_mode: LedDriverMode(0),
        led_count: args.leds,
        colorchord_active: !args.inactive,
    };
    log::info!("settings: {:?}", settings);

    let booted_at = Instant::now();
    let enabled = AtomicBool::new(false);
    let running = AtomicBool::new(true);
    let mut timer = HostTimer { enabled: &enabled };
    let mut udp = HostUdp {
        port: args.port,
        socket: None,
    };
    let mut power = HostPower { requested: None };
    let wifi = if args.softap { WifiMode::SoftAp } else { WifiMode::Station };

    let Booted {
        mut ctx, mut scheduler, ..
    } = match boot(&mut HostFlash, &mut AudioPowerPin, &mut udp, wifi, &power, &mut timer) {
        Ok(b) => b,
        Err(e) => halt_forever(e, |s| {
            eprint!("{}", s);
            thread::sleep(Duration::from_secs(1));
        }),
    };
    let socket = udp.socket.context("override socket missing after boot")?;

    let mut ring: SampleRing<RawSample, SAMPLE_RING_SLOTS> = SampleRing::new();
    let (tx, mut rx) = ring.split();
    let mut engine = LogEngine::new(settings.led_count);
    let mut strip = LogStrip::default();
    let mut services = HostServices {
        booted: booted_at,
        dhcp_delay: Duration::from_millis(args.dhcp_delay_ms),
        softap: args.softap,
        idle_ticks: 0,
        timed_ticks: 0,
    };
    let mut watchdog = WatchdogTimer::new(TimedButton {
        booted: booted_at,
        press_at: args.press_button_ms.map(Duration::from_millis),
    });
    let mut net = NetworkOverride::new();
    let mut datagram = [0u8; OVERRIDE_MAX_FRAME + 1];

    let deadline = booted_at + Duration::from_secs(args.run_secs);
    let period = Duration::from_millis(u64::from(WATCHDOG_PERIOD_MS));
    let mut next_watchdog = Instant::now() + period;

    thread::scope(|s| -> Result<()> {
        s.spawn(|| adc_thread(tx, args.sample_rate, &enabled, &running));

        let result = (|| -> Result<()> {
            while Instant::now() < deadline {
                let mut io = Io {
                    source: &mut rx,
                    engine: &mut engine,
                    leds: &mut strip,
                    timer: &mut timer,
                    services: &mut services,
                };
                scheduler.run_pending(&mut ctx, &settings, &mut io);

                match socket.recv_from(&mut datagram) {
                    Ok((n, from)) => {
                        log::debug!("override datagram from {}", from);
                        net.on_datagram(&datagram[..n], settings.led_driver_mode, &mut strip);
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) => return Err(e).context("override socket receive"),
                }

                if Instant::now() >= next_watchdog {
                    next_watchdog += period;
                    watchdog.fire(&mut ctx, &mut services, &mut timer, &rx, &mut power);
                    if let Some(action) = power.requested {
                        log::warn!("simulated {:?}: ending run", action);
                        break;
                    }
                }

                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        })();

        running.store(false, Ordering::Release);
        result
    })?;

    log::info!(
        "done: {} task runs, {} frames pushed, {} override datagrams, {} idle / {} timed ticks, {} samples dropped",
        scheduler.dispatched(),
        ctx.output.frames_pushed(),
        net.forwarded(),
        services.idle_ticks,
        services.timed_ticks,
        rx.overruns()
    );
    Ok(())
}
