//! Drive a controller's LED override channel from the desktop.
//!
//! Each datagram is a 3-byte header followed by three bytes per LED; the
//! controller skips the header and writes the rest straight to its strip.
//! Works against real hardware or a running `host_sim`.

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use colorchord_embedded::constants::{BYTES_PER_LED, OVERRIDE_HEADER_LEN, OVERRIDE_MAX_FRAME, OVERRIDE_UDP_PORT};

#[derive(Parser, Debug)]
#[command(name = "udp_push", about = "Send a color chase to the raw LED override port")]
struct Args {
    /// Controller address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Override port on the controller
    #[arg(long, default_value_t = OVERRIDE_UDP_PORT)]
    port: u16,
    /// LEDs on the strip
    #[arg(long, default_value_t = 16)]
    leds: usize,
    /// Datagrams to send
    #[arg(long, default_value_t = 100)]
    frames: u32,
    /// Delay between datagrams
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,
}

/// One lit LED walking along the strip, hue rotating per lap.
fn chase_frame(frame: u32, leds: usize, out: &mut Vec<u8>) {
    out.clear();
    out.extend_from_slice(&[0u8; OVERRIDE_HEADER_LEN]);
    let lit = frame as usize % leds;
    let color = match (frame as usize / leds) % 3 {
        0 => [0xff, 0x00, 0x00],
        1 => [0x00, 0xff, 0x00],
        _ => [0x00, 0x00, 0xff],
    };
    for i in 0..leds {
        out.extend_from_slice(if i == lit { &color } else { &[0; BYTES_PER_LED] });
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    ensure!(args.leds > 0, "--leds must be at least 1");
    let len = OVERRIDE_HEADER_LEN + args.leds * BYTES_PER_LED;
    ensure!(
        len <= OVERRIDE_MAX_FRAME,
        "{} LEDs need {} bytes, more than the {}-byte override limit",
        args.leds,
        len,
        OVERRIDE_MAX_FRAME
    );

    let socket = UdpSocket::bind("0.0.0.0:0").context("bind local UDP socket")?;
    let target = (args.host.as_str(), args.port);
    log::info!("sending {} frames of {} bytes to {}:{}", args.frames, len, args.host, args.port);

    let mut buf = Vec::with_capacity(len);
    for frame in 0..args.frames {
        chase_frame(frame, args.leds, &mut buf);
        socket
            .send_to(&buf, target)
            .with_context(|| format!("send frame {} to {}:{}", frame, args.host, args.port))?;
        log::debug!("frame {} sent", frame);
        thread::sleep(Duration::from_millis(args.interval_ms));
    }
    Ok(())
}
