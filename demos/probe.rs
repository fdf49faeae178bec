//! Dump a device snapshot as JSON.
//!
//! `cargo run --example probe -- /dev/input/event0 [config.toml]`

#[cfg(target_os = "linux")]
fn main() -> Result<(), evprobe::Error> {
    use evprobe::{DeviceSnapshot, ProbeConfig};

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/input/event0".into());
    let cfg = match args.next() {
        Some(cfg_path) => ProbeConfig::load(cfg_path)?,
        None => ProbeConfig::default(),
    };

    let file = std::fs::File::open(&path)?;
    let snap = DeviceSnapshot::capture(&file, &cfg)?;
    println!("{}", snap.to_json()?);
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("evdev devices are only available on Linux");
}
