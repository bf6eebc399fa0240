//! Text formatting of host reports.

use crate::host::{BlockInfo, EngineStats, LimbStatus, PingStats, WeatherReport};

pub fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

pub fn format_microseconds(t: f64) -> String {
    if t <= 1e3 {
        format!("{:.2} us", t)
    } else if t <= 1e6 {
        format!("{:.2} ms", t / 1e3)
    } else {
        format!("{:.2} s", t / 1e6)
    }
}

pub fn format_bytes(x: u64) -> String {
    if x <= 1024 {
        format!("{} B", x)
    } else if x <= 1024 * 1024 {
        format!("{:.2} KiB", x as f64 / 1024.0)
    } else {
        format!("{:.2} MiB", x as f64 / 1024.0 / 1024.0)
    }
}

/// Compass point for an azimuth in degrees.
pub fn needle(azimuth: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = azimuth.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0).floor() as usize % POINTS.len();
    POINTS[index]
}

/// `"T*: 100.00"`; the label is upper-cased for an unsplinted fracture, `*` marks venous
/// and `**` arterial bleeding.
pub fn format_limb(status: &LimbStatus) -> String {
    let abbrev = status.limb.abbrev();
    let label = if status.fractured && !status.splint {
        abbrev.to_uppercase()
    } else {
        abbrev.to_string()
    };
    let venous = if status.venous { "*" } else { "" };
    let arterial = if status.arterial { "**" } else { "" };
    format!("{}{}{}: {:.2}", label, venous, arterial, status.hp)
}

pub fn format_body(body: &[LimbStatus]) -> String {
    body.iter().map(format_limb).collect::<Vec<_>>().join(" ")
}

pub fn format_block(block: &BlockInfo) -> String {
    format!(
        "Material: {}, durability: {:.2}, crumbly: {}",
        block.material,
        block.durability,
        yes_no(block.crumbly)
    )
}

pub fn format_weather(w: &WeatherReport) -> String {
    format!(
        "{:.0} degrees, {:.1} hPa, humidity {:.0} %, wind {:.1} m/s ({}), cloud cover {:.0} %",
        w.temperature,
        w.pressure / 100.0,
        w.humidity * 100.0,
        w.wind_speed,
        needle(w.wind_azimuth),
        w.cloudiness * 100.0
    )
}

pub fn format_engine_stats(s: &EngineStats) -> String {
    format!(
        "Total: {}, alive: {}, lag: {}, peak: {}, usage: {}",
        s.total,
        s.alive,
        format_microseconds(s.lag),
        format_microseconds(s.peak),
        format_bytes(s.usage)
    )
}

pub fn format_ping(nickname: &str, p: &PingStats) -> String {
    format!(
        "{}: average = {} ms, minimum = {} ms, variance = {} ms, packet loss = {:.2} %",
        nickname,
        p.round_trip_ms,
        p.lowest_round_trip_ms,
        p.round_trip_variance_ms,
        p.packet_loss_percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Limb, PACKET_LOSS_SCALE};

    #[test]
    fn units_switch_at_boundaries() {
        assert_eq!(format_microseconds(1000.0), "1000.00 us");
        assert_eq!(format_microseconds(1500.0), "1.50 ms");
        assert_eq!(format_microseconds(2_500_000.0), "2.50 s");
        assert_eq!(format_bytes(1024), "1024 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
    }

    #[test]
    fn needle_points() {
        assert_eq!(needle(0.0), "N");
        assert_eq!(needle(350.0), "N");
        assert_eq!(needle(90.0), "E");
        assert_eq!(needle(-90.0), "W");
        assert_eq!(needle(200.0), "S");
    }

    #[test]
    fn limb_markers() {
        let mut status = LimbStatus {
            limb: Limb::LegL,
            hp: 42.0,
            fractured: true,
            splint: false,
            venous: true,
            arterial: true,
        };
        assert_eq!(format_limb(&status), "LL***: 42.00");
        status.splint = true;
        status.arterial = false;
        assert_eq!(format_limb(&status), "ll*: 42.00");
    }

    #[test]
    fn ping_line() {
        let stats = PingStats {
            round_trip_ms: 48,
            lowest_round_trip_ms: 31,
            round_trip_variance_ms: 5,
            packet_loss: PACKET_LOSS_SCALE / 8,
        };
        assert_eq!(
            format_ping("Deuce", &stats),
            "Deuce: average = 48 ms, minimum = 31 ms, variance = 5 ms, packet loss = 12.50 %"
        );
    }
}
