//! Argument construction for single-frame extraction.
//!
//! The argument list and ordering are a wire contract with the staged decoder
//! binary; downstream display surfaces are sized against the resolution table,
//! so both must stay stable.

/// Display width for a decode height. 480 and 96 carry hand-tuned widths the
/// UI lays out against; any other height derives 16:9 with integer truncation.
pub fn calculate_width(height: u32) -> u32 {
    match height {
        480 => 854,
        96 => 171,
        h => h * 16 / 9,
    }
}

/// Arguments to decode one still frame at `timestamp_ms`, scaled to
/// `width`x`height`, as MJPEG on stdout.
pub fn build_extract_args(
    input_path: &str,
    timestamp_ms: u64,
    width: u32,
    height: u32,
) -> Vec<String> {
    let seconds = timestamp_ms as f64 / 1000.0;
    vec![
        "-i".to_string(),
        input_path.to_string(),
        "-ss".to_string(),
        format!("{:.3}", seconds),
        "-vf".to_string(),
        format!("scale={}:{}", width, height),
        "-vframes".to_string(),
        "1".to_string(),
        "-f".to_string(),
        "image2pipe".to_string(),
        "-c:v".to_string(),
        "mjpeg".to_string(),
        "-".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_table_matches_contract() {
        assert_eq!(calculate_width(480), 854);
        assert_eq!(calculate_width(96), 171);
        assert_eq!(calculate_width(720), 1280);
        assert_eq!(calculate_width(1080), 1920);
        // integer truncation, not rounding
        assert_eq!(calculate_width(100), 177);
        assert_eq!(calculate_width(54), 96);
    }

    #[test]
    fn extract_args_are_bit_for_bit_stable() {
        let args = build_extract_args("/media/clip.mp4", 1500, 171, 96);
        assert_eq!(
            args,
            vec![
                "-i",
                "/media/clip.mp4",
                "-ss",
                "1.500",
                "-vf",
                "scale=171:96",
                "-vframes",
                "1",
                "-f",
                "image2pipe",
                "-c:v",
                "mjpeg",
                "-",
            ]
        );
    }

    #[test]
    fn timestamp_converts_to_fractional_seconds() {
        let args = build_extract_args("a.mp4", 62_250, 854, 480);
        assert_eq!(args[3], "62.250");
        let args = build_extract_args("a.mp4", 0, 854, 480);
        assert_eq!(args[3], "0.000");
    }
}
