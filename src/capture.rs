// ECG Sentinel — Recorded Front-End Captures
//
// One reading per line, either `raw,lo_plus,lo_minus` (implicitly 250 Hz)
// or `t_ms,raw,lo_plus,lo_minus`. Blank lines, `#` comments and a header
// row are skipped.

use crate::error::SampleError;
use crate::events::{AdcSample, FrontEndReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRecord {
    pub t_ms: Option<u32>,
    pub reading: FrontEndReading,
}

/// Parse one capture line. `Ok(None)` for lines that carry no reading.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<CaptureRecord>, SampleError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Ok(None); // header
    }

    let malformed = |reason: String| SampleError::Malformed { line: line_no, reason };
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (t_ms, rest) = match fields.len() {
        3 => (None, &fields[..]),
        4 => {
            let t = fields[0]
                .parse::<u32>()
                .map_err(|e| malformed(format!("timestamp {:?}: {e}", fields[0])))?;
            (Some(t), &fields[1..])
        }
        n => return Err(malformed(format!("expected 3 or 4 fields, got {n}"))),
    };

    let raw = rest[0]
        .parse::<i32>()
        .map_err(|e| malformed(format!("raw {:?}: {e}", rest[0])))?;
    let flag = |s: &str| match s {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(malformed(format!("lead-off flag {other:?} is not 0/1"))),
    };

    Ok(Some(CaptureRecord {
        t_ms,
        reading: FrontEndReading {
            raw: AdcSample::try_from(raw)?,
            lo_plus: flag(rest[1])?,
            lo_minus: flag(rest[2])?,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_field_line() {
        let rec = parse_line("2048,0,1", 1).unwrap().unwrap();
        assert_eq!(rec.t_ms, None);
        assert_eq!(rec.reading.raw.value(), 2048);
        assert!(rec.reading.is_lead_off());
    }

    #[test]
    fn timestamped_line() {
        let rec = parse_line(" 120, 1999 ,0,0 ", 2).unwrap().unwrap();
        assert_eq!(rec.t_ms, Some(120));
        assert!(!rec.reading.is_lead_off());
    }

    #[test]
    fn skips_noise() {
        assert_eq!(parse_line("", 1), Ok(None));
        assert_eq!(parse_line("# recorded 2026-01-02", 1), Ok(None));
        assert_eq!(parse_line("raw,lo_plus,lo_minus", 1), Ok(None));
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(parse_line("1,2", 7), Err(SampleError::Malformed { line: 7, .. })));
        assert!(matches!(parse_line("2048,0,2", 3), Err(SampleError::Malformed { .. })));
        assert_eq!(parse_line("5000,0,0", 4), Err(SampleError::OutOfRange(5000)));
    }
}
