//! Netlist line parser.
//!
//! Free-form whitespace-separated tokens, one device per line; the first
//! character of the first token selects the device type (`R C L V I D E G
//! H F`). `SIN(offset amp freq)` on a V/I line sets a sinusoidal waveform;
//! the token `AC [mag]` on a V line declares the AC stimulus source. Lines
//! beginning with `*` or `;` are comments. Nodes named `0` or `gnd` (any
//! case) are grounded automatically.
//!
//! Dot commands drive the CLI:
//! - `.dc <source> <start> <stop> <step>`
//! - `.tran <tstop> [tstart] [max_step]`
//! - `.ac <omega_start> <omega_stop> <n_points>`
//! - `.print V(node) I(device) ...`

use voltlab_core::units::parse_value;
use voltlab_core::Error as CircuitError;

use crate::error::{Error, Result};
use crate::session::Session;

/// An analysis requested by a dot command, in netlist order.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisCommand {
    Dc {
        source: String,
        start: f64,
        stop: f64,
        step: f64,
    },
    Tran {
        t_stop: f64,
        t_start: f64,
        max_step: f64,
    },
    Ac {
        omega_start: f64,
        omega_stop: f64,
        n_points: usize,
    },
}

/// Everything a netlist asked for beyond its device lines.
#[derive(Debug, Default)]
pub struct NetlistRun {
    /// Analyses in netlist order.
    pub analyses: Vec<AnalysisCommand>,
    /// Probe variables from `.print` lines.
    pub prints: Vec<String>,
}

/// Parse a netlist, applying device lines to the session and collecting
/// analysis commands. Errors carry the 1-based line number.
pub fn load_netlist(session: &mut Session, text: &str) -> Result<NetlistRun> {
    let mut run = NetlistRun::default();

    for (line_no, raw) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('*') || line.starts_with(';') {
            continue;
        }

        let result = if line.starts_with('.') {
            parse_dot_command(line, &mut run)
        } else {
            parse_device_line(session, line)
        };

        result.map_err(|e| Error::Netlist {
            line: line_no,
            message: e.to_string(),
        })?;
    }

    Ok(run)
}

fn parse_dot_command(line: &str, run: &mut NetlistRun) -> Result<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let command = tokens[0].to_ascii_lowercase();

    match command.as_str() {
        ".dc" => {
            let [source, start, stop, step] = expect_args(&tokens)?;
            run.analyses.push(AnalysisCommand::Dc {
                source: source.to_string(),
                start: parse_value(start)?,
                stop: parse_value(stop)?,
                step: parse_value(step)?,
            });
        }
        ".tran" => {
            if tokens.len() < 2 {
                return Err(CircuitError::InvalidValue(line.to_string()).into());
            }
            let t_stop = parse_value(tokens[1])?;
            let t_start = tokens.get(2).map(|t| parse_value(t)).transpose()?.unwrap_or(0.0);
            let max_step = tokens.get(3).map(|t| parse_value(t)).transpose()?.unwrap_or(0.0);
            run.analyses.push(AnalysisCommand::Tran {
                t_stop,
                t_start,
                max_step,
            });
        }
        ".ac" => {
            let [start, stop, points] = expect_args(&tokens)?;
            let n_points = points
                .parse::<usize>()
                .map_err(|_| CircuitError::InvalidValue(points.to_string()))?;
            run.analyses.push(AnalysisCommand::Ac {
                omega_start: parse_value(start)?,
                omega_stop: parse_value(stop)?,
                n_points,
            });
        }
        ".print" => {
            run.prints.extend(tokens[1..].iter().map(|t| t.to_string()));
        }
        other => {
            return Err(CircuitError::InvalidValue(other.to_string()).into());
        }
    }
    Ok(())
}

fn expect_args<'a, const N: usize>(tokens: &[&'a str]) -> Result<[&'a str; N]> {
    if tokens.len() < N + 1 {
        return Err(CircuitError::InvalidValue(tokens.join(" ")).into());
    }
    let mut out = [""; N];
    out.copy_from_slice(&tokens[1..N + 1]);
    Ok(out)
}

fn parse_device_line(session: &mut Session, line: &str) -> Result<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(CircuitError::InvalidValue(line.to_string()).into());
    }

    let name = tokens[0];
    let tag = name
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or(' ');
    let n1 = tokens[1];
    let n2 = tokens[2];
    let rest = &tokens[3..];

    match tag {
        'R' | 'C' | 'L' => {
            let value_token = rest
                .first()
                .ok_or_else(|| CircuitError::InvalidValue(line.to_string()))?;
            session.add_device(tag, name, n1, n2, parse_value(value_token)?, &[], &[], false)?;
        }
        'V' | 'I' => {
            if let Some(sin) = parse_sin(rest)? {
                session.add_device(tag, name, n1, n2, 0.0, &sin, &[], true)?;
            } else if tag == 'V' && rest.first().is_some_and(|t| t.eq_ignore_ascii_case("AC")) {
                let magnitude = rest.get(1).map(|t| parse_value(t)).transpose()?.unwrap_or(1.0);
                session.add_device('A', name, n1, n2, magnitude, &[], &[], false)?;
            } else {
                let value_token = rest
                    .first()
                    .ok_or_else(|| CircuitError::InvalidValue(line.to_string()))?;
                session.add_device(tag, name, n1, n2, parse_value(value_token)?, &[], &[], false)?;
            }
        }
        'D' => {
            let mut params = Vec::new();
            for token in rest {
                params.push(parse_value(token)?);
            }
            session.add_device('D', name, n1, n2, 0.0, &params, &[], false)?;
        }
        'E' | 'G' => {
            let [c1, c2, gain] = match rest {
                [c1, c2, gain, ..] => [*c1, *c2, *gain],
                _ => return Err(CircuitError::InvalidValue(line.to_string()).into()),
            };
            session.add_device(tag, name, n1, n2, parse_value(gain)?, &[], &[c1, c2], false)?;
        }
        'H' | 'F' => {
            let [ctrl, gain] = match rest {
                [ctrl, gain, ..] => [*ctrl, *gain],
                _ => return Err(CircuitError::InvalidValue(line.to_string()).into()),
            };
            session.add_device(tag, name, n1, n2, parse_value(gain)?, &[], &[ctrl], false)?;
        }
        other => {
            return Err(CircuitError::InvalidValue(format!("device type '{other}'")).into());
        }
    }

    for node in [n1, n2] {
        if node == "0" || node.eq_ignore_ascii_case("gnd") {
            session.add_ground(node);
        }
    }
    Ok(())
}

/// Parse a `SIN(offset amp freq)` tail, tolerant of whitespace between the
/// tokens. Returns `None` when the tail is not a SIN specification.
fn parse_sin(rest: &[&str]) -> Result<Option<[f64; 3]>> {
    if rest.is_empty() {
        return Ok(None);
    }
    let joined = rest.join(" ");
    let upper = joined.to_ascii_uppercase();
    if !upper.starts_with("SIN(") {
        return Ok(None);
    }
    let inner = joined[4..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| CircuitError::InvalidValue(joined.clone()))?;

    let values: Vec<f64> = inner
        .split_whitespace()
        .map(parse_value)
        .collect::<voltlab_core::Result<_>>()?;
    if values.len() != 3 {
        return Err(CircuitError::InvalidValue(joined).into());
    }
    Ok(Some([values[0], values[1], values[2]]))
}
