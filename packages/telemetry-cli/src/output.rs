//! JSON in, JSON out: every command reads a document from a path or stdin
//! and writes its report to a path or stdout.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

/// Whole input document, from `path` or stdin when `None`
pub fn read_input(path: Option<&str>) -> Result<String, String> {
    let Some(path) = path else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        return Ok(buf);
    };
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read input file '{}': {}", path, e))
}

/// Serialize `value` straight into the destination, newline terminated
pub fn emit<T: Serialize>(value: &T, compact: bool, path: Option<&str>) -> Result<(), String> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to write output file '{}': {}", path, e))?;
            write_json(BufWriter::new(file), value, compact)
                .map_err(|e| format!("Failed to write output file '{}': {}", path, e))
        }
        None => write_json(io::stdout().lock(), value, compact)
            .map_err(|e| format!("Failed to write to stdout: {}", e)),
    }
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T, compact: bool) -> io::Result<()> {
    if compact {
        serde_json::to_writer(&mut writer, value)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, value)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()
}
