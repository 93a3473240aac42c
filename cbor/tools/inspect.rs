/*!
Inspect command - display CBOR data
*/

use super::io::Stream;
use anyhow::{Context, bail};
use clap::Parser;
use std::fmt::Write;
use tiny_cbor::decode::Reader;
use tiny_cbor::format::{MajorType, Simple};
use tracing::warn;

const MAX_RECURSION: usize = 16;

#[derive(Parser, Debug)]
#[command(about = "Inspect and display CBOR data", long_about = None)]
pub struct Command {
    /// Output format
    #[arg(
        long,
        default_value = "diag",
        value_name = "FORMAT",
        help = "Output format: diag (diagnostic notation), hex"
    )]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Stream>,

    /// Input CBOR file (use '-' for stdin)
    input: Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// CBOR Diagnostic Notation, one line per top-level item
    #[value(alias = "diagnostic")]
    Diag,
    /// Hexadecimal dump
    Hex,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let data = self.input.read()?;

        let mut text = match self.format {
            OutputFormat::Diag => format_sequence(&data)?,
            OutputFormat::Hex => hex::encode(&data),
        };
        text.push('\n');

        self.output.unwrap_or(Stream::Std).write(text.as_bytes())
    }
}

/// Formats every top-level item of `data`, one per line.
pub fn format_sequence(data: &[u8]) -> anyhow::Result<String> {
    let mut reader = Reader::new(data);
    let mut lines = Vec::new();
    while reader.remaining() > 0 {
        let mut line = String::new();
        let start = reader.offset();
        if let Err(e) = format_item(&mut reader, &mut line, MAX_RECURSION) {
            let trailing = &data[start..];
            warn!(
                "Failed to decode item at offset {start}, {} undecoded bytes: {}",
                trailing.len(),
                hex::encode(trailing)
            );
            return Err(e).with_context(|| {
                format!(
                    "Failed to decode item at offset {start}, {} bytes left undecoded",
                    trailing.len()
                )
            });
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn format_item(reader: &mut Reader, out: &mut String, max_recursion: usize) -> anyhow::Result<()> {
    match reader.peek_major_type() {
        None => bail!("Unexpected end of data at offset {}", reader.offset()),
        Some(MajorType::Unsigned) => {
            let (value, _) = reader.read_unsigned()?;
            write!(out, "{value}")?;
        }
        Some(MajorType::ByteString) => {
            write!(out, "h'{}'", hex::encode(reader.read_data()?))?;
        }
        Some(MajorType::TextString) => {
            let text = reader.read_text()?;
            write!(out, "{:?}", String::from_utf8_lossy(text))?;
        }
        Some(MajorType::Array) => {
            let count = reader.read_array()?;
            if max_recursion == 0 {
                bail!("Maximum nesting depth of {MAX_RECURSION} exceeded");
            }
            out.push('[');
            for i in 0..count {
                if i > 0 {
                    out.push_str(", ");
                }
                format_item(reader, out, max_recursion - 1)?;
            }
            out.push(']');
        }
        Some(MajorType::Map) => {
            let count = reader.read_map()?;
            if max_recursion == 0 {
                bail!("Maximum nesting depth of {MAX_RECURSION} exceeded");
            }
            out.push('{');
            for i in 0..count {
                if i > 0 {
                    out.push_str(", ");
                }
                format_item(reader, out, max_recursion - 1)?;
                out.push_str(": ");
                format_item(reader, out, max_recursion - 1)?;
            }
            out.push('}');
        }
        Some(MajorType::Simple) => match reader.read_simple()? {
            Simple::False => out.push_str("false"),
            Simple::True => out.push_str("true"),
            Simple::Null => out.push_str("null"),
            Simple::Undefined => out.push_str("undefined"),
            Simple::Other(0xf8) => {
                let value: u8 = reader.read_simple()?.into();
                write!(out, "simple({value})")?;
            }
            Simple::Other(b) if b < 0xf8 => write!(out, "simple({})", b & 0x1f)?,
            Simple::Other(b) => bail!("Unsupported simple value {b:#04x}"),
        },
        Some(major) => bail!("Unsupported major type: {major}"),
    }
    Ok(())
}
