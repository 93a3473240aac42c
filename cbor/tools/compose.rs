/*!
Compose command - encode JSON as CBOR
*/

use crate::io::Stream;
use anyhow::{Context, bail};
use clap::Parser;
use serde_json::Value;
use tiny_cbor::encode::Writer;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    about = "Encode JSON as CBOR",
    long_about = "Encode JSON as CBOR into a fixed-size buffer.\n\n\
                  Only unsigned integers are supported as numbers, and objects\n\
                  and arrays may be nested at most 8 deep."
)]
pub struct Command {
    /// Size of the encode buffer in bytes
    #[arg(long, default_value_t = 4096, value_name = "BYTES")]
    buffer_size: usize,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Stream>,

    /// Input JSON file (use '-' for stdin)
    input: Stream,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let json: Value =
            serde_json::from_slice(&self.input.read()?).context("Failed to parse JSON")?;

        let mut buffer = vec![0u8; self.buffer_size];
        let cbor = compose(&json, &mut buffer)?;
        debug!("Encoded {} bytes", cbor.len());

        self.output.unwrap_or(Stream::Std).write(cbor)
    }
}

/// Encodes `json` into the tail of `buffer`, returning the encoded bytes.
pub fn compose<'a>(json: &Value, buffer: &'a mut [u8]) -> anyhow::Result<&'a [u8]> {
    let mut writer = Writer::new(buffer);
    prepend_json(&mut writer, json)?;
    let cbor: &'a [u8] = writer.finish().context("Failed to encode CBOR")?;
    Ok(cbor)
}

fn prepend_json(writer: &mut Writer, value: &Value) -> anyhow::Result<()> {
    match value {
        Value::Null => writer.prepend_null(),
        Value::Bool(b) => writer.prepend_bool(*b),
        Value::Number(n) => match n.as_u64() {
            Some(v) => writer.prepend_unsigned(v),
            None => bail!("Unsupported number {n}: only unsigned integers can be encoded"),
        },
        Value::String(s) => writer.prepend_text(s.as_str()),
        Value::Array(items) => {
            writer.open_array();
            for item in items.iter().rev() {
                prepend_json(writer, item)?;
            }
            writer.wrap_array()
        }
        Value::Object(map) => {
            writer.open_map();
            for (key, value) in map.iter().rev() {
                prepend_json(writer, value)?;
                writer.prepend_text(key.as_str());
            }
            writer.wrap_map()
        }
    };
    Ok(())
}
