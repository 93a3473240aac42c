/*!
A CLI for working with the CBOR subset supported by `tiny-cbor`.

# Commands

- `inspect`: Display CBOR data as diagnostic notation or hex
- `compose`: Encode JSON into CBOR using a fixed-size buffer

# Examples

```bash
# Inspect a CBOR file
tiny-cbor inspect data.cbor

# Encode JSON, failing if the result needs more than 256 bytes
echo '{"id": 7, "tags": ["x"]}' | tiny-cbor compose --buffer-size 256 -o data.cbor -

# Round-trip
tiny-cbor compose data.json | tiny-cbor inspect -
```

Set `RUST_LOG=debug` to see why an encode or decode failed.
*/

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod compose;
mod inspect;
mod io;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for inspecting and composing minimal CBOR data",
    long_about = "Inspects and composes the CBOR subset used on constrained devices:\n\
                  unsigned integers, definite-length byte and text strings, arrays,\n\
                  maps, and the simple values false, true, null and undefined."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display CBOR data as diagnostic notation or hex
    Inspect(inspect::Command),

    /// Encode JSON as CBOR
    Compose(compose::Command),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Inspect(args) => args.exec(),
        Commands::Compose(args) => args.exec(),
    }
}
