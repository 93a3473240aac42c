/*!
Where the CLI reads from and writes to: a named file, or `-` for stdin/stdout.
*/

use anyhow::Context;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Stream {
    Std,
    File(PathBuf),
}

impl Stream {
    pub fn read(&self) -> anyhow::Result<Vec<u8>> {
        match self {
            Self::Std => {
                let mut data = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut data)
                    .context("Failed to read stdin")?;
                Ok(data)
            }
            Self::File(path) => {
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }

    pub fn write(&self, data: &[u8]) -> anyhow::Result<()> {
        match self {
            Self::Std => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(data)?;
                stdout.flush().context("Failed to write stdout")
            }
            Self::File(path) => std::fs::write(path, data)
                .with_context(|| format!("Failed to write {}", path.display())),
        }
    }
}

impl FromStr for Stream {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "-" => Self::Std,
            path => Self::File(PathBuf::from(path)),
        })
    }
}
