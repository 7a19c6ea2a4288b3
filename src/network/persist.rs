//! Versioned binary layout for trained networks.
//!
//! ```text
//! magic        4 bytes  "LMNN"
//! version      u32
//! transfer     u8       TransferFunction::id()
//! layer count  u32      including the input layer
//! layer sizes  u32 × layer count
//! parameters   f64 ×    for every non-input neuron, in layer order:
//!                       bias, then one weight per previous-layer neuron
//! ```
//!
//! All integers and floats are little-endian.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::activation::transfer::TransferFunction;
use crate::error::{EngineError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

pub const MAGIC: [u8; 4] = *b"LMNN";
pub const FORMAT_VERSION: u32 = 1;

// Bounds that keep a corrupted header from triggering huge allocations.
const MAX_LAYERS: u32 = 1 << 10;
const MAX_LAYER_SIZE: u32 = 1 << 24;
const MAX_PARAMETERS: u64 = 1 << 24;

impl Network {
    /// Writes the network to `path` in the binary layout above.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a network previously written by [`Network::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Network> {
        let mut reader = BufReader::new(File::open(path)?);
        Network::read_from(&mut reader)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&FORMAT_VERSION.to_le_bytes())?;
        w.write_all(&[self.transfer().id()])?;

        let sizes = self.layer_sizes();
        w.write_all(&(sizes.len() as u32).to_le_bytes())?;
        for size in &sizes {
            w.write_all(&(*size as u32).to_le_bytes())?;
        }

        for layer in self.layers() {
            for (bias, weights) in layer.biases.iter().zip(&layer.weights.data) {
                w.write_all(&bias.to_le_bytes())?;
                for weight in weights {
                    w.write_all(&weight.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Network> {
        let mut magic = [0u8; 4];
        read_exact(r, &mut magic)?;
        if magic != MAGIC {
            return Err(EngineError::format(0, format!("unrecognised magic {:?}", magic)));
        }

        let version = read_u32(r)?;
        if version != FORMAT_VERSION {
            return Err(EngineError::format(0, format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let mut id = [0u8; 1];
        read_exact(r, &mut id)?;
        let transfer = TransferFunction::from_id(id[0])
            .ok_or_else(|| EngineError::format(0, format!("unknown transfer function id {}", id[0])))?;

        let layer_count = read_u32(r)?;
        if !(2..=MAX_LAYERS).contains(&layer_count) {
            return Err(EngineError::format(0, format!("implausible layer count {}", layer_count)));
        }
        let mut sizes = Vec::with_capacity(layer_count as usize);
        for _ in 0..layer_count {
            let size = read_u32(r)?;
            if size == 0 || size > MAX_LAYER_SIZE {
                return Err(EngineError::format(0, format!("implausible layer size {}", size)));
            }
            sizes.push(size as usize);
        }

        let parameters: u64 = sizes.windows(2)
            .map(|pair| (pair[0] as u64 + 1) * pair[1] as u64)
            .sum();
        if parameters > MAX_PARAMETERS {
            return Err(EngineError::format(0, format!(
                "header declares {} parameters (limit {})",
                parameters, MAX_PARAMETERS
            )));
        }

        // Buffers grow with the data actually read.
        let mut layers = Vec::new();
        for pair in sizes.windows(2) {
            let (fan_in, size) = (pair[0], pair[1]);
            let mut biases = Vec::new();
            let mut rows = Vec::new();
            for _ in 0..size {
                biases.push(read_f64(r)?);
                let row = (0..fan_in).map(|_| read_f64(r)).collect::<Result<Vec<f64>>>()?;
                rows.push(row);
            }
            layers.push(Layer::from_parts(Matrix::from_data(rows), biases));
        }

        Network::from_layers(transfer, sizes[0], layers)
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => EngineError::format(0, "network file is truncated"),
        _ => EngineError::Io(e),
    })
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64<R: Read>(r: &mut R) -> Result<f64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}
