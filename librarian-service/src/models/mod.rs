mod chunk;
mod mads;

pub use chunk::CsvChunk;
pub use mads::MadsEntry;
