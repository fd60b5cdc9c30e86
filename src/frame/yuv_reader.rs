// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::{Picture, PictureGeometry};

/// Reads luma planes out of a raw planar YUV 4:2:0 stream.
///
/// 8-bit input is one byte per sample; deeper input is two bytes little
/// endian. Chroma planes are read and discarded.
pub struct YuvReader<R: Read> {
    inner: R,
    geometry: PictureGeometry,
    frames_read: u32,
}

impl YuvReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, geometry: PictureGeometry) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), geometry))
    }
}

impl<R: Read> YuvReader<R> {
    pub fn new(inner: R, geometry: PictureGeometry) -> Self {
        Self {
            inner,
            geometry,
            frames_read: 0,
        }
    }

    fn bytes_per_sample(&self) -> usize {
        if self.geometry.bit_depth > 8 {
            2
        } else {
            1
        }
    }

    fn chroma_bytes(&self) -> usize {
        let cw = (self.geometry.width as usize + 1) / 2;
        let ch = (self.geometry.height as usize + 1) / 2;
        2 * cw * ch * self.bytes_per_sample()
    }

    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    /// Next frame's luma, or `None` at a clean end of stream.
    ///
    /// A stream that ends part way through a frame is an `UnexpectedEof`.
    pub fn next_picture(&mut self) -> io::Result<Option<Picture>> {
        let luma_bytes = self.geometry.sample_count() * self.bytes_per_sample();
        let mut raw = vec![0u8; luma_bytes];

        let filled = read_full(&mut self.inner, &mut raw)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < luma_bytes {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated frame {}", self.frames_read),
            ));
        }

        let mut chroma = vec![0u8; self.chroma_bytes()];
        self.inner.read_exact(&mut chroma)?;

        let samples: Vec<u16> = if self.bytes_per_sample() == 2 {
            raw.chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect()
        } else {
            raw.iter().map(|&b| u16::from(b)).collect()
        };

        let picture = Picture::new(self.geometry, samples)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.frames_read += 1;
        Ok(Some(picture))
    }
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
