use crate::core::error::*;

use log::*;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

enum DisplayDirective {
    _OpenImage = 7,
    _ReloadImage = 1,
    _CloseImage = 2,
    CreateImage = 4,
    UpdateImage = 6,
    _VectorGraphics = 8,
}

pub const TILE_SIZE: usize = 128;
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);
/// Minimum pause between connection attempts after a failure.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// TCP connection to an image viewer speaking the tev IPC protocol.
pub struct IPCChannel {
    num_failures: u32,
    last_failure: Option<Instant>,
    addr: SocketAddr,
    stream: Option<TcpStream>,
}

impl IPCChannel {
    /// Resolves `hostname` ("host:port") and connects.
    pub fn new(hostname: &str) -> Result<Self, PreviewError> {
        let (address, port) = match hostname.rsplit_once(':') {
            Some((address, port)) if !address.is_empty() && !port.is_empty() => (address, port),
            _ => {
                let msg = format!(
                    "Expected \"host:port\" for display server address. Given \"{}\".",
                    hostname
                );
                return Err(PreviewError::protocol(&msg));
            }
        };
        let host_and_port = format!("{}:{}", address, port);
        let addr = host_and_port
            .to_socket_addrs()?
            .find(|x| x.is_ipv4())
            .ok_or_else(|| {
                let msg = format!("no IPv4 address for display server \"{}\"", hostname);
                PreviewError::protocol(&msg)
            })?;
        let mut channel = IPCChannel {
            num_failures: 0,
            last_failure: None,
            addr,
            stream: None,
        };
        channel.connect()?;
        Ok(channel)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Consecutive failed connects or writes.
    pub fn num_failures(&self) -> u32 {
        self.num_failures
    }

    /// Connects unless already connected. Within `RECONNECT_INTERVAL` of a
    /// failure no attempt is made and an error is returned right away.
    pub fn connect(&mut self) -> Result<(), PreviewError> {
        if self.stream.is_some() {
            return Ok(());
        }
        if let Some(t) = self.last_failure {
            if t.elapsed() < RECONNECT_INTERVAL {
                let msg = format!("display server {} unavailable", self.addr);
                return Err(PreviewError::display(&msg));
            }
        }
        let result = TcpStream::connect_timeout(&self.addr, CONNECT_TIMEOUT)
            .and_then(|stream| stream.set_nodelay(true).map(|_| stream));
        match result {
            Ok(stream) => {
                self.stream = Some(stream);
                self.last_failure = None;
                debug!("connected to display server {}", self.addr);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: io::Error) -> PreviewError {
        self.num_failures += 1;
        if self.num_failures == 1 {
            warn!("lost connection to display server {}: {}", self.addr, e);
        }
        self.stream = None;
        self.last_failure = Some(Instant::now());
        PreviewError::from(e)
    }

    /// Sends one message. A failed write drops the connection; a later
    /// send reconnects.
    pub fn send(&mut self, message: &[u8]) -> Result<(), PreviewError> {
        self.connect()?;
        let result = match self.stream.as_mut() {
            Some(stream) => stream.write_all(message).and_then(|_| stream.flush()),
            None => return Err(PreviewError::display("not connected")),
        };
        match result {
            Ok(()) => {
                self.num_failures = 0;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn disconnect(&mut self) -> Result<(), PreviewError> {
        if let Some(stream) = self.stream.take() {
            stream.shutdown(std::net::Shutdown::Both)?;
        }
        Ok(())
    }
}

impl Drop for IPCChannel {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            debug!("{}", e);
        }
    }
}

fn put_str(buffer: &mut Vec<u8>, s: &str) {
    buffer.extend_from_slice(s.as_bytes());
    buffer.push(0);
}

fn finish(mut buffer: Vec<u8>) -> Vec<u8> {
    let length = (buffer.len() as u32).to_le_bytes();
    buffer[0..4].copy_from_slice(&length);
    buffer
}

/// Message encoders. Every message starts with its total length as a
/// little-endian u32 followed by the directive byte.
pub struct IPCGen {}

impl IPCGen {
    pub fn create_image(name: &str, width: u32, height: u32, channel_names: &[&str]) -> Vec<u8> {
        let grab_focus: u8 = 1;

        let mut buffer = Vec::new();
        buffer.extend_from_slice(&0_u32.to_le_bytes());
        buffer.push(DisplayDirective::CreateImage as u8);
        buffer.push(grab_focus);
        put_str(&mut buffer, name);

        buffer.extend_from_slice(&width.to_le_bytes());
        buffer.extend_from_slice(&height.to_le_bytes());
        buffer.extend_from_slice(&(channel_names.len() as u32).to_le_bytes());
        for c in channel_names {
            put_str(&mut buffer, c);
        }
        finish(buffer)
    }

    /// `image` is interleaved, `channel_names.len()` floats per pixel.
    pub fn update_image(
        name: &str,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image: &[f32],
        channel_names: &[&str],
    ) -> Vec<u8> {
        let grab_focus: u8 = 0;
        let n_channels = channel_names.len();

        let mut buffer = Vec::with_capacity(64 + image.len() * 4);
        buffer.extend_from_slice(&0_u32.to_le_bytes());
        buffer.push(DisplayDirective::UpdateImage as u8);
        buffer.push(grab_focus);
        put_str(&mut buffer, name);

        buffer.extend_from_slice(&(n_channels as u32).to_le_bytes());
        for c in channel_names {
            put_str(&mut buffer, c);
        }

        buffer.extend_from_slice(&x.to_le_bytes());
        buffer.extend_from_slice(&y.to_le_bytes());
        buffer.extend_from_slice(&width.to_le_bytes());
        buffer.extend_from_slice(&height.to_le_bytes());

        // channel offsets, then strides
        for i in 0..n_channels {
            buffer.extend_from_slice(&(i as i64).to_le_bytes());
        }
        for _ in 0..n_channels {
            buffer.extend_from_slice(&(n_channels as i64).to_le_bytes());
        }

        for f in image.iter() {
            buffer.extend_from_slice(&f.to_le_bytes());
        }
        finish(buffer)
    }
}

/// Rectangular piece of an interleaved float image.
#[derive(Debug, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<f32>,
}

/// Splits a `width` x `height` image of `channels` interleaved floats into
/// tiles of at most `TILE_SIZE` squared pixels.
pub fn gen_tiles(
    width: usize,
    height: usize,
    channels: usize,
    image: &[f32],
) -> Result<Vec<Tile>, PreviewError> {
    if width * height * channels != image.len() {
        let msg = format!(
            "{} floats for a {}x{}x{} image",
            image.len(),
            width,
            height,
            channels
        );
        return Err(PreviewError::display(&msg));
    }

    let mut tiles = Vec::new();
    for y0 in (0..height).step_by(TILE_SIZE) {
        let y1 = usize::min(y0 + TILE_SIZE, height);
        for x0 in (0..width).step_by(TILE_SIZE) {
            let x1 = usize::min(x0 + TILE_SIZE, width);
            let nw = x1 - x0;
            let mut buffer = Vec::with_capacity(nw * (y1 - y0) * channels);
            for y in y0..y1 {
                let row = (y * width + x0) * channels;
                buffer.extend_from_slice(&image[row..row + nw * channels]);
            }
            tiles.push(Tile {
                x: x0 as u32,
                y: y0 as u32,
                width: nw as u32,
                height: (y1 - y0) as u32,
                buffer,
            });
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_create_image_layout() {
        let msg = IPCGen::create_image("img", 3, 2, &["R", "G"]);
        assert_eq!(u32::from_le_bytes([msg[0], msg[1], msg[2], msg[3]]) as usize, msg.len());
        assert_eq!(msg[4], 4);
        assert_eq!(msg[5], 1);
        assert_eq!(&msg[6..10], b"img\0");
        assert_eq!(&msg[10..14], &3_u32.to_le_bytes());
        assert_eq!(&msg[14..18], &2_u32.to_le_bytes());
        assert_eq!(&msg[18..22], &2_u32.to_le_bytes());
        assert_eq!(&msg[22..], b"R\0G\0");
    }

    #[test]
    fn test_update_image_size() {
        let image = vec![0.5_f32; 2 * 2 * 4];
        let msg = IPCGen::update_image("a", 0, 0, 2, 2, &image, &["R", "G", "B", "A"]);
        assert_eq!(msg[4], 6);
        // header + name + channel names + rect + offsets/strides + payload
        let expected = 4 + 1 + 1 + 2 + 4 + 8 + 16 + 2 * 4 * 8 + image.len() * 4;
        assert_eq!(msg.len(), expected);
        assert_eq!(&msg[msg.len() - 4..], &0.5_f32.to_le_bytes());
    }

    #[test]
    fn test_gen_tiles() {
        let (w, h) = (300, 130);
        let image: Vec<f32> = (0..w * h).map(|i| i as f32).collect();
        let tiles = gen_tiles(w, h, 1, &image).unwrap();
        assert_eq!(tiles.len(), 3 * 2);
        let last = &tiles[5];
        assert_eq!((last.x, last.y, last.width, last.height), (256, 128, 44, 2));
        assert_eq!(last.buffer[0], (128 * w + 256) as f32);
        let covered: usize = tiles.iter().map(|t| t.buffer.len()).sum();
        assert_eq!(covered, w * h);

        assert!(gen_tiles(2, 2, 4, &image[..3]).is_err());
    }

    #[test]
    fn test_refused_connect_is_counted() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let hostname = listener.local_addr().unwrap().to_string();
        let mut chan = IPCChannel::new(&hostname).unwrap();
        assert!(chan.is_connected());
        chan.disconnect().unwrap();
        drop(listener);

        assert!(chan.send(b"x").is_err());
        assert_eq!(chan.num_failures(), 1);
        assert!(!chan.is_connected());

        // No new attempt until the reconnect interval has passed.
        let start = Instant::now();
        let e = chan.send(b"x").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Display);
        assert_eq!(chan.num_failures(), 1);
        assert!(start.elapsed() < CONNECT_TIMEOUT);
    }
}
